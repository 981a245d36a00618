//! MCP server exposing the pr-agent tools over stdio.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::schemars;
use rmcp::service::{Peer, RequestContext, RoleServer};
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::Deserialize;
use tracing::debug;

use pr_agent_core::resolve_working_dir;
use pr_agent_git::GitCli;

use crate::config::Settings;
use crate::tools;

/// Request parameters for analyze_file_changes
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
#[schemars(crate = "rmcp::schemars")]
pub struct AnalyzeFileChangesRequest {
    #[schemars(description = "Base branch to compare against (default: main)")]
    pub base_branch: Option<String>,
    #[schemars(description = "Include the diff content (default: true)")]
    pub include_diff: Option<bool>,
    #[schemars(description = "Maximum number of diff lines to include (default: 500)")]
    pub max_diff_lines: Option<i64>,
    #[schemars(
        description = "Pagination cursor: pass the next_diff_index from the previous response to fetch the next page"
    )]
    pub last_diff_index: Option<DiffCursor>,
}

/// Cursor as sent by the client. The server hands out strings, but some
/// clients echo them back as numbers. Anything else reads from the start.
#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
#[schemars(crate = "rmcp::schemars")]
#[serde(untagged)]
pub enum DiffCursor {
    Text(String),
    Index(u64),
    Other(serde_json::Value),
}

impl DiffCursor {
    pub fn into_string(self) -> String {
        match self {
            DiffCursor::Text(s) => s,
            DiffCursor::Index(n) => n.to_string(),
            DiffCursor::Other(_) => String::new(),
        }
    }
}

/// Request parameters for suggest_template
#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[schemars(crate = "rmcp::schemars")]
pub struct SuggestTemplateRequest {
    #[schemars(description = "Your analysis of what the changes do")]
    pub changes_summary: String,
    #[schemars(
        description = "The type of change you've identified (bug, feature, docs, refactor, test, etc.)"
    )]
    pub change_type: String,
}

/// The MCP server handler
#[derive(Clone)]
pub struct PrAgentServer {
    settings: Arc<Settings>,
    git: GitCli,
    tool_router: ToolRouter<Self>,
}

impl PrAgentServer {
    pub fn new(settings: Settings) -> Self {
        Self {
            git: settings.git(),
            settings: Arc::new(settings),
            tool_router: Self::tool_router(),
        }
    }

    /// Working directory for this call: the client's first root, else the configured one
    async fn working_dir(&self, peer: &Peer<RoleServer>) -> PathBuf {
        let roots = self.client_roots(peer).await;
        resolve_working_dir(roots.as_deref(), &self.settings.working_dir)
    }

    /// Ask the client for its declared roots. Any failure yields None.
    async fn client_roots(&self, peer: &Peer<RoleServer>) -> Option<Vec<String>> {
        let advertised = peer
            .peer_info()
            .is_some_and(|info| info.capabilities.roots.is_some());
        if !advertised {
            debug!("Client does not advertise roots");
            return None;
        }

        match tokio::time::timeout(self.settings.roots_timeout, peer.list_roots()).await {
            Ok(Ok(result)) => Some(result.roots.into_iter().map(|root| root.uri).collect()),
            Ok(Err(e)) => {
                debug!(error = %e, "roots/list failed");
                None
            }
            Err(_) => {
                debug!(timeout = ?self.settings.roots_timeout, "roots/list timed out");
                None
            }
        }
    }
}

/// Non-positive limits collapse to a single line per page
fn line_limit(n: i64) -> usize {
    usize::try_from(n.max(1)).unwrap_or(usize::MAX)
}

fn text_result(json: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(json)])
}

#[tool_router]
impl PrAgentServer {
    #[tool(
        description = "Get the full diff and list of changed files in the current git repository. Uses pagination to handle large diffs: when has_more_diff is true, call again with last_diff_index set to next_diff_index.",
        annotations(read_only_hint = true)
    )]
    async fn analyze_file_changes(
        &self,
        Parameters(req): Parameters<AnalyzeFileChangesRequest>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let working_dir = self.working_dir(&context.peer).await;
        let options = self.settings.analyze_options(
            req.base_branch,
            req.include_diff,
            req.max_diff_lines.map(line_limit),
            req.last_diff_index.map(DiffCursor::into_string),
        );

        let json = tools::analyze_file_changes(&self.git, &working_dir, &options).await;
        Ok(text_result(json))
    }

    #[tool(
        description = "List available PR templates with their content.",
        annotations(read_only_hint = true)
    )]
    async fn get_pr_templates(&self) -> Result<CallToolResult, McpError> {
        let json = tools::get_pr_templates(&self.settings.templates_dir).await;
        Ok(text_result(json))
    }

    #[tool(
        description = "Suggest the most appropriate PR template for changes you have already analyzed. Provide your own summary of the changes and the change type (bug, feature, docs, refactor, test, etc.).",
        annotations(read_only_hint = true)
    )]
    async fn suggest_template(
        &self,
        Parameters(req): Parameters<SuggestTemplateRequest>,
    ) -> Result<CallToolResult, McpError> {
        let json = tools::suggest_template(
            &self.settings.templates_dir,
            &req.changes_summary,
            &req.change_type,
        )
        .await;
        Ok(text_result(json))
    }
}

#[tool_handler]
impl ServerHandler for PrAgentServer {
    fn get_info(&self) -> ServerInfo {
        let instructions = "pr-agent helps write pull request descriptions for a local git repository.\n\
\n\
Recommended workflow:\n\
1. `analyze_file_changes` -> changed files and the first page of the diff against the base branch\n\
2. While `has_more_diff` is true, call it again with `last_diff_index` = `next_diff_index`\n\
3. `get_pr_templates` -> available templates\n\
4. `suggest_template` with your summary and the change type -> template to fill in\n\
\n\
The repository is the first root declared by the client, or the server's working directory.";

        ServerInfo {
            instructions: Some(instructions.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }
}
