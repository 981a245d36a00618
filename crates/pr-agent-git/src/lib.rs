//! # pr-agent-git
//!
//! Git operations for pr-agent.
//!
//! This crate shells out to the `git` binary to describe how a working
//! tree differs from a base reference, and cuts the resulting unified diff
//! into pages small enough for a caller with a limited input budget.
//!
//! ## Key Types
//!
//! - [`GitRunner`] - Seam for running git subcommands
//! - [`GitCli`] - Subprocess implementation with an optional timeout
//! - [`ChangedFile`] - One `--name-status` record
//! - [`DiffWindow`] - One page of the diff plus its continuation cursor
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pr_agent_git::{fetch_diff, list_changes, paginate, GitCli, TruncationPolicy};
//! use std::path::Path;
//!
//! let git = GitCli::new();
//! let files = list_changes(&git, "main", Path::new(".")).await?;
//! let diff = fetch_diff(&git, "main", Path::new(".")).await?;
//!
//! let page = paginate(&diff, 0, 500, TruncationPolicy::default());
//! println!("{} of {} lines", page.shown_count(), page.total_count);
//! ```
//!
//! ## Pagination
//!
//! Windows are recomputed from a fresh diff on every call. The cursor is a
//! plain line offset; if the repository changes between calls the cursor
//! may skip or repeat lines.

mod diff;
mod runner;
mod status;

pub use diff::{fetch_diff, paginate, parse_cursor, DiffWindow, TruncationPolicy};
pub use runner::{GitCli, GitError, GitOutput, GitRunner};
pub use status::{list_changes, parse_name_status, ChangedFile};
