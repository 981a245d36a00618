mod analysis;
mod workdir;

pub use analysis::{
    analyze_changes, AnalysisResult, AnalyzeOptions, ChangeAnalysis, DiffPage,
    DEFAULT_BASE_BRANCH, DEFAULT_MAX_DIFF_LINES,
};
pub use workdir::{default_working_dir, resolve_working_dir, root_uri_to_path};
