use std::path::Path;

use anyhow::Result;

use crate::core::commands::common::{
    provision, repo_name_from_url, validate_cli_choices, SetupOptions,
};
use crate::core::config::context::CommandContext;
use crate::core::tooling::outcome::ExecutionOutcome;

#[derive(Clone, Debug, Default)]
pub struct CloneRequest {
    pub url: String,
    pub target_dir: Option<String>,
    pub options: SetupOptions,
    pub git_args: Vec<String>,
}

/// Clones a repository and provisions its environment in one step.
///
/// # Errors
/// Returns an error when validation, git, or environment creation fails.
pub fn clone(ctx: &CommandContext, request: &CloneRequest) -> Result<ExecutionOutcome> {
    validate_cli_choices(&request.options)?;

    let target = request
        .target_dir
        .clone()
        .unwrap_or_else(|| repo_name_from_url(&request.url));
    tracing::info!("cloning {} into {target}", request.url);
    ctx.git()
        .clone_repo(&request.url, Path::new(&target), &request.git_args)?;

    let repo_path = Path::new(&target).canonicalize()?;
    provision(ctx, &repo_path, &request.url, &request.options)
}
