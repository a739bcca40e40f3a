use anyhow::Result;

use crate::core::commands::common::{
    provision, validate_cli_choices, validate_directory, SetupOptions,
};
use crate::core::config::context::CommandContext;
use crate::core::tooling::outcome::ExecutionOutcome;

#[derive(Clone, Debug, Default)]
pub struct InitRequest {
    pub directory: String,
    pub remote_url: Option<String>,
    pub options: SetupOptions,
    pub git_args: Vec<String>,
}

/// Initializes a Git repository and provisions its environment.
///
/// # Errors
/// Returns an error when validation, git, or environment creation fails.
pub fn init(ctx: &CommandContext, request: &InitRequest) -> Result<ExecutionOutcome> {
    validate_cli_choices(&request.options)?;
    let repo_path = validate_directory(&request.directory)?;

    tracing::info!("initializing Git repository in {}", repo_path.display());
    ctx.git().init_repo(&repo_path, &request.git_args)?;

    let mut repo_url = String::new();
    if let Some(remote) = &request.remote_url {
        tracing::info!("adding remote origin {remote}");
        ctx.git().add_remote(&repo_path, remote)?;
        repo_url = remote.clone();
    }

    provision(ctx, &repo_path, &repo_url, &request.options)
}
