use anyhow::Result;

use crate::core::commands::common::{
    provision, validate_cli_choices, validate_directory, validate_git_repository, SetupOptions,
};
use crate::core::config::context::CommandContext;
use crate::core::tooling::outcome::ExecutionOutcome;

#[derive(Clone, Debug, Default)]
pub struct SetupRequest {
    pub directory: String,
    pub options: SetupOptions,
}

/// Provisions an environment for an already-cloned repository. The remote
/// URL is read from the repository itself.
///
/// # Errors
/// Returns an error when validation or environment creation fails.
pub fn setup(ctx: &CommandContext, request: &SetupRequest) -> Result<ExecutionOutcome> {
    validate_cli_choices(&request.options)?;
    let repo_path = validate_directory(&request.directory)?;
    validate_git_repository(ctx, &repo_path)?;

    let repo_url = ctx.git().remote_url(&repo_path);
    provision(ctx, &repo_path, &repo_url, &request.options)
}
