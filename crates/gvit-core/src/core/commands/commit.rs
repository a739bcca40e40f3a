use anyhow::Result;
use gvit_domain::DriftState;
use serde_json::json;

use crate::core::commands::common::{validate_directory, validate_git_repository};
use crate::core::config::context::CommandContext;
use crate::core::runtime::process::RunOutput;
use crate::core::tooling::outcome::ExecutionOutcome;
use crate::core::tooling::prompt;

#[derive(Clone, Debug, Default)]
pub struct CommitRequest {
    pub target_dir: String,
    pub skip_validation: bool,
    pub git_args: Vec<String>,
}

/// Commits with dependency validation: the tracked groups are scanned for
/// drift first, and a drifted state needs an explicit go-ahead. Commit is a
/// gate (the human decides) where pull auto-remediates the same signal.
///
/// # Errors
/// Returns an error when validation or git fails.
pub fn commit(ctx: &CommandContext, request: &CommitRequest) -> Result<ExecutionOutcome> {
    let repo_path = validate_directory(&request.target_dir)?;
    validate_git_repository(ctx, &repo_path)?;

    let drift = if request.skip_validation {
        tracing::info!("skipping dependency validation");
        None
    } else {
        let registry = ctx.registry()?;
        let bindings = registry.find_by_repo_path(&repo_path)?;
        match bindings.first() {
            None => {
                tracing::warn!(
                    "no tracked environment for this repository, committing without validation (run `gvit setup` to track it)"
                );
                Some(DriftState::NoRecord)
            }
            Some(record) => Some(DriftState::scan(record, &record.deps)),
        }
    };

    if let Some(DriftState::Drifted { groups }) = &drift {
        tracing::warn!(
            "dependency drift detected in group(s): {}, the declared files changed since the last install",
            groups.join(", ")
        );
        let proceed = ctx.global.assume_yes
            || prompt::confirm("Continue with the commit anyway?", false);
        if !proceed {
            return Ok(ExecutionOutcome::user_error(
                "commit aborted: dependency drift detected (use --skip-validation to bypass)",
                json!({ "drift": groups }),
            ));
        }
    }
    if matches!(drift, Some(DriftState::UpToDate)) {
        tracing::info!("dependencies are in sync");
    }

    let output = ctx.git().commit(&repo_path, &request.git_args)?;
    Ok(commit_outcome(&output, drift.as_ref()))
}

fn commit_outcome(output: &RunOutput, drift: Option<&DriftState>) -> ExecutionOutcome {
    let summary = output.stdout.trim();
    let message = if summary.is_empty() {
        "commit successful".to_string()
    } else {
        format!("commit successful\n{summary}")
    };
    ExecutionOutcome::success(
        message,
        json!({
            "validated": matches!(drift, Some(DriftState::UpToDate)),
            "drift": match drift {
                Some(DriftState::Drifted { groups }) => groups.clone(),
                _ => Vec::new(),
            },
        }),
    )
}
