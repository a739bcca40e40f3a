use std::path::Path;

use anyhow::Result;
use gvit_domain::plan::{BASE_GROUP, FALLBACK_BASE_DEPS, PROJECT_MANIFEST};
use gvit_domain::{
    modified_groups, resolve_plan, DependencyGroup, DepsPlan, PlanInputs, RecordDraft,
    RegistryRecord, RepoConfig,
};
use indexmap::IndexMap;
use serde_json::json;

use crate::core::commands::common::{
    group_results_json, install_plan, validate_directory, validate_git_repository,
};
use crate::core::config::context::CommandContext;
use crate::core::config::settings::UserConfig;
use crate::core::tooling::outcome::ExecutionOutcome;

#[derive(Clone, Debug, Default)]
pub struct PullRequest {
    pub directory: String,
    pub base_deps: Option<String>,
    pub extra_deps: Option<String>,
    pub no_deps: bool,
    pub force_deps: bool,
    pub git_args: Vec<String>,
}

/// Pulls from the remote and reconciles the environment: detects drifted
/// dependency groups by fingerprint and reinstalls exactly those.
///
/// # Errors
/// Returns an error when validation or git fails.
pub fn pull(ctx: &CommandContext, request: &PullRequest) -> Result<ExecutionOutcome> {
    let repo_path = validate_directory(&request.directory)?;
    validate_git_repository(ctx, &repo_path)?;

    let registry = ctx.registry()?;
    let mut bindings = registry.find_by_repo_path(&repo_path)?;
    if bindings.len() > 1 {
        tracing::warn!(
            "{} registry records bound to {}, using `{}`",
            bindings.len(),
            repo_path.display(),
            bindings[0].key()
        );
    }
    let Some(record) = bindings.drain(..).next() else {
        tracing::warn!("no tracked environment for this repository (run `gvit setup`)");
        ctx.git().pull(&repo_path, &request.git_args)?;
        return Ok(ExecutionOutcome::success(
            "repository updated (no tracked environment, dependencies not checked)",
            json!({ "tracked": false }),
        ));
    };

    tracing::info!("pulling changes into {}", repo_path.display());
    ctx.git().pull(&repo_path, &request.git_args)?;

    if request.no_deps {
        return Ok(ExecutionOutcome::success(
            "repository updated (dependency check skipped)",
            json!({ "tracked": true, "checked": false }),
        ));
    }

    let repo_config = RepoConfig::load(&repo_path)?;
    let plan = current_plan(request, &repo_config, &record, ctx.user_config());
    let plan_groups = plan.group_paths();

    let changed = if request.force_deps {
        plan_groups.keys().cloned().collect::<Vec<_>>()
    } else {
        modified_groups(record.installed.as_ref(), &plan_groups, &repo_path)
    };
    if changed.is_empty() {
        return Ok(ExecutionOutcome::success(
            "repository updated, dependencies are up to date",
            json!({ "tracked": true, "drift": [] }),
        ));
    }

    if request.force_deps {
        tracing::info!("force reinstalling all dependency groups");
    } else {
        tracing::info!("dependency changes detected: {}", changed.join(", "));
    }
    let results = reinstall(ctx, &record, &repo_path, &plan, &changed);

    // refresh fingerprints; groups that failed to reinstall are dropped so
    // the next scan re-detects them
    let deps: IndexMap<String, String> = plan_groups
        .iter()
        .filter(|(group, _)| results.get(*group).copied().unwrap_or(true))
        .map(|(group, declared)| (group.clone(), declared.clone()))
        .collect();
    // a remote configured after setup fills the recorded URL in lazily
    let repo_url = if record.repository.url.is_empty() {
        ctx.git().remote_url(&repo_path)
    } else {
        record.repository.url.clone()
    };
    registry.save(&RecordDraft {
        key: record.environment.name.clone(),
        backend: record.environment.backend,
        env_path: record.environment.path.clone(),
        python: record.environment.python.clone(),
        created_at: Some(record.environment.created_at.clone()),
        repo_path: repo_path.clone(),
        repo_url,
        deps,
    })?;

    let failed: Vec<&String> = results
        .iter()
        .filter(|(_, ok)| !**ok)
        .map(|(group, _)| group)
        .collect();
    let message = if failed.is_empty() {
        format!(
            "repository and dependencies updated ({} group(s) reinstalled)",
            results.len()
        )
    } else {
        format!(
            "repository updated, but {} dependency group(s) failed to reinstall",
            failed.len()
        )
    };
    Ok(ExecutionOutcome::success(
        message,
        json!({
            "tracked": true,
            "drift": changed,
            "groups": group_results_json(&results),
        }),
    ))
}

/// The plan drift is checked against: CLI overrides win, then repository
/// declarations, then whatever the registry already tracks, then user
/// defaults. Record-sourced extras keep their recorded paths unless the
/// repository config re-declares the same group.
fn current_plan(
    request: &PullRequest,
    repo_config: &RepoConfig,
    record: &RegistryRecord,
    user: &UserConfig,
) -> DepsPlan {
    let base = request
        .base_deps
        .clone()
        .or_else(|| repo_config.base_deps())
        .or_else(|| record.deps.get(BASE_GROUP).cloned())
        .or_else(|| user.base_deps())
        .unwrap_or_else(|| FALLBACK_BASE_DEPS.to_string());

    let manifest = Path::new(&base)
        .file_name()
        .is_some_and(|name| name == PROJECT_MANIFEST);

    if let Some(requested) = &request.extra_deps {
        let resolved = resolve_plan(&PlanInputs {
            cli_base: Some(base),
            cli_extras: Some(requested.clone()),
            repo_extras: repo_config.extra_deps(),
            user_extras: user.extra_deps.clone(),
            ..PlanInputs::default()
        });
        for warning in &resolved.warnings {
            tracing::warn!("{warning}");
        }
        return resolved.plan;
    }

    let tracked_extras = record.extra_deps();
    if manifest {
        return DepsPlan::Manifest {
            path: base,
            extras: tracked_extras.keys().cloned().collect(),
        };
    }
    let mut groups = vec![DependencyGroup {
        name: BASE_GROUP.to_string(),
        path: base,
    }];
    let repo_extras = repo_config.extra_deps();
    for (name, path) in tracked_extras {
        let path = repo_extras.get(&name).cloned().unwrap_or(path);
        groups.push(DependencyGroup { name, path });
    }
    DepsPlan::Files { groups }
}

/// Reinstalls only the changed groups (the whole manifest install when any
/// of its groups drifted).
fn reinstall(
    ctx: &CommandContext,
    record: &RegistryRecord,
    repo_path: &Path,
    plan: &DepsPlan,
    changed: &[String],
) -> IndexMap<String, bool> {
    let backend = record.environment.backend;
    let env_ref = &record.environment.path;
    match plan {
        DepsPlan::Manifest { .. } => install_plan(ctx, backend, env_ref, repo_path, plan),
        DepsPlan::Files { groups } => {
            let subset = DepsPlan::Files {
                groups: groups
                    .iter()
                    .filter(|group| changed.contains(&group.name))
                    .cloned()
                    .collect(),
            };
            install_plan(ctx, backend, env_ref, repo_path, &subset)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gvit_domain::{BackendKind, EnvironmentInfo, InstalledState, RepositoryInfo};
    use std::path::PathBuf;

    fn record_with_deps(deps: &[(&str, &str)]) -> RegistryRecord {
        RegistryRecord {
            environment: EnvironmentInfo {
                name: "demo".into(),
                backend: BackendKind::Venv,
                path: "/repo/.venv".into(),
                python: "3.11".into(),
                created_at: "2026-01-01T00:00:00Z".into(),
            },
            repository: RepositoryInfo {
                path: PathBuf::from("/repo"),
                url: String::new(),
            },
            deps: deps
                .iter()
                .map(|(name, path)| ((*name).to_string(), (*path).to_string()))
                .collect(),
            installed: Some(InstalledState {
                hashes: IndexMap::new(),
                installed_at: "2026-01-01T00:00:00Z".into(),
            }),
        }
    }

    #[test]
    fn record_groups_back_the_plan_when_nothing_is_requested() {
        let request = PullRequest::default();
        let record = record_with_deps(&[("base", "reqs.txt"), ("dev", "reqs-dev.txt")]);
        let plan = current_plan(&request, &RepoConfig::default(), &record, &UserConfig::default());
        let DepsPlan::Files { groups } = plan else {
            panic!("expected file plan");
        };
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].path, "reqs.txt");
        assert_eq!(groups[1].path, "reqs-dev.txt");
    }

    #[test]
    fn repo_config_refreshes_recorded_paths() {
        let request = PullRequest::default();
        let record = record_with_deps(&[("base", "old.txt"), ("dev", "old-dev.txt")]);
        let mut repo_config = RepoConfig::default();
        repo_config.deps.insert("base".into(), "new.txt".into());
        repo_config.deps.insert("dev".into(), "new-dev.txt".into());
        let plan = current_plan(&request, &repo_config, &record, &UserConfig::default());
        let DepsPlan::Files { groups } = plan else {
            panic!("expected file plan");
        };
        assert_eq!(groups[0].path, "new.txt");
        assert_eq!(groups[1].path, "new-dev.txt");
    }

    #[test]
    fn cli_base_override_wins_over_everything() {
        let request = PullRequest {
            base_deps: Some("cli.txt".into()),
            ..PullRequest::default()
        };
        let record = record_with_deps(&[("base", "recorded.txt")]);
        let mut repo_config = RepoConfig::default();
        repo_config.deps.insert("base".into(), "repo.txt".into());
        let plan = current_plan(&request, &repo_config, &record, &UserConfig::default());
        let DepsPlan::Files { groups } = plan else {
            panic!("expected file plan");
        };
        assert_eq!(groups[0].path, "cli.txt");
    }

    #[test]
    fn manifest_base_keeps_tracked_extras_as_feature_flags() {
        let request = PullRequest::default();
        let record = record_with_deps(&[("base", "pyproject.toml"), ("dev", "pyproject.toml")]);
        let plan = current_plan(&request, &RepoConfig::default(), &record, &UserConfig::default());
        let DepsPlan::Manifest { path, extras } = plan else {
            panic!("expected manifest plan");
        };
        assert_eq!(path, "pyproject.toml");
        assert_eq!(extras, vec!["dev".to_string()]);
    }
}
