use std::path::{Path, PathBuf};

use anyhow::Result;
use gvit_domain::plan::BASE_GROUP;
use gvit_domain::{resolve_plan, BackendKind, DepsPlan, PlanInputs, RecordDraft, RepoConfig};
use indexmap::IndexMap;
use serde_json::{json, Value};

use crate::core::config::context::CommandContext;
use crate::core::config::settings::{DEFAULT_VENV_NAME, SUPPORTED_PYTHONS};
use crate::core::tooling::outcome::{ExecutionOutcome, ValidationError};

/// Flags shared by the clone/init/setup provisioning tail.
#[derive(Clone, Debug, Default)]
pub struct SetupOptions {
    pub venv_name: Option<String>,
    pub backend: Option<String>,
    pub python: Option<String>,
    pub base_deps: Option<String>,
    pub extra_deps: Option<String>,
    pub no_deps: bool,
    pub force: bool,
}

pub(crate) fn validate_directory(directory: &str) -> Result<PathBuf> {
    let path = Path::new(directory);
    if !path.exists() {
        return Err(ValidationError::new(format!("directory `{directory}` does not exist")).into());
    }
    path.canonicalize().map_err(|err| {
        ValidationError::new(format!("could not resolve directory `{directory}`: {err}")).into()
    })
}

pub(crate) fn validate_git_repository(ctx: &CommandContext, dir: &Path) -> Result<()> {
    if ctx.git().is_repository(dir) {
        Ok(())
    } else {
        Err(ValidationError::new(format!(
            "directory `{}` is not a Git repository",
            dir.display()
        ))
        .into())
    }
}

pub(crate) fn validate_python(version: &str) -> Result<()> {
    if SUPPORTED_PYTHONS.contains(&version) {
        Ok(())
    } else {
        Err(ValidationError::new(format!(
            "unsupported Python version `{version}` (supported: {})",
            SUPPORTED_PYTHONS.join(", ")
        ))
        .into())
    }
}

pub(crate) fn parse_backend(raw: &str) -> Result<BackendKind> {
    raw.parse::<BackendKind>()
        .map_err(|err| ValidationError::new(err.to_string()).into())
}

/// Validates the CLI-provided backend/python before any mutation; resolved
/// values from config layers are validated again at provisioning time.
pub(crate) fn validate_cli_choices(options: &SetupOptions) -> Result<()> {
    if let Some(backend) = &options.backend {
        parse_backend(backend)?;
    }
    if let Some(python) = &options.python {
        validate_python(python)?;
    }
    Ok(())
}

pub(crate) fn repo_dir_name(repo_path: &Path) -> String {
    repo_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("environment")
        .to_string()
}

/// Repository name implied by a clone URL, used as the default target dir.
pub(crate) fn repo_name_from_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let tail = trimmed
        .rsplit(|c| c == '/' || c == ':')
        .next()
        .unwrap_or(trimmed);
    tail.strip_suffix(".git").unwrap_or(tail).to_string()
}

/// Shared tail of clone/init/setup: create the environment, install the
/// resolved dependency plan, persist the registry record, and report.
pub(crate) fn provision(
    ctx: &CommandContext,
    repo_path: &Path,
    repo_url: &str,
    options: &SetupOptions,
) -> Result<ExecutionOutcome> {
    let repo_config = RepoConfig::load(repo_path)?;
    let user = ctx.user_config();

    let backend = match &options.backend {
        Some(raw) => parse_backend(raw)?,
        None => user.backend(),
    };
    let python = options
        .python
        .clone()
        .or_else(|| repo_config.python.clone())
        .unwrap_or_else(|| user.python());
    validate_python(&python)?;

    let adapter = ctx.backend(backend);
    let env_name = options.venv_name.clone().unwrap_or_else(|| {
        if backend == BackendKind::Conda {
            repo_dir_name(repo_path)
        } else {
            DEFAULT_VENV_NAME.to_string()
        }
    });

    tracing::info!(
        "creating {backend} environment `{env_name}` (Python {python}), this might take a while"
    );
    let created = adapter.create(&env_name, repo_path, &python, options.force)?;

    let registry = ctx.registry()?;
    let key = registry.unique_key(&repo_dir_name(repo_path));

    let mut warnings = Vec::new();
    let install = !options.no_deps && user.install_deps();
    let (deps, results) = if install {
        let resolved = resolve_plan(&PlanInputs {
            cli_base: options.base_deps.clone(),
            cli_extras: options.extra_deps.clone(),
            repo_base: repo_config.base_deps(),
            repo_extras: repo_config.extra_deps(),
            user_base: user.base_deps(),
            user_extras: user.extra_deps.clone(),
        });
        for warning in &resolved.warnings {
            tracing::warn!("{warning}");
        }
        warnings.extend(resolved.warnings);
        let results = install_plan(ctx, backend, &created.env_ref, repo_path, &resolved.plan);
        let deps = successful_groups(&resolved.plan, &results);
        (deps, results)
    } else {
        tracing::info!("skipping dependency installation");
        (IndexMap::new(), IndexMap::new())
    };

    let record = registry.save(&RecordDraft {
        key: key.clone(),
        backend,
        env_path: created.env_ref.clone(),
        python: python.clone(),
        created_at: None,
        repo_path: repo_path.to_path_buf(),
        repo_url: repo_url.to_string(),
        deps,
    })?;

    let activation = adapter.activation_command(&created.env_ref);
    let failed: Vec<&String> = results
        .iter()
        .filter(|(_, ok)| !**ok)
        .map(|(group, _)| group)
        .collect();
    let message = if failed.is_empty() {
        format!(
            "environment `{key}` ready -> cd {} && {activation}",
            repo_path.display()
        )
    } else {
        format!(
            "environment `{key}` ready, but {} dependency group(s) failed to install",
            failed.len()
        )
    };

    Ok(ExecutionOutcome::success(
        message,
        json!({
            "registry_key": key,
            "registry_file": registry.record_path(&key).display().to_string(),
            "environment": {
                "backend": backend.as_str(),
                "python": python,
                "path": created.env_ref,
            },
            "repository": {
                "path": repo_path.display().to_string(),
                "url": repo_url,
            },
            "groups": group_results_json(&results),
            "installed": record.installed.is_some(),
            "activation_command": activation,
            "warnings": warnings,
        }),
    ))
}

/// Installs every group of the plan, one backend call per group (one call
/// total in manifest mode). A failing group never aborts its siblings.
pub(crate) fn install_plan(
    ctx: &CommandContext,
    backend: BackendKind,
    env_ref: &str,
    repo_path: &Path,
    plan: &DepsPlan,
) -> IndexMap<String, bool> {
    let adapter = ctx.backend(backend);
    let mut results = IndexMap::new();
    match plan {
        DepsPlan::Manifest { path, extras } => {
            tracing::info!(
                "installing project from {path}{}",
                if extras.is_empty() {
                    String::new()
                } else {
                    format!(" (extras: {})", extras.join(","))
                }
            );
            let ok = adapter.install(env_ref, repo_path, BASE_GROUP, path, extras);
            results.insert(BASE_GROUP.to_string(), ok);
            for extra in extras {
                results.insert(extra.clone(), ok);
            }
        }
        DepsPlan::Files { groups } => {
            for group in groups {
                let ok = adapter.install(env_ref, repo_path, &group.name, &group.path, &[]);
                results.insert(group.name.clone(), ok);
            }
        }
    }
    results
}

/// Group map to persist: only groups that actually installed keep their
/// declaration, so failed groups are re-detected on the next scan.
pub(crate) fn successful_groups(
    plan: &DepsPlan,
    results: &IndexMap<String, bool>,
) -> IndexMap<String, String> {
    plan.group_paths()
        .into_iter()
        .filter(|(group, _)| results.get(group).copied().unwrap_or(false))
        .collect()
}

pub(crate) fn group_results_json(results: &IndexMap<String, bool>) -> Value {
    let mut map = serde_json::Map::new();
    for (group, ok) in results {
        map.insert(group.clone(), Value::Bool(*ok));
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_name_from_common_url_shapes() {
        assert_eq!(repo_name_from_url("https://github.com/acme/demo.git"), "demo");
        assert_eq!(repo_name_from_url("git@github.com:acme/demo.git"), "demo");
        assert_eq!(repo_name_from_url("https://github.com/acme/demo/"), "demo");
        assert_eq!(repo_name_from_url("demo"), "demo");
    }

    #[test]
    fn missing_directory_is_a_validation_error() {
        let err = validate_directory("/definitely/not/here").unwrap_err();
        assert!(err.downcast_ref::<ValidationError>().is_some());
    }

    #[test]
    fn python_validation_uses_the_supported_list() {
        assert!(validate_python("3.11").is_ok());
        assert!(validate_python("2.7").is_err());
    }

    #[test]
    fn failed_groups_are_dropped_from_the_record() {
        let plan = DepsPlan::Files {
            groups: vec![
                gvit_domain::DependencyGroup {
                    name: "base".into(),
                    path: "requirements.txt".into(),
                },
                gvit_domain::DependencyGroup {
                    name: "dev".into(),
                    path: "requirements-dev.txt".into(),
                },
            ],
        };
        let mut results = IndexMap::new();
        results.insert("base".to_string(), true);
        results.insert("dev".to_string(), false);
        let kept = successful_groups(&plan, &results);
        assert!(kept.contains_key("base"));
        assert!(!kept.contains_key("dev"));
    }
}
