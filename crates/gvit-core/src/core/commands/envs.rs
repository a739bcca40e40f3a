use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use gvit_domain::{DepsPlan, EnvRegistry, RecordDraft, RegistryRecord};
use serde_json::{json, Value};

use crate::core::commands::common::install_plan;
use crate::core::config::context::CommandContext;
use crate::core::tooling::outcome::ExecutionOutcome;
use crate::core::tooling::prompt;

#[derive(Clone, Debug, Default)]
pub struct EnvsShowRequest {
    pub name: String,
}

#[derive(Clone, Debug, Default)]
pub struct EnvsDeleteRequest {
    pub name: String,
}

#[derive(Clone, Debug, Default)]
pub struct EnvsPruneRequest {
    pub dry_run: bool,
    pub yes: bool,
}

#[derive(Clone, Debug, Default)]
pub struct EnvsResetRequest {
    pub name: String,
    pub no_deps: bool,
    pub yes: bool,
}

/// Lists every tracked environment. Corrupt records are skipped with a
/// warning so one bad file never hides the rest.
///
/// # Errors
/// Returns an error when the registry directory cannot be read.
pub fn envs_list(ctx: &CommandContext) -> Result<ExecutionOutcome> {
    let registry = ctx.registry()?;
    let scan = registry.scan()?;
    for (key, reason) in &scan.corrupt {
        tracing::warn!("skipping corrupt registry record `{key}`: {reason}");
    }
    if scan.records.is_empty() {
        return Ok(ExecutionOutcome::success(
            "no environments in registry",
            json!({ "environments": [], "skipped": corrupt_json(&scan.corrupt) }),
        ));
    }

    let environments: Vec<Value> = scan
        .records
        .iter()
        .map(|record| record_json(ctx, &registry, record))
        .collect();
    Ok(ExecutionOutcome::success(
        format!("{} tracked environment(s)", environments.len()),
        json!({ "environments": environments, "skipped": corrupt_json(&scan.corrupt) }),
    ))
}

/// Displays one registry record verbatim. Fails fast on corrupt content.
///
/// # Errors
/// Returns an error when the record is malformed or unreadable.
pub fn envs_show(ctx: &CommandContext, request: &EnvsShowRequest) -> Result<ExecutionOutcome> {
    let registry = ctx.registry()?;
    let Some(record) = registry.load(&request.name)? else {
        return Ok(ExecutionOutcome::user_error(
            format!("environment `{}` not found in registry", request.name),
            json!({}),
        ));
    };
    let path = registry.record_path(&request.name);
    let contents =
        fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    Ok(ExecutionOutcome::success(
        format!("{}\n\n{}", path.display(), contents.trim_end()),
        record_json(ctx, &registry, &record),
    ))
}

/// Removes an environment, backend first. When the backend deletion fails
/// the registry entry is kept: the registry must never claim an environment
/// was removed while its backend state is unknown.
///
/// # Errors
/// Returns an error when the record is malformed or the registry entry
/// cannot be removed.
pub fn envs_delete(ctx: &CommandContext, request: &EnvsDeleteRequest) -> Result<ExecutionOutcome> {
    let registry = ctx.registry()?;
    let Some(record) = registry.load(&request.name)? else {
        return Ok(ExecutionOutcome::user_error(
            format!("environment `{}` not found in registry", request.name),
            json!({}),
        ));
    };

    let adapter = ctx.backend(record.environment.backend);
    if adapter.env_exists(&record.environment.path) {
        if let Err(err) = adapter.delete(&record.environment.path) {
            return Ok(ExecutionOutcome::failure(
                format!(
                    "backend deletion failed for `{}`; registry entry kept",
                    request.name
                ),
                json!({ "diagnostic": format!("{err:#}") }),
            ));
        }
    } else {
        tracing::warn!("environment not found in backend, removing registry entry only");
    }

    registry.delete(&request.name)?;
    Ok(ExecutionOutcome::success(
        format!("environment `{}` removed", request.name),
        json!({ "deleted": request.name }),
    ))
}

/// Prunes environments whose repository path no longer exists. Dry run
/// lists candidates and performs zero deletions; the confirmation fails
/// closed outside a tty.
///
/// # Errors
/// Returns an error when the registry directory cannot be read.
pub fn envs_prune(ctx: &CommandContext, request: &EnvsPruneRequest) -> Result<ExecutionOutcome> {
    let registry = ctx.registry()?;
    let scan = registry.scan()?;
    for (key, reason) in &scan.corrupt {
        tracing::warn!("skipping corrupt registry record `{key}`: {reason}");
    }
    let orphaned: Vec<&RegistryRecord> = scan
        .records
        .iter()
        .filter(|record| !record.repository.path.exists())
        .collect();
    if orphaned.is_empty() {
        return Ok(ExecutionOutcome::success(
            "no orphaned environments found",
            json!({ "orphaned": [] }),
        ));
    }

    let listed: Vec<Value> = orphaned
        .iter()
        .map(|record| {
            json!({
                "name": record.key(),
                "backend": record.environment.backend.as_str(),
                "repository": record.repository.path.display().to_string(),
            })
        })
        .collect();
    if request.dry_run {
        return Ok(ExecutionOutcome::success(
            format!(
                "{} orphaned environment(s) found (dry run, nothing deleted)",
                orphaned.len()
            ),
            json!({ "orphaned": listed, "dry_run": true }),
        ));
    }

    let confirmed = request.yes
        || ctx.global.assume_yes
        || prompt::confirm(
            &format!("Delete {} orphaned environment(s)?", orphaned.len()),
            false,
        );
    if !confirmed {
        return Ok(ExecutionOutcome::user_error(
            "prune aborted",
            json!({ "orphaned": listed }),
        ));
    }

    let mut pruned = Vec::new();
    let mut kept = Vec::new();
    for record in orphaned {
        let key = record.key().to_string();
        let adapter = ctx.backend(record.environment.backend);
        if record.environment.backend.is_repo_local() {
            // the environment lived inside the now-deleted repository
            tracing::info!("`{key}`: repository deleted, backend already gone");
        } else if adapter.env_exists(&record.environment.path) {
            if let Err(err) = adapter.delete(&record.environment.path) {
                tracing::warn!("`{key}`: backend deletion failed, keeping registry entry: {err:#}");
                kept.push(key);
                continue;
            }
        }
        match registry.delete(&key) {
            Ok(_) => pruned.push(key),
            Err(err) => {
                tracing::warn!("`{key}`: registry deletion failed: {err:#}");
                kept.push(key);
            }
        }
    }

    Ok(ExecutionOutcome::success(
        format!("pruned {} environment(s)", pruned.len()),
        json!({ "pruned": pruned, "kept": kept }),
    ))
}

/// Recreates an environment and reinstalls its tracked dependency groups,
/// preserving the registry entry and its creation timestamp.
///
/// # Errors
/// Returns an error when the record is malformed or recreation fails.
pub fn envs_reset(ctx: &CommandContext, request: &EnvsResetRequest) -> Result<ExecutionOutcome> {
    let registry = ctx.registry()?;
    let Some(record) = registry.load(&request.name)? else {
        return Ok(ExecutionOutcome::user_error(
            format!("environment `{}` not found in registry", request.name),
            json!({}),
        ));
    };
    let repo_path = record.repository.path.clone();
    if !repo_path.exists() {
        return Ok(ExecutionOutcome::user_error(
            format!(
                "repository path {} no longer exists (run `gvit envs prune`)",
                repo_path.display()
            ),
            json!({}),
        ));
    }

    let confirmed = request.yes
        || ctx.global.assume_yes
        || prompt::confirm(
            &format!("Reset environment `{}` (recreate and reinstall)?", request.name),
            false,
        );
    if !confirmed {
        return Ok(ExecutionOutcome::user_error("reset aborted", json!({})));
    }

    let adapter = ctx.backend(record.environment.backend);
    let env_name = env_display_name(&record);
    if adapter.env_exists(&record.environment.path) {
        adapter.delete(&record.environment.path)?;
    }
    let created = adapter.create(&env_name, &repo_path, &record.environment.python, true)?;

    let draft = RecordDraft {
        key: record.environment.name.clone(),
        backend: record.environment.backend,
        env_path: created.env_ref.clone(),
        python: record.environment.python.clone(),
        created_at: Some(record.environment.created_at.clone()),
        repo_path: repo_path.clone(),
        repo_url: record.repository.url.clone(),
        deps: record.deps.clone(),
    };

    if request.no_deps || record.deps.is_empty() {
        // nothing was installed into the fresh environment, so the record
        // keeps its groups but no fingerprints
        registry.save_cleared(&draft)?;
        return Ok(ExecutionOutcome::success(
            format!("environment `{}` reset (dependencies not installed)", request.name),
            json!({ "reinstalled": false }),
        ));
    }

    let plan = DepsPlan::Files {
        groups: record
            .deps
            .iter()
            .map(|(name, path)| gvit_domain::DependencyGroup {
                name: name.clone(),
                path: path.clone(),
            })
            .collect(),
    };
    let results = install_plan(
        ctx,
        record.environment.backend,
        &created.env_ref,
        &repo_path,
        &plan,
    );
    let mut draft = draft;
    draft.deps = record
        .deps
        .iter()
        .filter(|(group, _)| results.get(*group).copied().unwrap_or(false))
        .map(|(group, path)| (group.clone(), path.clone()))
        .collect();
    registry.save(&draft)?;

    Ok(ExecutionOutcome::success(
        format!("environment `{}` reset", request.name),
        json!({
            "reinstalled": true,
            "groups": crate::core::commands::common::group_results_json(&results),
        }),
    ))
}

fn env_display_name(record: &RegistryRecord) -> String {
    if record.environment.backend.is_repo_local() {
        Path::new(&record.environment.path)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&record.environment.path)
            .to_string()
    } else {
        record.environment.path.clone()
    }
}

fn record_json(ctx: &CommandContext, registry: &EnvRegistry, record: &RegistryRecord) -> Value {
    let adapter = ctx.backend(record.environment.backend);
    json!({
        "name": record.key(),
        "backend": record.environment.backend.as_str(),
        "python": record.environment.python,
        "environment": record.environment.path,
        "created_at": record.environment.created_at,
        "repository": {
            "path": record.repository.path.display().to_string(),
            "url": record.repository.url,
        },
        "deps": record.deps,
        "installed": record.installed.as_ref().map(|state| json!({
            "hashes": state.hashes,
            "installed_at": state.installed_at,
        })),
        "registry_file": registry.record_path(record.key()).display().to_string(),
        "activation_command": format!(
            "cd {} && {}",
            record.repository.path.display(),
            adapter.activation_command(&record.environment.path)
        ),
    })
}

fn corrupt_json(corrupt: &[(String, String)]) -> Value {
    Value::Array(
        corrupt
            .iter()
            .map(|(key, reason)| json!({ "name": key, "error": reason }))
            .collect(),
    )
}
