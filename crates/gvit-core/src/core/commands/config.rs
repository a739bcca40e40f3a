use anyhow::Result;
use serde_json::json;

use crate::core::commands::common::{parse_backend, validate_python};
use crate::core::config::context::CommandContext;
use crate::core::config::settings::UserConfig;
use crate::core::tooling::outcome::ExecutionOutcome;

#[derive(Clone, Debug, Default)]
pub struct ConfigUpdates {
    pub backend: Option<String>,
    pub python: Option<String>,
    pub install_deps: Option<bool>,
    pub deps_path: Option<String>,
    pub verbose: Option<bool>,
    pub conda_path: Option<String>,
}

#[derive(Clone, Debug)]
pub enum ConfigAction {
    Show,
    Path,
    Set(ConfigUpdates),
}

#[derive(Clone, Debug)]
pub struct ConfigRequest {
    pub action: ConfigAction,
}

/// Inspects or updates the user-level defaults file.
///
/// # Errors
/// Returns an error when the config file cannot be read or written.
pub fn config(ctx: &CommandContext, request: &ConfigRequest) -> Result<ExecutionOutcome> {
    let path = ctx.config_file();
    match &request.action {
        ConfigAction::Path => Ok(ExecutionOutcome::success(
            path.display().to_string(),
            json!({ "path": path.display().to_string() }),
        )),
        ConfigAction::Show => {
            let rendered = ctx.user_config().render();
            Ok(ExecutionOutcome::success(
                format!("{}\n\n{}", path.display(), rendered.trim_end()),
                json!({
                    "path": path.display().to_string(),
                    "defaults": {
                        "backend": ctx.user_config().backend().as_str(),
                        "python": ctx.user_config().python(),
                        "install_deps": ctx.user_config().install_deps(),
                        "deps_path": ctx.user_config().base_deps(),
                        "verbose": ctx.user_config().verbose(),
                    },
                }),
            ))
        }
        ConfigAction::Set(updates) => {
            let mut config = UserConfig::load(&path)?;
            apply_updates(&mut config, updates)?;
            config.save(&path)?;
            Ok(ExecutionOutcome::success(
                format!("configuration saved -> {}", path.display()),
                json!({ "path": path.display().to_string() }),
            ))
        }
    }
}

fn apply_updates(config: &mut UserConfig, updates: &ConfigUpdates) -> Result<()> {
    if let Some(backend) = &updates.backend {
        config.defaults.backend = Some(parse_backend(backend)?);
    }
    if let Some(python) = &updates.python {
        validate_python(python)?;
        config.defaults.python = Some(python.clone());
    }
    if let Some(install_deps) = updates.install_deps {
        config.defaults.install_deps = Some(install_deps);
    }
    if let Some(deps_path) = &updates.deps_path {
        config.defaults.deps_path = Some(deps_path.clone());
    }
    if let Some(verbose) = updates.verbose {
        config.defaults.verbose = Some(verbose);
    }
    if let Some(conda_path) = &updates.conda_path {
        config.conda_path = Some(conda_path.clone());
    }
    Ok(())
}
