use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use gvit_domain::BackendKind;

use crate::core::python::find_python_command;
use crate::core::runtime::effects::EnvBackend;
use crate::core::runtime::process::run_command;
use crate::core::tooling::outcome::BackendOperationError;

use super::{
    activation_snippet, confirm_replace, ensure_gitignore, pip_executable, run_group_install,
    valid_env_dir, CreatedEnv,
};

/// `python -m venv` backend: the environment lives inside the repository.
pub struct VenvBackend;

impl EnvBackend for VenvBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Venv
    }

    fn create(
        &self,
        name: &str,
        repo_path: &Path,
        python: &str,
        force: bool,
    ) -> Result<CreatedEnv> {
        let env_path = repo_path.join(name);
        if valid_env_dir(&env_path) {
            confirm_replace(&format!("environment `{name}`"), force)?;
            self.delete(&env_path.display().to_string())?;
        }

        let interpreter = find_python_command(python)?;
        let args = vec![
            "-m".to_string(),
            "venv".to_string(),
            env_path.display().to_string(),
        ];
        let output = run_command(&interpreter, &args, None)?;
        if !output.success() {
            return Err(BackendOperationError::new(
                format!("creating venv `{name}` failed"),
                output.diagnostic(),
            )
            .into());
        }
        ensure_gitignore(name, repo_path);
        Ok(CreatedEnv {
            env_ref: env_path.display().to_string(),
        })
    }

    fn env_exists(&self, env_ref: &str) -> bool {
        valid_env_dir(Path::new(env_ref))
    }

    fn delete(&self, env_ref: &str) -> Result<()> {
        let env_path = Path::new(env_ref);
        if !env_path.exists() {
            return Ok(());
        }
        fs::remove_dir_all(env_path)
            .with_context(|| format!("removing environment directory {env_ref}"))
    }

    fn install(
        &self,
        env_ref: &str,
        repo_path: &Path,
        group: &str,
        declared: &str,
        extras: &[String],
    ) -> bool {
        let pip = pip_executable(Path::new(env_ref)).display().to_string();
        run_group_install(&pip, &[], repo_path, group, declared, extras)
    }

    fn activation_command(&self, env_ref: &str) -> String {
        let name = Path::new(env_ref)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(env_ref);
        activation_snippet(name)
    }
}
