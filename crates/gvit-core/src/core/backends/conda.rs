use std::path::{Path, PathBuf};

use anyhow::Result;
use gvit_domain::BackendKind;
use serde_json::Value;

use crate::core::runtime::effects::EnvBackend;
use crate::core::runtime::process::run_command;
use crate::core::tooling::outcome::BackendOperationError;

use super::{confirm_replace, run_group_install, CreatedEnv};

/// Conda backend: environments are named, not repo-local, and every
/// operation goes through the conda executable.
pub struct CondaBackend {
    program: String,
}

impl CondaBackend {
    /// Locates the conda executable: explicit user-config path first, then
    /// PATH, then the usual install locations, falling back to the bare
    /// name so errors mention the command that was attempted.
    #[must_use]
    pub fn discover(configured: Option<&str>) -> Self {
        if let Some(path) = configured {
            return Self {
                program: path.to_string(),
            };
        }
        if let Ok(found) = which::which("conda") {
            return Self {
                program: found.display().to_string(),
            };
        }
        for candidate in candidate_paths() {
            if candidate.exists() {
                return Self {
                    program: candidate.display().to_string(),
                };
            }
        }
        Self {
            program: "conda".to_string(),
        }
    }

    fn run(&self, args: Vec<String>, cwd: Option<&Path>, what: &str) -> Result<String> {
        let output = run_command(&self.program, &args, cwd)?;
        if output.success() {
            Ok(output.stdout)
        } else {
            Err(BackendOperationError::new(format!("{what} failed"), output.diagnostic()).into())
        }
    }
}

fn candidate_paths() -> Vec<PathBuf> {
    let Some(home) = dirs_next::home_dir() else {
        return Vec::new();
    };
    let roots = [
        home.join("anaconda3"),
        home.join("miniconda3"),
        home.join("miniforge3"),
        PathBuf::from("/opt/anaconda3"),
        PathBuf::from("/opt/miniconda3"),
        PathBuf::from("/opt/miniforge3"),
    ];
    roots
        .iter()
        .map(|root| {
            if cfg!(windows) {
                root.join("Scripts").join("conda.exe")
            } else {
                root.join("bin").join("conda")
            }
        })
        .collect()
}

impl EnvBackend for CondaBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Conda
    }

    fn create(
        &self,
        name: &str,
        _repo_path: &Path,
        python: &str,
        force: bool,
    ) -> Result<CreatedEnv> {
        if self.env_exists(name) {
            confirm_replace(&format!("conda environment `{name}`"), force)?;
            self.delete(name)?;
        }
        let args = vec![
            "create".to_string(),
            "--name".to_string(),
            name.to_string(),
            format!("python={python}"),
            "--yes".to_string(),
        ];
        self.run(args, None, &format!("creating conda environment `{name}`"))?;
        Ok(CreatedEnv {
            env_ref: name.to_string(),
        })
    }

    fn env_exists(&self, env_ref: &str) -> bool {
        let args = vec![
            "env".to_string(),
            "list".to_string(),
            "--json".to_string(),
        ];
        let Ok(output) = run_command(&self.program, &args, None) else {
            return false;
        };
        if !output.success() {
            return false;
        }
        let Ok(parsed) = serde_json::from_str::<Value>(&output.stdout) else {
            return false;
        };
        parsed["envs"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .any(|env| {
                Path::new(env)
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name == env_ref)
            })
    }

    fn delete(&self, env_ref: &str) -> Result<()> {
        let args = vec![
            "env".to_string(),
            "remove".to_string(),
            "--name".to_string(),
            env_ref.to_string(),
            "--yes".to_string(),
        ];
        self.run(
            args,
            None,
            &format!("removing conda environment `{env_ref}`"),
        )?;
        Ok(())
    }

    fn install(
        &self,
        env_ref: &str,
        repo_path: &Path,
        group: &str,
        declared: &str,
        extras: &[String],
    ) -> bool {
        let prefix = vec![
            "run".to_string(),
            "-n".to_string(),
            env_ref.to_string(),
            "pip".to_string(),
        ];
        run_group_install(&self.program, &prefix, repo_path, group, declared, extras)
    }

    fn activation_command(&self, env_ref: &str) -> String {
        format!("conda activate {env_ref}")
    }
}
