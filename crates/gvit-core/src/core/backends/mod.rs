mod conda;
mod venv;
mod virtualenv;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::runtime::process::run_command;
use crate::core::tooling::outcome::ValidationError;
use crate::core::tooling::prompt;

pub use conda::CondaBackend;
pub use venv::VenvBackend;
pub use virtualenv::VirtualenvBackend;

/// Result of a successful backend create: the handle the registry stores.
#[derive(Clone, Debug)]
pub struct CreatedEnv {
    pub env_ref: String,
}

pub(crate) fn python_executable(env_path: &Path) -> PathBuf {
    if cfg!(windows) {
        env_path.join("Scripts").join("python.exe")
    } else {
        env_path.join("bin").join("python")
    }
}

pub(crate) fn pip_executable(env_path: &Path) -> PathBuf {
    if cfg!(windows) {
        env_path.join("Scripts").join("pip.exe")
    } else {
        env_path.join("bin").join("pip")
    }
}

/// An env dir is valid when it actually contains an interpreter; a bare
/// directory with the right name does not count.
pub(crate) fn valid_env_dir(env_path: &Path) -> bool {
    env_path.exists() && python_executable(env_path).exists()
}

pub(crate) fn activation_snippet(env_name: &str) -> String {
    if cfg!(windows) {
        format!("{env_name}\\Scripts\\activate")
    } else {
        format!("source {env_name}/bin/activate")
    }
}

/// Decides whether an existing environment may be replaced. `--force` skips
/// the question; otherwise the user is asked, and a non-interactive run
/// aborts (fail closed).
pub(crate) fn confirm_replace(description: &str, force: bool) -> Result<()> {
    if force {
        tracing::warn!("{description} already exists, removing it");
        return Ok(());
    }
    if prompt::confirm(&format!("{description} already exists. Overwrite it?"), false) {
        Ok(())
    } else {
        Err(ValidationError::new(format!(
            "{description} already exists (pass --force to overwrite)"
        ))
        .into())
    }
}

/// Builds the pip arguments for one dependency group, or `None` when the
/// file format is unsupported.
pub(crate) fn pip_install_args(deps_file: &Path, extras: &[String]) -> Option<Vec<String>> {
    let name = deps_file.file_name()?.to_str()?;
    if name == gvit_domain::plan::PROJECT_MANIFEST {
        let target = if extras.is_empty() {
            ".".to_string()
        } else {
            format!(".[{}]", extras.join(","))
        };
        return Some(vec!["install".to_string(), "-e".to_string(), target]);
    }
    match deps_file.extension().and_then(|ext| ext.to_str()) {
        Some("txt" | "in") => Some(vec![
            "install".to_string(),
            "-r".to_string(),
            deps_file.display().to_string(),
        ]),
        _ => None,
    }
}

/// Runs one install command for a group, reporting success as a boolean so
/// a failing group never aborts its siblings.
pub(crate) fn run_group_install(
    program: &str,
    prefix_args: &[String],
    repo_path: &Path,
    group: &str,
    declared: &str,
    extras: &[String],
) -> bool {
    let deps_file = resolve_deps_file(repo_path, declared);
    if !deps_file.exists() {
        tracing::warn!("dependency file `{declared}` not found, skipping group `{group}`");
        return false;
    }
    let Some(install_args) = pip_install_args(&deps_file, extras) else {
        tracing::warn!(
            "unsupported dependency file format `{}`, skipping group `{group}`",
            deps_file.display()
        );
        return false;
    };
    let mut args = prefix_args.to_vec();
    args.extend(install_args);
    match run_command(program, &args, Some(repo_path)) {
        Ok(output) if output.success() => {
            tracing::info!("installed dependency group `{group}` from {declared}");
            true
        }
        Ok(output) => {
            tracing::warn!(
                "installing group `{group}` from {declared} failed: {}",
                output.diagnostic()
            );
            false
        }
        Err(err) => {
            tracing::warn!("installing group `{group}` from {declared} failed: {err:#}");
            false
        }
    }
}

pub(crate) fn resolve_deps_file(repo_path: &Path, declared: &str) -> PathBuf {
    let path = Path::new(declared);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        repo_path.join(path)
    }
}

/// Keeps a repo-local environment directory out of version control.
pub(crate) fn ensure_gitignore(env_name: &str, repo_path: &Path) {
    let gitignore = repo_path.join(".gitignore");
    let mut lines: Vec<String> = fs::read_to_string(&gitignore)
        .map(|contents| contents.lines().map(ToString::to_string).collect())
        .unwrap_or_default();
    let already = lines
        .iter()
        .any(|line| line == env_name || line == &format!("/{env_name}"));
    if already {
        return;
    }
    lines.push(env_name.to_string());
    if let Err(err) = fs::write(&gitignore, lines.join("\n") + "\n") {
        tracing::warn!("could not update {}: {err}", gitignore.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn pip_args_for_requirements_file() {
        let args = pip_install_args(Path::new("/repo/requirements.txt"), &[]).expect("args");
        assert_eq!(args[0], "install");
        assert_eq!(args[1], "-r");
    }

    #[test]
    fn pip_args_for_manifest_with_extras() {
        let args = pip_install_args(
            Path::new("/repo/pyproject.toml"),
            &["dev".to_string(), "test".to_string()],
        )
        .expect("args");
        assert_eq!(args, vec!["install", "-e", ".[dev,test]"]);
    }

    #[test]
    fn unsupported_format_yields_none() {
        assert!(pip_install_args(Path::new("/repo/Pipfile"), &[]).is_none());
    }

    #[test]
    fn gitignore_gains_env_once() {
        let temp = tempfile::tempdir().expect("tempdir");
        ensure_gitignore(".venv", temp.path());
        ensure_gitignore(".venv", temp.path());
        let contents = fs::read_to_string(temp.path().join(".gitignore")).expect("read");
        assert_eq!(contents.matches(".venv").count(), 1);
    }

    #[test]
    fn existing_gitignore_entries_are_preserved() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join(".gitignore"), "dist/\n").expect("write");
        ensure_gitignore(".venv", temp.path());
        let contents = fs::read_to_string(temp.path().join(".gitignore")).expect("read");
        assert!(contents.contains("dist/"));
        assert!(contents.contains(".venv"));
    }
}
