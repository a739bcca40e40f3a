use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use gvit_domain::BackendKind;

use crate::core::backends::{CondaBackend, CreatedEnv, VenvBackend, VirtualenvBackend};
use crate::core::config::settings::UserConfig;
use crate::core::git::SystemGit;
use crate::core::runtime::process::RunOutput;

/// Git operations gvit delegates to the external git binary.
pub trait GitClient: Send + Sync {
    fn clone_repo(&self, url: &str, target: &Path, extra_args: &[String]) -> Result<()>;
    fn init_repo(&self, dir: &Path, extra_args: &[String]) -> Result<()>;
    fn pull(&self, dir: &Path, extra_args: &[String]) -> Result<RunOutput>;
    fn commit(&self, dir: &Path, extra_args: &[String]) -> Result<RunOutput>;
    fn add_remote(&self, dir: &Path, url: &str) -> Result<()>;
    /// Remote origin URL; empty when no remote is configured.
    fn remote_url(&self, dir: &Path) -> String;
    fn is_repository(&self, dir: &Path) -> bool;
}

/// One concrete environment backend (venv, virtualenv, conda).
///
/// `env_ref` is the backend-specific handle stored in the registry: the
/// environment directory for the repo-local backends, the environment name
/// for conda.
pub trait EnvBackend: Send + Sync {
    fn kind(&self) -> BackendKind;
    fn create(&self, name: &str, repo_path: &Path, python: &str, force: bool)
        -> Result<CreatedEnv>;
    fn env_exists(&self, env_ref: &str) -> bool;
    fn delete(&self, env_ref: &str) -> Result<()>;
    /// Installs one dependency group. Returns `false` on any failure
    /// (missing file, unsupported format, installer exit) so the caller can
    /// continue with the remaining groups.
    fn install(
        &self,
        env_ref: &str,
        repo_path: &Path,
        group: &str,
        declared: &str,
        extras: &[String],
    ) -> bool;
    fn activation_command(&self, env_ref: &str) -> String;
}

pub trait Effects: Send + Sync {
    fn git(&self) -> &dyn GitClient;
    fn backend(&self, kind: BackendKind) -> &dyn EnvBackend;
}

pub struct SystemEffects {
    git: Arc<SystemGit>,
    venv: Arc<VenvBackend>,
    virtualenv: Arc<VirtualenvBackend>,
    conda: Arc<CondaBackend>,
}

impl SystemEffects {
    #[must_use]
    pub fn new(user_config: &UserConfig) -> Self {
        Self {
            git: Arc::new(SystemGit),
            venv: Arc::new(VenvBackend),
            virtualenv: Arc::new(VirtualenvBackend),
            conda: Arc::new(CondaBackend::discover(user_config.conda_path.as_deref())),
        }
    }
}

impl Effects for SystemEffects {
    fn git(&self) -> &dyn GitClient {
        self.git.as_ref()
    }

    fn backend(&self, kind: BackendKind) -> &dyn EnvBackend {
        match kind {
            BackendKind::Venv => self.venv.as_ref(),
            BackendKind::Virtualenv => self.virtualenv.as_ref(),
            BackendKind::Conda => self.conda.as_ref(),
        }
    }
}

pub type SharedEffects = Arc<dyn Effects>;
