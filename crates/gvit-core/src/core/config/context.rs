use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use gvit_domain::{BackendKind, EnvRegistry};

use crate::core::config::settings::{
    config_dir, EnvSnapshot, GlobalOptions, UserConfig, CONFIG_FILE, ENVS_DIR,
};
use crate::core::runtime::effects::{Effects, EnvBackend, GitClient, SharedEffects, SystemEffects};

/// Everything one command invocation needs, built once at process start and
/// passed by parameter; there is no ambient global configuration lookup.
pub struct CommandContext<'a> {
    pub global: &'a GlobalOptions,
    config_dir: PathBuf,
    user_config: UserConfig,
    effects: SharedEffects,
}

impl<'a> CommandContext<'a> {
    /// Builds a context from the process environment, constructing the
    /// production effects (conda discovery honors the user config).
    ///
    /// # Errors
    /// Returns an error when the configuration directory cannot be resolved
    /// or the user config file is malformed.
    pub fn new(global: &'a GlobalOptions) -> Result<Self> {
        let snapshot = EnvSnapshot::capture();
        let config_dir = config_dir(&snapshot)?;
        let user_config = UserConfig::load(&config_dir.join(CONFIG_FILE))?;
        let effects: SharedEffects = Arc::new(SystemEffects::new(&user_config));
        Ok(Self {
            global,
            config_dir,
            user_config,
            effects,
        })
    }

    /// Builds a context with injected effects (tests and embedding).
    ///
    /// # Errors
    /// Returns an error when the configuration directory cannot be resolved
    /// or the user config file is malformed.
    pub fn with_effects(global: &'a GlobalOptions, effects: SharedEffects) -> Result<Self> {
        let snapshot = EnvSnapshot::capture();
        let config_dir = config_dir(&snapshot)?;
        let user_config = UserConfig::load(&config_dir.join(CONFIG_FILE))?;
        Ok(Self {
            global,
            config_dir,
            user_config,
            effects,
        })
    }

    #[must_use]
    pub fn user_config(&self) -> &UserConfig {
        &self.user_config
    }

    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// Opens the environment registry under the configuration directory.
    ///
    /// # Errors
    /// Returns an error when the registry directory cannot be created.
    pub fn registry(&self) -> Result<EnvRegistry> {
        EnvRegistry::open(self.config_dir.join(ENVS_DIR))
    }

    pub fn effects(&self) -> &dyn Effects {
        self.effects.as_ref()
    }

    pub fn git(&self) -> &dyn GitClient {
        self.effects.git()
    }

    pub fn backend(&self, kind: BackendKind) -> &dyn EnvBackend {
        self.effects.backend(kind)
    }

    #[must_use]
    pub fn verbose(&self) -> bool {
        self.global.verbose > 0 || self.user_config.verbose()
    }
}
