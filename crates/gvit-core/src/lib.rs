#![deny(clippy::all, warnings)]

mod core;

pub use crate::core::backends::CreatedEnv;
pub use crate::core::commands::clone::{clone, CloneRequest};
pub use crate::core::commands::commit::{commit, CommitRequest};
pub use crate::core::commands::common::SetupOptions;
pub use crate::core::commands::config::{config, ConfigAction, ConfigRequest, ConfigUpdates};
pub use crate::core::commands::envs::{
    envs_delete, envs_list, envs_prune, envs_reset, envs_show, EnvsDeleteRequest, EnvsPruneRequest,
    EnvsResetRequest, EnvsShowRequest,
};
pub use crate::core::commands::init::{init, InitRequest};
pub use crate::core::commands::pull::{pull, PullRequest};
pub use crate::core::commands::setup::{setup, SetupRequest};
pub use crate::core::config::context::CommandContext;
pub use crate::core::config::settings::{GlobalOptions, UserConfig, UserDefaults};
pub use crate::core::runtime::effects::{
    Effects, EnvBackend, GitClient, SharedEffects, SystemEffects,
};
pub use crate::core::runtime::process::RunOutput;
pub use crate::core::runtime::{
    format_status_message, to_json_response, CommandGroup, CommandInfo, GVIT_VERSION,
};
pub use crate::core::tooling::outcome::{
    outcome_from_error, BackendOperationError, CommandStatus, ExecutionOutcome, ValidationError,
};
