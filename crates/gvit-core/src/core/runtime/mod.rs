pub(crate) mod effects;
pub(crate) mod process;

use serde_json::{json, Value};

use crate::core::tooling::outcome::{CommandStatus, ExecutionOutcome};

pub const GVIT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandGroup {
    Clone,
    Init,
    Setup,
    Pull,
    Commit,
    Envs,
    Config,
}

impl CommandGroup {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CommandGroup::Clone => "clone",
            CommandGroup::Init => "init",
            CommandGroup::Setup => "setup",
            CommandGroup::Pull => "pull",
            CommandGroup::Commit => "commit",
            CommandGroup::Envs => "envs",
            CommandGroup::Config => "config",
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CommandInfo {
    pub group: CommandGroup,
    pub name: &'static str,
}

impl CommandInfo {
    #[must_use]
    pub const fn new(group: CommandGroup, name: &'static str) -> Self {
        Self { group, name }
    }
}

#[must_use]
pub fn format_status_message(info: &CommandInfo, message: &str) -> String {
    format!("{}: {message}", info.name)
}

#[must_use]
pub fn to_json_response(info: &CommandInfo, outcome: &ExecutionOutcome, code: i32) -> Value {
    json!({
        "command": info.name,
        "status": match outcome.status {
            CommandStatus::Ok => "ok",
            CommandStatus::UserError => "user-error",
            CommandStatus::Failure => "failure",
        },
        "message": outcome.message,
        "details": outcome.details,
        "exit_code": code,
    })
}
