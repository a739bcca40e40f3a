use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub status: CommandStatus,
    pub message: String,
    #[serde(default)]
    pub details: Value,
}

impl ExecutionOutcome {
    pub fn success(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::Ok,
            message: message.into(),
            details,
        }
    }

    pub fn failure(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::Failure,
            message: message.into(),
            details,
        }
    }

    pub fn user_error(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::UserError,
            message: message.into(),
            details,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum CommandStatus {
    Ok,
    UserError,
    Failure,
}

/// Bad input caught before any mutation: unknown backend, unsupported
/// Python version, missing directory, not a repository.
#[derive(thiserror::Error, Debug)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A delegated child process (git, venv/virtualenv/conda, pip) exited with
/// a failure. Carries the captured diagnostic output.
#[derive(thiserror::Error, Debug)]
#[error("{message}")]
pub struct BackendOperationError {
    pub message: String,
    pub diagnostic: String,
}

impl BackendOperationError {
    pub fn new(message: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            diagnostic: diagnostic.into(),
        }
    }
}

/// Maps a command error onto the outcome envelope: validation failures are
/// user errors, backend failures carry their diagnostics, everything else
/// is a plain failure.
#[must_use]
pub fn outcome_from_error(err: &anyhow::Error) -> ExecutionOutcome {
    if let Some(validation) = err.downcast_ref::<ValidationError>() {
        return ExecutionOutcome::user_error(validation.message.clone(), json!({}));
    }
    if let Some(backend) = err.downcast_ref::<BackendOperationError>() {
        return ExecutionOutcome::failure(
            backend.message.clone(),
            json!({ "diagnostic": backend.diagnostic }),
        );
    }
    ExecutionOutcome::failure(format!("{err:#}"), json!({}))
}
