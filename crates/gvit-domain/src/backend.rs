use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};

/// The closed set of environment backends gvit can manage.
///
/// Core components never branch on this; the orchestration boundary selects
/// one adapter per kind and everything downstream goes through the trait.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Venv,
    Virtualenv,
    Conda,
}

pub const SUPPORTED_BACKENDS: [BackendKind; 3] =
    [BackendKind::Venv, BackendKind::Virtualenv, BackendKind::Conda];

impl BackendKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Venv => "venv",
            BackendKind::Virtualenv => "virtualenv",
            BackendKind::Conda => "conda",
        }
    }

    /// True when the environment lives inside the repository directory and
    /// disappears with it.
    #[must_use]
    pub fn is_repo_local(self) -> bool {
        matches!(self, BackendKind::Venv | BackendKind::Virtualenv)
    }

    #[must_use]
    pub fn supported_names() -> String {
        SUPPORTED_BACKENDS
            .iter()
            .map(|kind| kind.as_str())
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "venv" => Ok(BackendKind::Venv),
            "virtualenv" => Ok(BackendKind::Virtualenv),
            "conda" => Ok(BackendKind::Conda),
            other => Err(anyhow!(
                "unsupported backend `{other}` (supported: {})",
                BackendKind::supported_names()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_names() {
        for kind in SUPPORTED_BACKENDS {
            assert_eq!(kind.as_str().parse::<BackendKind>().unwrap(), kind);
        }
    }

    #[test]
    fn rejects_unknown_backend() {
        assert!("pipenv".parse::<BackendKind>().is_err());
    }
}
