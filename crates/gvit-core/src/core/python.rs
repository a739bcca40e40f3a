use anyhow::Result;

use crate::core::runtime::process::run_command;
use crate::core::tooling::outcome::BackendOperationError;

/// Finds an interpreter command matching the requested version.
///
/// Tries `python{X.Y}`, then `python{X}`, then the bare fallbacks, verifying
/// `--version` output against the request. When nothing matches but a
/// fallback interpreter exists, that interpreter is used with a warning:
/// the environment still gets created, just not with the requested version.
///
/// # Errors
/// Returns an error when no Python interpreter can be found at all.
pub fn find_python_command(version: &str) -> Result<String> {
    let mut candidates = Vec::new();
    candidates.push(format!("python{version}"));
    if let Some((major, _)) = version.split_once('.') {
        candidates.push(format!("python{major}"));
    }
    candidates.push("python3".to_string());
    candidates.push("python".to_string());

    let mut fallback = None;
    for candidate in &candidates {
        if which::which(candidate).is_err() {
            continue;
        }
        if fallback.is_none() {
            fallback = Some(candidate.clone());
        }
        if let Ok(output) = run_command(candidate, &["--version".to_string()], None) {
            if output.success() && reported_version(&output.stdout, &output.stderr, version) {
                return Ok(candidate.clone());
            }
        }
    }

    if let Some(command) = fallback {
        tracing::warn!("Python {version} not found, using `{command}` instead");
        return Ok(command);
    }
    Err(BackendOperationError::new(
        format!("no Python interpreter found for version {version}"),
        format!("tried: {}", candidates.join(", ")),
    )
    .into())
}

fn reported_version(stdout: &str, stderr: &str, requested: &str) -> bool {
    // "Python 3.11.4" on stdout for modern interpreters, stderr historically
    let line = if stdout.trim().is_empty() { stderr } else { stdout };
    line.split_whitespace()
        .any(|token| token.starts_with(requested))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_match_is_prefix_based() {
        assert!(reported_version("Python 3.11.4", "", "3.11"));
        assert!(reported_version("", "Python 3.11.4", "3.11"));
        assert!(!reported_version("Python 3.12.0", "", "3.11"));
    }
}
