use std::path::Path;

use indexmap::IndexMap;

use crate::fingerprint::fingerprint_file;
use crate::registry::{InstalledState, RegistryRecord};

/// Outcome of one drift scan. Not persisted: recomputed per invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DriftState {
    /// Repository not found in the registry; no comparison is possible.
    NoRecord,
    /// Every tracked group's current fingerprint equals the stored one.
    UpToDate,
    /// At least one group changed, appeared, or lost its backing file.
    Drifted { groups: Vec<String> },
}

impl DriftState {
    /// Scans a record against the given plan (group name to declared path).
    #[must_use]
    pub fn scan(record: &RegistryRecord, current_plan: &IndexMap<String, String>) -> Self {
        let changed = modified_groups(
            record.installed.as_ref(),
            current_plan,
            &record.repository.path,
        );
        if changed.is_empty() {
            DriftState::UpToDate
        } else {
            DriftState::Drifted { groups: changed }
        }
    }
}

/// Names of the plan's groups considered modified relative to the stored
/// fingerprints, in plan order.
///
/// The comparison matrix per group, with `stored` the recorded fingerprint
/// and `current` the fingerprint of the declared file right now:
///
/// - stored absent, file absent: excluded from comparison (never tracked);
/// - stored absent, file present: modified (never installed, or the file
///   appeared after the fact);
/// - stored present, file absent: modified (the declaration was deleted;
///   treated as drift, never silently untracked);
/// - both present: modified iff the digests differ.
#[must_use]
pub fn modified_groups(
    installed: Option<&InstalledState>,
    current_plan: &IndexMap<String, String>,
    repo_root: &Path,
) -> Vec<String> {
    let mut changed = Vec::new();
    for (group, declared) in current_plan {
        let path = Path::new(declared);
        let file = if path.is_absolute() {
            path.to_path_buf()
        } else {
            repo_root.join(path)
        };
        let current = fingerprint_file(&file);
        let stored = installed.and_then(|state| state.hashes.get(group));
        let modified = match (stored, current) {
            (None, None) => false,
            (None, Some(_)) | (Some(_), None) => true,
            (Some(stored), Some(current)) => stored.as_str() != current.as_str(),
        };
        if modified {
            changed.push(group.clone());
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::fingerprint_bytes;
    use std::fs;

    fn plan(entries: &[(&str, &str)]) -> IndexMap<String, String> {
        entries
            .iter()
            .map(|(name, path)| ((*name).to_string(), (*path).to_string()))
            .collect()
    }

    fn installed(entries: &[(&str, &str)]) -> InstalledState {
        InstalledState {
            hashes: entries
                .iter()
                .map(|(name, hash)| ((*name).to_string(), (*hash).to_string()))
                .collect(),
            installed_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn untracked_and_absent_group_is_excluded() {
        let repo = tempfile::tempdir().expect("tempdir");
        let changed = modified_groups(None, &plan(&[("base", "requirements.txt")]), repo.path());
        assert!(changed.is_empty());
    }

    #[test]
    fn group_without_stored_fingerprint_is_modified_when_file_exists() {
        let repo = tempfile::tempdir().expect("tempdir");
        fs::write(repo.path().join("requirements.txt"), "foo==1.0\n").expect("write");
        let changed = modified_groups(None, &plan(&[("base", "requirements.txt")]), repo.path());
        assert_eq!(changed, vec!["base".to_string()]);
    }

    #[test]
    fn deleted_file_with_stored_fingerprint_is_modified() {
        let repo = tempfile::tempdir().expect("tempdir");
        let state = installed(&[("base", "0123456789abcdef")]);
        let changed = modified_groups(
            Some(&state),
            &plan(&[("base", "requirements.txt")]),
            repo.path(),
        );
        assert_eq!(changed, vec!["base".to_string()]);
    }

    #[test]
    fn matching_fingerprints_are_up_to_date() {
        let repo = tempfile::tempdir().expect("tempdir");
        let contents = b"foo==1.0\n";
        fs::write(repo.path().join("requirements.txt"), contents).expect("write");
        let state = installed(&[("base", &fingerprint_bytes(contents))]);
        let changed = modified_groups(
            Some(&state),
            &plan(&[("base", "requirements.txt")]),
            repo.path(),
        );
        assert!(changed.is_empty());
    }

    #[test]
    fn differing_fingerprints_are_modified_in_plan_order() {
        let repo = tempfile::tempdir().expect("tempdir");
        fs::write(repo.path().join("requirements.txt"), "foo==2.0\n").expect("write");
        fs::write(repo.path().join("requirements-dev.txt"), "pytest\n").expect("write");
        let state = installed(&[
            ("base", "0123456789abcdef"),
            ("dev", &fingerprint_bytes(b"pytest\n")),
        ]);
        let changed = modified_groups(
            Some(&state),
            &plan(&[("base", "requirements.txt"), ("dev", "requirements-dev.txt")]),
            repo.path(),
        );
        assert_eq!(changed, vec!["base".to_string()]);
    }
}
