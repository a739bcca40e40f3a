mod io;
mod record;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::drift;
use crate::fingerprint::fingerprint_file;

pub use record::{EnvironmentInfo, InstalledState, RecordDraft, RegistryRecord, RepositoryInfo};

/// Result of a bulk scan: parseable records plus the keys that failed to
/// parse, so callers can skip-and-continue.
#[derive(Debug, Default)]
pub struct RegistryScan {
    pub records: Vec<RegistryRecord>,
    pub corrupt: Vec<(String, String)>,
}

/// Persistent store of environment-repository bindings, one TOML file per
/// registry key. The filesystem is the sole source of truth; there is no
/// separate index.
#[derive(Clone, Debug)]
pub struct EnvRegistry {
    root: PathBuf,
}

impl EnvRegistry {
    /// Opens (and creates, if needed) the registry directory.
    ///
    /// # Errors
    /// Returns an error when the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("creating registry directory {}", root.display()))?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn record_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.toml"))
    }

    /// Persists a full record under the draft's key, overwriting any prior
    /// record. Fingerprints are computed here, from the dependency files on
    /// disk at call time; groups whose file is missing get no fingerprint.
    /// The write goes through a temp file in the registry directory and an
    /// atomic rename, so readers never observe a partial record.
    ///
    /// # Errors
    /// Returns an error when the record cannot be written.
    pub fn save(&self, draft: &RecordDraft) -> Result<RegistryRecord> {
        self.save_record(draft, true)
    }

    /// Persists a record that tracks its dependency groups but carries no
    /// install fingerprints, leaving every group drifted for the next scan.
    /// Used when an environment is recreated without reinstalling.
    ///
    /// # Errors
    /// Returns an error when the record cannot be written.
    pub fn save_cleared(&self, draft: &RecordDraft) -> Result<RegistryRecord> {
        self.save_record(draft, false)
    }

    fn save_record(&self, draft: &RecordDraft, capture_installed: bool) -> Result<RegistryRecord> {
        let mut hashes = IndexMap::new();
        if capture_installed {
            for (group, declared) in &draft.deps {
                let path = Path::new(declared);
                let file = if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    draft.repo_path.join(path)
                };
                if let Some(hash) = fingerprint_file(&file) {
                    hashes.insert(group.clone(), hash);
                }
            }
        }
        let installed = (!hashes.is_empty()).then(|| InstalledState {
            hashes,
            installed_at: now_timestamp(),
        });

        let record = RegistryRecord {
            environment: EnvironmentInfo {
                name: draft.key.clone(),
                backend: draft.backend,
                path: draft.env_path.clone(),
                python: draft.python.clone(),
                created_at: draft.created_at.clone().unwrap_or_else(now_timestamp),
            },
            repository: RepositoryInfo {
                path: draft.repo_path.clone(),
                url: draft.repo_url.clone(),
            },
            deps: draft.deps.clone(),
            installed,
        };

        let rendered = io::render_record(&record);
        let target = self.record_path(&draft.key);
        let mut temp = tempfile::NamedTempFile::new_in(&self.root)
            .with_context(|| format!("creating temp file in {}", self.root.display()))?;
        temp.write_all(rendered.as_bytes())
            .with_context(|| format!("writing registry record `{}`", draft.key))?;
        temp.persist(&target)
            .map_err(|err| err.error)
            .with_context(|| format!("replacing {}", target.display()))?;
        Ok(record)
    }

    /// Loads one record; `Ok(None)` when no file exists under the key.
    ///
    /// # Errors
    /// Returns an error only for malformed content.
    pub fn load(&self, key: &str) -> Result<Option<RegistryRecord>> {
        let path = self.record_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let contents =
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        io::parse_record(&contents, key).map(Some)
    }

    #[must_use]
    pub fn exists(&self, key: &str) -> bool {
        self.record_path(key).exists()
    }

    /// Deletes the record; `false` when nothing existed under the key.
    ///
    /// # Errors
    /// Returns an error when an existing record cannot be removed.
    pub fn delete(&self, key: &str) -> Result<bool> {
        let path = self.record_path(key);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).with_context(|| format!("removing {}", path.display()))?;
        Ok(true)
    }

    /// All registry keys, lexicographically sorted.
    ///
    /// # Errors
    /// Returns an error when the registry directory cannot be read.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)
            .with_context(|| format!("reading registry directory {}", self.root.display()))?
        {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "toml") {
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    /// Finds the first free key under the numeric-suffix retry policy:
    /// `name`, `name-1`, `name-2`, …
    #[must_use]
    pub fn unique_key(&self, proposed: &str) -> String {
        if !self.exists(proposed) {
            return proposed.to_string();
        }
        let mut counter = 1u32;
        loop {
            let candidate = format!("{proposed}-{counter}");
            if !self.exists(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }

    /// Reads every record, collecting corrupt entries instead of failing the
    /// whole scan.
    ///
    /// # Errors
    /// Returns an error when the registry directory itself cannot be read.
    pub fn scan(&self) -> Result<RegistryScan> {
        let mut scan = RegistryScan::default();
        for key in self.list()? {
            match self.load(&key) {
                Ok(Some(record)) => scan.records.push(record),
                Ok(None) => {}
                Err(err) => scan.corrupt.push((key, format!("{err:#}"))),
            }
        }
        Ok(scan)
    }

    /// Records whose repository path no longer exists on disk. A symlinked
    /// path that still resolves is not orphaned.
    ///
    /// # Errors
    /// Returns an error when the registry directory cannot be read.
    pub fn find_orphaned(&self) -> Result<Vec<RegistryRecord>> {
        Ok(self
            .scan()?
            .records
            .into_iter()
            .filter(|record| !record.repository.path.exists())
            .collect())
    }

    /// Linear scan for records bound to the given repository path. Steady
    /// state has at most one, but nothing prevents duplicates after a manual
    /// re-setup, so all matches are returned and callers de-duplicate.
    ///
    /// # Errors
    /// Returns an error when the registry directory cannot be read.
    pub fn find_by_repo_path(&self, repo_path: &Path) -> Result<Vec<RegistryRecord>> {
        Ok(self
            .scan()?
            .records
            .into_iter()
            .filter(|record| record.repository.path == repo_path)
            .collect())
    }

    /// Names of the plan's groups whose current file fingerprint differs
    /// from the stored one. See [`crate::drift::modified_groups`].
    ///
    /// # Errors
    /// Returns an error when the record is missing or malformed.
    pub fn modified_groups(
        &self,
        key: &str,
        current_plan: &IndexMap<String, String>,
    ) -> Result<Vec<String>> {
        let record = self
            .load(key)?
            .with_context(|| format!("environment `{key}` not found in registry"))?;
        Ok(drift::modified_groups(
            record.installed.as_ref(),
            current_plan,
            &record.repository.path,
        ))
    }
}

pub(crate) fn now_timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}
