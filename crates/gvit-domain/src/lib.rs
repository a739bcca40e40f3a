#![deny(clippy::all, warnings)]

pub mod backend;
pub mod drift;
pub mod fingerprint;
pub mod plan;
pub mod registry;
pub mod repo_config;

pub use backend::BackendKind;
pub use drift::{modified_groups, DriftState};
pub use fingerprint::{fingerprint_bytes, fingerprint_file};
pub use plan::{resolve_plan, DependencyGroup, DepsPlan, PlanInputs, ResolvedPlan};
pub use registry::{
    EnvRegistry, EnvironmentInfo, InstalledState, RecordDraft, RegistryRecord, RegistryScan,
    RepositoryInfo,
};
pub use repo_config::RepoConfig;
