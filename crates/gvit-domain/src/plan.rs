use std::path::Path;

use indexmap::IndexMap;

/// Hardcoded last-resort base group path when nothing else is declared.
pub const FALLBACK_BASE_DEPS: &str = "requirements.txt";

/// File name that switches the resolver into manifest mode.
pub const PROJECT_MANIFEST: &str = "pyproject.toml";

/// The conventional name of the base dependency group.
pub const BASE_GROUP: &str = "base";

/// One named dependency group and the file that declares it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DependencyGroup {
    pub name: String,
    pub path: String,
}

/// Effective install plan produced by the resolver.
///
/// The two shapes are intentionally distinct: a manifest base turns extras
/// into feature flags of a single editable install, while the file-list
/// shape installs every group independently.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DepsPlan {
    Manifest { path: String, extras: Vec<String> },
    Files { groups: Vec<DependencyGroup> },
}

impl DepsPlan {
    /// Group-name to declared-path view of the plan, base first.
    ///
    /// In manifest mode every group points at the manifest file itself, so
    /// drift in the manifest marks the whole install as stale.
    #[must_use]
    pub fn group_paths(&self) -> IndexMap<String, String> {
        let mut map = IndexMap::new();
        match self {
            DepsPlan::Manifest { path, extras } => {
                map.insert(BASE_GROUP.to_string(), path.clone());
                for extra in extras {
                    map.insert(extra.clone(), path.clone());
                }
            }
            DepsPlan::Files { groups } => {
                for group in groups {
                    map.insert(group.name.clone(), group.path.clone());
                }
            }
        }
        map
    }

    #[must_use]
    pub fn is_manifest(&self) -> bool {
        matches!(self, DepsPlan::Manifest { .. })
    }
}

/// Resolver inputs, one field per source in precedence order.
#[derive(Clone, Debug, Default)]
pub struct PlanInputs {
    pub cli_base: Option<String>,
    pub cli_extras: Option<String>,
    pub repo_base: Option<String>,
    pub repo_extras: IndexMap<String, String>,
    pub user_base: Option<String>,
    pub user_extras: IndexMap<String, String>,
}

/// Resolver output: the plan plus any warnings produced while resolving.
#[derive(Clone, Debug)]
pub struct ResolvedPlan {
    pub plan: DepsPlan,
    pub warnings: Vec<String>,
}

/// Merges CLI-supplied, repository-declared, and user-default dependency
/// declarations into the effective install plan.
///
/// Precedence for the base group is strict and total: CLI override, then
/// repository declaration, then user default, then [`FALLBACK_BASE_DEPS`].
/// Extra groups come from a comma-separated list of bare names (looked up in
/// repository then user declarations, skipped with a warning when neither
/// declares them) or inline `name:path` pairs taken literally.
#[must_use]
pub fn resolve_plan(inputs: &PlanInputs) -> ResolvedPlan {
    let base = inputs
        .cli_base
        .clone()
        .or_else(|| inputs.repo_base.clone())
        .or_else(|| inputs.user_base.clone())
        .unwrap_or_else(|| FALLBACK_BASE_DEPS.to_string());

    let mut warnings = Vec::new();

    if is_manifest_path(&base) {
        let mut extras = Vec::new();
        for item in split_requested(inputs.cli_extras.as_deref()) {
            if let Some((name, _)) = item.split_once(':') {
                warnings.push(format!(
                    "extras group `{}` declares a path, but `{base}` installs extras by name; skipping",
                    name.trim()
                ));
            } else {
                extras.push(item);
            }
        }
        return ResolvedPlan {
            plan: DepsPlan::Manifest { path: base, extras },
            warnings,
        };
    }

    let mut groups = vec![DependencyGroup {
        name: BASE_GROUP.to_string(),
        path: base,
    }];
    for item in split_requested(inputs.cli_extras.as_deref()) {
        if let Some((name, path)) = item.split_once(':') {
            groups.push(DependencyGroup {
                name: name.trim().to_string(),
                path: path.trim().to_string(),
            });
        } else if let Some(path) = inputs
            .repo_extras
            .get(&item)
            .or_else(|| inputs.user_extras.get(&item))
        {
            groups.push(DependencyGroup {
                name: item,
                path: path.clone(),
            });
        } else {
            warnings.push(format!(
                "extra deps group `{item}` not declared in repository or user config; skipping"
            ));
        }
    }

    ResolvedPlan {
        plan: DepsPlan::Files { groups },
        warnings,
    }
}

fn is_manifest_path(path: &str) -> bool {
    Path::new(path)
        .file_name()
        .is_some_and(|name| name == PROJECT_MANIFEST)
}

fn split_requested(raw: Option<&str>) -> Vec<String> {
    raw.map_or_else(Vec::new, |list| {
        list.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(ToString::to_string)
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_of(plan: &DepsPlan) -> String {
        match plan {
            DepsPlan::Manifest { path, .. } => path.clone(),
            DepsPlan::Files { groups } => groups[0].path.clone(),
        }
    }

    #[test]
    fn cli_override_wins() {
        let inputs = PlanInputs {
            cli_base: Some("a.txt".into()),
            repo_base: Some("b.txt".into()),
            user_base: Some("c.txt".into()),
            ..PlanInputs::default()
        };
        assert_eq!(base_of(&resolve_plan(&inputs).plan), "a.txt");
    }

    #[test]
    fn repo_declaration_beats_user_default() {
        let inputs = PlanInputs {
            repo_base: Some("b.txt".into()),
            user_base: Some("c.txt".into()),
            ..PlanInputs::default()
        };
        assert_eq!(base_of(&resolve_plan(&inputs).plan), "b.txt");
    }

    #[test]
    fn user_default_applies_when_nothing_else_does() {
        let inputs = PlanInputs {
            user_base: Some("c.txt".into()),
            ..PlanInputs::default()
        };
        assert_eq!(base_of(&resolve_plan(&inputs).plan), "c.txt");
    }

    #[test]
    fn falls_back_to_requirements_txt() {
        let resolved = resolve_plan(&PlanInputs::default());
        assert_eq!(base_of(&resolved.plan), FALLBACK_BASE_DEPS);
        assert!(resolved.warnings.is_empty());
    }

    #[test]
    fn named_extras_resolve_repo_then_user() {
        let mut repo_extras = IndexMap::new();
        repo_extras.insert("dev".to_string(), "requirements-dev.txt".to_string());
        let mut user_extras = IndexMap::new();
        user_extras.insert("dev".to_string(), "user-dev.txt".to_string());
        user_extras.insert("docs".to_string(), "requirements-docs.txt".to_string());

        let inputs = PlanInputs {
            cli_extras: Some("dev,docs".into()),
            repo_extras,
            user_extras,
            ..PlanInputs::default()
        };
        let DepsPlan::Files { groups } = resolve_plan(&inputs).plan else {
            panic!("expected file plan");
        };
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[1].name, "dev");
        assert_eq!(groups[1].path, "requirements-dev.txt");
        assert_eq!(groups[2].name, "docs");
        assert_eq!(groups[2].path, "requirements-docs.txt");
    }

    #[test]
    fn inline_pairs_bypass_lookups() {
        let mut repo_extras = IndexMap::new();
        repo_extras.insert("dev".to_string(), "ignored.txt".to_string());
        let inputs = PlanInputs {
            cli_extras: Some("dev:custom-dev.txt".into()),
            repo_extras,
            ..PlanInputs::default()
        };
        let DepsPlan::Files { groups } = resolve_plan(&inputs).plan else {
            panic!("expected file plan");
        };
        assert_eq!(groups[1].path, "custom-dev.txt");
    }

    #[test]
    fn unresolvable_extras_warn_and_skip() {
        let inputs = PlanInputs {
            cli_extras: Some("mystery".into()),
            ..PlanInputs::default()
        };
        let resolved = resolve_plan(&inputs);
        let DepsPlan::Files { groups } = resolved.plan else {
            panic!("expected file plan");
        };
        assert_eq!(groups.len(), 1);
        assert_eq!(resolved.warnings.len(), 1);
        assert!(resolved.warnings[0].contains("mystery"));
    }

    #[test]
    fn manifest_base_switches_modes() {
        let inputs = PlanInputs {
            repo_base: Some("pyproject.toml".into()),
            cli_extras: Some("dev,test".into()),
            ..PlanInputs::default()
        };
        let resolved = resolve_plan(&inputs);
        let DepsPlan::Manifest { path, extras } = resolved.plan else {
            panic!("expected manifest plan");
        };
        assert_eq!(path, "pyproject.toml");
        assert_eq!(extras, vec!["dev".to_string(), "test".to_string()]);
    }

    #[test]
    fn manifest_mode_group_paths_point_at_manifest() {
        let plan = DepsPlan::Manifest {
            path: "pyproject.toml".into(),
            extras: vec!["dev".into()],
        };
        let paths = plan.group_paths();
        assert_eq!(paths.get("base").map(String::as_str), Some("pyproject.toml"));
        assert_eq!(paths.get("dev").map(String::as_str), Some("pyproject.toml"));
    }
}
