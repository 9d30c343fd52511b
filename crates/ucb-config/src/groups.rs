//! Target groups of the current project.

use tracing::info;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{ClearOutcome, Project, TargetGroup, UpdateMode};
use crate::projects::current_project;
use crate::store::ConfigStore;

/// Registry operations over the target groups of the current project.
#[derive(Debug)]
pub struct TargetGroupRegistry<'a> {
    store: &'a mut ConfigStore,
}

impl<'a> TargetGroupRegistry<'a> {
    /// Wrap a store.
    pub const fn new(store: &'a mut ConfigStore) -> Self {
        Self { store }
    }

    /// Create `group` with `ids`, or extend/overwrite it according to `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoCurrentProject`] when no project is selected, or a
    /// storage error when the document cannot be written.
    pub fn add_or_update_targets(
        &mut self,
        group: &str,
        ids: &[String],
        mode: UpdateMode,
    ) -> ConfigResult<TargetGroup> {
        let mut project = self.require_current()?;
        let updated = match project.group_mut(group) {
            Some(existing) => {
                match mode {
                    UpdateMode::Append => existing.targets.extend_from_slice(ids),
                    UpdateMode::Replace => existing.targets = ids.to_vec(),
                }
                existing.clone()
            }
            None => {
                let created = TargetGroup {
                    name: group.to_string(),
                    targets: ids.to_vec(),
                };
                project.target_groups.push(created.clone());
                created
            }
        };
        self.save(&project)?;
        info!(
            project = %project.name,
            group,
            targets = updated.targets.len(),
            ?mode,
            "target group updated"
        );
        Ok(updated)
    }

    /// Delete `group` entirely.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoCurrentProject`] or [`ConfigError::UnknownGroup`].
    pub fn remove_group(&mut self, group: &str) -> ConfigResult<()> {
        let mut project = self.require_current()?;
        let before = project.target_groups.len();
        project.target_groups.retain(|existing| existing.name != group);
        if project.target_groups.len() == before {
            return Err(ConfigError::UnknownGroup {
                name: group.to_string(),
            });
        }
        self.save(&project)?;
        info!(project = %project.name, group, "target group removed");
        Ok(())
    }

    /// Empty the targets of `group`, keeping the group itself.
    ///
    /// A missing group is reported through [`ClearOutcome::UnknownGroup`] rather
    /// than an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoCurrentProject`] or a storage error.
    pub fn clear_group(&mut self, group: &str) -> ConfigResult<ClearOutcome> {
        let mut project = self.require_current()?;
        let Some(existing) = project.group_mut(group) else {
            return Ok(ClearOutcome::UnknownGroup {
                group: group.to_string(),
            });
        };
        existing.targets.clear();
        self.save(&project)?;
        info!(project = %project.name, group, "target group cleared");
        Ok(ClearOutcome::Cleared {
            group: group.to_string(),
        })
    }

    /// Target groups of the current project.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoCurrentProject`] when no project is selected.
    pub fn groups(&self) -> ConfigResult<Vec<TargetGroup>> {
        self.require_current().map(|project| project.target_groups)
    }

    /// Group names of the current project; empty without a current project.
    #[must_use]
    pub fn list_group_names(&self) -> Vec<String> {
        current_project(self.store)
            .map(|project| {
                project
                    .target_groups
                    .into_iter()
                    .map(|group| group.name)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Target ids of `group`; empty when the group or the current project is missing.
    #[must_use]
    pub fn target_ids(&self, group: &str) -> Vec<String> {
        current_project(self.store)
            .and_then(|project| project.group(group).map(|found| found.targets.clone()))
            .unwrap_or_default()
    }

    fn require_current(&self) -> ConfigResult<Project> {
        current_project(self.store).ok_or(ConfigError::NoCurrentProject)
    }

    fn save(&mut self, project: &Project) -> ConfigResult<()> {
        self.store.set(&project.name, project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projects::ProjectRegistry;
    use anyhow::Result;
    use tempfile::TempDir;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    fn store_with_project() -> Result<(TempDir, ConfigStore)> {
        let dir = TempDir::new()?;
        let mut store = ConfigStore::open(dir.path().join("config.json"));
        ProjectRegistry::new(&mut store).add_project("demo", "R1")?;
        Ok((dir, store))
    }

    #[test]
    fn append_mode_concatenates_targets() -> Result<()> {
        let (_dir, mut store) = store_with_project()?;
        let mut groups = TargetGroupRegistry::new(&mut store);
        groups.add_or_update_targets("g", &ids(&["a", "b"]), UpdateMode::Append)?;
        groups.add_or_update_targets("g", &ids(&["c", "a"]), UpdateMode::Append)?;
        assert_eq!(groups.target_ids("g"), ids(&["a", "b", "c", "a"]));
        Ok(())
    }

    #[test]
    fn replace_mode_overwrites_targets() -> Result<()> {
        let (_dir, mut store) = store_with_project()?;
        let mut groups = TargetGroupRegistry::new(&mut store);
        groups.add_or_update_targets("g", &ids(&["a", "b"]), UpdateMode::Replace)?;
        groups.add_or_update_targets("g", &ids(&["c"]), UpdateMode::Replace)?;
        assert_eq!(groups.target_ids("g"), ids(&["c"]));
        Ok(())
    }

    #[test]
    fn clear_keeps_group_and_reports_missing_groups() -> Result<()> {
        let (_dir, mut store) = store_with_project()?;
        let mut groups = TargetGroupRegistry::new(&mut store);
        groups.add_or_update_targets("g", &ids(&["a"]), UpdateMode::Append)?;

        let outcome = groups.clear_group("g")?;
        assert_eq!(outcome, ClearOutcome::Cleared { group: "g".into() });
        assert!(groups.target_ids("g").is_empty());
        assert_eq!(groups.list_group_names(), vec!["g"]);

        let outcome = groups.clear_group("missing")?;
        assert_eq!(
            outcome,
            ClearOutcome::UnknownGroup {
                group: "missing".into()
            }
        );
        Ok(())
    }

    #[test]
    fn remove_group_deletes_entry() -> Result<()> {
        let (_dir, mut store) = store_with_project()?;
        let mut groups = TargetGroupRegistry::new(&mut store);
        groups.add_or_update_targets("g", &ids(&["a"]), UpdateMode::Append)?;
        groups.add_or_update_targets("h", &ids(&["b"]), UpdateMode::Append)?;

        groups.remove_group("g")?;
        assert_eq!(groups.list_group_names(), vec!["h"]);

        let err = groups.remove_group("g").expect_err("already removed");
        assert!(matches!(err, ConfigError::UnknownGroup { ref name } if name == "g"));
        Ok(())
    }

    #[test]
    fn operations_require_a_current_project() -> Result<()> {
        let dir = TempDir::new()?;
        let mut store = ConfigStore::open(dir.path().join("config.json"));
        let mut groups = TargetGroupRegistry::new(&mut store);

        let err = groups
            .add_or_update_targets("g", &ids(&["a"]), UpdateMode::Append)
            .expect_err("no project");
        assert!(matches!(err, ConfigError::NoCurrentProject));
        assert!(matches!(
            groups.clear_group("g"),
            Err(ConfigError::NoCurrentProject)
        ));
        assert!(matches!(
            groups.remove_group("g"),
            Err(ConfigError::NoCurrentProject)
        ));
        assert!(groups.target_ids("g").is_empty());
        assert!(groups.list_group_names().is_empty());
        Ok(())
    }

    #[test]
    fn groups_are_scoped_to_the_current_project() -> Result<()> {
        let (_dir, mut store) = store_with_project()?;
        TargetGroupRegistry::new(&mut store).add_or_update_targets(
            "g",
            &ids(&["a"]),
            UpdateMode::Append,
        )?;
        let mut projects = ProjectRegistry::new(&mut store);
        projects.add_project("other", "R2")?;
        projects.use_project("other")?;

        let groups = TargetGroupRegistry::new(&mut store);
        assert!(groups.list_group_names().is_empty());
        assert!(groups.target_ids("g").is_empty());
        Ok(())
    }
}
