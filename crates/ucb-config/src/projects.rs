//! Project registry: named projects plus the current-project pointer.
//!
//! Stored layout (top-level keys of the document):
//! - `projects`: ordered list of registered names
//! - `current`: name of the current project or `""`
//! - `<name>`: the [`Project`] record itself

use serde_json::Value;
use tracing::info;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{Project, ProjectListing, SettingKey};
use crate::store::ConfigStore;

pub(crate) const KEY_PROJECTS: &str = "projects";
pub(crate) const KEY_CURRENT: &str = "current";

/// Registry operations over the projects held in a [`ConfigStore`].
#[derive(Debug)]
pub struct ProjectRegistry<'a> {
    store: &'a mut ConfigStore,
}

impl<'a> ProjectRegistry<'a> {
    /// Wrap a store.
    pub const fn new(store: &'a mut ConfigStore) -> Self {
        Self { store }
    }

    /// Registered project names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        registered_names(self.store)
    }

    /// Name held by the current pointer, if any (it may be dangling).
    #[must_use]
    pub fn current_name(&self) -> Option<String> {
        current_name(self.store)
    }

    /// Register a project. The first project added while nothing is current becomes current.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateProject`] when the name is taken,
    /// [`ConfigError::InvalidProjectName`] for empty or reserved names, or a
    /// storage error when the document cannot be written.
    pub fn add_project(&mut self, name: &str, remote_id: &str) -> ConfigResult<Project> {
        validate_name(name)?;
        let mut names = self.names();
        if names.iter().any(|existing| existing == name) {
            return Err(ConfigError::DuplicateProject {
                name: name.to_string(),
            });
        }

        let project = Project::new(name, remote_id);
        let record = self.store.encode(&project)?;
        names.push(name.to_string());
        let names = self.store.encode(&names)?;
        let select = current_project(self.store).is_none();

        self.store.update(|document| {
            document.insert(name.to_string(), record);
            document.insert(KEY_PROJECTS.to_string(), names);
            if select {
                document.insert(KEY_CURRENT.to_string(), Value::String(name.to_string()));
            }
        })?;
        info!(project = name, selected = select, "project registered");
        Ok(project)
    }

    /// Remove a project that is not current.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownProject`] when the name is not registered and
    /// [`ConfigError::CurrentProjectProtected`] when it is the current project.
    pub fn remove_project(&mut self, name: &str) -> ConfigResult<()> {
        let mut names = self.names();
        let Some(index) = names.iter().position(|existing| existing == name) else {
            return Err(ConfigError::UnknownProject {
                name: name.to_string(),
            });
        };
        if self.current_name().as_deref() == Some(name) {
            return Err(ConfigError::CurrentProjectProtected {
                name: name.to_string(),
            });
        }

        names.remove(index);
        let names = self.store.encode(&names)?;
        self.store.update(|document| {
            document.remove(name);
            document.insert(KEY_PROJECTS.to_string(), names);
        })?;
        info!(project = name, "project removed");
        Ok(())
    }

    /// Point the current-project selection at a registered project.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownProject`] when the name is not registered.
    pub fn use_project(&mut self, name: &str) -> ConfigResult<()> {
        if !self.names().iter().any(|existing| existing == name) {
            return Err(ConfigError::UnknownProject {
                name: name.to_string(),
            });
        }
        self.store.set(KEY_CURRENT, name)?;
        info!(project = name, "current project selected");
        Ok(())
    }

    /// Project referenced by the current pointer; `None` when empty or dangling.
    #[must_use]
    pub fn current_project(&self) -> Option<Project> {
        current_project(self.store)
    }

    /// Stored record for a registered project.
    #[must_use]
    pub fn project(&self, name: &str) -> Option<Project> {
        read_project(self.store, name)
    }

    /// Every stored project in registration order plus the current name.
    #[must_use]
    pub fn list_projects(&self) -> ProjectListing {
        let projects = self
            .names()
            .iter()
            .filter_map(|name| read_project(self.store, name))
            .collect();
        ProjectListing {
            projects,
            current: self.current_name(),
        }
    }
}

pub(crate) fn registered_names(store: &ConfigStore) -> Vec<String> {
    store.get(KEY_PROJECTS, Vec::new())
}

pub(crate) fn current_name(store: &ConfigStore) -> Option<String> {
    let current: String = store.get(KEY_CURRENT, String::new());
    (!current.is_empty()).then_some(current)
}

pub(crate) fn read_project(store: &ConfigStore, name: &str) -> Option<Project> {
    if !registered_names(store).iter().any(|existing| existing == name) {
        return None;
    }
    store.get(name, None)
}

pub(crate) fn current_project(store: &ConfigStore) -> Option<Project> {
    current_name(store).and_then(|name| read_project(store, &name))
}

fn validate_name(name: &str) -> ConfigResult<()> {
    let reason = if name.trim().is_empty() {
        Some("name must not be empty")
    } else if name == KEY_PROJECTS
        || name == KEY_CURRENT
        || SettingKey::ALL.iter().any(|key| key.as_str() == name)
    {
        Some("name is reserved by the config store")
    } else {
        None
    };

    reason.map_or(Ok(()), |reason| {
        Err(ConfigError::InvalidProjectName {
            name: name.to_string(),
            reason,
        })
    })
}
