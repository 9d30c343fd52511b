//! Typed records persisted in the configuration store.
//!
//! # Design
//! - Pure data carriers; all mutation goes through the registries.
//! - Field names serialise in camelCase so existing config documents keep loading.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A locally registered project and its target groups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique local name; immutable once created.
    pub name: String,
    /// Remote project identifier used in API paths.
    pub id: String,
    /// Named target groups in creation order.
    #[serde(default)]
    pub target_groups: Vec<TargetGroup>,
}

impl Project {
    /// Create a project with no target groups.
    #[must_use]
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            target_groups: Vec::new(),
        }
    }

    /// Look up a target group by name.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&TargetGroup> {
        self.target_groups.iter().find(|group| group.name == name)
    }

    pub(crate) fn group_mut(&mut self, name: &str) -> Option<&mut TargetGroup> {
        self.target_groups.iter_mut().find(|group| group.name == name)
    }
}

/// Named collection of remote build target identifiers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetGroup {
    /// Group name, unique within its project.
    pub name: String,
    /// Target identifiers; duplicates allowed, insertion order preserved.
    #[serde(default)]
    pub targets: Vec<String>,
}

/// Snapshot of every stored project plus the current selection.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProjectListing {
    /// Stored projects in registration order.
    pub projects: Vec<Project>,
    /// Name of the current project, when one is selected.
    pub current: Option<String>,
}

/// How `add_or_update_targets` treats an existing group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Concatenate the new ids onto the existing list.
    Append,
    /// Overwrite the existing list.
    Replace,
}

/// Result of clearing a target group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearOutcome {
    /// The group existed and its targets were emptied.
    Cleared {
        /// Group that was cleared.
        group: String,
    },
    /// No group with this name exists; nothing changed.
    UnknownGroup {
        /// Requested group name.
        group: String,
    },
}

/// Global settings recognised by `config set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    /// API key sent in the `Authorization` header.
    ApiKey,
    /// Organisation identifier used in API paths.
    OrgId,
}

impl SettingKey {
    /// All recognised keys.
    pub const ALL: [Self; 2] = [Self::ApiKey, Self::OrgId];

    /// Key under which the setting is stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApiKey => "apikey",
            Self::OrgId => "orgid",
        }
    }
}

impl Display for SettingKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "apikey" => Ok(Self::ApiKey),
            "orgid" => Ok(Self::OrgId),
            other => Err(format!(
                "unknown setting '{other}' (expected one of: apikey, orgid)"
            )),
        }
    }
}
