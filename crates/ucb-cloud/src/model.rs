//! Records derived from remote responses and the selectors that pick them.
//!
//! # Design
//! - Remote payloads are loosely typed; only documented fields are read and a
//!   record without a build number is dropped instead of failing the batch.
//! - Nothing here is persisted.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

/// Public page that renders a share link for a given share id.
pub const SHARE_PAGE_URL: &str = "https://developer.cloud.unity3d.com/share/share.html?shareId=";

/// One build of one target, as returned by a query.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    /// Build target the build belongs to.
    pub target_id: String,
    /// Sequential build number within the target.
    pub build_number: u64,
    /// Whether the build is marked as a favourite.
    pub favorited: bool,
    /// Source revision the build was made from.
    pub source_hash: String,
    /// Source branch the build was made from.
    pub branch: String,
    /// User-assigned label; empty when unset.
    pub label: String,
    /// Target platform.
    pub platform: String,
    /// Completion time, when finished and parseable.
    pub finished: Option<DateTime<Utc>>,
    /// Share link URL; `Some("")` when resolution found no link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_link: Option<String>,
    /// Share link expiry as reported by the service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<String>,
}

impl BuildInfo {
    /// Decode a build record, using `target_id` when the record omits `buildtargetid`.
    ///
    /// Returns `None` when the record has no numeric `build` field.
    #[must_use]
    pub fn from_record(record: &Value, target_id: &str) -> Option<Self> {
        let build_number = record.get("build").and_then(Value::as_u64)?;
        Some(Self {
            target_id: text_field(record, "buildtargetid").unwrap_or_else(|| target_id.to_string()),
            build_number,
            favorited: record
                .get("favorited")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            source_hash: text_field(record, "lastBuiltRevision").unwrap_or_default(),
            branch: text_field(record, "scmBranch").unwrap_or_default(),
            label: text_field(record, "label").unwrap_or_default(),
            platform: text_field(record, "platform").unwrap_or_default(),
            finished: text_field(record, "finished").and_then(|raw| parse_timestamp(&raw)),
            share_link: None,
            expiry: None,
        })
    }

    /// Attach the outcome of a share-link lookup; a missing link becomes `""`.
    pub fn attach_share_link(&mut self, link: Option<ShareLink>) {
        match link {
            Some(link) => {
                self.share_link = Some(link.url());
                self.expiry = link.expiry;
            }
            None => {
                self.share_link = Some(String::new());
                self.expiry = None;
            }
        }
    }
}

/// Existing share link of a build.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
    /// Share token issued by the service.
    pub share_id: String,
    /// Expiry reported by the service.
    pub expiry: Option<String>,
}

impl ShareLink {
    /// Decode a share record; `None` without a `shareid`.
    #[must_use]
    pub fn from_record(record: &Value) -> Option<Self> {
        let share_id = text_field(record, "shareid").filter(|id| !id.is_empty())?;
        Some(Self {
            share_id,
            expiry: text_field(record, "shareExpiry"),
        })
    }

    /// Public URL of the share page.
    #[must_use]
    pub fn url(&self) -> String {
        format!("{SHARE_PAGE_URL}{}", self.share_id)
    }
}

/// Project known to the remote organisation.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteProject {
    /// Display name.
    pub name: String,
    /// Identifier to register locally with `project add`.
    pub project_id: String,
}

impl RemoteProject {
    /// Decode a project record; `None` without a `projectid`.
    #[must_use]
    pub fn from_record(record: &Value) -> Option<Self> {
        Some(Self {
            project_id: text_field(record, "projectid")?,
            name: text_field(record, "name").unwrap_or_default(),
        })
    }
}

/// How builds are picked for each target of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildSelector {
    /// Latest build per platform; first record only.
    Latest,
    /// Builds whose label equals the value.
    ByLabel(String),
    /// Builds whose source revision equals the value.
    ByHash(String),
    /// Builds whose branch equals the value.
    ByBranch(String),
}

impl BuildSelector {
    /// Resolve CLI flags into one selector: hash wins over branch, branch over label.
    #[must_use]
    pub fn from_flags(hash: Option<String>, branch: Option<String>, label: Option<String>) -> Self {
        hash.map(Self::ByHash)
            .or_else(|| branch.map(Self::ByBranch))
            .or_else(|| label.map(Self::ByLabel))
            .unwrap_or(Self::Latest)
    }

    /// Whether `build` satisfies the search key. `Latest` matches everything.
    #[must_use]
    pub fn matches(&self, build: &BuildInfo) -> bool {
        match self {
            Self::Latest => true,
            Self::ByLabel(label) => build.label == *label,
            Self::ByHash(hash) => build.source_hash == *hash,
            Self::ByBranch(branch) => build.branch == *branch,
        }
    }
}

impl Display for BuildSelector {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => formatter.write_str("latest"),
            Self::ByLabel(label) => write!(formatter, "label: {label}"),
            Self::ByHash(hash) => write!(formatter, "hash: {hash}"),
            Self::ByBranch(branch) => write!(formatter, "branch: {branch}"),
        }
    }
}

/// Selectors accepted by share-link mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkSelector {
    /// Latest build per target.
    Latest,
    /// Builds whose label equals the value.
    ByLabel(String),
}

impl LinkSelector {
    /// `ByLabel` when a label is given, otherwise `Latest`.
    #[must_use]
    pub fn from_label(label: Option<String>) -> Self {
        label.map_or(Self::Latest, Self::ByLabel)
    }
}

impl From<LinkSelector> for BuildSelector {
    fn from(selector: LinkSelector) -> Self {
        match selector {
            LinkSelector::Latest => Self::Latest,
            LinkSelector::ByLabel(label) => Self::ByLabel(label),
        }
    }
}

/// Expiry date for a new share link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareExpiry(DateTime<Utc>);

impl ShareExpiry {
    /// RFC 3339 form sent to the service.
    #[must_use]
    pub fn to_rfc3339(self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

impl FromStr for ShareExpiry {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if let Some(at) = parse_timestamp(trimmed) {
            return Ok(Self(at));
        }
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|midnight| Self(midnight.and_utc()))
            .ok_or_else(|| format!("invalid expiry '{input}' (expected YYYY-MM-DD or RFC 3339)"))
    }
}

impl Display for ShareExpiry {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.to_rfc3339())
    }
}

fn text_field(record: &Value, key: &str) -> Option<String> {
    record.get(key).and_then(Value::as_str).map(str::to_string)
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|at| at.with_timezone(&Utc))
}
