#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

//! File-backed configuration store for the `ucb` client.
//!
//! Layout: `store.rs` (JSON key-value document on disk), `model.rs` (project and
//! target group records), `projects.rs` (project registry and current-project
//! pointer), `groups.rs` (target groups scoped to the current project).

pub mod error;
pub mod groups;
pub mod model;
pub mod projects;
pub mod store;

pub use error::{ConfigError, ConfigResult};
pub use groups::TargetGroupRegistry;
pub use model::{ClearOutcome, Project, ProjectListing, SettingKey, TargetGroup, UpdateMode};
pub use projects::ProjectRegistry;
pub use store::{ConfigStore, default_path};
