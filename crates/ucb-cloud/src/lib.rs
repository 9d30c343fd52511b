#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(missing_docs, unreachable_pub, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

//! Client for the remote build service.
//!
//! Layout: `client.rs` (authenticated HTTP plumbing), `session.rs` (calls scoped
//! to one project), `model.rs` (build records and selectors), `query.rs` (build
//! lookup across target groups), `share.rs` (share-link mutations).
//!
//! # Design
//! - Services receive an explicit [`SessionContext`]; there is no global state.
//! - Remote calls run one at a time in target order.
//! - Group resolution stays with the caller; services take target ids.

pub mod client;
pub mod error;
pub mod model;
pub mod query;
pub mod session;
pub mod share;

pub use client::{CloudClient, Credentials, DEFAULT_ENDPOINT, HEADER_REQUEST_ID, SEARCH_PAGE_SIZE};
pub use error::{RemoteError, RemoteResult};
pub use model::{
    BuildInfo, BuildSelector, LinkSelector, RemoteProject, SHARE_PAGE_URL, ShareExpiry, ShareLink,
};
pub use query::BuildQueryService;
pub use session::SessionContext;
pub use share::ShareLinkService;
