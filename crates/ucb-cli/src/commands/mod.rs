//! Command handlers grouped by concern.

pub(crate) mod build;
pub(crate) mod config;
pub(crate) mod project;
pub(crate) mod share;
pub(crate) mod target;
