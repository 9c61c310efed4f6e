//! CLI command implementations

pub(crate) mod common;
pub(crate) mod mark_applied;
pub(crate) mod migrate;
pub(crate) mod status;
pub(crate) mod version;
