//! Reference-consistency engine for Home Assistant configurations.
//!
//! Everything here operates on the `domain.name` identifiers that
//! automations, scripts, groups and dashboards use to point at entities
//! and services. The [`catalog`] module captures what exists, [`scan`]
//! finds what is referenced, [`suggest`] proposes repairs for the
//! difference, and [`audit`] ties them together into one pipeline that
//! each document kind plugs into.

pub mod audit;
pub mod catalog;
pub mod classify;
pub mod error;
pub mod ident;
pub mod names;
pub mod rename;
pub mod rewrite;
pub mod scan;
pub mod session;
pub mod suggest;

pub use audit::{
    AuditReport, AuditTarget, BrokenReference, DocumentRef, FixContext, FixDecision, Prompt,
    Resolution, run_audit,
};
pub use catalog::Catalog;
pub use classify::Classification;
pub use error::CoreError;
pub use session::Session;
