//! Profile Compiler - layered profile and agent resolution
//!
//! Merges a base profile with an ordered chain of overlay profiles and the
//! fragments of loaded agents into one mount plan, the flat configuration a
//! host runtime uses to instantiate a session.

pub mod compiler;
pub mod config;
pub mod document;
pub mod exclude;
pub mod loader;
pub mod logging;
pub mod merge;
pub mod profile;
pub mod redact;

pub use compiler::{compile, resolve_agent_session, CompileError, Compiler};
pub use document::{load_document, Document, DocumentError};
pub use exclude::apply_exclusions;
pub use loader::{AgentLoadError, AgentLoader, StaticAgentLoader};
pub use profile::{merge_chain, merge_profile};
pub use profile_schema as schema;
