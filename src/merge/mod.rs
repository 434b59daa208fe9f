//! Merge engine
//!
//! - Scalars: child overrides parent
//! - Objects: deep-merge by key (recursive)
//! - Sequences: child REPLACES parent (no element-wise merge)
//! - Module lists: merged by identifier, `config` deep-merged, `source` inherited
//! - Agent fields: merged according to their shape

mod agents;
mod dict;
mod modules;

pub use agents::{merge_agents, merge_agents_discovery, AgentsShape};
pub use dict::{deep_merge, merge_dicts, merge_layers};
pub use modules::{merge_module_item, merge_module_lists, record_id, IdField};
