//! Settings for the `profile-compile` binary
//!
//! Layered the same way profiles are merged:
//! 1. Built-in defaults
//! 2. Settings file (`--settings`, TOML or JSON)
//! 3. CLI flags

mod defaults;
mod effective;

pub use defaults::BuiltinDefaults;
pub use effective::{
    ConfigError, ConfigOrigin, ConfigSource, EffectiveSettings, OutputSettings, Settings,
};
