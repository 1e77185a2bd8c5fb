//! Configuration management for the hot-reload server.
//!
//! Configuration comes from command-line arguments and environment
//! variables (see the binary's `Cli`); this module owns the validated,
//! immutable settings struct the rest of the crate consumes.

mod settings;

pub use settings::Config;
