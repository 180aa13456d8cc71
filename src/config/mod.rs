//! Configuration management for the Eruption panel
//!
//! - **persistent**: user preferences stored as JSON under the XDG config dir

pub mod persistent;

pub use persistent::Settings;
