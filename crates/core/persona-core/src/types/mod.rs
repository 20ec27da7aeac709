//! Core type definitions shared by persona engines

pub mod components;
pub mod plugin;
pub mod service;
pub mod state;

pub use components::*;
pub use plugin::*;
pub use service::*;
pub use state::*;
