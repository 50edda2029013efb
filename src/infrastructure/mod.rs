//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading and path handling
//! - Plugins: Manifest discovery, the plugin catalog and the loader
//! - Adapters: Remote client implementations (Telegram, console)

pub mod config;
pub mod plugins;
pub mod adapters;
