//! Domain layer - Core types with no knowledge of plugins or transports
//! 
//! This layer contains:
//! - Entities: Messages, events, users and commands
//! - Traits: The remote client abstraction the host is wired to

pub mod entities;
pub mod traits;
