//! Application layer - Event routing and command handling
//! 
//! This layer contains:
//! - Errors: Domain-specific errors
//! - Events: The listener registry clients dispatch through
//! - Messaging: Command parsing and dispatching
//! - Guard: Panic isolation for plugin callbacks

pub mod errors;
pub mod events;
pub mod guard;
pub mod messaging;
