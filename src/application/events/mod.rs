//! Event listener registry shared by remote client implementations

pub mod registry;

pub use registry::{listener, EventListenerRegistry, Listener, ListenerResult};
