//! Plugin manager - Wires plugins to the remote client and owns the active tables

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

use crate::application::errors::{BotError, ListenerError};
use crate::application::events::{listener, Listener};
use crate::application::messaging::{CommandDispatcher, DispatchOutcome};
use crate::domain::entities::{CommandTable, Event, EventType, SharedCommandTable};
use crate::infrastructure::plugins::{LoadedPlugin, PluginCatalog, PluginLoader};
use crate::plugins::api::PluginApi;
use crate::plugins::trait_def::PluginInfo;

/// Remote client callback used to subscribe a listener
pub type AddListenerFn = Arc<dyn Fn(EventType, Listener) -> Result<(), ListenerError> + Send + Sync>;

/// Remote client callback used to unsubscribe a listener
pub type RemoveListenerFn = Arc<dyn Fn(EventType, &Listener) -> Result<(), ListenerError> + Send + Sync>;

/// Remote client callback used to drop the connection
pub type DisconnectFn = Arc<dyn Fn() -> Result<(), BotError> + Send + Sync>;

/// Active plugin table, replaced as a whole by each load
pub type PluginTable = Arc<HashMap<String, LoadedPlugin>>;

/// Lifecycle of a manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ManagerState {
    /// No listener callbacks yet
    Uninitialized,
    /// Listener callbacks set
    Wired,
    /// Command dispatcher subscribed to message events
    Listening,
}

/// State shared with the plugin APIs a manager hands out
pub(crate) struct HostState {
    state: RwLock<ManagerState>,
    add_listener: RwLock<Option<AddListenerFn>>,
    remove_listener: RwLock<Option<RemoveListenerFn>>,
    disconnect: RwLock<Option<DisconnectFn>>,
    pub(crate) commands: SharedCommandTable,
    plugins: RwLock<PluginTable>,
}

impl HostState {
    pub(crate) fn add_listener(&self) -> Result<AddListenerFn, ListenerError> {
        self.add_listener.read()
            .map_err(|_| ListenerError::Internal("Lock poisoned".to_string()))?
            .clone()
            .ok_or(ListenerError::NotWired)
    }

    pub(crate) fn remove_listener(&self) -> Result<RemoveListenerFn, ListenerError> {
        self.remove_listener.read()
            .map_err(|_| ListenerError::Internal("Lock poisoned".to_string()))?
            .clone()
            .ok_or(ListenerError::NotWired)
    }

    pub(crate) fn disconnect_callback(&self) -> Result<DisconnectFn, BotError> {
        self.disconnect.read()
            .map_err(|_| BotError::Internal("Lock poisoned".to_string()))?
            .clone()
            .ok_or(BotError::NotConnected)
    }
}

/// Manages plugins and commands for one bot instance
pub struct PluginManager {
    host: Arc<HostState>,
    loader: PluginLoader,
    dispatcher: CommandDispatcher,
}

impl PluginManager {
    /// Create a manager that builds plugins from `catalog`
    pub fn new(catalog: Arc<PluginCatalog>) -> Self {
        let commands: SharedCommandTable = Arc::new(RwLock::new(CommandTable::new()));

        Self {
            host: Arc::new(HostState {
                state: RwLock::new(ManagerState::Uninitialized),
                add_listener: RwLock::new(None),
                remove_listener: RwLock::new(None),
                disconnect: RwLock::new(None),
                commands: commands.clone(),
                plugins: RwLock::new(Arc::new(HashMap::new())),
            }),
            loader: PluginLoader::new(catalog),
            dispatcher: CommandDispatcher::new(commands),
        }
    }

    pub fn state(&self) -> ManagerState {
        self.host.state.read()
            .map(|s| *s)
            .unwrap_or(ManagerState::Uninitialized)
    }

    fn set_state(&self, state: ManagerState) -> Result<(), BotError> {
        let mut current = self.host.state.write()
            .map_err(|_| BotError::Internal("Lock poisoned".to_string()))?;
        *current = state;
        Ok(())
    }

    /// A fresh capability object bound to this manager
    pub fn plugin_api(&self) -> PluginApi {
        PluginApi::new(Arc::downgrade(&self.host))
    }

    /// Store the remote client's subscribe/unsubscribe functions
    pub fn set_event_listener_callbacks(&self, add: AddListenerFn, remove: RemoveListenerFn) -> Result<(), BotError> {
        *self.host.add_listener.write()
            .map_err(|_| BotError::Internal("Lock poisoned".to_string()))? = Some(add);
        *self.host.remove_listener.write()
            .map_err(|_| BotError::Internal("Lock poisoned".to_string()))? = Some(remove);

        if self.state() == ManagerState::Uninitialized {
            self.set_state(ManagerState::Wired)?;
        }
        Ok(())
    }

    /// Store the remote client's disconnect function
    pub fn set_disconnect_callback(&self, disconnect: DisconnectFn) -> Result<(), BotError> {
        *self.host.disconnect.write()
            .map_err(|_| BotError::Internal("Lock poisoned".to_string()))? = Some(disconnect);
        Ok(())
    }

    /// Subscribe the command dispatcher to message events
    pub fn create_event_listeners(&self) -> Result<(), BotError> {
        match self.state() {
            ManagerState::Uninitialized => return Err(BotError::NotWired),
            ManagerState::Listening => {
                debug!("Command dispatcher already listening");
                return Ok(());
            }
            ManagerState::Wired => {}
        }

        let dispatcher = self.dispatcher.clone();
        let on_message = listener(move |event| {
            dispatcher.handle_incoming(event);
            Ok(())
        });

        let add = self.host.add_listener()?;
        add(EventType::MessageCreate, on_message)?;

        self.set_state(ManagerState::Listening)
    }

    /// Load plugins from a directory, replacing the active plugin table
    ///
    /// The previous table stays active if the directory cannot be read.
    /// Returns the number of plugins registered.
    pub async fn load_plugins(&self, plugin_dir: impl AsRef<Path>) -> Result<usize, BotError> {
        let plugin_dir = plugin_dir.as_ref();
        let api = self.plugin_api();
        let active = self.active_plugins();

        let loaded = self.loader.load(plugin_dir, &api, &active).await?;
        let count = loaded.len();

        *self.host.plugins.write()
            .map_err(|_| BotError::Internal("Lock poisoned".to_string()))? = Arc::new(loaded);

        info!("{} plugins registered from {}", count, plugin_dir.display());
        Ok(count)
    }

    /// Snapshot of the active plugin table
    pub fn active_plugins(&self) -> PluginTable {
        self.host.plugins.read()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    /// Names of the registered commands, sorted
    pub fn active_commands(&self) -> Vec<String> {
        self.host.commands.read()
            .map(|c| c.names())
            .unwrap_or_default()
    }

    /// List all active plugins
    pub fn list_plugins(&self) -> Vec<PluginInfo> {
        let mut plugins: Vec<PluginInfo> = self.active_plugins().values().map(LoadedPlugin::info).collect();
        plugins.sort_by(|a, b| a.name.cmp(&b.name));
        plugins
    }

    /// Check if a plugin is active
    pub fn has_plugin(&self, name: &str) -> bool {
        self.active_plugins().contains_key(name)
    }

    /// Run the command dispatcher on an event directly
    pub fn dispatch(&self, event: &Event) -> DispatchOutcome {
        self.dispatcher.handle_incoming(event)
    }

    pub fn catalog(&self) -> &PluginCatalog {
        self.loader.catalog()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::EventListenerRegistry;
    use crate::domain::entities::{Channel, IncomingMessage, User};

    fn wire(manager: &PluginManager, registry: &Arc<EventListenerRegistry>) {
        let (add, remove) = (registry.clone(), registry.clone());
        manager
            .set_event_listener_callbacks(
                Arc::new(move |t: EventType, l: Listener| add.add(t, l)),
                Arc::new(move |t: EventType, l: &Listener| remove.remove(t, l)),
            )
            .unwrap();
    }

    #[test]
    fn test_state_transitions() {
        let manager = PluginManager::new(Arc::new(PluginCatalog::new()));
        assert_eq!(manager.state(), ManagerState::Uninitialized);
        assert!(matches!(manager.create_event_listeners(), Err(BotError::NotWired)));

        let registry = Arc::new(EventListenerRegistry::new());
        wire(&manager, &registry);
        assert_eq!(manager.state(), ManagerState::Wired);

        manager.create_event_listeners().unwrap();
        assert_eq!(manager.state(), ManagerState::Listening);
        assert_eq!(registry.listeners_for(EventType::MessageCreate).len(), 1);

        // Subscribing twice does not double-dispatch
        manager.create_event_listeners().unwrap();
        assert_eq!(registry.listeners_for(EventType::MessageCreate).len(), 1);
    }

    #[test]
    fn test_dispatcher_listener_runs_commands() {
        let manager = PluginManager::new(Arc::new(PluginCatalog::new()));
        let registry = Arc::new(EventListenerRegistry::new());
        wire(&manager, &registry);
        manager.create_event_listeners().unwrap();

        let hits = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = hits.clone();
        manager
            .plugin_api()
            .register_command("kill", move |_, args| {
                assert!(args.is_empty());
                counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Ok(())
            })
            .unwrap();

        let msg = IncomingMessage::new(User::new("admin"), Channel::new("general"), "!kill");
        registry.dispatch(&Event::message_create(msg));
        assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(manager.active_commands(), vec!["kill"]);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_table() {
        let manager = PluginManager::new(Arc::new(PluginCatalog::new()));
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(manager.load_plugins(dir.path()).await.unwrap(), 0);
        let before = manager.active_plugins();

        let missing = dir.path().join("a/fake/path");
        assert!(manager.load_plugins(&missing).await.is_err());
        assert!(Arc::ptr_eq(&before, &manager.active_plugins()));
    }
}
