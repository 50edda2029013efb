//! Plugin loader - Discovers plugin manifests in a directory and registers them

use std::collections::HashMap;
use std::fmt;
use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::manifest::PluginManifest;
use super::registry::PluginCatalog;
use crate::application::errors::PluginError;
use crate::application::guard::guarded;
use crate::plugins::api::PluginApi;
use crate::plugins::trait_def::{Plugin, PluginInfo};

/// Extension of single-file plugins
pub const PLUGIN_EXTENSION: &str = ".yaml";

/// Manifest file expected inside a plugin directory
pub const PLUGIN_ENTRY_FILE: &str = "plugin.yaml";

/// A plugin that registered successfully
#[derive(Clone)]
pub struct LoadedPlugin {
    pub name: String,
    pub path: PathBuf,
    pub manifest: PluginManifest,
    /// Whatever the plugin's `register` returned
    pub result: Option<serde_json::Value>,
    instance: Arc<dyn Plugin>,
}

impl LoadedPlugin {
    pub fn info(&self) -> PluginInfo {
        PluginInfo {
            name: self.name.clone(),
            entry: self.manifest.entry_or(&self.name).to_string(),
            path: self.path.clone(),
            description: self.manifest.description.clone()
                .unwrap_or_else(|| self.instance.description().to_string()),
            result: self.result.clone(),
        }
    }
}

impl fmt::Debug for LoadedPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedPlugin")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("result", &self.result)
            .finish_non_exhaustive()
    }
}

/// A directory entry that looks like a plugin
#[derive(Debug, Clone, PartialEq, Eq)]
struct Candidate {
    name: String,
    manifest_path: PathBuf,
}

/// Replace every whitespace character with an underscore
pub fn sanitize_plugin_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

/// Entries with "disabled" anywhere in their name are skipped
pub fn is_disabled(file_name: &str) -> bool {
    file_name.to_lowercase().contains("disabled")
}

/// Classify a directory entry; `None` for files without the plugin extension
fn candidate(file_name: &str, path: &Path, metadata: &Metadata) -> Option<Candidate> {
    if metadata.is_dir() {
        return Some(Candidate {
            name: file_name.to_string(),
            manifest_path: path.join(PLUGIN_ENTRY_FILE),
        });
    }

    file_name.strip_suffix(PLUGIN_EXTENSION).map(|stem| Candidate {
        name: stem.to_string(),
        manifest_path: path.to_path_buf(),
    })
}

/// Plugin loader
pub struct PluginLoader {
    catalog: Arc<PluginCatalog>,
}

impl PluginLoader {
    pub fn new(catalog: Arc<PluginCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &PluginCatalog {
        &self.catalog
    }

    /// Load every plugin in `plugin_dir`
    ///
    /// Names already present in `active` or earlier in this scan are skipped.
    /// Individual entries that fail are logged and skipped; only an
    /// unreadable directory fails the whole call.
    pub async fn load(
        &self,
        plugin_dir: &Path,
        api: &PluginApi,
        active: &HashMap<String, LoadedPlugin>,
    ) -> Result<HashMap<String, LoadedPlugin>, PluginError> {
        let mut entries = tokio::fs::read_dir(plugin_dir)
            .await
            .map_err(|source| PluginError::DirectoryUnreadable {
                path: plugin_dir.to_path_buf(),
                source,
            })?;

        let mut loaded = HashMap::new();

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!("Plugin Registry: stopped reading {}: {}", plugin_dir.display(), e);
                    break;
                }
            };

            let path = entry.path();
            let file_name = entry.file_name().to_string_lossy().into_owned();

            let metadata = match tokio::fs::metadata(&path).await {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!("Plugin Registry: {}: {}. Skipping...", path.display(), e);
                    continue;
                }
            };

            if is_disabled(&file_name) {
                info!("Plugin Registry: {} is disabled, skipping", file_name);
                continue;
            }

            let Some(candidate) = candidate(&file_name, &path, &metadata) else {
                continue;
            };

            let name = sanitize_plugin_name(&candidate.name);
            if name.is_empty() {
                info!("Plugin Registry: {} is not a valid plugin name, skipping", file_name);
                continue;
            }

            if active.contains_key(&name) || loaded.contains_key(&name) {
                error!("{}. Duplicate addition has been skipped.", PluginError::Duplicate(name));
                continue;
            }

            match self.load_plugin(&name, &candidate.manifest_path, api).await {
                Ok(plugin) => {
                    loaded.insert(name, plugin);
                }
                Err(PluginError::ManifestRead { path, source }) if source.kind() == ErrorKind::NotFound => {
                    warn!("Plugin Registry: {} has no manifest at {}, skipping", name, path.display());
                }
                Err(e) => {
                    error!("Error registering plugin {}: {}", name, e);
                }
            }
        }

        Ok(loaded)
    }

    /// Build one plugin from its manifest and run its registration
    pub async fn load_plugin(
        &self,
        name: &str,
        manifest_path: &Path,
        api: &PluginApi,
    ) -> Result<LoadedPlugin, PluginError> {
        let manifest = PluginManifest::from_file(manifest_path).await?;
        let entry = manifest.entry_or(name).to_string();
        let instance: Arc<dyn Plugin> = Arc::from(self.catalog.instantiate(&entry, &manifest)?);

        let result = guarded(|| instance.register(api))
            .map_err(|panic| PluginError::Registration(format!("panicked: {}", panic)))??;

        info!("Loaded plugin: {} ({})", name, entry);

        Ok(LoadedPlugin {
            name: name.to_string(),
            path: manifest_path.to_path_buf(),
            manifest,
            result,
            instance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_plugin_name() {
        assert_eq!(sanitize_plugin_name("my plugin\tv2"), "my_plugin_v2");
        assert_eq!(sanitize_plugin_name("plain"), "plain");
        assert_eq!(sanitize_plugin_name(""), "");
    }

    #[test]
    fn test_is_disabled_ignores_case() {
        assert!(is_disabled("greeter.DISABLED.yaml"));
        assert!(is_disabled("Disabled_plugin"));
        assert!(!is_disabled("greeter.yaml"));
    }

    #[test]
    fn test_candidate_classification() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("greeter.yaml");
        std::fs::write(&file, "").unwrap();
        let other = dir.path().join("notes.txt");
        std::fs::write(&other, "").unwrap();
        let sub = dir.path().join("bundle");
        std::fs::create_dir(&sub).unwrap();

        let as_file = candidate("greeter.yaml", &file, &std::fs::metadata(&file).unwrap()).unwrap();
        assert_eq!(as_file.name, "greeter");
        assert_eq!(as_file.manifest_path, file);

        assert!(candidate("notes.txt", &other, &std::fs::metadata(&other).unwrap()).is_none());

        let as_dir = candidate("bundle", &sub, &std::fs::metadata(&sub).unwrap()).unwrap();
        assert_eq!(as_dir.name, "bundle");
        assert_eq!(as_dir.manifest_path, sub.join("plugin.yaml"));

        let bare = dir.path().join(".yaml");
        std::fs::write(&bare, "").unwrap();
        let nameless = candidate(".yaml", &bare, &std::fs::metadata(&bare).unwrap()).unwrap();
        assert_eq!(sanitize_plugin_name(&nameless.name), "");
    }
}
