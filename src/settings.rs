use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

pub const CURRENT_VERSION: u32 = 1;
const SETTINGS_FILENAME: &str = "config.yaml";
const PREFERENCES_FILENAME: &str = "preferences.yaml";
const APP_NAME: &str = "quran-viewer";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Location of the document the viewer opens
    #[serde(default = "default_document")]
    pub document: String,

    /// Directory the page surfaces are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Pages rendered ahead of and behind each visible page
    #[serde(default = "default_render_buffer")]
    pub render_buffer: usize,

    #[serde(default = "default_min_zoom")]
    pub min_zoom: f32,

    #[serde(default = "default_max_zoom")]
    pub max_zoom: f32,

    #[serde(default = "default_zoom_step")]
    pub zoom_step: f32,

    #[serde(default = "default_resize_debounce_ms")]
    pub resize_debounce_ms: u64,

    /// Minimum horizontal travel for a swipe, in pixels
    #[serde(default = "default_swipe_threshold")]
    pub swipe_threshold: f32,

    #[serde(default = "default_viewport_width")]
    pub viewport_width: f32,

    #[serde(default = "default_viewport_height")]
    pub viewport_height: f32,

    #[serde(default = "default_page_gap")]
    pub page_gap: f32,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_document() -> String {
    "am_Translation_of_Amharic_Quran.pdf".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("pages")
}

fn default_render_buffer() -> usize {
    crate::pdf::DEFAULT_RENDER_BUFFER
}

fn default_min_zoom() -> f32 {
    crate::pdf::Zoom::MIN_SCALE
}

fn default_max_zoom() -> f32 {
    crate::pdf::Zoom::MAX_SCALE
}

fn default_zoom_step() -> f32 {
    crate::pdf::Zoom::STEP
}

fn default_resize_debounce_ms() -> u64 {
    300
}

fn default_swipe_threshold() -> f32 {
    50.0
}

fn default_viewport_width() -> f32 {
    1280.0
}

fn default_viewport_height() -> f32 {
    800.0
}

fn default_page_gap() -> f32 {
    crate::pdf::layout::PAGE_GAP
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("quran-viewer.log")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            document: default_document(),
            output_dir: default_output_dir(),
            render_buffer: default_render_buffer(),
            min_zoom: default_min_zoom(),
            max_zoom: default_max_zoom(),
            zoom_step: default_zoom_step(),
            resize_debounce_ms: default_resize_debounce_ms(),
            swipe_threshold: default_swipe_threshold(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            page_gap: default_page_gap(),
            log_level: default_log_level(),
            log_file: default_log_file(),
        }
    }
}

impl Settings {
    pub fn zoom(&self) -> crate::pdf::Zoom {
        crate::pdf::Zoom::with_bounds(self.min_zoom, self.max_zoom, self.zoom_step)
    }

    pub fn resize_debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.resize_debounce_ms)
    }
}

pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME))
}

pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(SETTINGS_FILENAME))
}

pub fn default_preferences_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(PREFERENCES_FILENAME))
}

/// Load settings from `path`, writing defaults there if the file is missing.
/// Unreadable or malformed files fall back to defaults so the viewer can
/// still start.
pub fn load_settings(path: &Path) -> Settings {
    if !path.exists() {
        info!("Settings file not found, creating with defaults at {path:?}");
        let settings = Settings::default();
        save_settings_to_file(&settings, path);
        return settings;
    }

    match fs::read_to_string(path) {
        Ok(content) => match serde_yaml::from_str::<Settings>(&content) {
            Ok(mut settings) => {
                debug!("Loaded settings from {path:?}");
                if settings.version < CURRENT_VERSION {
                    migrate_settings(&mut settings);
                    save_settings_to_file(&settings, path);
                }
                settings
            }
            Err(e) => {
                error!("Failed to parse settings file {path:?}: {e}");
                Settings::default()
            }
        },
        Err(e) => {
            error!("Failed to read settings file {path:?}: {e}");
            Settings::default()
        }
    }
}

fn migrate_settings(settings: &mut Settings) {
    info!(
        "Migrating settings from v{} to v{}",
        settings.version, CURRENT_VERSION
    );
    settings.version = CURRENT_VERSION;
}

pub fn save_settings_to_file(settings: &Settings, path: &Path) {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create config directory {parent:?}: {e}");
                return;
            }
        }
    }

    let body = match serde_yaml::to_string(settings) {
        Ok(body) => body,
        Err(e) => {
            error!("Failed to serialize settings: {e}");
            return;
        }
    };
    let content = format!("{SETTINGS_HEADER}{body}");

    match fs::write(path, content) {
        Ok(()) => debug!("Saved settings to {path:?}"),
        Err(e) => error!("Failed to save settings to {path:?}: {e}"),
    }
}

const SETTINGS_HEADER: &str = r#"# ============================================================================
# quran-viewer settings
# ============================================================================
# document:           path of the PDF to open
# render_buffer:      pages pre-rendered on each side of the visible ones
# min_zoom/max_zoom:  zoom bounds; zoom_step is the +/- increment
# resize_debounce_ms: quiet period before a resize re-renders

"#;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to write preferences to {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode preferences: {0}")]
    Encode(#[from] serde_yaml::Error),
}

/// Persistent key-value store scoped to the user profile
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Store that lives only as long as the process
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences persisted as a flat YAML map
#[derive(Debug)]
pub struct YamlFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl YamlFileStore {
    /// Open the store at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
                warn!("Ignoring malformed preferences file {path:?}: {e}");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("Failed to read preferences file {path:?}: {e}");
                BTreeMap::new()
            }
        };
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for YamlFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        let content = serde_yaml::to_string(&self.values)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        fs::write(&self.path, content).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_settings_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let settings = load_settings(&path);
        assert_eq!(settings, Settings::default());
        assert!(path.exists());
        assert_eq!(load_settings(&path), Settings::default());
    }

    #[test]
    fn partial_settings_fill_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "render_buffer: 4\nmax_zoom: 2.0\n").unwrap();

        let settings = load_settings(&path);
        assert_eq!(settings.render_buffer, 4);
        assert_eq!(settings.max_zoom, 2.0);
        assert_eq!(settings.min_zoom, 0.5);
        assert_eq!(settings.resize_debounce_ms, 300);
    }

    #[test]
    fn malformed_settings_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "render_buffer: [oops").unwrap();
        assert_eq!(load_settings(&path), Settings::default());
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs").join("preferences.yaml");

        let mut store = YamlFileStore::open(&path);
        assert_eq!(store.get(crate::theme::THEME_KEY), None);
        store.set(crate::theme::THEME_KEY, "dark").unwrap();

        let reopened = YamlFileStore::open(&path);
        assert_eq!(reopened.path(), path.as_path());
        assert_eq!(
            reopened.get(crate::theme::THEME_KEY).as_deref(),
            Some("dark")
        );
    }

    #[test]
    fn malformed_store_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.yaml");
        fs::write(&path, "- not\n- a map\n").unwrap();
        assert_eq!(YamlFileStore::open(&path).get("anything"), None);
    }
}
