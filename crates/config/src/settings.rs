// Application settings
// Loaded from ~/.config/stocktake/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Store
    #[serde(rename = "store.path")]
    pub store_path: PathBuf,

    // Import
    #[serde(rename = "import.seedFile")]
    pub seed_file: Option<PathBuf>, // None = never seed

    #[serde(rename = "import.onStart")]
    pub import_on_start: bool,

    #[serde(rename = "import.delimiter")]
    pub delimiter: char,

    // Backup
    #[serde(rename = "backup.path")]
    pub backup_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("inventory.db"),
            seed_file: Some(PathBuf::from("inventory.csv")),
            import_on_start: true,
            delimiter: ',',
            backup_path: PathBuf::from("backup.csv"),
        }
    }
}

const DEFAULT_FILE: &str = r#"{
    // SQLite file holding the product catalog
    "store.path": "inventory.db",

    // Delimited file reconciled into the store when the menu starts
    // (set "import.seedFile" to null to disable)
    "import.seedFile": "inventory.csv",
    "import.onStart": true,
    "import.delimiter": ",",

    // Where the menu's backup command writes
    "backup.path": "backup.csv"
}
"#;

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stocktake");
        config_dir.join("settings.json")
    }

    /// Load settings from the default location, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load settings from `path`. A missing file is created with commented
    /// defaults; an unreadable or invalid one falls back to defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            Self::create_default_file(path);
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("error parsing {}: {}; using default settings", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("error reading {}: {}; using default settings", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON. Lines starting with `//` are comments.
    pub fn from_json(contents: &str) -> Result<Self, String> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        let settings: Settings = serde_json::from_str(&cleaned).map_err(|e| e.to_string())?;
        settings.delimiter_byte()?;
        Ok(settings)
    }

    /// The delimiter as a single byte, as the CSV reader wants it.
    pub fn delimiter_byte(&self) -> Result<u8, String> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(format!("import.delimiter must be a single ASCII character, got {:?}", self.delimiter))
        }
    }

    /// Seed file to reconcile on menu start, if seeding is enabled.
    pub fn seed_on_start(&self) -> Option<&Path> {
        if self.import_on_start {
            self.seed_file.as_deref()
        } else {
            None
        }
    }

    /// Create default settings file with comments
    fn create_default_file(path: &Path) {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("error creating config directory: {}", e);
                return;
            }
        }

        if let Err(e) = fs::write(path, DEFAULT_FILE) {
            log::warn!("error writing default settings.json: {}", e);
        }
    }
}
