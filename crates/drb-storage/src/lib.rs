use chrono::NaiveDateTime;
use drb_core::{CoreError, Registry, ReminderDef, StatusMap};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const REGISTRY_FILE: &str = "reminders.json";
pub const STATUS_FILE: &str = "status.json";
/// Status file written by the historical implementation; read-only
/// fallback, migrated to `status.json` on the next save.
pub const LEGACY_STATUS_FILE: &str = "reminder_status.txt";

pub const STATUS_SCHEMA_VERSION: u32 = 1;

/// Wire format for completion markers, shared with the legacy file.
pub const MARKER_FORMAT: &str = "%Y-%m-%d %H:%M";
const LEGACY_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid registry: {0}")]
    Registry(#[from] CoreError),
    #[error("invalid status marker for '{name}': {value}")]
    Marker { name: String, value: String },
    #[error("unsupported status schema version {found}, max supported {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("no data directory available for this platform")]
    NoDataDir,
}

#[derive(Debug, Serialize, Deserialize)]
struct StatusFile {
    version: u32,
    done_until: BTreeMap<String, String>,
}

/// Flat-file store for the registry and status map. Every save rewrites
/// the whole file via a temp-file rename, so readers never observe a
/// partial write.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Opens the store at the resolved data directory: an explicit path
    /// wins, then `DRB_DATA_DIR`, then the platform data dir.
    pub fn open_default(explicit: Option<&Path>) -> Result<Self, StorageError> {
        Ok(Self::open(resolve_data_dir(explicit)?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn registry_path(&self) -> PathBuf {
        self.dir.join(REGISTRY_FILE)
    }

    pub fn status_path(&self) -> PathBuf {
        self.dir.join(STATUS_FILE)
    }

    /// Loads the registry, or the built-in defaults when no file exists
    /// yet. The defaults are not written back until the first save.
    pub fn load_registry(&self) -> Result<Registry, StorageError> {
        let path = self.registry_path();
        if !path.exists() {
            return Ok(default_registry());
        }
        let content = fs::read_to_string(&path)?;
        let defs: Vec<ReminderDef> = serde_json::from_str(&content)?;
        Ok(Registry::from_defs(defs)?)
    }

    pub fn save_registry(&self, registry: &Registry) -> Result<(), StorageError> {
        let payload = serde_json::to_string_pretty(registry.defs())?;
        write_atomic(&self.registry_path(), &payload)
    }

    /// Loads the status map from `status.json`, falling back to the
    /// legacy line-format file. Missing files yield an empty map.
    pub fn load_status(&self) -> Result<StatusMap, StorageError> {
        let path = self.status_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            return parse_status(&content);
        }
        let legacy = self.dir.join(LEGACY_STATUS_FILE);
        if legacy.exists() {
            let content = fs::read_to_string(&legacy)?;
            return Ok(parse_legacy_status(&content));
        }
        Ok(StatusMap::new())
    }

    pub fn save_status(&self, status: &StatusMap) -> Result<(), StorageError> {
        let file = StatusFile {
            version: STATUS_SCHEMA_VERSION,
            done_until: status
                .iter()
                .map(|(name, marker)| (name.clone(), marker.format(MARKER_FORMAT).to_string()))
                .collect(),
        };
        let payload = serde_json::to_string_pretty(&file)?;
        write_atomic(&self.status_path(), &payload)
    }
}

/// The registry shipped on first run, before any file exists.
pub fn default_registry() -> Registry {
    let defs = [("HSR", 3), ("Wuwa", 3), ("ZZZ", 3), ("GFL2", 15), ("Wows", 1)]
        .into_iter()
        .map(|(name, reset_hour)| ReminderDef {
            name: name.to_string(),
            reset_hour,
            reset_minute: 0,
        })
        .collect();
    Registry::from_defs(defs).unwrap_or_default()
}

pub fn resolve_data_dir(explicit: Option<&Path>) -> Result<PathBuf, StorageError> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    if let Ok(value) = std::env::var("DRB_DATA_DIR") {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }
    dirs::data_dir()
        .map(|dir| dir.join("daily-reset-board"))
        .ok_or(StorageError::NoDataDir)
}

fn parse_status(content: &str) -> Result<StatusMap, StorageError> {
    if content.trim().is_empty() {
        return Ok(StatusMap::new());
    }
    let file: StatusFile = match serde_json::from_str(content) {
        Ok(file) => file,
        // Legacy line-format content pointed at the JSON path still loads.
        Err(_) => return Ok(parse_legacy_status(content)),
    };
    if file.version > STATUS_SCHEMA_VERSION {
        return Err(StorageError::UnsupportedVersion {
            found: file.version,
            supported: STATUS_SCHEMA_VERSION,
        });
    }
    let mut status = StatusMap::new();
    for (name, value) in file.done_until {
        let marker = NaiveDateTime::parse_from_str(&value, MARKER_FORMAT)
            .map_err(|_| StorageError::Marker {
                name: name.clone(),
                value: value.clone(),
            })?;
        status.insert(name, marker);
    }
    Ok(status)
}

/// Legacy `name,value` lines. An empty value means "not done"; a bare
/// date (the day-only variant) is read as done through the end of that
/// calendar day. Unparseable markers are dropped rather than failing
/// the load, matching how the old app shrugged them off.
fn parse_legacy_status(content: &str) -> StatusMap {
    let mut status = StatusMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((name, value)) = line.split_once(',') else {
            continue;
        };
        let (name, value) = (name.trim(), value.trim());
        if name.is_empty() || value.is_empty() {
            continue;
        }
        let marker = NaiveDateTime::parse_from_str(value, MARKER_FORMAT)
            .ok()
            .or_else(|| {
                chrono::NaiveDate::parse_from_str(value, LEGACY_DATE_FORMAT)
                    .ok()
                    .and_then(|date| date.succ_opt())
                    .and_then(|next_day| next_day.and_hms_opt(0, 0, 0))
            });
        if let Some(marker) = marker {
            status.insert(name.to_string(), marker);
        }
    }
    status
}

fn write_atomic(path: &Path, payload: &str) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, payload)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .expect("valid date")
            .and_hms_opt(h, mi, 0)
            .expect("valid time")
    }

    #[test]
    fn missing_registry_yields_defaults_without_creating_the_file() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileStore::open(dir.path());

        let registry = store.load_registry().expect("load");
        let names: Vec<&str> = registry.iter().map(|def| def.name.as_str()).collect();
        assert_eq!(names, vec!["HSR", "Wuwa", "ZZZ", "GFL2", "Wows"]);
        assert!(!store.registry_path().exists());
    }

    #[test]
    fn registry_round_trip_preserves_order_and_minutes() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileStore::open(dir.path());

        let mut registry = Registry::new();
        registry.add("Wows", 1, 0).expect("add");
        registry.add("HSR", 3, 30).expect("add");
        store.save_registry(&registry).expect("save");

        let loaded = store.load_registry().expect("load");
        assert_eq!(loaded, registry);
    }

    #[test]
    fn registry_file_without_minutes_defaults_them_to_zero() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileStore::open(dir.path());
        fs::write(
            store.registry_path(),
            r#"[{"name": "HSR", "reset_hour": 3}]"#,
        )
        .expect("write registry");

        let registry = store.load_registry().expect("load");
        let def = registry.get("HSR").expect("HSR present");
        assert_eq!(def.reset_minute, 0);
    }

    #[test]
    fn registry_file_with_duplicate_names_is_rejected() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileStore::open(dir.path());
        fs::write(
            store.registry_path(),
            r#"[{"name": "A", "reset_hour": 3}, {"name": "A", "reset_hour": 4}]"#,
        )
        .expect("write registry");

        assert!(matches!(
            store.load_registry(),
            Err(StorageError::Registry(_))
        ));
    }

    #[test]
    fn status_round_trip() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileStore::open(dir.path());

        let mut status = StatusMap::new();
        status.insert("HSR".to_string(), at(2026, 8, 8, 3, 0));
        status.insert("Wows".to_string(), at(2026, 8, 8, 1, 0));
        store.save_status(&status).expect("save");

        let loaded = store.load_status().expect("load");
        assert_eq!(loaded, status);
    }

    #[test]
    fn missing_status_file_yields_empty_map() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileStore::open(dir.path());
        assert!(store.load_status().expect("load").is_empty());
    }

    #[test]
    fn legacy_status_lines_are_read_and_migrated_on_save() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileStore::open(dir.path());
        fs::write(
            dir.path().join(LEGACY_STATUS_FILE),
            "HSR,2026-08-08 03:00\nWuwa,\nZZZ,garbage\n",
        )
        .expect("write legacy");

        let status = store.load_status().expect("load");
        assert_eq!(status.get("HSR"), Some(&at(2026, 8, 8, 3, 0)));
        assert!(!status.contains_key("Wuwa"));
        assert!(!status.contains_key("ZZZ"));

        store.save_status(&status).expect("save");
        assert!(store.status_path().exists());
        let reloaded = store.load_status().expect("reload");
        assert_eq!(reloaded, status);
    }

    #[test]
    fn legacy_day_only_marker_reads_as_done_through_that_day() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileStore::open(dir.path());
        fs::write(dir.path().join(LEGACY_STATUS_FILE), "HSR,2026-08-07\n").expect("write legacy");

        let status = store.load_status().expect("load");
        assert_eq!(status.get("HSR"), Some(&at(2026, 8, 8, 0, 0)));
    }

    #[test]
    fn future_status_schema_version_is_rejected() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileStore::open(dir.path());
        fs::write(
            store.status_path(),
            r#"{"version": 99, "done_until": {}}"#,
        )
        .expect("write status");

        assert!(matches!(
            store.load_status(),
            Err(StorageError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn corrupt_marker_in_current_format_is_an_error() {
        let dir = TempDir::new().expect("temp dir");
        let store = FileStore::open(dir.path());
        fs::write(
            store.status_path(),
            r#"{"version": 1, "done_until": {"HSR": "not a time"}}"#,
        )
        .expect("write status");

        assert!(matches!(
            store.load_status(),
            Err(StorageError::Marker { .. })
        ));
    }

    #[test]
    fn save_creates_the_data_directory_on_demand() {
        let dir = TempDir::new().expect("temp dir");
        let nested = dir.path().join("deep/data");
        let store = FileStore::open(&nested);

        store.save_status(&StatusMap::new()).expect("save");
        assert!(nested.join(STATUS_FILE).exists());
    }

    #[test]
    fn resolve_data_dir_prefers_explicit_path() {
        let dir = resolve_data_dir(Some(Path::new("/tmp/custom"))).expect("resolve");
        assert_eq!(dir, PathBuf::from("/tmp/custom"));
    }
}
