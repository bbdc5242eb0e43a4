// src/storage/mod.rs
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::tibia::client::TibiaResponse;
use crate::utils::error::StorageError;

/// Writes fetched records to disk as `<base_dir>/<kind>/<key>.json`.
pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }
        Ok(Self { base_dir: base_path })
    }

    fn target_dir(&self, kind: &str) -> Result<PathBuf, StorageError> {
        let target_dir = self.base_dir.join(file_key(kind));
        if !target_dir.exists() {
            fs::create_dir_all(&target_dir).map_err(StorageError::IoError)?;
        }
        Ok(target_dir)
    }

    /// Saves a record as pretty-printed JSON, replacing any previous copy.
    pub fn save_record<T: Serialize>(&self, kind: &str, key: &str, record: &T) -> Result<PathBuf, StorageError> {
        let file_path = self.target_dir(kind)?.join(format!("{}.json", file_key(key)));
        let content =
            serde_json::to_string_pretty(record).map_err(|e| StorageError::SerializationError(e.to_string()))?;

        let mut file = fs::File::create(&file_path).map_err(StorageError::IoError)?;
        file.write_all(content.as_bytes()).map_err(StorageError::IoError)?;

        tracing::info!("Saved {} record to {}", kind, file_path.display());
        Ok(file_path)
    }

    /// Saves the fetch metadata of a response next to its record.
    pub fn save_metadata<D>(&self, kind: &str, key: &str, response: &TibiaResponse<D>) -> Result<PathBuf, StorageError> {
        let file_path = self.target_dir(kind)?.join(format!("{}_meta.json", file_key(key)));

        let metadata = serde_json::json!({
            "kind": kind,
            "key": key,
            "fetched_at": response.timestamp.to_rfc3339(),
            "cached": response.cached,
            "age": response.age,
            "fetching_time_ms": response.fetching_time.as_millis() as u64,
            "parsing_time_ms": response.parsing_time.as_millis() as u64,
            "seconds_left": response.seconds_left(),
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });
        let metadata_str =
            serde_json::to_string_pretty(&metadata).map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, metadata_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved metadata to {}", file_path.display());
        Ok(file_path)
    }
}

/// Lowercase file-system friendly form of a name: `Bubble Fan+` becomes `bubble_fan`.
fn file_key(raw: &str) -> String {
    let key: String = raw
        .trim()
        .chars()
        .filter_map(|c| match c {
            c if c.is_alphanumeric() => Some(c.to_ascii_lowercase()),
            ' ' | '-' | '_' => Some('_'),
            _ => None,
        })
        .collect();
    if key.is_empty() {
        "unnamed".to_string()
    } else {
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tibia_extract_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_file_key() {
        assert_eq!(file_key("Bubble Fan+"), "bubble_fan");
        assert_eq!(file_key("Red Rose-Knights"), "red_rose_knights");
        assert_eq!(file_key("  "), "unnamed");
    }

    #[test]
    fn test_save_record_and_metadata() {
        let dir = temp_dir("storage");
        let storage = StorageManager::new(&dir).unwrap();

        let record = serde_json::json!({"name": "Antica", "online_count": 512});
        let path = storage.save_record("world", "Antica", &record).unwrap();
        assert_eq!(path, dir.join("world").join("antica.json"));
        let saved: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved, record);

        let response = TibiaResponse {
            timestamp: chrono::Utc::now(),
            cached: true,
            age: 30,
            fetching_time: Duration::from_millis(120),
            parsing_time: Duration::from_millis(4),
            cache_ttl: Duration::from_secs(300),
            data: (),
        };
        let meta_path = storage.save_metadata("world", "Antica", &response).unwrap();
        let meta: serde_json::Value = serde_json::from_str(&fs::read_to_string(&meta_path).unwrap()).unwrap();
        assert_eq!(meta["cached"], true);
        assert_eq!(meta["age"], 30);
        assert_eq!(meta["fetching_time_ms"], 120);

        let _ = fs::remove_dir_all(&dir);
    }
}
