use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::debug;

use crate::Calibration;

/// Persistence boundary for calibration records, one per video.
pub trait CalibrationStore {
    fn load(&self, video_id: &str) -> Result<Option<Calibration>>;

    /// Insert or overwrite the record of `calibration.video_id`.
    fn save(&mut self, calibration: &Calibration) -> Result<()>;

    /// Returns whether a record was present.
    fn delete(&mut self, video_id: &str) -> Result<bool>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    records: HashMap<String, Calibration>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl CalibrationStore for InMemoryStore {
    fn load(&self, video_id: &str) -> Result<Option<Calibration>> {
        Ok(self.records.get(video_id).cloned())
    }

    fn save(&mut self, calibration: &Calibration) -> Result<()> {
        self.records
            .insert(calibration.video_id.clone(), calibration.clone());
        Ok(())
    }

    fn delete(&mut self, video_id: &str) -> Result<bool> {
        Ok(self.records.remove(video_id).is_some())
    }
}

/// Stores each record as a pretty-printed JSON file `<video id>.json`.
///
/// Characters outside `[A-Za-z0-9_-]` in the video id are percent-escaped in
/// the file name.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("failed to create store directory {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, video_id: &str) -> PathBuf {
        self.root.join(format!("{}.json", escape_file_stem(video_id)))
    }
}

impl CalibrationStore for JsonDirStore {
    fn load(&self, video_id: &str) -> Result<Option<Calibration>> {
        let path = self.path_for(video_id);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let record = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse calibration {}", path.display()))?;
        Ok(Some(record))
    }

    fn save(&mut self, calibration: &Calibration) -> Result<()> {
        let path = self.path_for(&calibration.video_id);
        let json = serde_json::to_string_pretty(calibration)?;
        fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))?;
        debug!("saved calibration {} to {}", calibration.id, path.display());
        Ok(())
    }

    fn delete(&mut self, video_id: &str) -> Result<bool> {
        let path = self.path_for(video_id);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).with_context(|| format!("failed to remove {}", path.display()))?;
        Ok(true)
    }
}

fn escape_file_stem(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for b in id.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchcal_core::{HomographyMatrix, ValidationMetrics};

    fn record(video_id: &str) -> Calibration {
        Calibration::new(
            video_id,
            HomographyMatrix::identity(),
            HomographyMatrix::identity(),
            Vec::new(),
            ValidationMetrics::empty(),
        )
    }

    #[test]
    fn escapes_unsafe_ids() {
        assert_eq!(escape_file_stem("match_01-a"), "match_01-a");
        assert_eq!(escape_file_stem("../x y"), "%2E%2E%2Fx%20y");
    }

    #[test]
    fn in_memory_store_overwrites_per_video() {
        let mut store = InMemoryStore::new();
        let a = record("a");
        store.save(&a).unwrap();
        store.save(&record("a")).unwrap();
        store.save(&record("b")).unwrap();
        assert_eq!(store.len(), 2);
        assert_ne!(store.load("a").unwrap().unwrap().id, a.id);
        assert!(store.delete("a").unwrap());
        assert!(!store.delete("a").unwrap());
        assert!(store.load("a").unwrap().is_none());
    }

    #[test]
    fn json_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonDirStore::open(dir.path().join("cal")).unwrap();
        let rec = record("clip/7");
        store.save(&rec).unwrap();
        assert!(store.path_for("clip/7").ends_with("clip%2F7.json"));
        assert_eq!(store.load("clip/7").unwrap(), Some(rec));
        assert!(store.load("other").unwrap().is_none());
        assert!(store.delete("clip/7").unwrap());
        assert!(store.load("clip/7").unwrap().is_none());
    }

    #[test]
    fn json_store_reloads_exact_floats_and_unmappable_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonDirStore::open(dir.path()).unwrap();
        let h = HomographyMatrix::from_rows([
            [-10.465107961715239, 0.1 + 0.2, 1.0 / 3.0],
            [9.773681209629216e-19, 2.0_f64.sqrt(), -7.0 / 11.0],
            [1e-4 / 3.0, 0.000_812_345_678_901_234_5, 1.0],
        ]);
        let metrics = ValidationMetrics {
            mean_error_meters: f64::INFINITY,
            max_error_meters: f64::INFINITY,
            point_count: 6,
            is_valid: false,
        };
        let rec = Calibration::new("far", h, h, Vec::new(), metrics);
        store.save(&rec).unwrap();
        assert_eq!(store.load("far").unwrap(), Some(rec));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirStore::open(dir.path()).unwrap();
        fs::write(store.path_for("bad"), "{ not json").unwrap();
        let err = store.load("bad").unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse calibration"));
    }
}
