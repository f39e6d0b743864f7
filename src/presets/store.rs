use super::{next_id, NewPreset, PresetError, PresetRepository, SavedApi};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Presets persisted as a pretty-printed JSON array
pub struct JsonPresetStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl JsonPresetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<SavedApi>, PresetError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(Vec::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, presets: &[SavedApi]) -> Result<(), PresetError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(presets)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl PresetRepository for JsonPresetStore {
    fn list(&self) -> Result<Vec<SavedApi>, PresetError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.read()
    }

    fn add(&self, preset: NewPreset) -> Result<SavedApi, PresetError> {
        preset.validate()?;
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut presets = self.read()?;
        let saved = preset.into_saved(next_id(&presets));
        presets.push(saved.clone());
        self.write(&presets)?;
        Ok(saved)
    }

    fn remove(&self, id: i64) -> Result<SavedApi, PresetError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut presets = self.read()?;
        let index = presets
            .iter()
            .position(|preset| preset.id == id)
            .ok_or(PresetError::NotFound(id))?;
        let removed = presets.remove(index);
        self.write(&presets)?;
        Ok(removed)
    }
}

/// In-process store for tests and ephemeral use
#[derive(Default)]
pub struct MemoryPresetStore {
    presets: Mutex<Vec<SavedApi>>,
}

impl MemoryPresetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PresetRepository for MemoryPresetStore {
    fn list(&self) -> Result<Vec<SavedApi>, PresetError> {
        Ok(self
            .presets
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }

    fn add(&self, preset: NewPreset) -> Result<SavedApi, PresetError> {
        preset.validate()?;
        let mut presets = self.presets.lock().unwrap_or_else(|e| e.into_inner());
        let saved = preset.into_saved(next_id(&presets));
        presets.push(saved.clone());
        Ok(saved)
    }

    fn remove(&self, id: i64) -> Result<SavedApi, PresetError> {
        let mut presets = self.presets.lock().unwrap_or_else(|e| e.into_inner());
        let index = presets
            .iter()
            .position(|preset| preset.id == id)
            .ok_or(PresetError::NotFound(id))?;
        Ok(presets.remove(index))
    }
}
