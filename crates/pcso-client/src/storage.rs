//! JSON artifacts on disk.

use std::{
    fs,
    path::{Path, PathBuf},
};

use pcso_core::{Dataset, PersistedDataset, StatisticsTable, dataset::DatasetError};
use serde::{Serialize, de::DeserializeOwned};

use crate::config::OutputConfig;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

impl StorageError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Serialize `value` next to `path` and rename it into place, so readers never see a partial file
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|e| StorageError::io(&dir, e))?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact.json".to_owned());
    let temp = dir.join(format!(".{file_name}.{}.tmp", uuid::Uuid::new_v4().simple()));

    let json = serde_json::to_vec_pretty(value).map_err(|e| StorageError::json(path, e))?;
    if let Err(e) = fs::write(&temp, json) {
        fs::remove_file(&temp).ok();
        return Err(StorageError::io(&temp, e));
    }
    if let Err(e) = fs::rename(&temp, path) {
        fs::remove_file(&temp).ok();
        return Err(StorageError::io(path, e));
    }

    log::debug!("wrote {}", path.display());
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let bytes = fs::read(path).map_err(|e| StorageError::io(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| StorageError::json(path, e))
}

/// Where the dataset and statistics artifacts live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactStore {
    dataset_path: PathBuf,
    statistics_path: PathBuf,
}

impl ArtifactStore {
    pub fn new(dataset_path: impl Into<PathBuf>, statistics_path: impl Into<PathBuf>) -> Self {
        Self {
            dataset_path: dataset_path.into(),
            statistics_path: statistics_path.into(),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(config.dataset_path(), config.statistics_path())
    }

    pub fn dataset_path(&self) -> &Path {
        &self.dataset_path
    }

    pub fn statistics_path(&self) -> &Path {
        &self.statistics_path
    }

    pub fn write_dataset(&self, dataset: &Dataset) -> Result<(), StorageError> {
        write_json_atomic(&self.dataset_path, &dataset.to_persisted())
    }

    pub fn write_statistics(&self, table: &StatisticsTable) -> Result<(), StorageError> {
        write_json_atomic(&self.statistics_path, table)
    }

    pub fn read_dataset(&self) -> Result<Dataset, StorageError> {
        let persisted: PersistedDataset = read_json(&self.dataset_path)?;
        Ok(Dataset::try_from(persisted)?)
    }

    pub fn read_statistics(&self) -> Result<StatisticsTable, StorageError> {
        read_json(&self.statistics_path)
    }

    /// File name of each artifact and whether it exists
    pub fn files_created(&self) -> Vec<(String, bool)> {
        [&self.dataset_path, &self.statistics_path]
            .into_iter()
            .map(|path| {
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                (name, path.exists())
            })
            .collect()
    }
}
