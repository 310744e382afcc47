use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::draw::DrawRecord;

/// Where the rows of a dataset came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum DataSource {
    #[serde(rename = "scrape")]
    #[strum(to_string = "scrape")]
    Scrape,
    #[serde(rename = "sample")]
    #[strum(to_string = "sample")]
    Sample,
    /// Written as `manual_csv_import`, the tag existing viewers expect
    #[serde(rename = "manual_csv_import", alias = "csv_import")]
    #[strum(to_string = "csv_import")]
    CsvImport,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DatasetError {
    #[error("dataset declares {declared} results but contains {actual}")]
    CountMismatch { declared: usize, actual: usize },
}

/// Normalized records of one pipeline run plus their provenance
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    generated_at: DateTime<Utc>,
    source: DataSource,
    records: Vec<DrawRecord>,
}

impl Dataset {
    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn source(&self) -> DataSource {
        self.source
    }

    pub fn records(&self) -> &[DrawRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn to_persisted(&self) -> PersistedDataset {
        PersistedDataset {
            last_updated: self.generated_at,
            total_results: self.records.len(),
            source: Some(self.source),
            results: self.records.clone(),
        }
    }
}

/// Collects normalized records in arrival order
#[derive(Debug, Clone)]
pub struct DatasetAssembler {
    source: DataSource,
    records: Vec<DrawRecord>,
}

impl DatasetAssembler {
    pub fn new(source: DataSource) -> Self {
        Self {
            source,
            records: Vec::new(),
        }
    }

    pub fn with_capacity(source: DataSource, capacity: usize) -> Self {
        Self {
            source,
            records: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, record: DrawRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append `records` and stamp the dataset with the current time
    pub fn assemble(self, records: impl IntoIterator<Item = DrawRecord>) -> Dataset {
        self.assemble_at(records, Utc::now())
    }

    pub fn assemble_at(
        mut self,
        records: impl IntoIterator<Item = DrawRecord>,
        generated_at: DateTime<Utc>,
    ) -> Dataset {
        self.extend(records);
        self.finish_at(generated_at)
    }

    pub fn finish(self) -> Dataset {
        self.finish_at(Utc::now())
    }

    pub fn finish_at(self, generated_at: DateTime<Utc>) -> Dataset {
        Dataset {
            generated_at,
            source: self.source,
            records: self.records,
        }
    }
}

impl Extend<DrawRecord> for DatasetAssembler {
    fn extend<T: IntoIterator<Item = DrawRecord>>(&mut self, iter: T) {
        self.records.extend(iter);
    }
}

/// On-disk layout of a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedDataset {
    pub last_updated: DateTime<Utc>,
    pub total_results: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<DataSource>,
    pub results: Vec<DrawRecord>,
}

impl TryFrom<PersistedDataset> for Dataset {
    type Error = DatasetError;

    /// Artifacts written without a source tag came from the scraper
    fn try_from(persisted: PersistedDataset) -> Result<Self, Self::Error> {
        if persisted.total_results != persisted.results.len() {
            return Err(DatasetError::CountMismatch {
                declared: persisted.total_results,
                actual: persisted.results.len(),
            });
        }

        Ok(Self {
            generated_at: persisted.last_updated,
            source: persisted.source.unwrap_or(DataSource::Scrape),
            records: persisted.results,
        })
    }
}
