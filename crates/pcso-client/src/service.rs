//! Pipeline runs: retrieve rows, normalize, assemble, aggregate, persist.

use std::{
    fmt::{self, Display},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use chrono::{DateTime, Days, Local, NaiveDate, Utc};
use pcso_core::{
    Aggregator, DataSource, Dataset, DatasetAssembler, Normalizer, RawRow, StatisticsTable,
};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    config::PcsoConfig,
    request::{CsvRowSource, PcsoScraper, Retrieval, RowSource, SampleSource},
    storage::ArtifactStore,
};

/// A row the normalizer rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// Zero-based position in the retrieved batch
    pub index: usize,
    pub game_name: String,
    pub combinations: String,
    pub reason: String,
}

/// What one run did; `Display` renders it as the run's textual output
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub source: DataSource,
    /// When retrieval began
    pub started_at: DateTime<Utc>,
    pub rows_seen: usize,
    pub normalized: usize,
    /// Kept records whose numbers do not fit their game's usual shape
    pub off_shape: usize,
    pub skipped: Vec<SkippedRow>,
    /// Why the primary source could not be used, when a fallback ran instead
    pub unavailable: Option<String>,
    pub game_types: usize,
    pub dataset_path: PathBuf,
    pub statistics_path: PathBuf,
}

impl Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run {} ({})", self.run_id, self.source)?;
        if let Some(reason) = &self.unavailable {
            writeln!(f, "Results site unavailable: {reason}; generated sample data instead")?;
        }
        writeln!(f, "Rows retrieved: {}", self.rows_seen)?;
        writeln!(f, "Records normalized: {}", self.normalized)?;
        if self.off_shape > 0 {
            writeln!(f, "Records with an unusual shape: {}", self.off_shape)?;
        }
        writeln!(f, "Rows skipped: {}", self.skipped.len())?;
        for skipped in &self.skipped {
            writeln!(
                f,
                "  row {} ({} {:?}): {}",
                skipped.index, skipped.game_name, skipped.combinations, skipped.reason
            )?;
        }
        writeln!(f, "Game types: {}", self.game_types)?;
        writeln!(f, "Data saved to {}", self.dataset_path.display())?;
        write!(f, "Statistics saved to {}", self.statistics_path.display())
    }
}

/// Reports of one update trigger
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    pub fetch: RunReport,
    /// Present when a CSV import is configured and the file exists
    pub import: Option<RunReport>,
}

/// Today minus `days_back`, through today
fn fetch_range(days_back: u32) -> (NaiveDate, NaiveDate) {
    let end = Local::now().date_naive();
    let start = end
        .checked_sub_days(Days::new(u64::from(days_back)))
        .unwrap_or(NaiveDate::MIN);
    (start, end)
}

pub struct Pipeline {
    config: PcsoConfig,
    normalizer: Normalizer,
    aggregator: Aggregator,
    store: ArtifactStore,
    run_lock: Mutex<()>,
}

impl Pipeline {
    pub fn new(config: PcsoConfig) -> Self {
        let store = ArtifactStore::from_config(&config.output);
        Self {
            config,
            normalizer: Normalizer::default(),
            aggregator: Aggregator::default(),
            store,
            run_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &PcsoConfig {
        &self.config
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Scrape the last `days_back` days, falling back to sample data if allowed
    pub async fn run_fetch(&self, days_back: u32) -> anyhow::Result<RunReport> {
        let _guard = self.run_lock.lock().await;
        self.fetch(days_back).await
    }

    /// Import a manually downloaded CSV sheet
    pub async fn run_import(&self, path: &Path) -> anyhow::Result<RunReport> {
        let _guard = self.run_lock.lock().await;
        self.import(path).await
    }

    /// Run any source under the run lock
    pub async fn run_source<S: RowSource>(
        &self,
        source: &S,
        tag: DataSource,
    ) -> anyhow::Result<RunReport> {
        let _guard = self.run_lock.lock().await;
        let started_at = Utc::now();
        match source.retrieve().await? {
            Retrieval::Rows(rows) => self.complete(rows, tag, started_at, None),
            Retrieval::Unavailable(reason) => {
                anyhow::bail!("{} unavailable: {reason}", source.name())
            }
        }
    }

    /// Fetch with the configured range, then import the configured CSV if present
    pub async fn run_update(&self) -> anyhow::Result<UpdateOutcome> {
        let _guard = self.run_lock.lock().await;

        let fetch = self.fetch(self.config.scrape.days_back).await?;
        let import = match self.config.import.csv_path.as_deref() {
            Some(path) if path.exists() => Some(self.import(path).await?),
            Some(path) => {
                log::info!("No CSV at {}, skipping import", path.display());
                None
            }
            None => None,
        };

        Ok(UpdateOutcome { fetch, import })
    }

    async fn fetch(&self, days_back: u32) -> anyhow::Result<RunReport> {
        let started_at = Utc::now();
        let (start, end) = fetch_range(days_back);
        log::info!("Fetching results from {start} to {end}");

        let scraper = PcsoScraper::new(&self.config.scrape, start, end)
            .context("Failed to build the results site client")?;

        match scraper.retrieve().await? {
            Retrieval::Rows(rows) => self.complete(rows, DataSource::Scrape, started_at, None),
            Retrieval::Unavailable(reason) if self.config.scrape.fallback_to_sample => {
                log::warn!("Falling back to sample data: {reason}");
                let sample = SampleSource::new(start, end);
                match sample.retrieve().await? {
                    Retrieval::Rows(rows) => self.complete(
                        rows,
                        DataSource::Sample,
                        started_at,
                        Some(reason.to_string()),
                    ),
                    Retrieval::Unavailable(reason) => {
                        anyhow::bail!("{} unavailable: {reason}", sample.name())
                    }
                }
            }
            Retrieval::Unavailable(reason) => {
                anyhow::bail!("Results site unavailable: {reason}")
            }
        }
    }

    async fn import(&self, path: &Path) -> anyhow::Result<RunReport> {
        let started_at = Utc::now();
        match CsvRowSource::new(path).retrieve().await? {
            Retrieval::Rows(rows) => self.complete(rows, DataSource::CsvImport, started_at, None),
            Retrieval::Unavailable(reason) => {
                anyhow::bail!("CSV import unavailable: {reason}")
            }
        }
    }

    /// Normalize and aggregate without touching disk
    pub fn process(
        &self,
        rows: &[RawRow],
        source: DataSource,
    ) -> (Dataset, StatisticsTable, Vec<SkippedRow>) {
        let mut assembler = DatasetAssembler::with_capacity(source, rows.len());
        let mut skipped = Vec::new();

        for (index, row) in rows.iter().enumerate() {
            match self.normalizer.normalize(row) {
                Ok(record) => assembler.push(record),
                Err(e) => {
                    log::warn!("Skipping row {index} ({}): {e}", row.game_name);
                    skipped.push(SkippedRow {
                        index,
                        game_name: row.game_name.clone(),
                        combinations: row.combinations.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let dataset = assembler.finish();
        let table = self.aggregator.aggregate(dataset.records());
        (dataset, table, skipped)
    }

    fn complete(
        &self,
        rows: Vec<RawRow>,
        source: DataSource,
        started_at: DateTime<Utc>,
        unavailable: Option<String>,
    ) -> anyhow::Result<RunReport> {
        let run_id = Uuid::new_v4();
        log::debug!("run {run_id}: processing {} {source} rows", rows.len());

        let (dataset, table, skipped) = self.process(&rows, source);

        self.store
            .write_dataset(&dataset)
            .context("Failed to save dataset")?;
        self.store
            .write_statistics(&table)
            .context("Failed to save statistics")?;

        let report = RunReport {
            run_id,
            source,
            started_at,
            rows_seen: rows.len(),
            normalized: dataset.len(),
            off_shape: dataset.records().iter().filter(|r| !r.fits_shape()).count(),
            skipped,
            unavailable,
            game_types: table.by_game.len(),
            dataset_path: self.store.dataset_path().to_path_buf(),
            statistics_path: self.store.statistics_path().to_path_buf(),
        };
        log::info!(
            "run {run_id}: {} of {} rows normalized from {source}, {} game types",
            report.normalized,
            report.rows_seen,
            report.game_types
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputConfig;

    fn pipeline_in(dir: &Path) -> Pipeline {
        Pipeline::new(PcsoConfig {
            output: OutputConfig {
                dir: dir.to_path_buf(),
                ..OutputConfig::default()
            },
            ..PcsoConfig::default()
        })
    }

    #[test]
    fn bad_rows_are_skipped_not_fatal() -> anyhow::Result<()> {
        crate::init_test_logger();
        let dir = tempfile::tempdir()?;
        let pipeline = pipeline_in(dir.path());

        let rows = vec![
            RawRow::new("Lotto 6/42", "4-8-15-16-23-42", "12/13/2025", "PHP 6,000,000", "1"),
            RawRow::new("Lotto 6/42", "4-8-x", "12/13/2025", "", ""),
            RawRow::new("4D Lotto", "", "12/13/2025", "", ""),
            RawRow::new("4D Lotto", "1-2-3-4", "12/13/2025", "", ""),
            RawRow::new("Ultra Lotto 6/58", "1-2-3", "12/13/2025", "", ""),
        ];
        let (dataset, table, skipped) = pipeline.process(&rows, DataSource::Scrape);

        assert_eq!(dataset.len(), 3);
        assert_eq!(table.total_draws, 3);
        assert_eq!(dataset.records()[2].numbers(), &[1, 2, 3]);
        assert_eq!(
            skipped.iter().map(|s| s.index).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(skipped[0].combinations, "4-8-x");
        Ok(())
    }

    #[tokio::test]
    async fn source_run_persists_both_artifacts() -> anyhow::Result<()> {
        crate::init_test_logger();
        let dir = tempfile::tempdir()?;
        let pipeline = pipeline_in(dir.path());
        let start = NaiveDate::from_ymd_opt(2025, 12, 1).expect("valid date");
        let end = NaiveDate::from_ymd_opt(2025, 12, 14).expect("valid date");

        let report = pipeline
            .run_source(&SampleSource::new(start, end).with_seed(5), DataSource::Sample)
            .await?;

        assert_eq!(report.rows_seen, report.normalized);
        assert_eq!(report.off_shape, 0);
        assert!(report.skipped.is_empty());
        assert_eq!(report.game_types, 8);

        let dataset = pipeline.store().read_dataset()?;
        assert_eq!(dataset.len(), report.normalized);
        assert_eq!(dataset.source(), DataSource::Sample);
        let table = pipeline.store().read_statistics()?;
        assert_eq!(table.total_draws, report.normalized);

        let output = report.to_string();
        assert!(output.contains("Records normalized:"));
        assert!(output.contains("pcso_statistics.json"));
        Ok(())
    }

    /// Notes when it was asked for rows
    struct StampedSource {
        retrieved_at: std::sync::Mutex<Option<DateTime<Utc>>>,
    }

    impl RowSource for StampedSource {
        fn name(&self) -> &'static str {
            "stamped"
        }

        async fn retrieve(&self) -> anyhow::Result<Retrieval> {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            if let Ok(mut stamp) = self.retrieved_at.lock() {
                *stamp = Some(Utc::now());
            }
            Ok(Retrieval::Rows(vec![RawRow::new(
                "4D Lotto",
                "1-2-3-4",
                "12/13/2025",
                "",
                "",
            )]))
        }
    }

    #[tokio::test]
    async fn started_at_precedes_retrieval() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let pipeline = pipeline_in(dir.path());
        let source = StampedSource {
            retrieved_at: std::sync::Mutex::new(None),
        };

        let before = Utc::now();
        let report = pipeline.run_source(&source, DataSource::CsvImport).await?;

        let retrieved_at = source
            .retrieved_at
            .lock()
            .map_err(|_| anyhow::anyhow!("poisoned"))?
            .expect("source was asked for rows");
        assert!(before <= report.started_at);
        assert!(report.started_at < retrieved_at);
        Ok(())
    }

    #[test]
    fn report_lists_skipped_rows_and_fallback_reason() {
        let report = RunReport {
            run_id: Uuid::nil(),
            source: DataSource::Sample,
            started_at: Utc::now(),
            rows_seen: 3,
            normalized: 2,
            off_shape: 1,
            skipped: vec![SkippedRow {
                index: 1,
                game_name: "Lotto 6/42".to_owned(),
                combinations: "1-x".to_owned(),
                reason: "invalid number \"x\"".to_owned(),
            }],
            unavailable: Some("access denied".to_owned()),
            game_types: 1,
            dataset_path: PathBuf::from("pcso_lotto_data.json"),
            statistics_path: PathBuf::from("pcso_statistics.json"),
        };
        let output = report.to_string();

        assert!(output.starts_with("Run 00000000-0000-0000-0000-000000000000 (sample)"));
        assert!(output.contains("Results site unavailable: access denied"));
        assert!(output.contains("Records with an unusual shape: 1"));
        assert!(output.contains("row 1 (Lotto 6/42 \"1-x\"): invalid number \"x\""));
        assert!(output.ends_with("Statistics saved to pcso_statistics.json"));
    }

    #[test]
    fn fetch_range_ends_today() {
        let (start, end) = fetch_range(7);
        assert_eq!(end, Local::now().date_naive());
        assert_eq!((end - start).num_days(), 7);
    }
}
