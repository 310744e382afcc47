use std::future::Future;

use pcso_core::RawRow;

pub mod csv_file;
pub mod pcso;
pub mod sample;

pub use csv_file::CsvRowSource;
pub use pcso::PcsoScraper;
pub use sample::SampleSource;

/// Outcome of asking a source for rows
#[derive(Debug, Clone, PartialEq)]
pub enum Retrieval {
    Rows(Vec<RawRow>),
    /// The source answered but cannot be used this run
    Unavailable(Unavailable),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Unavailable {
    #[error("access denied by the results site (HTTP {status})")]
    AccessDenied { status: u16 },
    #[error("results site answered HTTP {status}")]
    Status { status: u16 },
    #[error("search form state missing from the results page")]
    MissingFormState,
    #[error("no results table in the search response")]
    NoResultsTable,
    #[error("request to the results site failed: {0}")]
    Transport(String),
}

/// Anything that can hand raw rows to the pipeline
pub trait RowSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    fn retrieve(&self) -> impl Future<Output = anyhow::Result<Retrieval>> + Send;
}
