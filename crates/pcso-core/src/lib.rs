//! Core of the PCSO lotto pipeline.
//!
//! Turns raw result rows into canonical draw records, groups them into a
//! dataset and derives per-game statistics. Nothing in here performs I/O.

pub mod dataset;
pub mod draw;
pub mod normalize;
pub mod sample;
pub mod stats;

pub use dataset::{DataSource, Dataset, DatasetAssembler, PersistedDataset};
pub use draw::{DrawDate, DrawRecord, GameRules, GameType, RawRow};
pub use normalize::{NormalizeError, Normalizer, Parsed};
pub use stats::{Aggregator, FrequencyTable, GameStats, StatisticsTable};
