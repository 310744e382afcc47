use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use csv::{ReaderBuilder, StringRecord, Trim};
use pcso_core::RawRow;

use super::{Retrieval, RowSource};

const BOM: char = '\u{feff}';

/// A raw-row field and the header names it may appear under, preferred first
struct Column {
    names: [&'static str; 2],
    missing: &'static str,
}

const GAME: Column = Column {
    names: ["Game", "LOTTO GAME"],
    missing: "",
};
const NUMBERS: Column = Column {
    names: ["Numbers", "COMBINATIONS"],
    missing: "",
};
const DATE: Column = Column {
    names: ["Date", "DRAW DATE"],
    missing: "",
};
const JACKPOT: Column = Column {
    names: ["Jackpot", "JACKPOT (PHP)"],
    missing: "0",
};
const WINNERS: Column = Column {
    names: ["Winners", "WINNERS"],
    missing: "0",
};

/// Header positions resolved once per file
struct Layout {
    game: Option<usize>,
    numbers: Option<usize>,
    date: Option<usize>,
    jackpot: Option<usize>,
    winners: Option<usize>,
}

impl Layout {
    fn resolve(headers: &StringRecord) -> Self {
        let headers: Vec<&str> = headers
            .iter()
            .map(|header| header.trim_start_matches(BOM).trim())
            .collect();
        let find = |column: &Column| {
            column
                .names
                .iter()
                .find_map(|name| headers.iter().position(|header| header == name))
        };

        Self {
            game: find(&GAME),
            numbers: find(&NUMBERS),
            date: find(&DATE),
            jackpot: find(&JACKPOT),
            winners: find(&WINNERS),
        }
    }

    fn row(&self, record: &StringRecord) -> RawRow {
        let cell = |index: Option<usize>, column: &Column| {
            index
                .and_then(|i| record.get(i))
                .unwrap_or(column.missing)
                .to_owned()
        };

        RawRow {
            game_name: cell(self.game, &GAME),
            combinations: hyphenate(&cell(self.numbers, &NUMBERS)),
            date: cell(self.date, &DATE),
            jackpot: cell(self.jackpot, &JACKPOT),
            winners: cell(self.winners, &WINNERS),
        }
    }
}

/// Hand-typed sheets often separate numbers with spaces
fn hyphenate(combinations: &str) -> String {
    if combinations.contains('-') || !combinations.contains(char::is_whitespace) {
        return combinations.to_owned();
    }
    combinations.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Rows from any CSV reader with a header line
pub fn read_rows<R: Read>(reader: R) -> anyhow::Result<Vec<RawRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let layout = Layout::resolve(reader.headers().context("Failed to read CSV header")?);
    if layout.game.is_none() || layout.numbers.is_none() {
        log::warn!("CSV header has no game or numbers column; rows will not normalize");
    }

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        // line 1 is the header
        let record = record.with_context(|| format!("Malformed CSV record on line {}", index + 2))?;
        rows.push(layout.row(&record));
    }
    Ok(rows)
}

/// Manually downloaded results sheet
#[derive(Debug, Clone)]
pub struct CsvRowSource {
    path: PathBuf,
}

impl CsvRowSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> anyhow::Result<Vec<RawRow>> {
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open CSV file: {}", self.path.display()))?;
        read_rows(file).with_context(|| format!("Failed to import {}", self.path.display()))
    }
}

impl RowSource for CsvRowSource {
    fn name(&self) -> &'static str {
        "csv-import"
    }

    async fn retrieve(&self) -> anyhow::Result<Retrieval> {
        log::info!("Importing rows from {}", self.path.display());
        let rows = self.read()?;
        log::info!("Read {} rows from {}", rows.len(), self.path.display());
        Ok(Retrieval::Rows(rows))
    }
}
