use std::fmt::Display;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

mod game;

pub use game::{DrawShape, DrawTime, GameRule, GameRules, GameType, Matcher, PICK_FAMILY_PREFIX};

/// Canonical date layout of a draw record
pub const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";

/// One unnormalized result row, as scraped from the results table or read from CSV
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawRow {
    pub game_name: String,
    pub combinations: String,
    pub date: String,
    pub jackpot: String,
    pub winners: String,
}

impl RawRow {
    pub fn new(
        game_name: impl Into<String>,
        combinations: impl Into<String>,
        date: impl Into<String>,
        jackpot: impl Into<String>,
        winners: impl Into<String>,
    ) -> Self {
        Self {
            game_name: game_name.into(),
            combinations: combinations.into(),
            date: date.into(),
            jackpot: jackpot.into(),
            winners: winners.into(),
        }
    }
}

/// Draw date: a calendar date when the source could be read, the source text otherwise
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DrawDate {
    Calendar(NaiveDate),
    Verbatim(String),
}

impl DrawDate {
    pub fn calendar(&self) -> Option<NaiveDate> {
        match self {
            Self::Calendar(date) => Some(*date),
            Self::Verbatim(_) => None,
        }
    }

    pub fn is_verbatim(&self) -> bool {
        matches!(self, Self::Verbatim(_))
    }
}

impl Display for DrawDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Calendar(date) => write!(f, "{}", date.format(CANONICAL_DATE_FORMAT)),
            Self::Verbatim(text) => f.write_str(text),
        }
    }
}

impl Serialize for DrawDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DrawDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(match NaiveDate::parse_from_str(&text, CANONICAL_DATE_FORMAT) {
            Ok(date) => Self::Calendar(date),
            Err(_) => Self::Verbatim(text),
        })
    }
}

/// Canonical draw result.
///
/// Only the normalizer builds records from raw input; afterwards they are
/// read-only. The serde layout is the `results[]` entry of the persisted
/// dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawRecord {
    #[serde(rename = "game")]
    game_name: String,
    game_type: GameType,
    date: DrawDate,
    numbers: Vec<u32>,
    jackpot: f64,
    winners: u64,
}

impl DrawRecord {
    pub(crate) fn new(
        game_name: String,
        game_type: GameType,
        date: DrawDate,
        numbers: Vec<u32>,
        jackpot: f64,
        winners: u64,
    ) -> Self {
        Self {
            game_name,
            game_type,
            date,
            numbers,
            jackpot,
            winners,
        }
    }

    pub fn game_name(&self) -> &str {
        &self.game_name
    }

    pub fn game_type(&self) -> &GameType {
        &self.game_type
    }

    pub fn date(&self) -> &DrawDate {
        &self.date
    }

    pub fn numbers(&self) -> &[u32] {
        &self.numbers
    }

    pub fn jackpot(&self) -> f64 {
        self.jackpot
    }

    pub fn winners(&self) -> u64 {
        self.winners
    }

    /// Whether the numbers have the length and range usual for the game; unknown games always fit
    pub fn fits_shape(&self) -> bool {
        self.game_type
            .shape()
            .is_none_or(|shape| shape.accepts(&self.numbers))
    }

    pub fn format_numbers(&self) -> String {
        self.numbers
            .iter()
            .map(|n| format!("{n:02}"))
            .collect::<Vec<_>>()
            .join("-")
    }
}

impl Display for DrawRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {} {}",
            self.date,
            self.game_type,
            self.game_name,
            self.format_numbers()
        )
    }
}
