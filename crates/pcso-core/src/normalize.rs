//! Raw row → [`DrawRecord`].
//!
//! Only an unreadable number payload can reject a row. Date, jackpot and
//! winner count are best effort and fall back to the source text or zero.
//! A draw that does not fit its game's usual shape is kept and logged.

use chrono::NaiveDate;

use crate::draw::{CANONICAL_DATE_FORMAT, DrawDate, DrawRecord, GameRules, RawRow};

/// Date layouts tried in order; the results page uses the first one
const DATE_FORMATS: [&str; 2] = ["%m/%d/%Y", CANONICAL_DATE_FORMAT];

/// Currency markers removed before reading a jackpot.
/// `â‚±` is the peso sign after a UTF-8 → cp1252 round trip in spreadsheet exports.
const CURRENCY_MARKERS: [&str; 4] = ["PHP", "php", "\u{20b1}", "\u{e2}\u{201a}\u{b1}"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("number payload is empty")]
    EmptyNumbers,
    #[error("invalid number {token:?} in payload {payload:?}")]
    InvalidNumber { token: String, payload: String },
}

/// Outcome of a best-effort parse
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Parsed<T> {
    Value(T),
    /// The input could not be read and the field takes its default
    Defaulted,
}

impl<T: Default> Parsed<T> {
    pub fn value_or_default(self) -> T {
        match self {
            Self::Value(value) => value,
            Self::Defaulted => T::default(),
        }
    }
}

impl<T> Parsed<T> {
    pub fn is_defaulted(&self) -> bool {
        matches!(self, Self::Defaulted)
    }
}

/// Hyphen-separated integers when any hyphen is present, otherwise one digit per character
pub fn parse_numbers(payload: &str) -> Result<Vec<u32>, NormalizeError> {
    let trimmed = payload.trim();
    if trimmed.is_empty() {
        return Err(NormalizeError::EmptyNumbers);
    }

    let invalid = |token: &str| NormalizeError::InvalidNumber {
        token: token.to_owned(),
        payload: payload.to_owned(),
    };

    if trimmed.contains('-') {
        trimmed
            .split('-')
            .map(|token| token.trim().parse::<u32>().map_err(|_| invalid(token)))
            .collect()
    } else {
        trimmed
            .chars()
            .map(|c| c.to_digit(10).ok_or_else(|| invalid(&c.to_string())))
            .collect()
    }
}

pub fn parse_date(raw: &str) -> DrawDate {
    let candidate = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(candidate, format).ok())
        .map(DrawDate::Calendar)
        .unwrap_or_else(|| DrawDate::Verbatim(raw.to_owned()))
}

pub fn parse_jackpot(raw: &str) -> Parsed<f64> {
    let mut cleaned = raw.to_owned();
    for marker in CURRENCY_MARKERS {
        cleaned = cleaned.replace(marker, "");
    }
    let cleaned: String = cleaned
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    match cleaned.parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount >= 0.0 => Parsed::Value(amount),
        _ => Parsed::Defaulted,
    }
}

pub fn parse_winners(raw: &str) -> Parsed<u64> {
    match raw.replace(',', "").trim().parse::<u64>() {
        Ok(count) => Parsed::Value(count),
        Err(_) => Parsed::Defaulted,
    }
}

/// Turns raw rows into draw records using a fixed game-name rule table
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    rules: GameRules,
}

impl Normalizer {
    pub fn new(rules: GameRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn normalize(&self, row: &RawRow) -> Result<DrawRecord, NormalizeError> {
        let game_name = row.game_name.trim();
        let game_type = self.rules.resolve(game_name);

        let numbers = parse_numbers(&row.combinations)?;
        if let Some(shape) = game_type.shape().filter(|shape| !shape.accepts(&numbers)) {
            log::warn!(
                "{game_name}: {numbers:?} is not {} numbers in {}..={}, keeping it",
                shape.len,
                shape.min,
                shape.max
            );
        }

        let jackpot = parse_jackpot(&row.jackpot);
        if jackpot.is_defaulted() {
            log::trace!("jackpot {:?} unreadable, using 0", row.jackpot);
        }
        let winners = parse_winners(&row.winners);
        if winners.is_defaulted() {
            log::trace!("winner count {:?} unreadable, using 0", row.winners);
        }

        Ok(DrawRecord::new(
            game_name.to_owned(),
            game_type,
            parse_date(&row.date),
            numbers,
            jackpot.value_or_default(),
            winners.value_or_default(),
        ))
    }
}
