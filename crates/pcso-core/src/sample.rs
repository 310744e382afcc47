//! Synthetic raw rows for when the results page cannot be reached.
//!
//! Rows are rendered the way the results table prints them, so they go
//! through the same normalizer path as scraped rows.

use chrono::{Datelike as _, Days, NaiveDate};
use rand::{Rng as _, SeedableRng as _, rngs::StdRng, seq::index};

use crate::draw::RawRow;

const SOURCE_DATE_FORMAT: &str = "%m/%d/%Y";

/// A six-number pick game and the weekdays it draws on (0 = Monday)
struct PickSchedule {
    name: &'static str,
    max: u32,
    weekdays: &'static [u32],
    jackpot: (u64, u64),
    max_winners: u64,
}

const PICK_SCHEDULES: [PickSchedule; 5] = [
    PickSchedule {
        name: "Ultra Lotto 6/58",
        max: 58,
        weekdays: &[0, 2, 4, 5],
        jackpot: (50_000_000, 1_000_000_000),
        max_winners: 3,
    },
    PickSchedule {
        name: "Grand Lotto 6/55",
        max: 55,
        weekdays: &[0, 2, 5],
        jackpot: (30_000_000, 500_000_000),
        max_winners: 5,
    },
    PickSchedule {
        name: "Super Lotto 6/49",
        max: 49,
        weekdays: &[1, 3, 6],
        jackpot: (16_000_000, 300_000_000),
        max_winners: 8,
    },
    PickSchedule {
        name: "Mega Lotto 6/45",
        max: 45,
        weekdays: &[0, 2, 4],
        jackpot: (9_000_000, 100_000_000),
        max_winners: 10,
    },
    PickSchedule {
        name: "Lotto 6/42",
        max: 42,
        weekdays: &[1, 3, 5],
        jackpot: (6_000_000, 50_000_000),
        max_winners: 12,
    },
];

/// Parse a date in either `YYYY-MM-DD` or `MM/DD/YYYY`
pub fn parse_range_bound(text: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, SOURCE_DATE_FORMAT))
        .map_err(|e| anyhow::anyhow!("Invalid date {text:?}: {e}"))
}

/// Thousands-separated peso amount with two decimals, e.g. `49,500,000.00`
fn format_amount(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{grouped}.00")
}

fn join_numbers(numbers: &[u32], width: usize) -> String {
    numbers
        .iter()
        .map(|n| format!("{n:0width$}"))
        .collect::<Vec<_>>()
        .join("-")
}

pub struct SampleGenerator {
    rng: StdRng,
}

impl SampleGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic output for a given seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Rows for every draw between `start` and `end`, both inclusive
    pub fn generate(&mut self, start: NaiveDate, end: NaiveDate) -> Vec<RawRow> {
        let mut rows = Vec::new();
        let mut day = start;

        while day <= end {
            self.generate_day(day, &mut rows);
            match day.checked_add_days(Days::new(1)) {
                Some(next) => day = next,
                None => break,
            }
        }

        log::debug!("generated {} sample rows from {start} to {end}", rows.len());
        rows
    }

    fn generate_day(&mut self, day: NaiveDate, rows: &mut Vec<RawRow>) {
        let date = day.format(SOURCE_DATE_FORMAT).to_string();
        let weekday = day.weekday().num_days_from_monday();

        for schedule in PICK_SCHEDULES
            .iter()
            .filter(|schedule| schedule.weekdays.contains(&weekday))
        {
            let mut numbers: Vec<u32> = index::sample(&mut self.rng, schedule.max as usize, 6)
                .into_iter()
                .map(|i| i as u32 + 1)
                .collect();
            numbers.sort_unstable();

            let jackpot = self.rng.gen_range(schedule.jackpot.0..=schedule.jackpot.1);
            let winners = self.rng.gen_range(0..=schedule.max_winners);
            rows.push(RawRow::new(
                schedule.name,
                join_numbers(&numbers, 2),
                date.as_str(),
                format!("PHP {}", format_amount(jackpot)),
                winners.to_string(),
            ));
        }

        let four_d: Vec<u32> = (0..4).map(|_| self.rng.gen_range(0..=9)).collect();
        let winners = self.rng.gen_range(0..=50u64);
        rows.push(RawRow::new(
            "4D Lotto",
            join_numbers(&four_d, 1),
            date.as_str(),
            format!("\u{20b1}{}", format_amount(10_000)),
            winners.to_string(),
        ));

        let three_d: String = (0..3)
            .map(|_| char::from(b'0' + self.rng.gen_range(0..=9u8)))
            .collect();
        let winners = self.rng.gen_range(0..=100u64);
        rows.push(RawRow::new(
            "3D Lotto",
            three_d,
            date.as_str(),
            format_amount(4_500),
            winners.to_string(),
        ));

        let two_d: Vec<u32> = (0..2).map(|_| self.rng.gen_range(0..=31)).collect();
        let winners = self.rng.gen_range(0..=200u64);
        rows.push(RawRow::new(
            "2D Lotto",
            join_numbers(&two_d, 2),
            date.as_str(),
            format_amount(4_000),
            format!("{winners}"),
        ));
    }
}

impl Default for SampleGenerator {
    fn default() -> Self {
        Self::new()
    }
}
