//! Per-game draw counts and number frequency.

use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::draw::{DrawRecord, GameType, PICK_FAMILY_PREFIX};

/// Number → times drawn, most frequent first
pub type FrequencyTable = IndexMap<u32, u64>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    pub count: usize,
    /// Display name of the first record seen for the game
    #[serde(rename = "game_name")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_frequency: Option<FrequencyTable>,
}

impl GameStats {
    pub fn frequency_total(&self) -> u64 {
        self.number_frequency
            .as_ref()
            .map(|table| table.values().sum())
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    fn include(&mut self, date: NaiveDate) {
        self.start = Some(self.start.map_or(date, |start| start.min(date)));
        self.end = Some(self.end.map_or(date, |end| end.max(date)));
    }
}

/// Statistics artifact; `by_game` is keyed by game-type code in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsTable {
    pub by_game: IndexMap<String, GameStats>,
    #[serde(default)]
    pub total_draws: usize,
    #[serde(default)]
    pub date_range: DateRange,
}

impl StatisticsTable {
    pub fn game(&self, code: &str) -> Option<&GameStats> {
        self.by_game.get(code)
    }
}

/// Counts occurrences while remembering the order numbers were first seen
#[derive(Debug, Default)]
struct FrequencyCounter {
    counts: Vec<(u32, u64)>,
    index: HashMap<u32, usize>,
}

impl FrequencyCounter {
    fn record(&mut self, number: u32) {
        match self.index.get(&number) {
            Some(&slot) => self.counts[slot].1 += 1,
            None => {
                self.index.insert(number, self.counts.len());
                self.counts.push((number, 1));
            }
        }
    }

    /// `sort_by_key` is stable, so equal counts stay in first-seen order
    fn into_ranked(self) -> Option<FrequencyTable> {
        if self.counts.is_empty() {
            return None;
        }
        let mut counts = self.counts;
        counts.sort_by_key(|&(_, count)| Reverse(count));
        Some(counts.into_iter().collect())
    }
}

#[derive(Debug)]
struct GameAccumulator {
    code: String,
    display_name: String,
    count: usize,
    frequency: Option<FrequencyCounter>,
}

/// Folds draw records into a [`StatisticsTable`]
#[derive(Debug, Clone)]
pub struct Aggregator {
    pick_family: String,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::with_pick_family(PICK_FAMILY_PREFIX)
    }

    /// Count number frequency for game codes starting with `prefix`
    pub fn with_pick_family(prefix: impl Into<String>) -> Self {
        Self {
            pick_family: prefix.into(),
        }
    }

    fn counts_frequency(&self, game_type: &GameType) -> bool {
        game_type.code().starts_with(&self.pick_family)
    }

    pub fn aggregate(&self, records: &[DrawRecord]) -> StatisticsTable {
        let mut games: Vec<GameAccumulator> = Vec::new();
        let mut slots: HashMap<&str, usize> = HashMap::new();
        let mut date_range = DateRange::default();

        for record in records {
            let game_type = record.game_type();
            let slot = *slots.entry(game_type.code()).or_insert_with(|| {
                games.push(GameAccumulator {
                    code: game_type.code().to_owned(),
                    display_name: record.game_name().to_owned(),
                    count: 0,
                    frequency: self
                        .counts_frequency(game_type)
                        .then(FrequencyCounter::default),
                });
                games.len() - 1
            });

            let game = &mut games[slot];
            game.count += 1;
            if let Some(counter) = game.frequency.as_mut() {
                for &number in record.numbers() {
                    counter.record(number);
                }
            }

            if let Some(date) = record.date().calendar() {
                date_range.include(date);
            }
        }

        log::debug!(
            "aggregated {} records into {} game types",
            records.len(),
            games.len()
        );

        StatisticsTable {
            by_game: games
                .into_iter()
                .map(|game| {
                    let stats = GameStats {
                        count: game.count,
                        display_name: game.display_name,
                        number_frequency: game.frequency.and_then(FrequencyCounter::into_ranked),
                    };
                    (game.code, stats)
                })
                .collect(),
            total_draws: records.len(),
            date_range,
        }
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::RawRow;
    use crate::normalize::Normalizer;

    fn normalize_all(rows: &[RawRow]) -> anyhow::Result<Vec<DrawRecord>> {
        let normalizer = Normalizer::default();
        Ok(rows
            .iter()
            .map(|row| normalizer.normalize(row))
            .collect::<Result<_, _>>()?)
    }

    #[test]
    fn empty_input_yields_empty_table() {
        let table = Aggregator::default().aggregate(&[]);
        assert!(table.by_game.is_empty());
        assert_eq!(table.total_draws, 0);
        assert_eq!(table.date_range, DateRange::default());
    }

    #[test]
    fn ties_keep_first_seen_order() -> anyhow::Result<()> {
        let records = normalize_all(&[
            RawRow::new("Lotto 6/42", "1-2-5-10-11-12", "01/02/2025", "", ""),
            RawRow::new("Lotto 6/42", "2-1-20-21-22-23", "01/04/2025", "", ""),
            RawRow::new("Lotto 6/42", "1-2-30-31-32-33", "01/07/2025", "", ""),
        ])?;
        let table = Aggregator::default().aggregate(&records);
        let game = table.game("6/42").expect("6/42 present");
        let frequency = game.number_frequency.as_ref().expect("pick game frequency");

        let ranked: Vec<(u32, u64)> = frequency.iter().map(|(&n, &c)| (n, c)).collect();
        assert_eq!(ranked[0], (1, 3));
        assert_eq!(ranked[1], (2, 3));
        assert_eq!(ranked[2], (5, 1));
        // remaining singles in first-seen order
        let singles: Vec<u32> = ranked[2..].iter().map(|&(n, _)| n).collect();
        assert_eq!(
            singles,
            vec![5, 10, 11, 12, 20, 21, 22, 23, 30, 31, 32, 33]
        );
        Ok(())
    }

    #[test]
    fn digit_games_have_counts_but_no_frequency() -> anyhow::Result<()> {
        let records = normalize_all(&[
            RawRow::new("4D Lotto", "1-2-3-4", "", "", ""),
            RawRow::new("3D Lotto 2PM", "123", "", "", ""),
            RawRow::new("4D Lotto", "5-6-7-8", "", "", ""),
        ])?;
        let table = Aggregator::default().aggregate(&records);

        assert_eq!(table.by_game.keys().collect::<Vec<_>>(), vec!["4D", "3D-2PM"]);
        let four_d = table.game("4D").expect("4D present");
        assert_eq!(four_d.count, 2);
        assert_eq!(four_d.number_frequency, None);

        let json = serde_json::to_value(&table)?;
        assert!(json["by_game"]["4D"].get("number_frequency").is_none());
        Ok(())
    }

    #[test]
    fn frequency_sum_is_count_times_six() -> anyhow::Result<()> {
        let records = normalize_all(&[
            RawRow::new("Ultra Lotto 6/58", "35-37-14-01-43-12", "12/16/2025", "", ""),
            RawRow::new("Grand Lotto 6/55", "1-2-3-4-5-6", "12/15/2025", "", ""),
            RawRow::new("6/55 Lotto", "6-5-4-3-2-1", "12/17/2025", "", ""),
            RawRow::new("Ultra Lotto 6/58", "1-2-3-4-5-58", "12/19/2025", "", ""),
        ])?;
        let table = Aggregator::default().aggregate(&records);

        for (code, stats) in &table.by_game {
            let per_draw = GameType::from_code(code)
                .numbers_per_draw()
                .expect("known pick game") as u64;
            assert_eq!(stats.frequency_total(), stats.count as u64 * per_draw);
        }
        assert_eq!(table.game("6/55").map(|g| g.display_name.as_str()), Some("Grand Lotto 6/55"));
        Ok(())
    }

    #[test]
    fn date_range_spans_calendar_dates_only() -> anyhow::Result<()> {
        let records = normalize_all(&[
            RawRow::new("4D Lotto", "1-2-3-4", "03/01/2025", "", ""),
            RawRow::new("4D Lotto", "1-2-3-4", "not a date", "", ""),
            RawRow::new("4D Lotto", "1-2-3-4", "2024-12-30", "", ""),
        ])?;
        let table = Aggregator::default().aggregate(&records);

        assert_eq!(table.date_range.start, NaiveDate::from_ymd_opt(2024, 12, 30));
        assert_eq!(table.date_range.end, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(table.total_draws, 3);
        Ok(())
    }

    #[test]
    fn statistics_artifact_layout() -> anyhow::Result<()> {
        let records = normalize_all(&[RawRow::new(
            "Lotto 6/42",
            "4-8-15-16-23-42",
            "",
            "",
            "",
        )])?;
        let value = serde_json::to_value(Aggregator::default().aggregate(&records))?;

        assert_eq!(value["by_game"]["6/42"]["count"], 1);
        assert_eq!(value["by_game"]["6/42"]["game_name"], "Lotto 6/42");
        assert_eq!(value["by_game"]["6/42"]["number_frequency"]["42"], 1);
        assert_eq!(value["date_range"]["start"], serde_json::Value::Null);
        Ok(())
    }

    #[test]
    fn json_keeps_ranking_and_game_order() -> anyhow::Result<()> {
        let records = normalize_all(&[
            RawRow::new("4D Lotto", "1-2-3-4", "", "", ""),
            RawRow::new("Lotto 6/42", "9-1-4-5-6-7", "", "", ""),
            RawRow::new("Lotto 6/42", "4-1-10-11-12-13", "", "", ""),
        ])?;
        let table = Aggregator::default().aggregate(&records);

        let json = serde_json::to_string(&table)?;
        assert!(json.starts_with(r#"{"by_game":{"4D":"#));
        assert!(json.contains(r#""number_frequency":{"1":2,"4":2,"9":1,"5":1"#));

        let back: StatisticsTable = serde_json::from_str(&json)?;
        let frequency = back
            .game("6/42")
            .and_then(|g| g.number_frequency.as_ref())
            .expect("6/42 frequency");
        assert_eq!(
            frequency.keys().take(4).copied().collect::<Vec<_>>(),
            vec![1, 4, 9, 5]
        );
        assert_eq!(back.by_game.keys().collect::<Vec<_>>(), vec!["4D", "6/42"]);
        Ok(())
    }

    #[test]
    fn custom_pick_family() -> anyhow::Result<()> {
        let records = normalize_all(&[RawRow::new("4D Lotto", "1-1-2-3", "", "", "")])?;
        let table = Aggregator::with_pick_family("4D").aggregate(&records);
        let frequency = table
            .game("4D")
            .and_then(|g| g.number_frequency.as_ref())
            .expect("4D counted under custom family");
        assert_eq!(frequency.get(&1), Some(&2));
        Ok(())
    }
}
