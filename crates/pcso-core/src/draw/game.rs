use std::fmt::Display;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum_macros::Display as StrumDisplay;

/// Code prefix shared by the fixed six-number pick games (`6/58`, `6/42`, ...)
pub const PICK_FAMILY_PREFIX: &str = "6/";

/// Time-of-day suffix carried by the 3D and 2D games
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay)]
pub enum DrawTime {
    #[strum(to_string = "2PM")]
    TwoPm,
    #[strum(to_string = "5PM")]
    FivePm,
    #[strum(to_string = "9PM")]
    NinePm,
}

/// Canonical lottery game variant.
///
/// Known games carry a fixed code; any display name the rule table cannot
/// place is kept verbatim as [`GameType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameType {
    UltraLotto658,
    GrandLotto655,
    SuperLotto649,
    MegaLotto645,
    Lotto642,
    SixDigit,
    FourDigit,
    ThreeDigit(Option<DrawTime>),
    TwoDigit(Option<DrawTime>),
    Other(String),
}

/// Expected length and value range of a draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawShape {
    pub len: usize,
    pub min: u32,
    pub max: u32,
}

impl DrawShape {
    const fn pick(max: u32) -> Self {
        Self { len: 6, min: 1, max }
    }

    const fn digits(len: usize) -> Self {
        Self { len, min: 0, max: 9 }
    }

    pub fn accepts(&self, numbers: &[u32]) -> bool {
        numbers.len() == self.len && numbers.iter().all(|n| (self.min..=self.max).contains(n))
    }
}

impl GameType {
    pub fn code(&self) -> &str {
        match self {
            Self::UltraLotto658 => "6/58",
            Self::GrandLotto655 => "6/55",
            Self::SuperLotto649 => "6/49",
            Self::MegaLotto645 => "6/45",
            Self::Lotto642 => "6/42",
            Self::SixDigit => "6D",
            Self::FourDigit => "4D",
            Self::ThreeDigit(None) => "3D",
            Self::ThreeDigit(Some(DrawTime::TwoPm)) => "3D-2PM",
            Self::ThreeDigit(Some(DrawTime::FivePm)) => "3D-5PM",
            Self::ThreeDigit(Some(DrawTime::NinePm)) => "3D-9PM",
            Self::TwoDigit(None) => "2D",
            Self::TwoDigit(Some(DrawTime::TwoPm)) => "2D-2PM",
            Self::TwoDigit(Some(DrawTime::FivePm)) => "2D-5PM",
            Self::TwoDigit(Some(DrawTime::NinePm)) => "2D-9PM",
            Self::Other(name) => name,
        }
    }

    /// Inverse of [`GameType::code`]; unknown codes become [`GameType::Other`]
    pub fn from_code(code: &str) -> Self {
        match code {
            "6/58" => Self::UltraLotto658,
            "6/55" => Self::GrandLotto655,
            "6/49" => Self::SuperLotto649,
            "6/45" => Self::MegaLotto645,
            "6/42" => Self::Lotto642,
            "6D" => Self::SixDigit,
            "4D" => Self::FourDigit,
            "3D" => Self::ThreeDigit(None),
            "3D-2PM" => Self::ThreeDigit(Some(DrawTime::TwoPm)),
            "3D-5PM" => Self::ThreeDigit(Some(DrawTime::FivePm)),
            "3D-9PM" => Self::ThreeDigit(Some(DrawTime::NinePm)),
            "2D" => Self::TwoDigit(None),
            "2D-2PM" => Self::TwoDigit(Some(DrawTime::TwoPm)),
            "2D-5PM" => Self::TwoDigit(Some(DrawTime::FivePm)),
            "2D-9PM" => Self::TwoDigit(Some(DrawTime::NinePm)),
            other => Self::Other(other.to_owned()),
        }
    }

    /// Pick games are the only ones eligible for number frequency statistics
    pub fn is_pick_game(&self) -> bool {
        self.code().starts_with(PICK_FAMILY_PREFIX)
    }

    pub fn shape(&self) -> Option<DrawShape> {
        match self {
            Self::UltraLotto658 => Some(DrawShape::pick(58)),
            Self::GrandLotto655 => Some(DrawShape::pick(55)),
            Self::SuperLotto649 => Some(DrawShape::pick(49)),
            Self::MegaLotto645 => Some(DrawShape::pick(45)),
            Self::Lotto642 => Some(DrawShape::pick(42)),
            Self::SixDigit => Some(DrawShape::digits(6)),
            Self::FourDigit => Some(DrawShape::digits(4)),
            Self::ThreeDigit(_) => Some(DrawShape::digits(3)),
            Self::TwoDigit(_) => Some(DrawShape {
                len: 2,
                min: 0,
                max: 31,
            }),
            Self::Other(_) => None,
        }
    }

    pub fn numbers_per_draw(&self) -> Option<usize> {
        self.shape().map(|shape| shape.len)
    }
}

impl Display for GameType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for GameType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for GameType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(Self::from_code(&code))
    }
}

/// How a rule recognises a display name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// Whole display name, case-sensitive
    Exact(&'static str),
    /// Case-sensitive substring
    Contains(&'static str),
    /// Every needle must occur in the lower-cased name
    ContainsFolded(&'static [&'static str]),
}

impl Matcher {
    fn matches(&self, name: &str, folded: &str) -> bool {
        match self {
            Self::Exact(expected) => name == *expected,
            Self::Contains(needle) => name.contains(needle),
            Self::ContainsFolded(needles) => needles.iter().all(|needle| folded.contains(needle)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRule {
    pub matcher: Matcher,
    pub game_type: GameType,
}

/// Ordered display-name rules; the first matching rule decides the game type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRules {
    rules: Vec<GameRule>,
}

impl GameRules {
    pub fn new(rules: Vec<GameRule>) -> Self {
        Self { rules }
    }

    /// Display names published by PCSO, followed by the substring fallbacks.
    ///
    /// Six-number picks are tried before the digit games, and each digit
    /// game tries its time-suffixed form before the bare one.
    pub fn pcso() -> Self {
        use DrawTime::{FivePm, NinePm, TwoPm};
        use GameType::{
            FourDigit, GrandLotto655, Lotto642, MegaLotto645, SixDigit, SuperLotto649, ThreeDigit,
            TwoDigit, UltraLotto658,
        };
        use Matcher::{Contains, ContainsFolded, Exact};

        let table = [
            (Exact("Ultra Lotto 6/58"), UltraLotto658),
            (Exact("Grand Lotto 6/55"), GrandLotto655),
            (Exact("Superlotto 6/49"), SuperLotto649),
            (Exact("Super Lotto 6/49"), SuperLotto649),
            (Exact("Megalotto 6/45"), MegaLotto645),
            (Exact("Mega Lotto 6/45"), MegaLotto645),
            (Exact("Lotto 6/42"), Lotto642),
            (Exact("6D Lotto"), SixDigit),
            (Exact("4D Lotto"), FourDigit),
            (Exact("3D Lotto 2PM"), ThreeDigit(Some(TwoPm))),
            (Exact("3D Lotto 5PM"), ThreeDigit(Some(FivePm))),
            (Exact("3D Lotto 9PM"), ThreeDigit(Some(NinePm))),
            (Exact("2D Lotto 2PM"), TwoDigit(Some(TwoPm))),
            (Exact("2D Lotto 5PM"), TwoDigit(Some(FivePm))),
            (Exact("2D Lotto 9PM"), TwoDigit(Some(NinePm))),
            (Contains("6/58"), UltraLotto658),
            (Contains("6/55"), GrandLotto655),
            (Contains("6/49"), SuperLotto649),
            (Contains("6/45"), MegaLotto645),
            (Contains("6/42"), Lotto642),
            (ContainsFolded(&["6d"]), SixDigit),
            (ContainsFolded(&["4d"]), FourDigit),
            (ContainsFolded(&["3d", "2pm"]), ThreeDigit(Some(TwoPm))),
            (ContainsFolded(&["3d", "5pm"]), ThreeDigit(Some(FivePm))),
            (ContainsFolded(&["3d", "9pm"]), ThreeDigit(Some(NinePm))),
            (ContainsFolded(&["3d"]), ThreeDigit(None)),
            (ContainsFolded(&["2d", "2pm"]), TwoDigit(Some(TwoPm))),
            (ContainsFolded(&["2d", "5pm"]), TwoDigit(Some(FivePm))),
            (ContainsFolded(&["2d", "9pm"]), TwoDigit(Some(NinePm))),
            (ContainsFolded(&["2d"]), TwoDigit(None)),
        ];

        Self::new(
            table
                .into_iter()
                .map(|(matcher, game_type)| GameRule { matcher, game_type })
                .collect(),
        )
    }

    /// Resolve a display name; names no rule matches keep their own text as code
    pub fn resolve(&self, name: &str) -> GameType {
        let folded = name.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matcher.matches(name, &folded))
            .map(|rule| rule.game_type.clone())
            .unwrap_or_else(|| GameType::Other(name.to_owned()))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for GameRules {
    fn default() -> Self {
        Self::pcso()
    }
}
