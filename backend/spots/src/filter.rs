//! # Filtering
//!
//! Narrows the approved spots down to what the visitor asked for.
//!
//! A [`Filters`] selection holds at most one area, at most one line group and any
//! number of [`Condition`]s. Every active constraint must hold, conditions
//! included, so adding a constraint never widens the result.
//!
//! ## Line groups
//!
//! Line names in the data carry branding and suffixes (`東武アーバンパークライン`,
//! `中央線（快速）`), so a selectable label is expanded to keywords through
//! [`LINE_GROUP_KEYWORDS`] and matched by substring. Labels missing from the table
//! are their own keyword.
use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::models::{ParseEnumError, PlaceType, Spot};

pub const AREAS: [&str; 4] = ["東京", "埼玉", "神奈川", "千葉"];

pub const POPULAR_LINES: [&str; 6] = [
    "西武線",
    "東武線",
    "東海道線",
    "中央線",
    "山手線",
    "京浜東北線",
];

pub const LINE_COMPANIES: [(&str, &[&str]); 3] = [
    (
        "JR東日本",
        &[
            "山手線",
            "京浜東北線",
            "中央線",
            "総武線",
            "東海道線",
            "横須賀線",
            "湘南新宿ライン",
        ],
    ),
    ("私鉄", &["西武線", "東武線", "東急線", "京王線", "小田急線"]),
    ("地下鉄", &["丸ノ内線", "銀座線", "日比谷線", "東西線"]),
];

pub const LINE_GROUP_KEYWORDS: [(&str, &[&str]); 9] = [
    ("東武線", &["東武"]),
    ("西武線", &["西武"]),
    ("東海道線", &["東海道"]),
    ("中央線", &["中央線", "中央・総武線"]),
    ("山手線", &["山手線"]),
    ("京浜東北線", &["京浜東北線"]),
    ("東急線", &["東急"]),
    ("京王線", &["京王"]),
    ("小田急線", &["小田急"]),
];

pub const NEAR_STATION_MINUTES: u32 = 5;

pub const EXPRESS_MARKERS: [&str; 2] = ["特急", "新幹線"];

pub fn line_keywords(label: &str) -> Vec<&str> {
    LINE_GROUP_KEYWORDS
        .iter()
        .find(|(group, _)| *group == label)
        .map(|(_, keywords)| keywords.to_vec())
        .unwrap_or_else(|| vec![label])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    NearStation,
    HasPark,
    MultiLine,
    ExpressOrBullet,
}

impl Condition {
    pub const ALL: [Condition; 4] = [
        Condition::NearStation,
        Condition::HasPark,
        Condition::MultiLine,
        Condition::ExpressOrBullet,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Condition::NearStation => "near-station",
            Condition::HasPark => "has-park",
            Condition::MultiLine => "multi-line",
            Condition::ExpressOrBullet => "express-or-bullet",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Condition::NearStation => "駅近",
            Condition::HasPark => "公園あり",
            Condition::MultiLine => "複数路線見れる",
            Condition::ExpressOrBullet => "特急・新幹線見れる",
        }
    }

    pub fn matches(&self, spot: &Spot) -> bool {
        match self {
            Condition::NearStation => spot.walk_minutes <= NEAR_STATION_MINUTES,
            Condition::HasPark => spot.place_type == PlaceType::Park,
            Condition::MultiLine => spot.lines.len() > 1,
            Condition::ExpressOrBullet => spot
                .lines
                .iter()
                .any(|line| EXPRESS_MARKERS.iter().any(|marker| line.contains(marker))),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Condition {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        Condition::ALL
            .into_iter()
            .find(|condition| condition.slug() == s || condition.label() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "condition",
                value: s.to_string(),
            })
    }
}

/// Tags shown on a card, in display order.
pub fn tags(spot: &Spot) -> Vec<&'static str> {
    [Condition::NearStation, Condition::HasPark]
        .into_iter()
        .filter(|condition| condition.matches(spot))
        .map(|condition| condition.label())
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    area: Option<String>,
    line: Option<String>,
    conditions: BTreeSet<Condition>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_area(mut self, area: impl Into<String>) -> Self {
        self.area = non_empty(area.into());
        self
    }

    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.line = non_empty(line.into());
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.insert(condition);
        self
    }

    /// Parses a comma separated list of condition slugs or labels.
    pub fn with_conditions(mut self, conditions: &str) -> Result<Self, ParseEnumError> {
        for condition in conditions.split(',').filter(|s| !s.trim().is_empty()) {
            self.conditions.insert(condition.parse()?);
        }

        Ok(self)
    }

    pub fn area(&self) -> Option<&str> {
        self.area.as_deref()
    }

    pub fn line(&self) -> Option<&str> {
        self.line.as_deref()
    }

    pub fn conditions(&self) -> impl Iterator<Item = Condition> + '_ {
        self.conditions.iter().copied()
    }

    /// Selecting the active area again clears it.
    pub fn select_area(&mut self, area: &str) {
        self.area = match self.area.as_deref() {
            Some(current) if current == area => None,
            _ => non_empty(area.to_string()),
        };
    }

    /// Selecting the active line again clears it.
    pub fn select_line(&mut self, line: &str) {
        self.line = match self.line.as_deref() {
            Some(current) if current == line => None,
            _ => non_empty(line.to_string()),
        };
    }

    pub fn toggle_condition(&mut self, condition: Condition) {
        if !self.conditions.remove(&condition) {
            self.conditions.insert(condition);
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.area.is_none() && self.line.is_none() && self.conditions.is_empty()
    }

    pub fn matches(&self, spot: &Spot) -> bool {
        if let Some(area) = &self.area {
            if !spot.area.contains(area.as_str()) {
                return false;
            }
        }

        if let Some(line) = &self.line {
            let keywords = line_keywords(line);

            if !spot
                .lines
                .iter()
                .any(|name| keywords.iter().any(|keyword| name.contains(keyword)))
            {
                return false;
            }
        }

        self.conditions.iter().all(|condition| condition.matches(spot))
    }
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Spots passing every active constraint, in their original order.
pub fn compute_visible<'a>(spots: &'a [Spot], filters: &Filters) -> Vec<&'a Spot> {
    spots.iter().filter(|spot| filters.matches(spot)).collect()
}
