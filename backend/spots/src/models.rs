//! # Spots
//!
//! Application-level record shape and the closed enumerations around it.
//!
//! ## Rows
//!
//! The record store hands back loosely typed JSON rows with snake_case columns.
//! [`Spot::try_from`] is the only way a row becomes a [`Spot`], and it names the
//! offending column when something is missing or mistyped.
//!
//! ## Visibility
//!
//! Only [`SpotStatus::Approved`] spots are ever shown to visitors.
use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub type Row = Map<String, Value>;

/// Safety rank every ingestion path currently writes.
pub const DEFAULT_SAFETY_RANK: u8 = 5;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RowError {
    #[error("Missing column: {0}")]
    Missing(&'static str),

    #[error("Invalid column {column}: expected {expected}")]
    Invalid {
        column: &'static str,
        expected: &'static str,
    },

    #[error("Row is not an object")]
    NotAnObject,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaceType {
    #[serde(rename = "公園")]
    Park,
    #[serde(rename = "橋")]
    Bridge,
    #[serde(rename = "跨線橋")]
    Overpass,
    #[serde(rename = "展望台")]
    ObservationDeck,
    #[serde(rename = "その他")]
    Other,
}

impl PlaceType {
    pub const ALL: [PlaceType; 5] = [
        PlaceType::Park,
        PlaceType::Bridge,
        PlaceType::Overpass,
        PlaceType::ObservationDeck,
        PlaceType::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PlaceType::Park => "公園",
            PlaceType::Bridge => "橋",
            PlaceType::Overpass => "跨線橋",
            PlaceType::ObservationDeck => "展望台",
            PlaceType::Other => "その他",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            PlaceType::Park => "park",
            PlaceType::Bridge => "bridge",
            PlaceType::Overpass => "rail-overpass",
            PlaceType::ObservationDeck => "observation-deck",
            PlaceType::Other => "other",
        }
    }
}

impl fmt::Display for PlaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts both the stored label (`公園`) and the ascii slug (`park`).
impl FromStr for PlaceType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        PlaceType::ALL
            .into_iter()
            .find(|place| place.label() == s || place.slug() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "place type",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpotStatus {
    Draft,
    Pending,
    Approved,
    Rejected,
}

impl SpotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpotStatus::Draft => "draft",
            SpotStatus::Pending => "pending",
            SpotStatus::Approved => "approved",
            SpotStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for SpotStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(SpotStatus::Draft),
            "pending" => Ok(SpotStatus::Pending),
            "approved" => Ok(SpotStatus::Approved),
            "rejected" => Ok(SpotStatus::Rejected),
            _ => Err(ParseEnumError {
                kind: "status",
                value: s.to_string(),
            }),
        }
    }
}

/// 1 to 5, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SafetyRank(u8);

impl SafetyRank {
    pub fn new(rank: i64) -> Option<Self> {
        (1..=5).contains(&rank).then_some(Self(rank as u8))
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl Default for SafetyRank {
    fn default() -> Self {
        Self(DEFAULT_SAFETY_RANK)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Spot {
    pub id: String,
    pub name: String,
    pub area: String,
    pub station: String,
    pub walk_minutes: u32,
    pub address: String,
    pub description: String,
    pub place_type: PlaceType,
    pub lines: Vec<String>,
    pub safety_rank: SafetyRank,
    pub safety_note: Option<String>,
    pub image: String,
    pub status: SpotStatus,
    pub submitted_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub display_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Spot {
    pub fn is_approved(&self) -> bool {
        self.status == SpotStatus::Approved
    }
}

impl TryFrom<Row> for Spot {
    type Error = RowError;

    fn try_from(row: Row) -> Result<Self, Self::Error> {
        Ok(Spot {
            id: id(&row)?,
            name: text(&row, "name")?,
            area: text(&row, "area")?,
            station: text(&row, "station")?,
            walk_minutes: walk_minutes(&row)?,
            address: text(&row, "address")?,
            description: text(&row, "description")?,
            place_type: parsed(&row, "place_type", "place type")?,
            lines: lines(&row)?,
            safety_rank: safety_rank(&row)?,
            safety_note: optional_text(&row, "safety_note")?,
            image: text(&row, "image")?,
            status: parsed(&row, "status", "status")?,
            submitted_by: optional_text(&row, "submitted_by")?,
            approved_at: optional_timestamp(&row, "approved_at")?,
            display_order: integer(&row, "display_order")?,
            created_at: timestamp(&row, "created_at")?,
            updated_at: timestamp(&row, "updated_at")?,
        })
    }
}

impl TryFrom<Value> for Spot {
    type Error = RowError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(row) => Spot::try_from(row),
            _ => Err(RowError::NotAnObject),
        }
    }
}

fn column<'a>(row: &'a Row, column: &'static str) -> Result<&'a Value, RowError> {
    match row.get(column) {
        None | Some(Value::Null) => Err(RowError::Missing(column)),
        Some(value) => Ok(value),
    }
}

fn text(row: &Row, name: &'static str) -> Result<String, RowError> {
    column(row, name)?
        .as_str()
        .map(str::to_string)
        .ok_or(RowError::Invalid {
            column: name,
            expected: "string",
        })
}

fn optional_text(row: &Row, name: &'static str) -> Result<Option<String>, RowError> {
    match row.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(RowError::Invalid {
            column: name,
            expected: "string or null",
        }),
    }
}

// Postgres uuid and bigint keys both show up here depending on the table
fn id(row: &Row) -> Result<String, RowError> {
    match column(row, "id")? {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(RowError::Invalid {
            column: "id",
            expected: "string or number",
        }),
    }
}

fn integer(row: &Row, name: &'static str) -> Result<i64, RowError> {
    column(row, name)?.as_i64().ok_or(RowError::Invalid {
        column: name,
        expected: "integer",
    })
}

fn walk_minutes(row: &Row) -> Result<u32, RowError> {
    let minutes = integer(row, "walk_minutes")?;

    u32::try_from(minutes)
        .ok()
        .filter(|minutes| *minutes > 0)
        .ok_or(RowError::Invalid {
            column: "walk_minutes",
            expected: "positive integer",
        })
}

fn safety_rank(row: &Row) -> Result<SafetyRank, RowError> {
    SafetyRank::new(integer(row, "safety_rank")?).ok_or(RowError::Invalid {
        column: "safety_rank",
        expected: "integer between 1 and 5",
    })
}

fn lines(row: &Row) -> Result<Vec<String>, RowError> {
    let invalid = RowError::Invalid {
        column: "lines",
        expected: "array of strings",
    };

    let Value::Array(values) = column(row, "lines")? else {
        return Err(invalid);
    };

    values
        .iter()
        .map(|value| value.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()
        .ok_or(invalid)
}

fn parsed<T: FromStr>(
    row: &Row,
    name: &'static str,
    expected: &'static str,
) -> Result<T, RowError> {
    text(row, name)?.parse().map_err(|_| RowError::Invalid {
        column: name,
        expected,
    })
}

fn timestamp(row: &Row, name: &'static str) -> Result<DateTime<Utc>, RowError> {
    parse_timestamp(&text(row, name)?, name)
}

fn optional_timestamp(row: &Row, name: &'static str) -> Result<Option<DateTime<Utc>>, RowError> {
    optional_text(row, name)?
        .map(|s| parse_timestamp(&s, name))
        .transpose()
}

fn parse_timestamp(s: &str, name: &'static str) -> Result<DateTime<Utc>, RowError> {
    DateTime::parse_from_rfc3339(s)
        .map(|time| time.with_timezone(&Utc))
        .map_err(|_| RowError::Invalid {
            column: name,
            expected: "RFC 3339 timestamp",
        })
}

#[cfg(test)]
pub(crate) mod tests {
    use serde_json::json;

    use super::*;

    pub fn row() -> Value {
        json!({
            "id": "2f1c",
            "name": "田端大橋 跨線橋",
            "area": "東京23区",
            "station": "田端駅",
            "walk_minutes": 3,
            "address": "東京都北区田端",
            "description": "跨線橋の中央から複数路線を見下ろせる。",
            "place_type": "跨線橋",
            "lines": ["山手線", "京浜東北線"],
            "safety_rank": 5,
            "safety_note": null,
            "image": "https://example.supabase.co/storage/v1/object/public/spots/tabata.jpg",
            "status": "approved",
            "submitted_by": null,
            "approved_at": null,
            "display_order": 1,
            "created_at": "2025-01-10T12:34:56.789012+00:00",
            "updated_at": "2025-01-10T12:34:56+09:00"
        })
    }

    fn with(key: &str, value: Value) -> Value {
        let mut row = row();
        row[key] = value;
        row
    }

    #[test]
    fn test_full_row() {
        let spot = Spot::try_from(row()).unwrap();

        assert_eq!(spot.id, "2f1c");
        assert_eq!(spot.walk_minutes, 3);
        assert_eq!(spot.place_type, PlaceType::Overpass);
        assert_eq!(spot.lines, vec!["山手線", "京浜東北線"]);
        assert_eq!(spot.safety_rank.get(), 5);
        assert_eq!(spot.safety_note, None);
        assert!(spot.is_approved());
        assert_eq!(spot.updated_at.to_rfc3339(), "2025-01-10T03:34:56+00:00");
    }

    #[test]
    fn test_numeric_id() {
        let spot = Spot::try_from(with("id", json!(42))).unwrap();
        assert_eq!(spot.id, "42");
    }

    #[test]
    fn test_missing_column() {
        let mut row = row();
        row.as_object_mut().unwrap().remove("station");

        assert_eq!(Spot::try_from(row), Err(RowError::Missing("station")));
        assert_eq!(
            Spot::try_from(with("name", Value::Null)),
            Err(RowError::Missing("name"))
        );
    }

    #[test]
    fn test_mistyped_columns() {
        assert!(matches!(
            Spot::try_from(with("walk_minutes", json!("3"))),
            Err(RowError::Invalid {
                column: "walk_minutes",
                ..
            })
        ));
        assert!(matches!(
            Spot::try_from(with("walk_minutes", json!(0))),
            Err(RowError::Invalid {
                column: "walk_minutes",
                ..
            })
        ));
        assert!(matches!(
            Spot::try_from(with("lines", json!(["山手線", 3]))),
            Err(RowError::Invalid { column: "lines", .. })
        ));
        assert!(matches!(
            Spot::try_from(with("place_type", json!("駅"))),
            Err(RowError::Invalid {
                column: "place_type",
                ..
            })
        ));
        assert!(matches!(
            Spot::try_from(with("safety_rank", json!(6))),
            Err(RowError::Invalid {
                column: "safety_rank",
                ..
            })
        ));
        assert!(matches!(
            Spot::try_from(with("created_at", json!("yesterday"))),
            Err(RowError::Invalid {
                column: "created_at",
                ..
            })
        ));
        assert_eq!(Spot::try_from(json!([1, 2])), Err(RowError::NotAnObject));
    }

    #[test]
    fn test_place_type_parsing() {
        assert_eq!("公園".parse(), Ok(PlaceType::Park));
        assert_eq!("observation-deck".parse(), Ok(PlaceType::ObservationDeck));
        assert_eq!(" 橋 ".parse(), Ok(PlaceType::Bridge));
        assert!("駅".parse::<PlaceType>().is_err());
    }

    #[test]
    fn test_serializes_camel_case() {
        let spot = Spot::try_from(row()).unwrap();
        let json = serde_json::to_value(&spot).unwrap();

        assert_eq!(json["walkMinutes"], 3);
        assert_eq!(json["placeType"], "跨線橋");
        assert_eq!(json["status"], "approved");
        assert_eq!(json["safetyRank"], 5);
    }
}
