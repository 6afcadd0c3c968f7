//! # Supabase
//!
//! Record store and object store behind one HTTP client.
//!
//! ## Record store
//! - PostgREST table (`spots` by default), read with the anon key, written with the service role key
//! - List: `status=eq.approved`, ordered by `display_order` ascending
//! - Get: `id=eq.<id>`, zero rows is a plain "not found"
//! - Insert: one row, `id`/`display_order`/timestamps left to column defaults
//! - Insert row: one full row from a seed file, every column given explicitly
//!
//! ## Object store
//! - Storage bucket (`spots` by default), public read
//! - Upload only, no update or delete path
//!
//! Both surfaces answer errors as JSON with a `message` field, which is what
//! [`RemoteError::Status`] carries back to the caller.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Response, header::CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{DEFAULT_SAFETY_RANK, PlaceType, RowError, Spot, SpotStatus};

pub const DEFAULT_TABLE: &str = "spots";
pub const DEFAULT_BUCKET: &str = "spots";

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Malformed row: {0}")]
    Row(#[from] RowError),
}

/// Row written by the admin paths. Everything else is a column default.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSpot {
    pub name: String,
    pub area: String,
    pub station: String,
    pub walk_minutes: u32,
    pub address: String,
    pub description: String,
    pub place_type: PlaceType,
    pub lines: Vec<String>,
    pub safety_rank: u8,
    pub safety_note: Option<String>,
    pub image: String,
    pub status: SpotStatus,
}

/// Full row as kept in a seed file. Read with the app's camelCase keys, written
/// with the table's snake_case columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "snake_case", deserialize = "camelCase"))]
pub struct SeedSpot {
    pub id: String,
    pub name: String,
    pub area: String,
    pub station: String,
    pub walk_minutes: u32,
    pub address: String,
    pub description: String,
    pub place_type: PlaceType,
    pub lines: Vec<String>,
    #[serde(default = "default_safety_rank")]
    pub safety_rank: u8,
    #[serde(default)]
    pub safety_note: Option<String>,
    pub image: String,
    pub status: SpotStatus,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    pub display_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_safety_rank() -> u8 {
    DEFAULT_SAFETY_RANK
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Approved spots by ascending display order. Rows that fail conversion are skipped.
    async fn list_approved(&self) -> Result<Vec<Spot>, RemoteError>;

    async fn get_by_id(&self, id: &str) -> Result<Option<Spot>, RemoteError>;

    async fn insert(&self, spot: &NewSpot) -> Result<(), RemoteError>;

    async fn insert_row(&self, spot: &SeedSpot) -> Result<(), RemoteError>;
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(
        &self,
        name: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), RemoteError>;

    fn public_url(&self, name: &str) -> String;
}

#[derive(Debug, Clone)]
pub struct Supabase {
    client: Client,
    url: String,
    key: String,
    table: String,
    bucket: String,
}

impl Supabase {
    pub fn new(url: &str, key: &str) -> Self {
        Self {
            client: Client::new(),
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            table: DEFAULT_TABLE.to_string(),
            bucket: DEFAULT_BUCKET.to_string(),
        }
    }

    pub fn with_table(mut self, table: &str) -> Self {
        self.table = table.to_string();
        self
    }

    pub fn with_bucket(mut self, bucket: &str) -> Self {
        self.bucket = bucket.to_string();
        self
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.url, self.table)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }

    async fn select(&self, query: &[(&str, String)]) -> Result<Vec<Value>, RemoteError> {
        let response = self
            .authorized(self.client.get(self.table_url()))
            .query(&[("select", "*")])
            .query(query)
            .send()
            .await?;

        Ok(checked(response).await?.json().await?)
    }

    async fn post_row<T: Serialize + Sync>(&self, row: &T) -> Result<(), RemoteError> {
        let response = self
            .authorized(self.client.post(self.table_url()))
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await?;

        checked(response).await?;

        Ok(())
    }
}

#[async_trait]
impl RecordStore for Supabase {
    async fn list_approved(&self) -> Result<Vec<Spot>, RemoteError> {
        let rows = self
            .select(&[
                ("status", format!("eq.{}", SpotStatus::Approved.as_str())),
                ("order", "display_order.asc".to_string()),
            ])
            .await?;

        debug!("Fetched {} rows", rows.len());

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                Spot::try_from(row)
                    .map_err(|e| warn!("Skipping malformed spot row: {e}"))
                    .ok()
            })
            .collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Spot>, RemoteError> {
        let rows = self.select(&[("id", format!("eq.{id}"))]).await?;

        match rows.into_iter().next() {
            Some(row) => Ok(Some(Spot::try_from(row)?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, spot: &NewSpot) -> Result<(), RemoteError> {
        self.post_row(spot).await
    }

    async fn insert_row(&self, spot: &SeedSpot) -> Result<(), RemoteError> {
        self.post_row(spot).await
    }
}

#[async_trait]
impl ObjectStore for Supabase {
    async fn upload(
        &self,
        name: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), RemoteError> {
        let url = format!("{}/storage/v1/object/{}/{name}", self.url, self.bucket);

        let response = self
            .authorized(self.client.post(url))
            .header(
                CONTENT_TYPE,
                content_type.unwrap_or("application/octet-stream"),
            )
            .body(bytes)
            .send()
            .await?;

        checked(response).await?;

        Ok(())
    }

    fn public_url(&self, name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{name}",
            self.url, self.bucket
        )
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

async fn checked(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();

    Err(RemoteError::Status {
        status: status.as_u16(),
        message: error_message(&body, status.canonical_reason().unwrap_or("error")),
    })
}

fn error_message(body: &str, fallback: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            message: Some(message),
            ..
        })
        | Ok(ErrorBody {
            message: None,
            error: Some(message),
        }) => message,
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => fallback.to_string(),
    }
}
