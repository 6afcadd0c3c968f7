//! # Submission
//!
//! Admin create flow: validate the form, upload the image, insert the row.
//!
//! The two round trips run in order and the insert is never attempted when the
//! upload fails. A failed insert leaves the uploaded image behind.
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    models::{DEFAULT_SAFETY_RANK, PlaceType, SpotStatus},
    remote::{NewSpot, ObjectStore, RecordStore, RemoteError},
    utils::{object_name, split_lines},
};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DraftError {
    #[error("Missing required field: {0}")]
    Missing(&'static str),

    #[error("walkMinutes must be a positive integer, got {0:?}")]
    WalkMinutes(String),

    #[error("Unknown placeType: {0}")]
    PlaceType(String),
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("{0}")]
    Upload(RemoteError),

    #[error("{0}")]
    Insert(RemoteError),
}

/// Raw form values, as typed by the admin.
#[derive(Debug, Clone, Default)]
pub struct SpotForm {
    pub name: String,
    pub area: String,
    pub station: String,
    pub walk_minutes: String,
    pub address: String,
    pub description: String,
    pub place_type: String,
    pub lines: String,
    pub safety_note: String,
}

impl SpotForm {
    /// Sets a field by its form name, returning false for unknown names.
    pub fn set(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "name" => &mut self.name,
            "area" => &mut self.area,
            "station" => &mut self.station,
            "walkMinutes" => &mut self.walk_minutes,
            "address" => &mut self.address,
            "description" => &mut self.description,
            "placeType" => &mut self.place_type,
            "lines" => &mut self.lines,
            "safetyNote" => &mut self.safety_note,
            _ => return false,
        };

        *slot = value;
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpotDraft {
    pub name: String,
    pub area: String,
    pub station: String,
    pub walk_minutes: u32,
    pub address: String,
    pub description: String,
    pub place_type: PlaceType,
    pub lines: Vec<String>,
    pub safety_note: Option<String>,
}

impl TryFrom<SpotForm> for SpotDraft {
    type Error = DraftError;

    fn try_from(form: SpotForm) -> Result<Self, Self::Error> {
        let walk_minutes = required(&form.walk_minutes, "walkMinutes")?;
        let place_type = required(&form.place_type, "placeType")?;
        let lines = split_lines(&form.lines);

        if lines.is_empty() {
            return Err(DraftError::Missing("lines"));
        }

        Ok(SpotDraft {
            name: required(&form.name, "name")?,
            area: required(&form.area, "area")?,
            station: required(&form.station, "station")?,
            walk_minutes: walk_minutes
                .parse()
                .ok()
                .filter(|minutes| *minutes > 0)
                .ok_or(DraftError::WalkMinutes(walk_minutes))?,
            address: required(&form.address, "address")?,
            description: required(&form.description, "description")?,
            place_type: place_type
                .parse()
                .map_err(|_| DraftError::PlaceType(place_type))?,
            lines,
            safety_note: Some(form.safety_note.trim().to_string()).filter(|note| !note.is_empty()),
        })
    }
}

fn required(value: &str, field: &'static str) -> Result<String, DraftError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(DraftError::Missing(field));
    }

    Ok(value.to_string())
}

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl NewSpot {
    pub fn approved(draft: SpotDraft, image: String) -> Self {
        Self {
            name: draft.name,
            area: draft.area,
            station: draft.station,
            walk_minutes: draft.walk_minutes,
            address: draft.address,
            description: draft.description,
            place_type: draft.place_type,
            lines: draft.lines,
            safety_rank: DEFAULT_SAFETY_RANK,
            safety_note: draft.safety_note,
            image,
            status: SpotStatus::Approved,
        }
    }
}

/// Uploads the image then inserts the spot, returning the image's public URL.
pub async fn submit(
    records: &dyn RecordStore,
    objects: &dyn ObjectStore,
    draft: SpotDraft,
    image: ImageUpload,
    timestamp_millis: i64,
) -> Result<String, SubmitError> {
    let name = object_name(timestamp_millis, &image.file_name);

    objects
        .upload(&name, image.bytes, image.content_type.as_deref())
        .await
        .map_err(|e| {
            warn!("Upload of {name} failed: {e}");
            SubmitError::Upload(e)
        })?;

    let url = objects.public_url(&name);
    info!("Uploaded {name}");

    let spot = NewSpot::approved(draft, url.clone());

    records.insert(&spot).await.map_err(|e| {
        warn!("Insert of {} failed, {name} left in storage: {e}", spot.name);
        SubmitError::Insert(e)
    })?;

    info!("Created spot {}", spot.name);

    Ok(url)
}
