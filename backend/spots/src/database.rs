//! # Data Access
//!
//! Read side of the record store as the pages see it.
//!
//! Failures never reach the visitor:
//! - A failed list is logged and reads as no spots
//! - A failed get is logged and reads as not found
//! - A spot that exists but is not approved also reads as not found
use tracing::{error, warn};

use crate::{models::Spot, remote::RecordStore};

pub async fn approved_spots(records: &dyn RecordStore) -> Vec<Spot> {
    records.list_approved().await.unwrap_or_else(|e| {
        error!("Error fetching spots: {e}");
        Vec::new()
    })
}

pub async fn approved_spot(records: &dyn RecordStore, id: &str) -> Option<Spot> {
    match records.get_by_id(id).await {
        Ok(Some(spot)) if spot.is_approved() => Some(spot),
        Ok(Some(spot)) => {
            warn!("Spot {id} requested while {}", spot.status.as_str());
            None
        }
        Ok(None) => None,
        Err(e) => {
            error!("Error fetching spot {id}: {e}");
            None
        }
    }
}
