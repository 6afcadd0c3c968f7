//! # Spots
//!
//! Shared core of 子鉄スポット帳, a spot book of train-watching places for
//! parents of young train fans.
//!
//! - [`models`]: the spot record and row conversion
//! - [`filter`]: area / line group / condition filtering
//! - [`collections`]: liked, visited and stamped sets with pluggable persistence
//! - [`remote`]: Supabase record and object store
//! - [`database`]: reads as the pages see them, failures folded away
//! - [`submission`]: admin create flow
//!
//! ## Notes
//! - Only approved spots are ever listed
//! - Visitor state never leaves the visitor, the server has no notion of it
//! - Inserts are always approved, there is no moderation path
pub mod collections;
pub mod database;
pub mod filter;
pub mod models;
pub mod remote;
pub mod submission;
pub mod utils;

pub use collections::{Collection, Collections, FileStore, KeyValueStore, MemoryStore};
pub use database::{approved_spot, approved_spots};
pub use filter::{Condition, Filters, compute_visible};
pub use models::{PlaceType, Spot, SpotStatus};
pub use remote::{NewSpot, ObjectStore, RecordStore, RemoteError, SeedSpot, Supabase};
pub use submission::{ImageUpload, SpotDraft, SpotForm, SubmitError, submit};
