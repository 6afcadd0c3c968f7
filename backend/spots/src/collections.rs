//! # Collections
//!
//! Visitor-side state: which spots were liked, visited and stamped.
//!
//! - Three independent ordered id sets, never sent to a server
//! - Every toggle rewrites the whole set under its fixed key
//! - Persistence is best effort, memory stays authoritative for the session
//! - Missing or garbled keys restore as empty
//!
//! Storage goes through [`KeyValueStore`] so callers pick the backing:
//! [`MemoryStore`] for tests, [`FileStore`] for a JSON file on disk.
use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::Spot;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Storage encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Storage quota exceeded")]
    QuotaExceeded,
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Liked,
    Visited,
    Stamped,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Liked, Collection::Visited, Collection::Stamped];

    pub fn key(&self) -> &'static str {
        match self {
            Collection::Liked => "likedSpots",
            Collection::Visited => "visitedSpots",
            Collection::Stamped => "stampedSpots",
        }
    }
}

/// Removes `id` when present, appends it otherwise.
pub fn toggle_membership(set: &[String], id: &str) -> Vec<String> {
    if set.iter().any(|member| member == id) {
        set.iter().filter(|member| *member != id).cloned().collect()
    } else {
        let mut toggled = set.to_vec();
        toggled.push(id.to_string());
        toggled
    }
}

pub fn restore<S: KeyValueStore>(store: &S, collection: Collection) -> Vec<String> {
    let Some(raw) = store.get(collection.key()) else {
        return Vec::new();
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        debug!("Discarding unreadable {}: {e}", collection.key());
        Vec::new()
    })
}

pub fn persist<S: KeyValueStore>(store: &mut S, collection: Collection, ids: &[String]) {
    let result = serde_json::to_string(ids)
        .map_err(StoreError::from)
        .and_then(|encoded| store.set(collection.key(), &encoded));

    if let Err(e) = result {
        warn!("Failed to persist {}: {e}", collection.key());
    }
}

pub struct Collections<S: KeyValueStore> {
    store: S,
    liked: Vec<String>,
    visited: Vec<String>,
    stamped: Vec<String>,
}

impl<S: KeyValueStore> Collections<S> {
    pub fn restore(store: S) -> Self {
        Self {
            liked: restore(&store, Collection::Liked),
            visited: restore(&store, Collection::Visited),
            stamped: restore(&store, Collection::Stamped),
            store,
        }
    }

    pub fn ids(&self, collection: Collection) -> &[String] {
        match collection {
            Collection::Liked => &self.liked,
            Collection::Visited => &self.visited,
            Collection::Stamped => &self.stamped,
        }
    }

    pub fn contains(&self, collection: Collection, id: &str) -> bool {
        self.ids(collection).iter().any(|member| member == id)
    }

    pub fn toggle(&mut self, collection: Collection, id: &str) -> &[String] {
        let toggled = toggle_membership(self.ids(collection), id);
        persist(&mut self.store, collection, &toggled);

        let slot = match collection {
            Collection::Liked => &mut self.liked,
            Collection::Visited => &mut self.visited,
            Collection::Stamped => &mut self.stamped,
        };
        *slot = toggled;

        slot
    }

    pub fn stamp_book<'a>(&self, spots: &'a [Spot]) -> StampBook<'a> {
        let pages = spots
            .iter()
            .filter(|spot| self.contains(Collection::Visited, &spot.id))
            .map(|spot| StampPage {
                spot,
                stamped: self.contains(Collection::Stamped, &spot.id),
            })
            .collect();

        StampBook {
            visited: self.visited.len(),
            pages,
        }
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

#[derive(Debug, Serialize)]
pub struct StampPage<'a> {
    pub spot: &'a Spot,
    pub stamped: bool,
}

/// Visited spots in record order. `visited` counts every visited id, including
/// ones whose spot is no longer listed.
#[derive(Debug, Serialize)]
pub struct StampBook<'a> {
    pub visited: usize,
    pub pages: Vec<StampPage<'a>>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A flat JSON object of string values, rewritten on every `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl FileStore {
    /// A missing or unreadable file opens as empty.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();

        let entries = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!("Ignoring unreadable state file {}: {e}", path.display());
                HashMap::new()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!("Failed to read state file {}: {e}", path.display());
                HashMap::new()
            }
        };

        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());

        let encoded = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, encoded)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{filter::tests::spot, models::PlaceType};

    struct FullStore;

    impl KeyValueStore for FullStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::QuotaExceeded)
        }
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_toggle_membership() {
        assert_eq!(toggle_membership(&[], "a"), ids(&["a"]));
        assert_eq!(toggle_membership(&ids(&["a", "b"]), "c"), ids(&["a", "b", "c"]));
        assert_eq!(toggle_membership(&ids(&["a", "b", "c"]), "b"), ids(&["a", "c"]));
    }

    #[test]
    fn test_toggle_is_involution() {
        let sets = [ids(&[]), ids(&["a"]), ids(&["b", "a"]), ids(&["x", "y", "z"])];

        for set in sets {
            for id in ["a", "b", "q"] {
                let twice = toggle_membership(&toggle_membership(&set, id), id);

                let mut expected = set.clone();
                let mut actual = twice.clone();
                expected.sort();
                actual.sort();

                assert_eq!(actual, expected, "{set:?} with {id}");
            }
        }
    }

    #[test]
    fn test_double_like_persists_empty() {
        let mut collections = Collections::restore(MemoryStore::new());

        collections.toggle(Collection::Liked, "a");
        assert!(collections.contains(Collection::Liked, "a"));

        collections.toggle(Collection::Liked, "a");
        assert!(!collections.contains(Collection::Liked, "a"));

        let store = collections.into_store();
        assert_eq!(store.get("likedSpots").as_deref(), Some("[]"));
    }

    #[test]
    fn test_persisted_round_trip() {
        let mut collections = Collections::restore(MemoryStore::new());

        for id in ["a", "b", "c", "b"] {
            let returned = collections.toggle(Collection::Visited, id).to_vec();
            let persisted: Vec<String> =
                serde_json::from_str(&collections.store.get("visitedSpots").unwrap()).unwrap();

            assert_eq!(persisted, returned);
        }

        assert_eq!(collections.ids(Collection::Visited), ids(&["a", "c"]));
    }

    #[test]
    fn test_sets_are_independent() {
        let mut collections = Collections::restore(MemoryStore::new());

        collections.toggle(Collection::Liked, "a");
        collections.toggle(Collection::Stamped, "b");

        assert!(collections.ids(Collection::Visited).is_empty());
        assert_eq!(collections.ids(Collection::Liked), ids(&["a"]));
        assert_eq!(collections.ids(Collection::Stamped), ids(&["b"]));
    }

    #[test]
    fn test_restore_on_load() {
        let store = MemoryStore::new()
            .with("likedSpots", r#"["a","b"]"#)
            .with("visitedSpots", "not json")
            .with("stampedSpots", r#"{"a":1}"#);

        let collections = Collections::restore(store);

        assert_eq!(collections.ids(Collection::Liked), ids(&["a", "b"]));
        assert!(collections.ids(Collection::Visited).is_empty());
        assert!(collections.ids(Collection::Stamped).is_empty());
    }

    #[test]
    fn test_failed_persist_keeps_memory() {
        let mut collections = Collections::restore(FullStore);

        assert_eq!(collections.toggle(Collection::Liked, "a"), ids(&["a"]));
        assert!(collections.contains(Collection::Liked, "a"));
    }

    #[test]
    fn test_stamp_book() {
        let spots = vec![
            spot("a", "東京23区", 3, PlaceType::Bridge, &["山手線"]),
            spot("b", "埼玉県", 10, PlaceType::Park, &["東武線"]),
            spot("c", "千葉県", 2, PlaceType::Other, &["京成線"]),
        ];

        let store = MemoryStore::new()
            .with("visitedSpots", r#"["c","a","gone"]"#)
            .with("stampedSpots", r#"["c","b"]"#);
        let collections = Collections::restore(store);

        let book = collections.stamp_book(&spots);

        assert_eq!(book.visited, 3);
        assert_eq!(
            book.pages
                .iter()
                .map(|page| (page.spot.id.as_str(), page.stamped))
                .collect::<Vec<_>>(),
            vec![("a", false), ("c", true)]
        );
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut collections = Collections::restore(FileStore::open(&path));
        collections.toggle(Collection::Liked, "a");
        collections.toggle(Collection::Visited, "b");

        let reopened = Collections::restore(FileStore::open(&path));
        assert_eq!(reopened.ids(Collection::Liked), ids(&["a"]));
        assert_eq!(reopened.ids(Collection::Visited), ids(&["b"]));
        assert!(reopened.ids(Collection::Stamped).is_empty());
    }

    #[test]
    fn test_file_store_tolerates_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{{{").unwrap();

        let collections = Collections::restore(FileStore::open(&path));
        assert!(collections.ids(Collection::Liked).is_empty());
    }
}
