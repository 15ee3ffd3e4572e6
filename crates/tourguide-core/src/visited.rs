//! Visited state and its persistence
//!
//! Two keys hold the state: a JSON array of visited ids and a JSON string
//! for the last selected id. The second key is removed rather than set to
//! `null` when nothing is selected.

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use tourguide_storage::{KeyValueStore, StorageError};

use crate::PlaceId;

pub const VISITED_KEY: &str = "visitedPlaces";
pub const LAST_SELECTED_KEY: &str = "lastSelectedPlace";

/// Places the user has selected while in range
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitedSet {
    ids: BTreeSet<PlaceId>,
}

impl VisitedSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the id was not already visited
    pub fn mark_visited(&mut self, id: PlaceId) -> bool {
        self.ids.insert(id)
    }

    /// Check if a place id is in the set
    pub fn contains(&self, id: &PlaceId) -> bool {
        self.ids.contains(id)
    }

    /// Remove all ids
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Keep only ids matching `keep`
    pub fn retain(&mut self, keep: impl FnMut(&PlaceId) -> bool) {
        self.ids.retain(keep);
    }

    /// Iterate ids in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &PlaceId> {
        self.ids.iter()
    }

    /// Get number of ids
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<PlaceId> for VisitedSet {
    fn from_iter<I: IntoIterator<Item = PlaceId>>(iter: I) -> Self {
        Self { ids: iter.into_iter().collect() }
    }
}

/// State restored at startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedState {
    pub visited: VisitedSet,
    pub last_selected: Option<PlaceId>,
}

/// Persistence error
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persistence boundary for visited state
pub trait PersistedVisitedStore {
    fn load(&self) -> Result<PersistedState, PersistError>;

    fn save_visited(&mut self, visited: &VisitedSet) -> Result<(), PersistError>;

    fn save_last_selected(&mut self, id: Option<&PlaceId>) -> Result<(), PersistError>;
}

/// Visited store on top of any key-value store
#[derive(Debug)]
pub struct KeyValueVisitedStore<S> {
    store: S,
    visited_key: String,
    last_selected_key: String,
}

impl<S: KeyValueStore> KeyValueVisitedStore<S> {
    /// Create a store using the default keys
    pub fn new(store: S) -> Self {
        Self {
            store,
            visited_key: VISITED_KEY.to_string(),
            last_selected_key: LAST_SELECTED_KEY.to_string(),
        }
    }

    /// Scope both keys under `namespace`, e.g. one namespace per user
    pub fn with_namespace(store: S, namespace: &str) -> Self {
        Self {
            store,
            visited_key: format!("{namespace}:{VISITED_KEY}"),
            last_selected_key: format!("{namespace}:{LAST_SELECTED_KEY}"),
        }
    }

    /// Get the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Take back the underlying store
    pub fn into_inner(self) -> S {
        self.store
    }

    /// Read and decode one key; malformed JSON falls back to the default
    fn read_json<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, PersistError> {
        let Some(raw) = self.store.get_item(key)? else {
            return Ok(T::default());
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::warn!("Ignoring malformed value under {}: {}", key, err);
                Ok(T::default())
            }
        }
    }
}

impl<S: KeyValueStore> PersistedVisitedStore for KeyValueVisitedStore<S> {
    fn load(&self) -> Result<PersistedState, PersistError> {
        let visited: Vec<PlaceId> = self.read_json(&self.visited_key)?;
        let last_selected: Option<PlaceId> = self.read_json(&self.last_selected_key)?;

        Ok(PersistedState {
            visited: visited.into_iter().collect(),
            last_selected,
        })
    }

    fn save_visited(&mut self, visited: &VisitedSet) -> Result<(), PersistError> {
        let ids: Vec<&PlaceId> = visited.iter().collect();
        let json = serde_json::to_string(&ids)?;
        self.store.set_item(&self.visited_key, &json)?;
        Ok(())
    }

    fn save_last_selected(&mut self, id: Option<&PlaceId>) -> Result<(), PersistError> {
        match id {
            Some(id) => {
                let json = serde_json::to_string(id)?;
                self.store.set_item(&self.last_selected_key, &json)?;
            }
            None => self.store.remove_item(&self.last_selected_key)?,
        }
        Ok(())
    }
}
