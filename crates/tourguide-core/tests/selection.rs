//! Selection model integration tests
//!
//! Proximity gating, persistence across sessions and degraded collaborators.

use std::cell::Cell;
use std::rc::Rc;

use tourguide_core::*;
use tourguide_geo::{
    compute_distance_meters, FixedSource, GeolocationManager, GeolocationOptions,
    GeolocationProvider, LatLng, UserPosition,
};
use tourguide_storage::{KeyValueStore, Storage, StorageError};

const USER: LatLng = LatLng::new(39.0201344, -77.4144);

fn ashburn_catalog() -> PlaceCatalog {
    PlaceCatalog::new(vec![
        Place::new("near", LatLng::new(39.0201400, -77.4144000), "Fountain", "Right here."),
        Place::new("far", LatLng::new(39.0225, -77.413), "Library", "A short walk away."),
    ])
    .unwrap()
}

/// Store that fails every operation
struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("quota exceeded".into()))
    }

    fn set_item(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("quota exceeded".into()))
    }

    fn remove_item(&mut self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("quota exceeded".into()))
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("quota exceeded".into()))
    }

    fn len(&self) -> usize {
        0
    }
}

/// Session storage whose writes fail while `failing` is set
struct OutageStore {
    inner: Storage,
    failing: Rc<Cell<bool>>,
}

impl OutageStore {
    fn check(&self) -> Result<(), StorageError> {
        if self.failing.get() {
            return Err(StorageError::Unavailable("disk full".into()));
        }
        Ok(())
    }
}

impl KeyValueStore for OutageStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        self.inner.set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        self.inner.remove_item(key)
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.check()?;
        self.inner.clear()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

// ============================================================================
// PROXIMITY
// ============================================================================

#[test]
fn test_nearby_place_is_selected_and_visited() {
    let catalog = ashburn_catalog();
    let mut model = ProximitySelectionModel::new(
        catalog,
        KeyValueVisitedStore::new(Storage::session()),
        Transcript::new(),
        SelectionSettings::default(),
    );
    model.set_user_position(UserPosition::Present(USER));

    let near = PlaceId::from("near");
    let d = model.distance_to(&near).unwrap();
    assert!(d < 1.0, "got {d}");
    assert!(model.can_select(&near));

    assert_eq!(model.select_place(&near), SelectOutcome::Selected);
    assert!(model.is_visited(&near));
    assert!(model.is_last_selected(&near));
}

#[test]
fn test_distant_place_is_not_selected() {
    let mut model = ProximitySelectionModel::new(
        ashburn_catalog(),
        KeyValueVisitedStore::new(Storage::session()),
        Transcript::new(),
        SelectionSettings::default(),
    );
    model.set_user_position(UserPosition::Present(USER));

    let far = PlaceId::from("far");
    assert!(!model.can_select(&far));
    assert!(matches!(model.select_place(&far), SelectOutcome::OutOfRange { .. }));
    assert!(!model.is_visited(&far));
    assert!(model.speech().history().is_empty());
}

#[test]
fn test_selectable_agrees_with_distance_for_every_radius() {
    let catalog = PlaceCatalog::builtin();
    let user = UserPosition::Present(LatLng::new(6.1549, -75.3740));

    for radius in [0.0, 5.0, 10.0, 20.0, 100.0, 500.0, 5000.0] {
        for place in catalog.iter() {
            let d = compute_distance_meters(user.coords().unwrap(), place.position);
            assert_eq!(is_selectable(place, user, radius), d <= radius);
            assert!(is_selectable(place, UserPosition::Absent, radius));
        }
    }
}

#[test]
fn test_wider_radius_from_config() {
    let config = GuideConfig::from_json_str(r#"{"select_radius_meters": 500}"#).unwrap();
    let mut model = ProximitySelectionModel::new(
        ashburn_catalog(),
        KeyValueVisitedStore::new(Storage::session()),
        NoSpeech,
        config.selection_settings(),
    );
    model.set_user_position(UserPosition::Present(USER));

    assert_eq!(model.select_place(&"far".into()), SelectOutcome::Selected);
}

#[test]
fn test_position_from_geolocation_manager() {
    let mut geo = GeolocationManager::new(FixedSource::new(USER), GeolocationOptions::default());
    let mut model = ProximitySelectionModel::new(
        ashburn_catalog(),
        KeyValueVisitedStore::new(Storage::session()),
        NoSpeech,
        SelectionSettings::default(),
    );

    // Before the first fix every place is selectable
    model.sync_position(&geo);
    assert!(model.can_select(&"far".into()));

    geo.refresh().unwrap();
    model.sync_position(&geo);
    assert!(!model.can_select(&"far".into()));
    assert!(model.can_select(&"near".into()));
}

// ============================================================================
// PERSISTENCE
// ============================================================================

#[test]
fn test_restores_persisted_state() {
    let mut raw = Storage::session();
    raw.set_item("visitedPlaces", r#"["1","2"]"#).unwrap();
    raw.set_item("lastSelectedPlace", r#""2""#).unwrap();

    let model = ProximitySelectionModel::new(
        PlaceCatalog::builtin(),
        KeyValueVisitedStore::new(raw),
        NoSpeech,
        SelectionSettings::default(),
    );

    assert!(model.is_visited(&"1".into()));
    assert!(model.is_visited(&"2".into()));
    assert!(!model.is_visited(&"3".into()));
    assert!(model.is_last_selected(&"2".into()));
}

#[test]
fn test_unknown_persisted_ids_are_dropped() {
    let mut raw = Storage::session();
    raw.set_item("visitedPlaces", r#"["1","gone"]"#).unwrap();
    raw.set_item("lastSelectedPlace", r#""gone""#).unwrap();

    let model = ProximitySelectionModel::new(
        PlaceCatalog::builtin(),
        KeyValueVisitedStore::new(raw),
        NoSpeech,
        SelectionSettings::default(),
    );

    assert_eq!(model.visited_ids().map(PlaceId::as_str).collect::<Vec<_>>(), ["1"]);
    assert_eq!(model.last_selected(), None);
}

#[test]
fn test_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("guide.tsv");

    {
        let mut model = ProximitySelectionModel::new(
            PlaceCatalog::builtin(),
            KeyValueVisitedStore::new(Storage::local(&path)),
            NoSpeech,
            SelectionSettings::default(),
        );
        model.select_place(&"4".into());
        model.select_place(&"5".into());
        model.deselect();
    }

    let model = ProximitySelectionModel::new(
        PlaceCatalog::builtin(),
        KeyValueVisitedStore::new(Storage::local(&path)),
        NoSpeech,
        SelectionSettings::default(),
    );
    assert!(model.is_visited(&"4".into()));
    assert!(model.is_visited(&"5".into()));
    assert_eq!(model.last_selected(), None);
}

#[test]
fn test_clear_visited_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("guide.tsv");

    {
        let mut model = ProximitySelectionModel::new(
            PlaceCatalog::builtin(),
            KeyValueVisitedStore::new(Storage::local(&path)),
            NoSpeech,
            SelectionSettings::default(),
        );
        model.select_place(&"1".into());
        model.clear_visited();
    }

    let model = ProximitySelectionModel::new(
        PlaceCatalog::builtin(),
        KeyValueVisitedStore::new(Storage::local(&path)),
        NoSpeech,
        SelectionSettings::default(),
    );
    assert_eq!(model.visited_ids().count(), 0);
    assert!(model.is_last_selected(&"1".into()));
}

// ============================================================================
// DEGRADED COLLABORATORS
// ============================================================================

#[test]
fn test_broken_store_does_not_block_selection() {
    let mut model = ProximitySelectionModel::new(
        PlaceCatalog::builtin(),
        KeyValueVisitedStore::new(BrokenStore),
        NoSpeech,
        SelectionSettings::default(),
    );

    assert_eq!(model.visited_ids().count(), 0);
    assert_eq!(model.select_place(&"3".into()), SelectOutcome::Selected);
    assert!(model.is_visited(&"3".into()));

    model.deselect();
    model.clear_visited();
    assert!(!model.is_visited(&"3".into()));
    assert!(!model.is_last_selected(&"3".into()));
}

#[test]
fn test_visited_write_retried_after_outage() {
    let failing = Rc::new(Cell::new(true));
    let store = OutageStore { inner: Storage::session(), failing: Rc::clone(&failing) };
    let mut model = ProximitySelectionModel::new(
        PlaceCatalog::builtin(),
        KeyValueVisitedStore::new(store),
        NoSpeech,
        SelectionSettings::default(),
    );

    assert_eq!(model.select_place(&"1".into()), SelectOutcome::Selected);
    failing.set(false);
    // Already visited in memory; the earlier failed write must be redone
    assert_eq!(model.select_place(&"1".into()), SelectOutcome::Selected);

    let persisted = model.store().load().unwrap();
    assert!(persisted.visited.contains(&"1".into()));
    assert_eq!(persisted.last_selected, Some("1".into()));
}

#[test]
fn test_boxed_collaborators() {
    let store: Box<dyn KeyValueStore> = Box::new(Storage::session());
    let speech: Box<dyn SpeechCollaborator> = Box::new(Transcript::new());
    let mut model = ProximitySelectionModel::new(
        PlaceCatalog::builtin(),
        KeyValueVisitedStore::new(store),
        speech,
        SelectionSettings::default(),
    );

    assert_eq!(model.select_place(&"2".into()), SelectOutcome::Selected);
}
