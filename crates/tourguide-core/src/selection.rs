//! Proximity-gated selection
//!
//! A place can be selected only while the user stands within the select
//! radius of it. Until a position fix arrives every place is selectable.
//! Selecting marks the place visited for good and makes it the last
//! selected place.

use tourguide_geo::{is_within_radius, GeolocationProvider, UserPosition};

use crate::speech::{SpeechCollaborator, VoiceSettings};
use crate::visited::{PersistedState, PersistedVisitedStore, VisitedSet};
use crate::{Place, PlaceCatalog, PlaceId};

/// Default select radius in meters
pub const DEFAULT_SELECT_RADIUS_METERS: f64 = 10.0;

/// Whether `place` may be selected from `user_position`
pub fn is_selectable(place: &Place, user_position: UserPosition, radius_meters: f64) -> bool {
    match user_position {
        UserPosition::Absent => true,
        UserPosition::Present(coords) => is_within_radius(coords, place.position, radius_meters),
    }
}

/// Selection settings
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSettings {
    pub radius_meters: f64,
    pub voice: VoiceSettings,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            radius_meters: DEFAULT_SELECT_RADIUS_METERS,
            voice: VoiceSettings::default(),
        }
    }
}

/// Result of a selection attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectOutcome {
    Selected,
    OutOfRange { distance_meters: f64 },
    UnknownPlace,
}

/// Visit status of a place
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceStatus {
    Unvisited { in_range: bool },
    /// Sticky, whatever the user's position
    Visited,
}

/// Everything a list row or a map marker needs to render a place
#[derive(Debug, Clone, Copy)]
pub struct PlaceView<'a> {
    pub place: &'a Place,
    pub distance_meters: Option<f64>,
    pub selectable: bool,
    pub status: PlaceStatus,
    pub last_selected: bool,
}

/// Proximity selection model
pub struct ProximitySelectionModel<St, Sp> {
    catalog: PlaceCatalog,
    settings: SelectionSettings,
    user_position: UserPosition,
    visited: VisitedSet,
    /// Last visited-set write failed; retry on the next selection
    visited_dirty: bool,
    last_selected: Option<PlaceId>,
    store: St,
    speech: Sp,
}

impl<St, Sp> ProximitySelectionModel<St, Sp>
where
    St: PersistedVisitedStore,
    Sp: SpeechCollaborator,
{
    /// Create the model and restore persisted state
    pub fn new(catalog: PlaceCatalog, store: St, speech: Sp, settings: SelectionSettings) -> Self {
        let PersistedState { mut visited, mut last_selected } = match store.load() {
            Ok(state) => state,
            Err(err) => {
                tracing::warn!("Could not load visited places, starting empty: {}", err);
                PersistedState::default()
            }
        };

        visited.retain(|id| {
            let known = catalog.contains(id);
            if !known {
                tracing::debug!("Dropping unknown visited place {}", id);
            }
            known
        });
        if let Some(id) = last_selected.take_if(|id| !catalog.contains(id)) {
            tracing::debug!("Dropping unknown last selected place {}", id);
        }

        tracing::debug!(
            "Selection model ready: {} places, {} visited",
            catalog.len(),
            visited.len()
        );

        Self {
            catalog,
            settings,
            user_position: UserPosition::Absent,
            visited,
            visited_dirty: false,
            last_selected,
            store,
            speech,
        }
    }

    /// Get the place catalog
    pub fn catalog(&self) -> &PlaceCatalog {
        &self.catalog
    }

    /// Get selection settings
    pub fn settings(&self) -> &SelectionSettings {
        &self.settings
    }

    /// Get the persistence store
    pub fn store(&self) -> &St {
        &self.store
    }

    /// Get the speech backend
    pub fn speech(&self) -> &Sp {
        &self.speech
    }

    /// Get the tracked user position
    pub fn user_position(&self) -> UserPosition {
        self.user_position
    }

    /// Track a new position. A known position is never replaced by `Absent`.
    pub fn set_user_position(&mut self, position: UserPosition) {
        if position == UserPosition::Absent && self.user_position.is_present() {
            tracing::debug!("Ignoring absent position; keeping last fix");
            return;
        }
        self.user_position = position;
    }

    /// Pull the latest position from `provider`
    pub fn sync_position(&mut self, provider: &impl GeolocationProvider) {
        self.set_user_position(provider.current_position());
    }

    /// Distance from the user to a place, for display
    pub fn distance_to(&self, id: &PlaceId) -> Option<f64> {
        let place = self.catalog.get(id)?;
        self.user_position.distance_to(place.position)
    }

    /// Whether a catalog place is selectable right now
    pub fn can_select(&self, id: &PlaceId) -> bool {
        self.catalog
            .get(id)
            .is_some_and(|place| is_selectable(place, self.user_position, self.settings.radius_meters))
    }

    /// Select a place: mark it visited, make it last selected and read it aloud
    pub fn select_place(&mut self, id: &PlaceId) -> SelectOutcome {
        let Some(place) = self.catalog.get(id) else {
            tracing::debug!("Ignoring selection of unknown place {}", id);
            return SelectOutcome::UnknownPlace;
        };

        if !is_selectable(place, self.user_position, self.settings.radius_meters) {
            let distance_meters = self
                .user_position
                .distance_to(place.position)
                .unwrap_or_default();
            tracing::debug!("Place {} out of range ({:.1} m)", id, distance_meters);
            return SelectOutcome::OutOfRange { distance_meters };
        }

        let utterance = self.settings.voice.utterance(place.readout());
        tracing::info!("Selected place {} ({})", id, place.title);

        if self.visited.mark_visited(id.clone()) || self.visited_dirty {
            self.persist_visited();
        }

        self.last_selected = Some(id.clone());
        if let Err(err) = self.store.save_last_selected(Some(id)) {
            tracing::warn!("Could not save last selected place: {}", err);
        }

        if let Err(err) = self.speech.speak(utterance) {
            tracing::debug!("Skipped readout: {}", err);
        }

        SelectOutcome::Selected
    }

    /// Close the current selection
    pub fn deselect(&mut self) {
        self.last_selected = None;
        if let Err(err) = self.store.save_last_selected(None) {
            tracing::warn!("Could not clear last selected place: {}", err);
        }
    }

    /// Forget every visited place
    pub fn clear_visited(&mut self) {
        self.visited.clear();
        self.persist_visited();
        tracing::info!("Cleared visited places");
    }

    /// Check if a place was visited
    pub fn is_visited(&self, id: &PlaceId) -> bool {
        self.visited.contains(id)
    }

    /// Check if a place is the last selected one
    pub fn is_last_selected(&self, id: &PlaceId) -> bool {
        self.last_selected.as_ref() == Some(id)
    }

    /// Get the last selected place id
    pub fn last_selected(&self) -> Option<&PlaceId> {
        self.last_selected.as_ref()
    }

    /// Iterate visited place ids
    pub fn visited_ids(&self) -> impl Iterator<Item = &PlaceId> {
        self.visited.iter()
    }

    /// Get the visit status of a place
    pub fn status(&self, id: &PlaceId) -> Option<PlaceStatus> {
        let place = self.catalog.get(id)?;
        Some(self.status_of(place))
    }

    /// One view per place, in catalog order
    pub fn places(&self) -> impl Iterator<Item = PlaceView<'_>> {
        self.catalog.iter().map(|place| PlaceView {
            place,
            distance_meters: self.user_position.distance_to(place.position),
            selectable: is_selectable(place, self.user_position, self.settings.radius_meters),
            status: self.status_of(place),
            last_selected: self.is_last_selected(&place.id),
        })
    }

    /// Write the visited set, remembering a failure for the next attempt
    fn persist_visited(&mut self) {
        match self.store.save_visited(&self.visited) {
            Ok(()) => self.visited_dirty = false,
            Err(err) => {
                tracing::warn!("Could not save visited places: {}", err);
                self.visited_dirty = true;
            }
        }
    }

    fn status_of(&self, place: &Place) -> PlaceStatus {
        if self.visited.contains(&place.id) {
            PlaceStatus::Visited
        } else {
            PlaceStatus::Unvisited {
                in_range: is_selectable(place, self.user_position, self.settings.radius_meters),
            }
        }
    }
}
