//! Tour Guide Core
//!
//! Proximity-gated place selection: which places the user may select from
//! where they stand, how far away each one is, and which ones they have
//! already visited.
//!
//! # Example
//!
//! ```
//! use tourguide_core::{
//!     KeyValueVisitedStore, NoSpeech, PlaceCatalog, ProximitySelectionModel,
//!     SelectOutcome, SelectionSettings,
//! };
//! use tourguide_storage::Storage;
//!
//! let mut model = ProximitySelectionModel::new(
//!     PlaceCatalog::builtin(),
//!     KeyValueVisitedStore::new(Storage::session()),
//!     NoSpeech,
//!     SelectionSettings::default(),
//! );
//!
//! // No fix yet: everything is selectable
//! assert_eq!(model.select_place(&"1".into()), SelectOutcome::Selected);
//! assert!(model.is_visited(&"1".into()));
//! ```

pub mod config;
pub mod place;
pub mod selection;
pub mod speech;
pub mod visited;

pub use config::{ConfigError, GuideConfig, DEFAULT_CENTER};
pub use place::{CatalogError, Place, PlaceCatalog, PlaceId};
pub use selection::{
    is_selectable, PlaceStatus, PlaceView, ProximitySelectionModel, SelectOutcome,
    SelectionSettings, DEFAULT_SELECT_RADIUS_METERS,
};
pub use speech::{NoSpeech, SpeechCollaborator, SpeechError, Transcript, Utterance, VoiceSettings};
pub use visited::{
    KeyValueVisitedStore, PersistError, PersistedState, PersistedVisitedStore, VisitedSet,
};
