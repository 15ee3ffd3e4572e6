//! Tour Guide - Main Entry Point

mod args;

use anyhow::{Context, Result};
use clap::Parser;
use tourguide_core::{
    GuideConfig, KeyValueVisitedStore, PlaceCatalog, PlaceId, PlaceStatus, ProximitySelectionModel,
    SelectOutcome, Transcript,
};
use tourguide_geo::{
    format_distance, FixedSource, GeolocationManager, GeolocationProvider, LocationState,
    PositionSource, UnavailableSource,
};
use tourguide_storage::{KeyValueStore, Storage};

use crate::args::{Args, Command};

type Model = ProximitySelectionModel<KeyValueVisitedStore<Box<dyn KeyValueStore>>, Transcript>;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => GuideConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GuideConfig::default(),
    };

    let catalog = match &args.catalog {
        Some(path) => PlaceCatalog::from_file(path)
            .with_context(|| format!("loading catalog {}", path.display()))?,
        None => PlaceCatalog::builtin(),
    };

    let storage: Box<dyn KeyValueStore> = match args.store.as_ref().or(config.storage_path.as_ref()) {
        Some(path) => Box::new(Storage::local(path)),
        None => Box::new(Storage::session()),
    };
    let store = match &config.storage_namespace {
        Some(namespace) => KeyValueVisitedStore::with_namespace(storage, namespace),
        None => KeyValueVisitedStore::new(storage),
    };

    let mut model = ProximitySelectionModel::new(
        catalog,
        store,
        Transcript::new(),
        config.selection_settings(),
    );

    match args.at {
        Some(coords) => locate(&mut model, FixedSource::new(coords), &config),
        None => locate(&mut model, UnavailableSource, &config),
    }

    match args.command() {
        Command::List => {}
        Command::Select { id } => {
            let id = PlaceId::new(id);
            match model.select_place(&id) {
                SelectOutcome::Selected => println!("Selected {}", id),
                SelectOutcome::OutOfRange { distance_meters } => println!(
                    "{} is {} away; get within {} to select it",
                    id,
                    format_distance(distance_meters),
                    format_distance(model.settings().radius_meters),
                ),
                SelectOutcome::UnknownPlace => anyhow::bail!("no place with id {}", id),
            }
        }
        Command::Deselect => model.deselect(),
        Command::Clear => model.clear_visited(),
    }

    print_places(&model, &config);
    Ok(())
}

/// Take one fix and hand it to the model
fn locate<S: PositionSource>(model: &mut Model, source: S, config: &GuideConfig) {
    let mut geo = GeolocationManager::new(source, config.geolocation.clone());
    if geo.request_permission() == LocationState::Denied {
        tracing::info!("Location unavailable; every place is selectable");
    }
    model.sync_position(&geo);
    tracing::debug!("User position: {:?}", geo.current_position());
}

fn print_places(model: &Model, config: &GuideConfig) {
    match model.user_position().coords() {
        Some(coords) => println!("You are at {}", coords),
        None => println!("Location unknown (map centered on {})", config.default_center),
    }
    println!("Places ({})", model.catalog().len());

    for view in model.places() {
        let visited = match view.status {
            PlaceStatus::Visited => "visited",
            PlaceStatus::Unvisited { in_range: true } => "in range",
            PlaceStatus::Unvisited { in_range: false } => "",
        };
        let distance = view.distance_meters.map(format_distance).unwrap_or_default();
        println!(
            "{} [{}] {:<32} {:>9} {:<8} {}",
            if view.last_selected { '*' } else { ' ' },
            view.place.id,
            view.place.title,
            distance,
            visited,
            view.place.position,
        );
    }
}
