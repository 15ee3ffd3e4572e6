//! Command line parsing

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tourguide_geo::LatLng;

#[derive(Parser, Debug)]
#[command(name = "tourguide")]
#[command(version, about = "Browse nearby places and mark them visited", long_about = None)]
pub struct Args {
    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// JSON place catalog (built-in demo places when omitted)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Local storage file for visited state
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Current position as LAT,LNG in degrees
    #[arg(long, value_name = "LAT,LNG", value_parser = parse_coords, allow_hyphen_values = true)]
    pub at: Option<LatLng>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List places with distance and visit status
    List,
    /// Select a place by id
    Select {
        /// Place id
        id: String,
    },
    /// Close the current selection
    Deselect,
    /// Forget every visited place
    Clear,
}

impl Args {
    /// Subcommand to run; `list` when none was given
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::List)
    }
}

/// Parse `LAT,LNG` in degrees
fn parse_coords(s: &str) -> Result<LatLng, String> {
    let (lat, lng) = s
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LNG, got {:?}", s))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|e| format!("bad latitude {:?}: {}", lat, e))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .map_err(|e| format!("bad longitude {:?}: {}", lng, e))?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(format!("coordinates out of range: {},{}", lat, lng));
    }
    Ok(LatLng::new(lat, lng))
}
