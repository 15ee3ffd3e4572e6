//! Geolocation
//!
//! Position fixes with permission handling, a cached last fix and
//! superseding background refreshes.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::{LatLng, UserPosition};

/// Geolocation error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeolocationError {
    #[error("User denied geolocation permission")]
    PermissionDenied,

    #[error("Position unavailable")]
    PositionUnavailable,

    #[error("Geolocation request timed out")]
    Timeout,

    #[error("Geolocation is not supported on this device")]
    Unsupported,
}

impl GeolocationError {
    /// Errors that mean no fix will ever arrive this session
    pub fn is_denial(&self) -> bool {
        matches!(self, Self::PermissionDenied | Self::Unsupported)
    }
}

/// Geolocation options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeolocationOptions {
    pub high_accuracy: bool,
    pub timeout_ms: u64,
    pub max_cache_age_ms: u64,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout_ms: 10_000,
            max_cache_age_ms: 5 * 60 * 1000,
        }
    }
}

/// Where fixes come from (platform location services)
pub trait PositionSource: Send + Sync + 'static {
    fn query(&self, options: &GeolocationOptions) -> Result<LatLng, GeolocationError>;
}

/// Source that always reports the same, movable, position
#[derive(Debug)]
pub struct FixedSource {
    position: Mutex<LatLng>,
}

impl FixedSource {
    pub fn new(position: LatLng) -> Self {
        Self { position: Mutex::new(position) }
    }

    /// Move the reported position
    pub fn set(&self, position: LatLng) {
        *self.position.lock().unwrap_or_else(|e| e.into_inner()) = position;
    }
}

impl PositionSource for FixedSource {
    fn query(&self, _options: &GeolocationOptions) -> Result<LatLng, GeolocationError> {
        Ok(*self.position.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

/// Source for hosts without location services
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableSource;

impl PositionSource for UnavailableSource {
    fn query(&self, _options: &GeolocationOptions) -> Result<LatLng, GeolocationError> {
        Err(GeolocationError::Unsupported)
    }
}

/// Anything that can tell the guide where the user is
pub trait GeolocationProvider {
    /// Last known position
    fn current_position(&self) -> UserPosition;

    /// Force a new fix
    fn refresh(&mut self) -> Result<UserPosition, GeolocationError>;
}

/// Permission state, as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationState {
    /// Not asked yet, or asked without a definite answer
    Prompt,
    Granted,
    Denied,
}

/// Sequence number of a fix request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefreshTicket(u64);

/// Fix request running in the background
#[derive(Debug)]
pub struct PendingFix {
    ticket: RefreshTicket,
    task: smol::Task<Result<LatLng, GeolocationError>>,
    timeout: Duration,
}

impl PendingFix {
    pub fn ticket(&self) -> RefreshTicket {
        self.ticket
    }

    /// Wait for the fix, or for the timeout to elapse
    pub async fn wait(self) -> FixOutcome {
        let timeout = self.timeout;
        let result = smol::future::or(self.task, async move {
            smol::Timer::after(timeout).await;
            Err(GeolocationError::Timeout)
        })
        .await;

        FixOutcome { ticket: self.ticket, result }
    }
}

/// Finished fix request
#[derive(Debug, Clone, PartialEq)]
pub struct FixOutcome {
    pub ticket: RefreshTicket,
    pub result: Result<LatLng, GeolocationError>,
}

#[derive(Debug, Clone, Copy)]
struct CachedFix {
    coords: LatLng,
    acquired_at: Instant,
}

/// Geolocation manager
#[derive(Debug)]
pub struct GeolocationManager<S> {
    source: Arc<S>,
    options: GeolocationOptions,
    state: LocationState,
    cached: Option<CachedFix>,
    latest_ticket: u64,
}

impl<S: PositionSource> GeolocationManager<S> {
    pub fn new(source: S, options: GeolocationOptions) -> Self {
        Self {
            source: Arc::new(source),
            options,
            state: LocationState::Prompt,
            cached: None,
            latest_ticket: 0,
        }
    }

    pub fn state(&self) -> LocationState {
        self.state
    }

    pub fn options(&self) -> &GeolocationOptions {
        &self.options
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Ask for permission by taking the first fix
    pub fn request_permission(&mut self) -> LocationState {
        if let Err(err) = self.refresh() {
            tracing::warn!("Location permission not granted: {}", err);
        }
        self.state
    }

    /// Go back to the prompt after a denial
    pub fn retry(&mut self) {
        if self.state == LocationState::Denied {
            tracing::debug!("Location state reset to prompt");
            self.state = LocationState::Prompt;
        }
    }

    /// Current position, served from cache when the last fix is fresh enough
    pub fn locate(&mut self) -> Result<UserPosition, GeolocationError> {
        if let Some(cached) = self.cached {
            let max_age = Duration::from_millis(self.options.max_cache_age_ms);
            if cached.acquired_at.elapsed() <= max_age {
                return Ok(UserPosition::Present(cached.coords));
            }
        }
        self.refresh()
    }

    /// Start a fix on the blocking pool, superseding any earlier request
    pub fn start_fix(&mut self) -> PendingFix {
        self.latest_ticket += 1;
        let ticket = RefreshTicket(self.latest_ticket);

        let source = Arc::clone(&self.source);
        let options = self.options.clone();
        let task = smol::unblock(move || source.query(&options));

        tracing::debug!("Started geolocation fix {:?}", ticket);
        PendingFix {
            ticket,
            task,
            timeout: Duration::from_millis(self.options.timeout_ms),
        }
    }

    /// Apply a finished fix. Outcomes older than the latest request are dropped.
    pub fn complete_fix(&mut self, outcome: FixOutcome) -> Result<UserPosition, GeolocationError> {
        if outcome.ticket.0 != self.latest_ticket {
            tracing::debug!(
                "Dropped stale geolocation fix {:?} (latest is {})",
                outcome.ticket,
                self.latest_ticket
            );
            return Ok(self.current_position());
        }
        self.apply(outcome.result)
    }

    fn apply(&mut self, result: Result<LatLng, GeolocationError>) -> Result<UserPosition, GeolocationError> {
        match result {
            Ok(coords) => {
                if self.state != LocationState::Granted {
                    tracing::info!("Location permission granted");
                }
                self.state = LocationState::Granted;
                self.cached = Some(CachedFix { coords, acquired_at: Instant::now() });
                Ok(UserPosition::Present(coords))
            }
            Err(err) => {
                tracing::warn!("Geolocation error: {}", err);
                if err.is_denial() {
                    self.state = LocationState::Denied;
                }
                Err(err)
            }
        }
    }
}

impl<S: PositionSource> GeolocationProvider for GeolocationManager<S> {
    fn current_position(&self) -> UserPosition {
        self.cached
            .map_or(UserPosition::Absent, |c| UserPosition::Present(c.coords))
    }

    fn refresh(&mut self) -> Result<UserPosition, GeolocationError> {
        // A synchronous fix also supersedes anything in flight
        self.latest_ticket += 1;
        let result = self.source.query(&self.options);
        self.apply(result)
    }
}
