use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_channel::oneshot;
use thiserror::Error;

use catalog::Coordinate;

/// The only two things that can go wrong while finding the user. The message is what the user
/// sees.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum LocateError {
    #[error("Geolocation is not supported on this platform.")]
    CapabilityUnavailable,
    #[error("Unable to get your location. Please try again.")]
    LocationUnavailable(LocateFailure),
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum LocateFailure {
    #[error("permission denied")]
    PermissionDenied,
    #[error("timed out")]
    Timeout,
    #[error("{0}")]
    Platform(String),
}

impl LocateFailure {
    /// Interprets the numeric codes of a browser's GeolocationPositionError
    pub fn from_code(code: u32, message: String) -> Self {
        match code {
            1 => LocateFailure::PermissionDenied,
            3 => LocateFailure::Timeout,
            _ => LocateFailure::Platform(message),
        }
    }
}

pub type LocateResult = Result<Coordinate, LocateError>;

/// Something that can find out where the user is, once per request.
pub trait Geolocator {
    /// Fails right away if there's no location capability at all. Otherwise the answer arrives
    /// later through the `PendingLocation`.
    fn request_location(&self) -> Result<PendingLocation, LocateError>;
}

/// A single outstanding location request
pub struct PendingLocation {
    rx: oneshot::Receiver<LocateResult>,
}

/// The half of a request held by whatever talks to the platform
pub struct LocationResolver {
    tx: oneshot::Sender<LocateResult>,
}

pub fn channel() -> (LocationResolver, PendingLocation) {
    let (tx, rx) = oneshot::channel();
    (LocationResolver { tx }, PendingLocation { rx })
}

impl LocationResolver {
    pub fn resolve(self, result: LocateResult) {
        if self.tx.send(result).is_err() {
            debug!("Nobody is waiting for the location anymore");
        }
    }
}

impl PendingLocation {
    /// A request that's already answered
    pub fn ready(result: LocateResult) -> Self {
        let (resolver, pending) = channel();
        resolver.resolve(result);
        pending
    }

    /// Doesn't block. `None` means the platform hasn't answered yet.
    pub fn try_resolve(&mut self) -> Option<LocateResult> {
        match self.rx.try_recv() {
            Ok(Some(result)) => Some(result),
            Ok(None) => None,
            Err(oneshot::Canceled) => Some(Err(abandoned())),
        }
    }
}

impl Future for PendingLocation {
    type Output = LocateResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(abandoned())),
            Poll::Pending => Poll::Pending,
        }
    }
}

fn abandoned() -> LocateError {
    LocateError::LocationUnavailable(LocateFailure::Platform(
        "the location request was dropped without an answer".to_string(),
    ))
}

/// Answers every request with the same coordinate. With no coordinate, behaves like a platform
/// without geolocation.
#[derive(Clone, Debug, Default)]
pub struct FixedLocation(pub Option<Coordinate>);

impl Geolocator for FixedLocation {
    fn request_location(&self) -> Result<PendingLocation, LocateError> {
        match self.0 {
            Some(pt) => Ok(PendingLocation::ready(Ok(pt))),
            None => Err(LocateError::CapabilityUnavailable),
        }
    }
}
