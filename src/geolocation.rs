// One-shot position lookup resolved off the UI thread

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use log::{info, warn};

use crate::errors::MaptyError;
use crate::workout::Coords;

/// A source for the user's current position. Asked exactly once per session.
pub trait PositionProvider: Send + 'static {
    fn current_position(&mut self) -> Result<Coords, MaptyError>;
}

/// Position given up front, from command line flags or the config file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPosition {
    position: Option<Coords>,
}

impl FixedPosition {
    pub fn new(position: Option<Coords>) -> Self {
        Self { position }
    }
}

impl PositionProvider for FixedPosition {
    fn current_position(&mut self) -> Result<Coords, MaptyError> {
        self.position.ok_or_else(|| MaptyError::GeolocationDenied {
            reason: "no position configured, pass --lat and --lon or set home_position".to_string(),
        })
    }
}

/// Pending position lookup. The provider runs on its own thread; the result is
/// handed out by [`GeolocationRequest::poll`] at most once. There is no timeout.
pub struct GeolocationRequest {
    receiver: Option<Receiver<Result<Coords, MaptyError>>>,
}

impl GeolocationRequest {
    pub fn spawn(mut provider: impl PositionProvider) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let result = provider.current_position();
            if let Ok(coords) = &result {
                info!("https://www.google.com/maps/@{},{}", coords.lat, coords.lng);
            }
            // the receiver may already be gone if the window was closed
            let _ = tx.send(result);
        });
        Self { receiver: Some(rx) }
    }

    /// Non-blocking check for the result.
    pub fn poll(&mut self) -> Option<Result<Coords, MaptyError>> {
        let receiver = self.receiver.as_ref()?;
        match receiver.try_recv() {
            Ok(result) => {
                self.receiver = None;
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                warn!("Position provider stopped without an answer");
                self.receiver = None;
                None
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.receiver.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait_for(request: &mut GeolocationRequest) -> Option<Result<Coords, MaptyError>> {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if let Some(result) = request.poll() {
                return Some(result);
            }
            thread::sleep(Duration::from_millis(5));
        }
        None
    }

    #[test]
    fn test_fixed_position_resolves_once() {
        let mut request =
            GeolocationRequest::spawn(FixedPosition::new(Some(Coords::new(40.0, -3.0))));

        let result = wait_for(&mut request).expect("position should resolve");
        assert_eq!(result.unwrap(), Coords::new(40.0, -3.0));
        assert!(!request.is_pending());
        assert!(request.poll().is_none());
    }

    #[test]
    fn test_missing_position_is_denied() {
        let mut request = GeolocationRequest::spawn(FixedPosition::default());

        let result = wait_for(&mut request).expect("request should resolve");
        assert!(matches!(result, Err(MaptyError::GeolocationDenied { .. })));
    }
}
