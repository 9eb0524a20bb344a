//! Session status shown to the user while the visualizer runs.

use std::time::{Duration, Instant};

use crate::capture::CaptureError;

/// Lifecycle of one capture session, as surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// Waiting for the microphone to open
    Requesting,
    /// Capture running; the message fades after a fixed delay
    Listening { since: Instant },
    /// Acquisition failed; the render loop never starts
    Error(String),
}

impl SessionStatus {
    pub fn listening(now: Instant) -> Self {
        Self::Listening { since: now }
    }

    pub fn from_capture_error(err: &CaptureError) -> Self {
        Self::Error(err.to_string())
    }

    /// Text shown in the status line.
    pub fn message(&self) -> String {
        match self {
            Self::Requesting => "Requesting microphone access...".to_string(),
            Self::Listening { .. } => "Listening to microphone...".to_string(),
            Self::Error(reason) => {
                format!("Error: {reason}. Please allow microphone access and try again.")
            }
        }
    }

    /// Whether the status line should still be drawn at `now`.
    ///
    /// Only the listening message is ever dismissed.
    pub fn is_visible(&self, now: Instant, dismiss_after: Duration) -> bool {
        match self {
            Self::Listening { since } => now.saturating_duration_since(*since) < dismiss_after,
            Self::Requesting | Self::Error(_) => true,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listening_is_dismissed_after_delay() {
        let start = Instant::now();
        let status = SessionStatus::listening(start);
        let delay = Duration::from_millis(3000);

        assert!(status.is_visible(start, delay));
        assert!(status.is_visible(start + Duration::from_millis(2999), delay));
        assert!(!status.is_visible(start + Duration::from_millis(3000), delay));
    }

    #[test]
    fn test_requesting_and_error_stay_visible() {
        let start = Instant::now();
        let later = start + Duration::from_secs(3600);
        let delay = Duration::from_millis(3000);

        assert!(SessionStatus::Requesting.is_visible(later, delay));
        assert!(SessionStatus::Error("boom".into()).is_visible(later, delay));
    }

    #[test]
    fn test_error_message_from_capture_failure() {
        let status = SessionStatus::from_capture_error(&CaptureError::NoDevice);
        assert!(status.is_error());
        assert_eq!(
            status.message(),
            "Error: No audio input device available. Please allow microphone access and try again."
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            SessionStatus::Requesting.message(),
            "Requesting microphone access..."
        );
        assert_eq!(
            SessionStatus::listening(Instant::now()).message(),
            "Listening to microphone..."
        );
    }
}
