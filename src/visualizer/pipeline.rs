//! One frame of the snapshot-to-waveform pipeline.

use std::time::Duration;

use super::volume::{extract, LoudnessState};
use super::waveform::{render, CanvasGeometry, WaveFrame};

/// Runs extraction, smoothing and rendering for one frame.
///
/// Pure: the new loudness state is returned rather than written anywhere.
pub fn tick(
    snapshot: &[u8],
    state: LoudnessState,
    sensitivity: f32,
    canvas: CanvasGeometry,
    now: Duration,
) -> (LoudnessState, WaveFrame) {
    let mut next = state;
    next.update(extract(snapshot, sensitivity));
    let frame = render(canvas, next.value(), now);
    (next, frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualizer::waveform::{RenderState, SEGMENTS};

    const CANVAS: CanvasGeometry = CanvasGeometry {
        width: 800.0,
        height: 400.0,
    };

    #[test]
    fn test_silence_renders_idle_line() {
        let now = Duration::from_millis(1_234_567);
        let (state, frame) = tick(&[0u8; 64], LoudnessState::default(), 2.0, CANVAS, now);

        assert_eq!(state.value(), 0.0);
        assert_eq!(frame.state, RenderState::Idle);
        assert_eq!(frame.points.len(), 2);

        let expected_y = 200.0 + now.as_secs_f64().sin() * 2.0;
        assert!(frame.points.iter().all(|p| (p.y - expected_y).abs() < 1e-9));
    }

    #[test]
    fn test_saturated_input_reaches_full_amplitude() {
        let snapshot = [255u8; 64];
        let mut state = LoudnessState::default();
        let mut frame = None;

        for ms in 0..200u64 {
            let (next, rendered) = tick(&snapshot, state, 2.0, CANVAS, Duration::from_millis(ms * 16));
            state = next;
            frame = Some(rendered);
        }

        let frame = frame.unwrap();
        assert!((state.value() - 255.0).abs() < 1e-3);
        assert_eq!(frame.state, RenderState::Active);
        assert!((frame.amplitude - 60.0).abs() < 1e-3);
        assert_eq!(frame.points.len(), SEGMENTS + 1);
        assert!((frame.points[0].x - 120.0).abs() < 1e-9);
        assert!((frame.points[SEGMENTS].x - 680.0).abs() < 1e-9);
    }

    #[test]
    fn test_first_loud_frame_is_already_active() {
        // 255 * 0.3 = 76.5 after one step
        let (state, frame) = tick(&[255u8; 64], LoudnessState::default(), 2.0, CANVAS, Duration::ZERO);
        assert!((state.value() - 76.5).abs() < 1e-3);
        assert_eq!(frame.state, RenderState::Active);
    }

    #[test]
    fn test_input_state_is_not_mutated() {
        let state = LoudnessState::default();
        let _ = tick(&[200u8; 64], state, 2.0, CANVAS, Duration::ZERO);
        assert_eq!(state.value(), 0.0);
    }
}
