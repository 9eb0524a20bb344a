//! Loudness extraction from a frequency-magnitude snapshot.
//!
//! Reduces one frame of byte magnitudes to a single scalar and keeps the
//! exponentially smoothed value that drives the waveform.

/// Upper bound of a byte magnitude, and of the smoothed loudness.
pub const MAX_LOUDNESS: f32 = 255.0;

/// Default multiplier applied to the mean magnitude before smoothing.
pub const DEFAULT_SENSITIVITY: f32 = 2.0;

/// Default share of the previous loudness kept each frame.
pub const DEFAULT_DECAY: f32 = 0.7;

/// Mean magnitude of `snapshot` scaled by `sensitivity`.
///
/// No clamping happens here. An empty snapshot yields 0.
pub fn extract(snapshot: &[u8], sensitivity: f32) -> f32 {
    if snapshot.is_empty() {
        return 0.0;
    }

    let sum: u64 = snapshot.iter().map(|&v| v as u64).sum();
    (sum as f32 / snapshot.len() as f32) * sensitivity
}

/// Single-pole exponential moving average over the raw loudness.
///
/// This is the only value carried from one frame to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoudnessState {
    value: f32,
    decay: f32,
}

impl LoudnessState {
    /// Creates a silent state with the given decay (share of the previous value kept).
    pub fn new(decay: f32) -> Self {
        Self {
            value: 0.0,
            decay: if decay.is_nan() {
                DEFAULT_DECAY
            } else {
                decay.clamp(0.0, 1.0)
            },
        }
    }

    /// Folds one raw loudness reading into the state and returns the new value.
    ///
    /// A NaN reading counts as silence so the state stays within `[0, 255]`.
    pub fn update(&mut self, raw_loudness: f32) -> f32 {
        let clamped = if raw_loudness.is_nan() {
            0.0
        } else {
            raw_loudness.clamp(0.0, MAX_LOUDNESS)
        };
        // value * decay + clamped * (1 - decay), written as a step toward the
        // target so rounding can never carry it past the target.
        self.value += (clamped - self.value) * (1.0 - self.decay);
        self.value
    }

    /// Current loudness, always within `[0, 255]`.
    pub fn value(&self) -> f32 {
        self.value.clamp(0.0, MAX_LOUDNESS)
    }
}

impl Default for LoudnessState {
    fn default() -> Self {
        Self::new(DEFAULT_DECAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_is_zero_for_any_sensitivity() {
        let silence = [0u8; 128];
        for sensitivity in [0.0, 0.5, 2.0, 100.0] {
            assert_eq!(extract(&silence, sensitivity), 0.0);
        }
    }

    #[test]
    fn test_uniform_snapshot_scales_by_sensitivity() {
        for v in [1u8, 17, 100, 255] {
            let snapshot = [v; 64];
            assert_eq!(extract(&snapshot, 2.0), v as f32 * 2.0);
            assert_eq!(extract(&snapshot, 1.0), v as f32);
        }
    }

    #[test]
    fn test_empty_snapshot() {
        assert_eq!(extract(&[], 2.0), 0.0);
    }

    #[test]
    fn test_monotone_in_each_sample() {
        let mut snapshot = [40u8; 16];
        for idx in 0..snapshot.len() {
            let mut previous = extract(&snapshot, 2.0);
            for v in 40..=255u8 {
                snapshot[idx] = v;
                let current = extract(&snapshot, 2.0);
                assert!(current >= previous);
                previous = current;
            }
            snapshot[idx] = 40;
        }
    }

    #[test]
    fn test_smoothing_step() {
        let mut state = LoudnessState::default();
        let value = state.update(100.0);
        assert!((value - 30.0).abs() < 1e-4);
        let value = state.update(100.0);
        assert!((value - 51.0).abs() < 1e-4);
    }

    #[test]
    fn test_smoothing_clamps_raw_input() {
        let mut state = LoudnessState::default();
        state.update(1000.0);
        assert!((state.value() - 76.5).abs() < 1e-3);
        for _ in 0..200 {
            state.update(1000.0);
        }
        assert!(state.value() <= MAX_LOUDNESS);
    }

    #[test]
    fn test_smoothing_converges_without_overshoot() {
        let mut state = LoudnessState::default();
        let target = 180.0;
        for _ in 0..200 {
            let value = state.update(target);
            assert!(value <= target);
        }
        assert!((state.value() - target).abs() < 1e-3);
    }

    #[test]
    fn test_silence_keeps_zero_state() {
        let mut state = LoudnessState::default();
        state.update(extract(&[0u8; 64], 2.0));
        assert_eq!(state.value(), 0.0);
    }

    #[test]
    fn test_nan_reading_does_not_poison_state() {
        let mut state = LoudnessState::default();
        state.update(extract(&[100u8; 64], f32::NAN));
        assert_eq!(state.value(), 0.0);

        state.update(200.0);
        state.update(f32::NAN);
        assert!(state.value().is_finite());
        assert!((0.0..=MAX_LOUDNESS).contains(&state.value()));
    }

    #[test]
    fn test_nan_decay_falls_back_to_default() {
        assert_eq!(LoudnessState::new(f32::NAN), LoudnessState::default());
    }
}
