//! Bounded mono sample window shared between the audio callback and the frame loop.

use std::collections::VecDeque;

/// Most recent mono samples, capped at a fixed window length.
#[derive(Debug)]
pub struct SampleBuffer {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl SampleBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Downmixes interleaved frames to mono by averaging channels and appends them.
    ///
    /// Older samples fall off the front once the window is full.
    pub fn push_interleaved<T>(&mut self, data: &[T], channels: usize)
    where
        T: cpal::Sample,
        f32: cpal::FromSample<T>,
    {
        let channels = channels.max(1);
        for frame in data.chunks_exact(channels) {
            let sum: f32 = frame.iter().map(|&s| s.to_sample::<f32>()).sum();
            self.push(sum / channels as f32);
        }
    }

    fn push(&mut self, sample: f32) {
        if self.capacity == 0 {
            return;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Copies the current window into `out`, oldest first.
    pub fn copy_into(&self, out: &mut Vec<f32>) {
        out.clear();
        out.extend(self.samples.iter().copied());
    }
}
