//! Live microphone stream feeding the sample window.
//!
//! The stream is opened once per session. The cpal callback only appends to the
//! shared [`SampleBuffer`]; the frame loop copies the latest window out.

use cpal::traits::{DeviceTrait, StreamTrait};
use std::sync::{Arc, Mutex};

use super::buffer::SampleBuffer;
use super::device::{resolve_input_device, suppress_backend_noise};
use super::{CaptureError, SampleSource};

/// Open input stream plus the window it fills.
pub struct MicrophoneCapture {
    /// Kept alive for the duration of the session; dropping it stops capture
    _stream: cpal::Stream,
    buffer: Arc<Mutex<SampleBuffer>>,
    sample_rate: u32,
    device_name: String,
}

impl MicrophoneCapture {
    /// Acquires the microphone.
    ///
    /// This is the session's single suspension point. Device probing blocks, so
    /// it runs under `block_in_place`.
    ///
    /// # Errors
    /// - If the device cannot be found or configured
    /// - If the sample format is unsupported
    /// - If the stream cannot be built or started
    pub async fn acquire(device_spec: &str, window: usize) -> Result<Self, CaptureError> {
        tokio::task::block_in_place(|| Self::open(device_spec, window))
    }

    /// Opens and starts the input stream synchronously.
    pub fn open(device_spec: &str, window: usize) -> Result<Self, CaptureError> {
        let device = suppress_backend_noise(|| {
            let host = cpal::default_host();
            resolve_input_device(&host, device_spec)
        })?;

        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());
        tracing::info!("Capture device: {}", device_name);

        let supported = device.default_input_config()?;
        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();
        let sample_rate = config.sample_rate.0;

        tracing::debug!(
            "Device configuration: {}Hz, {} channels, {:?}",
            sample_rate,
            config.channels,
            sample_format
        );

        let buffer = Arc::new(Mutex::new(SampleBuffer::new(window)));

        let stream = match sample_format {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, &buffer)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, &buffer)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, &buffer)?,
            cpal::SampleFormat::I32 => build_stream::<i32>(&device, &config, &buffer)?,
            other => return Err(CaptureError::UnsupportedFormat(format!("{other:?}"))),
        };

        stream.play()?;
        tracing::debug!("Audio stream started");

        Ok(Self {
            _stream: stream,
            buffer,
            sample_rate,
            device_name,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}

impl SampleSource for MicrophoneCapture {
    fn latest(&self, out: &mut Vec<f32>) {
        match self.buffer.lock() {
            Ok(buffer) => buffer.copy_into(out),
            Err(poisoned) => poisoned.into_inner().copy_into(out),
        }
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    buffer: &Arc<Mutex<SampleBuffer>>,
) -> Result<cpal::Stream, CaptureError>
where
    T: cpal::SizedSample,
    f32: cpal::FromSample<T>,
{
    let channels = config.channels as usize;
    let buffer = Arc::clone(buffer);

    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            if let Ok(mut buffer) = buffer.lock() {
                buffer.push_interleaved(data, channels);
            }
        },
        |err| {
            tracing::error!("Audio stream error: {}", err);
        },
        None,
    )?;

    Ok(stream)
}
