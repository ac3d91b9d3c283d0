//! Audio sinks (§6): where the engine's quantised PCM bytes go. A
//! `RealtimeSink` renders on its own dedicated thread and hands blocks to
//! the platform audio callback through a lock-free ring buffer, mirroring
//! the teacher's live-reload architecture but without the whole-graph
//! hot-swap machinery this engine doesn't need. An `OfflineSink`
//! accumulates everything in memory and writes a WAV file once at the end,
//! following the teacher's `render.rs::write_wav`.

use crate::error::EngineError;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::HeapRb;
use std::path::Path;

pub trait AudioSink: Send {
    /// Push one block's worth of interleaved 16-bit PCM bytes.
    fn write(&mut self, bytes: &[u8]) -> Result<(), EngineError>;

    /// Flush and finalize. Called exactly once when the engine stops.
    fn finish(&mut self) -> Result<(), EngineError> {
        Ok(())
    }
}

/// Renders to the platform's default output device via `cpal`. The audio
/// thread never talks to `cpal` directly — it pushes blocks into a
/// lock-free ring buffer; the platform callback drains it independently
/// and zero-fills on underrun, so a slow callback never stalls the
/// engine's own scheduling thread (§5 "Suspension points").
pub struct RealtimeSink {
    producer: ringbuf::HeapProd<u8>,
    _stream: cpal::Stream,
}

impl RealtimeSink {
    pub fn new(sample_rate: u32, nchnls: u32, byte_buffer_size: usize) -> Result<Self, EngineError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(EngineError::DeviceUnavailable)?;

        let config = cpal::StreamConfig {
            channels: nchnls as u16,
            sample_rate: cpal::SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        // Large enough to absorb a few blocks of jitter between the engine
        // thread's production rate and the platform callback's pull rate.
        let capacity = byte_buffer_size * 8;
        let ring = HeapRb::<u8>::new(capacity);
        let (producer, mut consumer) = ring.split();

        let stream = device.build_output_stream(
            &config,
            move |data: &mut [i16], _info: &cpal::OutputCallbackInfo| {
                for sample in data.iter_mut() {
                    let mut bytes = [0u8; 2];
                    let filled = consumer.pop_slice(&mut bytes);
                    *sample = if filled == 2 {
                        i16::from_le_bytes(bytes)
                    } else {
                        0
                    };
                }
            },
            move |err| {
                tracing::error!(error = %err, "realtime sink stream error");
            },
            None,
        )?;
        stream.play()?;

        Ok(Self {
            producer,
            _stream: stream,
        })
    }
}

impl AudioSink for RealtimeSink {
    fn write(&mut self, bytes: &[u8]) -> Result<(), EngineError> {
        self.producer.push_slice(bytes);
        Ok(())
    }
}

/// Accumulates every rendered block in memory, writing a WAV file (via
/// `hound`) once the run finishes.
pub struct OfflineSink {
    sample_rate: u32,
    nchnls: u32,
    path: std::path::PathBuf,
    samples: Vec<i16>,
}

impl OfflineSink {
    pub fn new(sample_rate: u32, nchnls: u32, path: impl AsRef<Path>) -> Self {
        Self {
            sample_rate,
            nchnls,
            path: path.as_ref().to_path_buf(),
            samples: Vec::new(),
        }
    }
}

impl AudioSink for OfflineSink {
    fn write(&mut self, bytes: &[u8]) -> Result<(), EngineError> {
        for chunk in bytes.chunks_exact(2) {
            self.samples.push(i16::from_le_bytes([chunk[0], chunk[1]]));
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), EngineError> {
        let spec = hound::WavSpec {
            channels: self.nchnls as u16,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&self.path, spec)?;
        for &sample in &self.samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
        Ok(())
    }
}
