//! # Cadenza - a realtime, beat-scheduled audio engine
//!
//! Cadenza mixes a dynamic population of *audio generators* into an
//! interleaved PCM stream, driven by an event list whose timestamps are
//! expressed in musical beats rather than samples. It is the engine layer
//! only: the library of DSP primitives (oscillators, filters, envelopes)
//! and the live-coding/pattern layer that schedules events on top of it
//! are external collaborators, consumed here through two small contracts
//! (`Generator` and the event-list API).
//!
//! ## Core Features
//!
//! - **Pull-based generator contract**: every active generator is polled
//!   exactly once per block for one block's worth of samples.
//! - **Beat-scheduled event list**: events fire when `cur_beat` reaches
//!   their beat, can cascade within the same block, and can install new
//!   generators or further events.
//! - **Lock-minimized hand-off**: new generators, control callbacks, and
//!   events are queued from any thread and drained atomically by the
//!   single audio thread that owns the loop.
//! - **Realtime and offline rendering** of the same graph, sharing one
//!   engine loop — realtime renders through `cpal` via a lock-free ring
//!   buffer, offline renders straight to a WAV file.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cadenza::config::EngineConfig;
//! use cadenza::demo_generators::ConstantGenerator;
//! use cadenza::engine::Engine;
//!
//! let config = EngineConfig::builder()
//!     .sample_rate(44100)
//!     .nchnls(1)
//!     .block_size(64)
//!     .build()
//!     .unwrap();
//!
//! let engine = Engine::new(config);
//! engine.add_afunc(Box::new(ConstantGenerator::new(0.5)));
//! engine.render_to_disk("out.wav").unwrap();
//! ```
//!
//! ## Architecture
//!
//! ### Main Modules
//!
//! - [`engine`] - the block loop that composes everything below
//! - [`generator`] - the audio generator contract (`pull`, `GenOutput`)
//! - [`event`] - the beat-scheduled event list and `advance` protocol
//! - [`bus`] - output accumulation and 16-bit PCM quantisation
//! - [`queue`] - the lock-minimized pending-item drop-box
//! - [`context`] - the ambient per-block parameters every generator reads
//! - [`config`] - validated engine construction
//! - [`error`] - the public error taxonomy
//! - [`sink`] - realtime (`cpal`/`ringbuf`) and offline (`hound`) output
//! - [`registry`] - process-wide engine bookkeeping for bulk shutdown
//! - [`demo_generators`] - small fixtures exercising the generator
//!   contract; not a DSP primitive library
//!
//! ### Control flow
//!
//! 1. A caller builds an `EngineConfig` and creates an `Engine`.
//! 2. It enqueues generators, control callbacks, and events from any
//!    thread.
//! 3. The engine's own audio thread drains those queues once per block,
//!    advances the event list, runs pre-callbacks, mixes generators,
//!    runs post-callbacks, and writes PCM to its sink.
//! 4. `stop`/`clear` are cooperative and take effect at the next block
//!    boundary; the process-wide registry can `kill_all` every engine at
//!    once.

pub mod bus;
pub mod config;
pub mod context;
pub mod demo_generators;
pub mod engine;
pub mod error;
pub mod event;
pub mod generator;
pub mod queue;
pub mod registry;
pub mod sink;
