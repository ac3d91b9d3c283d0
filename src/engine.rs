//! The engine loop (§4.6): the driver that composes the ambient context,
//! pending queues, event list, and output bus into one running audio
//! thread per engine.

use crate::bus::OutputBus;
use crate::config::{EngineConfig, SinkChoice};
use crate::context::BlockCtx;
use crate::error::EngineResult;
use crate::event::{Event, EventList};
use crate::generator::{GenOutput, Generator};
use crate::queue::PendingQueue;
use crate::sink::{AudioSink, OfflineSink, RealtimeSink};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

pub type CFunc = Box<dyn FnMut(&BlockCtx) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Stopped,
    Running,
}

/// Shared control surface an `Engine` handle exposes to any thread: start
/// a background run, enqueue work, request a cooperative stop/clear.
struct Shared {
    sample_rate: u32,
    nchnls: u32,
    block_size: u32,
    status: AtomicBool, // true == running
    clear_flag: AtomicBool,
    block_num: AtomicU64,
    sink: SinkChoice,
    new_generators: PendingQueue<Box<dyn Generator>>,
    pre_cfuncs: PendingQueue<CFunc>,
    post_cfuncs: PendingQueue<CFunc>,
    events: EventList,
}

impl crate::registry::Controllable for Shared {
    fn clear(&self) {
        self.clear_flag.store(true, Ordering::SeqCst);
    }

    fn stop(&self) {
        self.status.store(false, Ordering::SeqCst);
    }
}

/// A handle to one audio engine. Cloning is cheap (an `Arc`); every clone
/// refers to the same underlying run.
#[derive(Clone)]
pub struct Engine {
    shared: Arc<Shared>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let shared = Arc::new(Shared {
            sample_rate: config.sample_rate,
            nchnls: config.nchnls,
            block_size: config.block_size,
            status: AtomicBool::new(false),
            clear_flag: AtomicBool::new(false),
            block_num: AtomicU64::new(0),
            sink: config.sink,
            new_generators: PendingQueue::new(),
            pre_cfuncs: PendingQueue::new(),
            post_cfuncs: PendingQueue::new(),
            events: EventList::new(60.0),
        });
        crate::registry::global_registry().register(Arc::clone(&shared) as Arc<dyn crate::registry::Controllable>);
        Self { shared }
    }

    /// Runs according to the sink choice fixed at construction: a
    /// realtime device (backgrounded, returns its join handle) or an
    /// offline WAV file at the configured path (runs to completion on the
    /// calling thread before returning).
    pub fn run(&self) -> EngineResult<Option<JoinHandle<()>>> {
        match &self.shared.sink {
            SinkChoice::Realtime => self.start().map(Some),
            SinkChoice::Offline(path) => {
                self.render_to_disk(path.clone())?;
                Ok(None)
            }
        }
    }

    pub fn status(&self) -> Status {
        if self.shared.status.load(Ordering::SeqCst) {
            Status::Running
        } else {
            Status::Stopped
        }
    }

    pub fn add_afunc(&self, generator: Box<dyn Generator>) {
        self.shared.new_generators.push(generator);
    }

    pub fn add_pre_cfunc(&self, cfunc: CFunc) {
        self.shared.pre_cfuncs.push(cfunc);
    }

    pub fn add_post_cfunc(&self, cfunc: CFunc) {
        self.shared.post_cfuncs.push(cfunc);
    }

    pub fn add_events(&self, events: Vec<Event>) {
        self.shared.events.add(events);
    }

    pub fn now(&self) -> f64 {
        self.shared.events.now()
    }

    pub fn tempo(&self) -> f64 {
        self.shared.events.tempo()
    }

    pub fn set_tempo(&self, bpm: f64) {
        self.shared.events.set_tempo(bpm);
    }

    /// Idempotent: empties all four queues and the event list; takes
    /// effect at the end of the block currently in progress.
    pub fn clear(&self) {
        self.shared.clear_flag.store(true, Ordering::SeqCst);
    }

    /// Idempotent: flips status to stopped; the audio thread observes this
    /// at its next block boundary and exits.
    pub fn stop(&self) {
        self.shared.status.store(false, Ordering::SeqCst);
    }

    /// Starts the realtime loop on a dedicated background thread and
    /// returns immediately. Idempotent: calling `start` on an already
    /// running engine is a no-op.
    pub fn start(&self) -> EngineResult<JoinHandle<()>> {
        if self.shared.status.swap(true, Ordering::SeqCst) {
            return Ok(std::thread::spawn(|| {}));
        }
        let sink = RealtimeSink::new(
            self.shared.sample_rate,
            self.shared.nchnls,
            self.shared.block_size as usize * self.shared.nchnls as usize * 2,
        )?;
        let shared = Arc::clone(&self.shared);
        Ok(std::thread::spawn(move || {
            run_realtime(shared, sink);
        }))
    }

    /// Renders to a WAV file until the event list and all active lists
    /// are exhausted, then returns. Runs on the calling thread.
    pub fn render_to_disk(&self, path: impl AsRef<std::path::Path>) -> EngineResult<()> {
        let sink = OfflineSink::new(self.shared.sample_rate, self.shared.nchnls, path);
        run_offline(Arc::clone(&self.shared), sink)
    }
}

/// Poll one generator, treating any unwind across `pull` as `Done` so a
/// faulting generator can never bring down the audio thread (§4.2, §7).
fn poll_generator(gen: &mut Box<dyn Generator>, ctx: &BlockCtx) -> GenOutput {
    let label = gen.label().to_string();
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| gen.pull(ctx))) {
        Ok(output) => output,
        Err(_) => {
            tracing::warn!(generator = %label, "generator panicked during pull; dropping");
            GenOutput::Done
        }
    }
}

fn invoke_cfunc(cfunc: &mut CFunc, ctx: &BlockCtx) -> bool {
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| cfunc(ctx))) {
        Ok(()) => true,
        Err(_) => {
            tracing::warn!("control callback panicked; dropping");
            false
        }
    }
}

struct RunState {
    generators: Vec<Box<dyn Generator>>,
    pre_cfuncs: Vec<CFunc>,
    post_cfuncs: Vec<CFunc>,
    bus: OutputBus,
}

impl RunState {
    fn new(shared: &Shared) -> Self {
        Self {
            generators: Vec::new(),
            pre_cfuncs: Vec::new(),
            post_cfuncs: Vec::new(),
            bus: OutputBus::new(shared.block_size, shared.nchnls),
        }
    }

    /// Runs one block's worth of work (§4.6 steps 1-5,7-8) and returns the
    /// quantised PCM bytes ready for the sink, plus whether any event work
    /// remains pending (used only by the offline termination check).
    fn run_block(&mut self, shared: &Shared) -> (bool, usize) {
        let block_num = shared.block_num.fetch_add(1, Ordering::SeqCst);
        let ctx = BlockCtx::new(
            shared.sample_rate,
            shared.block_size,
            shared.nchnls,
            block_num,
        );

        let outcome = shared.events.advance(shared.block_size, shared.sample_rate, &ctx);
        shared.new_generators.push_many(outcome.new_generators);

        self.pre_cfuncs.extend(shared.pre_cfuncs.drain());
        self.pre_cfuncs.retain_mut(|f| invoke_cfunc(f, &ctx));

        self.generators.extend(shared.new_generators.drain());
        self.bus.zero();
        self.generators.retain_mut(|g| match poll_generator(g, &ctx) {
            GenOutput::Done => false,
            output => {
                self.bus.mix(&output);
                true
            }
        });

        self.post_cfuncs.extend(shared.post_cfuncs.drain());
        self.post_cfuncs.retain_mut(|f| invoke_cfunc(f, &ctx));

        if shared.clear_flag.swap(false, Ordering::SeqCst) {
            shared.new_generators.clear();
            shared.pre_cfuncs.clear();
            shared.post_cfuncs.clear();
            shared.events.clear();
            self.generators.clear();
            self.pre_cfuncs.clear();
            self.post_cfuncs.clear();
        }

        (outcome.has_pending, self.generators.len())
    }
}

fn run_realtime(shared: Arc<Shared>, mut sink: RealtimeSink) {
    tracing::info!("engine starting (realtime)");
    let mut state = RunState::new(&shared);
    while shared.status.load(Ordering::SeqCst) {
        state.run_block(&shared);
        let bytes = state.bus.quantize();
        if sink.write(bytes).is_err() {
            tracing::error!("realtime sink write failed");
            break;
        }
    }
    let _ = sink.finish();
    tracing::info!("stopping...");
}

fn run_offline(shared: Arc<Shared>, mut sink: OfflineSink) -> EngineResult<()> {
    let started = std::time::Instant::now();
    shared.status.store(true, Ordering::SeqCst);
    let mut state = RunState::new(&shared);
    loop {
        let (has_pending, active_generators) = state.run_block(&shared);
        let bytes = state.bus.quantize();
        sink.write(bytes)?;
        if !has_pending && active_generators == 0 {
            break;
        }
    }
    shared.status.store(false, Ordering::SeqCst);
    sink.finish()?;
    tracing::info!(elapsed_secs = started.elapsed().as_secs_f64(), "render complete");
    Ok(())
}
