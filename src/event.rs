//! The beat-scheduled event list (§4.5): a time-ordered collection of
//! thunks, advanced once per block.
//!
//! An event's callable is boxed behind `Box<dyn FnMut(&BlockCtx) -> EventResult + Send>`
//! rather than a raw function pointer (§9 "Temporal recursion"). A live-coding
//! layer can then "redefine" a recurring event by installing a fresh closure
//! through its own indirection (e.g. an `Arc<Mutex<_>>` the closure reads
//! from) and "kill" one by installing a no-op — the event list itself only
//! ever sees a plain `FnMut`.

use crate::context::BlockCtx;
use crate::generator::GenOutput;
use std::panic::AssertUnwindSafe;
use std::sync::Mutex;

pub type Thunk = Box<dyn FnMut(&BlockCtx) -> EventResult + Send>;

/// What firing an event may produce, per §9.
pub enum EventResult {
    Gen(Box<dyn crate::generator::Generator>),
    Evt(Event),
    Many(Vec<EventResult>),
    Nothing,
}

impl EventResult {
    pub fn gen(g: impl crate::generator::Generator + 'static) -> Self {
        EventResult::Gen(Box::new(g))
    }
}

pub struct Event {
    pub beat: f64,
    thunk: Thunk,
    seq: u64,
}

impl Event {
    pub fn new(beat: f64, thunk: Thunk) -> Self {
        Self {
            beat,
            thunk,
            seq: 0,
        }
    }
}

/// Output of a single `advance` call: generators and follow-on events
/// produced by any fired thunks, to be enqueued on the owning engine.
#[derive(Default)]
pub struct AdvanceOutcome {
    pub new_generators: Vec<Box<dyn crate::generator::Generator>>,
    /// `true` if any scheduled or still-pending event remains.
    pub has_pending: bool,
}

/// Invoke an event's thunk, treating a panic as `EventResult::Nothing` so a
/// faulting event can never bring down the audio thread (§4.5, §7), mirroring
/// `poll_generator`/`invoke_cfunc` in `engine.rs`.
fn fire(event: &mut Event, ctx: &BlockCtx) -> EventResult {
    match std::panic::catch_unwind(AssertUnwindSafe(|| (event.thunk)(ctx))) {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("event panicked while firing; dropping");
            EventResult::Nothing
        }
    }
}

/// Append `e` to `scheduled`, assigning the next sequence number, unless its
/// beat is non-finite (e.g. produced by `beat_mod(t, 0.0)`): a `NaN`/`inf`
/// beat can never satisfy `partial_cmp` as a total order, so it is dropped
/// here rather than handed to `sort_by` and risked panicking (and poisoning
/// the mutex) later.
fn schedule(scheduled: &mut Vec<Event>, next_seq: &mut u64, mut e: Event) {
    if !e.beat.is_finite() {
        tracing::warn!(beat = e.beat, "dropping event with non-finite beat");
        return;
    }
    e.seq = *next_seq;
    *next_seq += 1;
    scheduled.push(e);
}

fn flatten_into(result: EventResult, outcome: &mut AdvanceOutcome, pending_evts: &mut Vec<Event>) {
    match result {
        EventResult::Gen(g) => outcome.new_generators.push(g),
        EventResult::Evt(e) => pending_evts.push(e),
        EventResult::Many(results) => {
            for r in results {
                flatten_into(r, outcome, pending_evts);
            }
        }
        EventResult::Nothing => {}
    }
}

struct Inner {
    cur_beat: f64,
    tempo: f64,
    pending: Vec<Event>,
    scheduled: Vec<Event>,
    next_seq: u64,
}

/// Time-ordered collection of beat-stamped thunks (§3, §4.5).
pub struct EventList {
    inner: Mutex<Inner>,
}

impl EventList {
    pub fn new(tempo: f64) -> Self {
        Self {
            inner: Mutex::new(Inner {
                cur_beat: 0.0,
                tempo,
                pending: Vec::new(),
                scheduled: Vec::new(),
                next_seq: 0,
            }),
        }
    }

    /// Append new events to the pending buffer. Thread-safe; callable from
    /// any thread. An event with a non-finite beat (e.g. from `beat_mod(t,
    /// 0.0)`) is dropped with a warning rather than handed to the sorted
    /// store.
    pub fn add(&self, events: Vec<Event>) {
        let mut inner = self.inner.lock().unwrap();
        for mut e in events {
            if !e.beat.is_finite() {
                tracing::warn!(beat = e.beat, "dropping event with non-finite beat");
                continue;
            }
            e.seq = inner.next_seq;
            inner.next_seq += 1;
            inner.pending.push(e);
        }
    }

    /// Remove all pending and scheduled events.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.pending.clear();
        inner.scheduled.clear();
    }

    pub fn set_tempo(&self, bpm: f64) {
        self.inner.lock().unwrap().tempo = bpm;
    }

    pub fn tempo(&self) -> f64 {
        self.inner.lock().unwrap().tempo
    }

    pub fn now(&self) -> f64 {
        self.inner.lock().unwrap().cur_beat
    }

    /// The core per-block operation (§4.5 "Advance protocol"). Merges
    /// pending events into the sorted store, fires everything due, then
    /// progresses `cur_beat` by the beats this block covers.
    pub fn advance(&self, nsamples: u32, sample_rate: u32, ctx: &BlockCtx) -> AdvanceOutcome {
        let mut outcome = AdvanceOutcome::default();
        let cur_beat = {
            let mut inner = self.inner.lock().unwrap();
            let drained: Vec<Event> = std::mem::take(&mut inner.pending);
            inner.scheduled.extend(drained);
            inner
                .scheduled
                .sort_by(|a, b| a.beat.total_cmp(&b.beat).then(a.seq.cmp(&b.seq)));
            inner.cur_beat
        };

        // The lock is never held while invoking a thunk: a thunk may itself
        // call `add`/`now` (temporal recursion rebinding the next beat), and
        // holding the lock here would deadlock that reentrant call. Pending
        // events are merged into the sorted store on every iteration, so a
        // thunk-returned or reentrantly-added event with `beat <= cur_beat`
        // fires within this same `advance` call (§4.5 cascading).
        let mut cascaded = Vec::new();
        loop {
            let due = {
                let mut inner = self.inner.lock().unwrap();
                if !cascaded.is_empty() {
                    for e in cascaded.drain(..) {
                        schedule(&mut inner.scheduled, &mut inner.next_seq, e);
                    }
                }
                let fresh_pending: Vec<Event> = std::mem::take(&mut inner.pending);
                inner.scheduled.extend(fresh_pending);
                inner
                    .scheduled
                    .sort_by(|a, b| a.beat.total_cmp(&b.beat).then(a.seq.cmp(&b.seq)));
                let idx = inner.scheduled.iter().position(|e| e.beat <= cur_beat);
                idx.map(|i| inner.scheduled.remove(i))
            };
            let Some(mut event) = due else { break };
            let result = fire(&mut event, ctx);
            flatten_into(result, &mut outcome, &mut cascaded);
        }

        let mut inner = self.inner.lock().unwrap();
        inner.cur_beat += nsamples as f64 * (inner.tempo / 60.0) / sample_rate as f64;
        outcome.has_pending = !inner.scheduled.is_empty() || !inner.pending.is_empty();
        outcome
    }
}

/// `next_beat(now, b)` — beats remaining until the next multiple of `b`.
pub fn next_beat(now: f64, b: f64) -> f64 {
    (now / b).ceil() * b - now
}

/// `beats(n, tempo)` — seconds-equivalent count `n` expressed in beats.
pub fn beats(n: f64, tempo: f64) -> f64 {
    n * 60.0 / tempo
}

/// `beat_mod(t, m)` — `t` modulo `m`, rounded to the nearest beat.
pub fn beat_mod(t: f64, m: f64) -> f64 {
    (t % m).round()
}
