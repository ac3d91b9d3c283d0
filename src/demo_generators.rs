//! A handful of minimal generators used by the CLI demo and integration
//! tests to exercise the public `Generator` contract. These are fixtures,
//! not the DSP primitive library the crate treats as an external
//! collaborator (§1 Out of scope) — they exist only so the engine can be
//! driven end to end without depending on that library.

use crate::context::BlockCtx;
use crate::generator::{Buffer, GenOutput, Generator};

/// Emits a fixed value every sample, forever.
pub struct ConstantGenerator {
    value: f64,
}

impl ConstantGenerator {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl Generator for ConstantGenerator {
    fn pull(&mut self, ctx: &BlockCtx) -> GenOutput {
        GenOutput::Mono(vec![self.value; ctx.block_size as usize])
    }

    fn label(&self) -> &str {
        "constant"
    }
}

/// A free-running sine oscillator at a fixed frequency and amplitude,
/// tracking phase across blocks via the ambient sample rate.
pub struct SineGenerator {
    freq_hz: f64,
    amplitude: f64,
    phase: f64,
}

impl SineGenerator {
    pub fn new(freq_hz: f64, amplitude: f64) -> Self {
        Self {
            freq_hz,
            amplitude,
            phase: 0.0,
        }
    }
}

impl Generator for SineGenerator {
    fn pull(&mut self, ctx: &BlockCtx) -> GenOutput {
        let mut buf: Buffer = Vec::with_capacity(ctx.block_size as usize);
        let step = std::f64::consts::TAU * self.freq_hz / ctx.sample_rate as f64;
        for _ in 0..ctx.block_size {
            buf.push(self.amplitude * self.phase.sin());
            self.phase += step;
        }
        self.phase %= std::f64::consts::TAU;
        GenOutput::Mono(buf)
    }

    fn label(&self) -> &str {
        "sine"
    }
}

/// Plays a fixed number of blocks then reports `Done`, used for exercising
/// generator removal and the clear-then-silence scenario.
pub struct FiniteGenerator {
    value: f64,
    blocks_remaining: u32,
}

impl FiniteGenerator {
    pub fn new(value: f64, blocks: u32) -> Self {
        Self {
            value,
            blocks_remaining: blocks,
        }
    }
}

impl Generator for FiniteGenerator {
    fn pull(&mut self, ctx: &BlockCtx) -> GenOutput {
        if self.blocks_remaining == 0 {
            return GenOutput::Done;
        }
        self.blocks_remaining -= 1;
        GenOutput::Mono(vec![self.value; ctx.block_size as usize])
    }

    fn label(&self) -> &str {
        "finite"
    }
}

/// Wraps another generator so it reports `Done` after a fixed number of
/// blocks, regardless of what the inner generator would otherwise do.
/// Used to bound an otherwise free-running generator for the CLI demo and
/// for tests that need a deterministic, finite offline render.
pub struct Bounded<G> {
    inner: G,
    blocks_remaining: u32,
}

impl<G> Bounded<G> {
    pub fn new(inner: G, blocks: u32) -> Self {
        Self {
            inner,
            blocks_remaining: blocks,
        }
    }
}

impl<G: Generator> Generator for Bounded<G> {
    fn pull(&mut self, ctx: &BlockCtx) -> GenOutput {
        if self.blocks_remaining == 0 {
            return GenOutput::Done;
        }
        self.blocks_remaining -= 1;
        self.inner.pull(ctx)
    }

    fn label(&self) -> &str {
        self.inner.label()
    }
}
