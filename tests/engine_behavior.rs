//! Black-box integration tests against the public engine API, covering
//! the scenarios enumerated for testable properties: silence, DC offset,
//! saturation, mixing, event firing, temporal recursion, clear-then-
//! silence, and realtime/offline parity.

use cadenza::config::EngineConfig;
use cadenza::context::BlockCtx;
use cadenza::demo_generators::{Bounded, ConstantGenerator, FiniteGenerator};
use cadenza::engine::Engine;
use cadenza::event::{next_beat, Event, EventResult};
use cadenza::generator::GenOutput;

fn read_wav_i16(path: &std::path::Path) -> Vec<i16> {
    let mut reader = hound::WavReader::open(path).unwrap();
    reader.samples::<i16>().map(|s| s.unwrap()).collect()
}

#[test]
fn silence_with_no_generators_renders_all_zero() {
    let cfg = EngineConfig::builder()
        .sample_rate(44100)
        .nchnls(1)
        .block_size(64)
        .build()
        .unwrap();
    let engine = Engine::new(cfg);
    engine.add_afunc(Box::new(FiniteGenerator::new(0.0, 10)));
    let tmp = tempfile::NamedTempFile::new().unwrap();
    engine.render_to_disk(tmp.path()).unwrap();

    let samples = read_wav_i16(tmp.path());
    assert_eq!(samples.len(), 10 * 64);
    assert!(samples.iter().all(|&s| s == 0));
}

#[test]
fn dc_offset_quantises_to_expected_pcm_value() {
    let cfg = EngineConfig::builder()
        .sample_rate(44100)
        .nchnls(1)
        .block_size(64)
        .build()
        .unwrap();
    let engine = Engine::new(cfg);
    engine.add_afunc(Box::new(Bounded::new(ConstantGenerator::new(0.5), 1)));
    let tmp = tempfile::NamedTempFile::new().unwrap();
    engine.render_to_disk(tmp.path()).unwrap();

    let samples = read_wav_i16(tmp.path());
    assert!(samples.iter().all(|&s| s == (0.5 * 32767.0) as i16));
}

#[test]
fn saturation_clamps_at_extremes() {
    let cfg = EngineConfig::builder()
        .sample_rate(44100)
        .nchnls(1)
        .block_size(4)
        .build()
        .unwrap();
    let engine = Engine::new(cfg);
    engine.add_afunc(Box::new(Bounded::new(ConstantGenerator::new(2.0), 1)));
    let tmp = tempfile::NamedTempFile::new().unwrap();
    engine.render_to_disk(tmp.path()).unwrap();

    let samples = read_wav_i16(tmp.path());
    assert!(samples.iter().all(|&s| s == 32767));
}

#[test]
fn mixing_sums_two_generators_on_the_same_channel() {
    let cfg = EngineConfig::builder()
        .sample_rate(44100)
        .nchnls(1)
        .block_size(4)
        .build()
        .unwrap();
    let engine = Engine::new(cfg);
    engine.add_afunc(Box::new(Bounded::new(ConstantGenerator::new(0.25), 1)));
    engine.add_afunc(Box::new(Bounded::new(ConstantGenerator::new(0.25), 1)));
    let tmp = tempfile::NamedTempFile::new().unwrap();
    engine.render_to_disk(tmp.path()).unwrap();

    let samples = read_wav_i16(tmp.path());
    assert!(samples.iter().all(|&s| s == (0.5 * 32767.0) as i16));
}

#[test]
fn clear_produces_silence_on_the_next_render() {
    let cfg = EngineConfig::builder()
        .sample_rate(44100)
        .nchnls(1)
        .block_size(4)
        .build()
        .unwrap();
    let engine = Engine::new(cfg);

    engine.add_afunc(Box::new(Bounded::new(ConstantGenerator::new(0.5), 3)));
    let tmp1 = tempfile::NamedTempFile::new().unwrap();
    engine.render_to_disk(tmp1.path()).unwrap();
    assert!(read_wav_i16(tmp1.path()).iter().any(|&s| s != 0));

    engine.clear();
    engine.add_afunc(Box::new(FiniteGenerator::new(0.0, 3)));
    let tmp2 = tempfile::NamedTempFile::new().unwrap();
    engine.render_to_disk(tmp2.path()).unwrap();
    assert!(read_wav_i16(tmp2.path()).iter().all(|&s| s == 0));
}

fn fires_on_block(sample_rate: u32, block_size: u32, blocks_to_run: u32) -> u64 {
    let cfg = EngineConfig::builder()
        .sample_rate(sample_rate)
        .nchnls(1)
        .block_size(block_size)
        .build()
        .unwrap();
    let engine = Engine::new(cfg);
    engine.set_tempo(60.0);
    let fired_at = std::sync::Arc::new(std::sync::atomic::AtomicU64::new(u64::MAX));
    let fired_at2 = fired_at.clone();
    engine.add_events(vec![Event::new(
        1.0,
        Box::new(move |ctx: &BlockCtx| {
            fired_at2.store(ctx.current_block_num, std::sync::atomic::Ordering::SeqCst);
            EventResult::Nothing
        }),
    )]);
    engine.add_afunc(Box::new(FiniteGenerator::new(0.0, blocks_to_run)));
    let tmp = tempfile::NamedTempFile::new().unwrap();
    engine.render_to_disk(tmp.path()).unwrap();
    fired_at.load(std::sync::atomic::Ordering::SeqCst)
}

#[test]
fn event_at_beat_one_fires_during_block_one_at_block_size_44100() {
    assert_eq!(fires_on_block(44100, 44100, 2), 1);
}

#[test]
fn event_at_beat_one_fires_during_block_two_at_block_size_22050() {
    assert_eq!(fires_on_block(44100, 22050, 3), 2);
}

#[test]
fn temporal_recursion_fires_once_per_beat_without_backing_up() {
    let cfg = EngineConfig::builder()
        .sample_rate(44100)
        .nchnls(1)
        .block_size(44100)
        .build()
        .unwrap();
    let engine = Engine::new(cfg);
    engine.set_tempo(60.0);
    let count = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));

    fn schedule_next(engine: &Engine, count: std::sync::Arc<std::sync::atomic::AtomicUsize>) {
        let beat = engine.now() + next_beat(engine.now(), 1.0).max(1.0);
        let count2 = count.clone();
        let engine2 = engine.clone();
        engine.add_events(vec![Event::new(
            beat,
            Box::new(move |_ctx: &BlockCtx| {
                count2.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                if count2.load(std::sync::atomic::Ordering::SeqCst) < 3 {
                    schedule_next(&engine2, count2.clone());
                }
                EventResult::Nothing
            }),
        )]);
    }
    schedule_next(&engine, count.clone());

    engine.add_afunc(Box::new(FiniteGenerator::new(0.0, 5)));
    let tmp = tempfile::NamedTempFile::new().unwrap();
    engine.render_to_disk(tmp.path()).unwrap();
    assert_eq!(count.load(std::sync::atomic::Ordering::SeqCst), 3);
}

#[test]
fn engine_config_rejects_invalid_construction() {
    assert!(EngineConfig::builder().sample_rate(0).build().is_err());
    assert!(EngineConfig::builder().block_size(0).build().is_err());
    assert!(EngineConfig::builder().nchnls(0).build().is_err());
}

#[test]
fn generator_producing_wrong_output_still_only_reports_done_once() {
    let ctx = BlockCtx::new(44100, 4, 1, 0);
    let mut gen = FiniteGenerator::new(1.0, 1);
    assert!(matches!(gen.pull(&ctx), GenOutput::Mono(_)));
    assert!(matches!(gen.pull(&ctx), GenOutput::Done));
    assert!(matches!(gen.pull(&ctx), GenOutput::Done));
}

/// The realtime sink reads through a `cpal` callback this harness cannot
/// drive deterministically, so full device-backed parity isn't exercised
/// here. This instead pins down that the offline path itself is
/// deterministic — rendering the same graph twice produces bit-identical
/// PCM — which is the property realtime/offline parity depends on.
#[test]
fn identical_graphs_render_to_bit_identical_pcm() {
    let build = || {
        let cfg = EngineConfig::builder()
            .sample_rate(44100)
            .nchnls(2)
            .block_size(64)
            .build()
            .unwrap();
        let engine = Engine::new(cfg);
        engine.add_afunc(Box::new(Bounded::new(ConstantGenerator::new(0.3), 20)));
        engine
    };

    let tmp1 = tempfile::NamedTempFile::new().unwrap();
    build().render_to_disk(tmp1.path()).unwrap();
    let tmp2 = tempfile::NamedTempFile::new().unwrap();
    build().render_to_disk(tmp2.path()).unwrap();

    assert_eq!(read_wav_i16(tmp1.path()), read_wav_i16(tmp2.path()));
}
