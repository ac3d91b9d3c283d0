//! Command-line front end for the engine library: builds a small demo
//! graph and either plays it on the default output device or renders it
//! to a WAV file.

use cadenza::config::EngineConfig;
use cadenza::demo_generators::{Bounded, ConstantGenerator, SineGenerator};
use cadenza::engine::Engine;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cadenza", about = "A realtime, beat-scheduled audio engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play a demo graph on the default audio output device.
    Play {
        #[arg(long, default_value_t = 44100)]
        sample_rate: u32,
        #[arg(long, default_value_t = 1)]
        nchnls: u32,
        #[arg(long, default_value_t = 64)]
        block_size: u32,
        /// Seconds to play before stopping.
        #[arg(long, default_value_t = 2.0)]
        seconds: f64,
        #[arg(long, default_value_t = 220.0)]
        freq: f64,
    },
    /// Render a demo graph to a WAV file.
    Render {
        output: std::path::PathBuf,
        #[arg(long, default_value_t = 44100)]
        sample_rate: u32,
        #[arg(long, default_value_t = 1)]
        nchnls: u32,
        #[arg(long, default_value_t = 64)]
        block_size: u32,
        #[arg(long, default_value_t = 220.0)]
        freq: f64,
        /// Number of blocks of silence that ends the demo graph.
        #[arg(long, default_value_t = 200)]
        blocks: u32,
    },
}

fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            sample_rate,
            nchnls,
            block_size,
            seconds,
            freq,
        } => {
            let config = EngineConfig::builder()
                .sample_rate(sample_rate)
                .nchnls(nchnls)
                .block_size(block_size)
                .build()
                .expect("invalid engine configuration");
            let engine = Engine::new(config);
            engine.add_afunc(Box::new(SineGenerator::new(freq, 0.3)));
            engine.add_afunc(Box::new(ConstantGenerator::new(0.0)));
            let handle = engine.start().expect("failed to start realtime engine");
            std::thread::sleep(std::time::Duration::from_secs_f64(seconds));
            engine.stop();
            let _ = handle.join();
        }
        Command::Render {
            output,
            sample_rate,
            nchnls,
            block_size,
            freq,
            blocks,
        } => {
            let config = EngineConfig::builder()
                .sample_rate(sample_rate)
                .nchnls(nchnls)
                .block_size(block_size)
                .build()
                .expect("invalid engine configuration");
            let engine = Engine::new(config);
            engine.add_afunc(Box::new(Bounded::new(SineGenerator::new(freq, 0.3), blocks)));
            engine
                .render_to_disk(&output)
                .expect("failed to render to disk");
        }
    }
}
