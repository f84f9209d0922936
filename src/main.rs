use clap::Parser;
use klatt_ipa::{Renderer, Result, SynthesisOptions, VoiceSamples, WaveSink};
use log::{LevelFilter, info};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

/// Renders IPA transcriptions as synthesized speech.
#[derive(Parser, Debug)]
#[command(name = "klatt-ipa", version, about)]
struct Cli {
    /// IPA script, one paragraph per line
    input: PathBuf,

    /// Output WAV file
    #[arg(short, long, default_value = "output.wav")]
    output: PathBuf,

    /// Sample rate in Hz
    #[arg(short = 's', long, default_value_t = 16000)]
    sample_rate: u32,

    /// Milliseconds per frame
    #[arg(short = 'f', long, default_value_t = 5)]
    frame_rate: usize,

    /// Number of formants in the cascade branch
    #[arg(short = 'n', long, default_value_t = 5)]
    formant_count: usize,

    /// Disable the cascade branch, rendering through the parallel branch only
    #[arg(short, long)]
    parallel: bool,

    /// Use an analytic glottal pulse instead of natural voicing samples
    #[arg(long)]
    synthetic_voice: bool,

    /// Override the natural voicing samples with this file
    #[arg(short = 'O', long)]
    voice_samples: Option<PathBuf>,

    /// Base pitch in Hz
    #[arg(long, default_value_t = 125.0)]
    pitch: f64,

    /// Linear output gain
    #[arg(short, long, default_value_t = 1.0)]
    gain: f64,

    /// Noise generator seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Print progress information
    #[arg(short, long)]
    verbose: bool,

    /// Print debugging information
    #[arg(short, long)]
    debug: bool,
}

impl Cli {
    fn options(&self) -> SynthesisOptions {
        SynthesisOptions {
            sample_rate: self.sample_rate as usize,
            framerate_ms: self.frame_rate,
            num_formants: self.formant_count,
            cascade_enabled: !self.parallel,
            natural_voicing: !self.synthetic_voice,
            pitch_hz: self.pitch,
            output_gain: self.gain,
            seed: self.seed,
        }
    }

    fn log_level(&self) -> LevelFilter {
        if self.debug {
            LevelFilter::Debug
        } else if self.verbose {
            LevelFilter::Info
        } else {
            LevelFilter::Warn
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let options = cli.options();
    let voice = match &cli.voice_samples {
        Some(path) if options.natural_voicing => VoiceSamples::load_or_default(path),
        _ => VoiceSamples::default(),
    };
    let paragraph_gap = vec![0; options.samples_per_frame() / 2];
    let mut renderer = Renderer::new(options, voice);
    let mut sink = WaveSink::create(&cli.output, cli.sample_rate)?;

    let input = BufReader::new(File::open(&cli.input)?);
    for line in input.lines() {
        let line = line?;
        let paragraph = line.trim();
        if paragraph.is_empty() {
            continue;
        }
        info!("processing {paragraph:?}");
        let samples = renderer.render_paragraph(paragraph)?;
        sink.add_samples(&samples)?;
        sink.add_samples(&paragraph_gap)?;
    }
    sink.close()?;
    info!("wrote {} samples to {}", sink.len(), cli.output.display());
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    if let Err(error) = run(&cli) {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}
