//! Excitation sources: leaky noise and the two glottal pulse shapes.

use crate::error::{Error, Result};
use log::{info, warn};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use std::fs;
use std::path::Path;

//--- Noise sources ------------------------------------------------------------

/// Peak amplitude of each fresh noise increment.
pub const NOISE_AMPLITUDE: f64 = 1e-4;
/// Share of the previous noise value carried into the next one.
pub const NOISE_DECAY: f64 = 0.5;

/// A leaky accumulator over uniform white noise.
///
/// ```text
///    noise[n] = uniform(-NOISE_AMPLITUDE, NOISE_AMPLITUDE) + noise[n-1] * NOISE_DECAY
/// ```
pub struct NoiseSource<R> {
    rng: R,
    last: f64,
}

impl<R: Rng> NoiseSource<R> {
    pub fn new(rng: R) -> Self {
        NoiseSource { rng, last: 0.0 }
    }

    pub fn get_next(&mut self) -> f64 {
        let x = self.rng.random_range(-NOISE_AMPLITUDE..=NOISE_AMPLITUDE);
        self.last = x + self.last * NOISE_DECAY;
        self.last
    }

    /// Forgets the accumulated value.
    pub fn reset(&mut self) {
        self.last = 0.0;
    }
}

//--- Voice samples ------------------------------------------------------------

/// Scale factor of the built-in natural voicing table.
pub const DEFAULT_SAMPLE_SCALE: f64 = 0.00001;

/// One period of a recorded glottal pulse.
#[rustfmt::skip]
pub const DEFAULT_SAMPLES: [i32; 100] = [
    -310, -400, 530, 356, 224, 89, 23, -10, -58, -16,
    461, 599, 536, 701, 770, 605, 497, 461, 560, 404,
    110, 224, 131, 104, -97, 155, 278, -154, -1165, -598,
    737, 125, -592, 41, 11, -247, -10, 65, 92, 80,
    -304, 71, 167, -1, 122, 233, 161, -43, 278, 479,
    485, 407, 266, 650, 134, 80, 236, 68, 260, 269,
    179, 53, 140, 275, 293, 296, 104, 257, 152, 311,
    182, 263, 245, 125, 314, 140, 44, 203, 230, -235,
    -286, 23, 107, 92, -91, 38, 464, 443, 176, 98,
    -784, -2449, -1891, -1045, -1600, -1462, -1384, -1261, -949, -730,
];

static SCALE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)\s*$").expect("scale pattern is valid"));
static SAMPLE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-?\d+)\s*$").expect("sample pattern is valid"));

/// A natural voicing table: integer samples of one glottal period and their scale factor.
#[derive(Clone, Debug, PartialEq)]
pub struct VoiceSamples {
    pub scale: f64,
    pub samples: Vec<i32>,
}

impl Default for VoiceSamples {
    fn default() -> Self {
        VoiceSamples {
            scale: DEFAULT_SAMPLE_SCALE,
            samples: DEFAULT_SAMPLES.to_vec(),
        }
    }
}

impl VoiceSamples {
    /// Parses a voice sample file body.
    ///
    /// The first line holds a non-negative decimal scale factor, every following line that
    /// is a signed integer is one sample. Other lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VoiceSampleLoad`] if the scale line is malformed or fewer than two
    /// samples are found.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines();
        let first = lines.next().unwrap_or_default().trim();
        let scale = SCALE_LINE
            .captures(first)
            .and_then(|c| c[1].parse::<f64>().ok())
            .ok_or_else(|| Error::VoiceSampleLoad(format!("invalid scale factor {first:?}")))?;
        let samples: Vec<i32> = lines
            .filter_map(|line| SAMPLE_LINE.captures(line.trim()))
            .filter_map(|c| c[1].parse().ok())
            .collect();
        if samples.len() < 2 {
            return Err(Error::VoiceSampleLoad(format!(
                "expected at least 2 samples, found {}",
                samples.len()
            )));
        }
        Ok(VoiceSamples { scale, samples })
    }

    /// Reads and parses a voice sample file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VoiceSampleLoad`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::VoiceSampleLoad(format!("{}: {e}", path.display())))?;
        let voice = Self::parse(&text)?;
        info!(
            "loaded {} voicing samples at a factor of {} from {}",
            voice.samples.len(),
            voice.scale,
            path.display()
        );
        Ok(voice)
    }

    /// Like [`VoiceSamples::load`], but falls back to the built-in table on failure.
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            warn!("{e}; using the built-in voicing samples");
            Self::default()
        })
    }
}

//--- Glottal sources ----------------------------------------------------------

/// Plays a [`VoiceSamples`] table once per pitch period, stretched to the period length
/// by linear interpolation.
pub struct SampledGlottalSource {
    voice: VoiceSamples,
    period: usize,
    position_in_period: usize,
}

impl SampledGlottalSource {
    #[must_use]
    pub fn new(voice: VoiceSamples) -> Self {
        SampledGlottalSource {
            voice,
            period: 1,
            position_in_period: 0,
        }
    }

    /// ### params
    /// ```text
    ///    period = Length of the F0 period, in samples.
    /// ```
    pub fn start_period(&mut self, period: usize) {
        self.period = period.max(1);
        self.position_in_period = 0;
    }

    #[allow(clippy::cast_sign_loss)]
    pub fn get_next(&mut self) -> f64 {
        let len = self.voice.samples.len();
        if len == 0 {
            return 0.0;
        }
        let at = self.position_in_period as f64 * len as f64 / self.period as f64;
        let index = (at as usize).min(len - 1);
        let fraction = at - index as f64;
        let current = f64::from(self.voice.samples[index]);
        let next = f64::from(self.voice.samples[(index + 1) % len]);
        self.position_in_period += 1;
        (current + (next - current) * fraction) * self.voice.scale
    }
}

/// Generates a glottal source signal according to the KLGLOTT88 model.
/// Formula of the glottal flow: `t^2 - t^3`
/// Formula of the derivative: `2 * t - 3 * t^2`
/// The derivative is used as the glottal source.
///
/// At the end of the open glottal phase there is an abrupt jump from the minimum value to zero.
pub struct AnalyticGlottalSource {
    /// current signal value
    x: f64,
    /// current first derivative
    a: f64,
    /// current second derivative
    b: f64,
    /// open glottis phase length in samples
    open_phase_length: usize,
    /// current sample position within F0 period
    position_in_period: usize,
}

impl AnalyticGlottalSource {
    /// Fraction of the period the glottis is open.
    pub const OPEN_PHASE_RATIO: f64 = 0.7;
    const AMPLIFICATION: f64 = 0.15;

    #[must_use]
    pub fn new() -> Self {
        let mut source = AnalyticGlottalSource {
            x: 0.0,
            a: 0.0,
            b: 0.0,
            open_phase_length: 0,
            position_in_period: 0,
        };
        source.start_period(0);
        source
    }

    /// ### params
    /// ```text
    ///    period = Length of the F0 period, in samples.
    /// ```
    #[allow(clippy::cast_sign_loss)]
    pub fn start_period(&mut self, period: usize) {
        let open_phase_length = crate::math::round(period as f64 * Self::OPEN_PHASE_RATIO) as usize;
        self.open_phase_length = open_phase_length;
        self.x = 0.0;
        self.position_in_period = 0;
        if open_phase_length == 0 {
            self.a = 0.0;
            self.b = 0.0;
            return;
        }
        let length = open_phase_length as f64;
        self.b = -Self::AMPLIFICATION / (length * length);
        self.a = -self.b * length / 3.0;
    }

    pub fn get_next(&mut self) -> f64 {
        self.position_in_period += 1;
        if self.position_in_period >= self.open_phase_length {
            self.x = 0.0;
            return 0.0;
        }
        self.a += self.b;
        self.x += self.a;
        self.x
    }
}

impl Default for AnalyticGlottalSource {
    fn default() -> Self {
        Self::new()
    }
}

/// The voicing source selected by `natural_voicing`.
pub enum GlottalSource {
    Sampled(SampledGlottalSource),
    Analytic(AnalyticGlottalSource),
}

impl GlottalSource {
    pub fn start_period(&mut self, period: usize) {
        match self {
            GlottalSource::Sampled(source) => source.start_period(period),
            GlottalSource::Analytic(source) => source.start_period(period),
        }
    }

    pub fn get_next(&mut self) -> f64 {
        match self {
            GlottalSource::Sampled(source) => source.get_next(),
            GlottalSource::Analytic(source) => source.get_next(),
        }
    }
}
