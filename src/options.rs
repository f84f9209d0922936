use crate::math::round;

/// Highest number of oral formants the filter banks carry.
pub const MAX_FORMANTS: usize = 6;

/// Parameters for the whole rendering run.
#[derive(Clone, Debug, PartialEq)]
pub struct SynthesisOptions {
    /// sample rate in Hz
    pub sample_rate: usize,
    /// frame length in milliseconds
    pub framerate_ms: usize,
    /// number of formants in the cascade branch, clamped to 0 ..= 6
    pub num_formants: usize,
    /// true = voicing runs through the cascade branch, false = parallel only
    pub cascade_enabled: bool,
    /// true = sampled natural glottal pulse, false = analytic pulse
    pub natural_voicing: bool,
    /// glottal pulse rate in Hz for a pitch multiplier of 1.0
    pub pitch_hz: f64,
    /// linear gain applied before scaling to 16 bits
    pub output_gain: f64,
    /// seed for the noise generator
    pub seed: u64,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        SynthesisOptions {
            sample_rate: 16000,
            framerate_ms: 5,
            num_formants: 5,
            cascade_enabled: true,
            natural_voicing: true,
            pitch_hz: 125.0,
            output_gain: 1.0,
            seed: 0,
        }
    }
}

impl SynthesisOptions {
    #[must_use]
    pub fn samples_per_ms(&self) -> f64 {
        self.sample_rate as f64 / 1000.0
    }

    #[must_use]
    pub fn samples_per_frame(&self) -> usize {
        self.sample_rate * self.framerate_ms / 1000
    }

    /// Glottal period in samples for a pitch multiplier of 1.0.
    #[must_use]
    pub fn base_period(&self) -> f64 {
        self.sample_rate as f64 / self.pitch_hz
    }

    /// Number of formants the cascade chain actually runs.
    #[must_use]
    pub fn active_formants(&self) -> usize {
        self.num_formants.min(MAX_FORMANTS)
    }

    /// Glottal period in samples for a pitch multiplier (>1.0 lowers the pitch).
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn pitch_period(&self, pitch_multiplier: f64) -> usize {
        if self.pitch_hz <= 0.0 {
            return 1;
        }
        let period = round(self.base_period() * pitch_multiplier);
        if period.is_finite() && period >= 1.0 {
            period as usize
        } else {
            1
        }
    }

    /// Number of samples rendered for a segment of the given length.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn samples_for(&self, duration_ms: f64) -> usize {
        let n = duration_ms * self.samples_per_ms();
        if n.is_finite() && n > 0.0 { n as usize } else { 0 }
    }
}
