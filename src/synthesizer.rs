//! Renders one parameter set into 16-bit samples.
//!
//! Every segment gets a freshly configured filter bank. Only the glottal shaping
//! resonator and the noise accumulator carry state from one segment to the next; the
//! former is cleared by [`Synthesizer::begin_word`], the latter by
//! [`Synthesizer::generate_silence`].

use crate::filters::{AntiResonator, DifferencingFilter, Resonator};
use crate::math::round;
use crate::options::{MAX_FORMANTS, SynthesisOptions};
use crate::parameters::ParameterVector;
use crate::sources::{
    AnalyticGlottalSource, GlottalSource, NoiseSource, SampledGlottalSource, VoiceSamples,
};
use crate::traits::{BasicFilter, Filter};
use log::trace;
use rand::Rng;

/// Samples computed and thrown away at the start of every segment.
pub const ANTI_POP_SAMPLES: usize = 15;

/// Full-scale amplitude of the 16-bit output.
const OUTPUT_SCALE: f64 = 32767.0;

/// Converts a scaled output value to a sample, clipping at the 16-bit limits.
#[must_use]
pub fn clip_sample(value: f64) -> i16 {
    if value.is_nan() {
        return 0;
    }
    let value = round(value);
    if value >= f64::from(i16::MAX) {
        i16::MAX
    } else if value <= f64::from(i16::MIN) {
        i16::MIN
    } else {
        value as i16
    }
}

/// The filters configured from one parameter set.
struct FilterBank {
    glottal_zero: AntiResonator,
    glottal_sine: Resonator,
    nasal_pole: Resonator,
    nasal_zero: AntiResonator,
    /// oral formants F1 to F6, cascade branch
    cascade: [Resonator; MAX_FORMANTS],
    /// oral formants F1 to F6, parallel branch
    parallel: [Resonator; MAX_FORMANTS],
    /// how many parallel formants, from F1 up, the voicing is routed into
    parallel_voiced: usize,
    differencing: DifferencingFilter,
}

impl FilterBank {
    fn new(options: &SynthesisOptions, p: &ParameterVector) -> Self {
        let sample_rate = options.sample_rate;
        let active = options.active_formants();

        let mut glottal_zero = AntiResonator::new(sample_rate);
        glottal_zero.set(p.glottal_zero_freq, p.glottal_zero_bw);
        let mut glottal_sine = Resonator::new(sample_rate);
        glottal_sine.set(p.glottal_sine_freq, p.glottal_sine_bw);
        let mut nasal_pole = Resonator::new(sample_rate);
        nasal_pole.set(p.nasal_pole_freq, p.nasal_pole_bw);
        let mut nasal_zero = AntiResonator::new(sample_rate);
        nasal_zero.set(p.nasal_zero_freq, p.nasal_zero_bw);

        let cascade = std::array::from_fn(|i| {
            let mut r = Resonator::new(sample_rate);
            if i < active {
                r.set(p.formant_freq[i], p.formant_bw[i]);
            } else {
                r.set_passthrough();
            }
            r
        });

        // F1 carries the sine voicing; F2..F6 are scaled by their own gain fields, and
        // without a cascade branch the voicing also runs through the first `active` ones.
        let parallel_voiced = if options.cascade_enabled { 0 } else { active };
        let parallel = std::array::from_fn(|i| {
            let mut r = Resonator::new(sample_rate);
            let carries_voice = i == 0 || i < parallel_voiced;
            if carries_voice || p.formant_gain[i - 1] != 0.0 {
                r.set(p.formant_freq[i], p.formant_bw[i]);
            } else {
                r.set_mute();
            }
            r
        });

        FilterBank {
            glottal_zero,
            glottal_sine,
            nasal_pole,
            nasal_zero,
            cascade,
            parallel,
            parallel_voiced,
            differencing: DifferencingFilter::new(),
        }
    }
}

/// Sample-by-sample renderer for sound segments.
pub struct Synthesizer<R> {
    options: SynthesisOptions,
    noise: NoiseSource<R>,
    glottal: GlottalSource,
    /// glottal pole ("R1"), shapes the voicing and carries across segments of one word
    glottal_pole: Resonator,
}

impl<R: Rng> Synthesizer<R> {
    /// `voice` is only used when `options.natural_voicing` is set.
    pub fn new(options: SynthesisOptions, voice: VoiceSamples, rng: R) -> Self {
        let glottal = if options.natural_voicing {
            GlottalSource::Sampled(SampledGlottalSource::new(voice))
        } else {
            GlottalSource::Analytic(AnalyticGlottalSource::new())
        };
        let glottal_pole = Resonator::new(options.sample_rate);
        Synthesizer {
            options,
            noise: NoiseSource::new(rng),
            glottal,
            glottal_pole,
        }
    }

    #[must_use]
    pub fn options(&self) -> &SynthesisOptions {
        &self.options
    }

    /// Clears the glottal shaping state ahead of a new word.
    pub fn begin_word(&mut self) {
        self.glottal_pole.reset();
    }

    /// Returns `milliseconds` of silence and resets the noise accumulator.
    pub fn generate_silence(&mut self, milliseconds: f64) -> Vec<i16> {
        self.noise.reset();
        vec![0; self.options.samples_for(milliseconds)]
    }

    /// Renders one segment.
    ///
    /// `pitch_multiplier` scales the base pitch period, so values above 1.0 lower the pitch.
    /// The result has exactly `duration_ms * sample_rate / 1000` samples (rounded down); a
    /// segment of zero duration is not rendered at all.
    pub fn synthesize(&mut self, parameters: &ParameterVector, pitch_multiplier: f64) -> Vec<i16> {
        let length = self.options.samples_for(parameters.duration_ms);
        if length == 0 {
            return Vec::new();
        }
        let period = self.options.pitch_period(pitch_multiplier);
        trace!(
            "segment: {} ms, {length} samples, period {period}",
            parameters.duration_ms
        );

        let mut bank = FilterBank::new(&self.options, parameters);
        self.glottal_pole
            .set(parameters.glottal_pole_freq, parameters.glottal_pole_bw);
        let gain = OUTPUT_SCALE * self.options.output_gain;

        let mut samples = Vec::with_capacity(length);
        let mut position_in_period = period;
        for t in 0..length + ANTI_POP_SAMPLES {
            if position_in_period >= period {
                self.glottal.start_period(period);
                position_in_period = 0;
            }
            let value = self.compute_next_sample(&mut bank, parameters);
            position_in_period += 1;
            if t >= ANTI_POP_SAMPLES {
                samples.push(clip_sample(value * gain));
            }
        }
        samples
    }

    fn compute_next_sample(&mut self, bank: &mut FilterBank, p: &ParameterVector) -> f64 {
        let noise = self.noise.get_next();
        let shaped = self.glottal_pole.step(self.glottal.get_next());
        let voice = bank.glottal_zero.step(shaped) * p.voicing_gain;
        let sine_voice = bank.glottal_sine.step(shaped) * p.voicing_sine_gain;
        let aspiration = noise * p.cascade_gain;
        let frication = noise * p.parallel_gain;

        let cascade_out = if self.options.cascade_enabled {
            Self::compute_cascade_branch(bank, voice + aspiration)
        } else {
            0.0
        };
        let parallel_out =
            Self::compute_parallel_branch(bank, p, sine_voice, voice, frication + aspiration);

        bank.differencing.step(cascade_out + parallel_out)
    }

    fn compute_cascade_branch(bank: &mut FilterBank, source: f64) -> f64 {
        let mut v = bank.nasal_pole.step(source);
        v = bank.nasal_zero.step(v);
        // highest formant first
        for formant in bank.cascade.iter_mut().rev() {
            v = formant.step(v);
        }
        v
    }

    fn compute_parallel_branch(
        bank: &mut FilterBank,
        p: &ParameterVector,
        sine_voice: f64,
        voice: f64,
        noise: f64,
    ) -> f64 {
        let voiced = bank.parallel_voiced;
        let routed = |i: usize| if i < voiced { voice } else { 0.0 };
        let mut v = bank.parallel[0].step(sine_voice + routed(0));
        for i in 1..MAX_FORMANTS {
            let alternating_sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            let source = noise * p.formant_gain[i - 1] + routed(i);
            v += alternating_sign * bank.parallel[i].step(source);
        }
        v + p.bypass_gain * noise
    }
}

#[cfg(test)]
mod tests {
    use super::{Synthesizer, clip_sample};
    use crate::options::SynthesisOptions;
    use crate::parameters::ParameterVector;
    use crate::phonemes::lookup;
    use crate::sources::VoiceSamples;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn synthesizer(options: SynthesisOptions) -> Synthesizer<SmallRng> {
        Synthesizer::new(options, VoiceSamples::default(), SmallRng::seed_from_u64(1))
    }

    fn vowel() -> ParameterVector {
        lookup('a').unwrap().parameters
    }

    #[test]
    fn clip_saturates_instead_of_wrapping() {
        assert_eq!(clip_sample(1e12), i16::MAX);
        assert_eq!(clip_sample(-1e12), i16::MIN);
        assert_eq!(clip_sample(32767.4), i16::MAX);
        assert_eq!(clip_sample(-32768.0), i16::MIN);
        assert_eq!(clip_sample(12.6), 13);
        assert_eq!(clip_sample(f64::NAN), 0);
    }

    #[test]
    fn segment_length_follows_duration() {
        let mut synth = synthesizer(SynthesisOptions::default());
        let mut p = vowel();
        for (ms, expected) in [(50.0, 800), (175.0, 2800), (0.5, 8), (0.01, 0)] {
            p.set_duration(ms);
            assert_eq!(synth.synthesize(&p, 1.0).len(), expected, "{ms} ms");
        }
    }

    #[test]
    fn zero_duration_is_not_rendered() {
        let mut synth = synthesizer(SynthesisOptions::default());
        let mut p = vowel();
        p.set_duration(0.0);
        assert!(synth.synthesize(&p, 1.0).is_empty());
    }

    #[test]
    fn silence_is_zeroes() {
        let mut synth = synthesizer(SynthesisOptions::default());
        let silence = synth.generate_silence(250.0);
        assert_eq!(silence.len(), 4000);
        assert!(silence.iter().all(|s| *s == 0));
    }

    #[test]
    fn voiced_segment_is_audible() {
        for natural_voicing in [true, false] {
            for cascade_enabled in [true, false] {
                let mut synth = synthesizer(SynthesisOptions {
                    natural_voicing,
                    cascade_enabled,
                    ..SynthesisOptions::default()
                });
                let samples = synth.synthesize(&vowel(), 1.0);
                assert!(
                    samples.iter().any(|s| *s != 0),
                    "natural={natural_voicing} cascade={cascade_enabled}"
                );
            }
        }
    }

    #[test]
    fn same_seed_same_output() {
        let s = lookup('s').unwrap().parameters;
        let a = synthesizer(SynthesisOptions::default()).synthesize(&s, 1.0);
        let b = synthesizer(SynthesisOptions::default()).synthesize(&s, 1.0);
        assert_eq!(a, b);
    }

    #[test]
    fn glottal_state_carries_within_a_word() {
        // 'a' has no noise gains, so only the glottal pole state can differ.
        let mut synth = synthesizer(SynthesisOptions::default());
        synth.begin_word();
        let first = synth.synthesize(&vowel(), 1.0);
        let continued = synth.synthesize(&vowel(), 1.0);
        synth.begin_word();
        let restarted = synth.synthesize(&vowel(), 1.0);
        assert_eq!(first, restarted);
        assert_ne!(first, continued);
    }

    #[test]
    fn huge_gain_clips_to_the_limits() {
        let mut synth = synthesizer(SynthesisOptions {
            output_gain: 1e9,
            ..SynthesisOptions::default()
        });
        let samples = synth.synthesize(&vowel(), 1.0);
        assert!(samples.contains(&i16::MAX));
        assert!(samples.contains(&i16::MIN));
    }
}
