//! The per-sound synthesis parameter set.

use crate::error::{Error, Result};

/// Number of positional fields in a parameter set.
pub const PARAMETER_COUNT: usize = 33;

/// Parameters for one sound segment.
///
/// Field order matches the positional layout used by [`ParameterVector::to_array`]:
/// glottal and nasal frequencies, formant frequencies, glottal and nasal bandwidths,
/// formant bandwidths, parallel formant gains, source gains and finally the duration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParameterVector {
    /// glottal pole frequency in Hz, 0 turns the glottal low-pass into a DC-gain filter
    pub glottal_pole_freq: f64,
    /// glottal zero frequency in Hz
    pub glottal_zero_freq: f64,
    /// glottal sine (parallel voicing) frequency in Hz
    pub glottal_sine_freq: f64,
    /// nasal pole frequency in Hz
    pub nasal_pole_freq: f64,
    /// nasal zero frequency in Hz
    pub nasal_zero_freq: f64,
    /// oral formant frequencies F1 to F6 in Hz
    pub formant_freq: [f64; 6],
    /// glottal pole bandwidth in Hz
    pub glottal_pole_bw: f64,
    /// glottal zero bandwidth in Hz
    pub glottal_zero_bw: f64,
    /// glottal sine bandwidth in Hz
    pub glottal_sine_bw: f64,
    /// nasal pole bandwidth in Hz
    pub nasal_pole_bw: f64,
    /// nasal zero bandwidth in Hz
    pub nasal_zero_bw: f64,
    /// oral formant bandwidths B1 to B6 in Hz
    pub formant_bw: [f64; 6],
    /// parallel branch gains for F2 to F6
    pub formant_gain: [f64; 5],
    /// parallel bypass gain
    pub bypass_gain: f64,
    /// cascade (aspiration) noise gain
    pub cascade_gain: f64,
    /// parallel (frication) noise gain
    pub parallel_gain: f64,
    /// voicing gain for the cascade branch
    pub voicing_gain: f64,
    /// sinusoidal voicing gain for the parallel branch
    pub voicing_sine_gain: f64,
    /// segment duration in milliseconds
    pub duration_ms: f64,
}

impl ParameterVector {
    /// Builds a parameter set from its positional layout.
    #[must_use]
    pub fn from_array(p: [f64; PARAMETER_COUNT]) -> Self {
        ParameterVector {
            glottal_pole_freq: p[0],
            glottal_zero_freq: p[1],
            glottal_sine_freq: p[2],
            nasal_pole_freq: p[3],
            nasal_zero_freq: p[4],
            formant_freq: [p[5], p[6], p[7], p[8], p[9], p[10]],
            glottal_pole_bw: p[11],
            glottal_zero_bw: p[12],
            glottal_sine_bw: p[13],
            nasal_pole_bw: p[14],
            nasal_zero_bw: p[15],
            formant_bw: [p[16], p[17], p[18], p[19], p[20], p[21]],
            formant_gain: [p[22], p[23], p[24], p[25], p[26]],
            bypass_gain: p[27],
            cascade_gain: p[28],
            parallel_gain: p[29],
            voicing_gain: p[30],
            voicing_sine_gain: p[31],
            duration_ms: p[32],
        }
    }

    /// Returns the positional layout of this parameter set.
    #[must_use]
    pub fn to_array(&self) -> [f64; PARAMETER_COUNT] {
        let f = &self.formant_freq;
        let bw = &self.formant_bw;
        let g = &self.formant_gain;
        [
            self.glottal_pole_freq,
            self.glottal_zero_freq,
            self.glottal_sine_freq,
            self.nasal_pole_freq,
            self.nasal_zero_freq,
            f[0],
            f[1],
            f[2],
            f[3],
            f[4],
            f[5],
            self.glottal_pole_bw,
            self.glottal_zero_bw,
            self.glottal_sine_bw,
            self.nasal_pole_bw,
            self.nasal_zero_bw,
            bw[0],
            bw[1],
            bw[2],
            bw[3],
            bw[4],
            bw[5],
            g[0],
            g[1],
            g[2],
            g[3],
            g[4],
            self.bypass_gain,
            self.cascade_gain,
            self.parallel_gain,
            self.voicing_gain,
            self.voicing_sine_gain,
            self.duration_ms,
        ]
    }

    /// Sets the duration, clamped to be non-negative.
    pub fn set_duration(&mut self, duration_ms: f64) {
        self.duration_ms = if duration_ms > 0.0 { duration_ms } else { 0.0 };
    }

    pub fn scale_duration(&mut self, factor: f64) {
        self.set_duration(self.duration_ms * factor);
    }
}

impl TryFrom<&[f64]> for ParameterVector {
    type Error = Error;

    fn try_from(fields: &[f64]) -> Result<Self> {
        let p: [f64; PARAMETER_COUNT] =
            fields.try_into().map_err(|_| Error::ParameterCount {
                expected: PARAMETER_COUNT,
                found: fields.len(),
            })?;
        Ok(ParameterVector::from_array(p))
    }
}

#[cfg(test)]
mod tests {
    use super::{PARAMETER_COUNT, ParameterVector};
    use crate::error::Error;

    fn numbered() -> [f64; PARAMETER_COUNT] {
        let mut p = [0.0; PARAMETER_COUNT];
        for (i, v) in p.iter_mut().enumerate() {
            *v = i as f64;
        }
        p
    }

    #[test]
    fn positional_layout_is_preserved() {
        let v = ParameterVector::from_array(numbered());
        assert_eq!(v.formant_freq[0], 5.0);
        assert_eq!(v.formant_bw[5], 21.0);
        assert_eq!(v.formant_gain[0], 22.0);
        assert_eq!(v.voicing_sine_gain, 31.0);
        assert_eq!(v.duration_ms, 32.0);
        assert_eq!(v.to_array(), numbered());
    }

    #[test]
    fn wrong_field_count_is_rejected() {
        let short = [1.0; 32];
        match ParameterVector::try_from(&short[..]) {
            Err(Error::ParameterCount { expected, found }) => {
                assert_eq!(expected, 33);
                assert_eq!(found, 32);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn duration_never_goes_negative() {
        let mut v = ParameterVector::from_array(numbered());
        v.set_duration(-12.0);
        assert_eq!(v.duration_ms, 0.0);
        v.set_duration(40.0);
        v.scale_duration(1.5);
        assert_eq!(v.duration_ms, 60.0);
    }
}
