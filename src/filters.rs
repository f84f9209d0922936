//! Second-order filter sections for the cascade and parallel banks.

use crate::math::{cos, exp};
use crate::traits::{BasicFilter, Filter};
use std::f64::consts::PI;

/// Pole radius and the `b`, `c` feedback coefficients shared by both section kinds.
fn pole_coefficients(sample_rate: usize, f: f64, bw: f64) -> (f64, f64, f64) {
    let r = exp(-PI * bw / (sample_rate as f64));
    let w = 2.0 * PI * f / (sample_rate as f64);
    let c = -(r * r);
    let b = 2.0 * r * cos(w);
    (r, b, c)
}

/// A Klatt resonator.
/// This is a second order IIR filter.
/// With f=0 it works as a low-pass filter.
///
/// # Formulas:
/// ## Variables:
/// ```text
///    x = input samples
///    y = output samples
///    a/b/c = filter coefficients
///    f0 = resonator frequency in Hz
///    w0 = 2 * PI * f0 / sampleRate
///    bw = Bandwidth in Hz
///    r = exp(- PI * bw / sampleRate)
/// ```
/// ## Filter function:
/// ```text
///    y[n] = a * x[n] + b * y[n-1] + c * y[n-2]
///    b = 2 * r * cos(w0)
///    c = -r^2
///    a = 1 - b - c
/// ```
/// ## Gain at DC:
/// ```text
///    |H(0)| = a / (1 - c - b) = 1
/// ```
/// ## Gain at the resonance frequency:
/// ```text
///    |H(f0)| = a / (1 - r)
/// ```
#[derive(Clone, Debug)]
pub struct Resonator {
    sample_rate: usize,
    /// filter coefficient a
    a: f64,
    /// filter coefficient b
    b: f64,
    /// filter coefficient c
    c: f64,
    /// y[n-1], last output value
    y1: f64,
    /// y[n-2], second-last output value
    y2: f64,
    passthrough: bool,
    muted: bool,
}

impl Resonator {
    /// A resonator that passes its input through until [`Resonator::set`] is called.
    #[must_use]
    pub fn new(sample_rate: usize) -> Self {
        Resonator {
            sample_rate,
            a: 0.0,
            b: 0.0,
            c: 0.0,
            y1: 0.0,
            y2: 0.0,
            passthrough: true,
            muted: false,
        }
    }

    /// Adjusts the filter parameters without resetting the inner state.
    ///
    /// Values are not validated: a zero frequency gives a low-pass section and
    /// degenerate pairs give degenerate (but finite for `bw > 0`) output.
    pub fn set(&mut self, f: f64, bw: f64) {
        let (_, b, c) = pole_coefficients(self.sample_rate, f, bw);
        self.a = 1.0 - b - c;
        self.b = b;
        self.c = c;
        self.passthrough = false;
        self.muted = false;
    }

    /// Scales the `a` coefficient, leaving the pole location alone.
    pub fn multiply_amplitude(&mut self, gain: f64) {
        self.a *= gain;
    }
}

impl Filter for Resonator {
    fn set_passthrough(&mut self) {
        self.passthrough = true;
        self.muted = false;
        self.reset();
    }

    fn set_mute(&mut self) {
        self.passthrough = false;
        self.muted = true;
        self.reset();
    }
}

impl BasicFilter for Resonator {
    fn step(&mut self, x: f64) -> f64 {
        if self.passthrough {
            return x;
        }
        if self.muted {
            return 0.0;
        }
        let y = self.a * x + self.b * self.y1 + self.c * self.y2;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }

    fn reset(&mut self) {
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

/// A Klatt anti-resonator.
/// This is a second order FIR filter, the inverse of a [`Resonator`] with the same settings.
///
/// # Formulas:
/// ```text
///    y[n] = a' * x[n] + b' * x[n-1] + c' * x[n-2]
///    a' = 1 / a
///    b' = -b / a
///    c' = -c / a
/// ```
/// where `a`, `b`, `c` are the coefficients of the matching resonator.
#[derive(Clone, Debug)]
pub struct AntiResonator {
    sample_rate: usize,
    a: f64,
    b: f64,
    c: f64,
    /// x[n-1], last input value
    x1: f64,
    /// x[n-2], second-last input value
    x2: f64,
    passthrough: bool,
    muted: bool,
}

impl AntiResonator {
    #[must_use]
    pub fn new(sample_rate: usize) -> Self {
        AntiResonator {
            sample_rate,
            a: 0.0,
            b: 0.0,
            c: 0.0,
            x1: 0.0,
            x2: 0.0,
            passthrough: true,
            muted: false,
        }
    }

    /// Adjusts the filter parameters without resetting the inner state.
    pub fn set(&mut self, f: f64, bw: f64) {
        let (_, b0, c0) = pole_coefficients(self.sample_rate, f, bw);
        let a0 = 1.0 - b0 - c0;
        self.passthrough = false;
        self.muted = false;
        if a0 == 0.0 {
            self.a = 0.0;
            self.b = 0.0;
            self.c = 0.0;
            return;
        }
        self.a = 1.0 / a0;
        self.b = -b0 * self.a;
        self.c = -c0 * self.a;
    }
}

impl Filter for AntiResonator {
    fn set_passthrough(&mut self) {
        self.passthrough = true;
        self.muted = false;
        self.reset();
    }

    fn set_mute(&mut self) {
        self.passthrough = false;
        self.muted = true;
        self.reset();
    }
}

impl BasicFilter for AntiResonator {
    fn step(&mut self, x: f64) -> f64 {
        if self.passthrough {
            return x;
        }
        if self.muted {
            return 0.0;
        }
        let y = self.a * x + self.b * self.x1 + self.c * self.x2;
        self.x2 = self.x1;
        self.x1 = x;
        y
    }

    fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
    }
}

/// A differencing filter.
/// This is a first-order FIR HP filter, `y[n] = x[n] - x[n-1]`.
#[derive(Clone, Debug, Default)]
pub struct DifferencingFilter {
    /// x[n-1], last input value
    x1: f64,
}

impl DifferencingFilter {
    #[must_use]
    pub fn new() -> Self {
        DifferencingFilter { x1: 0.0 }
    }
}

impl BasicFilter for DifferencingFilter {
    fn step(&mut self, x: f64) -> f64 {
        let y = x - self.x1;
        self.x1 = x;
        y
    }

    fn reset(&mut self) {
        self.x1 = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::{AntiResonator, DifferencingFilter, Resonator, pole_coefficients};
    use crate::traits::{BasicFilter, Filter};

    const SAMPLE_RATE: usize = 16000;

    #[test]
    fn unset_sections_pass_through() {
        let mut r = Resonator::new(SAMPLE_RATE);
        let mut z = AntiResonator::new(SAMPLE_RATE);
        for x in [1.0, -0.5, 0.25] {
            assert_eq!(r.step(x), x);
            assert_eq!(z.step(x), x);
        }
        r.set_mute();
        z.set_mute();
        assert_eq!(r.step(1.0), 0.0);
        assert_eq!(z.step(1.0), 0.0);
    }

    #[test]
    fn resonator_has_unit_dc_gain() {
        let mut r = Resonator::new(SAMPLE_RATE);
        r.set(0.0, 100.0);
        let mut y = 0.0;
        for _ in 0..20_000 {
            y = r.step(1.0);
        }
        assert!((y - 1.0).abs() < 1e-9, "{y}");
    }

    #[test]
    fn resonator_stays_bounded() {
        let amplitude = 1.0;
        for bw in [50.0, 90.0, 200.0, 500.0, 1000.0] {
            for f in [0.0, 200.0, 1500.0, 4000.0, 7999.0] {
                let mut r = Resonator::new(SAMPLE_RATE);
                r.set(f, bw);
                let (radius, _, _) = pole_coefficients(SAMPLE_RATE, f, bw);
                let bound = r.a.abs() / ((1.0 - radius) * (1.0 - radius)) * amplitude * 1.001;
                for n in 0..10_000 {
                    let x = if n % 100 == 0 { amplitude } else { 0.0 };
                    let y = r.step(x);
                    assert!(y.is_finite());
                    assert!(y.abs() <= bound, "f={f} bw={bw} n={n} y={y} bound={bound}");
                }
            }
        }
    }

    #[test]
    fn anti_resonator_undoes_resonator() {
        let mut r = Resonator::new(SAMPLE_RATE);
        let mut z = AntiResonator::new(SAMPLE_RATE);
        r.set(700.0, 130.0);
        z.set(700.0, 130.0);
        for n in 0..500 {
            let x = ((n * 37) % 11) as f64 - 5.0;
            let y = z.step(r.step(x));
            assert!((y - x).abs() < 1e-6, "n={n}: {y} != {x}");
        }
    }

    #[test]
    fn amplitude_scaling_scales_output() {
        let mut plain = Resonator::new(SAMPLE_RATE);
        let mut loud = Resonator::new(SAMPLE_RATE);
        plain.set(500.0, 60.0);
        loud.set(500.0, 60.0);
        loud.multiply_amplitude(3.0);
        for n in 0..200 {
            let x = if n == 0 { 1.0 } else { 0.0 };
            let (p, l) = (plain.step(x), loud.step(x));
            assert!((l - 3.0 * p).abs() < 1e-9);
        }
    }

    #[test]
    fn reset_clears_history() {
        let mut r = Resonator::new(SAMPLE_RATE);
        r.set(300.0, 100.0);
        let first = r.step(1.0);
        r.step(0.5);
        r.reset();
        assert_eq!(r.step(1.0), first);
    }

    #[test]
    fn differencing_removes_dc() {
        let mut d = DifferencingFilter::new();
        assert_eq!(d.step(2.0), 2.0);
        assert_eq!(d.step(2.0), 0.0);
        assert_eq!(d.step(-1.0), -3.0);
        d.reset();
        assert_eq!(d.step(1.0), 1.0);
    }
}
