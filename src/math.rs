//! Core math functions for the synthesis.
//! If the `libm` feature is enabled, this just exports the required functions so output is
//! bit-identical across platforms.
//! Otherwise, this converts the syntax from the std variety: `f.exp()` into
//! the `libm` equiv. `exp(f)`.

#[cfg(feature = "libm")]
pub(crate) use libm::{cos, exp, round};

#[cfg(not(feature = "libm"))]
pub(crate) fn cos(f: f64) -> f64 {
    f.cos()
}
#[cfg(not(feature = "libm"))]
pub(crate) fn exp(f: f64) -> f64 {
    f.exp()
}
#[cfg(not(feature = "libm"))]
pub(crate) fn round(f: f64) -> f64 {
    f.round()
}
