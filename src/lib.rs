//! Klatt formant speech synthesis from IPA transcriptions.
//!
//! A paragraph of IPA text with light prosodic markup is split into sentences and words
//! ([`segmenter`]), every symbol is looked up in the phoneme table ([`phonemes`]), reshaped
//! by an ordered chain of prosodic rules ([`rules`]) and finally rendered by a
//! cascade/parallel resonator synthesizer ([`synthesizer`]) into 16-bit samples.
//!
//! ```no_run
//! use klatt_ipa::{Renderer, SynthesisOptions, VoiceSamples};
//!
//! let mut renderer = Renderer::new(SynthesisOptions::default(), VoiceSamples::default());
//! let samples = renderer.render_paragraph("hɛlo wʌɹld.")?;
//! # Ok::<(), klatt_ipa::Error>(())
//! ```
//!
//! ## Markup
//!
//! | mark | meaning |
//! |---|---|
//! | `<` / `>` before a symbol | halve / stretch by 1.5 its duration |
//! | `"` ... `"` | quoted span |
//! | `*` ... `*` | emphasized span |
//! | `'` before a word | content word |
//! | `,` / `:` after a word | 250 / 150 ms pause |
//! | `.` `?` `!` | end of sentence |

#![deny(clippy::all, clippy::pedantic, unsafe_code, rustdoc::all)]
// fine for us since loss of precision is not that important, as long as it's the same every time.
#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]

pub mod error;
pub mod filters;
mod math;
pub mod options;
pub mod parameters;
pub mod phonemes;
pub mod render;
pub mod rules;
pub mod segmenter;
pub mod sources;
pub mod synthesizer;
mod traits;
pub mod wave;

pub use error::{Error, Result};
pub use options::SynthesisOptions;
pub use parameters::ParameterVector;
pub use render::{Renderer, expand_word};
pub use rules::{LanguageProfile, PhonemeRule, Rule};
pub use sources::VoiceSamples;
pub use synthesizer::Synthesizer;
pub use traits::{BasicFilter, Filter};
pub use wave::WaveSink;

#[cfg(test)]
mod lib_tests;
