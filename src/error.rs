//! Error types for IPA rendering.

use std::io;
use thiserror::Error;

/// Everything that can go wrong between a transcription and a waveform.
#[derive(Error, Debug)]
pub enum Error {
    /// A symbol in the transcription has no entry in the phoneme table.
    #[error("unknown phoneme '{0}'")]
    UnknownPhoneme(char),

    /// A whitespace-separated token does not match the transcription grammar.
    #[error("malformed token in IPA input: {0}")]
    MalformedToken(String),

    /// A word index past the end of its sentence.
    #[error("word {index} is out of range for a sentence of {len} words")]
    WordIndex { index: usize, len: usize },

    /// A natural voicing sample file could not be read or parsed.
    #[error("unable to load voice samples: {0}")]
    VoiceSampleLoad(String),

    /// A positional parameter list had the wrong number of fields.
    #[error("expected {expected} synthesis parameters, found {found}")]
    ParameterCount { expected: usize, found: usize },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

/// Result type alias for rendering operations
pub type Result<T> = std::result::Result<T, Error>;
