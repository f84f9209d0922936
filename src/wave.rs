//! 16-bit mono WAV output.

use crate::error::{Error, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use log::debug;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

/// A WAV file that samples are appended to until [`WaveSink::close`].
pub struct WaveSink {
    writer: Option<WavWriter<BufWriter<File>>>,
    written: usize,
}

impl WaveSink {
    /// Creates (or truncates) `path` as a mono 16-bit PCM file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Wav`] if the file cannot be created.
    pub fn create(path: &Path, sample_rate: u32) -> Result<Self> {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let writer = WavWriter::create(path, spec)?;
        Ok(WaveSink {
            writer: Some(writer),
            written: 0,
        })
    }

    /// # Errors
    ///
    /// Returns [`Error::Io`] once the sink has been closed, [`Error::Wav`] on write failure.
    pub fn add_samples(&mut self, samples: &[i16]) -> Result<()> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            Error::Io(io::Error::other("the waveform has already been finalized"))
        })?;
        let mut i16_writer = writer.get_i16_writer(samples.len() as u32);
        for sample in samples {
            i16_writer.write_sample(*sample);
        }
        i16_writer.flush()?;
        self.written += samples.len();
        Ok(())
    }

    /// Number of samples written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.written
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.written == 0
    }

    /// Writes the header and closes the file. Closing twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Wav`] if the header cannot be written.
    pub fn close(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            writer.finalize()?;
            debug!("finalized waveform with {} samples", self.written);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::WaveSink;
    use crate::error::Error;

    #[test]
    fn closed_sink_rejects_samples() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = WaveSink::create(&dir.path().join("out.wav"), 16000).unwrap();
        sink.add_samples(&[1, -1]).unwrap();
        assert_eq!(sink.len(), 2);
        sink.close().unwrap();
        sink.close().unwrap();
        assert!(matches!(sink.add_samples(&[0]), Err(Error::Io(_))));
    }
}
