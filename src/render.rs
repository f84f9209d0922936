//! Paragraph to waveform: segmentation, per-phoneme expansion and synthesis.

use crate::error::{Error, Result};
use crate::options::SynthesisOptions;
use crate::phonemes::{ClusterOutcome, lookup, resolve_cluster};
use crate::rules::{DiscourseContext, ExpandedSegment, LanguageProfile, RuleContext, apply_rules};
use crate::segmenter::{Segmenter, Sentence};
use crate::sources::VoiceSamples;
use crate::synthesizer::Synthesizer;
use log::{debug, trace};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Silence after every sentence, in milliseconds.
pub const SENTENCE_SILENCE_MS: f64 = 500.0;

/// Turns one word of `sentence` into the segments to synthesize, in order.
///
/// Cluster halves are merged and `<`/`>` duration multipliers applied. Each remaining phoneme
/// goes through the profile's universal rules, then every resulting segment goes through its
/// language rules.
///
/// # Errors
///
/// Returns [`Error::WordIndex`] if `word_index` is out of range and
/// [`Error::UnknownPhoneme`] for the first symbol with no table entry.
pub fn expand_word(
    profile: &LanguageProfile,
    sentence: &Sentence,
    word_index: usize,
) -> Result<Vec<ExpandedSegment>> {
    let word = sentence.words.get(word_index).ok_or(Error::WordIndex {
        index: word_index,
        len: sentence.words.len(),
    })?;
    let symbols: Vec<char> = word.phonemes.iter().map(|p| p.symbol).collect();
    let mut segments = Vec::with_capacity(symbols.len());
    for (i, phoneme) in word.phonemes.iter().enumerate() {
        let preceding = &symbols[..i];
        let following = &symbols[i + 1..];
        let (class, mut parameters) = match resolve_cluster(phoneme.symbol, preceding, following) {
            ClusterOutcome::Suppress => continue,
            ClusterOutcome::Override(cluster) => (cluster.class, cluster.parameters),
            ClusterOutcome::Unhandled => {
                let entry = lookup(phoneme.symbol)?;
                (entry.class, entry.parameters)
            }
        };
        parameters.scale_duration(phoneme.duration_multiplier);
        let context = RuleContext {
            symbol: phoneme.symbol,
            class,
            preceding,
            following,
            discourse: DiscourseContext {
                sentence,
                word_index,
            },
        };
        for shaped in apply_rules(&profile.universal_rules, &context, &[parameters]) {
            segments.extend(
                apply_rules(&profile.rules, &context, &[shaped.parameters])
                    .into_iter()
                    .map(|mut segment| {
                        segment.pitch_multiplier *= shaped.pitch_multiplier;
                        segment
                    }),
            );
        }
    }
    Ok(segments)
}

/// Renders transcriptions with one synthesizer, so noise continues from call to call.
pub struct Renderer<R> {
    synthesizer: Synthesizer<R>,
    profile: LanguageProfile,
}

impl Renderer<SmallRng> {
    /// A renderer whose noise is seeded from `options.seed`.
    #[must_use]
    pub fn new(options: SynthesisOptions, voice: VoiceSamples) -> Self {
        let rng = SmallRng::seed_from_u64(options.seed);
        Self::with_rng(options, voice, rng)
    }
}

impl<R: Rng> Renderer<R> {
    pub fn with_rng(options: SynthesisOptions, voice: VoiceSamples, rng: R) -> Self {
        Renderer {
            synthesizer: Synthesizer::new(options, voice, rng),
            profile: LanguageProfile::canadian_english(),
        }
    }

    #[must_use]
    pub fn with_profile(mut self, profile: LanguageProfile) -> Self {
        self.profile = profile;
        self
    }

    #[must_use]
    pub fn options(&self) -> &SynthesisOptions {
        self.synthesizer.options()
    }

    /// Renders every sentence of `paragraph`, each followed by [`SENTENCE_SILENCE_MS`].
    ///
    /// # Errors
    ///
    /// Stops at the first malformed token or unknown phoneme.
    pub fn render_paragraph(&mut self, paragraph: &str) -> Result<Vec<i16>> {
        debug!("rendering paragraph {paragraph:?}");
        let mut samples = Vec::new();
        for sentence in Segmenter::new(paragraph) {
            let sentence = sentence?;
            samples.extend(self.render_sentence(&sentence)?);
            samples.extend(self.synthesizer.generate_silence(SENTENCE_SILENCE_MS));
        }
        Ok(samples)
    }

    /// Renders one sentence, including pauses after its words but no trailing silence.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownPhoneme`] if a word uses a symbol with no table entry.
    pub fn render_sentence(&mut self, sentence: &Sentence) -> Result<Vec<i16>> {
        debug!(
            "sentence of {} words, {:?}",
            sentence.words.len(),
            sentence.markup
        );
        let mut samples = Vec::new();
        for (word_index, word) in sentence.words.iter().enumerate() {
            let segments = expand_word(&self.profile, sentence, word_index)?;
            trace!("word {:?}: {} segments", word.symbols(), segments.len());
            self.synthesizer.begin_word();
            for segment in &segments {
                samples.extend(
                    self.synthesizer
                        .synthesize(&segment.parameters, segment.pitch_multiplier),
                );
            }
            if let Some(pause) = word.pause {
                samples.extend(self.synthesizer.generate_silence(pause.duration_ms()));
            }
        }
        Ok(samples)
    }
}
