//! Prosodic rules that reshape a phoneme's parameters in context.
//!
//! A rule sees one phoneme together with its word and sentence, may edit the phoneme's
//! parameters, and may ask for extra segments before or after it plus a pitch change.
//! [`apply_rules`] runs an ordered chain of rules and lays the results out in time.

use crate::parameters::ParameterVector;
use crate::phonemes::{PhonemeClass, lookup};
use crate::segmenter::{Sentence, Word};
use log::trace;

/// Where a phoneme sits in its sentence.
#[derive(Clone, Copy, Debug)]
pub struct DiscourseContext<'a> {
    pub sentence: &'a Sentence,
    pub word_index: usize,
}

impl<'a> DiscourseContext<'a> {
    /// The current word, or `None` if `word_index` is past the end of the sentence.
    #[must_use]
    pub fn word(&self) -> Option<&'a Word> {
        self.sentence.words.get(self.word_index)
    }

    /// Words after the current one in the sentence.
    #[must_use]
    pub fn remaining_words(&self) -> usize {
        self.sentence.words.len().saturating_sub(self.word_index + 1)
    }
}

/// Everything a rule may inspect about the phoneme being expanded.
#[derive(Clone, Copy, Debug)]
pub struct RuleContext<'a> {
    pub symbol: char,
    pub class: PhonemeClass,
    /// symbols before this one in the same word
    pub preceding: &'a [char],
    /// symbols after this one in the same word
    pub following: &'a [char],
    pub discourse: DiscourseContext<'a>,
}

/// What a rule adds around the phoneme.
#[derive(Clone, Debug, PartialEq)]
pub struct RuleOutcome {
    pub preceding: Vec<ParameterVector>,
    pub following: Vec<ParameterVector>,
    /// >1.0 lowers the pitch, <1.0 raises it
    pub pitch_multiplier: f64,
}

impl RuleOutcome {
    #[must_use]
    pub fn identity() -> Self {
        RuleOutcome {
            preceding: Vec::new(),
            following: Vec::new(),
            pitch_multiplier: 1.0,
        }
    }

    #[must_use]
    pub fn pitch(pitch_multiplier: f64) -> Self {
        RuleOutcome {
            pitch_multiplier,
            ..Self::identity()
        }
    }
}

pub trait PhonemeRule {
    /// Applies the rule to `parameters`, the phoneme's working copy.
    /// Rules never fail; a rule that does not match returns [`RuleOutcome::identity`].
    fn apply(&self, context: &RuleContext<'_>, parameters: &mut ParameterVector) -> RuleOutcome;
}

/// One parameter set ready for the synthesizer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExpandedSegment {
    pub parameters: ParameterVector,
    pub pitch_multiplier: f64,
}

/// Runs `rules` in order over each of `vectors`.
///
/// Insertions before the phoneme keep rule order, insertions after it are laid out in
/// reverse rule order (the last rule's closest to the phoneme), and every resulting segment
/// shares the product of the rules' pitch multipliers. The input is not modified.
pub fn apply_rules<T: PhonemeRule>(
    rules: &[T],
    context: &RuleContext<'_>,
    vectors: &[ParameterVector],
) -> Vec<ExpandedSegment> {
    let mut segments = Vec::with_capacity(vectors.len());
    for vector in vectors {
        let mut center = *vector;
        let mut preceding = Vec::new();
        let mut following = Vec::new();
        let mut pitch_multiplier = 1.0;
        for rule in rules {
            let outcome = rule.apply(context, &mut center);
            preceding.extend(outcome.preceding);
            following = outcome.following.into_iter().chain(following).collect();
            pitch_multiplier *= outcome.pitch_multiplier;
        }
        center.set_duration(center.duration_ms);
        trace!(
            "'{}': {} before, {} after, pitch x{pitch_multiplier}",
            context.symbol,
            preceding.len(),
            following.len()
        );
        segments.extend(
            preceding
                .into_iter()
                .chain(std::iter::once(center))
                .chain(following)
                .map(|parameters| ExpandedSegment {
                    parameters,
                    pitch_multiplier,
                }),
        );
    }
    segments
}

/// The built-in rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    /// Blend a vowel into a following nasal.
    VowelNasalization,
    /// Fall or rise in pitch at the end of a question.
    QuestionIntonation,
    /// Stretch and raise content words.
    ContentEmphasis,
}

impl PhonemeRule for Rule {
    fn apply(&self, context: &RuleContext<'_>, parameters: &mut ParameterVector) -> RuleOutcome {
        match self {
            Rule::VowelNasalization => nasalize_vowel(context, parameters),
            Rule::QuestionIntonation => inflect_question(context),
            Rule::ContentEmphasis => amplify_content(context, parameters),
        }
    }
}

/// Shortest a vowel gets when nasalized, in milliseconds.
const NASALIZED_VOWEL_MIN_MS: f64 = 50.0;
/// Time taken from a vowel ahead of a nasal, in milliseconds.
const NASALIZATION_MS: f64 = 50.0;
/// Below this much transition time only the fully nasalized step is inserted.
const HALF_STEP_MIN_MS: f64 = 20.0;

fn nasalize_vowel(context: &RuleContext<'_>, parameters: &mut ParameterVector) -> RuleOutcome {
    if context.class != PhonemeClass::Vowel {
        return RuleOutcome::identity();
    }
    let Some(nasal) = context
        .following
        .first()
        .and_then(|symbol| lookup(*symbol).ok())
        .filter(|entry| entry.is_nasal())
    else {
        return RuleOutcome::identity();
    };

    let duration = parameters.duration_ms;
    let shortened = duration.min((duration - NASALIZATION_MS).max(NASALIZED_VOWEL_MIN_MS));
    let saved = duration - shortened;
    if saved <= 0.0 {
        return RuleOutcome::identity();
    }

    let vowel = *parameters;
    let step = |blend: f64, formant_shift: f64, b2: f64, b3: f64, duration_ms: f64| {
        let mut p = vowel;
        let target = &nasal.parameters;
        p.nasal_pole_freq += (target.nasal_pole_freq - vowel.nasal_pole_freq) * blend;
        p.nasal_zero_freq += (target.nasal_zero_freq - vowel.nasal_zero_freq) * blend;
        for f in &mut p.formant_freq[..3] {
            *f += formant_shift;
        }
        p.formant_bw[0] = (p.formant_bw[0] - 10.0).min(40.0);
        p.formant_bw[1] *= b2;
        p.formant_bw[2] = (p.formant_bw[2] * b3).max(300.0);
        p.voicing_gain = 50.0;
        p.voicing_sine_gain = 30.0;
        p.set_duration(duration_ms);
        p
    };

    parameters.set_duration(shortened);
    let following = if saved < HALF_STEP_MIN_MS {
        vec![step(1.0, 100.0, 1.25, 1.5, saved)]
    } else {
        vec![
            step(0.5, 50.0, 1.125, 1.25, saved / 2.0),
            step(1.0, 100.0, 1.25, 1.5, saved / 2.0),
        ]
    };
    RuleOutcome {
        following,
        ..RuleOutcome::identity()
    }
}

/// "would", the one w-initial question opener that rises like a yes/no question.
const WOULD: &str = "wʊd";

fn inflect_question(context: &RuleContext<'_>) -> RuleOutcome {
    let discourse = &context.discourse;
    let remaining = discourse.remaining_words();
    if !discourse.sentence.markup.question || remaining > 1 {
        return RuleOutcome::identity();
    }
    // The opener may be the current word, so a lone "wʌt?" falls rather than rises.
    let opener = discourse
        .sentence
        .words
        .first()
        .map(Word::symbols)
        .unwrap_or_default();
    if opener.starts_with('w') && opener != WOULD {
        // wh-question: pitch falls over the last two words
        return RuleOutcome::pitch(if remaining == 1 { 1.1 } else { 1.2 });
    }
    if remaining == 0 {
        return RuleOutcome::pitch(0.8);
    }
    RuleOutcome::identity()
}

fn amplify_content(context: &RuleContext<'_>, parameters: &mut ParameterVector) -> RuleOutcome {
    if !context.discourse.word().is_some_and(|word| word.markup.content) {
        return RuleOutcome::identity();
    }
    parameters.formant_freq[0] *= 1.25;
    if context.class == PhonemeClass::Vowel {
        parameters.scale_duration(1.05);
        return RuleOutcome::pitch(0.95);
    }
    RuleOutcome::identity()
}

/// A named pair of rule chains.
///
/// `universal_rules` run first on each phoneme. `rules` then run on every segment the
/// universal chain produced, insertions included.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LanguageProfile {
    pub name: &'static str,
    pub universal_rules: Vec<Rule>,
    pub rules: Vec<Rule>,
}

impl LanguageProfile {
    #[must_use]
    pub fn canadian_english() -> Self {
        LanguageProfile {
            name: "en-CA",
            universal_rules: vec![Rule::VowelNasalization],
            rules: vec![Rule::QuestionIntonation, Rule::ContentEmphasis],
        }
    }
}

impl Default for LanguageProfile {
    fn default() -> Self {
        Self::canadian_english()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DiscourseContext, ExpandedSegment, PhonemeRule, Rule, RuleContext, RuleOutcome,
        apply_rules,
    };
    use crate::parameters::ParameterVector;
    use crate::phonemes::{PhonemeClass, lookup};
    use crate::segmenter::{Sentence, segment_paragraph};

    fn sentence(text: &str) -> Sentence {
        segment_paragraph(text).unwrap().remove(0)
    }

    fn context<'a>(
        sentence: &'a Sentence,
        word_index: usize,
        symbols: &'a [char],
        index: usize,
    ) -> RuleContext<'a> {
        let symbol = symbols[index];
        RuleContext {
            symbol,
            class: lookup(symbol).unwrap().class,
            preceding: &symbols[..index],
            following: &symbols[index + 1..],
            discourse: DiscourseContext {
                sentence,
                word_index,
            },
        }
    }

    fn expand(rule: Rule, ctx: &RuleContext<'_>, parameters: ParameterVector) -> Vec<ExpandedSegment> {
        apply_rules(&[rule], ctx, &[parameters])
    }

    fn durations(segments: &[ExpandedSegment]) -> Vec<f64> {
        segments.iter().map(|s| s.parameters.duration_ms).collect()
    }

    #[test]
    fn nasalization_leaves_other_contexts_alone() {
        let s = sentence("pæt.");
        let symbols = ['p', 'æ', 't'];
        for index in 0..symbols.len() {
            let ctx = context(&s, 0, &symbols, index);
            let input = lookup(symbols[index]).unwrap().parameters;
            let out = expand(Rule::VowelNasalization, &ctx, input);
            assert_eq!(
                out,
                vec![ExpandedSegment {
                    parameters: input,
                    pitch_multiplier: 1.0
                }]
            );
        }
    }

    #[test]
    fn nasalization_blends_into_the_nasal() {
        let s = sentence("pæn.");
        let symbols = ['p', 'æ', 'n'];
        let ctx = context(&s, 0, &symbols, 1);
        let vowel = lookup('æ').unwrap().parameters;
        let out = expand(Rule::VowelNasalization, &ctx, vowel);
        assert_eq!(durations(&out), vec![150.0, 25.0, 25.0]);

        let (half, full) = (&out[1].parameters, &out[2].parameters);
        assert_eq!(half.nasal_pole_freq, 260.0);
        assert_eq!(half.nasal_zero_freq, 350.0);
        assert_eq!(full.nasal_pole_freq, 270.0);
        assert_eq!(full.nasal_zero_freq, 450.0);
        assert_eq!(half.formant_freq[0], vowel.formant_freq[0] + 50.0);
        assert_eq!(full.formant_freq[2], vowel.formant_freq[2] + 100.0);
        assert_eq!(full.formant_freq[3], vowel.formant_freq[3]);
        assert_eq!(half.formant_bw[0], 40.0);
        assert_eq!(full.formant_bw[1], vowel.formant_bw[1] * 1.25);
        assert_eq!(half.formant_bw[2], 400.0);
        assert_eq!(full.formant_bw[2], 480.0);
        assert_eq!((full.voicing_gain, full.voicing_sine_gain), (50.0, 30.0));
        assert_eq!(out[0].parameters.nasal_pole_freq, vowel.nasal_pole_freq);
    }

    #[test]
    fn short_vowels_get_a_single_nasal_step() {
        let s = sentence("æn.");
        let symbols = ['æ', 'n'];
        let ctx = context(&s, 0, &symbols, 0);
        let mut vowel = lookup('æ').unwrap().parameters;

        vowel.set_duration(60.0);
        let out = expand(Rule::VowelNasalization, &ctx, vowel);
        assert_eq!(durations(&out), vec![50.0, 10.0]);
        assert_eq!(out[1].parameters.nasal_pole_freq, 270.0);

        vowel.set_duration(40.0);
        let out = expand(Rule::VowelNasalization, &ctx, vowel);
        assert_eq!(durations(&out), vec![40.0]);
    }

    /// Brackets the phoneme with a marker segment on each side.
    struct Bracket(f64);

    impl PhonemeRule for Bracket {
        fn apply(&self, _: &RuleContext<'_>, _: &mut ParameterVector) -> RuleOutcome {
            let mut marker = lookup('ʔ').unwrap().parameters;
            marker.set_duration(self.0);
            RuleOutcome {
                preceding: vec![marker],
                following: vec![marker],
                pitch_multiplier: 2.0,
            }
        }
    }

    #[test]
    fn insertions_nest_around_the_center() {
        let s = sentence("a.");
        let symbols = ['a'];
        let ctx = context(&s, 0, &symbols, 0);
        let center = lookup('a').unwrap().parameters;
        let out = apply_rules(&[Bracket(1.0), Bracket(2.0)], &ctx, &[center]);
        assert_eq!(durations(&out), vec![1.0, 2.0, 175.0, 2.0, 1.0]);
        assert!(out.iter().all(|s| s.pitch_multiplier == 4.0));
        assert_eq!(out[2].parameters, center);
    }

    fn question_pitch(text: &str) -> Vec<f64> {
        let s = sentence(text);
        (0..s.words.len())
            .map(|word_index| {
                let symbols: Vec<char> = s.words[word_index].symbols().chars().collect();
                let ctx = context(&s, word_index, &symbols, 0);
                let p = lookup(symbols[0]).unwrap().parameters;
                expand(Rule::QuestionIntonation, &ctx, p)[0].pitch_multiplier
            })
            .collect()
    }

    #[test]
    fn wh_questions_fall() {
        assert_eq!(question_pitch("wɛɹ ɪz ɪt?"), vec![1.0, 1.1, 1.2]);
        assert_eq!(question_pitch("wʌt?"), vec![1.2]);
    }

    #[test]
    fn other_questions_rise() {
        assert_eq!(question_pitch("ɪz ɪt ðɛɹ?"), vec![1.0, 1.0, 0.8]);
        assert_eq!(question_pitch("wʊd ju?"), vec![1.0, 0.8]);
    }

    #[test]
    fn statements_keep_their_pitch() {
        assert_eq!(question_pitch("wɛɹ ɪz ɪt."), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn content_words_are_stretched() {
        let s = sentence("'bɪg dɔg.");
        let symbols = ['b', 'ɪ', 'g'];

        let b = lookup('b').unwrap().parameters;
        let out = expand(Rule::ContentEmphasis, &context(&s, 0, &symbols, 0), b);
        assert_eq!(out[0].parameters.formant_freq[0], b.formant_freq[0] * 1.25);
        assert_eq!(out[0].parameters.duration_ms, b.duration_ms);
        assert_eq!(out[0].pitch_multiplier, 1.0);

        let vowel = lookup('ɪ').unwrap().parameters;
        let out = expand(Rule::ContentEmphasis, &context(&s, 0, &symbols, 1), vowel);
        assert_eq!(out[0].parameters.formant_freq[0], vowel.formant_freq[0] * 1.25);
        assert_eq!(out[0].parameters.duration_ms, vowel.duration_ms * 1.05);
        assert_eq!(out[0].pitch_multiplier, 0.95);

        let plain = ['d', 'ɔ', 'g'];
        let dog = lookup('ɔ').unwrap().parameters;
        let out = expand(Rule::ContentEmphasis, &context(&s, 1, &plain, 1), dog);
        assert_eq!(out[0].parameters, dog);
    }

    #[test]
    fn canadian_english_runs_in_order() {
        let profile = super::LanguageProfile::canadian_english();
        assert_eq!(profile.universal_rules, vec![Rule::VowelNasalization]);
        assert_eq!(
            profile.rules,
            vec![Rule::QuestionIntonation, Rule::ContentEmphasis]
        );
        assert_eq!(PhonemeClass::Vowel, lookup('æ').unwrap().class);
    }

    #[test]
    fn out_of_range_word_is_not_content() {
        let s = sentence("'bɪg.");
        let symbols = ['ɪ'];
        let ctx = context(&s, 3, &symbols, 0);
        assert!(ctx.discourse.word().is_none());
        let vowel = lookup('ɪ').unwrap().parameters;
        assert_eq!(expand(Rule::ContentEmphasis, &ctx, vowel)[0].parameters, vowel);
    }
}
