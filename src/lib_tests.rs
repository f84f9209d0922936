#![cfg(test)]

use super::{LanguageProfile, Renderer, SynthesisOptions, VoiceSamples, expand_word};
use crate::segmenter::segment_paragraph;

fn renderer() -> Renderer<rand::rngs::SmallRng> {
    Renderer::new(SynthesisOptions::default(), VoiceSamples::default())
}

#[test]
fn aspirated_word_has_expected_length() {
    let sentence = segment_paragraph("pʰæt.").unwrap().remove(0);
    let samples = renderer().render_sentence(&sentence).unwrap();
    // p 50 + ʰ 30 + æ 200 + t 25 ms at 16 samples per ms
    assert_eq!(samples.len(), 305 * 16);
    assert!(samples.iter().any(|s| *s != 0));
}

#[test]
fn question_changes_pitch_not_length() {
    let profile = LanguageProfile::canadian_english();
    let statement = segment_paragraph("ɪz ɪt.").unwrap().remove(0);
    let question = segment_paragraph("ɪz ɪt?").unwrap().remove(0);
    let flat = expand_word(&profile, &statement, 1).unwrap();
    let rising = expand_word(&profile, &question, 1).unwrap();
    assert_eq!(flat.len(), rising.len());
    for (a, b) in flat.iter().zip(&rising) {
        assert_eq!(a.parameters, b.parameters);
        assert_eq!(a.pitch_multiplier, 1.0);
        assert_eq!(b.pitch_multiplier, 0.8);
    }
}

#[test]
fn rendering_is_reproducible() {
    let text = "*sɪks* \"ʃips,\" 'θɹi: fɪʃ?!";
    let a = renderer().render_paragraph(text).unwrap();
    let b = renderer().render_paragraph(text).unwrap();
    assert_eq!(a, b);

    let reseeded = Renderer::new(
        SynthesisOptions {
            seed: 99,
            ..SynthesisOptions::default()
        },
        VoiceSamples::default(),
    )
    .render_paragraph(text)
    .unwrap();
    assert_eq!(reseeded.len(), a.len());
    assert_ne!(reseeded, a);
}
