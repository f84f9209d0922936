//! The phoneme table: IPA symbol to synthesis parameters, plus two-symbol clusters.
//!
//! The table is built once, on first use, and never mutated afterwards.

use crate::error::{Error, Result};
use crate::parameters::ParameterVector;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Place of articulation for consonants, tongue position for vowels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Region {
    Labial,
    Coronal,
    Dorsal,
    Radical,
    Glottal,
    Front,
    NearFront,
    Central,
    NearBack,
    Back,
}

/// Broad class of a phoneme, as far as the prosodic rules care.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhonemeClass {
    Vowel,
    Nasal,
    Consonant,
}

/// One entry of the phoneme table.
#[derive(Clone, Debug, PartialEq)]
pub struct PhonemeEntry {
    pub symbol: char,
    pub class: PhonemeClass,
    pub voiced: bool,
    pub regions: &'static [Region],
    pub parameters: ParameterVector,
}

impl PhonemeEntry {
    #[must_use]
    pub fn is_vowel(&self) -> bool {
        self.class == PhonemeClass::Vowel
    }

    #[must_use]
    pub fn is_nasal(&self) -> bool {
        self.class == PhonemeClass::Nasal
    }
}

/// A two-symbol sequence that is synthesized as a single sound.
///
/// The first symbol contributes nothing; the second carries the cluster's parameters, so
/// markup written after the cluster applies to the whole sound.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterRule {
    pub first: char,
    pub second: char,
    pub class: PhonemeClass,
    pub regions: &'static [Region],
    pub parameters: ParameterVector,
}

/// What to do with a symbol, given its neighbours.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClusterOutcome {
    /// Not part of a cluster: use the table entry.
    Unhandled,
    /// First half of a cluster: produces no sound.
    Suppress,
    /// Second half of a cluster: use the cluster's parameters.
    Override(&'static ClusterRule),
}

use PhonemeClass::{Consonant, Nasal, Vowel};
use Region::{Back, Central, Coronal, Dorsal, Front, Glottal, Labial, NearBack, NearFront};

/// `[bypass, cascade (aspiration), parallel (frication), voicing, voicing sine]`
type SourceGains = [f64; 5];

/// symbol, class, voiced, regions, F1-F3, B1-B3, parallel gains F2-F6, source gains, duration
type Row = (
    char,
    PhonemeClass,
    bool,
    &'static [Region],
    [f64; 3],
    [f64; 3],
    [f64; 5],
    SourceGains,
    f64,
);

const SILENT: [f64; 5] = [0.0; 5];

#[rustfmt::skip]
const ROWS: &[Row] = &[
    // nasals
    ('m', Nasal, true, &[Labial], [480.0, 1270.0, 2130.0], [40.0, 200.0, 200.0], SILENT, [0.0, 0.0, 0.0, 40.0, 50.0], 75.0),
    ('n', Nasal, true, &[Coronal], [480.0, 1340.0, 2470.0], [40.0, 300.0, 300.0], SILENT, [0.0, 0.0, 0.0, 40.0, 50.0], 75.0),
    ('ŋ', Nasal, true, &[Dorsal], [480.0, 2000.0, 2900.0], [40.0, 300.0, 300.0], SILENT, [0.0, 0.0, 0.0, 40.0, 50.0], 75.0),
    // stops and flap
    ('p', Consonant, false, &[Labial], [400.0, 1100.0, 2150.0], [300.0, 150.0, 220.0], SILENT, [63.0, 0.0, 20.0, 0.0, 0.0], 50.0),
    ('b', Consonant, true, &[Labial], [200.0, 1100.0, 2150.0], [60.0, 100.0, 130.0], SILENT, [63.0, 0.0, 10.0, 20.0, 20.0], 50.0),
    ('t', Consonant, false, &[Coronal], [400.0, 1600.0, 2600.0], [300.0, 120.0, 250.0], [0.0, 15.0, 23.0, 28.0, 32.0], [0.0, 0.0, 20.0, 0.0, 0.0], 25.0),
    ('d', Consonant, true, &[Coronal], [200.0, 1600.0, 2600.0], [60.0, 100.0, 170.0], [0.0, 23.0, 30.0, 31.0, 30.0], [0.0, 0.0, 10.0, 20.0, 20.0], 25.0),
    ('ɾ', Consonant, true, &[Coronal], [300.0, 1600.0, 2600.0], [160.0, 110.0, 210.0], [0.0, 19.0, 26.0, 30.0, 31.0], [0.0, 0.0, 15.0, 10.0, 10.0], 25.0),
    ('k', Consonant, false, &[Dorsal], [300.0, 1990.0, 2850.0], [250.0, 160.0, 330.0], [30.0, 26.0, 22.0, 23.0, 23.0], [0.0, 0.0, 20.0, 0.0, 0.0], 25.0),
    ('g', Consonant, true, &[Dorsal], [200.0, 1990.0, 2850.0], [60.0, 150.0, 280.0], [30.0, 27.0, 22.0, 23.0, 23.0], [0.0, 0.0, 10.0, 20.0, 20.0], 25.0),
    // fricatives
    ('f', Consonant, false, &[Labial], [340.0, 1100.0, 2080.0], [200.0, 120.0, 150.0], SILENT, [57.0, 0.0, 20.0, 0.0, 0.0], 50.0),
    ('v', Consonant, true, &[Labial], [220.0, 1100.0, 2080.0], [60.0, 90.0, 120.0], SILENT, [57.0, 0.0, 20.0, 47.0, 47.0], 50.0),
    ('θ', Consonant, false, &[Coronal], [320.0, 1290.0, 2540.0], [200.0, 90.0, 200.0], [0.0, 0.0, 0.0, 0.0, 28.0], [38.0, 0.0, 20.0, 0.0, 0.0], 50.0),
    ('ð', Consonant, true, &[Coronal], [270.0, 1290.0, 2540.0], [60.0, 80.0, 170.0], [0.0, 0.0, 0.0, 0.0, 28.0], [38.0, 0.0, 20.0, 47.0, 47.0], 50.0),
    ('s', Consonant, false, &[Coronal], [320.0, 1390.0, 2530.0], [200.0, 80.0, 200.0], [0.0, 0.0, 0.0, 0.0, 52.0], [0.0, 0.0, 20.0, 0.0, 0.0], 50.0),
    ('z', Consonant, true, &[Coronal], [240.0, 1390.0, 2530.0], [70.0, 60.0, 180.0], [0.0, 0.0, 0.0, 0.0, 52.0], [0.0, 0.0, 20.0, 47.0, 47.0], 65.0),
    ('ʃ', Consonant, false, &[Coronal], [300.0, 1840.0, 2750.0], [200.0, 100.0, 300.0], [0.0, 28.0, 24.0, 24.0, 23.0], [0.0, 0.0, 20.0, 0.0, 0.0], 75.0),
    ('ʒ', Consonant, true, &[Coronal], [300.0, 1840.0, 2750.0], [70.0, 60.0, 280.0], [0.0, 28.0, 24.0, 24.0, 23.0], [0.0, 0.0, 20.0, 47.0, 47.0], 75.0),
    ('h', Consonant, false, &[Glottal], [50.0, 75.0, 100.0], [60.0, 90.0, 120.0], SILENT, [0.0, 0.0, 0.0, 25.0, 0.0], 50.0),
    ('ʰ', Consonant, false, &[Glottal], [500.0, 1500.0, 2500.0], [200.0, 150.0, 250.0], SILENT, [0.0, 40.0, 0.0, 0.0, 0.0], 30.0),
    ('ʔ', Consonant, false, &[Glottal], [400.0, 1500.0, 2500.0], [60.0, 90.0, 120.0], SILENT, [0.0, 0.0, 0.0, 0.0, 0.0], 50.0),
    // approximants
    ('ɹ', Consonant, true, &[Coronal], [310.0, 1060.0, 1380.0], [70.0, 100.0, 120.0], SILENT, [0.0, 0.0, 0.0, 50.0, 0.0], 100.0),
    ('j', Consonant, true, &[Dorsal], [260.0, 2070.0, 3020.0], [40.0, 250.0, 500.0], SILENT, [0.0, 0.0, 0.0, 50.0, 0.0], 50.0),
    ('l', Consonant, true, &[Coronal], [310.0, 1050.0, 2880.0], [50.0, 100.0, 280.0], SILENT, [0.0, 0.0, 0.0, 50.0, 0.0], 100.0),
    ('w', Consonant, true, &[Labial, Dorsal], [290.0, 610.0, 2150.0], [50.0, 80.0, 60.0], SILENT, [0.0, 0.0, 0.0, 50.0, 0.0], 65.0),
    ('ʍ', Consonant, false, &[Labial, Dorsal], [290.0, 610.0, 2150.0], [50.0, 80.0, 60.0], SILENT, [0.0, 40.0, 10.0, 0.0, 0.0], 65.0),
    // vowels
    ('i', Vowel, true, &[Front], [310.0, 2020.0, 2960.0], [45.0, 200.0, 400.0], SILENT, [0.0, 0.0, 0.0, 60.0, 0.0], 150.0),
    ('e', Vowel, true, &[Front], [480.0, 1720.0, 2520.0], [70.0, 100.0, 200.0], SILENT, [0.0, 0.0, 0.0, 60.0, 0.0], 150.0),
    ('ɛ', Vowel, true, &[NearFront], [530.0, 1680.0, 2500.0], [60.0, 90.0, 200.0], SILENT, [0.0, 0.0, 0.0, 60.0, 0.0], 125.0),
    ('æ', Vowel, true, &[NearFront], [620.0, 1660.0, 2430.0], [70.0, 150.0, 320.0], SILENT, [0.0, 0.0, 0.0, 60.0, 0.0], 200.0),
    ('a', Vowel, true, &[Central], [700.0, 1220.0, 2600.0], [130.0, 70.0, 160.0], SILENT, [0.0, 0.0, 0.0, 60.0, 0.0], 175.0),
    ('I', Vowel, true, &[NearFront], [400.0, 1800.0, 2570.0], [50.0, 100.0, 140.0], SILENT, [0.0, 0.0, 0.0, 60.0, 0.0], 150.0),
    ('ɪ', Vowel, true, &[NearFront], [400.0, 1800.0, 2570.0], [50.0, 100.0, 140.0], SILENT, [0.0, 0.0, 0.0, 60.0, 0.0], 150.0),
    ('ə', Vowel, true, &[Central], [500.0, 1400.0, 2300.0], [100.0, 60.0, 110.0], SILENT, [0.0, 0.0, 0.0, 50.0, 0.0], 125.0),
    ('ʊ', Vowel, true, &[NearBack], [450.0, 1100.0, 2350.0], [80.0, 100.0, 80.0], SILENT, [0.0, 0.0, 0.0, 60.0, 0.0], 125.0),
    ('u', Vowel, true, &[Back], [350.0, 1250.0, 2200.0], [65.0, 110.0, 140.0], SILENT, [0.0, 0.0, 0.0, 60.0, 0.0], 150.0),
    ('o', Vowel, true, &[Back], [540.0, 1100.0, 2300.0], [80.0, 70.0, 70.0], SILENT, [0.0, 0.0, 0.0, 60.0, 0.0], 150.0),
    ('ʌ', Vowel, true, &[Back], [620.0, 1220.0, 2550.0], [80.0, 50.0, 140.0], SILENT, [0.0, 0.0, 0.0, 60.0, 0.0], 100.0),
    ('ɔ', Vowel, true, &[Back], [600.0, 990.0, 2570.0], [90.0, 100.0, 80.0], SILENT, [0.0, 0.0, 0.0, 60.0, 0.0], 150.0),
];

/// first, second, class, regions, F1-F3, B1-B3, parallel gains F2-F6, source gains, duration
type ClusterRow = (
    char,
    char,
    PhonemeClass,
    &'static [Region],
    [f64; 3],
    [f64; 3],
    [f64; 5],
    SourceGains,
    f64,
);

#[rustfmt::skip]
const CLUSTER_ROWS: &[ClusterRow] = &[
    ('d', 'ʒ', Consonant, &[Coronal], [260.0, 1800.0, 2820.0], [60.0, 80.0, 270.0], [0.0, 22.0, 30.0, 26.0, 26.0], [0.0, 0.0, 10.0, 37.0, 37.0], 100.0),
    ('t', 'ʃ', Consonant, &[Coronal], [350.0, 1800.0, 2820.0], [200.0, 90.0, 300.0], [0.0, 22.0, 30.0, 26.0, 26.0], [0.0, 0.0, 10.0, 0.0, 0.0], 100.0),
    ('a', 'j', Vowel, &[Central, Front], [660.0, 1200.0, 2550.0], [100.0, 70.0, 200.0], SILENT, [0.0, 0.0, 0.0, 60.0, 0.0], 150.0),
    ('a', 'w', Vowel, &[Central, Back], [640.0, 1230.0, 2550.0], [80.0, 70.0, 140.0], SILENT, [0.0, 0.0, 0.0, 60.0, 0.0], 150.0),
    ('ɔ', 'j', Vowel, &[Back, Front], [550.0, 960.0, 2400.0], [80.0, 50.0, 130.0], SILENT, [0.0, 0.0, 0.0, 60.0, 0.0], 150.0),
];

/// Expands the varying columns of a row into a full parameter set.
/// Glottal settings, upper formants and their bandwidths are shared by every sound.
fn build_parameters(
    class: PhonemeClass,
    formants: [f64; 3],
    bandwidths: [f64; 3],
    formant_gain: [f64; 5],
    sources: SourceGains,
    duration_ms: f64,
) -> ParameterVector {
    let (nasal_pole_freq, nasal_zero_freq) = if class == Nasal {
        (270.0, 450.0)
    } else {
        (250.0, 250.0)
    };
    let [bypass_gain, cascade_gain, parallel_gain, voicing_gain, voicing_sine_gain] = sources;
    ParameterVector {
        glottal_pole_freq: 0.0,
        glottal_zero_freq: 1500.0,
        glottal_sine_freq: 0.0,
        nasal_pole_freq,
        nasal_zero_freq,
        formant_freq: [formants[0], formants[1], formants[2], 3300.0, 3750.0, 4900.0],
        glottal_pole_bw: 100.0,
        glottal_zero_bw: 6000.0,
        glottal_sine_bw: 100.0,
        nasal_pole_bw: 100.0,
        nasal_zero_bw: 100.0,
        formant_bw: [bandwidths[0], bandwidths[1], bandwidths[2], 250.0, 200.0, 1000.0],
        formant_gain,
        bypass_gain,
        cascade_gain,
        parallel_gain,
        voicing_gain,
        voicing_sine_gain,
        duration_ms,
    }
}

static PHONEMES: Lazy<HashMap<char, PhonemeEntry>> = Lazy::new(|| {
    ROWS.iter()
        .map(
            |&(symbol, class, voiced, regions, formants, bandwidths, gains, sources, duration)| {
                let entry = PhonemeEntry {
                    symbol,
                    class,
                    voiced,
                    regions,
                    parameters: build_parameters(
                        class, formants, bandwidths, gains, sources, duration,
                    ),
                };
                (symbol, entry)
            },
        )
        .collect()
});

static CLUSTERS: Lazy<Vec<ClusterRule>> = Lazy::new(|| {
    CLUSTER_ROWS
        .iter()
        .map(
            |&(first, second, class, regions, formants, bandwidths, gains, sources, duration)| {
                ClusterRule {
                    first,
                    second,
                    class,
                    regions,
                    parameters: build_parameters(
                        class, formants, bandwidths, gains, sources, duration,
                    ),
                }
            },
        )
        .collect()
});

/// Looks up a symbol in the phoneme table.
///
/// # Errors
///
/// Returns [`Error::UnknownPhoneme`] if the symbol has no table entry.
pub fn lookup(symbol: char) -> Result<&'static PhonemeEntry> {
    PHONEMES.get(&symbol).ok_or(Error::UnknownPhoneme(symbol))
}

/// All table entries, in no particular order.
pub fn entries() -> impl Iterator<Item = &'static PhonemeEntry> {
    PHONEMES.values()
}

/// Cluster definitions, in precedence order.
#[must_use]
pub fn clusters() -> &'static [ClusterRule] {
    &CLUSTERS
}

/// Decides whether `symbol` takes part in a cluster with its immediate neighbours.
///
/// `preceding` and `following` are the other symbols of the same word, in order.
/// The first matching cluster definition wins.
#[must_use]
pub fn resolve_cluster(symbol: char, preceding: &[char], following: &[char]) -> ClusterOutcome {
    for rule in clusters() {
        if rule.first == symbol && following.first() == Some(&rule.second) {
            return ClusterOutcome::Suppress;
        }
        if rule.second == symbol && preceding.last() == Some(&rule.first) {
            return ClusterOutcome::Override(rule);
        }
    }
    ClusterOutcome::Unhandled
}
