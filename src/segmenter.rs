//! Splits a paragraph of transcription tokens into sentences, words and phonemes.
//!
//! Each whitespace-separated token is one word:
//!
//! ```text
//!    [*|"|*"|"*]['] symbols-and-<>-modifiers [,|:] [*|"|*"|"*] [.|?|!|?!|!?]
//! ```
//!
//! A leading `"` or `*` opens a quoted or emphasized span, a trailing one closes it, and a
//! leading `'` marks the word alone as a content word. Terminal punctuation ends the sentence.

use crate::error::{Error, Result};
use log::trace;
use once_cell::sync::Lazy;
use regex::Regex;
use std::str::SplitWhitespace;

static TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(?P<lead>(?:\*"|"\*|\*|")?'?)(?P<body>[\p{Alphabetic}<>]+)(?P<pause>[,:])?(?P<trail>(?:\*"|"\*|\*|")?(?:\?!|!\?|\.|\?|!)?)$"#,
    )
    .expect("token grammar is a valid regular expression")
});

/// Duration factor applied by each `<` preceding a symbol.
pub const SHORTEN_FACTOR: f64 = 0.5;
/// Duration factor applied by each `>` preceding a symbol.
pub const LENGTHEN_FACTOR: f64 = 1.5;

/// One symbol of a word with its duration multiplier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Phoneme {
    pub symbol: char,
    pub duration_multiplier: f64,
}

/// Silence requested by punctuation after a word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pause {
    /// `,`
    Comma,
    /// `:`
    Colon,
}

impl Pause {
    #[must_use]
    pub fn duration_ms(self) -> f64 {
        match self {
            Pause::Comma => 250.0,
            Pause::Colon => 150.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WordMarkup {
    pub quoted: bool,
    pub emphasized: bool,
    pub content: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Word {
    pub phonemes: Vec<Phoneme>,
    pub markup: WordMarkup,
    pub pause: Option<Pause>,
}

impl Word {
    /// The word's symbols without duration markup.
    #[must_use]
    pub fn symbols(&self) -> String {
        self.phonemes.iter().map(|p| p.symbol).collect()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SentenceMarkup {
    pub question: bool,
    pub exclamation: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sentence {
    pub words: Vec<Word>,
    pub markup: SentenceMarkup,
}

/// Splits the symbol run of a token into phonemes.
///
/// `<` and `>` scale the duration of the next symbol and compound with each other.
///
/// # Errors
///
/// Returns [`Error::MalformedToken`] if the run has no symbols or ends in a modifier.
pub fn parse_phonemes(body: &str) -> Result<Vec<Phoneme>> {
    let mut phonemes = Vec::with_capacity(body.len());
    let mut multiplier = 1.0;
    let mut pending = false;
    for c in body.chars() {
        match c {
            '<' => {
                multiplier *= SHORTEN_FACTOR;
                pending = true;
            }
            '>' => {
                multiplier *= LENGTHEN_FACTOR;
                pending = true;
            }
            symbol => {
                phonemes.push(Phoneme {
                    symbol,
                    duration_multiplier: multiplier,
                });
                multiplier = 1.0;
                pending = false;
            }
        }
    }
    if pending || phonemes.is_empty() {
        return Err(Error::MalformedToken(body.to_string()));
    }
    Ok(phonemes)
}

/// Builds sentences from a paragraph's tokens.
///
/// Quoted and emphasized spans stay open across words until their closing mark, but every
/// sentence starts outside of both. After an error the segmenter yields nothing more.
pub struct Segmenter<'a> {
    tokens: SplitWhitespace<'a>,
    quoted: bool,
    emphasized: bool,
    failed: bool,
}

impl<'a> Segmenter<'a> {
    #[must_use]
    pub fn new(paragraph: &'a str) -> Self {
        Segmenter {
            tokens: paragraph.split_whitespace(),
            quoted: false,
            emphasized: false,
            failed: false,
        }
    }

    /// Consumes one token, appending its word to `sentence`.
    /// Returns true when the token ends the sentence.
    fn scan_token(&mut self, token: &str, sentence: &mut Sentence) -> Result<bool> {
        let captures = TOKEN
            .captures(token)
            .ok_or_else(|| Error::MalformedToken(token.to_string()))?;
        let lead = captures.name("lead").map_or("", |m| m.as_str());
        let body = captures.name("body").map_or("", |m| m.as_str());
        let trail = captures.name("trail").map_or("", |m| m.as_str());

        let phonemes =
            parse_phonemes(body).map_err(|_| Error::MalformedToken(token.to_string()))?;

        if lead.contains('"') {
            self.quoted = true;
        }
        if lead.contains('*') {
            self.emphasized = true;
        }
        let markup = WordMarkup {
            quoted: self.quoted,
            emphasized: self.emphasized,
            content: lead.contains('\''),
        };
        let pause = match captures.name("pause").map(|m| m.as_str()) {
            Some(",") => Some(Pause::Comma),
            Some(":") => Some(Pause::Colon),
            _ => None,
        };
        trace!("token {token:?}: {markup:?}, pause {pause:?}");
        sentence.words.push(Word {
            phonemes,
            markup,
            pause,
        });

        if trail.contains('"') {
            self.quoted = false;
        }
        if trail.contains('*') {
            self.emphasized = false;
        }

        let question = trail.contains('?');
        let exclamation = trail.contains('!');
        if question || exclamation || trail.contains('.') {
            sentence.markup = SentenceMarkup {
                question,
                exclamation,
            };
            return Ok(true);
        }
        Ok(false)
    }
}

impl Iterator for Segmenter<'_> {
    type Item = Result<Sentence>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        self.quoted = false;
        self.emphasized = false;
        let mut sentence = Sentence::default();
        while let Some(token) = self.tokens.next() {
            match self.scan_token(token, &mut sentence) {
                Ok(true) => return Some(Ok(sentence)),
                Ok(false) => {}
                Err(error) => {
                    self.failed = true;
                    return Some(Err(error));
                }
            }
        }
        // Out of tokens: an unterminated trailing sentence still counts.
        if sentence.words.is_empty() {
            None
        } else {
            Some(Ok(sentence))
        }
    }
}

/// Splits a whole paragraph into sentences.
///
/// # Errors
///
/// Returns [`Error::MalformedToken`] for the first token that does not match the grammar.
pub fn segment_paragraph(paragraph: &str) -> Result<Vec<Sentence>> {
    Segmenter::new(paragraph).collect()
}
