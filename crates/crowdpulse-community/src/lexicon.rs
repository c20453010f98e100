//! Keyword lexicon for Chinese retail-investor slang.
//!
//! A [`Lexicon`] turns text into raw signal counts. The scorer only sees
//! [`LexiconHits`], so a model-based implementation can replace
//! [`KeywordLexicon`] without touching ranking or gating.

use crowdpulse_core::LexiconTerms;

/// Term-presence counts for one text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LexiconHits {
    pub strong_bullish: u32,
    pub mild_bullish: u32,
    pub strong_bearish: u32,
    pub mild_bearish: u32,
    pub panic: u32,
    pub greed: u32,
}

impl LexiconHits {
    /// Strong terms weigh double.
    #[must_use]
    pub fn bull_score(&self) -> u32 {
        2 * self.strong_bullish + self.mild_bullish
    }

    #[must_use]
    pub fn bear_score(&self) -> u32 {
        2 * self.strong_bearish + self.mild_bearish
    }
}

/// Anything that can count sentiment signals in a text.
pub trait Lexicon: Send + Sync {
    fn scan(&self, text: &str) -> LexiconHits;
}

/// Counts each configured term once if it occurs anywhere in the text.
///
/// Matching is case-sensitive substring search. Repeating a term does not
/// raise its count.
#[derive(Debug, Clone, Default)]
pub struct KeywordLexicon {
    terms: LexiconTerms,
}

impl KeywordLexicon {
    #[must_use]
    pub fn new(terms: LexiconTerms) -> Self {
        Self { terms }
    }

    #[must_use]
    pub fn terms(&self) -> &LexiconTerms {
        &self.terms
    }
}

impl From<LexiconTerms> for KeywordLexicon {
    fn from(terms: LexiconTerms) -> Self {
        Self::new(terms)
    }
}

fn count_present(text: &str, terms: &[String]) -> u32 {
    let hits = terms.iter().filter(|t| text.contains(t.as_str())).count();
    u32::try_from(hits).unwrap_or(u32::MAX)
}

impl Lexicon for KeywordLexicon {
    fn scan(&self, text: &str) -> LexiconHits {
        LexiconHits {
            strong_bullish: count_present(text, &self.terms.strong_bullish),
            mild_bullish: count_present(text, &self.terms.mild_bullish),
            strong_bearish: count_present(text, &self.terms.strong_bearish),
            mild_bearish: count_present(text, &self.terms.mild_bearish),
            panic: count_present(text, &self.terms.panic),
            greed: count_present(text, &self.terms.greed),
        }
    }
}
