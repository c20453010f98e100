//! Sentiment keyword lists and their YAML loader.
//!
//! The scorer in `crowdpulse-community` turns these lists into a lexicon;
//! this module only owns the data and its validation.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const STRONG_BULLISH: &[&str] = &[
    "暴涨", "涨停", "牛逼", "起飞", "突破", "爆发", "主升浪", "翻倍",
];
const MILD_BULLISH: &[&str] = &["看多", "上涨", "利好", "买入", "加仓", "持有", "机会", "牛市"];
const STRONG_BEARISH: &[&str] = &[
    "暴跌", "跌停", "崩盘", "完蛋", "跳水", "血崩", "割肉", "踩雷",
];
const MILD_BEARISH: &[&str] = &[
    "看空", "下跌", "利空", "卖出", "减仓", "风险", "小心", "熊市", "跌破",
];
const PANIC: &[&str] = &["恐慌", "害怕", "担心", "焦虑", "慌张", "绝望"];
const GREED: &[&str] = &["贪婪", "疯狂", "狂欢", "追高", "梭哈", "fomo"];

fn owned(terms: &[&str]) -> Vec<String> {
    terms.iter().map(|t| (*t).to_string()).collect()
}

/// Six disjoint keyword sets. Matching is case-sensitive substring presence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconTerms {
    pub strong_bullish: Vec<String>,
    pub mild_bullish: Vec<String>,
    pub strong_bearish: Vec<String>,
    pub mild_bearish: Vec<String>,
    pub panic: Vec<String>,
    pub greed: Vec<String>,
}

impl Default for LexiconTerms {
    fn default() -> Self {
        Self {
            strong_bullish: owned(STRONG_BULLISH),
            mild_bullish: owned(MILD_BULLISH),
            strong_bearish: owned(STRONG_BEARISH),
            mild_bearish: owned(MILD_BEARISH),
            panic: owned(PANIC),
            greed: owned(GREED),
        }
    }
}

impl LexiconTerms {
    fn named_sets(&self) -> [(&'static str, &[String]); 6] {
        [
            ("strong_bullish", &self.strong_bullish),
            ("mild_bullish", &self.mild_bullish),
            ("strong_bearish", &self.strong_bearish),
            ("mild_bearish", &self.mild_bearish),
            ("panic", &self.panic),
            ("greed", &self.greed),
        ]
    }

    /// Check that no term is blank and no term appears in two sets.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the offending term.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut owner: HashMap<&str, &str> = HashMap::new();
        for (set_name, terms) in self.named_sets() {
            for term in terms {
                if term.trim().is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "lexicon set '{set_name}' contains a blank term"
                    )));
                }
                if let Some(previous) = owner.insert(term.as_str(), set_name) {
                    return Err(ConfigError::Validation(format!(
                        "lexicon term '{term}' appears in both '{previous}' and '{set_name}'"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Load and validate a lexicon from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_lexicon(path: &Path) -> Result<LexiconTerms, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let terms: LexiconTerms =
        serde_yaml::from_str(&content).map_err(|e| ConfigError::FileParse {
            path: path.display().to_string(),
            source: e,
        })?;

    terms.validate()?;
    Ok(terms)
}
