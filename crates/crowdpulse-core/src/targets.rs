use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::posts::Target;
use crate::ConfigError;

/// Popular A-share codes tracked on the forum when no targets file is given.
const DEFAULT_STOCKS: &[&str] = &[
    "000001", // Ping An Bank
    "000002", // Vanke A
    "000858", // Wuliangye
    "600036", // China Merchants Bank
    "600519", // Kweichow Moutai
    "600887", // Yili
    "000661", // Changchun High-Tech
    "300015", // Aier Eye Hospital
    "002415", // Hikvision
    "000725", // BOE
    "600276", // Hengrui Medicine
    "000063", // ZTE
    "002594", // BYD
    "300750", // CATL
    "688981", // SMIC
    "600900", // Yangtze Power
    "000568", // Luzhou Laojiao
    "002304", // Yanghe
    "300142", // Walvax
    "688599", // Trina Solar
];

/// Timeline categories: hot, Shanghai/Shenzhen, Hong Kong, US.
const DEFAULT_CATEGORIES: &[u32] = &[102, 105, 104, 103];

fn default_stocks() -> Vec<String> {
    DEFAULT_STOCKS.iter().map(|s| (*s).to_string()).collect()
}

fn default_top_stocks() -> usize {
    20
}

fn default_categories() -> Vec<u32> {
    DEFAULT_CATEGORIES.to_vec()
}

fn default_pages() -> u32 {
    5
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EastmoneyTargets {
    #[serde(default = "default_stocks")]
    pub stocks: Vec<String>,
    /// Only the first `top_stocks` codes are enumerated.
    #[serde(default = "default_top_stocks")]
    pub top_stocks: usize,
}

impl Default for EastmoneyTargets {
    fn default() -> Self {
        Self {
            stocks: default_stocks(),
            top_stocks: default_top_stocks(),
        }
    }
}

impl EastmoneyTargets {
    #[must_use]
    pub fn targets(&self) -> Vec<Target> {
        self.stocks
            .iter()
            .take(self.top_stocks)
            .map(Target::instrument)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XueqiuTargets {
    #[serde(default = "default_categories")]
    pub categories: Vec<u32>,
    /// Timeline pages fetched per category, starting at page 1.
    #[serde(default = "default_pages")]
    pub pages: u32,
}

impl Default for XueqiuTargets {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            pages: default_pages(),
        }
    }
}

impl XueqiuTargets {
    #[must_use]
    pub fn targets(&self) -> Vec<Target> {
        self.categories.iter().map(Target::category).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetsFile {
    #[serde(default)]
    pub eastmoney: EastmoneyTargets,
    #[serde(default)]
    pub xueqiu: XueqiuTargets,
}

/// Load and validate the targets configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_targets(path: &Path) -> Result<TargetsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let targets_file: TargetsFile =
        serde_yaml::from_str(&content).map_err(|e| ConfigError::FileParse {
            path: path.display().to_string(),
            source: e,
        })?;

    validate_targets(&targets_file)?;

    Ok(targets_file)
}

fn validate_targets(targets_file: &TargetsFile) -> Result<(), ConfigError> {
    let mut seen_codes = HashSet::new();
    for code in &targets_file.eastmoney.stocks {
        if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::Validation(format!(
                "stock code '{code}' must be exactly six digits"
            )));
        }
        if !seen_codes.insert(code.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate stock code: '{code}'"
            )));
        }
    }

    let mut seen_categories = HashSet::new();
    for category in &targets_file.xueqiu.categories {
        if !seen_categories.insert(*category) {
            return Err(ConfigError::Validation(format!(
                "duplicate timeline category: {category}"
            )));
        }
    }

    if targets_file.xueqiu.pages == 0 {
        return Err(ConfigError::Validation(
            "xueqiu.pages must be at least 1".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[path = "targets_test.rs"]
mod tests;
