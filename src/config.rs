// src/config.rs

use std::{collections::BTreeSet, fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

pub use crate::normalize::DateLocale;
pub use crate::total::TotalPolicy;

/// Aggregate columns that are never funds, whatever the asset.
const BASE_EXCLUSIONS: &[&str] = &[
    "date",
    "total",
    "average",
    "maximum",
    "minimum",
    "cumulative",
    "cumulative_usd_millions",
];

/// Everything the extraction pipeline needs to know about one source table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub total_policy: TotalPolicy,
    /// Lowercase column names excluded from the fund set.
    #[serde(default = "default_exclusions")]
    pub exclusion_set: BTreeSet<String>,
    #[serde(default)]
    pub date_locale: DateLocale,
    /// Positional names for tickerless tables; overrides header names.
    #[serde(default)]
    pub fund_identifiers: Option<Vec<String>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            total_policy: TotalPolicy::default(),
            exclusion_set: default_exclusions(),
            date_locale: DateLocale::default(),
            fund_identifiers: None,
        }
    }
}

impl PipelineConfig {
    /// Add extra excluded names (lowercased), e.g. the asset's own ticker.
    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exclusion_set
            .extend(names.into_iter().map(|s| s.as_ref().trim().to_lowercase()));
        self
    }

    /// Exclusion names trimmed and lowercased, as column matching expects.
    pub(crate) fn normalized(mut self) -> Self {
        self.exclusion_set = self
            .exclusion_set
            .iter()
            .map(|s| s.trim().to_lowercase())
            .collect();
        self
    }
}

fn default_exclusions() -> BTreeSet<String> {
    BASE_EXCLUSIONS.iter().map(|s| s.to_string()).collect()
}

/// One asset's source page, output naming and pipeline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceProfile {
    pub name: String,
    pub url: String,
    /// The asset's own ticker; always excluded from the fund set.
    pub ticker: String,
    /// Output files are `<file_stem>_<view>.csv`.
    pub file_stem: String,
    #[serde(flatten)]
    pub pipeline: PipelineConfig,
}

impl SourceProfile {
    /// Final pipeline settings with the ticker folded into the exclusions.
    pub fn pipeline_config(&self) -> PipelineConfig {
        self.pipeline.clone().normalized().exclude([&self.ticker])
    }
}

#[derive(Debug, Deserialize)]
struct ProfileFile {
    profiles: Vec<SourceProfile>,
}

/// Spot bitcoin ETFs: the site Total is trusted.
pub fn bitcoin() -> SourceProfile {
    SourceProfile {
        name: "bitcoin".into(),
        url: "https://farside.co.uk/bitcoin-etf-flow-all-data/".into(),
        ticker: "btc".into(),
        file_stem: "bitcoin_etf".into(),
        pipeline: PipelineConfig {
            total_policy: TotalPolicy::TrustSite,
            ..PipelineConfig::default()
        }
        .exclude(["eth"]),
    }
}

/// Spot ether ETFs: the site Total has lagged new listings, so it is recomputed.
pub fn ethereum() -> SourceProfile {
    SourceProfile {
        name: "ethereum".into(),
        url: "https://farside.co.uk/ethereum-etf-flow-all-data/".into(),
        ticker: "eth".into(),
        file_stem: "ethereum_etf".into(),
        pipeline: PipelineConfig {
            total_policy: TotalPolicy::Recompute,
            ..PipelineConfig::default()
        },
    }
}

pub fn builtin_profiles() -> Vec<SourceProfile> {
    vec![bitcoin(), ethereum()]
}

/// Load profiles from a YAML file:
///
/// ```yaml
/// profiles:
///   - name: bitcoin
///     url: https://farside.co.uk/bitcoin-etf-flow-all-data/
///     ticker: btc
///     file_stem: bitcoin_etf
///     total_policy: trust-site
/// ```
pub fn load_profiles<P: AsRef<Path>>(path: P) -> Result<Vec<SourceProfile>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    parse_profiles(&text).with_context(|| format!("parsing {:?}", path))
}

pub fn parse_profiles(text: &str) -> Result<Vec<SourceProfile>> {
    let file: ProfileFile = serde_yaml::from_str(text)?;
    validate(&file.profiles)?;
    Ok(file.profiles)
}

fn validate(profiles: &[SourceProfile]) -> Result<()> {
    let mut names = BTreeSet::new();
    for p in profiles {
        if !names.insert(p.name.as_str()) {
            bail!("duplicate profile name `{}`", p.name);
        }
        Url::parse(&p.url).with_context(|| format!("profile `{}` has a bad url", p.name))?;
        if p.file_stem.trim().is_empty() {
            bail!("profile `{}` has an empty file_stem", p.name);
        }
    }
    Ok(())
}

/// Pick profiles by name; an empty selection means all of them.
pub fn select_profiles(all: Vec<SourceProfile>, names: &[String]) -> Result<Vec<SourceProfile>> {
    if names.is_empty() {
        return Ok(all);
    }
    names
        .iter()
        .map(|n| {
            all.iter()
                .find(|p| p.name.eq_ignore_ascii_case(n))
                .cloned()
                .with_context(|| format!("unknown profile `{}`", n))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_exclusions_include_ticker() {
        let eth = ethereum().pipeline_config();
        assert_eq!(eth.total_policy, TotalPolicy::Recompute);
        for name in ["date", "total", "eth", "average", "maximum", "minimum", "cumulative"] {
            assert!(eth.exclusion_set.contains(name), "missing {name}");
        }

        let btc = bitcoin().pipeline_config();
        assert_eq!(btc.total_policy, TotalPolicy::TrustSite);
        assert!(btc.exclusion_set.contains("btc"));
        assert!(btc.exclusion_set.contains("eth"));
    }

    #[test]
    fn test_yaml_profiles_with_defaults() -> Result<()> {
        let yaml = r#"
profiles:
  - name: solana
    url: https://example.com/sol/
    ticker: SOL
    file_stem: solana_etf
    total_policy: recompute
    date_locale: month-first
    fund_identifiers: [BSOL, GSOL]
  - name: other
    url: https://example.com/other/
    ticker: oth
    file_stem: other
    exclusion_set: [Date, TOTAL]
"#;
        let profiles = parse_profiles(yaml)?;
        assert_eq!(profiles.len(), 2);

        let sol = profiles[0].pipeline_config();
        assert_eq!(sol.total_policy, TotalPolicy::Recompute);
        assert_eq!(sol.date_locale, DateLocale::MonthFirst);
        assert_eq!(sol.fund_identifiers, Some(vec!["BSOL".into(), "GSOL".into()]));
        assert!(sol.exclusion_set.contains("sol"));
        assert!(sol.exclusion_set.contains("average"));

        let other = profiles[1].pipeline_config();
        assert_eq!(other.total_policy, TotalPolicy::TrustSite);
        assert_eq!(
            other.exclusion_set,
            ["date", "oth", "total"]
                .into_iter()
                .map(String::from)
                .collect::<BTreeSet<String>>()
        );
        Ok(())
    }

    #[test]
    fn test_invalid_profiles() {
        let dup = r#"
profiles:
  - {name: a, url: "https://x.test/", ticker: a, file_stem: a}
  - {name: a, url: "https://y.test/", ticker: b, file_stem: b}
"#;
        assert!(parse_profiles(dup).is_err());

        let bad_url = r#"
profiles:
  - {name: a, url: "not a url", ticker: a, file_stem: a}
"#;
        assert!(parse_profiles(bad_url).is_err());
    }

    #[test]
    fn test_select_profiles() -> Result<()> {
        let picked = select_profiles(builtin_profiles(), &["Ethereum".to_string()])?;
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].name, "ethereum");
        assert_eq!(select_profiles(builtin_profiles(), &[])?.len(), 2);
        assert!(select_profiles(builtin_profiles(), &["doge".to_string()]).is_err());
        Ok(())
    }
}
