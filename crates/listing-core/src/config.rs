//! Configuration loader, engine settings and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` +
//! `config.<env>.toml` + `APP_*` env vars. Engine tunables live under the
//! `search` key and deserialize into [`SearchSettings`].

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Error;
use crate::types::Season;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Self::defaults().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.settings()?;
        Ok(config)
    }

    /// Defaults overlaid with an inline TOML document.
    pub fn from_toml_str(toml: &str) -> Self {
        Self { figment: Self::defaults().merge(Toml::string(toml)) }
    }

    fn defaults() -> Figment {
        Figment::from(Serialized::default("search", SearchSettings::default()))
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn settings(&self) -> anyhow::Result<SearchSettings> {
        let settings: SearchSettings = self.get("search")?;
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub debounce_ms: u64,
    pub row_limit: usize,
    pub suggestions: SuggestionSettings,
    pub trending: TrendingSettings,
    pub display: DisplaySettings,
    pub retry: RetrySettings,
    pub seasons: SeasonSynonyms,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            row_limit: 50,
            suggestions: SuggestionSettings::default(),
            trending: TrendingSettings::default(),
            display: DisplaySettings::default(),
            retry: RetrySettings::default(),
            seasons: SeasonSynonyms::default(),
        }
    }
}

impl SearchSettings {
    pub fn debounce(&self) -> Duration { Duration::from_millis(self.debounce_ms) }

    pub fn validate(&self) -> Result<(), Error> {
        if self.debounce_ms == 0 {
            return Err(Error::InvalidConfig("search.debounce_ms must be positive".into()));
        }
        if self.row_limit == 0 {
            return Err(Error::InvalidConfig("search.row_limit must be positive".into()));
        }
        if self.suggestions.total_cap == 0 {
            return Err(Error::InvalidConfig("search.suggestions.total_cap must be positive".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::InvalidConfig("search.retry.max_attempts must be at least 1".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionSettings {
    /// Settled text must be at least this many characters.
    pub min_chars: usize,
    pub listing_cap: usize,
    pub category_cap: usize,
    pub village_cap: usize,
    pub total_cap: usize,
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self { min_chars: 2, listing_cap: 3, category_cap: 2, village_cap: 2, total_cap: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendingSettings {
    pub ttl_secs: u64,
    pub listing_cap: usize,
    pub category_cap: usize,
    pub village_cap: usize,
    pub terms: Vec<String>,
}

impl TrendingSettings {
    pub fn ttl(&self) -> Duration { Duration::from_secs(self.ttl_secs) }
}

impl Default for TrendingSettings {
    fn default() -> Self {
        Self {
            ttl_secs: 300,
            listing_cap: 6,
            category_cap: 8,
            village_cap: 8,
            terms: ["pottery", "wine tasting", "guesthouse", "weaving", "honey", "hiking"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub promoted: usize,
    pub organic: usize,
}

impl Default for DisplaySettings {
    fn default() -> Self { Self { promoted: 2, organic: 4 } }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub timeout_ms: u64,
    pub max_attempts: u32,
    pub backoff_ms: u64,
}

impl RetrySettings {
    pub fn timeout(&self) -> Duration { Duration::from_millis(self.timeout_ms) }

    /// Delay before retry number `attempt` (1-based), doubling each time.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.backoff_ms.saturating_mul(factor))
    }
}

impl Default for RetrySettings {
    fn default() -> Self { Self { timeout_ms: 8_000, max_attempts: 3, backoff_ms: 200 } }
}

/// Substrings that count as a match for each season facet value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonSynonyms {
    pub year_round: Vec<String>,
    pub summer: Vec<String>,
    pub spring_fall: Vec<String>,
}

impl SeasonSynonyms {
    /// Empty for [`Season::Any`].
    pub fn for_season(&self, season: Season) -> &[String] {
        match season {
            Season::Any => &[],
            Season::YearRound => &self.year_round,
            Season::Summer => &self.summer,
            Season::SpringFall => &self.spring_fall,
        }
    }
}

fn words(list: &[&str]) -> Vec<String> { list.iter().map(|s| (*s).to_string()).collect() }

impl Default for SeasonSynonyms {
    fn default() -> Self {
        Self {
            year_round: words(&["year-round", "year round", "all year", "целогодишно", "цяла година"]),
            summer: words(&["summer", "june", "july", "august", "лято", "юни", "юли", "август"]),
            spring_fall: words(&[
                "spring", "autumn", "fall", "april", "may", "september", "october",
                "пролет", "есен", "април", "май", "септември", "октомври",
            ]),
        }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
