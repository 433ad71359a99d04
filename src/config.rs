use crate::types::{RecommendationScale, WeightTable};
use chrono::NaiveDate;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Default number of trailing days in a history projection.
pub const DEFAULT_HISTORY_DAYS: usize = 30;
/// Smallest accepted history window.
pub const MIN_HISTORY_DAYS: usize = 7;
/// Largest accepted history window.
pub const MAX_HISTORY_DAYS: usize = 90;

/// Clamp a requested history window into the accepted range.
pub fn clamp_history_days(requested: Option<usize>) -> usize {
    requested
        .unwrap_or(DEFAULT_HISTORY_DAYS)
        .clamp(MIN_HISTORY_DAYS, MAX_HISTORY_DAYS)
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

/// `fair = 10^(b * log10(days) + a)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerLawParams {
    pub a: f64,
    pub b: f64,
}

impl PowerLawParams {
    pub fn fair_value(&self, days_since_origin: f64) -> f64 {
        10f64.powf(self.b * days_since_origin.log10() + self.a)
    }
}

impl Default for PowerLawParams {
    fn default() -> Self {
        Self { a: -17.67, b: 5.93 }
    }
}

/// Calendar anchors and model parameters shared by the cycle indicators.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConstants {
    /// Day zero of the power-law models.
    pub origin: NaiveDate,
    /// Corridor fair-value curve.
    pub power_law: PowerLawParams,
    /// Fair-value curve of the accumulation index.
    pub accumulation: PowerLawParams,
    /// Half-width of the corridor in log10 units.
    pub band_offset: f64,
    /// Window of the geometric-mean cost basis.
    pub cost_window: usize,
    /// Past halving dates, ascending.
    pub halvings: Vec<NaiveDate>,
    pub next_halving: NaiveDate,
}

impl ModelConstants {
    /// Days between the origin and `date`.
    pub fn days_since_origin(&self, date: NaiveDate) -> f64 {
        (date - self.origin).num_days() as f64
    }

    /// Most recent halving on or before `date`.
    pub fn last_halving(&self, date: NaiveDate) -> Option<NaiveDate> {
        self.halvings.iter().rev().find(|h| **h <= date).copied()
    }
}

impl Default for ModelConstants {
    fn default() -> Self {
        Self {
            origin: ymd(2009, 1, 3),
            power_law: PowerLawParams::default(),
            accumulation: PowerLawParams::default(),
            band_offset: 0.5,
            cost_window: 200,
            halvings: vec![
                ymd(2012, 11, 28),
                ymd(2016, 7, 9),
                ymd(2020, 5, 11),
                ymd(2024, 4, 20),
            ],
            next_halving: ymd(2028, 4, 20),
        }
    }
}

/// Longest fallback series that can be generated, about 55 years of days.
pub const MAX_SYNTHETIC_LENGTH: usize = 20_000;

/// Parameters of the generated fallback series.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticConfig {
    /// Number of daily observations.
    pub length: usize,
    pub seed: u64,
    /// Price of the final observation.
    pub anchor_price: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            length: 2200,
            seed: 42,
            anchor_price: 95_000.0,
        }
    }
}

/// Fixed readings served by the static snapshot provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotOverrides {
    pub funding_rate: Option<f64>,
    pub long_short_ratio: Option<f64>,
    pub fear_greed_index: Option<f64>,
    pub btc_dominance: Option<f64>,
    pub spot_price: Option<f64>,
    /// Billions of USD.
    pub etf_volume: Option<f64>,
    pub company_holdings: Option<f64>,
    /// Exchange book summaries of `{instrument_name, open_interest}`.
    pub option_chain_file: Option<PathBuf>,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Asset symbol the dashboard is computed for.
    pub asset: String,
    /// First date requested from history providers.
    pub history_start: NaiveDate,
    /// Local `[[unix_ms, price], ...]` history file.
    pub history_file: Option<PathBuf>,
    /// How long a fetched series stays fresh.
    pub series_cache_ttl: Duration,
    pub synthetic: SyntheticConfig,
    pub snapshot: SnapshotOverrides,
    pub constants: ModelConstants,
    pub recommendation_scale: RecommendationScale,
    pub weights: WeightTable,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |key: &str| -> Option<f64> {
            let raw = lookup(key)?;
            match raw.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => Some(v),
                _ => {
                    warn!("Ignoring {}={}: not a number", key, raw);
                    None
                }
            }
        };

        let history_start = lookup("HISTORY_START")
            .and_then(|raw| match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(e) => {
                    warn!("Ignoring HISTORY_START={}: {}", raw, e);
                    None
                }
            })
            .unwrap_or_else(|| ymd(2014, 1, 1));

        let recommendation_scale = lookup("RECOMMENDATION_SCALE")
            .and_then(|raw| match raw.parse::<RecommendationScale>() {
                Ok(scale) => Some(scale),
                Err(e) => {
                    warn!("{}, using graded", e);
                    None
                }
            })
            .unwrap_or_default();

        let mut weights = WeightTable::default();
        if let Some(spec) = lookup("INDICATOR_WEIGHTS") {
            for entry in weights.apply_overrides(&spec) {
                warn!("Ignoring weight override '{}': unknown indicator or bad weight", entry);
            }
        }

        let power_law = PowerLawParams {
            a: parsed("POWER_LAW_A").unwrap_or(PowerLawParams::default().a),
            b: parsed("POWER_LAW_B").unwrap_or(PowerLawParams::default().b),
        };
        // The accumulation curve follows the corridor unless set on its own.
        let accumulation = PowerLawParams {
            a: parsed("ACCUMULATION_A").unwrap_or(power_law.a),
            b: parsed("ACCUMULATION_B").unwrap_or(power_law.b),
        };

        let synthetic_defaults = SyntheticConfig::default();

        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(3001),
            asset: lookup("ASSET")
                .map(|a| a.trim().to_uppercase())
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| "BTC".to_string()),
            history_start,
            history_file: lookup("HISTORY_FILE").map(PathBuf::from),
            series_cache_ttl: Duration::from_secs(
                lookup("SERIES_CACHE_TTL_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(300),
            ),
            synthetic: SyntheticConfig {
                length: lookup("SYNTHETIC_LENGTH")
                    .and_then(|v| v.parse().ok())
                    .filter(|n| *n > 0)
                    .map(|n: usize| {
                        if n > MAX_SYNTHETIC_LENGTH {
                            warn!(
                                "SYNTHETIC_LENGTH={} exceeds {}, clamping",
                                n, MAX_SYNTHETIC_LENGTH
                            );
                        }
                        n.min(MAX_SYNTHETIC_LENGTH)
                    })
                    .unwrap_or(synthetic_defaults.length),
                seed: lookup("SYNTHETIC_SEED")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(synthetic_defaults.seed),
                anchor_price: parsed("SYNTHETIC_ANCHOR_PRICE")
                    .filter(|p| *p > 0.0)
                    .unwrap_or(synthetic_defaults.anchor_price),
            },
            snapshot: SnapshotOverrides {
                funding_rate: parsed("FUNDING_RATE"),
                long_short_ratio: parsed("LONG_SHORT_RATIO"),
                fear_greed_index: parsed("FEAR_GREED_INDEX"),
                btc_dominance: parsed("BTC_DOMINANCE"),
                spot_price: parsed("SPOT_PRICE"),
                etf_volume: parsed("ETF_VOLUME"),
                company_holdings: parsed("COMPANY_HOLDINGS"),
                option_chain_file: lookup("OPTION_CHAIN_FILE").map(PathBuf::from),
            },
            constants: ModelConstants {
                power_law,
                accumulation,
                ..ModelConstants::default()
            },
            recommendation_scale,
            weights,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IndicatorId;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    // =========================================================================
    // Defaults
    // =========================================================================

    #[test]
    fn test_config_default_values() {
        let config = Config::default();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3001);
        assert_eq!(config.asset, "BTC");
        assert_eq!(config.series_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.synthetic.length, 2200);
        assert_eq!(config.recommendation_scale, RecommendationScale::Graded);
        assert!(config.history_file.is_none());
        assert!(config.snapshot.funding_rate.is_none());
        assert_eq!(config.weights, WeightTable::default());
    }

    #[test]
    fn test_model_constants_defaults() {
        let constants = ModelConstants::default();

        assert_eq!(constants.origin, ymd(2009, 1, 3));
        assert_eq!(constants.cost_window, 200);
        assert_eq!(constants.halvings.len(), 4);
        assert_eq!(constants.accumulation, constants.power_law);
        assert_eq!(
            constants.last_halving(ymd(2022, 1, 1)),
            Some(ymd(2020, 5, 11))
        );
        assert_eq!(constants.last_halving(ymd(2012, 11, 28)), Some(ymd(2012, 11, 28)));
        assert_eq!(constants.last_halving(ymd(2010, 1, 1)), None);
    }

    #[test]
    fn test_power_law_fair_value() {
        let params = PowerLawParams { a: 2.0, b: 1.0 };
        assert!((params.fair_value(1000.0) - 100_000.0).abs() < 1e-6);
    }

    // =========================================================================
    // Overrides
    // =========================================================================

    #[test]
    fn test_config_reads_overrides() {
        let config = config_with(&[
            ("PORT", "8080"),
            ("ASSET", "eth"),
            ("HISTORY_START", "2018-06-01"),
            ("HISTORY_FILE", "/tmp/btc.json"),
            ("SERIES_CACHE_TTL_SECS", "60"),
            ("FUNDING_RATE", "0.05"),
            ("SPOT_PRICE", "61000"),
            ("ETF_VOLUME", "2.4"),
            ("OPTION_CHAIN_FILE", "/tmp/options.json"),
            ("RECOMMENDATION_SCALE", "classic"),
        ]);

        assert_eq!(config.port, 8080);
        assert_eq!(config.asset, "ETH");
        assert_eq!(config.history_start, ymd(2018, 6, 1));
        assert_eq!(config.history_file, Some(PathBuf::from("/tmp/btc.json")));
        assert_eq!(config.series_cache_ttl, Duration::from_secs(60));
        assert_eq!(config.snapshot.funding_rate, Some(0.05));
        assert_eq!(config.snapshot.spot_price, Some(61000.0));
        assert_eq!(config.snapshot.etf_volume, Some(2.4));
        assert!(config.snapshot.company_holdings.is_none());
        assert_eq!(
            config.snapshot.option_chain_file,
            Some(PathBuf::from("/tmp/options.json"))
        );
        assert_eq!(config.recommendation_scale, RecommendationScale::Classic);
    }

    #[test]
    fn test_accumulation_follows_corridor_unless_set() {
        let config = config_with(&[("POWER_LAW_A", "-17.0")]);
        assert_eq!(config.constants.accumulation.a, -17.0);

        let config = config_with(&[("POWER_LAW_A", "-17.0"), ("ACCUMULATION_A", "-16.5")]);
        assert_eq!(config.constants.power_law.a, -17.0);
        assert_eq!(config.constants.accumulation.a, -16.5);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_with(&[
            ("PORT", "not-a-port"),
            ("HISTORY_START", "yesterday"),
            ("FEAR_GREED_INDEX", "lots"),
            ("RECOMMENDATION_SCALE", "fuzzy"),
            ("SYNTHETIC_LENGTH", "0"),
        ]);

        assert_eq!(config.port, 3001);
        assert_eq!(config.history_start, ymd(2014, 1, 1));
        assert!(config.snapshot.fear_greed_index.is_none());
        assert_eq!(config.recommendation_scale, RecommendationScale::Graded);
        assert_eq!(config.synthetic.length, 2200);
    }

    #[test]
    fn test_synthetic_length_is_capped() {
        let config = config_with(&[("SYNTHETIC_LENGTH", "1000000")]);
        assert_eq!(config.synthetic.length, MAX_SYNTHETIC_LENGTH);

        let config = config_with(&[("SYNTHETIC_LENGTH", "3000")]);
        assert_eq!(config.synthetic.length, 3000);
    }

    #[test]
    fn test_weight_overrides_ignore_unknown_ids() {
        let config = config_with(&[("INDICATOR_WEIGHTS", "pi_cycle_top=0.3,made_up=0.9")]);
        assert_eq!(config.weights.get(IndicatorId::PiCycleTop), Some(0.3));
        assert_eq!(config.weights.iter().count(), IndicatorId::ALL.len());
    }

    // =========================================================================
    // History window
    // =========================================================================

    #[test]
    fn test_clamp_history_days() {
        assert_eq!(clamp_history_days(None), 30);
        assert_eq!(clamp_history_days(Some(1)), 7);
        assert_eq!(clamp_history_days(Some(45)), 45);
        assert_eq!(clamp_history_days(Some(365)), 90);
    }
}
