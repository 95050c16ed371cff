use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use xenharm_core::{CurveConfig, PartialCount, Tuning, intervals::IntervalConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumConfig {
    #[serde(default = "SpectrumConfig::default_fundamental_hz")]
    pub fundamental_hz: f64,
    #[serde(default)]
    pub tuning: Tuning,
    #[serde(default)]
    pub partials: PartialCount,
}

impl SpectrumConfig {
    fn default_fundamental_hz() -> f64 {
        220.0
    }
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            fundamental_hz: Self::default_fundamental_hz(),
            tuning: Tuning::default(),
            partials: PartialCount::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalsConfig {
    #[serde(default = "IntervalsConfig::default_top_k")]
    pub top_k: usize,
    #[serde(default = "IntervalsConfig::default_tolerance_cents")]
    pub tolerance_cents: f64,
    #[serde(default = "IntervalsConfig::default_max_denominator")]
    pub max_denominator: u32,
}

impl IntervalsConfig {
    fn default_top_k() -> usize {
        IntervalConfig::default().top_k
    }
    fn default_tolerance_cents() -> f64 {
        IntervalConfig::default().tolerance_cents
    }
    fn default_max_denominator() -> u32 {
        IntervalConfig::default().max_denominator
    }

    pub fn to_core(&self) -> IntervalConfig {
        IntervalConfig {
            top_k: self.top_k,
            tolerance_cents: self.tolerance_cents,
            max_denominator: self.max_denominator,
        }
    }
}

impl Default for IntervalsConfig {
    fn default() -> Self {
        Self {
            top_k: Self::default_top_k(),
            tolerance_cents: Self::default_tolerance_cents(),
            max_denominator: Self::default_max_denominator(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct XenharmConfig {
    #[serde(default)]
    pub spectrum: SpectrumConfig,
    #[serde(default)]
    pub curve: CurveConfig,
    #[serde(default)]
    pub intervals: IntervalsConfig,
}

impl XenharmConfig {
    /// Read `path` as TOML. A missing file means defaults; an unreadable or
    /// malformed one is reported and also falls back to defaults.
    pub fn load_or_default(path: &str) -> Self {
        let path_obj = Path::new(path);
        if !path_obj.exists() {
            info!("No config at {path}, using defaults.");
            return Self::default();
        }
        match fs::read_to_string(path_obj) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse config {path}: {err}. Using defaults.");
                    Self::default()
                }
            },
            Err(err) => {
                warn!("Failed to read config {path}: {err}. Using defaults.");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xenharm_core::{DissonanceMethod, Normalization, SweepMethod};

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg: XenharmConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, XenharmConfig::default());
        assert_eq!(cfg.spectrum.tuning, Tuning::Edo(12));
        assert_eq!(cfg.spectrum.partials, PartialCount::All);
    }

    #[test]
    fn parses_all_sections() {
        let text = r#"
            [spectrum]
            fundamental_hz = 261.63
            tuning = { edo = 19 }
            partials = { count = 24 }

            [curve]
            method = "sethares-loudness"
            precision = 0.5
            sweep = "harmonic-template"
            template_partials = 6
            normalization = "to-one"

            [intervals]
            top_k = 5
        "#;
        let cfg: XenharmConfig = toml::from_str(text).unwrap();
        assert_eq!(cfg.spectrum.fundamental_hz, 261.63);
        assert_eq!(cfg.spectrum.tuning, Tuning::Edo(19));
        assert_eq!(cfg.spectrum.partials, PartialCount::Count(24));
        assert_eq!(cfg.curve.method, DissonanceMethod::SetharesLoudness);
        assert_eq!(cfg.curve.precision, 0.5);
        assert_eq!(cfg.curve.octave_span, 1);
        assert_eq!(cfg.curve.sweep, SweepMethod::HarmonicTemplate);
        assert_eq!(cfg.curve.template_partials, 6);
        assert_eq!(cfg.curve.normalization, Normalization::ToOne);
        assert_eq!(cfg.intervals.top_k, 5);
        assert_eq!(cfg.intervals.tolerance_cents, 10.0);
    }

    #[test]
    fn harmonic_tuning_is_a_plain_string() {
        let cfg: XenharmConfig = toml::from_str("[spectrum]\ntuning = \"harmonic\"\n").unwrap();
        assert_eq!(cfg.spectrum.tuning, Tuning::Harmonic);
    }

    #[test]
    fn missing_file_falls_back() {
        let cfg = XenharmConfig::load_or_default("definitely/not/here.toml");
        assert_eq!(cfg, XenharmConfig::default());
    }
}
