//! Simulation configuration files
//!
//! A configuration is a single YAML (`.yaml`, `.yml`) or JSON (`.json`)
//! document holding a `SimulationConfig`.

use std::fs;
use std::path::Path;

use flowplan_core::SimulationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Pick a format from the file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Error types for loading a configuration
#[derive(Debug)]
pub enum LoadError {
    Io(String),
    Parse(String),
    UnsupportedFormat(String),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io(msg) => write!(f, "IO error: {}", msg),
            LoadError::Parse(msg) => write!(f, "Parse error: {}", msg),
            LoadError::UnsupportedFormat(path) => {
                write!(f, "Unsupported config file {} (expected .yaml, .yml or .json)", path)
            }
        }
    }
}

impl std::error::Error for LoadError {}

pub fn parse_config(content: &str, format: ConfigFormat) -> Result<SimulationConfig, LoadError> {
    match format {
        ConfigFormat::Yaml => {
            serde_saphyr::from_str(content).map_err(|e| LoadError::Parse(e.to_string()))
        }
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| LoadError::Parse(e.to_string()))
        }
    }
}

/// Read and parse a configuration file
pub fn load_config(path: &Path) -> Result<SimulationConfig, LoadError> {
    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| LoadError::UnsupportedFormat(path.display().to_string()))?;
    let content = fs::read_to_string(path)
        .map_err(|e| LoadError::Io(format!("{}: {}", path.display(), e)))?;

    tracing::debug!(path = %path.display(), ?format, "loading configuration");
    parse_config(&content, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowplan_core::model::{CorpusId, Currency};
    use rust_decimal_macros::dec;
    use std::path::PathBuf;

    const MINIMAL_YAML: &str = r#"
simulation:
  startYear: 2025
  endYear: 2030
fallbackCorpusId: bank
currency: USD
corpora:
  - id: bank
    startYear: 2025
    initialAmount: 1000
    growthRate: 0.03
expenses:
  - id: rent
    startYear: 2025
    endYear: 2030
    recurringValue:
      amount: 120
      referenceTime: 2025
"#;

    fn sample_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("samples/household.yaml")
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("plan.yaml")), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_path(Path::new("plan.YML")), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_path(Path::new("plan.json")), Some(ConfigFormat::Json));
        assert_eq!(ConfigFormat::from_path(Path::new("plan.toml")), None);
        assert_eq!(ConfigFormat::from_path(Path::new("plan")), None);
    }

    #[test]
    fn test_parse_yaml() {
        let config = parse_config(MINIMAL_YAML, ConfigFormat::Yaml).unwrap();
        assert_eq!(config.currency, Currency::USD);
        assert_eq!(config.corpora[0].growth_rate, dec!(0.03));
        assert_eq!(config.expenses[0].recurring_value.as_ref().unwrap().amount, dec!(120));

        let plan = config.build().unwrap();
        assert_eq!(plan.fallback_corpus_id, CorpusId::from("bank"));
    }

    #[test]
    fn test_load_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.json");
        fs::write(
            &path,
            r#"{"simulation": {"startYear": 2025, "endYear": 2026}, "fallbackCorpusId": "bank",
                "corpora": [{"id": "bank", "startYear": 2025, "initialAmount": 10}]}"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.start_year(), 2025);
        assert_eq!(config.corpora.len(), 1);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.yaml");
        assert!(matches!(load_config(&missing), Err(LoadError::Io(_))));

        let unsupported = dir.path().join("plan.toml");
        fs::write(&unsupported, "").unwrap();
        assert!(matches!(
            load_config(&unsupported),
            Err(LoadError::UnsupportedFormat(_))
        ));

        let broken = dir.path().join("plan.json");
        fs::write(&broken, "{\"simulation\": ").unwrap();
        assert!(matches!(load_config(&broken), Err(LoadError::Parse(_))));
    }

    #[test]
    fn test_sample_household_runs() {
        let config = load_config(&sample_path()).unwrap();
        let plan = config.build().unwrap();
        let result = flowplan_core::simulate(&plan).unwrap();

        assert_eq!(result.simulation.len(), plan.window.len());
        assert_eq!(result.simulation[0].year, 2025);
    }
}
