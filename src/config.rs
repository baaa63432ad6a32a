use crate::{
    codec::extract::CommandGenerator,
    engine::{TableLimits, MAX_TABLE_INPUTS},
    error::EvidenceNetError,
    properties::Label,
};
use serde::{Deserialize, Serialize};
use std::{
    fs::{read_to_string, write},
    path::{Path, PathBuf},
};

/// Values used when a parameter has not been chosen explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub default_prior: Label,
    pub default_truth_prob: Label,
    /// Strength given to every new edge and to unset edges by `seed_defaults`.
    pub default_edge_strength: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            default_prior: Label::RealisticPossibility,
            default_truth_prob: Label::LikelyOrProbable,
            default_edge_strength: 2.0,
        }
    }
}

/// External program used for narrative extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ExtractorConfig {
    pub fn generator(&self) -> CommandGenerator {
        CommandGenerator::new(self.program.clone(), self.args.clone())
    }
}

/// ```toml
/// [engine]
/// default_prior = "Realistic Possibility"
/// default_truth_prob = "Likely or Probable"
/// default_edge_strength = 2.0
///
/// [tables]
/// max_inputs = 20
///
/// [extractor]
/// program = "llm"
/// args = ["--no-stream"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceNetConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub tables: TableLimits,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extractor: Option<ExtractorConfig>,
}

impl EvidenceNetConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, EvidenceNetError> {
        let config: EvidenceNetConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EvidenceNetError> {
        if !self.engine.default_edge_strength.is_finite() {
            return Err(EvidenceNetError::InvalidParameter(format!(
                "default_edge_strength must be finite, got {}",
                self.engine.default_edge_strength
            )));
        }
        if self.tables.max_inputs > MAX_TABLE_INPUTS {
            return Err(EvidenceNetError::InvalidParameter(format!(
                "tables.max_inputs must be at most {MAX_TABLE_INPUTS}, got {}",
                self.tables.max_inputs
            )));
        }
        Ok(())
    }
}

pub trait ConfigProvider: Send + Sync {
    fn get_config(&self) -> Result<EvidenceNetConfig, EvidenceNetError>;
    fn set_config(&self, config: &EvidenceNetConfig) -> Result<(), EvidenceNetError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfigProvider {
    path: PathBuf,
}

impl TomlConfigProvider {
    pub fn new(path: PathBuf) -> Self {
        TomlConfigProvider { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigProvider for TomlConfigProvider {
    fn get_config(&self) -> Result<EvidenceNetConfig, EvidenceNetError> {
        tracing::debug!("Attempting to read config from: {:?}", &self.path);
        if !self.path.exists() {
            tracing::debug!("Config file not found, using defaults.");
            return Ok(EvidenceNetConfig::default());
        }
        EvidenceNetConfig::from_toml_str(&read_to_string(&self.path)?)
    }

    fn set_config(&self, config: &EvidenceNetConfig) -> Result<(), EvidenceNetError> {
        tracing::debug!("Attempting to write config to: {:?}", &self.path);
        config.validate()?;
        let toml_string = toml::to_string(config)?;
        write(&self.path, toml_string)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let provider = TomlConfigProvider::new(dir.path().join("evnet.toml"));
        let config = provider.get_config().unwrap();
        assert_eq!(config, EvidenceNetConfig::default());
        assert_eq!(config.tables.max_inputs, 20);
        assert_eq!(config.engine.default_edge_strength, 2.0);
    }

    #[test]
    fn partial_tables_fill_in_defaults() {
        let config = EvidenceNetConfig::from_toml_str(
            r#"
            [engine]
            default_prior = "Unlikely"

            [extractor]
            program = "cat"
            "#,
        )
        .unwrap();
        assert_eq!(config.engine.default_prior, Label::Unlikely);
        assert_eq!(config.engine.default_truth_prob, Label::LikelyOrProbable);
        assert_eq!(config.tables, TableLimits::default());
        let extractor = config.extractor.unwrap();
        assert!(extractor.args.is_empty());
        assert_eq!(extractor.generator().program, "cat");
    }

    #[test]
    fn unknown_label_is_rejected() {
        let err = EvidenceNetConfig::from_toml_str("[engine]\ndefault_prior = \"Perhaps\"\n")
            .unwrap_err();
        assert!(matches!(err, EvidenceNetError::Serialization(_)));
    }

    #[test]
    fn table_input_ceiling_is_enforced() {
        let err = EvidenceNetConfig::from_toml_str("[tables]\nmax_inputs = 40\n").unwrap_err();
        assert!(matches!(err, EvidenceNetError::InvalidParameter(msg) if msg.contains("24")));
        let config = EvidenceNetConfig::from_toml_str("[tables]\nmax_inputs = 24\n").unwrap();
        assert_eq!(config.tables.max_inputs, MAX_TABLE_INPUTS);

        let dir = tempfile::tempdir().unwrap();
        let provider = TomlConfigProvider::new(dir.path().join("evnet.toml"));
        let mut config = EvidenceNetConfig::default();
        config.tables.max_inputs = 64;
        assert!(provider.set_config(&config).is_err());
        assert!(!provider.path().exists());
    }

    #[test]
    fn written_config_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let provider = TomlConfigProvider::new(dir.path().join("evnet.toml"));
        let mut config = EvidenceNetConfig::default();
        config.tables.max_inputs = 8;
        config.extractor = Some(ExtractorConfig {
            program: "llm".to_string(),
            args: vec!["-m".to_string(), "local".to_string()],
        });
        provider.set_config(&config).unwrap();
        assert_eq!(provider.get_config().unwrap(), config);
    }
}
