use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    Config, DataSource, ProfileSettings, Ranking, ReportFormat, ReportSettings, RiskRules,
};

/// The configuration file read when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "partnerscope.toml";

/// Prefix of the environment variables that override file settings,
/// e.g. `PARTNERSCOPE__RANKING__TOP_N=5`.
pub const ENV_PREFIX: &str = "PARTNERSCOPE";

/// Loads the application configuration.
///
/// Settings are read from `path` (which must then exist) or from
/// `partnerscope.toml` in the working directory (which may be absent), and
/// environment variables are layered on top. The result is validated before
/// it is returned.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));

    let builder = config::Config::builder()
        .add_source(config::File::from(file).required(path.is_some()))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    finish(builder)
}

/// Parses a configuration from TOML text, without environment overrides.
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    finish(builder)
}

fn finish(builder: config::Config) -> Result<Config, ConfigError> {
    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;
    tracing::debug!(?config, "Configuration loaded.");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::MetricKey;
    use rust_decimal_macros::dec;

    #[test]
    fn empty_file_yields_default_thresholds() {
        let config = parse_config("").unwrap();
        assert_eq!(config.ranking.top_n, 10);
        assert_eq!(config.ranking.metric, MetricKey::ConversionRate);
        assert_eq!(config.risk_rules.inactive_status, "Inactive");
        assert_eq!(config.risk_rules.min_satisfaction, dec!(30));
        assert_eq!(config.risk_rules.max_days_without_contact, 60);
        assert_eq!(config.risk_rules.min_conversion_rate, dec!(0.2));
        assert_eq!(config.profile.percentile, dec!(0.75));
        assert_eq!(config.profile.recent_contact_days, 30);
        assert_eq!(config.report.format, ReportFormat::Table);
    }

    #[test]
    fn sections_override_individual_fields() {
        let config = parse_config(
            r#"
            [data]
            path = "partners.csv"

            [ranking]
            top_n = 5
            metric = "qualification_rate"

            [risk_rules]
            inactive_status = "Inativo"
            max_days_without_contact = 90

            [report]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.data.path, std::path::PathBuf::from("partners.csv"));
        assert_eq!(config.ranking.top_n, 5);
        assert_eq!(config.ranking.metric, MetricKey::QualificationRate);
        assert_eq!(config.risk_rules.inactive_status, "Inativo");
        assert_eq!(config.risk_rules.max_days_without_contact, 90);
        // Untouched fields keep their defaults.
        assert_eq!(config.risk_rules.min_conversion_rate, dec!(0.2));
        assert_eq!(config.report.format, ReportFormat::Json);
    }

    #[test]
    fn zero_top_n_is_rejected() {
        let err = parse_config("[ranking]\ntop_n = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn percentile_outside_unit_interval_is_rejected() {
        let err = parse_config("[profile]\npercentile = \"1.5\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn negative_day_threshold_is_rejected() {
        let rules = RiskRules {
            max_days_without_contact: -1,
            ..RiskRules::default()
        };
        assert!(rules.validate().is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = load_config(Some(Path::new("does/not/exist.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::LoadError(_)));
    }
}
