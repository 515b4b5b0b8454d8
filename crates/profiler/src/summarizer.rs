use crate::error::ProfileError;
use analytics::percentile;
use configuration::ProfileSettings;
use core_types::{Column, Dataset};
use rust_decimal::Decimal;
use serde::Serialize;

/// The traits shared by the best partners of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileDescriptor {
    /// The percentile the thresholds were taken at.
    pub percentile: Decimal,
    pub conversion_rate_threshold: Decimal,
    /// None when the satisfaction column is absent or no partner has a score.
    pub satisfaction_threshold: Option<Decimal>,
    pub best_channel: Option<String>,
    /// An ideal partner was contacted within this many days.
    pub recent_contact_days: u32,
}

/// Builds `ProfileDescriptor`s from a fixed set of settings.
#[derive(Debug, Clone, Default)]
pub struct ProfileSummarizer {
    settings: ProfileSettings,
}

impl ProfileSummarizer {
    pub fn new(settings: ProfileSettings) -> Result<Self, ProfileError> {
        if settings.percentile < Decimal::ZERO || settings.percentile > Decimal::ONE {
            return Err(ProfileError::InvalidParameters(format!(
                "percentile must be between 0 and 1, got {}",
                settings.percentile
            )));
        }
        Ok(Self { settings })
    }

    /// Describes the ideal partner of `dataset`.
    ///
    /// `best_channel` must be the best group of the channel summary computed
    /// on the same dataset; pass None when that summary is unavailable.
    pub fn ideal_profile(
        &self,
        dataset: &Dataset,
        best_channel: Option<&str>,
    ) -> Result<ProfileDescriptor, ProfileError> {
        if dataset.is_empty() {
            return Err(ProfileError::EmptyInput);
        }
        let q = self.settings.percentile;

        let conversion: Vec<Decimal> = dataset.iter().map(|p| p.metrics.conversion_rate).collect();
        let conversion_rate_threshold = percentile(&conversion, q)?.ok_or(ProfileError::EmptyInput)?;

        let satisfaction_threshold = if dataset.schema.contains(Column::SatisfactionScore) {
            let scores: Vec<Decimal> = dataset
                .iter()
                .filter_map(|p| p.record.satisfaction_score)
                .collect();
            percentile(&scores, q)?
        } else {
            None
        };

        tracing::debug!(
            %conversion_rate_threshold,
            ?satisfaction_threshold,
            ?best_channel,
            "Ideal profile computed."
        );
        Ok(ProfileDescriptor {
            percentile: q,
            conversion_rate_threshold,
            satisfaction_threshold,
            best_channel: best_channel.map(str::to_string),
            recent_contact_days: self.settings.recent_contact_days,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analyzer::aggregate_by_channel;
    use core_types::{DerivedFields, MetricKey, Partner, PartnerRecord, Schema};
    use rust_decimal_macros::dec;

    fn partner(channel: &str, conversion: Decimal, satisfaction: Option<Decimal>) -> Partner {
        Partner {
            record: PartnerRecord {
                acquisition_channel: Some(channel.to_string()),
                satisfaction_score: satisfaction,
                ..PartnerRecord::new("P", 10, 5, 1)
            },
            metrics: DerivedFields {
                conversion_rate: conversion,
                qualification_rate: dec!(0.5),
                days_since_contact: Some(3),
                churn_risk: None,
            },
        }
    }

    fn dataset() -> Dataset {
        Dataset::new(
            Schema::complete(),
            vec![
                partner("Evento", dec!(0.1), Some(dec!(10))),
                partner("Indicação", dec!(0.2), Some(dec!(20))),
                partner("Indicação", dec!(0.3), None),
                partner("Site", dec!(0.4), Some(dec!(40))),
            ],
        )
    }

    #[test]
    fn thresholds_interpolate_between_order_statistics() {
        let profile = ProfileSummarizer::default()
            .ideal_profile(&dataset(), Some("Indicação"))
            .unwrap();
        assert_eq!(profile.percentile, dec!(0.75));
        assert_eq!(profile.conversion_rate_threshold, dec!(0.325));
        // Partners without a score are left out: [10, 20, 40] at 0.75.
        assert_eq!(profile.satisfaction_threshold, Some(dec!(30)));
        assert_eq!(profile.recent_contact_days, 30);
    }

    #[test]
    fn best_channel_matches_the_channel_summary() {
        let data = dataset();
        let channels = aggregate_by_channel(&data, MetricKey::ConversionRate).unwrap();
        let profile = ProfileSummarizer::default()
            .ideal_profile(&data, channels.best_group())
            .unwrap();
        assert_eq!(profile.best_channel.as_deref(), channels.best_group());
        assert_eq!(profile.best_channel.as_deref(), Some("Site"));
    }

    #[test]
    fn empty_dataset_is_an_explicit_error() {
        let result = ProfileSummarizer::default().ideal_profile(&Dataset::new(Schema::complete(), vec![]), None);
        assert!(matches!(result, Err(ProfileError::EmptyInput)));
    }

    #[test]
    fn satisfaction_threshold_is_undefined_without_the_column() {
        let data = dataset();
        let data = Dataset::new(data.schema.without(Column::SatisfactionScore), data.partners);
        let profile = ProfileSummarizer::default().ideal_profile(&data, None).unwrap();
        assert_eq!(profile.satisfaction_threshold, None);
        assert_eq!(profile.best_channel, None);
    }

    #[test]
    fn satisfaction_threshold_is_undefined_when_nobody_has_a_score() {
        let data = Dataset::new(Schema::complete(), vec![partner("Site", dec!(0.5), None)]);
        let profile = ProfileSummarizer::default().ideal_profile(&data, Some("Site")).unwrap();
        assert_eq!(profile.satisfaction_threshold, None);
        assert_eq!(profile.conversion_rate_threshold, dec!(0.5));
    }

    #[test]
    fn custom_settings_are_applied() {
        let summarizer = ProfileSummarizer::new(ProfileSettings {
            percentile: dec!(0.5),
            recent_contact_days: 14,
        })
        .unwrap();
        let profile = summarizer.ideal_profile(&dataset(), None).unwrap();
        assert_eq!(profile.conversion_rate_threshold, dec!(0.25));
        assert_eq!(profile.recent_contact_days, 14);
    }

    #[test]
    fn out_of_range_percentile_is_rejected() {
        let result = ProfileSummarizer::new(ProfileSettings {
            percentile: dec!(1.1),
            ..ProfileSettings::default()
        });
        assert!(matches!(result, Err(ProfileError::InvalidParameters(_))));
    }
}
