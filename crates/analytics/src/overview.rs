use crate::stats::mean;
use core_types::{Column, Dataset, MetricKey};
use rust_decimal::Decimal;
use serde::Serialize;

/// Headline figures for a (possibly filtered) dataset.
///
/// Every mean is None when there is nothing to average; the satisfaction
/// mean is also None when the source has no satisfaction column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub total_partners: usize,
    pub mean_conversion_rate: Option<Decimal>,
    pub mean_qualification_rate: Option<Decimal>,
    pub mean_satisfaction_score: Option<Decimal>,
}

pub fn overview(dataset: &Dataset) -> Overview {
    let mean_of = |key: MetricKey| mean(dataset.iter().filter_map(|p| p.metric(key)));

    let mean_satisfaction_score = if dataset.schema.contains(Column::SatisfactionScore) {
        mean_of(MetricKey::SatisfactionScore)
    } else {
        None
    };

    Overview {
        total_partners: dataset.len(),
        mean_conversion_rate: mean_of(MetricKey::ConversionRate),
        mean_qualification_rate: mean_of(MetricKey::QualificationRate),
        mean_satisfaction_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::derive_metrics;
    use chrono::NaiveDate;
    use core_types::{PartnerRecord, PartnerTable, Schema};
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn averages_rates_and_scores() {
        let mut a = PartnerRecord::new("A", 10, 4, 5);
        a.satisfaction_score = Some(dec!(80));
        let mut b = PartnerRecord::new("B", 4, 4, 0);
        b.satisfaction_score = None;
        let c = PartnerRecord {
            satisfaction_score: Some(dec!(40)),
            ..PartnerRecord::new("C", 0, 0, 0)
        };
        let dataset = derive_metrics(&PartnerTable::new(Schema::complete(), vec![a, b, c]), today());

        let summary = overview(&dataset);
        assert_eq!(summary.total_partners, 3);
        assert_eq!(summary.mean_conversion_rate, Some(dec!(0.5) / dec!(3)));
        assert_eq!(summary.mean_qualification_rate, Some(dec!(1.4) / dec!(3)));
        // Missing scores are ignored rather than counted as zero.
        assert_eq!(summary.mean_satisfaction_score, Some(dec!(60)));
    }

    #[test]
    fn empty_dataset_has_no_means() {
        let dataset = derive_metrics(&PartnerTable::new(Schema::complete(), vec![]), today());
        let summary = overview(&dataset);
        assert_eq!(summary.total_partners, 0);
        assert_eq!(summary.mean_conversion_rate, None);
        assert_eq!(summary.mean_qualification_rate, None);
        assert_eq!(summary.mean_satisfaction_score, None);
    }

    #[test]
    fn satisfaction_mean_requires_the_column() {
        let schema = Schema::complete().without(Column::SatisfactionScore);
        let dataset = derive_metrics(&PartnerTable::new(schema, vec![PartnerRecord::new("A", 1, 1, 1)]), today());
        assert_eq!(overview(&dataset).mean_satisfaction_score, None);
    }
}
