use crate::error::RiskError;
use crate::{AtRiskPartner, ChurnReason, RiskClassifier, RiskReport};
use configuration::RiskRules;
use core_types::{Column, Dataset, Partner};
use std::cmp::Ordering;

/// Columns every churn clause reads from. All of them must exist in the data.
pub const REQUIRED_COLUMNS: [Column; 4] = [
    Column::PartnershipStatus,
    Column::SatisfactionScore,
    Column::LastContactDate,
    Column::ReferralsClosed,
];

/// A concrete implementation of the `RiskClassifier` trait.
///
/// A partner is at risk when it meets at least one of the configured
/// thresholds. A missing per-partner value never meets a threshold.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedClassifier {
    rules: RiskRules,
}

impl RuleBasedClassifier {
    /// Creates a new `RuleBasedClassifier` with the given thresholds.
    pub fn new(rules: RiskRules) -> Result<Self, RiskError> {
        rules
            .validate()
            .map_err(|e| RiskError::InvalidParameters(e.to_string()))?;
        Ok(Self { rules })
    }

    /// Every clause `partner` meets, in clause order. Empty when not at risk.
    pub fn reasons(&self, partner: &Partner) -> Vec<ChurnReason> {
        let mut reasons = Vec::new();

        if partner.record.partnership_status.as_deref() == Some(self.rules.inactive_status.as_str()) {
            reasons.push(ChurnReason::Inactive);
        }
        if partner
            .record
            .satisfaction_score
            .is_some_and(|score| score < self.rules.min_satisfaction)
        {
            reasons.push(ChurnReason::LowSatisfaction);
        }
        if partner
            .metrics
            .days_since_contact
            .is_some_and(|days| days > self.rules.max_days_without_contact)
        {
            reasons.push(ChurnReason::ContactLapsed);
        }
        if partner.metrics.conversion_rate < self.rules.min_conversion_rate {
            reasons.push(ChurnReason::LowConversion);
        }

        reasons
    }
}

impl RiskClassifier for RuleBasedClassifier {
    fn classify(&self, dataset: &Dataset) -> Result<RiskReport, RiskError> {
        // --- 1. Refuse to run on a source that cannot answer every clause ---
        let missing = dataset.schema.missing(&REQUIRED_COLUMNS);
        if !missing.is_empty() {
            tracing::warn!(?missing, "Churn risk skipped: required columns are absent.");
            return Err(RiskError::SchemaIncomplete { missing });
        }

        // --- 2. Flag every partner ---
        let mut assessed = Vec::with_capacity(dataset.len());
        let mut at_risk = Vec::new();
        for partner in dataset {
            let reasons = self.reasons(partner);
            let mut partner = partner.clone();
            partner.metrics.churn_risk = Some(!reasons.is_empty());
            if !reasons.is_empty() {
                at_risk.push(AtRiskPartner {
                    partner: partner.clone(),
                    reasons,
                });
            }
            assessed.push(partner);
        }

        // --- 3. Longest without contact first; unknown contact last ---
        at_risk.sort_by(|a, b| {
            match (a.partner.metrics.days_since_contact, b.partner.metrics.days_since_contact) {
                (Some(a), Some(b)) => b.cmp(&a),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        });

        tracing::info!(
            assessed = assessed.len(),
            flagged = at_risk.len(),
            "Churn risk classified."
        );
        Ok(RiskReport {
            flagged_count: at_risk.len(),
            assessed: dataset.with_partners(assessed),
            at_risk,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{DerivedFields, PartnerRecord, Schema};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn partner(
        name: &str,
        status: Option<&str>,
        satisfaction: Option<Decimal>,
        days: Option<i64>,
        conversion: Decimal,
    ) -> Partner {
        Partner {
            record: PartnerRecord {
                partnership_status: status.map(str::to_string),
                satisfaction_score: satisfaction,
                ..PartnerRecord::new(name, 10, 5, 5)
            },
            metrics: DerivedFields {
                conversion_rate: conversion,
                qualification_rate: dec!(0.5),
                days_since_contact: days,
                churn_risk: None,
            },
        }
    }

    fn healthy(name: &str) -> Partner {
        partner(name, Some("Active"), Some(dec!(90)), Some(1), dec!(0.9))
    }

    fn classify(partners: Vec<Partner>) -> RiskReport {
        RuleBasedClassifier::default()
            .classify(&Dataset::new(Schema::complete(), partners))
            .unwrap()
    }

    #[test]
    fn inactive_alone_is_enough_to_flag() {
        let report = classify(vec![partner("A", Some("Inactive"), Some(dec!(95)), Some(0), dec!(0.9))]);
        assert_eq!(report.flagged_count, 1);
        assert_eq!(report.assessed.partners[0].metrics.churn_risk, Some(true));
        assert_eq!(report.at_risk[0].reasons, vec![ChurnReason::Inactive]);
    }

    #[test]
    fn each_clause_flags_on_its_own() {
        let classifier = RuleBasedClassifier::default();
        assert_eq!(
            classifier.reasons(&partner("A", Some("Active"), Some(dec!(29.9)), Some(1), dec!(0.9))),
            vec![ChurnReason::LowSatisfaction]
        );
        assert_eq!(
            classifier.reasons(&partner("A", Some("Active"), Some(dec!(90)), Some(61), dec!(0.9))),
            vec![ChurnReason::ContactLapsed]
        );
        assert_eq!(
            classifier.reasons(&partner("A", Some("Active"), Some(dec!(90)), Some(1), dec!(0.19))),
            vec![ChurnReason::LowConversion]
        );
        assert!(classifier.reasons(&healthy("A")).is_empty());
    }

    #[test]
    fn thresholds_are_strict() {
        let classifier = RuleBasedClassifier::default();
        let on_the_line = partner("A", Some("Active"), Some(dec!(30)), Some(60), dec!(0.2));
        assert!(classifier.reasons(&on_the_line).is_empty());
    }

    #[test]
    fn missing_values_never_trigger_a_clause() {
        let classifier = RuleBasedClassifier::default();
        let unknowns = partner("A", None, None, None, dec!(0.5));
        assert!(classifier.reasons(&unknowns).is_empty());
    }

    #[test]
    fn reasons_are_listed_in_clause_order() {
        let classifier = RuleBasedClassifier::default();
        let everything = partner("A", Some("Inactive"), Some(dec!(10)), Some(120), dec!(0));
        assert_eq!(
            classifier.reasons(&everything),
            vec![
                ChurnReason::Inactive,
                ChurnReason::LowSatisfaction,
                ChurnReason::ContactLapsed,
                ChurnReason::LowConversion,
            ]
        );
    }

    #[test]
    fn flagged_partners_are_sorted_by_days_without_contact() {
        let report = classify(vec![
            partner("A", Some("Inactive"), None, Some(10), dec!(0.9)),
            healthy("B"),
            partner("C", Some("Inactive"), None, None, dec!(0.9)),
            partner("D", Some("Active"), None, Some(200), dec!(0.9)),
            partner("E", Some("Active"), None, Some(10), dec!(0.1)),
        ]);
        let order: Vec<&str> = report.at_risk.iter().map(|r| r.partner.name()).collect();
        assert_eq!(order, vec!["D", "A", "E", "C"]);
        assert_eq!(report.flagged_count, 4);

        // The assessed dataset keeps input order and marks everyone.
        let flags: Vec<Option<bool>> = report.assessed.iter().map(|p| p.metrics.churn_risk).collect();
        assert_eq!(flags, vec![Some(true), Some(false), Some(true), Some(true), Some(true)]);
    }

    #[test]
    fn nobody_at_risk_is_a_valid_outcome() {
        let report = classify(vec![healthy("A"), healthy("B")]);
        assert_eq!(report.flagged_count, 0);
        assert!(report.at_risk.is_empty());
    }

    #[test]
    fn refuses_when_any_required_column_is_absent() {
        for column in REQUIRED_COLUMNS {
            let dataset = Dataset::new(Schema::complete().without(column), vec![healthy("A")]);
            let err = RuleBasedClassifier::default().classify(&dataset).unwrap_err();
            assert_eq!(err, RiskError::SchemaIncomplete { missing: vec![column] });
        }
        // Even an empty dataset is refused.
        let empty = Dataset::new(Schema::complete().without(Column::SatisfactionScore), vec![]);
        assert!(RuleBasedClassifier::default().classify(&empty).is_err());
    }

    #[test]
    fn classification_does_not_touch_the_input() {
        let dataset = Dataset::new(Schema::complete(), vec![healthy("A")]);
        let _ = RuleBasedClassifier::default().classify(&dataset).unwrap();
        assert_eq!(dataset.partners[0].metrics.churn_risk, None);
    }

    #[test]
    fn custom_inactive_label_is_honoured() {
        let classifier = RuleBasedClassifier::new(RiskRules {
            inactive_status: "Inativo".to_string(),
            ..RiskRules::default()
        })
        .unwrap();
        let inativo = partner("A", Some("Inativo"), Some(dec!(90)), Some(1), dec!(0.9));
        let inactive = partner("B", Some("Inactive"), Some(dec!(90)), Some(1), dec!(0.9));
        assert_eq!(classifier.reasons(&inativo), vec![ChurnReason::Inactive]);
        assert!(classifier.reasons(&inactive).is_empty());
    }

    #[test]
    fn invalid_thresholds_are_rejected() {
        let result = RuleBasedClassifier::new(RiskRules {
            min_conversion_rate: dec!(1.5),
            ..RiskRules::default()
        });
        assert!(matches!(result, Err(RiskError::InvalidParameters(_))));
    }
}
