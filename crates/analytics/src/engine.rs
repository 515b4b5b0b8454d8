use chrono::{DateTime, NaiveDate, NaiveDateTime};
use core_types::{Dataset, DerivedFields, Partner, PartnerRecord, PartnerTable};
use rust_decimal::Decimal;

/// Date-time layouts accepted for the last contact cell, tried in order.
const DATE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%d/%m/%Y %H:%M:%S"];
/// Date-only layouts accepted for the last contact cell, tried in order.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// A stateless calculator for the derived fields of every partner.
///
/// The reference date is fixed at construction so a derivation is a pure
/// function of its input table.
#[derive(Debug, Clone, Copy)]
pub struct MetricsEngine {
    today: NaiveDate,
}

impl MetricsEngine {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Derives metrics for every record of `table`, preserving order.
    ///
    /// Never fails: a last contact date that cannot be parsed only leaves that
    /// partner's `days_since_contact` undefined.
    pub fn derive(&self, table: &PartnerTable) -> Dataset {
        let mut malformed_dates = 0usize;

        let partners: Vec<Partner> = table
            .records
            .iter()
            .map(|record| {
                let metrics = self.derive_record(record);
                if record.last_contact.is_some() && metrics.days_since_contact.is_none() {
                    malformed_dates += 1;
                    tracing::debug!(
                        partner = %record.name,
                        value = record.last_contact.as_deref().unwrap_or_default(),
                        "Unparseable last contact date."
                    );
                }
                Partner {
                    record: record.clone(),
                    metrics,
                }
            })
            .collect();

        if malformed_dates > 0 {
            tracing::warn!(
                count = malformed_dates,
                "Some last contact dates could not be parsed; days since contact is undefined for them."
            );
        }
        tracing::info!(partners = partners.len(), today = %self.today, "Metrics derived.");

        Dataset::new(table.schema.clone(), partners)
    }

    /// Computes the derived fields of a single record.
    pub fn derive_record(&self, record: &PartnerRecord) -> DerivedFields {
        let days_since_contact = record
            .last_contact
            .as_deref()
            .and_then(parse_contact_date)
            .map(|date| (self.today - date).num_days());

        DerivedFields {
            conversion_rate: rate(record.referrals_closed, record.referrals_received),
            qualification_rate: rate(record.referrals_qualified, record.referrals_received),
            days_since_contact,
            churn_risk: None,
        }
    }
}

/// Derives metrics for `table` as of `today`.
pub fn derive_metrics(table: &PartnerTable, today: NaiveDate) -> Dataset {
    MetricsEngine::new(today).derive(table)
}

/// `numerator / denominator`, with a zero denominator resolving to zero.
pub fn rate(numerator: u64, denominator: u64) -> Decimal {
    if denominator == 0 {
        return Decimal::ZERO;
    }
    Decimal::from(numerator) / Decimal::from(denominator)
}

/// Parses a last contact cell into a calendar date; the time of day is dropped.
pub fn parse_contact_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Some(dt) = DATE_TIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
    {
        return Some(dt.date());
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
}
