use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A column of the partner base, identified by its exact source header.
///
/// Header matching is case- and accent-sensitive: `"Canal de aquisição"` and
/// `"Canal de aquisicao"` are different columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    PartnerName,
    ReferralsReceived,
    ReferralsQualified,
    ReferralsClosed,
    City,
    AcquisitionChannel,
    PartnerType,
    PartnershipStatus,
    LastContactDate,
    SatisfactionScore,
}

impl Column {
    /// Every known column, in source order.
    pub const ALL: [Column; 10] = [
        Column::PartnerName,
        Column::ReferralsReceived,
        Column::ReferralsQualified,
        Column::ReferralsClosed,
        Column::City,
        Column::AcquisitionChannel,
        Column::PartnerType,
        Column::PartnershipStatus,
        Column::LastContactDate,
        Column::SatisfactionScore,
    ];

    /// Columns without which no derived field can be computed.
    pub const REQUIRED_AT_LOAD: [Column; 5] = [
        Column::PartnerName,
        Column::ReferralsReceived,
        Column::ReferralsQualified,
        Column::ReferralsClosed,
        Column::LastContactDate,
    ];

    /// Categorical columns that accept inclusion filters.
    pub const FILTERABLE: [Column; 4] = [
        Column::City,
        Column::AcquisitionChannel,
        Column::PartnerType,
        Column::PartnershipStatus,
    ];

    /// The exact header used by the source spreadsheet.
    pub fn header(&self) -> &'static str {
        match self {
            Column::PartnerName => "Nome do Parceiro",
            Column::ReferralsReceived => "Quantidade de indicações de proprietários",
            Column::ReferralsQualified => "Quantidade de indicações que foram qualificadas",
            Column::ReferralsClosed => "Quantidade de indicações que foram fechadas",
            Column::City => "Cidade",
            Column::AcquisitionChannel => "Canal de aquisição",
            Column::PartnerType => "Tipo de parceiro",
            Column::PartnershipStatus => "Status da parceria",
            Column::LastContactDate => "Data de último contato",
            Column::SatisfactionScore => "NPS da última interação",
        }
    }

    /// Looks up a column by its exact header.
    pub fn from_header(header: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.header() == header)
    }

    pub fn is_filterable(&self) -> bool {
        Column::FILTERABLE.contains(self)
    }
}

/// Joins the headers of `columns` for use in messages.
pub fn describe_columns(columns: &[Column]) -> String {
    columns
        .iter()
        .map(|c| format!("'{}'", c.header()))
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// A numeric field that rankings and aggregations can be keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    ConversionRate,
    QualificationRate,
    DaysSinceContact,
    SatisfactionScore,
    ReferralsReceived,
    ReferralsQualified,
    ReferralsClosed,
}

impl MetricKey {
    /// The source column this metric is computed from.
    pub fn source_column(&self) -> Column {
        match self {
            MetricKey::ConversionRate => Column::ReferralsClosed,
            MetricKey::QualificationRate => Column::ReferralsQualified,
            MetricKey::DaysSinceContact => Column::LastContactDate,
            MetricKey::SatisfactionScore => Column::SatisfactionScore,
            MetricKey::ReferralsReceived => Column::ReferralsReceived,
            MetricKey::ReferralsQualified => Column::ReferralsQualified,
            MetricKey::ReferralsClosed => Column::ReferralsClosed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKey::ConversionRate => "conversion_rate",
            MetricKey::QualificationRate => "qualification_rate",
            MetricKey::DaysSinceContact => "days_since_contact",
            MetricKey::SatisfactionScore => "satisfaction_score",
            MetricKey::ReferralsReceived => "referrals_received",
            MetricKey::ReferralsQualified => "referrals_qualified",
            MetricKey::ReferralsClosed => "referrals_closed",
        }
    }

    /// True for metrics that are ratios and are best displayed as percentages.
    pub fn is_rate(&self) -> bool {
        matches!(self, MetricKey::ConversionRate | MetricKey::QualificationRate)
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "conversion_rate" => Ok(MetricKey::ConversionRate),
            "qualification_rate" => Ok(MetricKey::QualificationRate),
            "days_since_contact" => Ok(MetricKey::DaysSinceContact),
            "satisfaction_score" => Ok(MetricKey::SatisfactionScore),
            "referrals_received" => Ok(MetricKey::ReferralsReceived),
            "referrals_qualified" => Ok(MetricKey::ReferralsQualified),
            "referrals_closed" => Ok(MetricKey::ReferralsClosed),
            other => Err(CoreError::InvalidInput(
                "metric".to_string(),
                other.to_string(),
            )),
        }
    }
}
