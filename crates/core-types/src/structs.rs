use crate::enums::{Column, MetricKey};
use crate::error::CoreError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The set of columns present in a loaded source.
///
/// A column can be part of the schema while individual records still miss a
/// value for it; the schema only answers "does the source have this column".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    columns: BTreeSet<Column>,
}

impl Schema {
    pub fn new(columns: impl IntoIterator<Item = Column>) -> Self {
        Self {
            columns: columns.into_iter().collect(),
        }
    }

    /// A schema with every known column present.
    pub fn complete() -> Self {
        Self::new(Column::ALL)
    }

    pub fn contains(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    /// Returns the subset of `required` that is absent, preserving the given order.
    pub fn missing(&self, required: &[Column]) -> Vec<Column> {
        required
            .iter()
            .copied()
            .filter(|c| !self.columns.contains(c))
            .collect()
    }

    /// Filterable columns that this source actually has.
    pub fn filterable_columns(&self) -> Vec<Column> {
        Column::FILTERABLE
            .into_iter()
            .filter(|c| self.columns.contains(c))
            .collect()
    }

    /// Returns a copy of this schema without `column`.
    pub fn without(&self, column: Column) -> Self {
        let mut columns = self.columns.clone();
        columns.remove(&column);
        Self { columns }
    }
}

/// One raw row of the partner base, as produced by a loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerRecord {
    pub name: String,
    pub referrals_received: u64,
    pub referrals_qualified: u64,
    pub referrals_closed: u64,
    pub city: Option<String>,
    pub acquisition_channel: Option<String>,
    pub partner_type: Option<String>,
    pub partnership_status: Option<String>,
    /// Raw last-contact cell. Parsing happens during metric derivation so a
    /// malformed date only affects that record's `days_since_contact`.
    pub last_contact: Option<String>,
    pub satisfaction_score: Option<Decimal>,
}

impl PartnerRecord {
    /// Creates a record with the given identity and counters and no optional attributes.
    pub fn new(name: impl Into<String>, received: u64, qualified: u64, closed: u64) -> Self {
        Self {
            name: name.into(),
            referrals_received: received,
            referrals_qualified: qualified,
            referrals_closed: closed,
            city: None,
            acquisition_channel: None,
            partner_type: None,
            partnership_status: None,
            last_contact: None,
            satisfaction_score: None,
        }
    }

    /// The textual value of a categorical column (or the partner name).
    pub fn category(&self, column: Column) -> Option<&str> {
        match column {
            Column::PartnerName => Some(self.name.as_str()),
            Column::City => self.city.as_deref(),
            Column::AcquisitionChannel => self.acquisition_channel.as_deref(),
            Column::PartnerType => self.partner_type.as_deref(),
            Column::PartnershipStatus => self.partnership_status.as_deref(),
            Column::LastContactDate => self.last_contact.as_deref(),
            Column::ReferralsReceived
            | Column::ReferralsQualified
            | Column::ReferralsClosed
            | Column::SatisfactionScore => None,
        }
    }
}

/// The raw, not yet derived, partner base.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartnerTable {
    pub schema: Schema,
    pub records: Vec<PartnerRecord>,
}

impl PartnerTable {
    pub fn new(schema: Schema, records: Vec<PartnerRecord>) -> Self {
        Self { schema, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Indicators computed from a record's raw columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedFields {
    /// closed / received, 0 when nothing was received.
    pub conversion_rate: Decimal,
    /// qualified / received, 0 when nothing was received.
    pub qualification_rate: Decimal,
    /// None when the last contact date is missing or unparseable.
    pub days_since_contact: Option<i64>,
    /// None until the partner has been through risk classification.
    pub churn_risk: Option<bool>,
}

/// A partner record together with its derived fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    pub record: PartnerRecord,
    pub metrics: DerivedFields,
}

impl Partner {
    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn category(&self, column: Column) -> Option<&str> {
        self.record.category(column)
    }

    /// Evaluates a metric for this partner; None means undefined.
    pub fn metric(&self, key: MetricKey) -> Option<Decimal> {
        match key {
            MetricKey::ConversionRate => Some(self.metrics.conversion_rate),
            MetricKey::QualificationRate => Some(self.metrics.qualification_rate),
            MetricKey::DaysSinceContact => self.metrics.days_since_contact.map(Decimal::from),
            MetricKey::SatisfactionScore => self.record.satisfaction_score,
            MetricKey::ReferralsReceived => Some(Decimal::from(self.record.referrals_received)),
            MetricKey::ReferralsQualified => Some(Decimal::from(self.record.referrals_qualified)),
            MetricKey::ReferralsClosed => Some(Decimal::from(self.record.referrals_closed)),
        }
    }
}

/// An ordered collection of derived partners sharing one schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub schema: Schema,
    pub partners: Vec<Partner>,
}

impl Dataset {
    pub fn new(schema: Schema, partners: Vec<Partner>) -> Self {
        Self { schema, partners }
    }

    /// Builds a new dataset over the same schema.
    pub fn with_partners(&self, partners: Vec<Partner>) -> Self {
        Self {
            schema: self.schema.clone(),
            partners,
        }
    }

    pub fn len(&self) -> usize {
        self.partners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Partner> {
        self.partners.iter()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Partner;
    type IntoIter = std::slice::Iter<'a, Partner>;

    fn into_iter(self) -> Self::IntoIter {
        self.partners.iter()
    }
}

/// Inclusion filters keyed by column.
///
/// A column without an entry accepts every value. A column mapped to an
/// empty set accepts nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    constraints: BTreeMap<Column, BTreeSet<String>>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`FilterSpec::constrain`].
    pub fn with<I, S>(mut self, column: Column, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constrain(column, values);
        self
    }

    /// Replaces the accepted values for `column`.
    pub fn constrain<I, S>(&mut self, column: Column, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constraints
            .insert(column, values.into_iter().map(Into::into).collect());
    }

    pub fn accepted(&self, column: Column) -> Option<&BTreeSet<String>> {
        self.constraints.get(&column)
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Column, &BTreeSet<String>)> {
        self.constraints.iter().map(|(c, v)| (*c, v))
    }

    /// Parses a `Header=value1,value2` assignment and adds it to the filter.
    ///
    /// `Header=` constrains the column to nothing. An unknown header is
    /// accepted and ignored; the return value tells whether it was recognised.
    pub fn add_assignment(&mut self, assignment: &str) -> Result<bool, CoreError> {
        let (header, values) = assignment.split_once('=').ok_or_else(|| {
            CoreError::InvalidInput("filter".to_string(), assignment.to_string())
        })?;
        let Some(column) = Column::from_header(header.trim()) else {
            tracing::debug!(header = header.trim(), "Ignoring filter on unknown column.");
            return Ok(false);
        };
        let values: Vec<&str> = values
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect();
        self.constrain(column, values);
        Ok(true)
    }
}
