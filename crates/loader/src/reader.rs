use crate::error::LoaderError;
use core_types::{Column, PartnerRecord, PartnerTable, Schema};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// Satisfaction scores are on a 0 to 100 scale.
const MAX_SATISFACTION: Decimal = Decimal::ONE_HUNDRED;

/// Opens and parses the partner base stored at `path`.
pub fn load_partner_table(path: &Path) -> Result<PartnerTable, LoaderError> {
    let file = File::open(path).map_err(|source| LoaderError::Unavailable {
        path: path.to_path_buf(),
        source,
    })?;
    let table = read_partner_table(file)?;
    tracing::info!(
        path = %path.display(),
        records = table.len(),
        "Partner base loaded."
    );
    Ok(table)
}

/// Parses a CSV partner base from any reader. The first row must hold the headers.
pub fn read_partner_table<R: Read>(reader: R) -> Result<PartnerTable, LoaderError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let layout = ColumnLayout::from_headers(csv_reader.headers()?)?;

    let mut records = Vec::new();
    for (index, row) in csv_reader.records().enumerate() {
        let row = row?;
        // Header is line 1; fall back to that numbering when csv has no position.
        let line = row
            .position()
            .map(|p| p.line())
            .unwrap_or(index as u64 + 2);
        records.push(layout.parse_row(&row, line)?);
    }

    Ok(PartnerTable::new(layout.schema(), records))
}

/// Maps each recognised column to its position in the source rows.
struct ColumnLayout {
    positions: HashMap<Column, usize>,
}

impl ColumnLayout {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, LoaderError> {
        let mut positions = HashMap::new();
        for (index, header) in headers.iter().enumerate() {
            let header = header.trim_start_matches('\u{feff}').trim();
            match Column::from_header(header) {
                Some(column) => {
                    if positions.insert(column, index).is_some() {
                        return Err(LoaderError::DuplicateColumn(header.to_string()));
                    }
                }
                None => tracing::debug!(header, "Ignoring unknown column."),
            }
        }

        let missing: Vec<String> = Column::REQUIRED_AT_LOAD
            .iter()
            .filter(|c| !positions.contains_key(c))
            .map(|c| c.header().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoaderError::MissingColumns(missing));
        }

        Ok(Self { positions })
    }

    fn schema(&self) -> Schema {
        Schema::new(self.positions.keys().copied())
    }

    /// The trimmed cell for `column`, or None when the column is absent or the cell blank.
    fn cell<'r>(&self, row: &'r csv::StringRecord, column: Column) -> Option<&'r str> {
        let index = *self.positions.get(&column)?;
        row.get(index).map(str::trim).filter(|v| !v.is_empty())
    }

    fn text(&self, row: &csv::StringRecord, column: Column) -> Option<String> {
        self.cell(row, column).map(str::to_string)
    }

    fn parse_row(&self, row: &csv::StringRecord, line: u64) -> Result<PartnerRecord, LoaderError> {
        let satisfaction_score = self.cell(row, Column::SatisfactionScore).and_then(|raw| {
            match Decimal::from_str(raw) {
                Ok(score) if (Decimal::ZERO..=MAX_SATISFACTION).contains(&score) => Some(score),
                Ok(_) => {
                    tracing::warn!(line, value = raw, "Satisfaction score outside 0..=100 treated as missing.");
                    None
                }
                Err(_) => {
                    tracing::warn!(line, value = raw, "Unparseable satisfaction score treated as missing.");
                    None
                }
            }
        });

        Ok(PartnerRecord {
            name: self.text(row, Column::PartnerName).unwrap_or_default(),
            referrals_received: self.count(row, Column::ReferralsReceived, line)?,
            referrals_qualified: self.count(row, Column::ReferralsQualified, line)?,
            referrals_closed: self.count(row, Column::ReferralsClosed, line)?,
            city: self.text(row, Column::City),
            acquisition_channel: self.text(row, Column::AcquisitionChannel),
            partner_type: self.text(row, Column::PartnerType),
            partnership_status: self.text(row, Column::PartnershipStatus),
            last_contact: self.text(row, Column::LastContactDate),
            satisfaction_score,
        })
    }

    /// Parses a referral counter. Blank cells count as zero; spreadsheet
    /// exports may write integers as `12.0`.
    fn count(&self, row: &csv::StringRecord, column: Column, line: u64) -> Result<u64, LoaderError> {
        let Some(raw) = self.cell(row, column) else {
            return Ok(0);
        };
        let malformed = |reason: &str| LoaderError::MalformedField {
            line,
            column,
            value: raw.to_string(),
            reason: reason.to_string(),
        };

        let value = Decimal::from_str(raw).map_err(|_| malformed("not a number"))?;
        if value.is_sign_negative() && !value.is_zero() {
            return Err(malformed("counts cannot be negative"));
        }
        if !value.fract().is_zero() {
            return Err(malformed("counts must be whole numbers"));
        }
        value.to_u64().ok_or_else(|| malformed("count out of range"))
    }
}
