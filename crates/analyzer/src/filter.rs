use core_types::{Column, Dataset, FilterSpec};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

/// The selectable values of one filterable column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub column: Column,
    /// Distinct values in order of first appearance.
    pub values: Vec<String>,
}

/// Keeps the partners whose value in every constrained column is accepted.
///
/// Constraints are combined with AND. A constraint with an empty value set
/// rejects everything; a column without a constraint accepts everything.
/// Constraints on columns the dataset does not have, or that are not
/// filterable, are ignored. Survivors keep their relative order.
pub fn apply_filters(dataset: &Dataset, spec: &FilterSpec) -> Dataset {
    let active: Vec<(Column, &BTreeSet<String>)> = spec
        .iter()
        .filter(|(column, _)| {
            if !column.is_filterable() {
                tracing::debug!(%column, "Ignoring filter on a non-filterable column.");
                return false;
            }
            if !dataset.schema.contains(*column) {
                tracing::debug!(%column, "Ignoring filter on a column absent from the data.");
                return false;
            }
            true
        })
        .collect();

    let partners = dataset
        .iter()
        .filter(|partner| {
            active.iter().all(|(column, accepted)| {
                partner
                    .category(*column)
                    .is_some_and(|value| accepted.contains(value))
            })
        })
        .cloned()
        .collect::<Vec<_>>();

    tracing::debug!(
        constraints = active.len(),
        before = dataset.len(),
        after = partners.len(),
        "Filters applied."
    );
    dataset.with_partners(partners)
}

/// Lists the selectable values of every filterable column the dataset has.
pub fn filter_options(dataset: &Dataset) -> Vec<FilterOptions> {
    dataset
        .schema
        .filterable_columns()
        .into_iter()
        .map(|column| {
            let mut seen = HashSet::new();
            let values = dataset
                .iter()
                .filter_map(|p| p.category(column))
                .filter(|v| seen.insert(*v))
                .map(str::to_string)
                .collect();
            FilterOptions { column, values }
        })
        .collect()
}
