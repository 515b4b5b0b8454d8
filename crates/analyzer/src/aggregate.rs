use crate::error::AnalyzerError;
use analytics::mean;
use core_types::{Column, Dataset, MetricKey, Partner};
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Summary statistics of one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub group: String,
    /// Mean of the value key over members that have one; None if none do.
    pub mean: Option<Decimal>,
    /// Number of members, including those without a value.
    pub count: usize,
}

/// The result of `group_summary`, ordered by mean descending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummaries {
    pub group_key: Column,
    pub value_key: MetricKey,
    pub groups: Vec<GroupSummary>,
}

impl GroupSummaries {
    /// The group with the highest defined mean.
    pub fn best(&self) -> Option<&GroupSummary> {
        self.groups.first().filter(|g| g.mean.is_some())
    }

    /// Name of the group with the highest defined mean.
    pub fn best_group(&self) -> Option<&str> {
        self.best().map(|g| g.group.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Orders optional values so that defined values always come before undefined ones.
fn compare_defined_first(a: Option<Decimal>, b: Option<Decimal>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sorts partners by `key` and keeps the first `n`.
///
/// The sort is stable, so ties keep their input order. Partners without a
/// value for `key` come last in either direction. An `n` larger than the
/// dataset returns every partner.
pub fn top_n(dataset: &Dataset, key: MetricKey, n: usize, descending: bool) -> Vec<&Partner> {
    let mut ranked: Vec<&Partner> = dataset.iter().collect();
    ranked.sort_by(|a, b| compare_defined_first(a.metric(key), b.metric(key), descending));
    ranked.truncate(n);
    ranked
}

/// The `n` best partners by `metric`, highest first.
pub fn rank_top(dataset: &Dataset, metric: MetricKey, n: usize) -> Vec<&Partner> {
    top_n(dataset, metric, n, true)
}

/// Partitions partners by `group_key` and averages `value_key` per group.
///
/// Partners with no value in `group_key` belong to no group. Groups are
/// ordered by mean descending, undefined means last, ties by first appearance.
pub fn group_summary(
    dataset: &Dataset,
    group_key: Column,
    value_key: MetricKey,
) -> Result<GroupSummaries, AnalyzerError> {
    let missing = dataset
        .schema
        .missing(&[group_key, value_key.source_column()]);
    if !missing.is_empty() {
        return Err(AnalyzerError::SchemaIncomplete {
            operation: "group summary",
            missing,
        });
    }

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut members: Vec<(&str, Vec<Decimal>, usize)> = Vec::new();
    for partner in dataset {
        let Some(group) = partner.category(group_key) else {
            continue;
        };
        let slot = *index.entry(group).or_insert_with(|| {
            members.push((group, Vec::new(), 0));
            members.len() - 1
        });
        let (_, values, count) = &mut members[slot];
        *count += 1;
        if let Some(value) = partner.metric(value_key) {
            values.push(value);
        }
    }

    let mut groups: Vec<GroupSummary> = members
        .into_iter()
        .map(|(group, values, count)| GroupSummary {
            group: group.to_string(),
            mean: mean(values),
            count,
        })
        .collect();
    groups.sort_by(|a, b| compare_defined_first(a.mean, b.mean, true));

    tracing::debug!(%group_key, %value_key, groups = groups.len(), "Groups summarised.");
    Ok(GroupSummaries {
        group_key,
        value_key,
        groups,
    })
}

/// `group_summary` over the acquisition channel.
pub fn aggregate_by_channel(
    dataset: &Dataset,
    metric: MetricKey,
) -> Result<GroupSummaries, AnalyzerError> {
    group_summary(dataset, Column::AcquisitionChannel, metric)
}
