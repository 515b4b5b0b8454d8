use analytics::{Overview, overview};
use analyzer::{GroupSummaries, aggregate_by_channel, apply_filters, rank_top, top_n};
use chrono::NaiveDate;
use configuration::Config;
use core_types::{Dataset, FilterSpec, MetricKey, Partner, describe_columns};
use profiler::{ProfileDescriptor, ProfileSummarizer};
use risk::{AtRiskPartner, RiskClassifier, RiskReport, RuleBasedClassifier};
use serde::Serialize;
use std::fmt::Display;

/// One block of the report. A section that cannot be computed for the
/// current data says why instead of failing the whole report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Section<T> {
    Available { data: T },
    Unavailable { reason: String },
}

impl<T> Section<T> {
    pub fn from_result<E: Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Section::Available { data },
            Err(e) => Section::unavailable(e),
        }
    }

    pub fn unavailable(reason: impl Display) -> Self {
        Section::Unavailable {
            reason: reason.to_string(),
        }
    }

    pub fn available(&self) -> Option<&T> {
        match self {
            Section::Available { data } => Some(data),
            Section::Unavailable { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    pub metric: MetricKey,
    pub partners: Vec<Partner>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChurnRisk {
    pub flagged_count: usize,
    pub partners: Vec<AtRiskPartner>,
}

/// Everything the presentation layer shows for one filtered view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub today: NaiveDate,
    /// Partners in the source before filtering.
    pub total_loaded: usize,
    pub filters: FilterSpec,
    pub overview: Overview,
    pub ranking: Section<Ranking>,
    pub channels: Section<GroupSummaries>,
    pub churn_risk: Section<ChurnRisk>,
    pub ideal_profile: Section<ProfileDescriptor>,
    /// The filtered partners, best conversion rate first.
    pub partners: Vec<Partner>,
}

/// Assembles `DashboardReport`s with components built once from the configuration.
pub struct ReportBuilder {
    top_n: usize,
    metric: MetricKey,
    classifier: Box<dyn RiskClassifier>,
    summarizer: ProfileSummarizer,
}

impl ReportBuilder {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            top_n: config.ranking.top_n,
            metric: config.ranking.metric,
            classifier: Box::new(RuleBasedClassifier::new(config.risk_rules.clone())?),
            summarizer: ProfileSummarizer::new(config.profile.clone())?,
        })
    }

    /// Filters `dataset` and computes every section over the filtered view.
    ///
    /// Sections are independent of each other except for the ideal profile,
    /// which names the best channel of the channel section.
    pub fn build(&self, dataset: &Dataset, filters: &FilterSpec, today: NaiveDate) -> DashboardReport {
        let view = apply_filters(dataset, filters);
        tracing::info!(loaded = dataset.len(), shown = view.len(), "Building report.");

        let ranking = self.ranking(&view);
        let channels = Section::from_result(aggregate_by_channel(&view, MetricKey::ConversionRate));
        let best_channel = channels.available().and_then(GroupSummaries::best_group);
        let ideal_profile = Section::from_result(self.summarizer.ideal_profile(&view, best_channel));

        let (churn_risk, assessed) = match self.classifier.classify(&view) {
            Ok(RiskReport {
                assessed,
                at_risk,
                flagged_count,
            }) => (
                Section::Available {
                    data: ChurnRisk {
                        flagged_count,
                        partners: at_risk,
                    },
                },
                assessed,
            ),
            Err(e) => {
                tracing::warn!(error = %e, "Churn risk section unavailable.");
                (Section::unavailable(e), view.clone())
            }
        };

        let partners = top_n(&assessed, MetricKey::ConversionRate, assessed.len(), true)
            .into_iter()
            .cloned()
            .collect();

        DashboardReport {
            today,
            total_loaded: dataset.len(),
            filters: filters.clone(),
            overview: overview(&view),
            ranking,
            channels,
            churn_risk,
            ideal_profile,
            partners,
        }
    }

    fn ranking(&self, view: &Dataset) -> Section<Ranking> {
        let missing = view.schema.missing(&[self.metric.source_column()]);
        if !missing.is_empty() {
            return Section::unavailable(format!(
                "Cannot rank by {}: the data has no {} column",
                self.metric,
                describe_columns(&missing)
            ));
        }
        Section::Available {
            data: Ranking {
                metric: self.metric,
                partners: rank_top(view, self.metric, self.top_n)
                    .into_iter()
                    .cloned()
                    .collect(),
            },
        }
    }
}
