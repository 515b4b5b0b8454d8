use crate::report::{ChurnRisk, DashboardReport, Ranking, Section};
use analytics::Overview;
use analyzer::{FilterOptions, GroupSummaries};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use configuration::ReportFormat;
use core_types::{MetricKey, Partner};
use profiler::ProfileDescriptor;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt::Write;

const UNDEFINED: &str = "n/a";

/// Renders a report as terminal tables or as pretty-printed JSON.
pub fn render_report(report: &DashboardReport, format: ReportFormat) -> anyhow::Result<String> {
    match format {
        ReportFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        ReportFormat::Table => Ok(report_tables(report)?),
    }
}

/// Renders the selectable filter values of every filterable column.
pub fn render_options(options: &[FilterOptions], format: ReportFormat) -> anyhow::Result<String> {
    match format {
        ReportFormat::Json => Ok(serde_json::to_string_pretty(options)?),
        ReportFormat::Table => {
            let mut table = new_table(&["Column", "Values"]);
            for option in options {
                let values = if option.values.is_empty() {
                    "(none)".to_string()
                } else {
                    option.values.join(", ")
                };
                table.add_row(vec![Cell::new(option.column.header()), Cell::new(values)]);
            }
            Ok(table.to_string())
        }
    }
}

fn report_tables(report: &DashboardReport) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(
        out,
        "Partner report as of {} ({} of {} partners shown)",
        report.today, report.overview.total_partners, report.total_loaded
    )?;

    heading(&mut out, "Overview")?;
    writeln!(out, "{}", overview_table(&report.overview))?;

    heading(&mut out, "Ranking")?;
    section(&mut out, &report.ranking, ranking_table)?;

    heading(&mut out, "Channels")?;
    section(&mut out, &report.channels, channels_table)?;

    heading(&mut out, "Churn risk")?;
    section(&mut out, &report.churn_risk, churn_table)?;

    heading(&mut out, "Ideal profile")?;
    section(&mut out, &report.ideal_profile, profile_lines)?;

    heading(&mut out, "Partners")?;
    if report.partners.is_empty() {
        writeln!(out, "No partners match the current filters.")?;
    } else {
        writeln!(out, "{}", partners_table(&report.partners))?;
    }
    Ok(out)
}

fn heading(out: &mut String, title: &str) -> std::fmt::Result {
    writeln!(out)?;
    writeln!(out, "== {title} ==")
}

fn section<T>(out: &mut String, section: &Section<T>, render: impl Fn(&T) -> String) -> std::fmt::Result {
    match section {
        Section::Available { data } => writeln!(out, "{}", render(data)),
        Section::Unavailable { reason } => writeln!(out, "Data unavailable: {reason}"),
    }
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| Cell::new(h).fg(Color::White)));
    table
}

/// Formats a rate as a percentage rounded to one decimal place, half away from zero.
pub fn percent(value: Decimal) -> String {
    value.checked_mul(Decimal::ONE_HUNDRED).map_or_else(
        || UNDEFINED.to_string(),
        |scaled| format!("{:.1}%", round_half_up(scaled)),
    )
}

fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

fn optional(value: Option<Decimal>, format: impl Fn(Decimal) -> String) -> String {
    value.map(format).unwrap_or_else(|| UNDEFINED.to_string())
}

fn number(value: Decimal) -> String {
    round_half_up(value).normalize().to_string()
}

/// Formats a metric value the way its kind reads best.
pub fn metric_value(key: MetricKey, value: Option<Decimal>) -> String {
    if key.is_rate() {
        optional(value, percent)
    } else {
        optional(value, number)
    }
}

fn text(value: Option<&str>) -> String {
    value.unwrap_or(UNDEFINED).to_string()
}

fn overview_table(overview: &Overview) -> String {
    let mut table = new_table(&["Indicator", "Value"]);
    table.add_row(vec!["Partners".to_string(), overview.total_partners.to_string()]);
    table.add_row(vec![
        "Mean conversion rate".to_string(),
        optional(overview.mean_conversion_rate, percent),
    ]);
    table.add_row(vec![
        "Mean qualification rate".to_string(),
        optional(overview.mean_qualification_rate, percent),
    ]);
    table.add_row(vec![
        "Mean satisfaction".to_string(),
        optional(overview.mean_satisfaction_score, number),
    ]);
    table.to_string()
}

fn ranking_table(ranking: &Ranking) -> String {
    if ranking.partners.is_empty() {
        return "No partners to rank.".to_string();
    }
    let mut table = new_table(&["#", "Partner", ranking.metric.as_str(), "Channel", "City"]);
    for (position, partner) in ranking.partners.iter().enumerate() {
        table.add_row(vec![
            (position + 1).to_string(),
            partner.name().to_string(),
            metric_value(ranking.metric, partner.metric(ranking.metric)),
            text(partner.record.acquisition_channel.as_deref()),
            text(partner.record.city.as_deref()),
        ]);
    }
    table.to_string()
}

fn channels_table(channels: &GroupSummaries) -> String {
    if channels.is_empty() {
        return "No channels in the current selection.".to_string();
    }
    let mut table = new_table(&["Channel", "Mean conversion rate", "Partners"]);
    for group in &channels.groups {
        table.add_row(vec![
            group.group.clone(),
            metric_value(channels.value_key, group.mean),
            group.count.to_string(),
        ]);
    }
    format!(
        "{table}\nBest channel: {}",
        channels.best_group().unwrap_or(UNDEFINED)
    )
}

fn churn_table(churn: &ChurnRisk) -> String {
    if churn.partners.is_empty() {
        return "No partners at risk.".to_string();
    }
    let mut table = new_table(&["Partner", "Status", "Satisfaction", "Days since contact", "Conversion", "Reasons"]);
    for flagged in &churn.partners {
        let partner = &flagged.partner;
        let reasons = flagged
            .reasons
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            Cell::new(partner.name()),
            Cell::new(text(partner.record.partnership_status.as_deref())),
            Cell::new(optional(partner.record.satisfaction_score, number)),
            Cell::new(
                partner
                    .metrics
                    .days_since_contact
                    .map_or_else(|| UNDEFINED.to_string(), |d| d.to_string()),
            ),
            Cell::new(percent(partner.metrics.conversion_rate)),
            Cell::new(reasons).fg(Color::Red),
        ]);
    }
    format!("{} partners at risk\n{table}", churn.flagged_count)
}

fn profile_lines(profile: &ProfileDescriptor) -> String {
    let rank = percent(profile.percentile);
    [
        format!(
            "Conversion rate at or above {} ({rank} percentile)",
            percent(profile.conversion_rate_threshold)
        ),
        format!(
            "Satisfaction at or above {} ({rank} percentile)",
            optional(profile.satisfaction_threshold, number)
        ),
        format!("Best channel: {}", text(profile.best_channel.as_deref())),
        format!("Contacted within the last {} days", profile.recent_contact_days),
    ]
    .join("\n")
}

fn partners_table(partners: &[Partner]) -> String {
    let mut table = new_table(&[
        "Partner",
        "City",
        "Channel",
        "Type",
        "Status",
        "Received",
        "Qualified",
        "Closed",
        "Conversion",
        "Qualification",
        "Days since contact",
        "Satisfaction",
        "At risk",
    ]);
    for partner in partners {
        let record = &partner.record;
        let at_risk = match partner.metrics.churn_risk {
            Some(true) => "yes",
            Some(false) => "no",
            None => UNDEFINED,
        };
        table.add_row(vec![
            record.name.clone(),
            text(record.city.as_deref()),
            text(record.acquisition_channel.as_deref()),
            text(record.partner_type.as_deref()),
            text(record.partnership_status.as_deref()),
            record.referrals_received.to_string(),
            record.referrals_qualified.to_string(),
            record.referrals_closed.to_string(),
            percent(partner.metrics.conversion_rate),
            percent(partner.metrics.qualification_rate),
            partner
                .metrics
                .days_since_contact
                .map_or_else(|| UNDEFINED.to_string(), |d| d.to_string()),
            optional(record.satisfaction_score, number),
            at_risk.to_string(),
        ]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::derive_metrics;
    use chrono::NaiveDate;
    use configuration::Config;
    use core_types::{Column, Dataset, FilterSpec, PartnerRecord, PartnerTable, Schema};
    use crate::report::ReportBuilder;
    use rust_decimal_macros::dec;

    fn report(schema: Schema) -> DashboardReport {
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let table = PartnerTable::new(
            schema,
            vec![
                PartnerRecord {
                    acquisition_channel: Some("Indicação".to_string()),
                    partnership_status: Some("Inactive".to_string()),
                    satisfaction_score: Some(dec!(45)),
                    last_contact: Some("2024-06-01".to_string()),
                    ..PartnerRecord::new("Solar", 8, 4, 2)
                },
            ],
        );
        let dataset: Dataset = derive_metrics(&table, today);
        ReportBuilder::from_config(&Config::default())
            .unwrap()
            .build(&dataset, &FilterSpec::new(), today)
    }

    #[test]
    fn formats_rates_and_numbers() {
        assert_eq!(percent(dec!(0.25)), "25.0%");
        assert_eq!(percent(dec!(0.3333)), "33.3%");
        assert_eq!(percent(dec!(0.1666666667)), "16.7%");
        assert_eq!(percent(dec!(0.2999)), "30.0%");
        assert_eq!(percent(dec!(0.0625)), "6.3%");
        assert_eq!(percent(dec!(0.33356)), "33.4%");
        assert_eq!(metric_value(MetricKey::ConversionRate, None), "n/a");
        assert_eq!(metric_value(MetricKey::SatisfactionScore, Some(dec!(72.50))), "72.5");
        assert_eq!(metric_value(MetricKey::DaysSinceContact, Some(dec!(12))), "12");
    }

    #[test]
    fn table_output_contains_every_section() {
        let text = render_report(&report(Schema::complete()), ReportFormat::Table).unwrap();
        for title in ["Overview", "Ranking", "Channels", "Churn risk", "Ideal profile", "Partners"] {
            assert!(text.contains(&format!("== {title} ==")), "missing {title}");
        }
        assert!(text.contains("Solar"));
        assert!(text.contains("inactive"));
        assert!(text.contains("Best channel: Indicação"));
    }

    #[test]
    fn unavailable_sections_explain_why() {
        let schema = Schema::complete().without(Column::SatisfactionScore);
        let text = render_report(&report(schema), ReportFormat::Table).unwrap();
        assert!(text.contains("Data unavailable: Churn risk cannot be assessed"));
        assert!(text.contains("== Partners =="));
    }

    #[test]
    fn json_output_is_parseable() {
        let json = render_report(&report(Schema::complete()), ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["churn_risk"]["data"]["flagged_count"], 1);
        assert_eq!(value["ideal_profile"]["data"]["best_channel"], "Indicação");
    }

    #[test]
    fn options_list_values_per_column() {
        let options = vec![
            FilterOptions {
                column: Column::City,
                values: vec!["Curitiba".to_string(), "Joinville".to_string()],
            },
            FilterOptions {
                column: Column::PartnerType,
                values: vec![],
            },
        ];
        let text = render_options(&options, ReportFormat::Table).unwrap();
        assert!(text.contains("Curitiba,"));
        assert!(text.contains("Joinville"));
        assert!(text.contains("Tipo"));
        assert!(text.contains("(none)"));
    }
}
