//! Terminal tables for the CLI reports.

use analytics::{
    AnomalyReport, AnomalySeverity, BudgetOverview, BudgetStatus, ForecastPoint, HealthAssessment,
    RatioSet,
};
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use core_types::{RatioMetric, Severity};

const RATIO_ROWS: [RatioMetric; 11] = [
    RatioMetric::CurrentRatio,
    RatioMetric::QuickRatio,
    RatioMetric::CashRatio,
    RatioMetric::GrossProfitMargin,
    RatioMetric::OperatingMargin,
    RatioMetric::NetProfitMargin,
    RatioMetric::Roa,
    RatioMetric::Roe,
    RatioMetric::DebtToAssetRatio,
    RatioMetric::DebtToEquityRatio,
    RatioMetric::AssetTurnover,
];

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn ratios_table(ratios: &RatioSet) -> Table {
    let mut table = new_table(vec!["Ratio", "Value"]);
    for metric in RATIO_ROWS {
        let value = ratios.value(metric).unwrap_or_default();
        let shown = if metric.is_percentage() {
            format!("{value:.2}%")
        } else {
            format!("{value:.2}")
        };
        table.add_row(vec![metric.label().to_string(), shown]);
    }
    table.add_row(vec![
        "working capital".to_string(),
        format!("{:.2}", ratios.working_capital),
    ]);
    table
}

pub fn health_table(assessment: &HealthAssessment) -> Table {
    let health = &assessment.health;
    let mut table = new_table(vec!["Bucket", "Metric", "Value", "Points", "Explanation"]);
    for line in &health.breakdown {
        table.add_row(vec![
            line.bucket.clone(),
            line.metric.label().to_string(),
            format!("{:.2}", line.value),
            format!("{}/{}", line.points, line.max_points),
            line.explanation.clone(),
        ]);
    }
    table.add_row(vec![
        Cell::new("total"),
        Cell::new(""),
        Cell::new(""),
        Cell::new(format!("{}/100", health.score)),
        Cell::new(format!("{} ({})", health.grade, health.grade_label)),
    ]);
    table
}

pub fn recommendations_table(assessment: &HealthAssessment) -> Table {
    let mut table = new_table(vec!["Severity", "Finding", "Details"]);
    for finding in &assessment.recommendations {
        let color = match finding.severity {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
            Severity::Success => Color::Green,
            Severity::Info => Color::Cyan,
        };
        table.add_row(vec![
            Cell::new(format!("{:?}", finding.severity).to_lowercase()).fg(color),
            Cell::new(&finding.title),
            Cell::new(&finding.body),
        ]);
    }
    table
}

pub fn budget_table(overview: &BudgetOverview) -> Table {
    let mut table = new_table(vec!["Budget", "Category", "Planned", "Actual", "Remaining", "Usage", "Status"]);
    for row in &overview.executions {
        let (label, color) = match row.status {
            BudgetStatus::Normal => ("normal", Color::Green),
            BudgetStatus::Warning => ("warning", Color::Yellow),
            BudgetStatus::Exceeded => ("exceeded", Color::Red),
        };
        table.add_row(vec![
            Cell::new(&row.name),
            Cell::new(&row.category),
            Cell::new(format!("{:.2}", row.planned_amount)),
            Cell::new(format!("{:.2}", row.actual_amount)),
            Cell::new(format!("{:.2}", row.remaining)),
            Cell::new(format!("{:.1}%", row.usage_percentage)),
            Cell::new(label).fg(color),
        ]);
    }
    table.add_row(vec![
        Cell::new(format!("{} budgets", overview.total_budgets)),
        Cell::new(""),
        Cell::new(format!("{:.2}", overview.total_planned)),
        Cell::new(format!("{:.2}", overview.total_actual)),
        Cell::new(format!("{:.2}", overview.total_planned - overview.total_actual)),
        Cell::new(format!("{:.1}%", overview.overall_usage)),
        Cell::new(format!(
            "{} exceeded, {} warning",
            overview.exceeded_count, overview.warning_count
        )),
    ]);
    table
}

pub fn forecast_table(points: &[ForecastPoint]) -> Table {
    let mut table = new_table(vec!["Month", "Pessimistic", "Realistic", "Optimistic", "Confidence"]);
    for point in points {
        table.add_row(vec![
            point.period_label.clone(),
            format!("{:.2}", point.pessimistic),
            format!("{:.2}", point.realistic),
            format!("{:.2}", point.optimistic),
            format!("{:.0}%", point.confidence * 100.0),
        ]);
    }
    table
}

pub fn anomaly_table(report: &AnomalyReport) -> Table {
    let mut table = new_table(vec!["Date", "Category", "Amount", "Peer mean", "z-score", "Severity", "Description"]);
    for record in &report.anomalies {
        let (label, color) = match record.severity {
            AnomalySeverity::High => ("high", Color::Red),
            AnomalySeverity::Medium => ("medium", Color::Yellow),
        };
        table.add_row(vec![
            Cell::new(record.date),
            Cell::new(&record.category),
            Cell::new(format!("{:.2}", record.amount)),
            Cell::new(format!("{:.2}", record.peer_mean)),
            Cell::new(format!("{:.2}", record.z_score)),
            Cell::new(label).fg(color),
            Cell::new(&record.description),
        ]);
    }
    table
}
