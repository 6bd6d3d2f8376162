/// Slide deck composition.
///
/// ```text
///   Table + metric ──► compose() ──► Report { slides } ──► pptx::write_pptx() ──► .pptx bytes
/// ```
///
/// Slide order is fixed: cover, KPI dashboard, platform breakdown (needs a
/// `Platform` column), top campaigns (needs a `Campaign` column), executive
/// summary.

pub mod pptx;

use crate::data::group::{distinct_count, group_sum, top_n, value_range};
use crate::data::model::Table;
use crate::data::summary::{summarize, Summary};

pub const PLATFORM_COLUMN: &str = "Platform";
pub const CAMPAIGN_COLUMN: &str = "Campaign";
pub const DATE_COLUMN: &str = "Date";

pub const REPORT_TITLE: &str = "Paid Media Performance Report";
pub const TOP_CAMPAIGNS: usize = 5;
pub const NOT_AVAILABLE: &str = "not available";
pub const NO_DATA: &str = "No data";
pub const RECOMMENDATION: &str = "Shift budget toward the best-performing platform and top \
    campaigns, and review underperforming placements before the next flight.";

/// One labelled figure on the KPI dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiBox {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Slide {
    Cover {
        title: String,
        subtitle: String,
    },
    Kpi {
        title: String,
        boxes: Vec<KpiBox>,
    },
    /// Bar chart; `categories[i]` pairs with `values[i]`.
    PlatformChart {
        title: String,
        categories: Vec<String>,
        values: Vec<f64>,
    },
    TopCampaigns {
        title: String,
        lines: Vec<String>,
    },
    ExecutiveSummary {
        title: String,
        bullets: Vec<String>,
    },
}

impl Slide {
    pub fn title(&self) -> &str {
        match self {
            Slide::Cover { title, .. }
            | Slide::Kpi { title, .. }
            | Slide::PlatformChart { title, .. }
            | Slide::TopCampaigns { title, .. }
            | Slide::ExecutiveSummary { title, .. } => title,
        }
    }
}

/// A composed deck for one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub metric: String,
    pub slides: Vec<Slide>,
}

/// Build the slide sequence for `metric`.
///
/// The metric's summary may be undefined (all values missing); the KPI and
/// summary slides then read [`NO_DATA`] instead of a number.
pub fn compose(table: &Table, metric: &str) -> Report {
    let summary = summarize(table, metric).ok();
    let platforms = group_sum(table, PLATFORM_COLUMN, metric);

    let mut slides = vec![
        Slide::Cover {
            title: REPORT_TITLE.to_string(),
            subtitle: format!("{metric} analysis"),
        },
        kpi_slide(table, metric, summary.as_ref()),
    ];

    if let Some(groups) = &platforms {
        slides.push(Slide::PlatformChart {
            title: format!("{metric} by Platform"),
            categories: groups.iter().map(|g| g.key.clone()).collect(),
            values: groups.iter().map(|g| g.total).collect(),
        });
    }

    if let Some(groups) = group_sum(table, CAMPAIGN_COLUMN, metric) {
        slides.push(Slide::TopCampaigns {
            title: format!("Top {TOP_CAMPAIGNS} Campaigns by {metric}"),
            lines: top_n(&groups, TOP_CAMPAIGNS)
                .iter()
                .enumerate()
                .map(|(i, g)| format!("{}. {}: {}", i + 1, g.key, format_metric(g.total)))
                .collect(),
        });
    }

    let date_range = value_range(table, DATE_COLUMN)
        .map(|(lo, hi)| format!("{lo} to {hi}"))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    // Ties resolve to the first platform in the descending ordering above.
    let best_platform = platforms
        .as_ref()
        .and_then(|groups| groups.first())
        .map(|g| g.key.clone())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let platform_count = distinct_count(table, PLATFORM_COLUMN).unwrap_or(0);

    slides.push(Slide::ExecutiveSummary {
        title: "Executive Summary".to_string(),
        bullets: vec![
            format!("Date range: {date_range}"),
            format!("Total {metric}: {}", metric_or_no_data(summary.as_ref(), |s| s.total)),
            format!("Best performing platform: {best_platform}"),
            format!("Platforms analyzed: {platform_count}"),
            format!("Recommendation: {RECOMMENDATION}"),
        ],
    });

    log::debug!("Composed {} slides for metric '{metric}'", slides.len());
    Report {
        metric: metric.to_string(),
        slides,
    }
}

fn kpi_slide(table: &Table, metric: &str, summary: Option<&Summary>) -> Slide {
    let figure = |label: String, value: String| KpiBox { label, value };
    Slide::Kpi {
        title: "Key Performance Indicators".to_string(),
        boxes: vec![
            figure(format!("Total {metric}"), metric_or_no_data(summary, |s| s.total)),
            figure(format!("Average {metric}"), metric_or_no_data(summary, |s| s.mean)),
            figure(format!("Max {metric}"), metric_or_no_data(summary, |s| s.max)),
            figure("Total Rows".to_string(), format_count(table.row_count())),
        ],
    }
}

fn metric_or_no_data(summary: Option<&Summary>, pick: impl Fn(&Summary) -> f64) -> String {
    summary
        .map(|s| format_metric(pick(s)))
        .unwrap_or_else(|| NO_DATA.to_string())
}

/// Round to a whole number and group thousands: `1234567.8` → `1,234,568`.
pub fn format_metric(value: f64) -> String {
    let rounded = format!("{:.0}", value);
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rounded.as_str()),
    };
    if digits == "0" {
        return "0".to_string();
    }
    format!("{sign}{}", group_thousands(digits))
}

pub fn format_count(value: usize) -> String {
    group_thousands(&value.to_string())
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
