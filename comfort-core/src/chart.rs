//! Plot-geometry derivation for the prediction-history chart.
//!
//! Pure computation: given a location's history slice and a metric, produce
//! view-box coordinates, axis ticks, and a polyline path. Rendering (SVG or
//! otherwise) happens elsewhere.

use chrono::{Datelike, NaiveDate};

use crate::{history::HistoryItem, model::ConditionKind};

pub const VIEW_WIDTH: f64 = 500.0;
pub const VIEW_HEIGHT: f64 = 250.0;
pub const PAD_TOP: f64 = 20.0;
pub const PAD_RIGHT: f64 = 20.0;
pub const PAD_BOTTOM: f64 = 50.0;
pub const PAD_LEFT: f64 = 40.0;

const Y_TICK_COUNT: usize = 5;
const X_TICK_LIMIT: usize = 5;

/// What the chart plots: the comfort score or one condition's likelihood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    ComfortScore,
    Condition(ConditionKind),
}

impl Metric {
    pub fn label(&self) -> &'static str {
        match self {
            Metric::ComfortScore => "Comfort Score",
            Metric::Condition(kind) => kind.as_str(),
        }
    }

    pub const fn all() -> [Metric; 6] {
        [
            Metric::ComfortScore,
            Metric::Condition(ConditionKind::VeryHot),
            Metric::Condition(ConditionKind::VeryCold),
            Metric::Condition(ConditionKind::VeryWindy),
            Metric::Condition(ConditionKind::VeryWet),
            Metric::Condition(ConditionKind::VeryUncomfortable),
        ]
    }

    /// Upper bound of the value domain; the lower bound is always 0.
    pub const fn max_value(&self) -> f64 {
        match self {
            Metric::ComfortScore => 10.0,
            Metric::Condition(_) => 100.0,
        }
    }
}

impl TryFrom<&str> for Metric {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized: String = value
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "comfortscore" | "score" => Ok(Metric::ComfortScore),
            "veryhot" | "hot" => Ok(Metric::Condition(ConditionKind::VeryHot)),
            "verycold" | "cold" => Ok(Metric::Condition(ConditionKind::VeryCold)),
            "verywindy" | "windy" => Ok(Metric::Condition(ConditionKind::VeryWindy)),
            "verywet" | "wet" => Ok(Metric::Condition(ConditionKind::VeryWet)),
            "veryuncomfortable" | "uncomfortable" => {
                Ok(Metric::Condition(ConditionKind::VeryUncomfortable))
            }
            _ => Err(anyhow::anyhow!(
                "Unknown metric '{value}'. Supported metrics: comfort-score, \
                 very-hot, very-cold, very-windy, very-wet, very-uncomfortable."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YTick {
    pub y: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct XTick {
    pub x: f64,
    pub label: String,
}

/// Everything a renderer needs to draw the chart.
#[derive(Debug, Clone)]
pub struct ChartModel {
    pub metric: Metric,
    pub points: Vec<PlotPoint>,
    pub y_ticks: Vec<YTick>,
    pub x_ticks: Vec<XTick>,
    /// Connecting polyline, present only when there are at least two points.
    /// Every point renders as a marker regardless.
    pub path: Option<String>,
}

/// The plotted value for one history entry.
pub fn metric_value(item: &HistoryItem, metric: Metric) -> f64 {
    match metric {
        Metric::ComfortScore => item.prediction.clamped_score(),
        Metric::Condition(kind) => item
            .prediction
            .condition(kind)
            .map(|c| f64::from(c.likelihood))
            .unwrap_or(0.0),
    }
}

/// Derive the chart for a location's history slice. Returns `None` for an
/// empty slice; the caller renders a textual empty state instead.
pub fn derive(items: &[HistoryItem], metric: Metric) -> Option<ChartModel> {
    if items.is_empty() {
        return None;
    }

    let plot_width = VIEW_WIDTH - PAD_LEFT - PAD_RIGHT;
    let plot_height = VIEW_HEIGHT - PAD_TOP - PAD_BOTTOM;
    let max_value = metric.max_value();

    let days: Vec<f64> = items.iter().map(|item| day_number(item.prediction.date)).collect();
    let min_day = days.iter().copied().fold(f64::INFINITY, f64::min);
    let max_day = days.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let day_range = max_day - min_day;

    let x_for = |day: f64| {
        if day_range == 0.0 {
            PAD_LEFT + plot_width / 2.0
        } else {
            PAD_LEFT + (day - min_day) / day_range * plot_width
        }
    };

    let points = items
        .iter()
        .zip(&days)
        .map(|(item, day)| {
            let value = metric_value(item, metric);
            PlotPoint {
                x: x_for(*day),
                y: PAD_TOP + plot_height * (1.0 - value / max_value),
            }
        })
        .collect::<Vec<_>>();

    let y_ticks = (0..Y_TICK_COUNT)
        .map(|i| {
            let value = max_value * i as f64 / (Y_TICK_COUNT - 1) as f64;
            YTick {
                y: PAD_TOP + plot_height * (Y_TICK_COUNT - 1 - i) as f64
                    / (Y_TICK_COUNT - 1) as f64,
                label: format_value(value),
            }
        })
        .collect();

    let x_ticks = tick_dates(items)
        .into_iter()
        .map(|date| XTick {
            x: x_for(day_number(date)),
            label: date.format("%b %-d").to_string(),
        })
        .collect();

    let path = (points.len() >= 2).then(|| {
        points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                format!("{}{:.2} {:.2}", if i == 0 { "M" } else { "L" }, p.x, p.y)
            })
            .collect::<Vec<_>>()
            .join(" ")
    });

    Some(ChartModel { metric, points, y_ticks, x_ticks, path })
}

/// Distinct dates to label: all of them up to the limit, otherwise the
/// first, the last, and three interior samples at even index steps.
fn tick_dates(items: &[HistoryItem]) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = items.iter().map(|item| item.prediction.date).collect();
    dates.sort_unstable();
    dates.dedup();

    if dates.len() <= X_TICK_LIMIT {
        return dates;
    }

    let step = (dates.len() - 1) / (X_TICK_LIMIT - 1);
    [0, step, step * 2, step * 3, dates.len() - 1]
        .iter()
        .map(|&i| dates[i])
        .collect()
}

fn day_number(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}
