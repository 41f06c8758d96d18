//! Terminal and SVG rendering of query results.

use comfort_core::{
    ChartModel, ConditionKind, CountryOverview, DailyForecast, GroundingSource, HistoryItem,
    Metric, chart,
};

const BAR_WIDTH: usize = 20;

/// A fixed-width bar for a 0..=1 fraction.
fn bar(fraction: f64) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    let mut bar = "█".repeat(filled);
    bar.push_str(&"░".repeat(BAR_WIDTH - filled));
    bar
}

pub fn daily(forecast: &DailyForecast) {
    let prediction = &forecast.prediction;

    println!();
    println!("{} on {}", prediction.location, prediction.date);

    let score = prediction.clamped_score();
    println!("Comfort score: {score:.1}/10  [{}]", bar(score / 10.0));
    println!();

    for condition in &prediction.conditions {
        let magnitude = match (condition.value, condition.unit.as_deref()) {
            (Some(value), Some(unit)) => format!("  ({value} {unit})"),
            _ => String::new(),
        };
        println!(
            "  {:<18} {:>3}%  [{}]{magnitude}",
            condition.name.as_str(),
            condition.likelihood,
            bar(f64::from(condition.likelihood) / 100.0),
        );
        if !condition.description.is_empty() {
            println!("  {:<18} {}", "", condition.description);
        }
    }

    if !prediction.summary.is_empty() {
        println!();
        println!("{}", prediction.summary);
    }

    if !prediction.recommendations.is_empty() {
        println!();
        println!("Recommendations:");
        for recommendation in &prediction.recommendations {
            println!("  - {recommendation}");
        }
    }

    sources(&forecast.sources);
}

pub fn country(result: &CountryOverview) {
    let overview = &result.overview;

    println!();
    println!("{} ({}/{})", overview.country, overview.month, overview.year);
    println!();
    println!("{}", overview.overall_summary);

    for breakdown in &overview.regional_breakdowns {
        println!();
        println!("{}:", breakdown.region);
        println!("  {}", breakdown.summary);
    }

    if !overview.travel_advice.is_empty() {
        println!();
        println!("Travel advice:");
        for advice in &overview.travel_advice {
            println!("  - {advice}");
        }
    }

    sources(&result.sources);
}

fn sources(sources: &[GroundingSource]) {
    if sources.is_empty() {
        return;
    }

    println!();
    println!("Sources:");
    for (i, source) in sources.iter().enumerate() {
        println!("  [{}] {} - {}", i + 1, source.title, source.uri);
    }
}

pub fn history_table(items: &[HistoryItem]) {
    println!("{:<12} {:>5}  Location", "Date", "Score");
    for item in items {
        println!(
            "{:<12} {:>5.1}  {}",
            item.prediction.date.to_string(),
            item.prediction.clamped_score(),
            item.prediction.location,
        );
    }
}

/// Assemble a self-contained SVG document from the derived chart geometry.
pub fn chart_svg(model: &ChartModel, location: &str) -> String {
    let color = metric_color(model.metric);
    let mut svg = String::new();

    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}" font-family="sans-serif" font-size="10">"#,
        chart::VIEW_WIDTH,
        chart::VIEW_HEIGHT,
    ));
    svg.push('\n');

    svg.push_str(&format!(
        r##"  <text x="{}" y="12" fill="#374151">{} - {}</text>"##,
        chart::PAD_LEFT,
        escape(model.metric.label()),
        escape(location),
    ));
    svg.push('\n');

    for tick in &model.y_ticks {
        svg.push_str(&format!(
            r##"  <line x1="{}" x2="{}" y1="{y:.2}" y2="{y:.2}" stroke="#d1d5db" stroke-width="0.5"/>"##,
            chart::PAD_LEFT,
            chart::VIEW_WIDTH - chart::PAD_RIGHT,
            y = tick.y,
        ));
        svg.push('\n');
        svg.push_str(&format!(
            r##"  <text x="{}" y="{:.2}" text-anchor="end" dominant-baseline="middle" fill="#6b7280">{}</text>"##,
            chart::PAD_LEFT - 8.0,
            tick.y,
            escape(&tick.label),
        ));
        svg.push('\n');
    }

    for tick in &model.x_ticks {
        svg.push_str(&format!(
            r##"  <text x="{:.2}" y="{}" text-anchor="middle" fill="#6b7280">{}</text>"##,
            tick.x,
            chart::VIEW_HEIGHT - chart::PAD_BOTTOM + 15.0,
            escape(&tick.label),
        ));
        svg.push('\n');
    }

    if let Some(path) = &model.path {
        svg.push_str(&format!(
            r#"  <path d="{path}" fill="none" stroke="{color}" stroke-width="2"/>"#
        ));
        svg.push('\n');
    }

    for point in &model.points {
        svg.push_str(&format!(
            r#"  <circle cx="{:.2}" cy="{:.2}" r="3" fill="{color}"/>"#,
            point.x, point.y,
        ));
        svg.push('\n');
    }

    svg.push_str("</svg>\n");
    svg
}

fn metric_color(metric: Metric) -> &'static str {
    match metric {
        Metric::ComfortScore => "#38bdf8",
        Metric::Condition(ConditionKind::VeryHot) => "#f97316",
        Metric::Condition(ConditionKind::VeryCold) => "#3b82f6",
        Metric::Condition(ConditionKind::VeryWindy) => "#6b7280",
        Metric::Condition(ConditionKind::VeryWet) => "#06b6d4",
        Metric::Condition(ConditionKind::VeryUncomfortable) => "#eab308",
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
