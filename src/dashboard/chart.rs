//! Cumulative P&L chart rendered as inline SVG.

use crate::models::PnlPoint;

const CHART_WIDTH: f64 = 800.0;
const CHART_HEIGHT: f64 = 400.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 60.0;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn svg_open(svg: &mut String) {
    svg.push_str(&format!(
        r##"<svg width="{}" height="{}" viewBox="0 0 {} {}" xmlns="http://www.w3.org/2000/svg">"##,
        CHART_WIDTH, CHART_HEIGHT, CHART_WIDTH, CHART_HEIGHT
    ));
    svg.push_str("\n  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"24\" text-anchor=\"middle\" font-size=\"16\" fill=\"#333\">Cumulative P&amp;L Over Time</text>\n",
        CHART_WIDTH / 2.0
    ));
}

/// Line chart of cumulative P&L against trade time.
///
/// The value axis always includes zero. With no points a placeholder chart
/// is returned.
pub fn render_pnl_chart(points: &[PnlPoint]) -> String {
    let mut svg = String::new();
    svg_open(&mut svg);

    if points.is_empty() {
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"14\" fill=\"#999\">No trades yet</text>\n",
            CHART_WIDTH / 2.0,
            CHART_HEIGHT / 2.0
        ));
        svg.push_str("</svg>\n");
        return svg;
    }

    let min_pnl = points
        .iter()
        .map(|p| p.cumulative_pnl)
        .fold(0.0_f64, f64::min);
    let max_pnl = points
        .iter()
        .map(|p| p.cumulative_pnl)
        .fold(0.0_f64, f64::max);
    let range = (max_pnl - min_pnl).max(1.0);

    let plot_width = CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let bottom = CHART_HEIGHT - MARGIN_BOTTOM;

    let x_scale =
        |i: usize| -> f64 { MARGIN_LEFT + (i as f64 / (points.len() - 1).max(1) as f64) * plot_width };
    let y_scale = |v: f64| -> f64 { MARGIN_TOP + plot_height - ((v - min_pnl) / range) * plot_height };

    // Axes
    svg.push_str(&format!(
        "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#ccc\" stroke-width=\"1\"/>\n",
        MARGIN_LEFT, MARGIN_TOP, MARGIN_LEFT, bottom
    ));
    svg.push_str(&format!(
        "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"#ccc\" stroke-width=\"1\"/>\n",
        MARGIN_LEFT,
        bottom,
        CHART_WIDTH - MARGIN_RIGHT,
        bottom
    ));

    // Zero line
    let zero_y = y_scale(0.0);
    svg.push_str(&format!(
        "  <line x1=\"{}\" y1=\"{:.1}\" x2=\"{}\" y2=\"{:.1}\" stroke=\"#999\" stroke-dasharray=\"4 4\"/>\n",
        MARGIN_LEFT,
        zero_y,
        CHART_WIDTH - MARGIN_RIGHT,
        zero_y
    ));

    // Value labels
    for value in [max_pnl, min_pnl] {
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{:.1}\" text-anchor=\"end\" font-size=\"10\" fill=\"#666\">{:.2}</text>\n",
            MARGIN_LEFT - 5.0,
            y_scale(value) + 4.0,
            value
        ));
    }

    // Time labels
    let first = points[0].timestamp.format(TIME_FORMAT);
    let last = points[points.len() - 1].timestamp.format(TIME_FORMAT);
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" text-anchor=\"start\" font-size=\"10\" fill=\"#666\">{}</text>\n",
        MARGIN_LEFT,
        bottom + 18.0,
        first
    ));
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"{}\" text-anchor=\"end\" font-size=\"10\" fill=\"#666\">{}</text>\n",
        CHART_WIDTH - MARGIN_RIGHT,
        bottom + 18.0,
        last
    ));

    let mut path_data = String::new();
    for (i, point) in points.iter().enumerate() {
        let x = x_scale(i);
        let y = y_scale(point.cumulative_pnl);
        if i == 0 {
            path_data.push_str(&format!("M {:.1} {:.1}", x, y));
        } else {
            path_data.push_str(&format!(" L {:.1} {:.1}", x, y));
        }
    }
    svg.push_str(&format!(
        "  <path d=\"{}\" fill=\"none\" stroke=\"#2563eb\" stroke-width=\"2\"/>\n",
        path_data
    ));

    for (i, point) in points.iter().enumerate() {
        svg.push_str(&format!(
            "  <circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"3\" fill=\"#2563eb\"/>\n",
            x_scale(i),
            y_scale(point.cumulative_pnl)
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn point(minute: u32, cumulative_pnl: f64) -> PnlPoint {
        PnlPoint {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 10, minute, 0).unwrap(),
            cumulative_pnl,
        }
    }

    #[test]
    fn test_empty_chart_has_placeholder() {
        let svg = render_pnl_chart(&[]);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("No trades yet"));
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn test_single_point() {
        let svg = render_pnl_chart(&[point(0, 20.0)]);
        assert!(svg.contains("<path d=\"M"));
        assert_eq!(svg.matches("<circle").count(), 1);
        assert!(svg.contains("20.00"));
    }

    #[test]
    fn test_multiple_points() {
        let svg = render_pnl_chart(&[point(0, 20.0), point(1, 30.0), point(2, 25.0)]);

        assert_eq!(svg.matches(" L ").count(), 2);
        assert_eq!(svg.matches("<circle").count(), 3);
        assert!(svg.contains("2024-03-01 10:00:00"));
        assert!(svg.contains("2024-03-01 10:02:00"));
        assert!(svg.contains("30.00"));
    }

    #[test]
    fn test_axis_includes_zero_for_losses() {
        let svg = render_pnl_chart(&[point(0, -10.0), point(1, -25.0)]);
        assert!(svg.contains("-25.00"));
        assert!(svg.contains("0.00"));
    }
}
