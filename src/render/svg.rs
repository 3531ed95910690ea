/// Pie chart rendering to SVG.
///
/// Layout follows the charts the project has always produced: an 800x800
/// canvas, the title on top, slices starting at 140° and running
/// counter-clockwise, percentages (one decimal) just outside each slice, and
/// a legend in the lower-left corner. Zero-count slices get a legend entry
/// but no wedge and no percentage label.

use std::f64::consts::PI;
use std::fmt::Write;

use super::{ChartSink, ChartSpec, OutputDir};
use crate::model::QuakeError;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 800.0;
const CENTER_X: f64 = 470.0;
const CENTER_Y: f64 = 360.0;
const RADIUS: f64 = 240.0;
const START_ANGLE_DEG: f64 = 140.0;
/// Percentage labels sit at 1.2 radii from the centre.
const LABEL_DISTANCE: f64 = 1.2;

/// Matplotlib's "Paired" qualitative palette.
const PALETTE: [&str; 12] = [
    "#a6cee3", "#1f78b4", "#b2df8a", "#33a02c", "#fb9a99", "#e31a1c",
    "#fdbf6f", "#ff7f00", "#cab2d6", "#6a3d9a", "#ffff99", "#b15928",
];

pub struct SvgChartSink {
    dir: OutputDir,
}

impl SvgChartSink {
    pub fn new(dir: OutputDir) -> Self {
        SvgChartSink { dir }
    }
}

impl ChartSink for SvgChartSink {
    fn begin(&mut self) -> Result<(), QuakeError> {
        self.dir.reset()
    }

    fn emit(&mut self, chart: &ChartSpec) -> Result<(), QuakeError> {
        self.dir.write(&chart.name, "svg", &render_pie(chart))?;
        Ok(())
    }
}

/// Percentage label for a slice, empty for zero-value slices.
pub fn percent_label(count: u64, total: u64) -> String {
    if count == 0 || total == 0 {
        return String::new();
    }
    format!("{:.1}%", count as f64 * 100.0 / total as f64)
}

/// Renders one chart as a standalone SVG document.
pub fn render_pie(chart: &ChartSpec) -> String {
    let mut svg = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
        w = WIDTH,
        h = HEIGHT
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="40" font-size="22" text-anchor="middle">{}</text>"#,
        CENTER_X,
        escape(&chart.title)
    );

    let total = chart.total();
    if total == 0 {
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{}" font-size="16" text-anchor="middle" fill="gray">no data</text>"#,
            CENTER_X, CENTER_Y
        );
    } else {
        draw_slices(&mut svg, chart, total);
    }

    draw_legend(&mut svg, chart);
    svg.push_str("</svg>\n");
    svg
}

fn draw_slices(svg: &mut String, chart: &ChartSpec, total: u64) {
    let mut angle = START_ANGLE_DEG;
    for (i, slice) in chart.slices.iter().enumerate() {
        if slice.count == 0 {
            continue;
        }
        let color = PALETTE[i % PALETTE.len()];
        let sweep = 360.0 * slice.count as f64 / total as f64;

        if slice.count == total {
            let _ = writeln!(
                svg,
                r#"<circle cx="{}" cy="{}" r="{}" fill="{}"/>"#,
                CENTER_X, CENTER_Y, RADIUS, color
            );
        } else {
            let (x0, y0) = point(angle, RADIUS);
            let (x1, y1) = point(angle + sweep, RADIUS);
            let large_arc = if sweep > 180.0 { 1 } else { 0 };
            let _ = writeln!(
                svg,
                r#"<path d="M {cx:.2} {cy:.2} L {x0:.2} {y0:.2} A {r} {r} 0 {large_arc} 0 {x1:.2} {y1:.2} Z" fill="{color}"/>"#,
                cx = CENTER_X,
                cy = CENTER_Y,
                r = RADIUS,
            );
        }

        let (lx, ly) = point(angle + sweep / 2.0, RADIUS * LABEL_DISTANCE);
        let _ = writeln!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" font-size="10" font-weight="bold" fill="black" text-anchor="middle" dominant-baseline="middle">{}</text>"#,
            lx,
            ly,
            percent_label(slice.count, total)
        );
        angle += sweep;
    }
}

fn draw_legend(svg: &mut String, chart: &ChartSpec) {
    let row_height = 20.0;
    let x = 20.0;
    let mut y = HEIGHT - 20.0 - row_height * chart.slices.len() as f64;
    let _ = writeln!(svg, r#"<text x="{}" y="{:.0}" font-size="13" font-weight="bold">Legend</text>"#, x, y - 8.0);
    for (i, slice) in chart.slices.iter().enumerate() {
        let _ = writeln!(
            svg,
            r#"<rect x="{}" y="{:.0}" width="14" height="14" fill="{}"/><text x="{}" y="{:.0}" font-size="12">{}</text>"#,
            x,
            y,
            PALETTE[i % PALETTE.len()],
            x + 20.0,
            y + 11.0,
            escape(&slice.label)
        );
        y += row_height;
    }
}

/// Point at `degrees` (counter-clockwise from 3 o'clock) on a circle of
/// `radius` around the chart centre, in screen coordinates.
fn point(degrees: f64, radius: f64) -> (f64, f64) {
    let rad = degrees * PI / 180.0;
    (CENTER_X + radius * rad.cos(), CENTER_Y - radius * rad.sin())
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{emit_all, Slice};

    fn chart(slices: &[(&str, u64)]) -> ChartSpec {
        ChartSpec {
            name: "magnitude_distribution".to_string(),
            title: "Earthquake Magnitude Distribution".to_string(),
            slices: slices
                .iter()
                .map(|(label, count)| Slice { label: label.to_string(), count: *count })
                .collect(),
        }
    }

    #[test]
    fn test_percent_label_suppressed_for_zero() {
        assert_eq!(percent_label(0, 10), "");
        assert_eq!(percent_label(1, 3), "33.3%");
        assert_eq!(percent_label(3, 3), "100.0%");
    }

    #[test]
    fn test_render_draws_one_wedge_per_nonzero_slice() {
        let svg = render_pie(&chart(&[("≤2.0", 1), ("2.1-3.0", 0), ("3.1-5.0", 1), (">5.0", 2)]));
        assert_eq!(svg.matches("<path").count(), 3);
        assert!(svg.contains("25.0%"));
        assert!(svg.contains("50.0%"));
        assert!(svg.contains("&gt;5.0"), "labels must be escaped");
        assert!(svg.contains("2.1-3.0"), "zero slices stay in the legend");
    }

    #[test]
    fn test_single_slice_renders_full_circle() {
        let svg = render_pie(&chart(&[("only", 5), ("none", 0)]));
        assert!(svg.contains("<circle"));
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn test_empty_chart_renders_placeholder() {
        let svg = render_pie(&chart(&[("a", 0), ("b", 0)]));
        assert!(svg.contains("no data"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_svg_sink_writes_files() {
        let scratch = tempfile::tempdir().unwrap();
        let dir = OutputDir::new(scratch.path().join("pie_charts"));
        let mut sink = SvgChartSink::new(dir.clone());
        emit_all(&mut sink, &[chart(&[("a", 1)])]).unwrap();
        assert!(dir.path().join("magnitude_distribution.svg").is_file());
    }
}
