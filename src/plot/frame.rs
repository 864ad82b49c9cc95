use crate::config::PlotConfig;
use crate::layout::{Point, Rect};
use crate::stats::{PopulationAverages, StatTable};
use serde::Serialize;

/// Mapping from data space to canvas pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotFrame {
    pub canvas_width: f32,
    pub canvas_height: f32,
    /// Plot area inside the margins, `(x, y, width, height)`.
    pub area: Rect,
    pub x_domain: (f64, f64),
    pub y_domain: (f64, f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub value: f64,
    /// Canvas coordinate along the tick's axis.
    pub position: f32,
    pub label: String,
}

impl PlotFrame {
    /// Fit the axes to the filtered points and both average lines, padded by
    /// `domain_margin` of the range on each side.
    pub fn fit(table: &StatTable, averages: &PopulationAverages, plot: &PlotConfig) -> Self {
        let xs = table.entities().iter().map(|e| e.x).chain([averages.x]);
        let ys = table.entities().iter().map(|e| e.y).chain([averages.y]);
        let margin = plot.domain_margin.max(0.0) as f64;
        let x_domain = pad_domain(extent(xs), margin);
        let y_domain = pad_domain(extent(ys), margin);

        let width = plot.width.max(1.0);
        let height = plot.height.max(1.0);
        let area_w = (width - plot.margin_left - plot.margin_right).max(1.0);
        let area_h = (height - plot.margin_top - plot.margin_bottom).max(1.0);
        Self {
            canvas_width: width,
            canvas_height: height,
            area: (plot.margin_left, plot.margin_top, area_w, area_h),
            x_domain,
            y_domain,
        }
    }

    pub fn x_to_canvas(&self, x: f64) -> f32 {
        let (lo, hi) = self.x_domain;
        let t = ((x - lo) / (hi - lo)) as f32;
        self.area.0 + t * self.area.2
    }

    pub fn y_to_canvas(&self, y: f64) -> f32 {
        let (lo, hi) = self.y_domain;
        let t = ((y - lo) / (hi - lo)) as f32;
        self.area.1 + (1.0 - t) * self.area.3
    }

    pub fn to_canvas(&self, x: f64, y: f64) -> Point {
        (self.x_to_canvas(x), self.y_to_canvas(y))
    }

    pub fn x_ticks(&self, target: usize) -> Vec<Tick> {
        nice_ticks(self.x_domain.0, self.x_domain.1, target)
            .into_iter()
            .map(|value| Tick {
                value,
                position: self.x_to_canvas(value),
                label: format_tick(value),
            })
            .collect()
    }

    pub fn y_ticks(&self, target: usize) -> Vec<Tick> {
        nice_ticks(self.y_domain.0, self.y_domain.1, target)
            .into_iter()
            .map(|value| Tick {
                value,
                position: self.y_to_canvas(value),
                label: format_tick(value),
            })
            .collect()
    }
}

fn extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

fn pad_domain((lo, hi): (f64, f64), margin: f64) -> (f64, f64) {
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let range = hi - lo;
    if range <= f64::EPSILON * hi.abs().max(1.0) {
        let pad = if lo == 0.0 { 1.0 } else { lo.abs() * 0.05 };
        return (lo - pad, hi + pad);
    }
    (lo - range * margin, hi + range * margin)
}

/// Tick values at a 1-2-5 step covering `[min, max]`, aiming for about
/// `target` ticks.
pub fn nice_ticks(min: f64, max: f64, target: usize) -> Vec<f64> {
    if !min.is_finite() || !max.is_finite() || max <= min {
        return Vec::new();
    }
    let raw_step = (max - min) / target.max(1) as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let normalized = raw_step / magnitude;
    let step = magnitude
        * if normalized <= 1.0 {
            1.0
        } else if normalized <= 2.0 {
            2.0
        } else if normalized <= 5.0 {
            5.0
        } else {
            10.0
        };

    let first = (min / step).ceil() as i64;
    let last = (max / step).floor() as i64;
    (first..=last)
        .take(200)
        .map(|k| {
            let v = k as f64 * step;
            if v == 0.0 { 0.0 } else { v }
        })
        .collect()
}

/// Axis tick labels carry three decimals, the usual precision for rate stats.
pub fn format_tick(value: f64) -> String {
    let text = format!("{value:.3}");
    if text == "-0.000" { "0.000".to_string() } else { text }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{Entity, MetricPair};

    fn table(points: &[(f64, f64)]) -> StatTable {
        let entities = points
            .iter()
            .map(|&(x, y)| Entity {
                name: "P".into(),
                team: "T".into(),
                x,
                y,
                weight: 600.0,
            })
            .collect();
        StatTable::from_entities(MetricPair::new("A", "B"), entities)
    }

    #[test]
    fn domain_covers_points_and_averages() {
        let t = table(&[(0.40, 0.10), (0.50, 0.30)]);
        let avg = PopulationAverages::new(0.60, 0.05);
        let frame = PlotFrame::fit(&t, &avg, &PlotConfig::default());
        assert!(frame.x_domain.0 < 0.40 && frame.x_domain.1 > 0.60);
        assert!(frame.y_domain.0 < 0.05 && frame.y_domain.1 > 0.30);
    }

    #[test]
    fn y_axis_is_inverted() {
        let t = table(&[(0.0, 0.0), (1.0, 1.0)]);
        let frame = PlotFrame::fit(&t, &PopulationAverages::new(0.5, 0.5), &PlotConfig::default());
        let (_, low) = frame.to_canvas(0.0, 0.0);
        let (_, high) = frame.to_canvas(0.0, 1.0);
        assert!(high < low);
        let (left, _) = frame.to_canvas(0.0, 0.0);
        let (right, _) = frame.to_canvas(1.0, 0.0);
        assert!(left < right);
        assert!(left > frame.area.0 && right < frame.area.0 + frame.area.2);
    }

    #[test]
    fn degenerate_domain_is_widened() {
        let t = table(&[(0.2, 0.2), (0.2, 0.2)]);
        let frame = PlotFrame::fit(&t, &PopulationAverages::new(0.2, 0.2), &PlotConfig::default());
        assert!(frame.x_domain.1 > frame.x_domain.0);
        assert!(frame.to_canvas(0.2, 0.2).0.is_finite());
    }

    #[test]
    fn ticks_use_round_steps() {
        let ticks = nice_ticks(0.03, 0.37, 8);
        assert_eq!(ticks.first().copied(), Some(0.05));
        assert!(ticks.windows(2).all(|w| ((w[1] - w[0]) - 0.05).abs() < 1e-9));
        assert!(*ticks.last().expect("ticks") <= 0.37);
    }

    #[test]
    fn tick_labels_have_three_decimals() {
        assert_eq!(format_tick(0.25), "0.250");
        assert_eq!(format_tick(-0.0000001), "0.000");
        assert_eq!(format_tick(12.0), "12.000");
    }
}
