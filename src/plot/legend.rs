use super::frame::PlotFrame;
use crate::layout::geometry::{inflate_rect, overlap_area, point_inside_rect};
use crate::layout::{LayoutOutcome, Point, Rect};
use crate::text_metrics::measure_label;
use crate::theme::Theme;
use serde::Serialize;

const LEGEND_INSET: f32 = 10.0;
const LEGEND_PADDING: f32 = 8.0;
const SWATCH_WIDTH: f32 = 28.0;
const SWATCH_GAP: f32 = 8.0;
const ROW_SPACING: f32 = 1.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendKind {
    Population,
    AverageX,
    AverageY,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub kind: LegendKind,
    pub text: String,
}

impl LegendEntry {
    pub fn new(kind: LegendKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub entries: Vec<LegendEntry>,
    /// Box in canvas pixels, `(x, y, width, height)`.
    pub rect: Rect,
    pub row_height: f32,
}

impl Legend {
    /// Size the legend for `entries` and drop it in whichever plot corner
    /// covers the fewest points and the least label area. Ties keep the
    /// earlier corner: upper right, upper left, lower left, lower right.
    pub fn place(
        entries: Vec<LegendEntry>,
        frame: &PlotFrame,
        points: &[Point],
        labels: &LayoutOutcome,
        point_radius: f32,
        theme: &Theme,
        fast_text_metrics: bool,
    ) -> Self {
        let point_reach = point_radius.max(0.0);
        let text_width = entries
            .iter()
            .map(|entry| {
                measure_label(
                    &entry.text,
                    theme.font_size,
                    &theme.font_family,
                    1.0,
                    fast_text_metrics,
                )
                .width
            })
            .fold(0.0f32, f32::max);
        let row_height = theme.font_size * ROW_SPACING;
        let width = LEGEND_PADDING * 2.0 + SWATCH_WIDTH + SWATCH_GAP + text_width;
        let height = LEGEND_PADDING * 2.0 + row_height * entries.len() as f32;

        let (ax, ay, aw, ah) = frame.area;
        let left = ax + LEGEND_INSET;
        let right = ax + aw - LEGEND_INSET - width;
        let top = ay + LEGEND_INSET;
        let bottom = ay + ah - LEGEND_INSET - height;
        let corners = [(right, top), (left, top), (left, bottom), (right, bottom)];

        let label_rects: Vec<Rect> = labels.labels.iter().map(|p| p.label.rect()).collect();
        let mut best = (corners[0].0, corners[0].1, width, height);
        let mut best_cost = f32::INFINITY;
        for (x, y) in corners {
            let rect = (x, y, width, height);
            let reach = inflate_rect(rect, point_reach, point_reach);
            let covered = points.iter().filter(|p| point_inside_rect(**p, &reach)).count() as f32;
            let label_overlap: f32 = label_rects.iter().map(|r| overlap_area(&rect, r)).sum();
            let cost = covered * 100.0 + label_overlap;
            if cost < best_cost {
                best_cost = cost;
                best = rect;
            }
        }

        Self {
            entries,
            rect: best,
            row_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlotConfig;
    use crate::stats::{Entity, MetricPair, PopulationAverages, StatTable};

    fn frame() -> PlotFrame {
        let entities = vec![
            Entity {
                name: "A".into(),
                team: "T".into(),
                x: 0.0,
                y: 0.0,
                weight: 600.0,
            },
            Entity {
                name: "B".into(),
                team: "T".into(),
                x: 1.0,
                y: 1.0,
                weight: 600.0,
            },
        ];
        let table = StatTable::from_entities(MetricPair::new("X", "Y"), entities);
        PlotFrame::fit(&table, &PopulationAverages::new(0.5, 0.5), &PlotConfig::default())
    }

    fn empty_outcome() -> LayoutOutcome {
        LayoutOutcome {
            labels: Vec::new(),
            rounds: 0,
            converged: true,
        }
    }

    fn entries() -> Vec<LegendEntry> {
        vec![
            LegendEntry::new(LegendKind::Population, "Players"),
            LegendEntry::new(LegendKind::AverageX, "League Avg X: 0.500"),
        ]
    }

    #[test]
    fn empty_plot_prefers_upper_right() {
        let frame = frame();
        let legend = Legend::place(entries(), &frame, &[], &empty_outcome(), 4.0, &Theme::classic(), true);
        let (ax, ay, aw, _) = frame.area;
        assert!((legend.rect.1 - (ay + LEGEND_INSET)).abs() < 1e-3);
        assert!((legend.rect.0 + legend.rect.2 - (ax + aw - LEGEND_INSET)).abs() < 1e-3);
    }

    #[test]
    fn crowded_corner_is_avoided() {
        let frame = frame();
        let (ax, ay, aw, _) = frame.area;
        let crowd: Vec<Point> = (0..20)
            .map(|i| (ax + aw - 20.0 - i as f32, ay + 20.0 + i as f32))
            .collect();
        let legend = Legend::place(entries(), &frame, &crowd, &empty_outcome(), 4.0, &Theme::classic(), true);
        assert!((legend.rect.0 - (ax + LEGEND_INSET)).abs() < 1e-3);
    }
}
