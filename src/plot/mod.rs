//! Assembles a scatter figure: filtered population, average lines, axis
//! ticks, labelled extremes and the legend.

mod frame;
mod legend;

pub use frame::{PlotFrame, Tick, format_tick, nice_ticks};
pub use legend::{Legend, LegendEntry, LegendKind};

use crate::config::Config;
use crate::error::StatError;
use crate::layout::{LabelBox, LabelLayoutEngine, LayoutOutcome, Point};
use crate::quadrant::classify;
use crate::select::select_extremes;
use crate::stats::{DataSource, Entity, PopulationAverages, RawTable, StatTable};
use crate::text_metrics::measure_label;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct ScatterFigure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub frame: PlotFrame,
    pub x_ticks: Vec<Tick>,
    pub y_ticks: Vec<Tick>,
    pub entities: Vec<Entity>,
    /// Canvas position of each entity, same order as `entities`.
    pub points: Vec<Point>,
    pub point_radius: f32,
    pub averages: PopulationAverages,
    /// Canvas x of the vertical average line.
    pub average_x: f32,
    /// Canvas y of the horizontal average line.
    pub average_y: f32,
    pub labels: LayoutOutcome,
    pub legend: Legend,
}

/// Fetch the configured season from `source` and build the figure.
pub fn scatter_from_source(source: &dyn DataSource, config: &Config) -> Result<ScatterFigure, StatError> {
    let raw = source.fetch(config.selection.season)?;
    compute_scatter(&raw, config)
}

pub fn compute_scatter(raw: &RawTable, config: &Config) -> Result<ScatterFigure, StatError> {
    let selection = &config.selection;
    let metrics = selection.metrics();

    let table = StatTable::filter(raw, &metrics, &selection.weight_column, selection.min_weight)?;
    // League averages include every row, not only the qualified ones.
    let averages = PopulationAverages::compute(raw, &metrics)?;
    info!(
        metric_x = %metrics.x,
        metric_y = %metrics.y,
        avg_x = averages.x,
        avg_y = averages.y,
        qualified = table.len(),
        total = raw.len(),
        "population ready"
    );

    let frame = PlotFrame::fit(&table, &averages, &config.plot);
    let points: Vec<Point> = table
        .entities()
        .iter()
        .map(|entity| frame.to_canvas(entity.x, entity.y))
        .collect();

    let picked = select_extremes(&table, selection.extremes);
    let theme = &config.theme;
    let boxes: Vec<LabelBox> = picked
        .iter()
        .map(|&idx| {
            let entity = &table.entities()[idx];
            let anchoring = classify(entity.x, entity.y, &averages);
            let extent = measure_label(
                &entity.name,
                theme.label_font_size,
                &theme.font_family,
                config.plot.line_height,
                config.plot.fast_text_metrics,
            );
            LabelBox::new(idx, entity.name.clone(), points[idx], extent, anchoring)
        })
        .collect();

    let engine = LabelLayoutEngine::new(config.labels.clone());
    let labels = engine.layout(boxes, &points, frame.area);
    info!(
        labels = labels.labels.len(),
        rounds = labels.rounds,
        converged = labels.converged,
        "labels placed"
    );
    let residual = labels.residual_overlap();
    if residual > 0.0 {
        warn!(residual, rounds = labels.rounds, "labels still overlap after layout");
    }

    let title = match selection.season {
        Some(season) => format!("{} vs {} in {season}", metrics.x, metrics.y),
        None => format!("{} vs {}", metrics.x, metrics.y),
    };
    let legend = Legend::place(
        vec![
            LegendEntry::new(LegendKind::Population, "Players"),
            LegendEntry::new(
                LegendKind::AverageX,
                format!("League Avg {}: {:.3}", metrics.x, averages.x),
            ),
            LegendEntry::new(
                LegendKind::AverageY,
                format!("League Avg {}: {:.3}", metrics.y, averages.y),
            ),
        ],
        &frame,
        &points,
        &labels,
        config.labels.point_radius,
        theme,
        config.plot.fast_text_metrics,
    );

    Ok(ScatterFigure {
        title,
        x_ticks: frame.x_ticks(config.plot.tick_target),
        y_ticks: frame.y_ticks(config.plot.tick_target),
        average_x: frame.x_to_canvas(averages.x),
        average_y: frame.y_to_canvas(averages.y),
        x_label: metrics.x,
        y_label: metrics.y,
        frame,
        entities: table.entities().to_vec(),
        points,
        point_radius: config.labels.point_radius,
        averages,
        labels,
        legend,
    })
}
