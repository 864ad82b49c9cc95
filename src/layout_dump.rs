use crate::plot::ScatterFigure;
use crate::quadrant::Anchoring;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub title: String,
    pub width: f32,
    pub height: f32,
    pub plot_area: [f32; 4],
    pub x_domain: [f64; 2],
    pub y_domain: [f64; 2],
    pub average_x: f64,
    pub average_y: f64,
    pub rounds: usize,
    pub converged: bool,
    pub residual_overlap: f32,
    pub points: Vec<PointDump>,
    pub labels: Vec<LabelDump>,
    pub legend: [f32; 4],
}

#[derive(Debug, Serialize)]
pub struct PointDump {
    pub name: String,
    pub team: String,
    pub value_x: f64,
    pub value_y: f64,
    pub weight: f64,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Serialize)]
pub struct LabelDump {
    pub entity: usize,
    pub text: String,
    pub anchoring: Anchoring,
    pub anchor: [f32; 2],
    pub home: [f32; 2],
    pub center: [f32; 2],
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub displacement: f32,
    pub leader: Option<[f32; 4]>,
}

impl LayoutDump {
    pub fn from_figure(figure: &ScatterFigure) -> Self {
        let points = figure
            .entities
            .iter()
            .zip(&figure.points)
            .map(|(entity, &(x, y))| PointDump {
                name: entity.name.clone(),
                team: entity.team.clone(),
                value_x: entity.x,
                value_y: entity.y,
                weight: entity.weight,
                x,
                y,
            })
            .collect();

        let labels = figure
            .labels
            .labels
            .iter()
            .map(|placed| {
                let label = &placed.label;
                let (x, y, width, height) = label.rect();
                LabelDump {
                    entity: label.entity,
                    text: label.text.clone(),
                    anchoring: label.anchoring,
                    anchor: [label.anchor.0, label.anchor.1],
                    home: [label.home.0, label.home.1],
                    center: [label.center.0, label.center.1],
                    x,
                    y,
                    width,
                    height,
                    displacement: label.displacement(),
                    leader: placed
                        .leader
                        .map(|line| [line.from.0, line.from.1, line.to.0, line.to.1]),
                }
            })
            .collect();

        let (ax, ay, aw, ah) = figure.frame.area;
        let (lx, ly, lw, lh) = figure.legend.rect;
        LayoutDump {
            title: figure.title.clone(),
            width: figure.frame.canvas_width,
            height: figure.frame.canvas_height,
            plot_area: [ax, ay, aw, ah],
            x_domain: [figure.frame.x_domain.0, figure.frame.x_domain.1],
            y_domain: [figure.frame.y_domain.0, figure.frame.y_domain.1],
            average_x: figure.averages.x,
            average_y: figure.averages.y,
            rounds: figure.labels.rounds,
            converged: figure.labels.converged,
            residual_overlap: figure.labels.residual_overlap(),
            points,
            labels,
            legend: [lx, ly, lw, lh],
        }
    }
}

pub fn write_layout_dump(path: &Path, figure: &ScatterFigure) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_figure(figure);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
