// Force-directed label de-overlap.
//
// Every round sums all forces against the positions at the start of the
// round and only then moves the boxes, so the outcome does not depend on the
// order pairs are visited in.
//
// A box's spring home weakens every round it spends in contact, so a crowded
// box cannot settle where the spring balances the repulsion.

use super::geometry::{
    Point, PointGrid, Rect, clamp_center_to_bounds, overlap_area, overlap_extent, rects_overlap,
};
use super::label_box::{LabelBox, LeaderLine};
use crate::config::LabelLayoutConfig;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::debug;

/// Centres closer than this on an axis are treated as coincident.
const COINCIDENT_EPS: f32 = 1e-4;
const OWN_ANCHOR_EPS: f32 = 1e-3;
/// Spring weight kept after a round in contact.
const SPRING_RELEASE: f32 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedLabel {
    pub label: LabelBox,
    pub leader: Option<LeaderLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutOutcome {
    pub labels: Vec<PlacedLabel>,
    pub rounds: usize,
    pub converged: bool,
}

impl LayoutOutcome {
    /// Summed pairwise overlap area of the final label boxes.
    pub fn residual_overlap(&self) -> f32 {
        let rects: Vec<Rect> = self.labels.iter().map(|p| p.label.rect()).collect();
        let mut total = 0.0;
        for i in 0..rects.len() {
            for j in (i + 1)..rects.len() {
                total += overlap_area(&rects[i], &rects[j]);
            }
        }
        total
    }
}

#[derive(Debug, Clone, Default)]
pub struct LabelLayoutEngine {
    config: LabelLayoutConfig,
}

impl LabelLayoutEngine {
    pub fn new(config: LabelLayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LabelLayoutConfig {
        &self.config
    }

    /// Relax `boxes` away from each other and from `obstacles` (every plotted
    /// point; a box ignores its own anchor) while staying inside `bounds`.
    ///
    /// Always returns within `max_rounds`; overlaps that survive the budget
    /// are left in place. Only an early stop with no overlapping labels
    /// counts as converged.
    pub fn layout(&self, mut boxes: Vec<LabelBox>, obstacles: &[Point], bounds: Rect) -> LayoutOutcome {
        let cfg = &self.config;
        let mut rng = ChaCha8Rng::seed_from_u64(cfg.seed);
        let point_half = (
            cfg.point_radius.max(0.0) * cfg.expand_points.0,
            cfg.point_radius.max(0.0) * cfg.expand_points.1,
        );
        let cell = boxes
            .iter()
            .map(|b| b.half_width.max(b.half_height) * 2.0)
            .fold(32.0f32, f32::max);
        let grid = PointGrid::new(cell, obstacles);

        let mut rounds = 0;
        let mut converged = false;
        let mut forces: Vec<(f32, f32)> = vec![(0.0, 0.0); boxes.len()];
        let mut contact = vec![false; boxes.len()];
        let mut spring_weight = vec![1.0f32; boxes.len()];

        for round in 0..cfg.max_rounds {
            rounds = round + 1;
            forces.iter_mut().for_each(|f| *f = (0.0, 0.0));
            contact.iter_mut().for_each(|c| *c = false);
            let rects: Vec<Rect> = boxes.iter().map(|b| b.expanded_rect(cfg.expand_text)).collect();

            // Label against label.
            for i in 0..boxes.len() {
                for j in (i + 1)..boxes.len() {
                    let (ox, oy) = overlap_extent(&rects[i], &rects[j]);
                    if ox <= 0.0 || oy <= 0.0 {
                        continue;
                    }
                    let delta = (
                        boxes[i].center.0 - boxes[j].center.0,
                        boxes[i].center.1 - boxes[j].center.1,
                    );
                    let push = separation(delta, (ox, oy), cfg.force_text, &mut rng);
                    forces[i].0 += push.0 * 0.5;
                    forces[i].1 += push.1 * 0.5;
                    forces[j].0 -= push.0 * 0.5;
                    forces[j].1 -= push.1 * 0.5;
                    contact[i] = true;
                    contact[j] = true;
                }
            }

            // Label against points.
            if point_half.0 > 0.0 || point_half.1 > 0.0 {
                for (i, rect) in rects.iter().enumerate() {
                    let probe = (
                        rect.0 - point_half.0,
                        rect.1 - point_half.1,
                        rect.2 + point_half.0 * 2.0,
                        rect.3 + point_half.1 * 2.0,
                    );
                    for idx in grid.query(&probe) {
                        let p = obstacles[idx];
                        if is_own_anchor(&boxes[i], p) {
                            continue;
                        }
                        let zone = (
                            p.0 - point_half.0,
                            p.1 - point_half.1,
                            point_half.0 * 2.0,
                            point_half.1 * 2.0,
                        );
                        let (ox, oy) = overlap_extent(rect, &zone);
                        if ox <= 0.0 || oy <= 0.0 {
                            continue;
                        }
                        let delta = (boxes[i].center.0 - p.0, boxes[i].center.1 - p.1);
                        let push = separation(delta, (ox, oy), cfg.force_points, &mut rng);
                        forces[i].0 += push.0;
                        forces[i].1 += push.1;
                        contact[i] = true;
                    }
                }
            }

            // Spring home and keep inside the plot.
            for (i, label) in boxes.iter().enumerate() {
                if contact[i] {
                    spring_weight[i] *= SPRING_RELEASE;
                }
                let spring = cfg.spring * spring_weight[i];
                forces[i].0 += (label.home.0 - label.center.0) * spring;
                forces[i].1 += (label.home.1 - label.center.1) * spring;
                let pull = boundary_pull(&rects[i], &bounds);
                forces[i].0 += pull.0 * cfg.boundary_force;
                forces[i].1 += pull.1 * cfg.boundary_force;
            }

            let step = (cfg.step * cfg.cooling.powi(round as i32)).max(cfg.min_step.min(cfg.step));
            let mut moved = 0.0f32;
            for (label, force) in boxes.iter_mut().zip(&forces) {
                let before = label.center;
                let target = (before.0 + force.0 * step, before.1 + force.1 * step);
                label.center = clamp_center_to_bounds(target, label.half_width, label.half_height, &bounds);
                moved += ((label.center.0 - before.0).powi(2) + (label.center.1 - before.1).powi(2)).sqrt();
            }
            if !moved.is_finite() {
                break;
            }
            if moved < cfg.convergence_threshold && !any_overlap(&boxes) {
                converged = true;
                break;
            }
        }

        let labels: Vec<PlacedLabel> = boxes
            .into_iter()
            .map(|label| {
                let leader = label.leader_line(cfg.leader_threshold, cfg.leader_shrink);
                PlacedLabel { label, leader }
            })
            .collect();
        let outcome = LayoutOutcome {
            labels,
            rounds,
            converged,
        };
        debug!(
            labels = outcome.labels.len(),
            obstacles = obstacles.len(),
            rounds,
            converged,
            residual_overlap = outcome.residual_overlap(),
            "label layout finished"
        );
        outcome
    }
}

/// Push along the axis of least penetration, away from the other body.
fn separation(
    delta: (f32, f32),
    overlap: (f32, f32),
    strength: (f32, f32),
    rng: &mut ChaCha8Rng,
) -> (f32, f32) {
    if overlap.1 <= overlap.0 {
        (0.0, direction(delta.1, rng) * overlap.1 * strength.1)
    } else {
        (direction(delta.0, rng) * overlap.0 * strength.0, 0.0)
    }
}

/// Sign of `d`; exact ties get a seeded coin flip.
fn direction(d: f32, rng: &mut ChaCha8Rng) -> f32 {
    if d > COINCIDENT_EPS {
        1.0
    } else if d < -COINCIDENT_EPS {
        -1.0
    } else if rng.gen_bool(0.5) {
        1.0
    } else {
        -1.0
    }
}

fn any_overlap(boxes: &[LabelBox]) -> bool {
    let rects: Vec<Rect> = boxes.iter().map(LabelBox::rect).collect();
    (0..rects.len()).any(|i| ((i + 1)..rects.len()).any(|j| rects_overlap(&rects[i], &rects[j])))
}

fn is_own_anchor(label: &LabelBox, point: Point) -> bool {
    (label.anchor.0 - point.0).abs() <= OWN_ANCHOR_EPS && (label.anchor.1 - point.1).abs() <= OWN_ANCHOR_EPS
}

/// How far `rect` sticks out of `bounds`, as a vector pointing back inside.
fn boundary_pull(rect: &Rect, bounds: &Rect) -> (f32, f32) {
    let left = bounds.0 - rect.0;
    let right = (rect.0 + rect.2) - (bounds.0 + bounds.2);
    let top = bounds.1 - rect.1;
    let bottom = (rect.1 + rect.3) - (bounds.1 + bounds.3);
    (
        left.max(0.0) - right.max(0.0),
        top.max(0.0) - bottom.max(0.0),
    )
}
