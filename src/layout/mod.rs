//! Label placement: quadrant-aligned label boxes relaxed by a force-directed
//! engine until they stop overlapping each other and the plotted points.

mod engine;
pub mod geometry;
mod label_box;

pub use engine::{LabelLayoutEngine, LayoutOutcome, PlacedLabel};
pub use geometry::{Point, Rect};
pub use label_box::{LabelBox, LeaderLine};
