//! Two-metric player scatter plots with league-average reference lines and
//! force-directed, non-overlapping labels for the extreme performers.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod layout;
pub mod layout_dump;
pub mod plot;
pub mod quadrant;
pub mod render;
pub mod select;
pub mod stats;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use error::StatError;
pub use layout::{LabelBox, LabelLayoutEngine, LayoutOutcome, LeaderLine, PlacedLabel};
pub use plot::{ScatterFigure, compute_scatter, scatter_from_source};
pub use quadrant::{Anchoring, HorizontalAlign, VerticalAlign, classify};
pub use select::select_extremes;
pub use stats::{PopulationAverages, RawTable, StatTable};
