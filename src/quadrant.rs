use crate::stats::PopulationAverages;
use serde::Serialize;

/// Text alignment relative to the anchor point, in the sense of a text
/// renderer: `Left` means the text starts at the point and runs right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    Left,
    Right,
}

/// `Bottom` means the text's bottom edge sits on the point, so the label
/// reads above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Anchoring {
    pub horizontal: HorizontalAlign,
    pub vertical: VerticalAlign,
}

/// Align a label so it grows away from the league averages. Values equal to
/// an average count as above it.
pub fn classify(x: f64, y: f64, averages: &PopulationAverages) -> Anchoring {
    let horizontal = if x >= averages.x {
        HorizontalAlign::Left
    } else {
        HorizontalAlign::Right
    };
    let vertical = if y >= averages.y {
        VerticalAlign::Bottom
    } else {
        VerticalAlign::Top
    };
    Anchoring {
        horizontal,
        vertical,
    }
}
