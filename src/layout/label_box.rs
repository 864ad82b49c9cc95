use super::geometry::{Point, Rect, nearest_point_on_rect, point_inside_rect, rect_around};
use crate::quadrant::{Anchoring, HorizontalAlign, VerticalAlign};
use crate::text_metrics::TextExtent;
use serde::Serialize;

/// A label being placed. `home` is where the quadrant alignment puts the
/// box; `center` is where the layout engine has moved it to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelBox {
    /// Index of the labelled entity in its table.
    pub entity: usize,
    pub text: String,
    pub anchor: Point,
    pub home: Point,
    pub center: Point,
    pub half_width: f32,
    pub half_height: f32,
    pub anchoring: Anchoring,
}

impl LabelBox {
    /// Box whose text starts at `anchor` in the direction given by
    /// `anchoring`. Canvas y grows downward, so `Bottom` alignment puts the
    /// box above the point.
    pub fn new(
        entity: usize,
        text: impl Into<String>,
        anchor: Point,
        extent: TextExtent,
        anchoring: Anchoring,
    ) -> Self {
        let half_width = extent.width.max(0.0) * 0.5;
        let half_height = extent.height.max(0.0) * 0.5;
        let cx = match anchoring.horizontal {
            HorizontalAlign::Left => anchor.0 + half_width,
            HorizontalAlign::Right => anchor.0 - half_width,
        };
        let cy = match anchoring.vertical {
            VerticalAlign::Bottom => anchor.1 - half_height,
            VerticalAlign::Top => anchor.1 + half_height,
        };
        Self {
            entity,
            text: text.into(),
            anchor,
            home: (cx, cy),
            center: (cx, cy),
            half_width,
            half_height,
            anchoring,
        }
    }

    pub fn rect(&self) -> Rect {
        rect_around(self.center, self.half_width, self.half_height)
    }

    pub(crate) fn expanded_rect(&self, expand: (f32, f32)) -> Rect {
        rect_around(
            self.center,
            self.half_width * expand.0,
            self.half_height * expand.1,
        )
    }

    /// Distance the box has travelled from its home position.
    pub fn displacement(&self) -> f32 {
        let dx = self.center.0 - self.home.0;
        let dy = self.center.1 - self.home.1;
        (dx * dx + dy * dy).sqrt()
    }

    /// Connector from the anchor to the nearest point of the box, shortened by
    /// `shrink` at the box end. `None` while the box is within `threshold` of
    /// home, when it covers its own point, or when nothing is left after
    /// shrinking.
    pub fn leader_line(&self, threshold: f32, shrink: f32) -> Option<LeaderLine> {
        if self.displacement() <= threshold {
            return None;
        }
        let rect = self.rect();
        if point_inside_rect(self.anchor, &rect) {
            return None;
        }
        let edge = nearest_point_on_rect(self.anchor, &rect);
        let dx = edge.0 - self.anchor.0;
        let dy = edge.1 - self.anchor.1;
        let len = (dx * dx + dy * dy).sqrt();
        let shrink = shrink.max(0.0);
        if len <= shrink {
            return None;
        }
        let keep = (len - shrink) / len;
        Some(LeaderLine {
            from: self.anchor,
            to: (self.anchor.0 + dx * keep, self.anchor.1 + dy * keep),
        })
    }
}

/// Segment from a label's anchor point toward its (moved) box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LeaderLine {
    pub from: Point,
    pub to: Point,
}

impl LeaderLine {
    pub fn length(&self) -> f32 {
        let dx = self.to.0 - self.from.0;
        let dy = self.to.1 - self.from.1;
        (dx * dx + dy * dy).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extent() -> TextExtent {
        TextExtent {
            width: 40.0,
            height: 10.0,
        }
    }

    fn anchoring(h: HorizontalAlign, v: VerticalAlign) -> Anchoring {
        Anchoring {
            horizontal: h,
            vertical: v,
        }
    }

    #[test]
    fn home_follows_alignment() {
        let up_right = LabelBox::new(
            0,
            "a",
            (100.0, 100.0),
            extent(),
            anchoring(HorizontalAlign::Left, VerticalAlign::Bottom),
        );
        assert_eq!(up_right.home, (120.0, 95.0));
        let down_left = LabelBox::new(
            0,
            "a",
            (100.0, 100.0),
            extent(),
            anchoring(HorizontalAlign::Right, VerticalAlign::Top),
        );
        assert_eq!(down_left.home, (80.0, 105.0));
        assert_eq!(down_left.rect(), (60.0, 100.0, 40.0, 10.0));
    }

    #[test]
    fn no_leader_near_home() {
        let mut label = LabelBox::new(
            0,
            "a",
            (100.0, 100.0),
            extent(),
            anchoring(HorizontalAlign::Left, VerticalAlign::Bottom),
        );
        label.center.1 -= 3.0;
        assert!(label.leader_line(6.0, 0.0).is_none());
    }

    #[test]
    fn leader_reaches_nearest_edge_of_moved_box() {
        let mut label = LabelBox::new(
            0,
            "a",
            (100.0, 100.0),
            extent(),
            anchoring(HorizontalAlign::Left, VerticalAlign::Bottom),
        );
        label.center = (120.0, 60.0);
        let leader = label.leader_line(6.0, 0.0).expect("leader");
        assert_eq!(leader.from, (100.0, 100.0));
        assert_eq!(leader.to, (100.0, 65.0));
        let shrunk = label.leader_line(6.0, 5.0).expect("leader");
        assert!((shrunk.length() - 30.0).abs() < 1e-4);
    }

    #[test]
    fn leader_is_recomputed_from_current_position() {
        let mut label = LabelBox::new(
            0,
            "a",
            (0.0, 0.0),
            extent(),
            anchoring(HorizontalAlign::Left, VerticalAlign::Bottom),
        );
        label.center = (200.0, -5.0);
        let first = label.leader_line(1.0, 0.0).expect("leader");
        label.center = (20.0, -80.0);
        let second = label.leader_line(1.0, 0.0).expect("leader");
        assert_ne!(first, second);
        assert_eq!(second.to, (0.0, -75.0));
    }
}
