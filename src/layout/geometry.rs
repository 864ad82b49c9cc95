// Axis-aligned rectangle helpers shared by the label engine and the figure
// assembly. Rects are `(x, y, width, height)` in canvas pixels, y down.

use std::collections::HashMap;

pub type Rect = (f32, f32, f32, f32);
pub type Point = (f32, f32);

pub fn rect_around(center: Point, half_w: f32, half_h: f32) -> Rect {
    (center.0 - half_w, center.1 - half_h, half_w * 2.0, half_h * 2.0)
}

/// Width and height of the intersection; either is `<= 0.0` when the rects
/// are apart.
pub fn overlap_extent(a: &Rect, b: &Rect) -> (f32, f32) {
    let w = (a.0 + a.2).min(b.0 + b.2) - a.0.max(b.0);
    let h = (a.1 + a.3).min(b.1 + b.3) - a.1.max(b.1);
    (w, h)
}

pub fn overlap_area(a: &Rect, b: &Rect) -> f32 {
    let (w, h) = overlap_extent(a, b);
    w.max(0.0) * h.max(0.0)
}

pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    let (w, h) = overlap_extent(a, b);
    w > 0.0 && h > 0.0
}

pub fn inflate_rect(rect: Rect, pad_x: f32, pad_y: f32) -> Rect {
    (
        rect.0 - pad_x,
        rect.1 - pad_y,
        rect.2 + pad_x * 2.0,
        rect.3 + pad_y * 2.0,
    )
}

/// Keep a box of the given half extents inside `bounds`. Boxes larger than
/// the bounds are centred on that axis.
pub fn clamp_center_to_bounds(center: Point, half_w: f32, half_h: f32, bounds: &Rect) -> Point {
    let (bx, by, bw, bh) = *bounds;
    if bw <= 0.0 || bh <= 0.0 {
        return center;
    }
    let (min_x, max_x) = (bx + half_w, bx + bw - half_w);
    let (min_y, max_y) = (by + half_h, by + bh - half_h);
    let x = if max_x < min_x {
        bx + bw * 0.5
    } else {
        center.0.clamp(min_x, max_x)
    };
    let y = if max_y < min_y {
        by + bh * 0.5
    } else {
        center.1.clamp(min_y, max_y)
    };
    (x, y)
}

/// Closest point of the rect (boundary or interior) to `point`.
pub fn nearest_point_on_rect(point: Point, rect: &Rect) -> Point {
    (
        point.0.clamp(rect.0, rect.0 + rect.2),
        point.1.clamp(rect.1, rect.1 + rect.3),
    )
}

pub fn point_inside_rect(point: Point, rect: &Rect) -> bool {
    point.0 > rect.0 && point.0 < rect.0 + rect.2 && point.1 > rect.1 && point.1 < rect.1 + rect.3
}

/// Uniform-grid index over points for rect queries.
pub(crate) struct PointGrid {
    cell: f32,
    cells: HashMap<(i32, i32), Vec<usize>>,
}

impl PointGrid {
    pub(crate) fn new(cell: f32, points: &[Point]) -> Self {
        let cell = cell.max(8.0);
        let mut cells: HashMap<(i32, i32), Vec<usize>> = HashMap::new();
        for (i, p) in points.iter().enumerate() {
            if !p.0.is_finite() || !p.1.is_finite() {
                continue;
            }
            let key = ((p.0 / cell).floor() as i32, (p.1 / cell).floor() as i32);
            cells.entry(key).or_default().push(i);
        }
        Self { cell, cells }
    }

    /// Indices of points that may lie in `rect`, ascending within each cell.
    pub(crate) fn query(&self, rect: &Rect) -> impl Iterator<Item = usize> + '_ {
        let x0 = (rect.0 / self.cell).floor() as i32;
        let y0 = (rect.1 / self.cell).floor() as i32;
        let x1 = ((rect.0 + rect.2) / self.cell).floor() as i32;
        let y1 = ((rect.1 + rect.3) / self.cell).floor() as i32;
        (x0..=x1)
            .flat_map(move |ix| (y0..=y1).map(move |iy| (ix, iy)))
            .flat_map(move |key| {
                self.cells
                    .get(&key)
                    .map(|v| v.as_slice())
                    .unwrap_or(&[])
                    .iter()
                    .copied()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_area_no_overlap() {
        let a: Rect = (0.0, 0.0, 10.0, 10.0);
        let b: Rect = (20.0, 20.0, 10.0, 10.0);
        assert_eq!(overlap_area(&a, &b), 0.0);
        assert!(!rects_overlap(&a, &b));
    }

    #[test]
    fn overlap_area_partial_overlap() {
        let a: Rect = (0.0, 0.0, 10.0, 10.0);
        let b: Rect = (5.0, 5.0, 10.0, 10.0);
        assert_eq!(overlap_area(&a, &b), 25.0);
        assert_eq!(overlap_extent(&a, &b), (5.0, 5.0));
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a: Rect = (0.0, 0.0, 10.0, 10.0);
        let b: Rect = (10.0, 0.0, 10.0, 10.0);
        assert!(!rects_overlap(&a, &b));
    }

    #[test]
    fn inflate_grows_on_every_side() {
        assert_eq!(inflate_rect((10.0, 10.0, 20.0, 5.0), 2.0, 1.0), (8.0, 9.0, 24.0, 7.0));
    }

    #[test]
    fn clamp_keeps_box_inside() {
        let bounds: Rect = (10.0, 10.0, 100.0, 100.0);
        let c = clamp_center_to_bounds((12.0, 200.0), 10.0, 5.0, &bounds);
        assert_eq!(c, (20.0, 105.0));
        assert_eq!(clamp_center_to_bounds((50.0, 50.0), 10.0, 5.0, &bounds), (50.0, 50.0));
    }

    #[test]
    fn oversized_box_is_centred() {
        let bounds: Rect = (0.0, 0.0, 10.0, 10.0);
        assert_eq!(clamp_center_to_bounds((1.0, 1.0), 20.0, 2.0, &bounds), (5.0, 2.0));
    }

    #[test]
    fn nearest_point_clamps_to_edges() {
        let rect: Rect = (10.0, 10.0, 20.0, 10.0);
        assert_eq!(nearest_point_on_rect((0.0, 15.0), &rect), (10.0, 15.0));
        assert_eq!(nearest_point_on_rect((40.0, 40.0), &rect), (30.0, 20.0));
    }

    #[test]
    fn point_grid_finds_only_nearby_points() {
        let points = vec![(5.0, 5.0), (500.0, 500.0), (12.0, 8.0)];
        let grid = PointGrid::new(16.0, &points);
        let mut hits: Vec<usize> = grid.query(&(0.0, 0.0, 20.0, 20.0)).collect();
        hits.sort_unstable();
        assert_eq!(hits, vec![0, 2]);
        assert_eq!(grid.query(&(1000.0, 1000.0, 5.0, 5.0)).count(), 0);
    }
}
