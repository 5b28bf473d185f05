//! Bounding boxes in page space.
//!
//! Coordinates follow the extractor convention: origin at the top-left of the
//! page, `y` growing downwards, units in points.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box `(x0, y0, x1, y1)` with `x0 <= x1` and
/// `y0 <= y1`.
///
/// Serialized as a four-element array, matching the extractor wire shape.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BBox {
    /// Create a bounding box, swapping corners if they arrive reversed.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Area of the box.
    pub fn area(&self) -> f32 {
        (self.width() * self.height()).abs()
    }

    /// Whether the box has zero area (a point or a line).
    pub fn is_degenerate(&self) -> bool {
        !(self.area() > 0.0)
    }

    /// Center point `(x, y)`.
    pub fn center(&self) -> (f32, f32) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    /// Smallest box enclosing both boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Smallest box enclosing every box in the iterator, or `None` if empty.
    pub fn union_all<'a, I>(boxes: I) -> Option<BBox>
    where
        I: IntoIterator<Item = &'a BBox>,
    {
        boxes.into_iter().fold(None, |acc, b| match acc {
            None => Some(*b),
            Some(u) => Some(u.union(b)),
        })
    }

    /// Area shared by the two boxes (0 when they don't intersect).
    pub fn intersection_area(&self, other: &BBox) -> f32 {
        let x_overlap = (self.x1.min(other.x1) - self.x0.max(other.x0)).max(0.0);
        let y_overlap = (self.y1.min(other.y1) - self.y0.max(other.y0)).max(0.0);
        x_overlap * y_overlap
    }

    /// Intersection over union.
    ///
    /// Symmetric, always within `[0, 1]`, and 0 when the boxes are disjoint or
    /// when both have zero area.
    pub fn overlap_ratio(&self, other: &BBox) -> f32 {
        let intersection = self.intersection_area(other);
        if intersection <= 0.0 {
            return 0.0;
        }

        let union = self.area() + other.area() - intersection;
        if union > 0.0 {
            (intersection / union).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Euclidean distance between the closest edges (0 when overlapping).
    pub fn edge_distance(&self, other: &BBox) -> f32 {
        let dx = (self.x0 - other.x1).max(other.x0 - self.x1).max(0.0);
        let dy = (self.y0 - other.y1).max(other.y0 - self.y1).max(0.0);
        (dx * dx + dy * dy).sqrt()
    }

    /// Whether a point lies inside the box (edges inclusive).
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }

    /// Whether `other` lies fully inside this box, allowing `tolerance` points.
    pub fn contains(&self, other: &BBox, tolerance: f32) -> bool {
        other.x0 >= self.x0 - tolerance
            && other.y0 >= self.y0 - tolerance
            && other.x1 <= self.x1 + tolerance
            && other.y1 <= self.y1 + tolerance
    }
}

impl From<[f32; 4]> for BBox {
    fn from(b: [f32; 4]) -> Self {
        BBox::new(b[0], b[1], b[2], b[3])
    }
}

impl From<BBox> for [f32; 4] {
    fn from(b: BBox) -> Self {
        [b.x0, b.y0, b.x1, b.y1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_corners() {
        let b = BBox::new(10.0, 20.0, 0.0, 5.0);
        assert_eq!(b, BBox::new(0.0, 5.0, 10.0, 20.0));
        assert!(b.x0 <= b.x1 && b.y0 <= b.y1);
    }

    #[test]
    fn test_overlap_ratio_symmetric_and_bounded() {
        let pairs = [
            (BBox::new(0.0, 0.0, 10.0, 10.0), BBox::new(5.0, 5.0, 15.0, 15.0)),
            (BBox::new(0.0, 0.0, 10.0, 10.0), BBox::new(0.0, 0.0, 10.0, 10.0)),
            (BBox::new(0.0, 0.0, 100.0, 2.0), BBox::new(50.0, 1.0, 60.0, 80.0)),
            (BBox::new(0.0, 0.0, 1.0, 1.0), BBox::new(3.0, 3.0, 4.0, 4.0)),
        ];

        for (a, b) in pairs {
            let ab = a.overlap_ratio(&b);
            let ba = b.overlap_ratio(&a);
            assert_eq!(ab, ba);
            assert!((0.0..=1.0).contains(&ab));
        }

        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BBox::new(5.0, 5.0, 15.0, 15.0);
        // 25 / (100 + 100 - 25)
        assert!((a.overlap_ratio(&b) - 25.0 / 175.0).abs() < 1e-6);
        assert_eq!(a.overlap_ratio(&a), 1.0);
    }

    #[test]
    fn test_overlap_ratio_zero_when_disjoint_or_degenerate() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        let far = BBox::new(20.0, 20.0, 30.0, 30.0);
        let touching = BBox::new(10.0, 0.0, 20.0, 10.0);
        let point = BBox::new(5.0, 5.0, 5.0, 5.0);

        assert_eq!(a.overlap_ratio(&far), 0.0);
        assert_eq!(a.overlap_ratio(&touching), 0.0);
        assert_eq!(a.overlap_ratio(&point), 0.0);
        assert_eq!(point.overlap_ratio(&point), 0.0);
    }

    #[test]
    fn test_edge_distance() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(a.edge_distance(&BBox::new(5.0, 5.0, 20.0, 20.0)), 0.0);
        assert_eq!(a.edge_distance(&BBox::new(0.0, 30.0, 10.0, 40.0)), 20.0);
        assert_eq!(a.edge_distance(&BBox::new(13.0, 14.0, 20.0, 20.0)), 5.0);
    }

    #[test]
    fn test_contains_with_tolerance() {
        let table = BBox::new(100.0, 200.0, 500.0, 400.0);
        assert!(table.contains(&BBox::new(120.0, 210.0, 180.0, 222.0), 0.0));
        assert!(!table.contains(&BBox::new(98.0, 210.0, 180.0, 222.0), 0.0));
        assert!(table.contains(&BBox::new(98.0, 210.0, 180.0, 222.0), 2.0));
        assert!(!table.contains(&BBox::new(120.0, 395.0, 180.0, 410.0), 2.0));
    }

    #[test]
    fn test_union_all() {
        let boxes = [BBox::new(0.0, 0.0, 1.0, 1.0), BBox::new(5.0, -2.0, 6.0, 3.0)];
        assert_eq!(
            BBox::union_all(boxes.iter()),
            Some(BBox::new(0.0, -2.0, 6.0, 3.0))
        );
        assert_eq!(BBox::union_all(std::iter::empty()), None);
    }

    #[test]
    fn test_serde_as_array() {
        let b = BBox::new(1.0, 2.0, 3.0, 4.0);
        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(json, "[1.0,2.0,3.0,4.0]");
        let back: BBox = serde_json::from_str("[3, 4, 1, 2]").unwrap();
        assert_eq!(back, b);
    }

    #[test]
    fn test_degenerate() {
        assert!(BBox::new(1.0, 1.0, 1.0, 10.0).is_degenerate());
        assert!(!BBox::new(1.0, 1.0, 2.0, 10.0).is_degenerate());
    }
}
