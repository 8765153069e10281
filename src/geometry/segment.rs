use super::point::{Point2D, PointExt};

/// A finite line segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point2D,
    pub end: Point2D,
}

impl Segment {
    pub fn new(start: Point2D, end: Point2D) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(self.end)
    }

    /// Closest point on the segment to `p`, with its parameter in `[0, 1]`
    pub fn project(&self, p: Point2D) -> (Point2D, f64) {
        let dir = self.end - self.start;
        let len_sq = dir.dot(dir);
        if len_sq == 0.0 {
            return (self.start, 0.0);
        }
        let t = ((p - self.start).dot(dir) / len_sq).clamp(0.0, 1.0);
        (self.start + dir * t, t)
    }

    pub fn distance_to(&self, p: Point2D) -> f64 {
        self.project(p).0.distance_to(p)
    }
}
