use super::point::{Point2D, pt};

/// Axis-aligned bounding box in tile-local meters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Aabb {
    /// Create bounds from a set of points
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2D>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;

        let mut bounds = Self {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
        };
        for p in iter {
            bounds.include(*p);
        }
        Some(bounds)
    }

    /// Grow the bounds to contain a point
    pub fn include(&mut self, p: Point2D) {
        self.min_x = self.min_x.min(p.x);
        self.max_x = self.max_x.max(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_y = self.max_y.max(p.y);
    }

    /// Bounds grown by `padding` on every side
    pub fn padded(&self, padding: f64) -> Self {
        Self {
            min_x: self.min_x - padding,
            max_x: self.max_x + padding,
            min_y: self.min_y - padding,
            max_y: self.max_y + padding,
        }
    }

    pub fn contains(&self, p: Point2D) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Corners in counter-clockwise order starting at the minimum corner
    pub fn corners(&self) -> [Point2D; 4] {
        [
            pt(self.min_x, self.min_y),
            pt(self.max_x, self.min_y),
            pt(self.max_x, self.max_y),
            pt(self.min_x, self.max_y),
        ]
    }
}
