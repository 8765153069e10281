use geo::{Area, Coord, LineString};

/// A point in tile-local meters
pub type Point2D = Coord<f64>;

/// Distance under which two points are considered the same vertex
pub const EPSILON: f64 = 1e-9;

/// Shorthand constructor for a [`Point2D`]
pub fn pt(x: f64, y: f64) -> Point2D {
    Coord { x, y }
}

/// Vector helpers on top of `geo::Coord`
pub trait PointExt {
    fn dot(self, other: Self) -> f64;
    /// Z component of the 3D cross product
    fn cross(self, other: Self) -> f64;
    fn length(self) -> f64;
    fn distance_to(self, other: Self) -> f64;
    /// Unit vector, or `None` for a zero-length vector
    fn normalized(self) -> Option<Self>
    where
        Self: Sized;
    /// Rotated 90 degrees counter-clockwise
    fn left_normal(self) -> Self;
    /// Rotated 90 degrees clockwise
    fn right_normal(self) -> Self;
    /// Rotated counter-clockwise by `angle` radians around the origin
    fn rotated(self, angle: f64) -> Self;
    fn approx_eq(self, other: Self) -> bool;
}

impl PointExt for Point2D {
    fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    fn cross(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    fn distance_to(self, other: Self) -> f64 {
        (other - self).length()
    }

    fn normalized(self) -> Option<Self> {
        let len = self.length();
        if len > EPSILON {
            Some(pt(self.x / len, self.y / len))
        } else {
            None
        }
    }

    fn left_normal(self) -> Self {
        pt(-self.y, self.x)
    }

    fn right_normal(self) -> Self {
        pt(self.y, -self.x)
    }

    fn rotated(self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        pt(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    fn approx_eq(self, other: Self) -> bool {
        (self.x - other.x).abs() < 1e-6 && (self.y - other.y).abs() < 1e-6
    }
}

/// Signed area of a closed loop (positive when counter-clockwise).
/// The loop is implicitly closed; a repeated last point is harmless.
pub fn signed_area(points: &[Point2D]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    geo::Polygon::new(LineString::from(points.to_vec()), vec![]).signed_area()
}

/// Intersection of two infinite lines given as origin + direction.
/// Returns the parameter along the first line, or `None` when parallel.
pub fn line_intersection(
    origin_a: Point2D,
    dir_a: Point2D,
    origin_b: Point2D,
    dir_b: Point2D,
) -> Option<f64> {
    let denom = dir_a.cross(dir_b);
    if denom.abs() < EPSILON {
        return None;
    }
    Some((origin_b - origin_a).cross(dir_b) / denom)
}

/// Millimeter grid key so coincident inputs hash to the same entry
pub fn coordinate_key(p: Point2D) -> (i64, i64) {
    ((p.x * 1000.0).round() as i64, (p.y * 1000.0).round() as i64)
}

/// Drop consecutive duplicates, including a closing point equal to the first
pub fn dedupe_loop(points: &mut Vec<Point2D>) {
    points.dedup_by(|a, b| a.approx_eq(*b));
    while points.len() > 1 && points[0].approx_eq(points[points.len() - 1]) {
        points.pop();
    }
}
