pub mod bounds;
pub mod multipolygon;
pub mod point;
pub mod ring;
pub mod segment;
pub mod splitter;

pub use bounds::Aabb;
pub use multipolygon::{Multipolygon, Ombb, RingGroup};
pub use point::{EPSILON, Point2D, PointExt, coordinate_key, line_intersection, pt, signed_area};
pub use ring::{Ring, RingKind};
pub use segment::Segment;
pub use splitter::split_polygon;
