use crate::error::{Error, Result};
use crate::geometry::{Point2D, PointExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoadId(pub usize);

/// Index of a vertex within its road's chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntersectionId(pub usize);

/// One vertex of a road's doubly-linked chain
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedVertex {
    pub point: Point2D,
    pub prev: Option<VertexId>,
    pub next: Option<VertexId>,
    /// Set when the vertex is shared with other roads
    pub intersection: Option<IntersectionId>,
}

/// A road centerline with a width.
///
/// Vertices live in an arena owned by the road and link to each other by
/// index. A road whose first and last input points coincide is circular:
/// every vertex has both neighbors and there is no start or end.
#[derive(Debug, Clone)]
pub struct Road {
    id: RoadId,
    vertices: Vec<LinkedVertex>,
    width: f64,
    closed: bool,
}

impl Road {
    pub fn new(id: RoadId, points: &[Point2D], width: f64) -> Result<Self> {
        let mut points = points.to_vec();
        points.dedup_by(|a, b| a.approx_eq(*b));

        let closed = points.len() > 3 && points[0].approx_eq(points[points.len() - 1]);
        if closed {
            points.pop();
        }
        if points.len() < 2 {
            return Err(Error::DegenerateGeometry(format!(
                "road needs at least two distinct points, got {}",
                points.len()
            )));
        }

        let n = points.len();
        let vertices = points
            .into_iter()
            .enumerate()
            .map(|(i, point)| {
                let (prev, next) = if closed {
                    (Some(VertexId((i + n - 1) % n)), Some(VertexId((i + 1) % n)))
                } else {
                    (
                        i.checked_sub(1).map(VertexId),
                        (i + 1 < n).then_some(VertexId(i + 1)),
                    )
                };
                LinkedVertex {
                    point,
                    prev,
                    next,
                    intersection: None,
                }
            })
            .collect();

        Ok(Self {
            id,
            vertices,
            width,
            closed,
        })
    }

    pub fn id(&self) -> RoadId {
        self.id
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// First vertex of an open road
    pub fn start(&self) -> Option<VertexId> {
        (!self.closed).then_some(VertexId(0))
    }

    /// Last vertex of an open road
    pub fn end(&self) -> Option<VertexId> {
        (!self.closed).then_some(VertexId(self.vertices.len() - 1))
    }

    pub fn vertex(&self, id: VertexId) -> &LinkedVertex {
        &self.vertices[id.0]
    }

    pub fn vertices(&self) -> &[LinkedVertex] {
        &self.vertices
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> {
        (0..self.vertices.len()).map(VertexId)
    }

    pub(crate) fn set_intersection(&mut self, vertex: VertexId, id: Option<IntersectionId>) {
        self.vertices[vertex.0].intersection = id;
    }

    /// Centerline points; a closed road repeats its first point at the end
    pub fn points(&self) -> Vec<Point2D> {
        let mut points: Vec<Point2D> = self.vertices.iter().map(|v| v.point).collect();
        if self.closed {
            points.push(self.vertices[0].point);
        }
        points
    }
}
