use crate::geometry::{Point2D, PointExt, Segment};

/// Nearest point on a [`SegmentGroup`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub point: Point2D,
    pub distance: f64,
    /// Index of the segment the point lies on
    pub segment: usize,
    /// Parameter along that segment, 0 at its start and 1 at its end
    pub t: f64,
}

/// Immutable set of line segments for snapping queries
#[derive(Debug, Clone, Default)]
pub struct SegmentGroup {
    segments: Vec<Segment>,
}

impl SegmentGroup {
    /// Build from polylines; zero-length pieces are skipped
    pub fn from_polylines<'a>(polylines: impl IntoIterator<Item = &'a [Point2D]>) -> Self {
        let segments = polylines
            .into_iter()
            .flat_map(|line| line.windows(2).map(|w| Segment::new(w[0], w[1])))
            .filter(|s| s.length() > 0.0)
            .collect();
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Closest point over every segment, by linear scan
    pub fn closest_projection(&self, p: Point2D) -> Option<Projection> {
        self.segments
            .iter()
            .enumerate()
            .map(|(segment, s)| {
                let (point, t) = s.project(p);
                Projection {
                    point,
                    distance: p.distance_to(point),
                    segment,
                    t,
                }
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::pt;
    use approx::assert_relative_eq;

    #[test]
    fn test_closest_projection() {
        let a = [pt(0.0, 0.0), pt(10.0, 0.0)];
        let b = [pt(0.0, 5.0), pt(10.0, 5.0), pt(10.0, 15.0)];
        let group = SegmentGroup::from_polylines([&a[..], &b[..]]);
        assert_eq!(group.len(), 3);

        let hit = group.closest_projection(pt(4.0, 3.5)).unwrap();
        assert!(hit.point.approx_eq(pt(4.0, 5.0)));
        assert_relative_eq!(hit.distance, 1.5);
        assert_eq!(hit.segment, 1);
        assert_relative_eq!(hit.t, 0.4);

        // Beyond the end clamps to the endpoint
        let hit = group.closest_projection(pt(12.0, 20.0)).unwrap();
        assert!(hit.point.approx_eq(pt(10.0, 15.0)));
    }

    #[test]
    fn test_empty_group() {
        let group = SegmentGroup::from_polylines(std::iter::empty());
        assert!(group.is_empty());
        assert!(group.closest_projection(pt(0.0, 0.0)).is_none());
    }
}
