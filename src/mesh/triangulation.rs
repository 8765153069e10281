use earcutr::earcut;

use crate::error::{Error, Result};
use crate::geometry::Point2D;

/// Ear-clip a polygon with holes.
///
/// Returns indices into the concatenation of `outer` followed by each hole.
pub fn triangulate(outer: &[Point2D], holes: &[&[Point2D]]) -> Result<Vec<usize>> {
    if outer.len() < 3 {
        return Ok(Vec::new());
    }

    let mut vertices: Vec<f64> =
        Vec::with_capacity((outer.len() + holes.iter().map(|h| h.len()).sum::<usize>()) * 2);
    let mut hole_indices: Vec<usize> = Vec::with_capacity(holes.len());

    for p in outer {
        vertices.push(p.x);
        vertices.push(p.y);
    }

    for hole in holes {
        hole_indices.push(vertices.len() / 2);
        for p in *hole {
            vertices.push(p.x);
            vertices.push(p.y);
        }
    }

    earcut(&vertices, &hole_indices, 2).map_err(|e| Error::Triangulation(format!("{e:?}")))
}

/// Triangulate and resolve the indices back into points
pub fn triangulate_points(outer: &[Point2D], holes: &[&[Point2D]]) -> Result<Vec<[Point2D; 3]>> {
    let indices = triangulate(outer, holes)?;

    let mut all_points: Vec<Point2D> = outer.to_vec();
    for hole in holes {
        all_points.extend_from_slice(hole);
    }

    Ok(indices
        .chunks_exact(3)
        .map(|tri| [all_points[tri[0]], all_points[tri[1]], all_points[tri[2]]])
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::pt;

    #[test]
    fn test_triangulate_square() {
        let square = vec![pt(0.0, 0.0), pt(1.0, 0.0), pt(1.0, 1.0), pt(0.0, 1.0)];
        let indices = triangulate(&square, &[]).unwrap();
        assert_eq!(indices.len(), 6);
    }

    #[test]
    fn test_triangulate_empty() {
        let empty: Vec<Point2D> = vec![];
        let indices = triangulate(&empty, &[]).unwrap();
        assert!(indices.is_empty());
    }

    #[test]
    fn test_triangulate_with_hole() {
        let outer = vec![pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 10.0), pt(0.0, 10.0)];
        let hole = vec![pt(2.0, 2.0), pt(8.0, 2.0), pt(8.0, 8.0), pt(2.0, 8.0)];
        let triangles = triangulate_points(&outer, &[&hole]).unwrap();
        assert_eq!(triangles.len(), 8);
    }
}
