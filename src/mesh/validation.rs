//! Mesh validation and repair utilities
//!
//! - Roof geometry must stay inside its footprint bounds
//! - STL output drops degenerate and non-finite triangles

use super::Triangle;
use crate::error::{Error, Result};
use crate::geometry::{Multipolygon, pt};
use crate::roof::RoofGeometry;

/// Result of STL mesh validation
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Total number of triangles validated
    pub total: usize,
    /// Number of degenerate triangles (zero or near-zero area)
    pub degenerate: usize,
    /// Number of triangles with invalid coordinates (NaN/Inf)
    pub invalid_coords: usize,
}

impl ValidationResult {
    pub fn has_issues(&self) -> bool {
        self.degenerate > 0 || self.invalid_coords > 0
    }

    pub fn summary(&self) -> String {
        if !self.has_issues() {
            format!("Mesh valid: {} triangles, no issues", self.total)
        } else {
            format!(
                "Mesh issues: {} total, {} degenerate, {} invalid coords",
                self.total, self.degenerate, self.invalid_coords
            )
        }
    }
}

/// Minimum area threshold for non-degenerate triangles (square meters)
const MIN_TRIANGLE_AREA: f32 = 1e-8;

/// Check that every roof vertex projects inside the padded footprint bounds.
///
/// Positions are Y-up, so the planar coordinates are x and z.
pub fn validate_roof_geometry(
    geometry: &RoofGeometry,
    footprint: &Multipolygon,
    padding: f64,
) -> Result<()> {
    let bounds = footprint.aabb().padded(padding);
    for (i, p) in geometry.mesh.positions.chunks_exact(3).enumerate() {
        let (x, y) = (f64::from(p[0]), f64::from(p[2]));
        if !x.is_finite() || !y.is_finite() || !bounds.contains(pt(x, y)) {
            return Err(Error::ValidationFailure(format!(
                "vertex {i} at ({x:.3}, {y:.3}) is outside the footprint bounds"
            )));
        }
    }
    Ok(())
}

/// Count degenerate and non-finite triangles
pub fn validate_mesh(triangles: &[Triangle]) -> ValidationResult {
    let mut result = ValidationResult {
        total: triangles.len(),
        ..Default::default()
    };

    for tri in triangles {
        if has_invalid_coords(tri) {
            result.invalid_coords += 1;
        } else if is_degenerate(tri) {
            result.degenerate += 1;
        }
    }

    result
}

fn has_invalid_coords(tri: &Triangle) -> bool {
    tri.vertices
        .iter()
        .flatten()
        .chain(tri.normal.iter())
        .any(|c| !c.is_finite())
}

fn is_degenerate(tri: &Triangle) -> bool {
    triangle_area(&tri.vertices) < MIN_TRIANGLE_AREA
}

fn triangle_area(vertices: &[[f32; 3]; 3]) -> f32 {
    let [v0, v1, v2] = *vertices;

    let edge_a = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
    let edge_b = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];

    let cx = edge_a[1] * edge_b[2] - edge_a[2] * edge_b[1];
    let cy = edge_a[2] * edge_b[0] - edge_a[0] * edge_b[2];
    let cz = edge_a[0] * edge_b[1] - edge_a[1] * edge_b[0];

    0.5 * (cx * cx + cy * cy + cz * cz).sqrt()
}

/// Remove degenerate and invalid triangles from a mesh
pub fn remove_degenerate(triangles: Vec<Triangle>) -> Vec<Triangle> {
    triangles
        .into_iter()
        .filter(|tri| !has_invalid_coords(tri) && !is_degenerate(tri))
        .collect()
}

/// Validate and clean a mesh in one pass
pub fn validate_and_fix(triangles: Vec<Triangle>) -> (Vec<Triangle>, ValidationResult) {
    let report = validate_mesh(&triangles);
    (remove_degenerate(triangles), report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{Facing, MeshBuilder, Vertex};

    fn roof_with_point(x: f64, y: f64) -> RoofGeometry {
        let mut builder = MeshBuilder::new();
        builder.add_triangle(
            [
                Vertex::new([1.0, 5.0, 1.0], [0.0, 0.0]),
                Vertex::new([2.0, 5.0, 1.0], [0.0, 0.0]),
                Vertex::new([x, 5.0, y], [0.0, 0.0]),
            ],
            Facing::Up,
            0,
        );
        RoofGeometry {
            mesh: builder.finish(),
            ..Default::default()
        }
    }

    fn square() -> Multipolygon {
        Multipolygon::from_outer(vec![pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 10.0), pt(0.0, 10.0)])
            .unwrap()
    }

    #[test]
    fn test_roof_inside_bounds_passes() {
        assert!(validate_roof_geometry(&roof_with_point(10.0, 10.0), &square(), 0.01).is_ok());
        // Within the padding
        assert!(validate_roof_geometry(&roof_with_point(10.005, -0.005), &square(), 0.01).is_ok());
    }

    #[test]
    fn test_roof_outside_bounds_fails() {
        let result = validate_roof_geometry(&roof_with_point(10.02, 5.0), &square(), 0.01);
        assert!(matches!(result, Err(Error::ValidationFailure(_))));
        let result = validate_roof_geometry(&roof_with_point(5.0, -0.5), &square(), 0.01);
        assert!(matches!(result, Err(Error::ValidationFailure(_))));
    }

    #[test]
    fn test_degenerate_triangle_collinear() {
        let tri = Triangle::new([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]);
        assert!(is_degenerate(&tri));
    }

    #[test]
    fn test_invalid_coords_nan() {
        let tri = Triangle {
            vertices: [[f32::NAN, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normal: [0.0, 0.0, 1.0],
        };
        assert!(has_invalid_coords(&tri));
    }

    #[test]
    fn test_validate_and_fix() {
        let valid = Triangle::new([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let degenerate = Triangle::new([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]);

        let (cleaned, report) = validate_and_fix(vec![valid, degenerate]);

        assert_eq!(report.total, 2);
        assert_eq!(report.degenerate, 1);
        assert!(report.has_issues());
        assert_eq!(cleaned.len(), 1);
    }

    #[test]
    fn test_triangle_area() {
        let vertices = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        assert!((triangle_area(&vertices) - 0.5).abs() < 0.001);
    }
}
