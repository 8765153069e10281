//! Skeleton-driven roofs: hipped, gabled and the mansard family.
//!
//! All of them turn straight-skeleton facets into triangles; they only
//! differ in how a facet is converted, which [`FacetStyle`] captures as data.

use tracing::debug;

use super::skeleton::{Skeleton, SkeletonFacet, SkeletonOracle};
use super::{RoofGeometry, RoofParams, group_skirt, textures};
use crate::error::{Error, Result};
use crate::geometry::{EPSILON, Multipolygon, Point2D, PointExt, pt, split_polygon};
use crate::mesh::{Facing, MeshBuilder, Vertex, triangulate};

/// Two-slope profile of a mansard-style facet.
///
/// The facet is cut at `split_progress * max_skeleton_height` from its eave.
/// The lower part rises to `seam_height` (fraction of the roof height), the
/// upper part starts `bump` higher and rises to the full roof height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitCoefficients {
    pub split_progress: f64,
    pub seam_height: f64,
    pub bump: f64,
}

impl SplitCoefficients {
    fn lower_scale(&self) -> f64 {
        self.seam_height / self.split_progress
    }

    fn upper_scale(&self) -> f64 {
        (1.0 - self.seam_height - self.bump).max(0.0) / (1.0 - self.split_progress)
    }
}

pub const MANSARD: SplitCoefficients = SplitCoefficients {
    split_progress: 0.3,
    seam_height: 0.75,
    bump: 0.02,
};

/// Steep lower slope up to the full height, flat top
pub const QUADRUPLE_SALTBOX: SplitCoefficients = SplitCoefficients {
    split_progress: 0.5,
    seam_height: 1.0,
    bump: 0.0,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FacetStyle {
    Hipped,
    /// Triangular facets become vertical gables under a ridge
    Gabled,
    Split(SplitCoefficients),
}

pub fn build_group(
    footprint: &Multipolygon,
    group: usize,
    params: &RoofParams,
    oracle: &dyn SkeletonOracle,
    style: FacetStyle,
) -> Result<RoofGeometry> {
    let ring_group = &footprint.groups()[group];
    let holes: Vec<&[Point2D]> = ring_group
        .inner
        .iter()
        .map(|&i| footprint.ring(i).points())
        .collect();
    let skeleton = oracle.facets_for(footprint.ring(ring_group.outer).points(), &holes)?;

    Ok(RoofGeometry {
        mesh: skeleton_mesh(&skeleton, params, style)?.finish(),
        skirt: group_skirt(footprint, group, |_| params.min_height),
        can_extend_outside_footprint: false,
    })
}

fn skeleton_mesh(skeleton: &Skeleton, params: &RoofParams, style: FacetStyle) -> Result<MeshBuilder> {
    if skeleton.max_height < EPSILON {
        return Err(Error::DegenerateGeometry(
            "skeleton has no height".to_string(),
        ));
    }

    let mut builder = MeshBuilder::new().with_flip(params.flip);
    for facet in &skeleton.facets {
        if facet.polygon.len() < 3 {
            continue;
        }
        let Some(frame) = FacetFrame::new(facet, skeleton.max_height, params) else {
            continue;
        };
        match style {
            FacetStyle::Gabled if facet.polygon.len() == 3 => frame.add_gable(&mut builder, facet),
            FacetStyle::Split(coefficients) => {
                frame.add_split(&mut builder, facet, coefficients)?
            }
            _ => frame.add_hipped(&mut builder, facet)?,
        }
    }

    Ok(builder)
}

/// Base edge frame of one facet: eave origin, eave direction and the
/// direction pointing up the slope
struct FacetFrame {
    origin: Point2D,
    along: Point2D,
    inward: Point2D,
    max_height: f64,
    min_height: f64,
    roof_height: f64,
}

impl FacetFrame {
    fn new(facet: &SkeletonFacet, max_height: f64, params: &RoofParams) -> Option<Self> {
        let (a, b) = facet.edge;
        let along = (b - a).normalized()?;
        let centroid = facet
            .polygon
            .iter()
            .fold(pt(0.0, 0.0), |sum, v| sum + v.point)
            / facet.polygon.len() as f64;
        let mut inward = along.left_normal();
        if (centroid - a).dot(inward) < 0.0 {
            inward = inward * -1.0;
        }
        Some(Self {
            origin: a,
            along,
            inward,
            max_height,
            min_height: params.min_height,
            roof_height: params.height,
        })
    }

    /// Skeleton height of a point: its distance from the eave line
    fn depth(&self, p: Point2D) -> f64 {
        (p - self.origin).dot(self.inward).max(0.0)
    }

    fn vertex(&self, p: Point2D, elevation: f64) -> Vertex {
        let rise = elevation - self.min_height;
        Vertex::new(
            [p.x, elevation, p.y],
            [(p - self.origin).dot(self.along), self.depth(p).hypot(rise)],
        )
    }

    fn hipped_elevation(&self, skeleton_height: f64) -> f64 {
        self.min_height + skeleton_height / self.max_height * self.roof_height
    }

    fn add_hipped(&self, builder: &mut MeshBuilder, facet: &SkeletonFacet) -> Result<()> {
        let points: Vec<Point2D> = facet.polygon.iter().map(|v| v.point).collect();
        let vertices: Vec<Vertex> = facet
            .polygon
            .iter()
            .map(|v| self.vertex(v.point, self.hipped_elevation(v.height)))
            .collect();
        add_polygon(builder, &points, &vertices)
    }

    /// Replace a hip triangle with a vertical gable and two ridge triangles
    fn add_gable(&self, builder: &mut MeshBuilder, facet: &SkeletonFacet) {
        let Some(apex) = facet
            .polygon
            .iter()
            .max_by(|x, y| x.height.total_cmp(&y.height))
        else {
            return;
        };
        let (a, b) = facet.edge;
        let mid = (a + b) * 0.5;
        let ridge = self.hipped_elevation(apex.height);

        let va = self.vertex(a, self.min_height);
        let vb = self.vertex(b, self.min_height);
        let top = self.vertex(apex.point, ridge);
        let vm = self.vertex(mid, ridge);
        let wall = Vertex::new(vm.position, [(mid - a).dot(self.along), ridge - self.min_height]);
        let outward = [-self.inward.x, 0.0, -self.inward.y];

        builder.add_triangle(
            [
                Vertex::new(va.position, [0.0, 0.0]),
                Vertex::new(vb.position, [(b - a).dot(self.along), 0.0]),
                wall,
            ],
            Facing::Toward(outward),
            textures::DEFAULT,
        );
        builder.add_triangle([va, vm, top], Facing::Up, textures::ROOF_TILES);
        builder.add_triangle([vm, vb, top], Facing::Up, textures::ROOF_TILES);
    }

    /// Cut the facet parallel to its eave and give each side its own slope
    fn add_split(
        &self,
        builder: &mut MeshBuilder,
        facet: &SkeletonFacet,
        coefficients: SplitCoefficients,
    ) -> Result<()> {
        let offset = coefficients.split_progress * self.max_height;
        let points: Vec<Point2D> = facet.polygon.iter().map(|v| v.point).collect();
        let pieces = match split_polygon(&points, self.origin + self.inward * offset, self.along) {
            Ok(pieces) => pieces,
            Err(e) => {
                debug!(error = %e, "abandoning facet split");
                return self.add_hipped(builder, facet);
            }
        };

        let seam = self.min_height + coefficients.seam_height * self.roof_height;
        let bump = coefficients.bump * self.roof_height;
        let lower = |depth: f64| {
            self.min_height
                + depth / self.max_height * self.roof_height * coefficients.lower_scale()
        };
        let upper = |depth: f64| {
            seam + bump
                + (depth - offset).max(0.0) / self.max_height
                    * self.roof_height
                    * coefficients.upper_scale()
        };

        for piece in pieces {
            let mean_depth =
                piece.iter().map(|&p| self.depth(p)).sum::<f64>() / piece.len() as f64;
            let is_upper = mean_depth > offset;
            let vertices: Vec<Vertex> = piece
                .iter()
                .map(|&p| {
                    let depth = self.depth(p);
                    let elevation = if is_upper { upper(depth) } else { lower(depth) };
                    self.vertex(p, elevation)
                })
                .collect();
            add_polygon(builder, &piece, &vertices)?;

            if is_upper && bump > EPSILON {
                self.add_seam_strip(builder, &piece, offset, seam, bump);
            }
        }

        Ok(())
    }

    /// Vertical strip filling the bump between the lower and upper slopes
    fn add_seam_strip(
        &self,
        builder: &mut MeshBuilder,
        piece: &[Point2D],
        offset: f64,
        seam: f64,
        bump: f64,
    ) {
        let on_seam = |p: Point2D| (self.depth(p) - offset).abs() < 1e-6;
        let outward = [-self.inward.x, 0.0, -self.inward.y];
        for i in 0..piece.len() {
            let p = piece[i];
            let q = piece[(i + 1) % piece.len()];
            if !on_seam(p) || !on_seam(q) || p.approx_eq(q) {
                continue;
            }
            let (u0, u1) = ((p - self.origin).dot(self.along), (q - self.origin).dot(self.along));
            builder.add_quad(
                [
                    Vertex::new([p.x, seam, p.y], [u0, 0.0]),
                    Vertex::new([q.x, seam, q.y], [u1, 0.0]),
                    Vertex::new([q.x, seam + bump, q.y], [u1, bump]),
                    Vertex::new([p.x, seam + bump, p.y], [u0, bump]),
                ],
                Facing::Toward(outward),
                textures::ROOF_TILES,
            );
        }
    }
}

/// Triangulate a planar loop and emit it with per-point vertices
fn add_polygon(builder: &mut MeshBuilder, points: &[Point2D], vertices: &[Vertex]) -> Result<()> {
    let indices = triangulate(points, &[])?;
    for tri in indices.chunks_exact(3) {
        builder.add_triangle(
            [vertices[tri[0]], vertices[tri[1]], vertices[tri[2]]],
            Facing::Up,
            textures::ROOF_TILES,
        );
    }
    Ok(())
}
