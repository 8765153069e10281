//! Extruded-profile roofs: a fixed cross-section swept along the OMBB.

use super::{RoofGeometry, RoofOrientation, RoofParams, SkirtPoint, textures};
use crate::error::{Error, Result};
use crate::geometry::{EPSILON, Multipolygon, Point2D, PointExt};
use crate::mesh::{Facing, MeshBuilder, Vertex};

/// Control points (fraction across the width, fraction of roof height).
/// The first and last points sit at the eaves.
pub type HeightProfile = &'static [(f64, f64)];

pub const GAMBREL: HeightProfile = &[(0.0, 0.0), (0.2, 0.6), (0.5, 1.0), (0.8, 0.6), (1.0, 0.0)];

pub const SALTBOX: HeightProfile = &[(0.0, 0.0), (0.3, 1.0), (1.0, 0.0)];

/// Frame across the oriented bounding box
struct ProfileFrame {
    origin: Point2D,
    /// Unit vector across the ridge
    across: Point2D,
    /// Unit vector along the ridge
    along: Point2D,
    width: f64,
    profile: HeightProfile,
    min_height: f64,
    roof_height: f64,
}

impl ProfileFrame {
    fn new(footprint: &Multipolygon, params: &RoofParams, profile: HeightProfile) -> Result<Self> {
        let ombb = footprint.ombb_or_aabb();
        let (axis, axis_len) = ombb.axis();
        let (cross, cross_len) = ombb.cross_axis();
        let (long, short) = if axis_len >= cross_len {
            ((axis, axis_len), (cross, cross_len))
        } else {
            ((cross, cross_len), (axis, axis_len))
        };
        // Along: the ridge follows the long side and the profile spans the short one
        let ((along, _), (across, width)) = match params.orientation {
            RoofOrientation::Along => (long, short),
            RoofOrientation::Across => (short, long),
        };
        if width < EPSILON {
            return Err(Error::DegenerateGeometry(
                "profile roof has zero width".to_string(),
            ));
        }

        // Project from the corner minimizing both coordinates
        let origin = ombb
            .corners
            .iter()
            .copied()
            .min_by(|a, b| {
                (a.dot(across) + a.dot(along)).total_cmp(&(b.dot(across) + b.dot(along)))
            })
            .unwrap_or(ombb.corners[0]);

        Ok(Self {
            origin,
            across,
            along,
            width,
            profile,
            min_height: params.min_height,
            roof_height: params.height,
        })
    }

    /// Fraction across the width, clamped to the box
    fn t(&self, p: Point2D) -> f64 {
        ((p - self.origin).dot(self.across) / self.width).clamp(0.0, 1.0)
    }

    fn height_fraction(&self, t: f64) -> f64 {
        for pair in self.profile.windows(2) {
            let ((t0, h0), (t1, h1)) = (pair[0], pair[1]);
            if t <= t1 {
                let span = t1 - t0;
                return if span < EPSILON {
                    h1
                } else {
                    h0 + (h1 - h0) * (t - t0) / span
                };
            }
        }
        self.profile.last().map_or(0.0, |&(_, h)| h)
    }

    /// Slope distance from the first eave to `t`
    fn arc_length(&self, t: f64) -> f64 {
        let mut length = 0.0;
        for pair in self.profile.windows(2) {
            let ((t0, h0), (t1, h1)) = (pair[0], pair[1]);
            let end = t.min(t1);
            if end <= t0 {
                break;
            }
            let frac = if t1 - t0 < EPSILON { 1.0 } else { (end - t0) / (t1 - t0) };
            let run = (t1 - t0) * self.width * frac;
            let rise = (h1 - h0) * self.roof_height * frac;
            length += run.hypot(rise);
        }
        length
    }

    fn elevation(&self, p: Point2D) -> f64 {
        self.min_height + self.roof_height * self.height_fraction(self.t(p))
    }

    fn vertex(&self, p: Point2D) -> Vertex {
        Vertex::new(
            [p.x, self.elevation(p), p.y],
            [(p - self.origin).dot(self.along), self.arc_length(self.t(p))],
        )
    }

    /// Interior breakpoints where the slope changes
    fn breakpoints(&self) -> impl Iterator<Item = f64> + '_ {
        let n = self.profile.len();
        self.profile[1..n.saturating_sub(1)].iter().map(|&(t, _)| t)
    }

    /// Parameter of `p` across the box, unclamped
    fn raw_t(&self, p: Point2D) -> f64 {
        (p - self.origin).dot(self.across) / self.width
    }
}

pub fn build_group(
    footprint: &Multipolygon,
    group: usize,
    params: &RoofParams,
    profile: HeightProfile,
) -> Result<RoofGeometry> {
    let frame = ProfileFrame::new(footprint, params, profile)?;
    let bands: Vec<(f64, f64)> = profile.windows(2).map(|w| (w[0].0, w[1].0)).collect();
    let mut builder = MeshBuilder::new().with_flip(params.flip);

    for tri in footprint.group_triangles(group) {
        for &(lo, hi) in &bands {
            let piece = clip_band(tri, |p| frame.raw_t(p), lo, hi);
            if piece.len() < 3 {
                continue;
            }
            // Each band is planar, so a fan covers the convex clip
            for i in 1..piece.len() - 1 {
                builder.add_triangle(
                    [
                        frame.vertex(piece[0]),
                        frame.vertex(piece[i]),
                        frame.vertex(piece[i + 1]),
                    ],
                    Facing::Up,
                    textures::ROOF_TILES,
                );
            }
        }
    }

    if builder.is_empty() {
        return Err(Error::DegenerateGeometry(
            "profile roof produced no triangles".to_string(),
        ));
    }

    let ring_group = &footprint.groups()[group];
    let skirt = std::iter::once(ring_group.outer)
        .chain(ring_group.inner.iter().copied())
        .map(|index| (index, ring_skirt(&frame, footprint.ring(index).points())))
        .collect();

    Ok(RoofGeometry {
        mesh: builder.finish(),
        skirt,
        can_extend_outside_footprint: false,
    })
}

/// Eave line with extra points where an edge crosses a profile breakpoint
fn ring_skirt(frame: &ProfileFrame, ring: &[Point2D]) -> Vec<SkirtPoint> {
    let mut skirt = Vec::with_capacity(ring.len());
    for i in 0..ring.len() {
        let p = ring[i];
        let q = ring[(i + 1) % ring.len()];
        skirt.push(SkirtPoint {
            point: p,
            height: frame.elevation(p),
        });

        let (tp, tq) = (frame.raw_t(p), frame.raw_t(q));
        let mut crossings: Vec<f64> = frame
            .breakpoints()
            .filter(|&b| (tp - b) * (tq - b) < 0.0)
            .map(|b| (b - tp) / (tq - tp))
            .collect();
        crossings.sort_by(f64::total_cmp);
        for s in crossings {
            let point = p + (q - p) * s;
            skirt.push(SkirtPoint {
                point,
                height: frame.elevation(point),
            });
        }
    }
    skirt
}

/// Clip a triangle to the band `lo <= t(p) <= hi`
fn clip_band(
    tri: &[Point2D; 3],
    t: impl Fn(Point2D) -> f64,
    lo: f64,
    hi: f64,
) -> Vec<Point2D> {
    let above = clip_half_plane(tri, |p| t(p) - lo);
    clip_half_plane(&above, |p| hi - t(p))
}

/// Sutherland-Hodgman against one half-plane; keeps points with `side >= 0`
fn clip_half_plane(polygon: &[Point2D], side: impl Fn(Point2D) -> f64) -> Vec<Point2D> {
    let mut out = Vec::with_capacity(polygon.len() + 2);
    for i in 0..polygon.len() {
        let p = polygon[i];
        let q = polygon[(i + 1) % polygon.len()];
        let (sp, sq) = (side(p), side(q));
        if sp >= 0.0 {
            out.push(p);
        }
        if (sp >= 0.0) != (sq >= 0.0) {
            let s = sp / (sp - sq);
            out.push(p + (q - p) * s);
        }
    }
    out.dedup_by(|a, b| a.approx_eq(*b));
    if out.len() > 1 && out[0].approx_eq(out[out.len() - 1]) {
        out.pop();
    }
    out
}
