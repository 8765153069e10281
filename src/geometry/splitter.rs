//! Split a simple polygon by an infinite line.
//!
//! Every edge that changes side of the line contributes one crossing point.
//! Crossings are sorted by their parameter along the line and paired
//! (0,1), (2,3), ...; within a simple polygon the segment between each pair
//! lies inside the polygon. Walking the boundary and jumping to the partner
//! crossing whenever a crossing is reached traces out the closed pieces.

use super::point::{EPSILON, Point2D, PointExt, dedupe_loop, signed_area};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy)]
enum Node {
    Vertex(Point2D),
    Crossing { point: Point2D, index: usize },
}

impl Node {
    fn point(&self) -> Point2D {
        match *self {
            Node::Vertex(p) | Node::Crossing { point: p, .. } => p,
        }
    }
}

/// Split `polygon` by the line through `origin` along `direction`.
///
/// Coincident consecutive vertices are merged first. Returns the polygon as
/// a single piece when the line does not cross it.
pub fn split_polygon(
    polygon: &[Point2D],
    origin: Point2D,
    direction: Point2D,
) -> Result<Vec<Vec<Point2D>>> {
    let mut polygon = polygon.to_vec();
    dedupe_loop(&mut polygon);
    if polygon.len() < 3 {
        return Err(Error::DegenerateGeometry(format!(
            "cannot split a polygon with {} distinct vertices",
            polygon.len()
        )));
    }
    let dir = direction
        .normalized()
        .ok_or_else(|| Error::DegenerateGeometry("split direction has zero length".to_string()))?;
    let normal = dir.left_normal();

    // Points exactly on the line count as lying on the positive side
    let side = |p: Point2D| (p - origin).dot(normal);
    let positive = |d: f64| d >= 0.0;

    let n = polygon.len();
    let mut nodes = Vec::with_capacity(n * 2);
    // (parameter along the line, position in `nodes`)
    let mut crossings: Vec<(f64, usize)> = Vec::new();

    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        nodes.push(Node::Vertex(a));

        let da = side(a);
        let db = side(b);
        if positive(da) != positive(db) {
            let t = da / (da - db);
            let point = a + (b - a) * t;
            let along = (point - origin).dot(dir);
            crossings.push((along, nodes.len()));
            nodes.push(Node::Crossing {
                point,
                index: crossings.len() - 1,
            });
        }
    }

    if crossings.is_empty() {
        return Ok(vec![polygon]);
    }
    if crossings.len() % 2 != 0 {
        return Err(Error::SplitInconsistency {
            crossings: crossings.len(),
        });
    }

    // partner[crossing index] = node position of the paired crossing
    let mut order: Vec<usize> = (0..crossings.len()).collect();
    order.sort_by(|&a, &b| crossings[a].0.total_cmp(&crossings[b].0));
    let mut partner = vec![0; crossings.len()];
    for pair in order.chunks(2) {
        partner[pair[0]] = crossings[pair[1]].1;
        partner[pair[1]] = crossings[pair[0]].1;
    }

    let mut visited = vec![false; nodes.len()];
    let mut pieces = Vec::new();

    for start in 0..nodes.len() {
        if visited[start] || matches!(nodes[start], Node::Crossing { .. }) {
            continue;
        }

        let mut piece = Vec::new();
        let mut cursor = start;
        let mut steps = 0;
        loop {
            match nodes[cursor] {
                Node::Vertex(p) => {
                    if cursor == start && !piece.is_empty() {
                        break;
                    }
                    visited[cursor] = true;
                    piece.push(p);
                    cursor = (cursor + 1) % nodes.len();
                }
                Node::Crossing { point, index } => {
                    let jump = partner[index];
                    piece.push(point);
                    piece.push(nodes[jump].point());
                    cursor = (jump + 1) % nodes.len();
                }
            }

            steps += 1;
            if steps > nodes.len() * 2 {
                return Err(Error::SplitInconsistency {
                    crossings: crossings.len(),
                });
            }
        }

        dedupe_loop(&mut piece);
        if piece.len() >= 3 && signed_area(&piece).abs() > EPSILON {
            pieces.push(piece);
        }
    }

    Ok(pieces)
}
