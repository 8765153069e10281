/// A triangle for STL output (Z-up)
#[derive(Debug, Clone)]
pub struct Triangle {
    /// Three vertices: [[x, y, z], [x, y, z], [x, y, z]]
    pub vertices: [[f32; 3]; 3],
    /// Normal vector [nx, ny, nz]
    pub normal: [f32; 3],
}

impl Triangle {
    /// Create a new triangle and calculate its normal
    pub fn new(v0: [f32; 3], v1: [f32; 3], v2: [f32; 3]) -> Self {
        let n = face_normal(
            v0.map(f64::from),
            v1.map(f64::from),
            v2.map(f64::from),
        );
        Self {
            vertices: [v0, v1, v2],
            normal: n.map(|c| c as f32),
        }
    }
}

pub fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn cross(u: [f64; 3], v: [f64; 3]) -> [f64; 3] {
    [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ]
}

pub fn normalize(v: [f64; 3]) -> Option<[f64; 3]> {
    let len = dot(v, v).sqrt();
    if len > 1e-10 {
        Some([v[0] / len, v[1] / len, v[2] / len])
    } else {
        None
    }
}

/// Unit normal of a triangle by the right-hand rule
pub fn face_normal(v0: [f64; 3], v1: [f64; 3], v2: [f64; 3]) -> [f64; 3] {
    normalize(cross(sub(v1, v0), sub(v2, v0))).unwrap_or([0.0, 1.0, 0.0])
}

/// One emitted vertex: Y-up position and UV in meters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: [f64; 3],
    pub uv: [f64; 2],
}

impl Vertex {
    pub fn new(position: [f64; 3], uv: [f64; 2]) -> Self {
        Self { position, uv }
    }
}

/// Which way a triangle should face before any flip is applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Facing {
    /// Normal with a non-negative Y component
    Up,
    /// Normal with a non-negative component along the given vector
    Toward([f64; 3]),
}

/// Flat float buffers ready for upload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    /// x, y, z per vertex (Y-up)
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub uvs: Vec<f32>,
    pub texture_ids: Vec<u8>,
}

impl MeshBuffers {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn append(&mut self, other: MeshBuffers) {
        self.positions.extend(other.positions);
        self.normals.extend(other.normals);
        self.uvs.extend(other.uvs);
        self.texture_ids.extend(other.texture_ids);
    }

    /// Convert to Z-up STL triangles.
    ///
    /// Swapping the Y and Z axes mirrors the mesh, so the winding is reversed
    /// to keep normals pointing the same way.
    pub fn to_triangles(&self) -> Vec<Triangle> {
        self.positions
            .chunks_exact(9)
            .map(|t| {
                let v = |i: usize| [t[i * 3], t[i * 3 + 2], t[i * 3 + 1]];
                Triangle::new(v(0), v(2), v(1))
            })
            .collect()
    }
}

/// Accumulator for triangle meshes with per-vertex normals, UVs and texture ids
#[derive(Debug, Default)]
pub struct MeshBuilder {
    buffers: MeshBuffers,
    flip: bool,
}

impl MeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reverse every emitted triangle and negate its normals
    pub fn with_flip(mut self, flip: bool) -> Self {
        self.flip = flip;
        self
    }

    /// Add a flat-shaded triangle oriented according to `facing`
    pub fn add_triangle(&mut self, vertices: [Vertex; 3], facing: Facing, texture_id: u8) {
        let [a, b, c] = orient(vertices, facing);
        let normal = face_normal(a.position, b.position, c.position);
        self.push([a, b, c], [normal; 3], texture_id);
    }

    /// Add a triangle whose normal is supplied by the caller
    pub fn add_triangle_with_normal(
        &mut self,
        vertices: [Vertex; 3],
        normal: [f64; 3],
        texture_id: u8,
    ) {
        let facing = Facing::Toward(normal);
        let vertices = orient(vertices, facing);
        self.push(vertices, [normal; 3], texture_id);
    }

    /// Add a smooth-shaded triangle; winding follows the averaged normal
    pub fn add_smooth_triangle(
        &mut self,
        vertices: [Vertex; 3],
        normals: [[f64; 3]; 3],
        texture_id: u8,
    ) {
        let sum = [
            normals[0][0] + normals[1][0] + normals[2][0],
            normals[0][1] + normals[1][1] + normals[2][1],
            normals[0][2] + normals[1][2] + normals[2][2],
        ];
        let [a, b, c] = vertices;
        let face = cross(sub(b.position, a.position), sub(c.position, a.position));
        if dot(face, sum) < 0.0 {
            self.push([a, c, b], [normals[0], normals[2], normals[1]], texture_id);
        } else {
            self.push([a, b, c], normals, texture_id);
        }
    }

    /// Add two triangles for a quad given in boundary order
    pub fn add_quad(&mut self, vertices: [Vertex; 4], facing: Facing, texture_id: u8) {
        let [a, b, c, d] = vertices;
        self.add_triangle([a, b, c], facing, texture_id);
        self.add_triangle([a, c, d], facing, texture_id);
    }

    fn push(&mut self, vertices: [Vertex; 3], normals: [[f64; 3]; 3], texture_id: u8) {
        let (order, sign) = if self.flip {
            ([0, 2, 1], -1.0)
        } else {
            ([0, 1, 2], 1.0)
        };
        for i in order {
            let v = vertices[i];
            let n = normals[i];
            self.buffers
                .positions
                .extend(v.position.iter().map(|&c| c as f32));
            self.buffers
                .normals
                .extend(n.iter().map(|&c| (c * sign) as f32));
            self.buffers.uvs.extend(v.uv.iter().map(|&c| c as f32));
            self.buffers.texture_ids.push(texture_id);
        }
    }

    /// Get the number of triangles
    pub fn len(&self) -> usize {
        self.buffers.triangle_count()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Consume the builder and return the buffers
    pub fn finish(self) -> MeshBuffers {
        self.buffers
    }
}

fn orient(vertices: [Vertex; 3], facing: Facing) -> [Vertex; 3] {
    let [a, b, c] = vertices;
    let target = match facing {
        Facing::Up => [0.0, 1.0, 0.0],
        Facing::Toward(v) => v,
    };
    let n = cross(sub(b.position, a.position), sub(c.position, a.position));
    if dot(n, target) < 0.0 { [a, c, b] } else { [a, b, c] }
}
