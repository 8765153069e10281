use super::Triangle;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const TITLE: &[u8] = b"tilemesh - map tile geometry";

/// Write triangles to a binary STL file
///
/// Binary STL format:
/// - 80 byte header
/// - 4 byte u32 triangle count (little endian)
/// - For each triangle: 3 x f32 normal, 3 x 3 x f32 vertices, 2 byte attribute
pub fn write_stl(path: &Path, triangles: &[Triangle]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create STL file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_stl_to(&mut writer, triangles)?;
    writer.flush()?;
    Ok(())
}

/// Write binary STL to any writer
pub fn write_stl_to<W: Write>(writer: &mut W, triangles: &[Triangle]) -> Result<()> {
    let mut header = [b' '; 80];
    header[..TITLE.len()].copy_from_slice(TITLE);
    writer.write_all(&header)?;
    writer.write_all(&(triangles.len() as u32).to_le_bytes())?;

    for tri in triangles {
        for &n in &tri.normal {
            writer.write_all(&n.to_le_bytes())?;
        }
        for vertex in &tri.vertices {
            for &coord in vertex {
                writer.write_all(&coord.to_le_bytes())?;
            }
        }
        writer.write_all(&[0u8, 0u8])?;
    }

    Ok(())
}

/// Size in bytes of a binary STL with the given number of triangles
pub fn estimate_stl_size(triangle_count: usize) -> usize {
    80 + 4 + triangle_count * 50
}
