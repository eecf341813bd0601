// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ASCII PLY output
//!
//! Vertices are written in assembly order as `x y z`, faces as
//! `3 i0 i1 i2`. Coordinates use the shortest representation that parses
//! back to the same `f64`, so a written mesh reads back identically.

use crate::element::TriangleIndex;
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use nalgebra::Point3;
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

/// Write the PLY header for `mesh`
fn write_header<W: Write>(mesh: &Mesh, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "ply")?;
    writeln!(out, "format ascii 1.0")?;
    writeln!(out, "element vertex {}", mesh.vertex_count())?;
    writeln!(out, "property float x")?;
    writeln!(out, "property float y")?;
    writeln!(out, "property float z")?;
    writeln!(out, "element face {}", mesh.triangle_count())?;
    writeln!(out, "property list uchar int vertex_indices")?;
    writeln!(out, "end_header")
}

/// Serialize a mesh as ASCII PLY
pub fn write_ply<W: Write>(mesh: &Mesh, mut out: W) -> Result<()> {
    write_header(mesh, &mut out)?;

    for p in &mesh.positions {
        writeln!(out, "{} {} {}", p.x, p.y, p.z)?;
    }

    for face in &mesh.faces {
        let [a, b, c] = face.0;
        writeln!(out, "3 {} {} {}", a, b, c)?;
    }

    out.flush()?;
    Ok(())
}

/// Write a mesh to `path`, creating or truncating the file
pub fn write_ply_file(mesh: &Mesh, path: &Path) -> Result<()> {
    let wrap = |source: std::io::Error| Error::MeshWrite {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(wrap)?;
    match write_ply(mesh, BufWriter::new(file)) {
        Ok(()) => Ok(()),
        Err(Error::Io(source)) => Err(wrap(source)),
        Err(e) => Err(e),
    }
}

/// Parse an ASCII PLY file with `x y z` vertices and triangular faces
pub fn read_ply<R: BufRead>(reader: R) -> Result<Mesh> {
    let mut lines = reader.lines();
    let mut next_line = move || -> Result<Option<String>> {
        lines.next().transpose().map_err(Error::from)
    };

    match next_line()? {
        Some(magic) if magic.trim() == "ply" => {}
        _ => return Err(Error::MeshParse("missing 'ply' magic".to_string())),
    }

    let mut vertex_count: Option<usize> = None;
    let mut face_count: Option<usize> = None;

    loop {
        let line = next_line()?
            .ok_or_else(|| Error::MeshParse("unexpected end of header".to_string()))?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            ["end_header"] => break,
            ["format", "ascii", _] => {}
            ["format", other, ..] => {
                return Err(Error::MeshParse(format!("unsupported format '{}'", other)))
            }
            ["element", "vertex", n] => vertex_count = Some(parse_token(n, "vertex count")?),
            ["element", "face", n] => face_count = Some(parse_token(n, "face count")?),
            ["property", ..] | ["comment", ..] | [] => {}
            _ => return Err(Error::MeshParse(format!("unexpected header line '{}'", line))),
        }
    }

    let vertex_count =
        vertex_count.ok_or_else(|| Error::MeshParse("no vertex element".to_string()))?;
    let face_count = face_count.unwrap_or(0);
    let mut mesh = Mesh::with_capacity(vertex_count, face_count);

    for i in 0..vertex_count {
        let line = next_line()?
            .ok_or_else(|| Error::MeshParse(format!("missing vertex {}", i)))?;
        let coords = line
            .split_whitespace()
            .map(|t| parse_token::<f64>(t, "coordinate"))
            .collect::<Result<Vec<_>>>()?;
        if coords.len() != 3 {
            return Err(Error::MeshParse(format!(
                "vertex {} has {} coordinates",
                i,
                coords.len()
            )));
        }
        mesh.add_vertex(Point3::new(coords[0], coords[1], coords[2]));
    }

    for i in 0..face_count {
        let line = next_line()?
            .ok_or_else(|| Error::MeshParse(format!("missing face {}", i)))?;
        let values = line
            .split_whitespace()
            .map(|t| parse_token::<u32>(t, "face index"))
            .collect::<Result<Vec<_>>>()?;
        match values.as_slice() {
            [3, a, b, c] => {
                if [*a, *b, *c].iter().any(|&idx| idx as usize >= vertex_count) {
                    return Err(Error::MeshParse(format!(
                        "face {} references a missing vertex",
                        i
                    )));
                }
                mesh.faces.push(TriangleIndex::new(*a, *b, *c));
            }
            _ => {
                return Err(Error::MeshParse(format!(
                    "face {} is not a triangle: '{}'",
                    i, line
                )))
            }
        }
    }

    Ok(mesh)
}

fn parse_token<T: std::str::FromStr>(token: &str, what: &str) -> Result<T> {
    token
        .parse()
        .map_err(|_| Error::MeshParse(format!("invalid {} '{}'", what, token)))
}
