//! Indexed triangle soup used as navmesh input

use crate::{Error, Result};
use glam::Vec3;

use std::fs;
use std::path::Path;

/// A raw indexed triangle list: a flat position buffer plus 3 indices per triangle
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct TriMesh {
    /// The vertices of the mesh as a flat array of [x, y, z] coordinates
    pub vertices: Vec<f32>,
    /// The indices of the mesh, 3 per triangle
    pub indices: Vec<u32>,
}

impl TriMesh {
    /// Creates a new empty triangle mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps existing position and index buffers
    pub fn from_buffers(vertices: Vec<f32>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Builds a mesh from positions and index triples
    pub fn from_triangles(positions: &[Vec3], triangles: &[[u32; 3]]) -> Self {
        Self {
            vertices: positions.iter().flat_map(|p| p.to_array()).collect(),
            indices: triangles.iter().flatten().copied().collect(),
        }
    }

    /// Loads a mesh from an OBJ file
    pub fn from_obj<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_obj_str(&content)
    }

    /// Parses OBJ content from a string
    ///
    /// Only `v` and `f` records are read. Faces with more than three vertices
    /// are fan-triangulated.
    ///
    /// # Example
    ///
    /// ```
    /// use navmesh_common::TriMesh;
    ///
    /// let obj_content = r#"
    /// v 0.0 0.0 0.0
    /// v 0.0 0.0 1.0
    /// v 1.0 0.0 0.0
    /// f 1 2 3
    /// "#;
    ///
    /// let mesh = TriMesh::from_obj_str(obj_content).unwrap();
    /// assert_eq!(mesh.vert_count(), 3);
    /// assert_eq!(mesh.tri_count(), 1);
    /// ```
    pub fn from_obj_str(content: &str) -> Result<Self> {
        let mut mesh = Self::new();

        for (line_no, line) in content.lines().enumerate() {
            mesh.parse_obj_line(line)
                .map_err(|e| Error::InvalidMesh(format!("line {}: {}", line_no + 1, e)))?;
        }

        log::debug!(
            "Parsed OBJ mesh: {} vertices, {} triangles",
            mesh.vert_count(),
            mesh.tri_count()
        );
        Ok(mesh)
    }

    fn parse_obj_line(&mut self, line: &str) -> std::result::Result<(), String> {
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            Some("v") => {
                for axis in ["x", "y", "z"] {
                    let value = tokens
                        .next()
                        .ok_or_else(|| format!("vertex is missing its {} coordinate", axis))?
                        .parse::<f32>()
                        .map_err(|_| format!("vertex {} coordinate is not a number", axis))?;
                    self.vertices.push(value);
                }
            }
            Some("f") => {
                let mut face = Vec::new();
                for token in tokens {
                    face.push(self.parse_face_index(token)?);
                }

                if face.len() < 3 {
                    return Err("face has less than 3 vertices".to_string());
                }

                for i in 1..face.len() - 1 {
                    self.indices.extend_from_slice(&[face[0], face[i], face[i + 1]]);
                }
            }
            _ => {
                // normals, texture coordinates, groups and comments
            }
        }

        Ok(())
    }

    /// Resolves a `v`, `v/vt` or `v/vt/vn` face token to a zero-based index
    fn parse_face_index(&self, token: &str) -> std::result::Result<u32, String> {
        let index_str = token.split('/').next().unwrap_or_default();
        let index = index_str
            .parse::<i64>()
            .map_err(|_| format!("face index '{}' is not a number", index_str))?;

        // OBJ indices are 1-based, negative values count back from the last vertex
        let resolved = match index {
            0 => return Err("face index 0 is not valid in OBJ".to_string()),
            i if i > 0 => i - 1,
            i => self.vert_count() as i64 + i,
        };

        u32::try_from(resolved).map_err(|_| format!("face index {} is out of range", index))
    }

    /// Number of vertices in the position buffer
    pub fn vert_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Number of triangles in the index buffer
    pub fn tri_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Returns vertex `i` as a position
    pub fn vertex(&self, i: usize) -> Option<Vec3> {
        let v = self.vertices.get(i * 3..i * 3 + 3)?;
        Some(Vec3::new(v[0], v[1], v[2]))
    }

    /// Returns the three corner positions of triangle `t`
    pub fn triangle(&self, t: usize) -> Option<[Vec3; 3]> {
        let idx = self.indices.get(t * 3..t * 3 + 3)?;
        Some([
            self.vertex(idx[0] as usize)?,
            self.vertex(idx[1] as usize)?,
            self.vertex(idx[2] as usize)?,
        ])
    }

    /// Checks the buffers for structural problems
    ///
    /// Both buffers must hold whole triples, every index must reference an
    /// existing vertex and every coordinate must be finite.
    pub fn validate(&self) -> Result<()> {
        if self.vertices.len() % 3 != 0 {
            return Err(Error::InvalidMesh(format!(
                "vertex buffer length {} is not a multiple of 3",
                self.vertices.len()
            )));
        }

        if self.indices.len() % 3 != 0 {
            return Err(Error::InvalidMesh(format!(
                "index buffer length {} is not a multiple of 3",
                self.indices.len()
            )));
        }

        if let Some(pos) = self.vertices.iter().position(|v| !v.is_finite()) {
            return Err(Error::InvalidMesh(format!(
                "vertex {} has a non-finite coordinate",
                pos / 3
            )));
        }

        let vert_count = self.vert_count();
        if let Some(&bad) = self.indices.iter().find(|&&i| i as usize >= vert_count) {
            return Err(Error::InvalidMesh(format!(
                "index {} is out of range for {} vertices",
                bad, vert_count
            )));
        }

        Ok(())
    }

    /// Calculates the axis-aligned bounding box of the mesh
    pub fn calculate_bounds(&self) -> (Vec3, Vec3) {
        if self.vert_count() == 0 {
            return (Vec3::ZERO, Vec3::ZERO);
        }

        (0..self.vert_count())
            .filter_map(|i| self.vertex(i))
            .fold((Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)), |(bmin, bmax), v| {
                (bmin.min(v), bmax.max(v))
            })
    }
}
