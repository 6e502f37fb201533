//! Navigation mesh built from a triangle soup
//!
//! Building turns every walkable triangle into a [`Cell`] and links cells
//! that share an edge. The finished mesh is read-only; path searches keep
//! their state in a [`NavMeshQuery`](crate::NavMeshQuery).

use std::collections::HashMap;

use crate::cell::{Cell, PathClassification, SIDE_AB, SIDE_BC, SIDE_CA};
use crate::config::NavMeshConfig;
use crate::CellId;
use navmesh_common::{from_xz, to_xz, triangle_normal, Error, Line2D, Result, TriMesh, Vec3};

/// Largest number of cells a mesh can hold
const MAX_CELLS: usize = u32::MAX as usize;

/// Why a source triangle did not become a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriangleRejection {
    /// Two vertices coincide or all three are colinear
    DegenerateTriangle,
    /// The triangle faces downward or is vertical
    BackFacingTriangle,
}

impl std::fmt::Display for TriangleRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TriangleRejection::DegenerateTriangle => write!(f, "degenerate triangle"),
            TriangleRejection::BackFacingTriangle => write!(f, "triangle normal faces downward"),
        }
    }
}

/// A source triangle skipped while building
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectedTriangle {
    /// Index of the triangle in the source mesh
    pub triangle: usize,
    /// Reason for the rejection
    pub reason: TriangleRejection,
}

/// Summary of a navmesh build
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Number of triangles turned into cells
    pub accepted: usize,
    /// Triangles that were skipped
    pub rejected: Vec<RejectedTriangle>,
    /// Number of wall links, counted once per direction
    pub links: usize,
}

/// Indexed triangle export of a navmesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavMeshTriangulation {
    /// Unique cell vertices
    pub vertices: Vec<Vec3>,
    /// Three indices per cell, in cell order
    pub indices: Vec<u32>,
}

/// A set of linked triangle cells
#[derive(Debug, Clone, Default)]
pub struct NavMesh {
    cells: Vec<Cell>,
    config: NavMeshConfig,
}

impl NavMesh {
    /// Builds a navmesh with the default configuration
    pub fn build(mesh: &TriMesh) -> Result<Self> {
        Self::build_with_config(mesh, NavMeshConfig::default())
    }

    /// Builds a navmesh with a custom configuration
    pub fn build_with_config(mesh: &TriMesh, config: NavMeshConfig) -> Result<Self> {
        Self::build_with_report(mesh, config).map(|(nav_mesh, _)| nav_mesh)
    }

    /// Builds a navmesh and reports which triangles were skipped
    ///
    /// Structural problems with the input buffers or the configuration fail
    /// the build. Degenerate and back-facing triangles are only logged and
    /// reported.
    pub fn build_with_report(mesh: &TriMesh, config: NavMeshConfig) -> Result<(Self, BuildReport)> {
        config.validate()?;
        mesh.validate()?;

        let mut report = BuildReport::default();
        let mut cells = Vec::with_capacity(mesh.tri_count());

        for t in 0..mesh.tri_count() {
            let Some([a, b, c]) = mesh.triangle(t) else {
                continue;
            };

            if let Some(reason) = Self::check_triangle(a, b, c) {
                log::warn!("Skipping triangle {}: {}", t, reason);
                report.rejected.push(RejectedTriangle { triangle: t, reason });
                continue;
            }

            Self::check_cell_capacity(cells.len() + 1)?;
            cells.push(Cell::new(a, b, c));
        }

        let mut nav_mesh = Self { cells, config };
        report.accepted = nav_mesh.cells.len();
        report.links = nav_mesh.link_cells();

        log::debug!(
            "Built navmesh: {} cells, {} links, {} triangles rejected",
            report.accepted,
            report.links,
            report.rejected.len()
        );

        Ok((nav_mesh, report))
    }

    /// Fails once more cells are accepted than a [`CellId`] can address
    fn check_cell_capacity(accepted: usize) -> Result<()> {
        if accepted > MAX_CELLS {
            return Err(Error::InvalidMesh(format!(
                "more than {} walkable triangles",
                MAX_CELLS
            )));
        }

        Ok(())
    }

    fn check_triangle(a: Vec3, b: Vec3, c: Vec3) -> Option<TriangleRejection> {
        if a == b || b == c || c == a {
            return Some(TriangleRejection::DegenerateTriangle);
        }

        let normal = triangle_normal(&a, &b, &c);
        if normal.length_squared() == 0.0 {
            return Some(TriangleRejection::DegenerateTriangle);
        }

        // the up plane's pseudo distance of the normal is its Y component
        if normal.y <= 0.0 {
            return Some(TriangleRejection::BackFacingTriangle);
        }

        None
    }

    /// Links every pair of cells sharing an edge, returns the number of links
    fn link_cells(&mut self) -> usize {
        let epsilon = self.config.link_epsilon;
        let count = self.cells.len();

        for a in 0..count {
            for b in 0..count {
                if a != b {
                    self.check_and_link(a, b, epsilon);
                }
            }
        }

        self.link_count()
    }

    /// Links cell `a` to cell `b` on the first free wall of `a` that `b` shares
    fn check_and_link(&mut self, a: usize, b: usize, epsilon: f32) {
        for side in [SIDE_AB, SIDE_BC, SIDE_CA] {
            if self.cells[a].link(side).is_some() {
                continue;
            }

            let (v0, v1) = self.cells[a].edge(side);
            if self.cells[b].request_link(v0, v1, CellId::from(a), epsilon) {
                self.cells[a].set_link(side, Some(CellId::from(b)));
                return;
            }
        }
    }

    /// Gets a cell by id
    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id.index())
    }

    /// Gets all cells
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of cells in the mesh
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Iterates over all cell ids
    pub fn cell_ids(&self) -> impl Iterator<Item = CellId> {
        (0..self.cells.len()).map(CellId::from)
    }

    /// Number of wall links, counted once per direction
    pub fn link_count(&self) -> usize {
        self.cells
            .iter()
            .map(|cell| cell.links().iter().filter(|link| link.is_some()).count())
            .sum()
    }

    /// Gets the configuration the mesh was built with
    pub fn config(&self) -> &NavMeshConfig {
        &self.config
    }

    /// Finds the cell closest to `point`
    ///
    /// Among cells whose footprint contains the point, the one whose surface
    /// is vertically closest wins. Otherwise the cell whose boundary is
    /// closest in 3D wins. Candidates farther than `max_distance` are
    /// ignored.
    pub fn find_closest_cell(&self, point: Vec3, max_distance: f32) -> Option<CellId> {
        let point_2d = to_xz(point);
        let mut closest: Option<(CellId, f32)> = None;

        for (i, cell) in self.cells.iter().enumerate() {
            if !cell.contains(point_2d) {
                continue;
            }

            let height_distance = (cell.height_at(point_2d) - point.y).abs();
            if height_distance > max_distance {
                continue;
            }

            if closest.map_or(true, |(_, best)| height_distance < best) {
                closest = Some((CellId::from(i), height_distance));
            }
        }

        if let Some((id, _)) = closest {
            return Some(id);
        }

        for (i, cell) in self.cells.iter().enumerate() {
            let path = Line2D::new(to_xz(cell.center()), point_2d);
            let PathClassification::Exiting { point: hit, .. } = cell.classify_path(&path) else {
                continue;
            };

            let distance = from_xz(hit, cell.height_at(hit)).distance(point);
            if distance < closest.map_or(max_distance, |(_, best)| best) {
                closest = Some((CellId::from(i), distance));
            }
        }

        closest.map(|(id, _)| id)
    }

    /// Moves `point` into the footprint of a cell and onto its surface
    ///
    /// Returns the point unchanged if the cell does not exist.
    pub fn snap_point_to_cell(&self, id: CellId, point: Vec3) -> Vec3 {
        let Some(cell) = self.cell(id) else {
            return point;
        };

        let mut point_2d = to_xz(point);
        if !cell.contains(point_2d) {
            cell.force_point_to_cell_column(&mut point_2d);
        }

        from_xz(point_2d, cell.height_at(point_2d))
    }

    /// Snaps `point` onto the closest cell of the mesh
    pub fn snap_point_to_mesh(&self, point: Vec3) -> Option<Vec3> {
        self.find_closest_cell(point, f32::MAX)
            .map(|id| self.snap_point_to_cell(id, point))
    }

    /// Finds the on-mesh point nearest to `point` within `max_distance`
    pub fn sample_position(&self, point: Vec3, max_distance: f32) -> Option<Vec3> {
        self.find_closest_cell(point, max_distance)
            .map(|id| self.snap_point_to_cell(id, point))
    }

    /// Checks if the XZ position of `point` lies within any cell
    pub fn is_inside(&self, point: Vec3) -> bool {
        let point_2d = to_xz(point);
        self.cells.iter().any(|cell| cell.contains(point_2d))
    }

    /// Exports the cells as an indexed triangle list
    pub fn triangulation(&self) -> NavMeshTriangulation {
        let mut result = NavMeshTriangulation::default();
        let mut lookup: HashMap<[u32; 3], u32> = HashMap::new();

        for cell in &self.cells {
            for vertex in cell.vertices() {
                let key = vertex.to_array().map(f32::to_bits);
                let index = *lookup.entry(key).or_insert_with(|| {
                    result.vertices.push(*vertex);
                    (result.vertices.len() - 1) as u32
                });
                result.indices.push(index);
            }
        }

        result
    }
}
