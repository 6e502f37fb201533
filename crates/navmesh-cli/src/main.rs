//! CLI utility for inspecting triangle navmeshes and querying paths

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use glam::Vec3;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use navmesh::{
    BuildReport, DebugInfo, NavMesh, NavMeshConfig, NavMeshPath, NavMeshQuery, PathFailure,
    PathStatus, QueryConfig, StraightPathOptions, Waypoint,
};
use navmesh_common::TriMesh;

/// A CLI utility for building triangle navigation meshes and finding paths on them
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build a navigation mesh from an input mesh and print a summary
    Info {
        /// Input mesh file (OBJ format)
        #[clap(long, value_parser)]
        input: PathBuf,

        /// Maximum squared distance between vertices treated as shared
        #[clap(long, default_value = "0.001")]
        link_epsilon: f32,
    },

    /// Find a path on a navigation mesh
    FindPath {
        /// Input mesh file (OBJ format)
        #[clap(long, value_parser)]
        input: PathBuf,

        /// Start position (x,y,z)
        #[clap(long, value_parser = parse_vector, allow_hyphen_values = true)]
        start: Vec3,

        /// End position (x,y,z)
        #[clap(long, value_parser = parse_vector, allow_hyphen_values = true)]
        end: Vec3,

        /// Radius of the moving entity
        #[clap(long, default_value = "1.0")]
        radius: f32,

        /// Keep one waypoint per crossed wall
        #[clap(long)]
        no_straighten: bool,

        /// Maximum distance between the query positions and the mesh
        #[clap(long)]
        max_distance: Option<f32>,

        /// Maximum squared distance between vertices treated as shared
        #[clap(long, default_value = "0.001")]
        link_epsilon: f32,

        /// Output path file (.json for a JSON report, CSV otherwise)
        #[clap(long, value_parser)]
        output: Option<PathBuf>,
    },
}

/// Result of a path query as written to JSON
#[derive(Debug, Serialize)]
struct PathReport {
    start: [f32; 3],
    end: [f32; 3],
    status: PathStatus,
    failure: Option<PathFailure>,
    length: f32,
    expanded_cells: usize,
    waypoints: Vec<Waypoint>,
}

/// Parse a comma-separated vector
fn parse_vector(s: &str) -> Result<Vec3, String> {
    let parts: Vec<&str> = s.split(',').collect();

    if parts.len() != 3 {
        return Err(format!(
            "Vector must have 3 components, got {}",
            parts.len()
        ));
    }

    let x = parts[0].trim().parse::<f32>().map_err(|e| e.to_string())?;
    let y = parts[1].trim().parse::<f32>().map_err(|e| e.to_string())?;
    let z = parts[2].trim().parse::<f32>().map_err(|e| e.to_string())?;

    Ok(Vec3::new(x, y, z))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();
    let args = Args::parse();

    match args.command {
        Commands::Info {
            input,
            link_epsilon,
        } => info(&input, link_epsilon),
        Commands::FindPath {
            input,
            start,
            end,
            radius,
            no_straighten,
            max_distance,
            link_epsilon,
            output,
        } => {
            let config = QueryConfig {
                entity_radius: radius,
                straight_path: if no_straighten {
                    StraightPathOptions::AllCrossings
                } else {
                    StraightPathOptions::Straighten
                },
                max_search_distance: max_distance.unwrap_or(f32::MAX),
            };
            find_path(&input, link_epsilon, start, end, config, output.as_deref())
        }
    }
}

/// Load an OBJ mesh and build a navigation mesh from it
fn load_nav_mesh(input: &Path, link_epsilon: f32) -> Result<(NavMesh, BuildReport)> {
    println!("Loading mesh from {}...", input.display());

    let mesh = TriMesh::from_obj(input)
        .with_context(|| format!("Failed to load mesh: {}", input.display()))?;

    println!(
        "Mesh loaded: {} vertices, {} triangles",
        mesh.vert_count(),
        mesh.tri_count()
    );

    let config = NavMeshConfig { link_epsilon };
    NavMesh::build_with_report(&mesh, config)
        .map_err(|e| anyhow!("Failed to build navigation mesh: {}", e))
}

/// Print a summary of the navigation mesh built from `input`
fn info(input: &Path, link_epsilon: f32) -> Result<()> {
    let (nav_mesh, report) = load_nav_mesh(input, link_epsilon)?;

    println!(
        "Navigation mesh built: {} cells, {} links",
        report.accepted, report.links
    );

    if let Some((bmin, bmax)) = bounds(&nav_mesh) {
        println!("Mesh bounds: min={:?}, max={:?}", bmin, bmax);
    }

    let border_walls: usize = nav_mesh
        .cells()
        .iter()
        .map(|cell| cell.links().iter().filter(|link| link.is_none()).count())
        .sum();
    println!("Border walls: {}", border_walls);

    if !report.rejected.is_empty() {
        println!("Rejected {} triangles:", report.rejected.len());
        for rejected in &report.rejected {
            println!("  triangle {}: {}", rejected.triangle, rejected.reason);
        }
    }

    Ok(())
}

fn bounds(nav_mesh: &NavMesh) -> Option<(Vec3, Vec3)> {
    let mut vertices = nav_mesh.cells().iter().flat_map(|cell| cell.vertices().iter().copied());
    let first = vertices.next()?;
    Some(vertices.fold((first, first), |(min, max), v| (min.min(v), max.max(v))))
}

/// Find a path on a navigation mesh
fn find_path(
    input: &Path,
    link_epsilon: f32,
    start: Vec3,
    end: Vec3,
    config: QueryConfig,
    output: Option<&Path>,
) -> Result<()> {
    let (nav_mesh, report) = load_nav_mesh(input, link_epsilon)?;
    println!(
        "Navigation mesh built: {} cells, {} links",
        report.accepted, report.links
    );

    let mut query = NavMeshQuery::with_config(&nav_mesh, config)
        .map_err(|e| anyhow!("Invalid query configuration: {}", e))?;

    println!("Finding path from {:?} to {:?}...", start, end);

    let mut path = NavMeshPath::new();
    let mut debug_info = DebugInfo::new();
    let status = query.calculate_path_with_debug(start, end, &mut path, &mut debug_info);

    match path.failure() {
        Some(failure) => println!("No path found: {}", failure),
        None => println!(
            "Found path with {} waypoints after expanding {} cells",
            path.len(),
            debug_info.expanded_cells
        ),
    }

    if let Some(output_path) = output {
        println!("Saving path to {}...", output_path.display());

        let file = File::create(output_path)
            .with_context(|| format!("Failed to create output file: {}", output_path.display()))?;
        let mut writer = BufWriter::new(file);

        let is_json = output_path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            let report = PathReport {
                start: start.to_array(),
                end: end.to_array(),
                status,
                failure: path.failure(),
                length: path.length(),
                expanded_cells: debug_info.expanded_cells,
                waypoints: path.waypoints().to_vec(),
            };
            serde_json::to_writer_pretty(&mut writer, &report)
                .context("Failed to write JSON path report")?;
            writeln!(writer)?;
        } else {
            writeln!(writer, "# Path from {:?} to {:?}", start, end)?;
            writeln!(writer, "# {} waypoints", path.len())?;

            for waypoint in path.waypoints() {
                let p = waypoint.position;
                writeln!(writer, "{},{},{},{}", p.x, p.y, p.z, waypoint.cell.id())?;
            }
        }

        writer.flush()?;
    } else {
        println!("Path:");
        for (i, waypoint) in path.waypoints().iter().enumerate() {
            let p = waypoint.position;
            println!("{}: {},{},{} ({})", i, p.x, p.y, p.z, waypoint.cell);
        }
    }

    Ok(())
}
