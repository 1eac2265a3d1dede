use std::fs::File;
use std::io::{BufReader, BufWriter};

use clap::{Parser, Subcommand};
use log::info;
use survey_tin::boundary::{mesh_boundary, trace_rings};
use survey_tin::cleanup::clean_triangles;
use survey_tin::locate::points_in_triangles;
use survey_tin::mesh::QueryPoint;
use survey_tin::refine::{insert_points, supplant};
use survey_tin::sample::sample_points;
use survey_tin::triangulate::CdtSolver;
use survey_tin::TinMesh;

#[derive(Parser)]
#[command(name = "survey_tin", about = "Incremental TIN maintenance")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Merge coincident vertices and drop degenerate triangles.
    Clean {
        input: String,
        output: String,
        /// Decimal precision for coordinate quantization; omit for exact
        /// deduplication.
        #[arg(long)]
        precision: Option<i32>,
        /// Round to the nearest bucket instead of truncating.
        #[arg(long)]
        offset: bool,
    },
    /// Derive the boundary segment table and report its rings.
    Boundary { input: String, output: String },
    /// Locate the mesh's query points in its triangles.
    Locate { input: String, output: String },
    /// Insert points from a JSON file into the mesh.
    Insert {
        input: String,
        points: String,
        output: String,
    },
    /// Rebuild the whole triangulation, keeping the covered region.
    Rebuild {
        input: String,
        output: String,
        /// Constrain to the mesh boundary only; skip the convex hull wrap.
        #[arg(long)]
        existing_boundary: bool,
    },
    /// Interpolate vertex columns onto the mesh's query points.
    Sample { input: String, output: String },
}

fn read_mesh(path: &str) -> Result<TinMesh, Box<dyn std::error::Error>> {
    let mesh: TinMesh = serde_json::from_reader(BufReader::new(File::open(path)?))?;
    mesh.validate()?;
    Ok(mesh)
}

fn write_json<T: serde::Serialize>(
    path: &str,
    value: &T,
) -> Result<(), Box<dyn std::error::Error>> {
    serde_json::to_writer_pretty(BufWriter::new(File::create(path)?), value)?;
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Clean {
            input,
            output,
            precision,
            offset,
        } => {
            let mesh = read_mesh(&input)?;
            let before = mesh.vertices.len();
            let mut out = mesh.clone();
            let (vertices, triangles) =
                clean_triangles(mesh.vertices, mesh.triangles, precision, offset)?;
            out.vertices = vertices;
            out.triangles = triangles;
            info!("clean: {} -> {} vertices", before, out.vertices.len());
            write_json(&output, &out)?;
        }
        Command::Boundary { input, output } => {
            let mesh = read_mesh(&input)?;
            mesh.check_references()?;
            let out = mesh_boundary(&mesh);
            let rings = trace_rings(out.segments.as_deref().unwrap_or(&[]));
            for (id, ring) in &rings {
                println!("ring {}: {} vertices", id, ring.len());
            }
            write_json(&output, &out)?;
        }
        Command::Locate { input, output } => {
            let mesh = read_mesh(&input)?;
            let points = mesh.points.as_deref().unwrap_or(&[]);
            let hits = points_in_triangles(points, &mesh.vertices, &mesh.triangles)?;
            let located = hits.iter().filter(|h| h.is_some()).count();
            println!("{} / {} points located", located, hits.len());
            write_json(&output, &hits)?;
        }
        Command::Insert {
            input,
            points,
            output,
        } => {
            let mesh = read_mesh(&input)?;
            let new_points: Vec<QueryPoint> =
                serde_json::from_reader(BufReader::new(File::open(&points)?))?;
            let (out, leftover) = insert_points(&mesh, &new_points, &CdtSolver)?;
            println!(
                "inserted {} points, {} leftover",
                new_points.len() - leftover.len(),
                leftover.len()
            );
            write_json(&output, &out)?;
        }
        Command::Rebuild {
            input,
            output,
            existing_boundary,
        } => {
            let mesh = read_mesh(&input)?;
            let out = supplant(&mesh, existing_boundary, &CdtSolver)?;
            println!(
                "rebuilt: {} triangles, {} vertices",
                out.triangles.len(),
                out.vertices.len()
            );
            write_json(&output, &out)?;
        }
        Command::Sample { input, output } => {
            let mesh = read_mesh(&input)?;
            let sampled = sample_points(&mesh)?;
            write_json(&output, &sampled)?;
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
