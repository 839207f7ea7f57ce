// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! gdist CLI

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use gdist::io::{self, MeshBuffers};
use gdist::matrix::{local_matrix_with, MatrixOptions};
use gdist::{distances_on_mesh, GdistConfig, Mesh, Primitive, StopPolicy};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "gdist")]
#[command(about = "Exact geodesic distances on triangle meshes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ./gdist.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Worker threads for matrix builds
    #[arg(short, long, global = true)]
    threads: Option<usize>,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Distances from source vertices to target vertices
    Distances {
        /// Mesh file (.stl or text)
        mesh: PathBuf,

        /// Source vertex indices
        #[arg(short, long, value_delimiter = ',', required = true)]
        sources: Vec<u32>,

        /// Target vertex indices (all vertices when omitted)
        #[arg(short = 'T', long, value_delimiter = ',')]
        targets: Vec<u32>,

        /// Maximum propagation distance
        #[arg(short, long)]
        limit: Option<f64>,

        /// Early termination policy
        #[arg(long)]
        stop_policy: Option<StopPolicy>,

        /// Output JSON file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Sparse matrix of all vertex pairs within a cutoff
    Matrix {
        /// Mesh file (.stl or text)
        mesh: PathBuf,

        /// Distance cutoff
        #[arg(short, long)]
        max_distance: Option<f64>,

        /// Build rows on one thread
        #[arg(long)]
        sequential: bool,

        /// Output JSON file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Mesh statistics
    Info {
        /// Mesh file (.stl or text)
        mesh: PathBuf,
    },

    /// Write a generated test mesh in the text format
    Generate {
        #[arg(value_enum)]
        shape: Shape,

        /// Subdivisions (grid cells per side, sphere/cylinder segments)
        #[arg(short, long, default_value = "10")]
        resolution: usize,

        /// Grid spacing, cube size or radius
        #[arg(long, default_value = "1.0")]
        size: f64,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write the effective configuration to a file
    Config {
        /// Output file
        #[arg(short, long, default_value = "gdist.toml")]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Shape {
    Grid,
    Cube,
    Sphere,
    Cylinder,
}

#[derive(Serialize)]
struct DistanceReport<'a> {
    sources: &'a [u32],
    targets: &'a [u32],
    /// `null` for unreached targets
    distances: Vec<Option<f64>>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = GdistConfig::load_from(cli.config.as_deref())?;
    if let Some(threads) = cli.threads {
        config.threads = Some(threads);
    }
    if let Some(threads) = config.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure the thread pool")?;
    }

    match cli.command {
        Commands::Distances {
            mesh,
            sources,
            targets,
            limit,
            stop_policy,
            output,
        } => {
            if limit.is_some() {
                config.distance_limit = limit;
            }
            if let Some(policy) = stop_policy {
                config.stop_policy = policy;
            }
            distances_command(&mesh, &sources, targets, &config, output.as_deref())
        }
        Commands::Matrix {
            mesh,
            max_distance,
            sequential,
            output,
        } => {
            if max_distance.is_some() {
                config.distance_limit = max_distance;
            }
            if sequential {
                config.parallel_matrix = false;
            }
            matrix_command(&mesh, &config, output.as_deref())
        }
        Commands::Info { mesh } => info_command(&mesh),
        Commands::Generate {
            shape,
            resolution,
            size,
            output,
        } => generate_command(shape, resolution, size, &output),
        Commands::Config { output } => {
            config.save(&output)?;
            println!("{} {}", "Wrote".green(), output.display());
            Ok(())
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn load_mesh(path: &Path) -> Result<(MeshBuffers, Mesh)> {
    let buffers =
        io::load(path).with_context(|| format!("Failed to load mesh: {}", path.display()))?;
    let mesh = buffers
        .build()
        .with_context(|| format!("Invalid mesh: {}", path.display()))?;
    info!(
        "Loaded {}: {} vertices, {} faces",
        path.display(),
        mesh.vertex_count(),
        mesh.face_count()
    );
    Ok((buffers, mesh))
}

fn distances_command(
    path: &Path,
    sources: &[u32],
    targets: Vec<u32>,
    config: &GdistConfig,
    output: Option<&Path>,
) -> Result<()> {
    let (_, mesh) = load_mesh(path)?;
    let targets = if targets.is_empty() {
        (0..mesh.vertex_count() as u32).collect()
    } else {
        targets
    };

    let start = Instant::now();
    let distances = match config.stop_policy {
        StopPolicy::EarlyExit => distances_on_mesh(&mesh, sources, &targets, config.distance_limit)?,
        StopPolicy::ExhaustLimit => exhaustive_distances(&mesh, sources, &targets, config)?,
    };
    let elapsed = start.elapsed();

    let reached = distances.iter().filter(|d| d.is_finite()).count();
    eprintln!(
        "{} {} of {} targets reached in {:.2?}",
        "✓".green(),
        reached.to_string().cyan(),
        targets.len(),
        elapsed
    );

    let report = DistanceReport {
        sources,
        targets: &targets,
        distances: distances
            .iter()
            .map(|&d| d.is_finite().then_some(d))
            .collect(),
    };
    emit(&io::to_json(&report, config.pretty_json)?, output)
}

fn exhaustive_distances(
    mesh: &Mesh,
    sources: &[u32],
    targets: &[u32],
    config: &GdistConfig,
) -> Result<Vec<f64>> {
    let to_points = |indices: &[u32]| -> gdist::Result<Vec<gdist::SurfacePoint>> {
        indices
            .iter()
            .map(|&i| gdist::SurfacePoint::vertex(mesh, i as usize))
            .collect()
    };
    let sources = to_points(sources)?;
    let targets = to_points(targets)?;
    let mut engine =
        gdist::GeodesicAlgorithmExact::new(mesh).with_stop_policy(StopPolicy::ExhaustLimit);
    engine.propagate(&sources, config.effective_limit(), Some(targets.as_slice()))?;
    Ok(targets.iter().map(|t| engine.best_source(t).0).collect())
}

fn matrix_command(path: &Path, config: &GdistConfig, output: Option<&Path>) -> Result<()> {
    let (_, mesh) = load_mesh(path)?;

    let bar = ProgressBar::new(mesh.vertex_count() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} rows ({eta})")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );
    let progress_bar = bar.clone();
    let options = MatrixOptions {
        parallel: config.parallel_matrix,
        progress: None,
    }
    .with_progress(Arc::new(move |done, _| progress_bar.set_position(done as u64)));

    let start = Instant::now();
    let matrix = local_matrix_with(&mesh, config.effective_limit(), &options)?;
    bar.finish_and_clear();

    eprintln!(
        "{} {} entries for {} vertices in {:.2?}",
        "✓".green(),
        matrix.len().to_string().cyan(),
        mesh.vertex_count(),
        start.elapsed()
    );
    emit(&io::to_json(&matrix, config.pretty_json)?, output)
}

fn info_command(path: &Path) -> Result<()> {
    let (_, mesh) = load_mesh(path)?;

    println!("{} {}", "Mesh:".bold(), path.display().to_string().cyan());
    println!("  {:<22} {}", "Vertices:".bright_black(), mesh.vertex_count());
    println!("  {:<22} {}", "Faces:".bright_black(), mesh.face_count());
    println!("  {:<22} {}", "Edges:".bright_black(), mesh.edge_count());
    println!(
        "  {:<22} {}",
        "Boundary edges:".bright_black(),
        mesh.boundary_edge_count()
    );
    println!(
        "  {:<22} {}",
        "Saddle/boundary verts:".bright_black(),
        mesh.saddle_or_boundary_count()
    );
    println!("  {:<22} {:.6}", "Surface area:".bright_black(), mesh.surface_area());
    println!(
        "  {:<22} {:.6}",
        "Mean edge length:".bright_black(),
        mesh.mean_edge_length()
    );
    if mesh.boundary_edge_count() == 0 {
        println!("  {}", "closed surface".green());
    } else {
        println!("  {}", "open surface".yellow());
    }
    Ok(())
}

fn generate_command(shape: Shape, resolution: usize, size: f64, output: &Path) -> Result<()> {
    if size.is_nan() || size <= 0.0 {
        bail!("size must be positive, got {}", size);
    }
    let segments = u32::try_from(resolution).context("resolution too large")?;
    let primitive = match shape {
        Shape::Grid => Primitive::grid(resolution, resolution, size),
        Shape::Cube => Primitive::cube(size),
        Shape::Sphere => Primitive::sphere(size, segments),
        Shape::Cylinder => Primitive::cylinder(2.0 * size, size, segments),
    };
    let (vertices, triangles) = primitive.to_flat();
    let buffers = MeshBuffers {
        vertices,
        triangles,
    };
    std::fs::write(output, io::write_text(&buffers))
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!(
        "{} {} ({} vertices, {} triangles)",
        "Wrote".green(),
        output.display(),
        buffers.vertex_count(),
        buffers.triangle_count()
    );
    Ok(())
}

fn emit(json: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            println!("{}", json);
            Ok(())
        }
    }
}
