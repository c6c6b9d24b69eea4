//! sdfgrid CLI - clearance, sweep, and probe queries over baked shapes

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use glam::{Mat4, Quat, Vec3};
use sdfgrid_engine::{Aabb, Clearance, RawVolumeExporter, Session};
use sdfgrid_shapes::prelude::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "sdfgrid")]
#[command(about = "Voxel signed distance field clearance checks", long_about = None)]
#[command(version)]
struct Cli {
    /// Engine configuration (JSON); defaults are used if the file does not exist
    #[arg(short, long, default_value = "sdfgrid.json")]
    config: PathBuf,

    /// Voxel edge length shared by every baked grid
    #[arg(long, default_value = "0.05")]
    voxel_size: f32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check clearance between two cubes separated by a gap
    Clearance {
        /// Gap between the cubes' faces (negative overlaps them)
        #[arg(short, long, default_value = "0.5")]
        gap: f32,

        /// Cube edge length
        #[arg(short, long, default_value = "1.0")]
        size: f32,
    },

    /// Swing an arm around a pivot and check it against a post
    Sweep {
        /// Number of poses along the swing
        #[arg(short, long, default_value = "16")]
        steps: u32,

        /// Total swing angle in degrees
        #[arg(short, long, default_value = "90")]
        angle: f32,

        /// Carve a hole of this radius through the post where the arm passes
        #[arg(long)]
        hole: Option<f32>,

        /// Write the swept volume as a raw f32 volume
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Sample distance and gradient of a torus at a point
    Probe {
        #[arg(default_value = "1.0")]
        x: f32,
        #[arg(default_value = "0.0")]
        y: f32,
        #[arg(default_value = "0.0")]
        z: f32,

        /// Move the torus by this offset before probing
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"])]
        offset: Option<Vec<f32>>,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so summaries on stdout stay clean
    let stderr_layer = fmt::layer().with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    if cli.voxel_size <= 0.0 || !cli.voxel_size.is_finite() {
        bail!("--voxel-size must be positive, got {}", cli.voxel_size);
    }

    let mut session = Session::from_config_file(&cli.config)?;
    info!(config = %cli.config.display(), "session ready");

    match cli.command {
        Commands::Clearance { gap, size } => {
            run_clearance(&mut session, cli.voxel_size, gap, size)?;
        }
        Commands::Sweep {
            steps,
            angle,
            hole,
            output,
        } => {
            run_sweep(
                &mut session,
                cli.voxel_size,
                steps,
                angle,
                hole,
                output.as_deref(),
            )?;
        }
        Commands::Probe { x, y, z, offset } => {
            let offset = offset.map_or(Vec3::ZERO, |o| Vec3::from_slice(&o));
            run_probe(&mut session, cli.voxel_size, Vec3::new(x, y, z), offset)?;
        }
    }

    let released = session.shutdown();
    info!(released, "session closed");
    Ok(())
}

/// Bake posed shapes into `name` so that the grid's voxel edge is exactly `voxel_size`.
///
/// The longest axis of the padded bounds is stretched to a whole number of voxels,
/// which keeps separately baked grids combinable.
fn bake(
    session: &mut Session,
    name: &str,
    sources: &[(SdfNode, Mat4)],
    voxel_size: f32,
) -> Result<()> {
    let padded = posed_bounds(sources)
        .context("nothing to bake")?
        .expand(2.0 * voxel_size);
    let size = padded.size();
    let resolution = (size.max_element() / voxel_size).ceil().max(1.0) as u32;

    let axis = if size.x >= size.y && size.x >= size.z {
        0
    } else if size.y >= size.z {
        1
    } else {
        2
    };
    let mut max = padded.max;
    max[axis] = padded.min[axis] + resolution as f32 * voxel_size;
    let bounds = Aabb::new(padded.min, max);

    session.bake(name, &ShapeBaker::default(), sources, resolution, bounds)
}

fn print_clearance(a: &str, b: &str, report: &Clearance) {
    match report {
        Clearance::Separated => println!("{a} / {b}: separated (bounds disjoint)"),
        Clearance::Clear { overlap } => println!(
            "{a} / {b}: clear (bounds overlap over {:.3} x {:.3} x {:.3})",
            overlap.size().x,
            overlap.size().y,
            overlap.size().z
        ),
        Clearance::Colliding { voxels, volume } => {
            println!("{a} / {b}: COLLIDING ({voxels} voxels, ~{volume:.4} units^3)");
        }
    }
}

fn run_clearance(session: &mut Session, voxel_size: f32, gap: f32, size: f32) -> Result<()> {
    if size <= 0.0 || !size.is_finite() {
        bail!("cube size must be positive, got {size}");
    }

    let offset = size + gap;
    bake(session, "left", &[(cube(size).into_node(), Mat4::IDENTITY)], voxel_size)?;
    bake(
        session,
        "right",
        &[(
            cube(size).into_node(),
            Mat4::from_translation(Vec3::new(offset, 0.0, 0.0)),
        )],
        voxel_size,
    )?;

    let report = session.clearance("left", "right")?;
    print_clearance("left", "right", &report);
    Ok(())
}

fn run_sweep(
    session: &mut Session,
    voxel_size: f32,
    steps: u32,
    angle: f32,
    hole: Option<f32>,
    output: Option<&Path>,
) -> Result<()> {
    if steps == 0 {
        bail!("sweep needs at least one step");
    }

    // Arm along +X from the origin with a gripper ball at its tip, swinging about Z
    // towards +Y
    let arm = capsule(0.1, 1.6)
        .rotate_z(-std::f32::consts::FRAC_PI_2)
        .translate_x(1.0)
        .union(sphere(0.2).translate_x(1.9));
    bake(session, "arm", &[(arm, Mat4::IDENTITY)], voxel_size)?;

    // Post halfway through the swing, 1.2 units from the pivot
    let half = (angle * 0.5).to_radians();
    let post_center = Quat::from_rotation_z(half) * Vec3::new(1.2, 0.0, 0.0);
    bake(
        session,
        "post",
        &[(
            cylinder(0.15, 1.0).rotate_x(std::f32::consts::FRAC_PI_2),
            Mat4::from_translation(post_center),
        )],
        voxel_size,
    )?;

    if let Some(radius) = hole {
        session.subtract_sphere("post", post_center, radius)?;
    }

    let poses: Vec<Mat4> = (0..=steps)
        .map(|i| Mat4::from_rotation_z((angle * i as f32 / steps as f32).to_radians()))
        .collect();
    session.sweep("arm", &poses, "arm_swept")?;

    let report = session.clearance("arm_swept", "post")?;
    print_clearance("arm_swept", "post", &report);

    if let Some(path) = output {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut exporter = RawVolumeExporter::new(BufWriter::new(file));
        session.export("arm_swept", &mut exporter)?;
        let params = session.render_params("arm_swept")?;
        println!(
            "wrote {} ({:?} voxels of {})",
            path.display(),
            params.dimensions,
            params.voxel_size
        );
    }
    Ok(())
}

fn run_probe(session: &mut Session, voxel_size: f32, point: Vec3, offset: Vec3) -> Result<()> {
    bake(
        session,
        "torus",
        &[(torus(1.0, 0.25).into_node(), Mat4::IDENTITY)],
        voxel_size,
    )?;
    if offset != Vec3::ZERO {
        session.set_pose("torus", Mat4::from_translation(offset))?;
    }

    let distance = session.distance("torus", point)?;
    println!("distance at {point}: {distance:.4}");
    match session.gradient("torus", point) {
        Ok(n) => println!("gradient at {point}: {n}"),
        Err(e) => println!("gradient at {point}: undefined ({e})"),
    }
    Ok(())
}
