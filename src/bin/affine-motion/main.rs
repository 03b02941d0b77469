//! affine-motion CLI - mesh editing and affine interpolation.
//!
//! Usage: affine-motion <COMMAND> [OPTIONS] <INPUT> ...
//!
//! Run `affine-motion --help` for available commands. Set `RUST_LOG=debug`
//! for per-step logging.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};

use affine_motion::io;
use affine_motion::mesh::Mesh;
use affine_motion::motion::{AffineMotion, Command, CommandOutcome, MotionOptions};
use affine_motion::progress::Progress;

#[derive(Parser)]
#[command(name = "affine-motion")]
#[command(author, version, about = "Mesh editing and affine motion CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information
    Info {
        /// Input mesh file (.off or .obj)
        input: PathBuf,
    },

    /// Split every face at its centroid
    Refine {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file (.obj)
        output: PathBuf,

        /// Number of refinement passes
        #[arg(short, long, default_value = "1")]
        iterations: usize,

        /// Also flip long edges after each pass
        #[arg(long)]
        flip: bool,
    },

    /// Flip edges that fail the opposite-angle test
    Flip {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file (.obj)
        output: PathBuf,

        /// Maximum number of passes (stops early when nothing flips)
        #[arg(short, long, default_value = "10")]
        passes: usize,
    },

    /// Evaluate the mesh at one point of the motion
    Interpolate {
        /// Input mesh file
        mesh: PathBuf,

        /// End pose: 16 row-major values
        matrix: PathBuf,

        /// Output mesh file (.obj)
        output: PathBuf,

        /// Interpolation parameter, 0 is the identity and 1 the end pose
        #[arg(short, long, default_value = "0.5")]
        t: f64,
    },

    /// Write the whole motion as numbered OBJ frames
    Animate {
        /// Input mesh file
        mesh: PathBuf,

        /// End pose: 16 row-major values
        matrix: PathBuf,

        /// Output directory
        output: PathBuf,

        /// Number of steps from the identity to the end pose
        #[arg(short, long, default_value = "100")]
        steps: usize,

        /// Write every n-th frame (the last frame is always written)
        #[arg(short, long, default_value = "1")]
        every: usize,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },

    /// Drive the motion with viewer keys read from stdin
    Play {
        /// Input mesh file
        mesh: PathBuf,

        /// End pose: 16 row-major values
        matrix: PathBuf,

        /// Number of steps from the identity to the end pose
        #[arg(short, long, default_value = "100")]
        steps: usize,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input } => {
            cmd_info(&input)?;
        }

        Commands::Refine {
            input,
            output,
            iterations,
            flip,
        } => {
            cmd_refine(&input, &output, iterations, flip)?;
        }

        Commands::Flip {
            input,
            output,
            passes,
        } => {
            cmd_flip(&input, &output, passes)?;
        }

        Commands::Interpolate {
            mesh,
            matrix,
            output,
            t,
        } => {
            cmd_interpolate(&mesh, &matrix, &output, t)?;
        }

        Commands::Animate {
            mesh,
            matrix,
            output,
            steps,
            every,
            sequential,
        } => {
            cmd_animate(&mesh, &matrix, &output, steps, every, sequential)?;
        }

        Commands::Play {
            mesh,
            matrix,
            steps,
        } => {
            cmd_play(&mesh, &matrix, steps)?;
        }
    }

    Ok(())
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0));

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let raw_percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        // Only ever move forward, so consecutive passes do not bounce the bar.
        let previous = max_percent.fetch_max(raw_percent, Ordering::Relaxed);
        let percent = previous.max(raw_percent);
        if percent == previous && percent != 100 {
            return;
        }

        let bar_width = 30;
        let filled = (percent * bar_width) / 100;
        let bar = "=".repeat(filled);
        let space = " ".repeat(bar_width - filled);

        eprint!("\r[{}{}] {:3}% {}", bar, space, percent, message);
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
            max_percent.store(0, Ordering::Relaxed);
        }
    })
}

fn print_summary(label: &str, mesh: &Mesh) {
    println!(
        "{}: {} nodes, {} faces, {} edges",
        label,
        mesh.num_active_nodes(),
        mesh.num_active_faces(),
        mesh.num_active_edges()
    );
}

fn cmd_info(input: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh = io::load(input)?;
    mesh.update_bounds();

    println!("File: {}", input.display());
    println!("Nodes: {}", mesh.num_active_nodes());
    println!("Faces: {}", mesh.num_active_faces());
    println!("Edges: {}", mesh.num_active_edges());

    let mut min_area = f64::MAX;
    let mut max_area = 0.0_f64;
    for f in mesh.active_face_ids() {
        let area = mesh.face_area(f);
        min_area = min_area.min(area);
        max_area = max_area.max(area);
    }

    println!("Surface area: {:.6}", mesh.surface_area());
    if mesh.num_active_faces() > 0 {
        println!("Face area range: [{:.6}, {:.6}]", min_area, max_area);
    }

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
        let c = mesh.center();
        println!(
            "Bounding sphere: center ({:.3}, {:.3}, {:.3}), radius {:.3}",
            c.x,
            c.y,
            c.z,
            mesh.radius()
        );
    }

    let boundary = mesh.num_boundary_edges();
    if boundary == 0 {
        println!("Topology: Closed (no boundary)");
    } else {
        println!("Topology: Open ({} boundary edges)", boundary);
    }
    println!("Adjacency: {}", if mesh.is_valid() { "consistent" } else { "INCONSISTENT" });

    Ok(())
}

fn cmd_refine(
    input: &PathBuf,
    output: &PathBuf,
    iterations: usize,
    flip: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh = io::load(input)?;
    print_summary("Loaded", &mesh);

    let progress = create_progress();
    let start = Instant::now();
    for i in 0..iterations {
        println!("Refinement pass {}/{}...", i + 1, iterations);
        mesh.refine_all_with_progress(&progress)?;
        if flip {
            let flipped = mesh.flip_pass_with_progress(&progress)?;
            println!("Flipped {} edges", flipped);
        }
    }
    let elapsed = start.elapsed();

    print_summary("Result", &mesh);
    io::save(&mesh, output)?;
    println!("Saved: {} ({:.2?})", output.display(), elapsed);

    Ok(())
}

fn cmd_flip(
    input: &PathBuf,
    output: &PathBuf,
    passes: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh = io::load(input)?;
    print_summary("Loaded", &mesh);

    let progress = create_progress();
    let start = Instant::now();
    let mut total = 0;
    for i in 0..passes {
        let flipped = mesh.flip_pass_with_progress(&progress)?;
        println!("Pass {}: flipped {} edges", i + 1, flipped);
        total += flipped;
        if flipped == 0 {
            break;
        }
    }
    let elapsed = start.elapsed();

    println!("Flipped {} edges in total", total);
    io::save(&mesh, output)?;
    println!("Saved: {} ({:.2?})", output.display(), elapsed);

    Ok(())
}

fn load_motion(
    mesh: &PathBuf,
    matrix: &PathBuf,
    options: MotionOptions,
) -> Result<AffineMotion, Box<dyn std::error::Error>> {
    let mut motion = AffineMotion::new(options)?;
    motion.load_mesh(mesh)?;
    motion.load_affinity_matrix(matrix)?;

    if let Some(source) = motion.source() {
        print_summary("Loaded", source);
    }
    if let Some((start, end)) = motion.path_endpoints() {
        println!(
            "Path: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            start.x, start.y, start.z, end.x, end.y, end.z
        );
    }
    Ok(motion)
}

fn cmd_interpolate(
    mesh: &PathBuf,
    matrix: &PathBuf,
    output: &PathBuf,
    t: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    if !t.is_finite() {
        return Err(format!("t must be finite, got {}", t).into());
    }

    let mut motion = load_motion(mesh, matrix, MotionOptions::default())?;
    motion.evaluate_at(t)?;

    let at = motion.current_transform();
    println!("Transform at t = {}:{}", t, at.transpose());

    if let Some(current) = motion.current() {
        io::save(current, output)?;
    }
    println!("Saved: {}", output.display());

    Ok(())
}

fn cmd_animate(
    mesh: &PathBuf,
    matrix: &PathBuf,
    output: &PathBuf,
    steps: usize,
    every: usize,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = MotionOptions::new(steps).with_parallel(!sequential);
    let mut motion = load_motion(mesh, matrix, options)?;

    let mode = if sequential { "sequential" } else { "parallel" };
    println!("Animating over {} steps ({})...", steps, mode);

    let progress = create_progress();
    let start = Instant::now();
    let frames = motion.export_frames_with_progress(output, every, &progress)?;
    let elapsed = start.elapsed();

    println!("Wrote {} frames to {} ({:.2?})", frames.len(), output.display(), elapsed);

    Ok(())
}

fn cmd_play(
    mesh: &PathBuf,
    matrix: &PathBuf,
    steps: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut motion = load_motion(mesh, matrix, MotionOptions::new(steps))?;
    println!("Keys: space/n advance, r reset, w/s/l/i toggle display, q quit");

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        for key in line.chars() {
            if key == 'q' {
                return Ok(());
            }
            let Some(command) = Command::from_key(key) else {
                continue;
            };

            match motion.handle_command(command)? {
                CommandOutcome::Stepped { step, t } => {
                    let area = motion.current().map(|m| m.surface_area()).unwrap_or(0.0);
                    println!("step {:4}  t = {:.4}  area = {:.6}", step, t, area);
                }
                CommandOutcome::Finished => println!("end of motion"),
                CommandOutcome::Display(display) => println!("{:?}", display),
                CommandOutcome::Redraw => {}
            }
        }
        motion.handle_command(Command::Redraw)?;
    }

    Ok(())
}
