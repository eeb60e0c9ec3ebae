/// meshspin terminal demo - a mesh spinning about all three axes
///
/// Loads an OBJ file (or a built-in cube) once and draws it every frame.
/// Logs go to stderr; redirect them (`2>meshspin.log`) to keep the screen clean.
/// Controls:
///   - Q/ESC: Quit

use clap::Parser;
use meshspin_core::{Scene, Triangulation};
use meshspin_terminal::TerminalApp;
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Spin a triangle mesh in the terminal
#[derive(Parser, Debug)]
#[command(name = "meshspin-terminal")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// OBJ file to display; a cube is shown when omitted
    mesh: Option<PathBuf>,

    /// Frames per second, also the refresh rate driving the rotation
    #[arg(long, default_value_t = 30.0, value_parser = parse_fps)]
    fps: f32,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn parse_fps(value: &str) -> Result<f32, String> {
    let fps: f32 = value.parse().map_err(|e| format!("{}", e))?;
    if fps.is_finite() && fps > 0.0 {
        Ok(fps)
    } else {
        Err(format!("{} is not a positive frame rate", value))
    }
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let scene = match &args.mesh {
        Some(path) => Scene::load_or_empty(path),
        None => Scene::new(Triangulation::cube(2.0)),
    };
    info!(
        "Scene ready: {} unique points, {} triangles",
        scene.triangulation().point_count(),
        scene.triangulation().triangle_count()
    );

    let mut app = TerminalApp::new(scene, args.fps)?;
    app.run()
}
