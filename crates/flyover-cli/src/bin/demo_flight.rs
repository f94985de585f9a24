//! Arc flight demo - plays the whole animation against a console map.
//!
//! Every surface command the player emits is printed as one line, so the
//! run can be watched (and piped) without a map renderer:
//!
//! 1. STAGE: endpoint markers, route line, camera flight to the origin
//! 2. FLY: the aircraft marker walks the arc while the camera follows
//! 3. LAND: the landing pin drops and settles onto the destination
//! 4. ANNOTATE: the destination label is revealed
//!
//! Usage:
//!   cargo run -p flyover-cli --bin demo_flight
//!   cargo run -p flyover-cli --bin demo_flight -- --steps 40 --settle-ms 10

use clap::Parser;
use flyover_cli::parse_lon_lat;
use flyover_core::animator::{AnimatorConfig, PathAnimator};
use flyover_core::arc::ArcBuilder;
use flyover_core::geo::Coordinate;
use flyover_core::surface::{AnnotationOptions, CameraOptions};
use flyover_player::{CameraTransit, MapSurface, Player, SurfaceError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Arc flight demo
#[derive(Parser, Debug)]
#[command(author, version, about = "Flyover demo: arc flight on a console map surface")]
struct Args {
    /// Origin as "lon,lat"
    #[arg(long, default_value = "-122.414,37.776")]
    origin: String,

    /// Destination as "lon,lat"
    #[arg(long, default_value = "-96.171851,31.829513")]
    destination: String,

    /// Interpolation steps along the arc
    #[arg(long, default_value_t = 150)]
    steps: usize,

    /// Sideways bend of the arc, as a fraction of the route span
    #[arg(long, default_value_t = 1.0)]
    curvature: f64,

    /// Label revealed at the destination
    #[arg(long, default_value = "Texas")]
    label: String,

    /// Camera settle time per move, in milliseconds
    #[arg(long, default_value_t = 40)]
    settle_ms: u64,
}

/// Map surface that prints every command to stdout.
struct ConsoleSurface {
    camera_settle: Duration,
    torn_down: AtomicBool,
}

impl ConsoleSurface {
    fn new(camera_settle: Duration) -> Self {
        Self {
            camera_settle,
            torn_down: AtomicBool::new(false),
        }
    }

    fn guard(&self) -> Result<(), SurfaceError> {
        if self.torn_down.load(Ordering::SeqCst) {
            Err(SurfaceError::TornDown)
        } else {
            Ok(())
        }
    }
}

impl MapSurface for ConsoleSurface {
    fn set_marker_position(&self, marker: &str, position: Coordinate) -> Result<(), SurfaceError> {
        self.guard()?;
        println!("[MAP] {} → {}", marker, position);
        Ok(())
    }

    fn set_marker_rotation(&self, marker: &str, degrees: f64) -> Result<(), SurfaceError> {
        self.guard()?;
        println!("[MAP] {} rotation {:.1} deg", marker, degrees);
        Ok(())
    }

    fn set_marker_scale(&self, marker: &str, scale: f64) -> Result<(), SurfaceError> {
        self.guard()?;
        println!("[MAP] {} scale {:.2}", marker, scale);
        Ok(())
    }

    fn set_marker_offset(&self, marker: &str, offset_px: (f64, f64)) -> Result<(), SurfaceError> {
        self.guard()?;
        println!(
            "[MAP] {} offset ({:.1}, {:.1}) px",
            marker, offset_px.0, offset_px.1
        );
        Ok(())
    }

    fn set_line_geometry(&self, line: &str, points: &[Coordinate]) -> Result<(), SurfaceError> {
        self.guard()?;
        println!("[MAP] {} line, {} points", line, points.len());
        Ok(())
    }

    fn fly_camera_to(
        &self,
        center: Coordinate,
        options: CameraOptions,
    ) -> Result<CameraTransit, SurfaceError> {
        self.guard()?;
        println!("[MAP] camera → {} at speed {:.1}", center, options.speed);
        Ok(CameraTransit::settle_after(self.camera_settle))
    }

    fn add_annotation(
        &self,
        position: Coordinate,
        text: &str,
        options: AnnotationOptions,
    ) -> Result<(), SurfaceError> {
        self.guard()?;
        println!(
            "[MAP] \"{}\" revealed at {} ({} ms per character)",
            text, position, options.reveal_stagger_ms
        );
        Ok(())
    }

    fn teardown(&self) {
        if !self.torn_down.swap(true, Ordering::SeqCst) {
            println!("[MAP] scene torn down");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║    FLYOVER: ARC FLIGHT DEMO                                   ║");
    println!("║    Stage → Fly → Land → Annotate                              ║");
    println!("╚═══════════════════════════════════════════════════════════════╝");
    println!();

    let origin = parse_lon_lat(&args.origin)?;
    let destination = parse_lon_lat(&args.destination)?;

    let route = ArcBuilder::new(args.steps, args.curvature).build(origin, destination)?;
    println!(
        "[ROUTE] {} points | {:.0} km | {} → {}",
        route.len(),
        route.distance_m() / 1000.0,
        origin,
        destination
    );
    println!(
        "[PLAY] Camera settles in {} ms per move, label {:?}\n",
        args.settle_ms, args.label
    );

    let mut config = AnimatorConfig::default();
    config.destination_label = Some(args.label);
    let animator = PathAnimator::with_config(route, config);
    let surface = Arc::new(ConsoleSurface::new(Duration::from_millis(args.settle_ms)));
    let player = Player::new(surface, animator);

    let report = player.play_to_end().await?;

    println!();
    println!("╔═══════════════════════════════════════════════════════════════╗");
    println!("║  DEMO COMPLETE - {} frames | {:?}", report.frames, report.outcome);
    println!("╚═══════════════════════════════════════════════════════════════╝");

    Ok(())
}
