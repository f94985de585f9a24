//! Export an arc route as GeoJSON.
//!
//! Usage:
//!   cargo run -p flyover-cli --bin export_arc
//!   cargo run -p flyover-cli --bin export_arc -- --output route.geojson

use clap::Parser;
use flyover_cli::parse_lon_lat;
use flyover_core::arc::ArcBuilder;
use flyover_core::geojson;
use std::path::PathBuf;

/// GeoJSON route exporter
#[derive(Parser, Debug)]
#[command(author, version, about = "Export a flyover arc route as GeoJSON")]
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

    /// Write to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let origin = parse_lon_lat(&args.origin)?;
    let destination = parse_lon_lat(&args.destination)?;
    let route = ArcBuilder::new(args.steps, args.curvature).build(origin, destination)?;
    let collection = geojson::route_collection(&route);
    let text = serde_json::to_string_pretty(&collection)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, text)?;
            eprintln!("Wrote {} route points to {}", route.len(), path.display());
        }
        None => println!("{}", text),
    }

    Ok(())
}
