//! Watch animation frames streaming from a flyover server.
//!
//! Usage:
//!   cargo run -p flyover-cli --bin watch_flights
//!   cargo run -p flyover-cli --bin watch_flights -- --launch
//!   cargo run -p flyover-cli --bin watch_flights -- --flight FLIGHT-0001

use anyhow::Result;
use clap::Parser;
use futures_util::StreamExt;
use reqwest::Url;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// Frame stream watcher
#[derive(Parser, Debug)]
#[command(author, version, about = "Stream animation frames from a flyover server")]
struct Args {
    /// Flyover server URL
    #[arg(long, default_value = "http://localhost:4000")]
    url: String,

    /// Only show frames for this flight
    #[arg(long)]
    flight: Option<String>,

    /// Launch a demo flight before watching
    #[arg(long, default_value_t = false)]
    launch: bool,

    /// Label for the launched flight
    #[arg(long, default_value = "Texas")]
    label: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = Args::parse();

    if args.launch {
        let client = reqwest::Client::new();
        let body = serde_json::json!({
            "origin": { "lon": -122.414, "lat": 37.776 },
            "destination": { "lon": -96.171851, "lat": 31.829513 },
            "label": args.label,
        });
        let resp = client
            .post(format!("{}/v1/flights", args.url))
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            anyhow::bail!("Failed to launch flight: {}", resp.status());
        }
        let json: serde_json::Value = resp.json().await?;
        let flight_id = json["flight_id"].as_str().unwrap_or_default().to_string();
        println!("[LAUNCH] ✓ {} with {} route points", flight_id, json["points"]);
        if args.flight.is_none() {
            args.flight = Some(flight_id);
        }
    }

    let url = build_ws_url(&args.url, "/v1/stream", args.flight.as_deref())?;
    println!("[STREAM] Connecting to {}", url);
    let (mut socket, _) = connect_async(url.as_str()).await?;
    println!("[STREAM] ✓ Connected\n");

    while let Some(msg) = socket.next().await {
        match msg? {
            Message::Text(text) => print_frame(&text),
            Message::Close(_) => {
                println!("\n[STREAM] Server closed the stream");
                break;
            }
            _ => {}
        }
    }

    Ok(())
}

fn build_ws_url(base: &str, path: &str, flight_id: Option<&str>) -> Result<Url> {
    let mut url = Url::parse(base)?;
    let scheme = match url.scheme() {
        "http" => "ws",
        "https" => "wss",
        other => other,
    }
    .to_string();

    url.set_scheme(&scheme)
        .map_err(|_| anyhow::anyhow!("Invalid base URL scheme"))?;
    url.set_path(path);
    if let Some(flight_id) = flight_id {
        url.query_pairs_mut().append_pair("flight_id", flight_id);
    }
    Ok(url)
}

/// One line per frame: flight, sequence number, command, salient detail.
fn print_frame(text: &str) {
    let frame: serde_json::Value = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(_) => {
            println!("{}", text);
            return;
        }
    };

    let command = &frame["command"];
    let kind = command["type"].as_str().unwrap_or("?");
    let detail = match kind {
        "SET_MARKER_POSITION" => format!(
            "{} → ({:.6}, {:.6})",
            command["marker"].as_str().unwrap_or("?"),
            command["position"]["lon"].as_f64().unwrap_or_default(),
            command["position"]["lat"].as_f64().unwrap_or_default(),
        ),
        "SET_MARKER_ROTATION" => format!(
            "{} {:.1} deg",
            command["marker"].as_str().unwrap_or("?"),
            command["degrees"].as_f64().unwrap_or_default(),
        ),
        "SET_MARKER_SCALE" => format!(
            "{} {:.2}",
            command["marker"].as_str().unwrap_or("?"),
            command["scale"].as_f64().unwrap_or_default(),
        ),
        "SET_MARKER_OFFSET" => format!("{}", command["marker"].as_str().unwrap_or("?")),
        "SET_LINE_GEOMETRY" => format!(
            "{}, {} points",
            command["line"].as_str().unwrap_or("?"),
            command["points"].as_array().map(|p| p.len()).unwrap_or(0),
        ),
        "FLY_CAMERA_TO" => format!(
            "→ ({:.6}, {:.6})",
            command["center"]["lon"].as_f64().unwrap_or_default(),
            command["center"]["lat"].as_f64().unwrap_or_default(),
        ),
        "ADD_ANNOTATION" => format!("{:?}", command["text"].as_str().unwrap_or("")),
        _ => String::new(),
    };

    println!(
        "[{}] #{:<4} {} {}",
        frame["flight_id"].as_str().unwrap_or("?"),
        frame["seq"],
        kind,
        detail
    );
}
