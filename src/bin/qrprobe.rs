//! CLI: inspect a located QR symbol and print its structural report.
//!
//! The localization result (corners, version, codewords, decoded chunks)
//! comes from a JSON sidecar produced by the upstream decoder; the image is
//! optional and only needed for format information recovery.

use std::fs::File;
use std::io::BufReader;
use std::process::ExitCode;

use qrprobe::{config, inspect, inspect_symbol, LocatedSymbol, PixelBuffer};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: qrprobe <location.json> [image] [--json]";

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<(), String> {
    let mut json_output = false;
    let mut paths = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => json_output = true,
            "-h" | "--help" => {
                println!("{USAGE}");
                return Ok(());
            }
            _ => paths.push(arg),
        }
    }
    let (location_path, image_path) = match paths.as_slice() {
        [location] => (location.clone(), None),
        [location, image] => (location.clone(), Some(image.clone())),
        _ => return Err(USAGE.to_string()),
    };

    let file = File::open(&location_path)
        .map_err(|e| format!("cannot open {location_path}: {e}"))?;
    let symbol: LocatedSymbol = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| format!("cannot parse {location_path}: {e}"))?;

    let report = match image_path {
        Some(path) => {
            let img = image::open(&path).map_err(|e| format!("cannot open {path}: {e}"))?;
            let rgba = img.to_rgba8();
            let (width, height) = (rgba.width() as usize, rgba.height() as usize);
            let limit = config::max_image_dim();
            if width > limit || height > limit {
                return Err(format!("image {width}x{height} exceeds the {limit} pixel limit"));
            }
            let raw = rgba.into_raw();
            inspect(PixelBuffer::new(&raw, width, height), &symbol).map_err(|e| e.to_string())?
        }
        None => inspect_symbol(&symbol),
    };

    if json_output {
        let json =
            serde_json::to_string_pretty(&report).map_err(|e| format!("serialization: {e}"))?;
        println!("{json}");
    } else {
        print!("{report}");
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}
