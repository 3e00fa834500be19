//! BeiDou Grid CLI - command-line interface
//!
//! This binary wraps the beidou-grid-rs library: encoding, decoding, child
//! enumeration and geometry range queries over grid codes.

use beidou_grid_rs::{
    child_codes_2d, child_codes_3d, code_level_2d, decode_2d, decode_3d, encode_2d, encode_3d,
    find_2d_codes, find_3d_codes, parse_geometry, BeiDouGridError, GeoPoint, GridCell, GridCell3D,
};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::process;

#[derive(Parser)]
#[command(name = "beidou-grid")]
#[command(about = "Encode, decode and query BeiDou grid location codes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode a point to a 2D grid code
    Encode2d {
        /// Longitude in decimal degrees
        lon: f64,
        /// Latitude in decimal degrees
        lat: f64,
        /// Refinement level (1-10)
        level: u8,
    },
    /// Decode a 2D grid code to its cell
    Decode2d {
        /// A 2D grid code, e.g. N50J475846B
        code: String,
    },
    /// Encode a point and height to a 3D grid code
    Encode3d {
        /// Longitude in decimal degrees
        lon: f64,
        /// Latitude in decimal degrees
        lat: f64,
        /// Ellipsoidal height in metres
        height: f64,
        /// Refinement level (1-10)
        level: u8,
    },
    /// Decode a 3D grid code to its cell and height slab
    Decode3d {
        /// A 3D grid code, e.g. N050J0047050
        code: String,
    },
    /// List the child codes of a 2D or 3D cell
    Children {
        /// A 2D or 3D grid code below level 10
        code: String,
    },
    /// Find all codes at a level whose cells intersect a geometry
    Intersect {
        /// Geometry as GeoJSON or WKT
        geometry: String,
        /// Refinement level (1-10)
        level: u8,
        /// Lower bound of the height band in metres (3D query)
        min_height: Option<f64>,
        /// Upper bound of the height band in metres (3D query)
        max_height: Option<f64>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(error) = run(cli.command) {
        eprintln!("Error: {}", error);
        process::exit(1);
    }
}

fn run(command: Command) -> Result<(), BeiDouGridError> {
    match command {
        Command::Encode2d { lon, lat, level } => {
            let point = GeoPoint::new_2d(lon, lat)?;
            println!("{}", encode_2d(&point, level)?);
        }
        Command::Decode2d { code } => {
            let corner = decode_2d(&code)?;
            let cell = GridCell::from_code(&code)?;
            println!("{}", json!({ "corner": corner, "cell": cell }));
        }
        Command::Encode3d {
            lon,
            lat,
            height,
            level,
        } => {
            let point = GeoPoint::new(lon, lat, height)?;
            println!("{}", encode_3d(&point, level)?);
        }
        Command::Decode3d { code } => {
            let corner = decode_3d(&code)?;
            let cell = GridCell3D::from_code(&code)?;
            println!("{}", json!({ "corner": corner, "cell": cell }));
        }
        Command::Children { code } => {
            let children = if code_level_2d(&code).is_ok() {
                child_codes_2d(&code)?
            } else {
                child_codes_3d(&code)?
            };
            let mut sorted: Vec<String> = children.into_iter().collect();
            sorted.sort();
            for child in sorted {
                println!("{}", child);
            }
        }
        Command::Intersect {
            geometry,
            level,
            min_height,
            max_height,
        } => {
            let geom = parse_geometry(&geometry)?;
            let codes = match (min_height, max_height) {
                (Some(min), Some(max)) => find_3d_codes(&geom, level, min, max)?,
                (None, None) => find_2d_codes(&geom, level)?,
                _ => {
                    return Err(BeiDouGridError::InvalidArgument(
                        "provide both min and max height, or neither".to_string(),
                    ))
                }
            };
            let mut sorted: Vec<String> = codes.into_iter().collect();
            sorted.sort();
            for code in sorted {
                println!("{}", code);
            }
        }
    }
    Ok(())
}
