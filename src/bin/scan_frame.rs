//! scan_frame - locate the white target in one image and show the command

use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

use ball_chaser::{command_for, BoundaryLayout, ColorScanner, MotionCommand, Region, TargetDetector};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// PNG or JPEG image to scan.
    image: PathBuf,
    /// Slot labelling: legacy (left, right, middle) or spatial (left, middle, right).
    #[arg(long, default_value = "legacy", env = "BALL_CHASER_BOUNDARY_LAYOUT")]
    layout: BoundaryLayout,
    /// Print the result as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct ScanReport {
    image: String,
    width: u32,
    height: u32,
    layout: BoundaryLayout,
    /// Byte offset of the first target pixel.
    first_match: Option<usize>,
    region: Region,
    command: MotionCommand,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let frame = ball_chaser::ingest::decode_image(&args.image)?;
    let scanner = ColorScanner::with_layout(args.layout);
    let first_match = scanner.first_match(&frame)?;
    let region = scanner.try_scan(&frame)?;

    let report = ScanReport {
        image: args.image.display().to_string(),
        width: frame.width(),
        height: frame.height(),
        layout: args.layout,
        first_match,
        region,
        command: command_for(region),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{}: {}x{} region={} {}",
            report.image, report.width, report.height, report.region, report.command
        );
    }
    Ok(())
}
