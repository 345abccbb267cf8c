use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use video2json::manifest::relativize_paths;
use video2json::{build_from_files, find_video_files, write_manifest, DirArgs, Result};

fn run(args: &DirArgs) -> Result<()> {
    let mut video_files = find_video_files(&args.video_dir)?;
    if video_files.is_empty() {
        info!("No video files found in {}", args.video_dir.display());
        return Ok(());
    }

    info!("Found {} video files:", video_files.len());
    for video in &video_files {
        info!("  - {}", video.display());
    }

    if args.relative_paths {
        video_files = relativize_paths(&video_files)?;
    }

    let entries = build_from_files(&video_files, &args.label);
    write_manifest(&args.output, &entries)?;

    info!("JSON file created: {}", args.output.display());
    info!(
        "Contains {} video entries with label: '{}'",
        entries.len(),
        args.label
    );
    Ok(())
}

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = DirArgs::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
