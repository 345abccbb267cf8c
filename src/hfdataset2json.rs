use log::{error, info};
use std::path::Path;
use std::process::ExitCode;

use video2json::{
    build_from_records, label_distribution, load_dataset, relabel_manifest_file, select_split,
    write_manifest, DatasetArgs, ManifestError, Result,
};

const PREVIEW_ENTRIES: usize = 3;

fn run(args: &DatasetArgs) -> Result<()> {
    if let Some(new_label) = args.change_label.as_deref().filter(|l| !l.is_empty()) {
        if args.output.exists() {
            relabel_manifest_file(&args.output, new_label)?;
            return Ok(());
        }
    }

    let database = args.database.as_deref().ok_or_else(|| {
        ManifestError::MissingArgument(
            "--database is required when not using --change_label on an existing file".to_string(),
        )
    })?;

    let request = args.to_load_request(database);
    if let Some(subset) = &request.subset {
        info!("Using subset: {}", subset);
    }
    if !args.streaming {
        info!("Streaming mode is always on so videos resolve to their remote location");
    }

    let dataset = load_dataset(&request)?;
    info!("Dataset loaded successfully!");
    let split_names = dataset.split_names();
    if !split_names.is_empty() {
        info!("Available splits: {:?}", split_names);
    }

    let mut options = args.to_build_options();
    if Path::new(database).exists() {
        // Bare file names of a local dataset have no hub location
        options.dataset_id = None;
    }

    let split = select_split(dataset, &args.split)?;
    let (entries, stats) = build_from_records(split, &options)?;
    stats.print_summary();
    if entries.is_empty() {
        return Err(ManifestError::EmptyManifest);
    }

    info!("Extracted {} video entries", entries.len());
    info!("First few entries:");
    for (i, entry) in entries.iter().take(PREVIEW_ENTRIES).enumerate() {
        info!("  {}. Video: {}", i + 1, entry.video);
        info!("     Label: {}", entry.label);
    }

    write_manifest(&args.output, &entries)?;
    info!("JSON file created: {}", args.output.display());
    info!("Contains {} video entries", entries.len());

    let distribution = label_distribution(&entries);
    if distribution.len() > 1 {
        info!("Label distribution:");
        for (label, count) in distribution {
            info!("  {}: {} videos", label, count);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = DatasetArgs::parse_normalized();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
