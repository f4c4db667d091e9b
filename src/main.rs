mod cli;
mod command;
mod config;
mod driver;
mod format;
mod inputs;
mod output;
mod planner;

use std::{collections::HashSet, io, process};

use clap::Parser;
use log::{error, info};

use crate::{
    cli::Cli,
    command::locate_renderer,
    config::RunConfig,
    driver::{render_file, Dispatch, RenderOptions},
    format::HeatMapError,
    inputs::enumerate_files,
    output::resolve_output,
    planner::run_stamp,
};

fn main() {
    let cli = Cli::parse();

    // Initialise logger
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .format_timestamp(None)
        .init();

    match run(cli) {
        Ok(0) => {}
        Ok(_) => process::exit(2),
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    }
}

/// Returns the number of files that failed; fatal problems come back as `Err`
/// before any file is touched.
fn run(cli: Cli) -> Result<usize, HeatMapError> {
    // Taken once so every split directory of this run shares it.
    let stamp = run_stamp(&chrono::Local::now());

    let config = RunConfig::from_cli(&cli);
    let chunk_bytes = config.max_chunk_bytes()?;

    let files = enumerate_files(&cli.input);
    if files.is_empty() {
        return Err(HeatMapError::NoInputFiles(cli.input.display().to_string()));
    }

    let plan = resolve_output(cli.output.as_deref(), &cli.input, chunk_bytes.is_some())?;
    let renderer = locate_renderer(cli.app_path.as_deref());

    let opts = RenderOptions {
        renderer: &renderer,
        config: &config,
        plan: &plan,
        chunk_bytes,
        stamp: &stamp,
        dispatch: if cli.execute {
            Dispatch::Execute
        } else {
            Dispatch::Print
        },
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut total_files = 0usize;
    let mut total_images = 0usize;
    let mut errors = 0usize;
    let mut claimed = HashSet::new();

    for path in &files {
        match render_file(path, &opts, &mut claimed, &mut out) {
            Ok(n) => {
                total_files += 1;
                total_images += n;
            }
            Err(e) => {
                error!("{}: {e}", path.display());
                errors += 1;
            }
        }
    }

    info!(
        "Done. {} file(s) processed, {} image(s) {}, {} error(s).",
        total_files,
        total_images,
        if cli.execute { "rendered" } else { "planned" },
        errors
    );

    Ok(errors)
}
