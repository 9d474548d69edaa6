use std::{process::ExitCode, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};
use miette::GraphicalReportHandler;

use collage_cli::{Args, ErrorAdapter};

fn init_logging(level: &str) {
    let filter = LevelFilter::from_str(level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {level}. Using 'warn' instead.");
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(filter)
        .init();
}

fn main() -> ExitCode {
    miette::set_panic_hook();

    let args = Args::parse();
    init_logging(&args.log_level);

    info!(
        input = args.input,
        selected = args.select.len(),
        paste_target = args.target;
        "Starting Collage"
    );
    debug!(args:?; "Parsed arguments");

    match collage_cli::run(&args) {
        Ok(()) => {
            info!(output = args.output; "Completed successfully");
            ExitCode::SUCCESS
        }
        Err(err) => {
            let mut report = String::new();
            GraphicalReportHandler::new()
                .render_report(&mut report, &ErrorAdapter(&err))
                .expect("Writing to String buffer is infallible");

            error!("Failed\n{report}");
            ExitCode::FAILURE
        }
    }
}
