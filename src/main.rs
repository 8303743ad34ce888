//! autoupload entry point

use std::process::ExitCode;

use clap::Parser as _;

use autoupload::cli::Args;

fn main() -> ExitCode {
    let args = Args::parse();
    autoupload::init_logging(args.log_level());

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: cannot start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(autoupload::app::run(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("Run failed: {:?}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
