//! Instagram Downloader - CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use instagram_downloader::{
    cli::Args,
    config::{validate_config, Config},
    download::{bootstrap, Runner},
    error::{exit_codes, Result},
    logging::LogSystem,
    output::{
        log_run_summary, print_banner, print_config_summary, print_error, print_run_summary,
    },
};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let mut logs = match LogSystem::init(args.debug) {
        Ok(logs) => logs,
        Err(e) => {
            print_error(&format!("{}", e));
            return ExitCode::from(e.exit_code() as u8);
        }
    };

    let code = match run(args, &mut logs).await {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            if logs.log_file().is_some() {
                tracing::error!("Run aborted: {}", e);
            }
            print_error(&format!("{}", e));
            e.exit_code()
        }
    };

    // Flush the log file before exiting
    drop(logs);
    ExitCode::from(code as u8)
}

async fn run(args: Args, logs: &mut LogSystem) -> Result<()> {
    print_banner();

    // Load configuration
    let mut config = Config::load_or_default(&args.config)?;
    args.merge_into_config(&mut config);
    validate_config(&config)?;

    print_config_summary(&config);

    let startup = bootstrap(&config, logs).await?;
    let stats = Runner::new(startup.ctx).run(&startup.source).await?;

    print_run_summary(&stats);
    log_run_summary(&stats);

    Ok(())
}
