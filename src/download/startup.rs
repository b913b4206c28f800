//! Startup sequence: checks first, side effects after.
//!
//! Nothing is created on disk until the input file exists and the proxy
//! answered. Only then are the general log, the output tree and the ledger
//! opened.

use crate::api::{probe_proxy, InstagramApi, SessionConfig};
use crate::config::Config;
use crate::dedup::DownloadLedger;
use crate::download::runner::RunContext;
use crate::error::Result;
use crate::fs::Organizer;
use crate::logging::LogSystem;
use crate::output::{create_spinner, print_info, print_success, print_warning};
use crate::source::UrlSource;

/// A run ready to start.
pub struct Startup {
    pub source: UrlSource,
    pub ctx: RunContext<InstagramApi>,
}

/// Check the input and the proxy, then open the log file, the output tree and
/// the ledger.
pub async fn bootstrap(config: &Config, logs: &mut LogSystem) -> Result<Startup> {
    let source = UrlSource::open(&config.input.file)?;
    print_info(&format!(
        "Found {} references in {}",
        source.count()?,
        source.path().display()
    ));

    if let Some(proxy) = &config.network.proxy {
        if config.network.skip_proxy_test {
            print_warning("Skipping proxy connectivity test");
        } else {
            let spinner = create_spinner("Testing proxy connection...");
            let check = probe_proxy(
                proxy,
                config.network.verify_ssl,
                &config.network.user_agent,
            )
            .await;
            spinner.finish_and_clear();
            check?;
            print_success("Proxy connection OK");
        }
    }

    let log_file = logs.attach_file(&config.output.logs_directory)?;
    tracing::info!("Logging to {}", log_file.display());

    let session = SessionConfig::build(&config.network);
    if !session.is_authenticated() {
        print_warning("No session cookie loaded; private posts will fail");
    }
    let fetcher = InstagramApi::new(&session)?;

    let organizer = Organizer::new(&config.output.directory);
    organizer.prepare().await?;

    let mut ledger = DownloadLedger::open(config.ledger_file())?;
    tracing::info!(
        "Ledger {} lists {} downloaded posts",
        ledger.path().display(),
        ledger.len()
    );

    if config.options.scan_existing {
        let found = organizer.scan_existing()?;
        let added = ledger.seed(found);
        tracing::info!("Found {} additional posts already in the output tree", added);
    }

    Ok(Startup {
        source,
        ctx: RunContext {
            fetcher,
            organizer,
            ledger,
            delay: config.delay(),
        },
    })
}
