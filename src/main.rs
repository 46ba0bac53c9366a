use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use log::{error, info, warn};
use rsubbrute::input::{load_wordlist, Opts, OutputFormat};
use rsubbrute::logger;
use rsubbrute::output::{print_summary, ConsoleReporter};
use rsubbrute::{BruteError, SubdomainBruteConfig, SubdomainBruteEngine};

#[tokio::main]
async fn main() -> ExitCode {
    let opts = Opts::parse();
    logger::init_logger(logger::level_for(opts.verbose, opts.silent));

    tokio::select! {
        result = run_subdomain_brute(opts) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("{}", e);
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted, abandoning outstanding lookups");
            ExitCode::from(130)
        }
    }
}

/// 执行域名暴破主逻辑
async fn run_subdomain_brute(opts: Opts) -> Result<(), BruteError> {
    let format = opts
        .format
        .parse::<OutputFormat>()
        .map_err(BruteError::InvalidConfig)?;
    let timeout = Duration::try_from_secs_f64(opts.timeout)
        .map_err(|e| BruteError::InvalidConfig(format!("invalid timeout {}: {}", opts.timeout, e)))?;

    let config = SubdomainBruteConfig {
        domain: opts.domain.clone(),
        resolver: opts.resolver.clone(),
        timeout,
        concurrency: opts.concurrency,
        wildcard_test_count: opts.wildcard_tests,
        random_label_length: opts.label_length,
        skip_wildcard: !opts.no_wildcard_check,
    };

    let words = load_wordlist(&opts.file)?;
    info!("loaded {} labels from {}", words.len(), opts.file.display());

    let engine = SubdomainBruteEngine::new(config).await?;

    let wildcard = engine.detect_wildcard().await;
    if wildcard.is_wildcard() {
        warn!(
            "{} answers random subdomains with {:?}, matching results are flagged as wildcard",
            engine.domain(),
            wildcard.confirmed()
        );
    }

    let reporter = Arc::new(ConsoleReporter::new(format, opts.verbose, opts.silent));
    let summary = engine.run_brute_force(words, wildcard.clone(), reporter).await?;

    if opts.summary {
        print_summary(engine.domain(), &summary, &wildcard, format);
    } else {
        info!(
            "done: {} found, {} wildcard, {} not found, {} errors in {:.2?}",
            summary.found, summary.wildcard, summary.not_found, summary.errors, summary.elapsed
        );
    }
    Ok(())
}
