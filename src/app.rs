//! One run from start to finish: validate the root, resolve the
//! configuration, open the report destination, walk and inspect, then
//! print the count.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::authenticode::CertificateService;
use crate::cli::Cli;
use crate::config::{default_config_path, Config};
use crate::discovery::DiscoveryOptions;
use crate::error::{Result, SigInspectError};
use crate::inspect::{Inspector, Interrupted, RunSummary};
use crate::report::Reporter;

/// Fail with a usage error unless `root` exists.
///
/// A root that exists but cannot be examined is let through so discovery
/// reports it as an access failure.
pub fn check_root(root: &Path) -> Result<()> {
    match root.try_exists() {
        Ok(false) => Err(SigInspectError::PathNotFound(root.to_path_buf())),
        Ok(true) => Ok(()),
        Err(err) => {
            debug!(path = %root.display(), error = %err, "Cannot tell whether root exists");
            Ok(())
        }
    }
}

pub fn config_path(cli: &Cli) -> PathBuf {
    cli.config.clone().unwrap_or_else(default_config_path)
}

/// Run with an already parsed command line.
pub fn run<S, C>(cli: &Cli, service: S, console: C) -> Result<RunSummary>
where
    S: CertificateService,
    C: Write,
{
    check_root(&cli.path)?;
    let config = Config::resolve(&cli.overrides(), &config_path(cli))?;
    run_with_config(&cli.path, &config, service, console)
}

pub fn run_with_config<S, C>(
    root: &Path,
    config: &Config,
    service: S,
    console: C,
) -> Result<RunSummary>
where
    S: CertificateService,
    C: Write,
{
    let mut reporter = Reporter::new(config, console).map_err(|source| SigInspectError::Output {
        path: config.output.clone().unwrap_or_default(),
        source,
    })?;

    let paths = DiscoveryOptions {
        recursive: config.recursive,
        binaries_only: config.binaries_only,
    }
    .walk(root);
    info!(root = %root.display(), recursive = config.recursive, "Inspecting");

    let inspector = Inspector::new(service);
    match inspector.run(paths, &mut reporter) {
        Ok(summary) => {
            let closed = reporter.close();
            reporter.finish(summary.count)?;
            closed.map_err(|source| SigInspectError::Output {
                path: config.output.clone().unwrap_or_default(),
                source,
            })?;
            Ok(summary)
        }
        Err(Interrupted { summary, source }) => {
            let err = match reporter.output_path() {
                Some(path) => SigInspectError::Output {
                    path: path.to_path_buf(),
                    source,
                },
                None => SigInspectError::Io(source),
            };
            if let Err(close_err) = reporter.close() {
                crate::log_error!(close_err, "closing report file");
            }
            // The console may be the destination that failed.
            if let Err(finish_err) = reporter.finish(summary.count) {
                debug!(error = %finish_err, "Could not print the count");
            }
            Err(err)
        }
    }
}
