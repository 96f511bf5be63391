use std::io;
use std::process::ExitCode;

use clap::Parser;

use siginspect::app;
use siginspect::authenticode::AuthenticodeService;
use siginspect::cli::Cli;
use siginspect::error::SigInspectError;
use siginspect::logging::{init_tracing, init_tracing_json};

fn run(cli: &Cli) -> anyhow::Result<()> {
    let stdout = io::stdout();
    app::run(cli, AuthenticodeService::new(), stdout.lock())?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.log_json {
        init_tracing_json();
    } else {
        init_tracing();
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            let code = err
                .downcast_ref::<SigInspectError>()
                .map_or(1, SigInspectError::exit_code);
            ExitCode::from(code)
        }
    }
}
