use clap::Parser;
use std::io::Write;
use std::process::ExitCode;
use storyloom_cli::{run, telemetry, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = telemetry::init(cli.log_json) {
        eprintln!("warning: {e}");
    }

    let output = match run(&cli, &mut std::io::stdin().lock()) {
        Ok(output) => output,
        Err(e) => {
            tracing::error!(error = %e, "Planning failed");
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = stdout.write_all(output.as_bytes()).and_then(|()| stdout.flush()) {
        eprintln!("error: failed to write output: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
