//! `functions-cli` entry point.
//!
//! ```text
//! functions-cli [--env-file PATH] [--log-level LEVEL] <command> [params...]
//! ```
//!
//! This is the only place an error stops: it is logged, printed to standard
//! error, and the process exits with status 1.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use functions_cli::cli::{Command, CommandKind, Dispatcher, Invocation};
use functions_cli::config::Environment;
use functions_cli::error::FunctionsResult;
use functions_cli::observability::{self, logging::LOG_FILTER_ENV_VAR};
use functions_cli::toolkit::LiveToolkit;

#[derive(Parser, Debug)]
#[command(name = "functions-cli", version)]
#[command(about = "Manage Chainlink Functions subscriptions and secrets", long_about = None)]
#[command(after_help = usage())]
struct Cli {
    /// Dotenv file read before the process environment
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,

    /// Log filter (e.g. `debug`, `functions_cli=trace`)
    #[arg(long, env = LOG_FILTER_ENV_VAR, default_value = "info")]
    log_level: String,

    /// Command name followed by its parameters
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn usage() -> String {
    let mut text = String::from("Commands:\n");
    for kind in CommandKind::ALL {
        text.push_str(&format!("  {:<16} {}\n", kind.name(), kind.usage()));
    }
    text.push_str(
        "\nSecrets are sealed to the DON public key without the DON's threshold\n\
         encryption layer.\n",
    );
    text
}

async fn run(cli: Cli) -> FunctionsResult<()> {
    let command = Command::parse(Invocation::new(cli.args))?;

    let env = Environment::load(Some(&cli.env_file))?;
    let toolkit = LiveToolkit::new(&env);

    let mut out = std::io::stdout();
    Dispatcher::new(&toolkit).dispatch(command, &mut out).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    observability::init(&cli.log_level);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
