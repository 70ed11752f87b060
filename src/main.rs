mod cli;
mod commands;
mod formatting;

use std::process::ExitCode;

use cli::Commands;
use commands::{run_assess, run_validate};

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    match args.command {
        Commands::Assess {
            input,
            output,
            format,
            concurrency,
        } => {
            run_assess(
                args.config,
                args.verbose,
                input,
                output,
                format,
                concurrency,
            )
            .await
        }
        Commands::Validate { input } => run_validate(args.verbose, input),
    }
}
