use anyhow::Result;
use clap::Parser;
use lzpack::{cli, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let is_silent = args.silent;

    let log_guard = logging::init(&args.log_file)?;
    tracing::info!("application started");

    match cli::run(args).await {
        Ok(()) => {
            tracing::info!("application exiting");
            // Exit explicitly: abandoned blocking workers would otherwise
            // keep the runtime's shutdown waiting on them.
            drop(log_guard);
            std::process::exit(0);
        }
        Err(e) => {
            if is_silent {
                println!("{}", e);
                drop(log_guard);
                std::process::exit(1);
            } else {
                Err(e)
            }
        }
    }
}
