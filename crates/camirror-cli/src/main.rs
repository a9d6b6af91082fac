use clap::Parser;
use tracing_subscriber::EnvFilter;

use camirror_core::{sync, BlobCache, MirrorResult, SyncSummary};

mod args;

use args::{Cli, Command};

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let code = match dispatch(cli).await {
        Ok(summary) => {
            println!(
                "Done! {} records bundled into {}",
                summary.record_count,
                summary.bundle_path.display()
            );
            0
        }
        Err(e) => {
            eprintln!("fatal: {e}");
            e.exit_code()
        }
    };
    std::process::exit(code);
}

async fn dispatch(cli: Cli) -> MirrorResult<SyncSummary> {
    match cli.cmd {
        Command::Sync(args) => {
            let config = args.into_config();
            let cache = BlobCache::new(&config)?;
            sync(&cache, &config).await
        }
    }
}
