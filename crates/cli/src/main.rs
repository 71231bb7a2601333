use clap::Parser;
use invsync_cli::Cli;

fn main() {
    invsync_observability::init();

    let cli = Cli::parse();
    if let Err(err) = invsync_cli::run(&cli) {
        tracing::error!(error = %err, "invsync failed");
        eprintln!("invsync: {err:#}");
        std::process::exit(1);
    }
}
