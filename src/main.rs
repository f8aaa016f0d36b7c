use checktree::cli::commands::Cli;
use checktree::cli::handlers;
use checktree::logging;
use clap::Parser;

fn main() {
    let cli = Cli::parse();

    let level = handlers::configured_log_level(cli.project_dir.as_deref());
    logging::init_subscriber(&level, cli.verbose);

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
