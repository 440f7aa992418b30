use clap::Parser;
use wrcoll::cli::commands::Cli;
use wrcoll::cli::handlers;
use wrcoll::io::logging::init_stderr_logging;

fn main() {
    let cli = Cli::parse();

    match cli.command {
        None => {
            // No subcommand → launch TUI
            let collection_dir = cli.collection_dir.as_deref().map(std::path::Path::new);
            if let Err(e) = wrcoll::tui::run(collection_dir) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
        Some(_) => {
            init_stderr_logging();
            if let Err(e) = handlers::dispatch(cli) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
