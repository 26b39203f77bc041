//! cast-reset - Rewind posted records to ready for another publish pass

use clap::Parser;
use libpagecast::logging::LoggingConfig;
use libpagecast::{reset_all, Result};

#[derive(Parser, Debug)]
#[command(name = "cast-reset")]
#[command(about = "Reset posted records back to ready", long_about = None)]
struct Cli {
    /// Root directory to walk (defaults to posts/)
    #[arg(long, default_value = "posts")]
    posts_dir: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    LoggingConfig::from_env(cli.verbose).init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    let root = std::path::PathBuf::from(shellexpand::tilde(&cli.posts_dir).to_string());
    let changed = reset_all(&root)?;
    println!("Reset {} record(s) to ready", changed);
    Ok(())
}
