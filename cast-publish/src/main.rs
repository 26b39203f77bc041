//! cast-publish - Publish the next ready post record to a social platform

use clap::Parser;
use libpagecast::logging::LoggingConfig;
use libpagecast::{
    create_publisher, publish_next, select_next, Config, FsStore, GitStore, OutcomeStore,
    PlatformKind, Result,
};

#[derive(Parser, Debug)]
#[command(name = "cast-publish")]
#[command(about = "Publish the next ready post record to a social platform", long_about = None)]
struct Cli {
    /// Target platform (facebook, instagram, linkedin, x)
    #[arg(short, long)]
    platform: PlatformKind,

    /// Posts directory (defaults to posts/, or posts/instagram/ for Instagram)
    #[arg(long)]
    posts_dir: Option<String>,

    /// Select and print the next post without publishing or mutating anything
    #[arg(long)]
    dry_run: bool,

    /// Record the outcome on disk without committing it to git
    #[arg(long)]
    no_commit: bool,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    LoggingConfig::from_env(cli.verbose).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let platform = cli.platform;
    let filter = platform.filter();

    // Dry runs never touch credentials or the network.
    if cli.dry_run {
        let posts_dir = libpagecast::config::resolve_posts_dir(platform, cli.posts_dir.as_deref());
        match select_next(&posts_dir, &filter)? {
            Some(record) => {
                println!("Would publish {} to {}", record.path.display(), platform);
                println!("---");
                println!("{}", record.body.trim());
            }
            None => println!("Nothing to publish for {}", platform),
        }
        return Ok(());
    }

    let config = Config::from_env(platform, cli.posts_dir.as_deref())?;
    let publisher = create_publisher(&config);
    let store: Box<dyn OutcomeStore> = if cli.no_commit {
        Box::new(FsStore::new())
    } else {
        let mut git = GitStore::new(".");
        if let (Ok(name), Ok(email)) = (
            std::env::var("PAGECAST_GIT_AUTHOR"),
            std::env::var("PAGECAST_GIT_EMAIL"),
        ) {
            git = git.with_author(&name, &email);
        }
        Box::new(git)
    };

    match publish_next(
        &config.posts_dir,
        &filter,
        publisher.as_ref(),
        store.as_ref(),
        true,
    )
    .await?
    {
        Some(report) if cli.format == "json" => {
            let mut value = serde_json::to_value(&report).map_err(|e| {
                libpagecast::PagecastError::InvalidInput(format!(
                    "Failed to encode report: {}",
                    e
                ))
            })?;
            if let Some(fields) = value.as_object_mut() {
                fields.insert("published".to_string(), true.into());
            }
            println!("{}", value);
        }
        Some(report) => {
            println!(
                "Posted {} to {}: {}",
                report.path.display(),
                report.platform,
                report.post_id
            );
        }
        None if cli.format == "json" => {
            println!("{}", serde_json::json!({ "published": false }));
        }
        None => println!("Nothing to publish for {}", platform),
    }
    Ok(())
}
