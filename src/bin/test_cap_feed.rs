//! # CAP Feed Diagnostics
//!
//! Fetches a CAP RSS index, validates it, then fetches and validates every alert
//! it lists and reports what the map would draw for each.
//!
//! ```
//! cargo run --bin test_cap_feed
//! cargo run --bin test_cap_feed -- https://cap-alerts.s3.amazonaws.com/unfiltered/rss.xml --limit 20
//! ```

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::process;

use capmap::environment::DEFAULT_FEED_URL;
use capmap::feed::{self, ItemStatus};

#[derive(Parser, Debug)]
#[clap(about = "Validate a CAP RSS feed and the alerts it links to")]
struct Args {
    /// RSS index URL
    #[clap(default_value = DEFAULT_FEED_URL)]
    url: String,

    /// Only check the first N items
    #[clap(long)]
    limit: Option<usize>,

    /// Print the report as JSON
    #[clap(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let client = feed::create_http_client()?;

    let check = match feed::check_feed(&client, &args.url, args.limit).await {
        Ok(check) => check,
        Err(err) => {
            eprintln!("{} {}", "Feed unusable:".bright_red(), err);
            process::exit(1);
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&check)?);
        return Ok(());
    }

    println!("\n{}", "═".repeat(100).bright_blue());
    println!(
        "{}  {}",
        "FEED DIAGNOSTICS".bright_blue(),
        check.url.bright_yellow()
    );
    println!("{}", "═".repeat(100).bright_blue());
    println!("{}: {}", "Channel".bright_blue(), check.channel_title);
    println!("{}: {}", "Items checked".bright_blue(), check.items.len());
    println!("{}", "─".repeat(80).dimmed());

    for (index, item) in check.items.iter().enumerate() {
        let status = format!("{:?}", item.status);
        let colored_status = match item.status {
            ItemStatus::Ok if item.polygons > 0 => status.bright_green(),
            ItemStatus::Ok => status.bright_yellow(),
            _ => status.bright_red(),
        };
        println!("{:>4}. [{}] {}", index + 1, colored_status, item.title);
        println!("      {}", item.link.dimmed());
        if item.status == ItemStatus::Ok {
            println!(
                "      info blocks: {}, areas: {}, polygons: {}",
                item.info_blocks, item.areas, item.polygons
            );
        }
        if let Some(ref error) = item.error {
            println!("      {}", error.bright_red());
        }
    }

    let valid = check
        .items
        .iter()
        .filter(|item| item.status == ItemStatus::Ok)
        .count();
    let polygons: usize = check.items.iter().map(|item| item.polygons).sum();

    println!("{}", "─".repeat(80).dimmed());
    println!(
        "{}: {} valid, {} failed, {} polygons",
        "Summary".bright_blue(),
        valid.to_string().bright_green(),
        (check.items.len() - valid).to_string().bright_red(),
        polygons
    );

    Ok(())
}
