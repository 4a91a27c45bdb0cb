use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

/// Shows whether a user-agent and URI combination is allowed or disallowed
/// by a robots.txt file.
#[derive(Parser)]
#[clap(author, version, about)]
struct Args {
    /// Local path to a file containing robots.txt records
    robots_file: PathBuf,

    /// User-agent token, or a comma-separated list of tokens
    user_agents: String,

    /// URI to check, %-encoded according to RFC3986
    uri: String,
}

fn main() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .finish();
    tracing::subscriber::set_global_default(subscriber).unwrap();

    // Help and bad arguments both leave with status 2, distinct from the
    // allowed/disallowed outcomes.
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            process::exit(2);
        }
    };

    match run(&args) {
        Ok(true) => process::exit(0),
        Ok(false) => process::exit(1),
        Err(err) => {
            eprintln!("{:#}", err);
            process::exit(2);
        }
    }
}

fn run(args: &Args) -> Result<bool> {
    let body = fs::read(&args.robots_file)
        .with_context(|| format!("failed to read file {:?}", args.robots_file))?;
    debug!(bytes = body.len(), "loaded robots.txt");

    let user_agents: Vec<&str> = args.user_agents.split(',').collect();
    let allowed = marvin::are_allowed(&body, &user_agents, &args.uri);

    println!(
        "user-agent '{}' with URI '{}': {}",
        args.user_agents,
        args.uri,
        if allowed { "ALLOWED" } else { "DISALLOWED" }
    );
    if body.is_empty() {
        println!("notice: robots file is empty so all user-agents are allowed");
    }

    Ok(allowed)
}
