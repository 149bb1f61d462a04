//! Interactive login portal: opens a presented token, or logs in and hands one out.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use clap::Parser;
use submarine::ServiceConfig;
use tools::encode::ascii::to_ascii;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "portal")]
#[command(about = "Log in or present a token", long_about = None)]
struct Cli {
    /// Hex encoded service key
    #[arg(long, env = "SUBMARINE_KEY", default_value = "6162636465666768696a6b6c6d6e6f70")]
    key: String,

    #[arg(long, env = "SUBMARINE_USER", default_value = "qwerty")]
    user: String,

    #[arg(long, env = "SUBMARINE_PASSWORD", default_value = "asdf")]
    password: String,
}

fn prompt(lines: &mut impl Iterator<Item = io::Result<String>>, question: &str) -> Result<String> {
    println!("{question}");
    io::stdout().flush()?;
    Ok(lines.next().transpose()?.unwrap_or_default().trim().to_string())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let service = ServiceConfig::from_hex_key(&cli.key, cli.user, cli.password)?.build();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    if prompt(&mut lines, "Do you have a token? (y/n)")? == "y" {
        let token = prompt(&mut lines, "token?")?;
        let user = service.decrypt(&token)?;
        println!("You are logged in as {}", to_ascii(&user, true));
    } else {
        let user = prompt(&mut lines, "user?")?;
        let password = prompt(&mut lines, "password?")?;

        match service.login(&user, &password)? {
            Some(token) => {
                println!("Success. here's your token:");
                println!("{token}");
            }
            None => println!("Wrong credentials"),
        }
    }

    Ok(())
}
