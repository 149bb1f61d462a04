//! Forges a login token for another user from one legitimately issued token.
//!
//! First the attack is checked against a local service using a stand-in key, then it is run
//! against a token observed from the real service and the forged token is printed.

use std::collections::HashMap;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use submarine::{forge::forge_from_observations, forge, ServiceConfig};
use tools::encode::ascii::to_ascii;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "submarine")]
#[command(about = "Forge a login token by rewriting its CBC IV", long_about = None)]
struct Cli {
    /// Hex encoded key of the local service used for the sanity check
    #[arg(long, env = "SUBMARINE_KEY", default_value = "6162636465666768696a6b6c6d6e6f70")]
    key: String,

    /// Account we can log into legitimately
    #[arg(long, default_value = "qwerty")]
    user: String,

    #[arg(long, default_value = "asdf")]
    password: String,

    /// Username the locally forged token should carry
    #[arg(long, default_value = "fionn")]
    target: String,

    /// Token issued by the real service for `observed_user`
    #[arg(long, default_value = "6obi67W57jYVxJyh3vyTp7l31dHghJSWP117i+wqTa4=")]
    observed_token: String,

    #[arg(long, default_value = "qwerty")]
    observed_user: String,

    /// Username the forged token for the real service should carry
    #[arg(long, default_value = "david")]
    real_target: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let service = ServiceConfig::from_hex_key(&cli.key, cli.user.as_str(), cli.password.as_str())?
        .build();
    let token = service
        .login(&cli.user, &cli.password)?
        .context("local service rejected the credentials")?;

    // sanity check
    ensure!(service.decrypt(&token)? == cli.user.as_bytes());

    let forged = forge(&token, &cli.user, &cli.target)?;
    let opened = service.decrypt(&forged)?;
    info!(plaintext = %to_ascii(&opened, true), "local forgery opened");
    ensure!(
        opened == cli.target.as_bytes(),
        "forged token opened as {:?}",
        to_ascii(&opened, true)
    );

    let observed = HashMap::from([(cli.observed_user, cli.observed_token)]);
    let forged = forge_from_observations(&observed, &cli.real_target)?
        .context("no observed token to forge from")?;
    println!("{forged}");

    Ok(())
}
