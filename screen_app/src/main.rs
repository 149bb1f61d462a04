//! Checks the screen pairing protocol end to end, then breaks it from the middle and prints the
//! recovered pairing code.

use anyhow::{ensure, Result};
use clap::Parser;
use crypto_bigint::U64;
use rand::thread_rng;
use screen_app::{DhParams, Interceptor, Phone, Screen, HELLO};
use tools::bigint::uint_dh::DiffieHellmannParams;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "screen_app")]
#[command(about = "Man-in-the-middle the screen pairing protocol", long_about = None)]
struct Cli {
    /// Odd prime modulus of the Diffie-Hellman group
    #[arg(long, default_value_t = 37)]
    modulus: u32,

    /// Generator of the Diffie-Hellman group
    #[arg(long, default_value_t = 5)]
    generator: u32,
}

/// Honest pairing: both sides must agree and the greeting must open.
fn protocol(params: &DhParams) -> Result<()> {
    let mut rng = thread_rng();
    let screen = Screen::new(&mut rng);
    let phone = Phone::new(screen.code());

    let screen_hs = screen.begin(params, &mut rng);
    let phone_hs = phone.begin(params, &mut rng);
    let (screen_pk, phone_pk) = (screen_hs.public_key(), phone_hs.public_key());

    let screen_session = screen_hs.establish(&phone_pk);
    let phone_session = phone_hs.establish(&screen_pk);

    ensure!(screen_session.key() == phone_session.key());
    ensure!(phone_session.decrypt(&screen_session.hello()?)? == HELLO);
    info!("honest pairing agrees");
    Ok(())
}

/// Intercepts both exchanges and brute-forces the code from the screen's greeting.
fn attack(params: &DhParams) -> Result<u16> {
    let mut rng = thread_rng();
    let screen = Screen::new(&mut rng);
    let phone = Phone::new(screen.code());

    let screen_hs = screen.begin(params, &mut rng);
    let phone_hs = phone.begin(params, &mut rng);
    let mallory = Interceptor::new(params, &mut rng);

    let (screen_pk, phone_pk) = (screen_hs.public_key(), phone_hs.public_key());
    let screen_session = screen_hs.establish(&mallory.public_key_for_server());
    let phone_session = phone_hs.establish(&mallory.public_key_for_client());

    let code = mallory.recover_code(&screen_session.hello()?, &screen_pk)?;
    ensure!(code == screen.code());

    let keys = mallory.session_keys(code, &screen_pk, &phone_pk);
    ensure!(&keys.server == screen_session.key());
    ensure!(&keys.client == phone_session.key());

    Ok(code.value())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    ensure!(
        cli.modulus > 2 && cli.modulus % 2 == 1,
        "modulus must be an odd prime"
    );
    ensure!(
        (2..cli.modulus).contains(&cli.generator),
        "generator must lie in [2, modulus)"
    );
    let params = DiffieHellmannParams::new(&U64::from_u32(cli.modulus), U64::from_u32(cli.generator));

    protocol(&params)?;
    let code = attack(&params)?;
    println!("{code}");

    Ok(())
}
