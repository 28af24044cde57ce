use std::{str::FromStr, time::Duration};

use log::{debug, LevelFilter};
use simplelog::SimpleLogger;

use cws_keyring::{Address, Keyring};
use cws_keyring_tests::vectors::MNEMONIC;
use cws_sim::*;

// Setup logging and a simulated bridge with the provided behaviour
pub fn setup(behaviour: Behaviour) -> SimTransport {
    // Setup logging
    let log_level = match std::env::var("LOG_LEVEL").map(|v| LevelFilter::from_str(&v)) {
        Ok(Ok(l)) => l,
        _ => LevelFilter::Debug,
    };

    let _ = SimpleLogger::init(log_level, simplelog::Config::default());

    let t = SimTransport::from_mnemonic(MNEMONIC).expect("Simulator setup failed");
    t.set_behaviour(behaviour);

    t
}

/// Keyring over a shared simulated bridge, so tests can drive the device
#[allow(unused)]
pub fn keyring(t: &SimTransport) -> Keyring<SimTransport> {
    Keyring::new(t.clone(), cws_keyring_tests::config())
}

/// Approve requests held by the simulator
#[allow(unused)]
pub async fn approve(t: &SimTransport) {
    if t.behaviour() != Behaviour::Hold {
        return;
    }

    wait_held(t, 1).await;

    debug!("SIM: Approve");

    t.set_behaviour(Behaviour::Approve);
    t.release();
}

/// Wait for `n` requests to be held by the simulator
#[allow(unused)]
pub async fn wait_held(t: &SimTransport, n: usize) {
    while t.held() < n {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// First accounts for the test mnemonic
#[allow(unused)]
pub fn accounts() -> &'static [Address] {
    &cws_keyring_tests::vectors::ACCOUNTS
}
