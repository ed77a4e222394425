use std::io::{BufRead, Write};
use std::sync::Arc;

use tracing::{info, warn};

use slotkeeper::command::{self, Flow};
use slotkeeper::engine::{BookingRegistry, PolicyKind, RegistryConfig};
use slotkeeper::notify::LogObserver;

fn policy_from_env(var: &str) -> Result<PolicyKind, Box<dyn std::error::Error>> {
    match std::env::var(var) {
        Ok(s) => Ok(s.parse().map_err(|e: String| format!("{var}: {e}"))?),
        Err(_) => Ok(PolicyKind::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries command output; logs go to stderr.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let seed = std::env::var("SLOTKEEPER_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(true);
    let config = RegistryConfig {
        generic_policy: policy_from_env("SLOTKEEPER_GENERIC_POLICY")?,
        room_policy: policy_from_env("SLOTKEEPER_ROOM_POLICY")?,
    };

    let registry = if seed {
        BookingRegistry::seeded(config)?
    } else {
        BookingRegistry::new(config)
    };
    registry.subscribe(Arc::new(LogObserver));

    info!("slotkeeper ready");
    info!("  resources: {}", registry.len());
    info!("  generic policy: {:?}", config.generic_policy);
    info!("  room policy: {:?}", config.room_policy);

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "type `help` for commands")?;
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let parsed = match command::parse_command(&line) {
            Ok(cmd) => cmd,
            Err(e) => {
                writeln!(stdout, "error: {e}")?;
                continue;
            }
        };
        match command::execute(&registry, parsed, &mut stdout) {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(e) => {
                if command::booking_error(e.as_ref()).is_none() {
                    warn!("command failed: {e}");
                }
                writeln!(stdout, "error: {e}")?;
            }
        }
        stdout.flush()?;
    }

    info!("slotkeeper shutting down");
    Ok(())
}
