use anyhow::{Context, Result};
use host::{GuestHost, GuestHostConfig};
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| {
            "plugins/wasmtest/target/wasm32-unknown-unknown/release/wasmtest.wasm".to_string()
        });
    let wasm = fs::read(&path).with_context(|| format!("failed to read guest module {path}"))?;

    let mut host = GuestHost::new(GuestHostConfig::default())?;
    let instance = host.load_guest("wasmtest", &wasm)?;

    let exports: Vec<String> = instance
        .exports(&mut host.store)
        .map(|e| e.name().to_string())
        .collect();
    info!(
        ?exports,
        cursor = ?host.allocator().cursor(),
        "guest instantiated"
    );

    // The sample guest exposes a trivial arithmetic export; call it if present.
    if let Ok(func) = host.get_func("add") {
        let add = func.typed::<(i32, i32), i32>(&host.store)?;
        let sum = add.call(&mut host.store, (2, 3))?;
        info!(sum, "add(2, 3)");
    }

    Ok(())
}
