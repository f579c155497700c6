//! Walks a theatre through registration, listing, sales and soda exchange on
//! a sled ledger. Pass a TOML config path as the first argument to use an
//! on-disk database; otherwise a temporary one is opened.
//!
//! RUST_LOG=debug cargo run --example sled
use anyhow::Context;
use theatre_inventory::{Engine, EngineConfig, SledStore};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load(&path).with_context(|| format!("loading {path}"))?,
        None => EngineConfig::default(),
    };
    let store = SledStore::open(&config.ledger)?;
    let mut engine = Engine::new(config)?;
    engine.init();

    let calls = [
        ("athd", r#"{"thid":"Theatre1", "maxsoda": 200, "sph": {"SC1": 100 ,"SC2": 100,"SC3": 100,"SC4": 100,"SC5": 100}}"#),
        ("asd", r#"{"moviename":"Lucy", "screen":"SC1", "thid":"Theatre1", "showcode": ["1","2","3","4"]}"#),
        ("gss", r#"{"selector": {"thid": "Theatre1"}}"#),
        ("sell", r#"{"thid": "Theatre1", "moviename":"Lucy", "screen":"SC1", "showcode":"2", "ticketsold": 60}"#),
        ("sell", r#"{"thid": "Theatre1", "moviename":"Lucy", "screen":"SC1", "showcode":"2", "ticketsold": 50}"#),
        ("sell", r#"{"thid": "Theatre1", "moviename":"Lucy", "screen":"SC1", "showcode":"2", "ticketsold": 40}"#),
        ("exs", r#"{"thid":"Theatre1", "inventoryid": "ES13"}"#),
        ("exs", r#"{"thid":"Theatre1", "inventoryid": "ES13"}"#),
    ];

    for (function, payload) in calls {
        let response = engine.handle(&store, function, &[payload.to_string()]);
        println!(
            "{function:>5} -> {} {}",
            response.status,
            String::from_utf8_lossy(&response.payload)
        );
    }

    store.flush()?;
    Ok(())
}
