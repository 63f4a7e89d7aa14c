//! Quick start example for handlepool.
//!
//! Registers a client for an in-process stand-in of a vector database, runs a
//! few pass-through operations on it, then tears the pool down.
//!
//! Run with: RUST_LOG=debug cargo run --example quickstart

use std::collections::HashMap;
use std::time::Duration;

use handlepool::prelude::*;

/// Minimal in-memory driver standing in for a real vector database client.
struct MemoryDriver {
    database: String,
    collections: HashMap<String, Vec<(i64, Vec<f32>)>>,
}

impl MemoryDriver {
    fn create_collection(&mut self, name: &str) -> std::result::Result<(), BoxError> {
        if self.collections.contains_key(name) {
            return Err(format!("collection {} already exists", name).into());
        }
        self.collections.insert(name.to_string(), Vec::new());
        Ok(())
    }

    fn insert(
        &mut self,
        collection: &str,
        id: i64,
        vector: Vec<f32>,
    ) -> std::result::Result<(), BoxError> {
        self.collections
            .get_mut(collection)
            .ok_or_else(|| format!("collection {} not found", collection))?
            .push((id, vector));
        Ok(())
    }

    fn count(&self, collection: &str) -> usize {
        self.collections.get(collection).map_or(0, Vec::len)
    }
}

impl Driver for MemoryDriver {
    fn shutdown(self) -> std::result::Result<(), BoxError> {
        tracing::info!(database = %self.database, "driver shut down");
        Ok(())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("handlepool Quick Start Example\n");

    let registry = Registry::new(factory_fn(|config: &ClientConfig, ctx: &Context| {
        ctx.check()?;
        Ok(Guarded::new(MemoryDriver {
            database: config.database().to_string(),
            collections: HashMap::new(),
        }))
    }));

    let config = ClientConfig::builder()
        .address("127.0.0.1:19530")
        .auth("root", "")
        .database("default")
        .retry(3, Duration::from_secs(2))
        .build()?;

    // Add and fetch the main client
    registry.add_with_context("main_client", &config, &config.connect_context())?;
    let client = registry.get("main_client")?;
    println!("[OK] Registered clients: {:?}", registry.list());

    // Forward a few operations through the guard
    client.try_with_mut(|d| d.create_collection("example_collection"))?;
    for id in 0..100 {
        let vector: Vec<f32> = (0..8).map(|j| ((id * 8 + j) as f32).sin()).collect();
        client.try_with_mut(|d| d.insert("example_collection", id, vector))?;
    }
    let count = client.with(|d| d.count("example_collection"))?;
    println!("[OK] Inserted {} vectors", count);

    // must_get returns the same client without creating a new one
    let again = registry.must_get("main_client", &config)?;
    println!("[OK] Same client: {}", std::sync::Arc::ptr_eq(&client, &again));

    // Removing closes the client; the old handle now refuses calls
    registry.remove("main_client")?;
    match client.with(|d| d.count("example_collection")) {
        Err(e) if e.is_closed() => println!("[OK] Removed client reports: {}", e),
        other => println!("unexpected: {:?}", other.map(|_| ())),
    }

    registry.close()?;
    println!("\nDone!");
    Ok(())
}
