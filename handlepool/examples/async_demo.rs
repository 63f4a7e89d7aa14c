//! Async API demo using AsyncRegistry.
//!
//! Many tasks ask for the same client at once; the factory runs once per name.
//!
//! Run with: cargo run --example async_demo --features async

#[cfg(feature = "async")]
use handlepool::prelude::*;
#[cfg(feature = "async")]
use handlepool::AsyncRegistry;

#[cfg(feature = "async")]
struct Channel {
    endpoint: String,
}

#[cfg(feature = "async")]
impl Handle for Channel {
    fn close(&self) -> std::result::Result<(), BoxError> {
        tracing::debug!(endpoint = %self.endpoint, "channel closed");
        Ok(())
    }
}

#[cfg(feature = "async")]
#[tokio::main]
async fn main() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    tracing_subscriber::fmt::init();

    println!("Async handlepool Demo\n");

    let dials = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&dials);
    let registry = AsyncRegistry::new(Registry::new(factory_fn(
        move |config: &ClientConfig, ctx: &Context| {
            ctx.check()?;
            counter.fetch_add(1, Ordering::SeqCst);
            // Simulate a slow dial
            std::thread::sleep(Duration::from_millis(50));
            Ok(Channel {
                endpoint: config.address().to_string(),
            })
        },
    )));

    let tenants = ["tenant_a", "tenant_b", "tenant_c"];

    println!("Requesting 3 clients from 300 concurrent tasks...");
    let start = std::time::Instant::now();

    let mut handles = vec![];
    for i in 0..300 {
        let registry = registry.clone();
        let tenant = tenants[i % tenants.len()];
        handles.push(tokio::spawn(async move {
            let config = ClientConfig::builder()
                .address(format!("{}.vectors.internal:19530", tenant))
                .build()?;
            registry.must_get(tenant, config).await
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    println!("   [OK] Done in {:?}", start.elapsed());
    println!("   Factory calls: {}", dials.load(Ordering::SeqCst));
    println!("   Registered: {:?}\n", registry.list());

    registry.remove("tenant_b").await.unwrap();
    println!("Removed tenant_b, remaining: {}", registry.len());

    registry.close().await.unwrap();
    println!("\nAsync demo complete!");
}

#[cfg(not(feature = "async"))]
fn main() {
    println!("Run with: cargo run --example async_demo --features async");
}
