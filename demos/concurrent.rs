use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use tokenpool::CatalogPool;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize, Deserialize)]
struct Token {
    shipping_name: String,
    config_id: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let capacity = NonZeroUsize::new(5).ok_or("capacity must be non-zero")?;
    let pool = CatalogPool::new(capacity);
    for (config_id, name) in [(1, "A"), (2, "B"), (3, "C")] {
        pool.add_elem(
            &Token {
                shipping_name: name.to_owned(),
                config_id,
            },
            1.0,
        )?;
    }

    std::thread::scope(|s| {
        for i in 0..20 {
            let pool = &pool;
            s.spawn(move || {
                let n = capacity.get() - i % capacity.get();
                match pool.take(n) {
                    Ok(tokens) => assert_eq!(n, tokens.len()),
                    Err(err) => eprintln!("take({n}) failed: {err}"),
                }
            });
        }
    });

    for (entry, count) in pool.occurrence().iter().enumerate() {
        println!("entry {entry}: selected {count} times");
    }
    println!("{} tokens left", pool.remaining());
    Ok(())
}
