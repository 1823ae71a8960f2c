use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use anyhow::Context;
use lazy_local::LazyThreadLocal;
use tracing_subscriber::EnvFilter;

static CONNECTIONS: AtomicUsize = AtomicUsize::new(0);

/// Stand-in for a per-thread resource such as a connection or scratch buffer.
#[derive(Debug)]
struct Connection {
    id: usize,
    opened_by: String,
}

fn open_connection() -> anyhow::Result<Connection> {
    let id = CONNECTIONS.fetch_add(1, Ordering::SeqCst);
    let opened_by = thread::current()
        .name()
        .context("worker threads are always named")?
        .to_owned();

    Ok(Connection { id, opened_by })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run() {
        eprintln!("Fatal Exception: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let workers = match std::env::args().nth(1) {
        Some(n) => n
            .parse::<usize>()
            .with_context(|| format!("invalid worker count {n:?}"))?,
        None => 4,
    };

    let connection = &LazyThreadLocal::new(open_connection);

    thread::scope(|s| {
        let handles = (0..workers)
            .map(move |i| {
                thread::Builder::new()
                    .name(format!("worker-{i}"))
                    .spawn_scoped(s, move || -> anyhow::Result<()> {
                        // The second lookup is served from the thread's own slot.
                        for _ in 0..2 {
                            connection.with(|conn| {
                                println!("{} -> connection {}", conn.opened_by, conn.id);
                            })?;
                        }
                        Ok(())
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for handle in handles {
            handle
                .join()
                .map_err(|_| anyhow::anyhow!("worker panicked"))??;
        }

        anyhow::Ok(())
    })?;

    println!(
        "{workers} workers opened {} connections",
        CONNECTIONS.load(Ordering::SeqCst)
    );
    Ok(())
}
