//! Multithreaded writer smoke test.
//!
//! Each thread inserts a disjoint range of big-endian encoded integer keys
//! (values are twice the key) and then reads its own range back.
//!
//! Usage: `multithread_writers [--threads N] [--per-thread N] [--capacity N]`

use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use cbtree::{encode_u64_be, BytewiseComparator, ConcurrentBTree, TreeConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

type ByteTree = ConcurrentBTree<Vec<u8>, Vec<u8>, BytewiseComparator>;

#[derive(Debug, Clone, Copy)]
struct SmokeConfig {
    threads: usize,
    per_thread: usize,
    capacity: usize,
}

impl Default for SmokeConfig {
    fn default() -> Self {
        Self {
            threads: 8,
            per_thread: 2 * 64,
            capacity: 64,
        }
    }
}

impl SmokeConfig {
    fn from_args(args: impl IntoIterator<Item = String>) -> Result<Self, String> {
        let mut config = Self::default();
        let mut args = args.into_iter();
        while let Some(flag) = args.next() {
            let target = match flag.as_str() {
                "--threads" => &mut config.threads,
                "--per-thread" => &mut config.per_thread,
                "--capacity" => &mut config.capacity,
                other => return Err(format!("unknown argument: {}", other)),
            };
            let value = args
                .next()
                .ok_or_else(|| format!("{} needs a value", flag))?;
            *target = value
                .parse()
                .map_err(|e| format!("invalid value for {}: {}", flag, e))?;
        }
        Ok(config)
    }
}

/// Insert then verify one thread's key range, returning the number of misses.
fn run_worker(tree: &ByteTree, start: u64, end: u64) -> usize {
    for i in start..end {
        tree.put(encode_u64_be(i).to_vec(), encode_u64_be(2 * i).to_vec());
    }

    (start..end)
        .filter(|&i| {
            let found = tree.get(&encode_u64_be(i).to_vec());
            found.as_deref() != Some(&encode_u64_be(2 * i)[..])
        })
        .count()
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match SmokeConfig::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(msg) => {
            eprintln!("{}", msg);
            return ExitCode::FAILURE;
        }
    };

    let tree: Arc<ByteTree> = match ConcurrentBTree::with_config(
        TreeConfig::default().with_capacity(config.capacity),
        BytewiseComparator,
    ) {
        Ok(tree) => Arc::new(tree),
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    info!(?config, "starting writers");
    let start = Instant::now();
    let per_thread = config.per_thread as u64;
    let handles: Vec<_> = (0..config.threads as u64)
        .map(|t| {
            let tree = Arc::clone(&tree);
            thread::spawn(move || run_worker(&tree, t * per_thread, (t + 1) * per_thread))
        })
        .collect();

    let mut misses = 0;
    for handle in handles {
        match handle.join() {
            Ok(count) => misses += count,
            Err(_) => {
                error!("writer thread panicked");
                return ExitCode::FAILURE;
            }
        }
    }
    let elapsed = start.elapsed();

    println!("Elapsed time: {:.6} seconds", elapsed.as_secs_f64());
    if misses > 0 {
        error!(misses, "keys missing or wrong after insert");
        return ExitCode::FAILURE;
    }
    if let Err(e) = tree.check_invariants() {
        error!(%e, "tree invariants violated");
        return ExitCode::FAILURE;
    }

    let expected = config.threads * config.per_thread;
    if tree.len() != expected {
        error!(len = tree.len(), expected, "entry count mismatch");
        return ExitCode::FAILURE;
    }
    info!(stats = ?tree.stats(), "done");
    println!("MultithreadWriters test passed.");
    ExitCode::SUCCESS
}
