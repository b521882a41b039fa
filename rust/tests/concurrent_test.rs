//! Multithreaded tests for ConcurrentBTree.
//!
//! Small capacities are used on purpose: they force frequent leaf and inner
//! splits and root growth while other threads are reading and writing.

use cbtree::{encode_u64_be, BytewiseComparator, ConcurrentBTree};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

fn run_disjoint_writers(capacity: usize, threads: u64, per_thread: u64) {
    let tree = Arc::new(ConcurrentBTree::new(capacity).unwrap());
    let barrier = Arc::new(Barrier::new(threads as usize));

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let tree = Arc::clone(&tree);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let range = t * per_thread..(t + 1) * per_thread;
                for k in range.clone() {
                    tree.put(k, k * 2);
                }
                for k in range {
                    assert_eq!(tree.get(&k), Some(k * 2), "thread {} lost key {}", t, k);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(tree.len(), (threads * per_thread) as usize);
    tree.check_invariants().unwrap();
    for k in 0..threads * per_thread {
        assert_eq!(tree.get(&k), Some(k * 2));
    }
}

#[test]
fn test_disjoint_writers_default_shape() {
    // Eight threads, two full leaves' worth of keys each.
    run_disjoint_writers(64, 8, 128);
}

#[test]
fn test_disjoint_writers_small_nodes() {
    run_disjoint_writers(3, 8, 2000);
}

#[test]
fn test_disjoint_writers_even_capacity() {
    run_disjoint_writers(4, 16, 1000);
}

#[test]
fn test_interleaved_keys_across_threads() {
    // Every thread writes every `threads`-th key, so all threads contend on the
    // same leaves and race to split them.
    let threads = 8u64;
    let total = 20_000u64;
    let tree = Arc::new(ConcurrentBTree::new(4).unwrap());

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let tree = Arc::clone(&tree);
            thread::spawn(move || {
                for k in (t..total).step_by(threads as usize) {
                    tree.put(k, t);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    tree.check_invariants().unwrap();
    assert_eq!(tree.len(), total as usize);
    for k in 0..total {
        assert_eq!(tree.get(&k), Some(k % threads));
    }
}

#[test]
fn test_concurrent_upserts_on_shared_keys() {
    let threads = 8u64;
    let keys = 500u64;
    let rounds = 20u64;
    let tree = Arc::new(ConcurrentBTree::new(5).unwrap());

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let tree = Arc::clone(&tree);
            thread::spawn(move || {
                for round in 0..rounds {
                    for k in 0..keys {
                        tree.put(k, (t, round));
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Every key exists exactly once and holds a value some thread wrote.
    assert_eq!(tree.len(), keys as usize);
    tree.check_invariants().unwrap();
    for k in 0..keys {
        let (t, round) = tree.get(&k).unwrap();
        assert!(t < threads && round < rounds);
    }
}

#[test]
fn test_readers_never_see_missing_published_keys() {
    // Keys 0..preloaded are in the tree before readers start; writers keep
    // splitting nodes around them. A reader must always find every one.
    let preloaded = 2_000u64;
    let tree = Arc::new(ConcurrentBTree::new(4).unwrap());
    for k in 0..preloaded {
        tree.put(k * 2, k);
    }

    let stop = Arc::new(AtomicBool::new(false));
    let readers: Vec<_> = (0..4)
        .map(|r| {
            let tree = Arc::clone(&tree);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(r);
                let mut lookups = 0u64;
                while !stop.load(Ordering::Acquire) || lookups < 10_000 {
                    let k = rng.gen_range(0..preloaded);
                    assert_eq!(tree.get(&(k * 2)), Some(k), "reader {} lost key {}", r, k * 2);
                    lookups += 1;
                }
            })
        })
        .collect();

    let writers: Vec<_> = (0..4u64)
        .map(|w| {
            let tree = Arc::clone(&tree);
            thread::spawn(move || {
                // Odd keys interleave with the preloaded even keys.
                for k in (0..preloaded).filter(|k| k % 4 == w) {
                    tree.put(k * 2 + 1, k);
                }
            })
        })
        .collect();

    for writer in writers {
        writer.join().unwrap();
    }
    stop.store(true, Ordering::Release);
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(tree.len(), (preloaded * 2) as usize);
    tree.check_invariants().unwrap();
}

#[test]
fn test_concurrent_first_inserts_create_one_root() {
    // All threads race to create the root of an empty tree.
    for _ in 0..20 {
        let tree = Arc::new(ConcurrentBTree::new(3).unwrap());
        let barrier = Arc::new(Barrier::new(8));
        let handles: Vec<_> = (0..8u32)
            .map(|t| {
                let tree = Arc::clone(&tree);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    tree.put(t, t);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(tree.len(), 8);
        tree.check_invariants().unwrap();
        assert!((0..8).all(|t| tree.get(&t) == Some(t)));
    }
}

#[test]
fn test_byte_keys_from_many_threads() {
    let threads = 8u64;
    let per_thread = 128u64;
    let tree = Arc::new(ConcurrentBTree::with_comparator(64, BytewiseComparator).unwrap());

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let tree = Arc::clone(&tree);
            thread::spawn(move || {
                let range = t * per_thread..(t + 1) * per_thread;
                for i in range.clone() {
                    tree.put(encode_u64_be(i).to_vec(), encode_u64_be(2 * i).to_vec());
                }
                for i in range {
                    let value = tree.get(&encode_u64_be(i).to_vec());
                    assert_eq!(value.as_deref(), Some(&encode_u64_be(2 * i)[..]));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(tree.len(), (threads * per_thread) as usize);
    tree.check_invariants().unwrap();
}

#[test]
fn test_inspection_while_the_root_keeps_growing() {
    // Structure dumps and stats run while writers keep adding levels.
    let tree = Arc::new(ConcurrentBTree::new(3).unwrap());
    let stop = Arc::new(AtomicBool::new(false));

    let inspector = {
        let tree = Arc::clone(&tree);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            while !stop.load(Ordering::Acquire) {
                let lines = tree.structure_lines();
                if let Some(first) = lines.first() {
                    assert!(!first.starts_with(' '), "root line is indented: {}", first);
                }
                let stats = tree.stats();
                assert!(stats.leaf_count + stats.inner_count <= stats.allocated_nodes);
            }
        })
    };

    let writers: Vec<_> = (0..4u32)
        .map(|t| {
            let tree = Arc::clone(&tree);
            thread::spawn(move || {
                for k in (t * 5000)..(t + 1) * 5000 {
                    tree.put(k, k);
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }
    stop.store(true, Ordering::Release);
    inspector.join().unwrap();

    tree.check_invariants().unwrap();
    assert_eq!(tree.len(), 20_000);
}
