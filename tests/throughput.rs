use lruk_replacer::{LruKReplacer, Replacer};
use rand::distributions::{Bernoulli, Distribution};
use std::{
    collections::HashSet,
    fs::File,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    thread,
};
use tracing::{trace, Level};
use zipf::ZipfDistribution;

static ACCESSES: AtomicUsize = AtomicUsize::new(0);
static EVICTIONS: AtomicUsize = AtomicUsize::new(0);

/// Simulates buffer pool workers that share one replacer and one free list. Every worker fetches
/// pages with a skewed distribution, and asks the replacer for a victim once the free list is
/// empty.
#[test]
fn bench() {
    const THREADS: usize = 8;
    const FRAMES_PER_THREAD: usize = 16;
    const PAGES_PER_THREAD: usize = 256;
    const ITERATIONS: usize = 2048;
    const K: usize = 2;

    let log_file = File::create("throughput.log").unwrap();

    let stdout_subscriber = tracing_subscriber::fmt()
        .compact()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(false)
        .without_time()
        .with_max_level(Level::TRACE)
        .with_writer(Mutex::new(log_file))
        .finish();
    tracing::subscriber::set_global_default(stdout_subscriber).unwrap();

    let replacer = Arc::new(LruKReplacer::new(THREADS * FRAMES_PER_THREAD, K));
    let free_frames = Arc::new(Mutex::new((0..THREADS * FRAMES_PER_THREAD).collect::<Vec<_>>()));

    // Spawn all threads
    thread::scope(|s| {
        for thread in 0..THREADS {
            let replacer = replacer.clone();
            let free_frames = free_frames.clone();

            s.spawn(move || {
                let mut rng = rand::thread_rng();
                let zipf = ZipfDistribution::new(PAGES_PER_THREAD, 1.1).unwrap();
                let pin = Bernoulli::new(0.1).unwrap();

                // This worker's own page table: page -> frame.
                let mut resident: Vec<(usize, usize)> = Vec::new();

                for iteration in 0..ITERATIONS {
                    let page = zipf.sample(&mut rng);

                    let frame_id = match resident.iter().find(|(p, _)| *p == page) {
                        Some(&(_, frame_id)) => frame_id,
                        None => {
                            let free_frame = free_frames.lock().unwrap().pop();
                            let frame_id = match free_frame {
                                Some(frame_id) => frame_id,
                                None => match replacer.evict() {
                                    Some(victim) => {
                                        EVICTIONS.fetch_add(1, Ordering::SeqCst);
                                        victim
                                    }
                                    // Every frame is pinned; skip this request.
                                    None => continue,
                                },
                            };

                            // Victims can come from any worker; drop a stale local mapping.
                            resident.retain(|&(_, f)| f != frame_id);
                            resident.push((page, frame_id));
                            frame_id
                        }
                    };

                    trace!(thread, iteration, page, frame_id, "accessing page");

                    replacer.record_access(frame_id).unwrap();
                    ACCESSES.fetch_add(1, Ordering::SeqCst);

                    // Briefly pin some frames, like a page guard would.
                    if pin.sample(&mut rng) {
                        replacer.set_evictable(frame_id, false).unwrap();
                        std::hint::black_box(frame_id);
                        replacer.set_evictable(frame_id, true).unwrap();
                    }
                }
            });
        }
    });

    assert!(ACCESSES.load(Ordering::SeqCst) <= THREADS * ITERATIONS);
    assert!(EVICTIONS.load(Ordering::SeqCst) > 0);
    replacer.check_invariants().unwrap();

    // Draining the replacer never hands out the same frame twice.
    let mut seen = HashSet::new();
    while let Some(frame_id) = replacer.evict() {
        assert!(seen.insert(frame_id));
    }
    assert_eq!(replacer.size(), 0);
    assert!(free_frames.lock().unwrap().is_empty());
}
