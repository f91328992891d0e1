use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use flakeid::{BitLayout, DEFAULT_EPOCH, IdGenerator, Poll, TimeSource};
use std::{
    sync::{Arc, Barrier},
    thread::scope,
    time::Instant,
};

struct FixedMockTime {
    millis: u64,
}

impl TimeSource for FixedMockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

// Number of IDs generated per benchmark iteration (per-thread for
// multi-threaded). Matches the default sequence space so the hot path never
// has to wait.
const TOTAL_IDS: usize = 4096;

/// Hot path: a fixed clock where every poll is `Ready`.
fn bench_poll_fixed_clock(c: &mut Criterion) {
    let mut group = c.benchmark_group("poll/fixed");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();

            for _ in 0..iters {
                let generator = IdGenerator::with_layout(
                    1,
                    1,
                    BitLayout::DEFAULT,
                    FixedMockTime {
                        millis: DEFAULT_EPOCH.as_millis() as u64 + 1,
                    },
                )
                .unwrap();
                for _ in 0..TOTAL_IDS {
                    match generator.poll_id().unwrap() {
                        Poll::Ready { id } => {
                            black_box(id);
                        }
                        Poll::Pending { .. } => unreachable!(),
                    }
                }
            }

            start.elapsed()
        });
    });

    group.finish();
}

/// Wall clock, blocking on sequence exhaustion like a real caller would.
fn bench_next_id_system_clock(c: &mut Criterion) {
    let mut group = c.benchmark_group("next_id/system");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    let generator = IdGenerator::new(1, 1).unwrap();
    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter(|| {
            for _ in 0..TOTAL_IDS {
                black_box(generator.next_id().unwrap());
            }
        });
    });

    group.finish();
}

/// Contention on one shared generator.
fn bench_next_id_threaded(c: &mut Criterion) {
    let threads = num_cpus::get().max(2);
    let mut group = c.benchmark_group(format!("next_id/threads/{threads}"));
    group.throughput(Throughput::Elements((TOTAL_IDS * threads) as u64));

    group.bench_function(format!("elems/{}", TOTAL_IDS * threads), |b| {
        b.iter_custom(|iters| {
            let generator = IdGenerator::new(1, 1).unwrap();
            let barrier = Arc::new(Barrier::new(threads + 1));

            let start = scope(|s| {
                for _ in 0..threads {
                    let barrier = Arc::clone(&barrier);
                    let generator = &generator;
                    s.spawn(move || {
                        barrier.wait();
                        for _ in 0..iters {
                            for _ in 0..TOTAL_IDS {
                                black_box(generator.next_id().unwrap());
                            }
                        }
                    });
                }
                barrier.wait();
                Instant::now()
            });

            start.elapsed()
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_poll_fixed_clock,
    bench_next_id_system_clock,
    bench_next_id_threaded
);
criterion_main!(benches);
