//! Uncontended fast-path benchmarks for the primitives.
//!
//! These establish the single-thread baseline cost of acquire/release
//! cycles; contention behavior is covered by the test suites.

#![allow(missing_docs)]

use criterion::{criterion_group, criterion_main, Criterion};

use synckit::{AtomicCounter, CountdownLatch, Interrupt, Mutex, RwLock, Semaphore};

fn bench_mutex(c: &mut Criterion) {
    let lock = Mutex::new();
    let interrupt = Interrupt::new();
    c.bench_function("mutex_acquire_release", |b| {
        b.iter(|| {
            lock.acquire(&interrupt).unwrap();
            lock.release().unwrap();
        });
    });
}

fn bench_semaphore(c: &mut Criterion) {
    let sem = Semaphore::new(1).unwrap();
    let interrupt = Interrupt::new();
    c.bench_function("semaphore_acquire_release", |b| {
        b.iter(|| {
            sem.acquire(&interrupt).unwrap();
            sem.release().unwrap();
        });
    });
}

fn bench_rwlock_read(c: &mut Criterion) {
    let lock = RwLock::new();
    let interrupt = Interrupt::new();
    c.bench_function("rwlock_read_acquire_release", |b| {
        b.iter(|| {
            lock.acquire_read(&interrupt).unwrap();
            lock.release_read().unwrap();
        });
    });
}

fn bench_counter(c: &mut Criterion) {
    let counter = AtomicCounter::new();
    c.bench_function("counter_increment", |b| {
        b.iter(|| counter.increment());
    });
}

fn bench_latch_fast_path(c: &mut Criterion) {
    let latch = CountdownLatch::new(0);
    let interrupt = Interrupt::new();
    c.bench_function("latch_wait_released", |b| {
        b.iter(|| latch.wait(&interrupt).unwrap());
    });
}

criterion_group!(
    benches,
    bench_mutex,
    bench_semaphore,
    bench_rwlock_read,
    bench_counter,
    bench_latch_fast_path
);
criterion_main!(benches);
