//! RwLock: readers share, writers exclude, and the writer-priority policy
//! holds under mixed load.

use std::sync::Arc;
use std::time::Duration;

use synckit::{Barrier, Interrupt, RwLock};

#[test]
fn reader_count_reaches_full_parallelism() {
    const READERS: usize = 4;

    let lock = Arc::new(RwLock::new());
    // Rendezvous while all read holds are live proves they overlap.
    let rendezvous = Arc::new(Barrier::new(READERS).expect("build failed"));

    let handles: Vec<_> = (0..READERS)
        .map(|_| {
            let lock = Arc::clone(&lock);
            let rendezvous = Arc::clone(&rendezvous);
            std::thread::spawn(move || {
                let interrupt = Interrupt::new();
                lock.acquire_read(&interrupt).expect("read failed");
                let count = lock.reader_count();
                rendezvous.wait(&interrupt).expect("rendezvous failed");
                lock.release_read().expect("release failed");
                count
            })
        })
        .collect();

    let mut max_seen = 0;
    for handle in handles {
        max_seen = max_seen.max(handle.join().expect("thread panicked"));
    }
    // At the rendezvous every reader held the lock, so the last one in
    // observed all of them.
    assert_eq!(max_seen, READERS);
    assert_eq!(lock.reader_count(), 0);
}

#[test]
fn writer_never_overlaps_readers() {
    const READERS: usize = 3;
    const ROUNDS: usize = 30;

    let lock = Arc::new(RwLock::new());

    let readers: Vec<_> = (0..READERS)
        .map(|_| {
            let lock = Arc::clone(&lock);
            std::thread::spawn(move || {
                let interrupt = Interrupt::new();
                for _ in 0..ROUNDS {
                    let guard = lock.read(&interrupt).expect("read failed");
                    // Holding a read lock forbids an active writer.
                    assert!(!lock.writer_active());
                    drop(guard);
                }
            })
        })
        .collect();

    let writer = {
        let lock = Arc::clone(&lock);
        std::thread::spawn(move || {
            let interrupt = Interrupt::new();
            for _ in 0..ROUNDS {
                let guard = lock.write(&interrupt).expect("write failed");
                // Holding the write lock forbids any reader.
                assert_eq!(lock.reader_count(), 0);
                drop(guard);
            }
        })
    };

    for reader in readers {
        reader.join().expect("reader panicked");
    }
    writer.join().expect("writer panicked");
}

#[test]
fn queued_writer_is_not_starved_by_reader_stream() {
    let lock = Arc::new(RwLock::new());
    let interrupt = Interrupt::new();
    lock.acquire_read(&interrupt).expect("read failed");

    // Writer queues behind the read hold.
    let lock2 = Arc::clone(&lock);
    let writer = std::thread::spawn(move || {
        let interrupt = Interrupt::new();
        lock2.acquire_write(&interrupt).expect("write failed");
        lock2.release_write().expect("release failed");
    });
    std::thread::sleep(Duration::from_millis(20));

    // A stream of new readers all time out behind the queued writer.
    for _ in 0..3 {
        let lock3 = Arc::clone(&lock);
        let outcome = std::thread::spawn(move || {
            let interrupt = Interrupt::new();
            lock3.acquire_read_for(&interrupt, Duration::from_millis(10))
        })
        .join()
        .expect("thread panicked");
        assert!(outcome.expect_err("reader must queue").is_timed_out());
    }

    // Releasing the original read hold admits the writer.
    lock.release_read().expect("release failed");
    writer.join().expect("writer panicked");
}
