//! CountdownLatch: waiters are released after exactly N events, and extra
//! events are silent no-ops.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use synckit::{CountdownLatch, Interrupt};

#[test]
fn three_count_downs_release_regardless_of_order() {
    let latch = Arc::new(CountdownLatch::new(3));
    let released = Arc::new(AtomicUsize::new(0));

    let waiters: Vec<_> = (0..3)
        .map(|_| {
            let latch = Arc::clone(&latch);
            let released = Arc::clone(&released);
            std::thread::spawn(move || {
                latch.wait(&Interrupt::new()).expect("wait failed");
                released.fetch_add(1, Ordering::SeqCst);
            })
        })
        .collect();

    // Count down from three different threads, in whatever order the
    // scheduler picks.
    let counters: Vec<_> = (0..3)
        .map(|_| {
            let latch = Arc::clone(&latch);
            std::thread::spawn(move || latch.count_down())
        })
        .collect();
    for counter in counters {
        counter.join().expect("thread panicked");
    }

    for waiter in waiters {
        waiter.join().expect("thread panicked");
    }
    assert_eq!(released.load(Ordering::SeqCst), 3);
    assert!(latch.is_released());
}

#[test]
fn fourth_count_down_is_silent() {
    let latch = CountdownLatch::new(3);
    latch.count_down();
    latch.count_down();
    latch.count_down();
    latch.count_down();
    assert_eq!(latch.count(), 0);
    latch
        .wait(&Interrupt::new())
        .expect("released latch must not block");
}

#[test]
fn wait_does_not_return_early() {
    let latch = Arc::new(CountdownLatch::new(3));

    let latch2 = Arc::clone(&latch);
    let waiter = std::thread::spawn(move || latch2.wait(&Interrupt::new()));

    latch.count_down();
    latch.count_down();
    std::thread::sleep(Duration::from_millis(20));
    assert!(
        !waiter.is_finished(),
        "waiter returned after only 2 of 3 events"
    );

    latch.count_down();
    waiter
        .join()
        .expect("thread panicked")
        .expect("wait should succeed");
}

#[test]
fn late_waiters_pass_straight_through() {
    let latch = CountdownLatch::new(1);
    latch.count_down();
    for _ in 0..3 {
        latch
            .wait_for(&Interrupt::new(), Duration::from_millis(5))
            .expect("released latch must not block");
    }
}
