//! Port-level timing semantics, exercised end to end through a mock handle.
//!
//! The mock honors the installed comm-timeout configuration in miniature, so
//! these tests pin down the operational contract — when a read returns early,
//! when it waits out a deadline, how a write timeout surfaces — without any
//! hardware. Wall-clock assertions only bound from below (plus a generous
//! upper bound) to stay robust on loaded CI machines.

use comport::{MockHandle, Port, PortError, Timeouts};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn mock_port() -> Port<MockHandle> {
    Port::from_handle(MockHandle::new("MOCK0"))
}

#[test]
fn read_total_deadline_yields_zero_bytes_without_error() {
    let port = mock_port();
    let timeouts = Timeouts::default().with_read_total(Duration::from_millis(100));

    let started = Instant::now();
    let mut buf = [0u8; 8];
    let n = port.read_with_timeouts(&mut buf, timeouts).unwrap();
    let elapsed = started.elapsed();

    assert_eq!(n, 0, "no data arrived, so the read reports zero bytes");
    assert!(elapsed >= Duration::from_millis(100), "returned at {elapsed:?}");
    assert!(elapsed < Duration::from_secs(2), "waited far too long: {elapsed:?}");
}

#[test]
fn buffered_data_returns_immediately() {
    let port = mock_port();
    port.handle().enqueue_read(b"already here");

    let timeouts = Timeouts::default().with_read_total(Duration::from_secs(5));
    let started = Instant::now();
    let mut buf = [0u8; 32];
    let n = port.read_with_timeouts(&mut buf, timeouts).unwrap();

    assert_eq!(&buf[..n], b"already here");
    assert!(
        started.elapsed() < Duration::from_secs(1),
        "a buffered read must not wait for the total deadline"
    );
}

#[test]
fn intercharacter_gap_completes_a_trickling_read() {
    let port = mock_port();
    let feeder = port.handle().clone();

    const DATA_LEN: usize = 10;
    let writer = thread::spawn(move || {
        for byte in 0..DATA_LEN as u8 {
            feeder.enqueue_read(&[byte]);
            thread::sleep(Duration::from_millis(10));
        }
    });

    // The buffer is larger than the data, so only the intercharacter gap can
    // finish the read — well before the 5s total deadline.
    let timeouts = Timeouts::default()
        .with_read_intercharacter(Duration::from_millis(80))
        .with_read_total(Duration::from_secs(5));

    let started = Instant::now();
    let mut buf = [0u8; DATA_LEN + 1];
    let n = port.read_with_timeouts(&mut buf, timeouts).unwrap();
    let elapsed = started.elapsed();
    writer.join().unwrap();

    assert_eq!(n, DATA_LEN);
    assert!(
        elapsed < Duration::from_secs(2),
        "completed via the gap timer, not the total deadline: {elapsed:?}"
    );
}

#[test]
fn write_timeout_surfaces_partial_count_after_the_deadline() {
    let port = mock_port();
    port.handle().set_write_capacity(64);

    let data = vec![0u8; 65];
    let timeouts = Timeouts::default().with_write_total(Duration::from_millis(150));

    let started = Instant::now();
    let result = port.write_with_timeouts(&data, timeouts);
    let elapsed = started.elapsed();

    match result {
        Err(PortError::WriteTimeout { written, limit }) => {
            assert_eq!(written, 64);
            assert_eq!(limit, Duration::from_millis(150));
        }
        other => panic!("expected WriteTimeout, got {other:?}"),
    }
    assert!(elapsed >= Duration::from_millis(150), "returned at {elapsed:?}");
}

#[test]
fn close_unblocks_a_reader_with_a_system_error() {
    let port = Arc::new(mock_port());

    let reader = {
        let port = Arc::clone(&port);
        thread::spawn(move || {
            let timeouts = Timeouts::default().with_read_total(Duration::from_secs(30));
            let mut buf = [0u8; 4];
            port.read_with_timeouts(&mut buf, timeouts)
        })
    };

    thread::sleep(Duration::from_millis(50));
    port.close().unwrap();

    let started = Instant::now();
    let result = reader.join().unwrap();
    assert!(
        matches!(result, Err(PortError::Io(_))),
        "a preempted read reports a system error, got {result:?}"
    );
    assert!(
        started.elapsed() < Duration::from_secs(5),
        "the blocked read must return soon after close, not at its deadline"
    );
}

#[test]
fn purge_discards_pending_receive_data() {
    let port = mock_port();
    port.handle().enqueue_read(b"stale bytes");

    port.purge_buffers(true, true).unwrap();

    let timeouts = Timeouts::default().with_read_total(Duration::from_millis(30));
    let mut buf = [0u8; 16];
    let n = port.read_with_timeouts(&mut buf, timeouts).unwrap();
    assert_eq!(n, 0, "nothing new arrived since the purge");
}

#[test]
fn zero_read_total_removes_the_deadline() {
    let port = mock_port();
    let feeder = port.handle().clone();

    let writer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(150));
        feeder.enqueue_read(b"late");
    });

    // With no total deadline the read waits for data that arrives well after
    // the default 100ms would have expired.
    let timeouts = Timeouts::default().with_read_total(Duration::ZERO);
    let mut buf = [0u8; 8];
    let n = port.read_with_timeouts(&mut buf, timeouts).unwrap();
    writer.join().unwrap();

    assert_eq!(&buf[..n], b"late");
}
