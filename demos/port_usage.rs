//! Demonstrates the timeout model against a mock handle and, when a port
//! name is given on the command line, against real hardware.
//!
//! ```bash
//! cargo run --example port_usage            # mock only
//! cargo run --example port_usage -- COM3    # also exercise a real port
//! ```

use comport::{MockHandle, OpenOptions, Port, PortError, Timeouts};
use std::time::{Duration, Instant};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "comport=debug".into()),
        )
        .init();

    println!("=== Timeout model on a mock handle ===");
    mock_example()?;

    if let Some(port_name) = std::env::args().nth(1) {
        println!("\n=== Timeout model on {port_name} ===");
        real_port_example(&port_name)?;
    } else {
        println!("\nPass a port name (e.g. COM3) to exercise real hardware.");
    }

    Ok(())
}

fn mock_example() -> Result<(), PortError> {
    let handle = MockHandle::new("MOCK0");
    handle.enqueue_read(b"hello from the mock\n");
    let port = Port::from_handle(handle);

    // Buffered data returns immediately, long before the total deadline.
    let timeouts = Timeouts::default().with_read_total(Duration::from_secs(5));
    let mut buf = [0u8; 64];
    let n = port.read_with_timeouts(&mut buf, timeouts)?;
    println!("  read {} bytes: {:?}", n, String::from_utf8_lossy(&buf[..n]).trim());

    // An empty queue waits out the read-total deadline and reports zero
    // bytes, which is a normal outcome rather than an error.
    let timeouts = Timeouts::default().with_read_total(Duration::from_millis(200));
    let started = Instant::now();
    let n = port.read_with_timeouts(&mut buf, timeouts)?;
    println!("  read {} bytes after {:?} (deadline, no error)", n, started.elapsed());

    port.close()?;
    Ok(())
}

fn real_port_example(port_name: &str) -> Result<(), PortError> {
    let port = Port::open(port_name, OpenOptions::default())?;

    let timeouts = Timeouts::default()
        .with_read_intercharacter(Duration::from_millis(50))
        .with_read_total(Duration::from_secs(2));

    let started = Instant::now();
    let mut buf = [0u8; 256];
    let n = port.read_with_timeouts(&mut buf, timeouts)?;
    println!("  read {} bytes in {:?}", n, started.elapsed());

    match port.write_with_timeouts(b"ping\r\n", Timeouts::default()) {
        Ok(n) => println!("  wrote {n} bytes"),
        Err(PortError::WriteTimeout { written, limit }) => {
            println!("  write hit its {limit:?} deadline after {written} bytes")
        }
        Err(e) => return Err(e),
    }

    port.close()?;
    Ok(())
}
