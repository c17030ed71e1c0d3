//! The requester must not leak sockets across calls.
//!
//! Kept in its own test binary so no concurrently running test opens or
//! closes descriptors while they are being counted.

#![cfg(target_os = "linux")]

mod helpers;

use helpers::{ReplyServer, silent_server};
use msfs_simvar_requester::{RequesterConfig, TelemetryRequester};
use std::time::Duration;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn open_descriptors() -> std::io::Result<usize> {
    Ok(std::fs::read_dir("/proc/self/fd")?.count())
}

#[test]
fn test_mixed_calls_release_every_socket() -> TestResult {
    let baseline = open_descriptors()?;

    {
        let good = ReplyServer::spawn(b"250.5".to_vec(), 10)?;
        let bad = ReplyServer::spawn(b"garbage".to_vec(), 10)?;
        let (silent, silent_endpoint) = silent_server()?;

        let fast = |endpoint| {
            TelemetryRequester::new(
                RequesterConfig::default()
                    .with_endpoint(endpoint)
                    .with_receive_timeout(Duration::from_millis(50)),
            )
        };
        let good_requester = fast(good.endpoint);
        let bad_requester = fast(bad.endpoint);
        let silent_requester = fast(silent_endpoint);

        for _ in 0..10 {
            assert!(good_requester.try_fetch("AIRSPEED_INDICATED").is_ok());
            assert!(bad_requester.try_fetch("AIRSPEED_INDICATED").is_err());
            assert!(silent_requester.try_fetch("AIRSPEED_INDICATED").is_err());
        }

        good.finish();
        bad.finish();
        drop(silent);
    }

    assert_eq!(
        open_descriptors()?,
        baseline,
        "descriptor count changed after 30 exchanges"
    );
    Ok(())
}
