//! Warnings emitted by `swap_interval`.
//!
//! Runs in its own test binary so the capturing logger below is the only
//! logger installed in the process.

use kms_context::display::{ContextDriver, KmsContext};
use kms_context::platform::{Frontend, HeadlessBackend, HeadlessEgl};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::{Mutex, Once};

struct CapturingLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for CapturingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.target().starts_with("kms_context")
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Ok(mut records) = self.records.lock() {
            records.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static LOGGER: CapturingLogger = CapturingLogger {
    records: Mutex::new(Vec::new()),
};
static INSTALL: Once = Once::new();

fn install_logger() {
    INSTALL.call_once(|| {
        log::set_logger(&LOGGER).expect("no other logger is installed in this binary");
        log::set_max_level(LevelFilter::Trace);
    });
}

/// Drain captured records and count the warnings among them.
fn take_warnings() -> usize {
    let mut records = LOGGER.records.lock().unwrap();
    let warnings = records
        .iter()
        .filter(|(level, _)| *level == Level::Warn)
        .count();
    records.clear();
    warnings
}

struct QuietFrontend;

impl Frontend for QuietFrontend {
    fn install_signal_handler(&self) {}

    fn shutdown_requested(&self) -> bool {
        false
    }

    fn video_driver_ident(&self) -> &str {
        "gl"
    }

    fn input_driver_name(&self) -> &str {
        "udev"
    }
}

#[test]
fn it_should_warn_only_for_swap_intervals_above_one() {
    install_logger();
    let mut driver = KmsContext::init(
        HeadlessBackend::new(),
        HeadlessEgl::new(),
        Box::new(QuietFrontend),
    )
    .unwrap();
    take_warnings();

    for (requested, expected_warnings) in [(0, 0), (1, 0), (2, 1), (100, 1), (-1, 0)] {
        driver.swap_interval(requested);
        assert_eq!(
            take_warnings(),
            expected_warnings,
            "warnings for swap interval {}",
            requested
        );
    }

    driver.swap_interval(2);
    let records = LOGGER.records.lock().unwrap();
    assert!(
        records
            .iter()
            .any(|(_, message)| message.contains("Swap intervals > 1 currently not supported")),
        "unexpected records: {:?}",
        *records
    );
}
