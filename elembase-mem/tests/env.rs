#![allow(dead_code)]

use std::{cell::RefCell, sync::Once};

// records are kept per thread, since each test runs in its own thread
thread_local! {
    static RECORDS: RefCell<Vec<(log::Level, String)>> = RefCell::new(vec![]);
}

struct CaptureLogger;

impl log::Log for CaptureLogger {
    fn enabled(&self, _: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        RECORDS.with(|records| {
            records
                .borrow_mut()
                .push((record.level(), record.args().to_string()))
        });
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static INIT: Once = Once::new();

pub fn init() {
    INIT.call_once(|| {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(log::LevelFilter::Trace);
    });
}

/// Take the log records of the current thread.
pub fn take_logs() -> Vec<(log::Level, String)> {
    RECORDS.with(|records| std::mem::take(&mut *records.borrow_mut()))
}
