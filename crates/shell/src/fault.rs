//! Crash boundary around command handling.
//!
//! A panic in a handler does not take the process down. It is caught,
//! reported to the UI as a [`FaultReport`], and the studio stays faulted
//! until the UI asks for a restart.

use serde::Serialize;
use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::panic::{self, UnwindSafe};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaultReport {
    pub message: String,
    pub trace: String,
}

thread_local! {
    static LAST_TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Record a backtrace for every panic so the report can carry it. Install
/// once at start-up.
pub fn install_panic_hook() {
    panic::set_hook(Box::new(|info| {
        let trace = Backtrace::force_capture().to_string();
        tracing::error!("panic: {info}");
        LAST_TRACE.with(|slot| *slot.borrow_mut() = Some(trace));
    }));
}

/// Run `f`, turning a panic into a [`FaultReport`].
pub fn catch_fault<T>(f: impl FnOnce() -> T + UnwindSafe) -> Result<T, FaultReport> {
    panic::catch_unwind(f).map_err(|payload| {
        let report = FaultReport {
            message: panic_message(payload.as_ref()),
            trace: LAST_TRACE
                .with(|slot| slot.borrow_mut().take())
                .unwrap_or_default(),
        };
        tracing::error!(message = %report.message, "command handler faulted");
        report
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown error".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_passes_through() {
        assert_eq!(catch_fault(|| 7), Ok(7));
    }

    #[test]
    fn test_panic_becomes_report() {
        let result: Result<(), _> = catch_fault(|| panic!("mixer exploded: {}", 3));
        let report = result.expect_err("fault");
        assert_eq!(report.message, "mixer exploded: 3");
    }

    #[test]
    fn test_static_str_payload() {
        let result: Result<(), _> = catch_fault(|| std::panic::panic_any("plain"));
        assert_eq!(result.expect_err("fault").message, "plain");
    }
}
