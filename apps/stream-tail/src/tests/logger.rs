// Unit tests for logger initialization

use crate::logger::{LOG_FILE_NAME, build_dispatch, initialize, level_for};

use std::path::PathBuf;

use log::LevelFilter;
use tempfile::TempDir;

/// **VALUE**: Verifies that calling initialize() multiple times doesn't panic or fail.
///
/// **WHY THIS MATTERS**: fern panics if a global logger is set twice; a second call from a
/// test or a retry path must be harmless.
///
/// **BUG THIS CATCHES**: Would catch if the Once or AtomicBool guards are removed.
#[test]
fn given_logger_initialized_when_called_again_then_returns_ok() {
    // GIVEN: A writable log directory
    let dir = TempDir::new().unwrap();

    // WHEN: Calling initialize twice
    let first = initialize(dir.path(), LevelFilter::Info);
    let second = initialize(dir.path(), LevelFilter::Info);

    // THEN: Both return Ok
    assert!(first.is_ok(), "First initialization should succeed");
    assert!(second.is_ok(), "Second initialization should be a no-op");
}

/// **VALUE**: Verifies an unusable log directory is a clear error, not a panic.
///
/// **WHY THIS MATTERS**: `--log-dir` comes from the user; a typo must not crash startup.
///
/// **BUG THIS CATCHES**: Would catch `fern::log_file()` being unwrapped.
#[test]
fn given_invalid_log_dir_when_dispatch_built_then_returns_error() {
    let invalid_dir = PathBuf::from("/dev/null/invalid-path");

    let result = build_dispatch(&invalid_dir, LevelFilter::Info);

    let Err(err) = result else {
        panic!("Should return error for invalid log directory");
    };
    assert!(err.to_string().contains(LOG_FILE_NAME));
}

/// **VALUE**: Verifies `--verbose` raises the level to trace.
///
/// **WHY THIS MATTERS**: Frame-level logs are only emitted at trace.
///
/// **BUG THIS CATCHES**: Would catch the flag being ignored.
#[test]
fn given_verbose_when_level_chosen_then_trace() {
    assert_eq!(level_for(true), LevelFilter::Trace);
    assert!(level_for(false) < LevelFilter::Trace);
}
