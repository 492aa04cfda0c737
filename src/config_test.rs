use std::sync::{Mutex, MutexGuard, PoisonError};

use super::*;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn lock_env() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// # Safety
/// Callers must hold [`lock_env`] so no other test touches the environment.
unsafe fn clear_env() {
    unsafe {
        std::env::remove_var("GODBOARD_API_URL");
        std::env::remove_var("GODBOARD_TOKEN");
        std::env::remove_var("GODBOARD_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("GODBOARD_CONNECT_TIMEOUT_SECS");
    }
}

#[test]
fn from_env_defaults() {
    let _env = lock_env();
    unsafe { clear_env() };

    let cfg = Config::from_env().unwrap();
    assert_eq!(cfg.api_url, DEFAULT_API_URL);
    assert_eq!(cfg.token, None);
    assert_eq!(cfg.timeouts, Timeouts::default());
}

#[test]
fn from_env_parses_overrides() {
    let _env = lock_env();
    unsafe {
        clear_env();
        std::env::set_var("GODBOARD_API_URL", "https://api.example.test/");
        std::env::set_var("GODBOARD_TOKEN", "tok");
        std::env::set_var("GODBOARD_REQUEST_TIMEOUT_SECS", "42");
        std::env::set_var("GODBOARD_CONNECT_TIMEOUT_SECS", "7");
    }

    let cfg = Config::from_env().unwrap();
    assert_eq!(cfg.api_url, "https://api.example.test");
    assert_eq!(cfg.token.as_deref(), Some("tok"));
    assert_eq!(cfg.timeouts, Timeouts { request_secs: 42, connect_secs: 7 });

    unsafe { clear_env() };
}

#[test]
fn bad_timeouts_fall_back_to_defaults() {
    let _env = lock_env();
    unsafe {
        clear_env();
        std::env::set_var("GODBOARD_REQUEST_TIMEOUT_SECS", "soon");
        std::env::set_var("GODBOARD_CONNECT_TIMEOUT_SECS", "0");
    }

    let cfg = Config::from_env().unwrap();
    assert_eq!(cfg.timeouts, Timeouts::default());

    unsafe { clear_env() };
}

#[test]
fn blank_token_is_ignored() {
    let _env = lock_env();
    unsafe {
        clear_env();
        std::env::set_var("GODBOARD_TOKEN", "  ");
    }

    assert_eq!(Config::from_env().unwrap().token, None);

    unsafe { clear_env() };
}

#[test]
fn rejects_non_http_url() {
    let err = Config::new("ftp://files.example.test", None, Timeouts::default()).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidApiUrl(_)));
}
