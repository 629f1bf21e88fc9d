//! Scripted platform double for notifier/launcher tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{Platform, ToastOutcome};
use crate::AppError;

#[derive(Default)]
pub struct MockPlatform {
    /// Counts passed to `show_toast`, in call order.
    pub shows: Mutex<Vec<usize>>,
    /// Scripted outcomes; an unscripted show stays pending like a toast
    /// nobody touches.
    pub outcomes: Mutex<VecDeque<ToastOutcome>>,
    pub cleared: AtomicUsize,
    /// Urls passed to `open_url`, in call order.
    pub opened: Mutex<Vec<String>>,
    /// When set, `show_toast` parks until `open_gate` is called.
    gated: AtomicBool,
    gate_release: tokio::sync::Notify,
    /// When set, `open_url` parks until `open_release` is notified.
    pub block_open: AtomicBool,
    pub open_release: tokio::sync::Notify,
}

impl MockPlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script(&self, outcome: ToastOutcome) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn gate(&self) {
        self.gated.store(true, Ordering::SeqCst);
    }

    /// Let exactly one gated show proceed to its scripted outcome.
    pub fn open_gate(&self) {
        self.gate_release.notify_one();
    }
}

#[async_trait::async_trait]
impl Platform for MockPlatform {
    fn machine_name(&self) -> String {
        "mock-host".to_string()
    }

    fn user_name(&self) -> String {
        "mock-user".to_string()
    }

    fn os_user_id(&self) -> String {
        "42".to_string()
    }

    fn domain_user_guid(&self) -> Option<String> {
        None
    }

    async fn show_toast(&self, count: usize) -> Result<ToastOutcome, AppError> {
        self.shows.lock().unwrap().push(count);
        if self.gated.load(Ordering::SeqCst) {
            self.gate_release.notified().await;
        }
        let next = self.outcomes.lock().unwrap().pop_front();
        match next {
            Some(outcome) => Ok(outcome),
            None => std::future::pending().await,
        }
    }

    async fn clear_toast(&self) {
        self.cleared.fetch_add(1, Ordering::SeqCst);
    }

    async fn open_url(&self, url: &str) -> Result<(), AppError> {
        self.opened.lock().unwrap().push(url.to_string());
        if self.block_open.load(Ordering::SeqCst) {
            self.open_release.notified().await;
        }
        Ok(())
    }
}

/// Poll `cond` for up to two seconds.
pub async fn eventually<F: Fn() -> bool>(cond: F) -> bool {
    let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    false
}
