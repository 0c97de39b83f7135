//! Clipboard access with bounded retries.
//!
//! System clipboards are shared with other processes and may be briefly
//! locked. Every access goes through [`RetryPolicy`]: one immediate attempt,
//! a retry after a short delay, then a final attempt.

use anyhow::{anyhow, Result};
use std::time::Duration;

/// Where copied text goes
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<()>;
    fn get_text(&mut self) -> Result<String>;
}

// =============================================================================
// SystemClipboard
// =============================================================================

/// The OS clipboard, opened lazily
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&mut self) -> Result<&mut arboard::Clipboard> {
        if self.inner.is_none() {
            self.inner = Some(
                arboard::Clipboard::new().map_err(|e| anyhow!("failed to open clipboard: {e}"))?,
            );
        }
        self.inner
            .as_mut()
            .ok_or_else(|| anyhow!("clipboard unavailable"))
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.handle()?
            .set_text(text.to_owned())
            .map_err(|e| anyhow!("failed to write clipboard: {e}"))
    }

    fn get_text(&mut self) -> Result<String> {
        self.handle()?
            .get_text()
            .map_err(|e| anyhow!("failed to read clipboard: {e}"))
    }
}

// =============================================================================
// MemoryClipboard
// =============================================================================

/// In-process clipboard, optionally failing a number of times first
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    text: Option<String>,
    failures_left: usize,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard whose next `n` accesses fail
    pub fn failing(n: usize) -> Self {
        Self {
            text: None,
            failures_left: n,
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.text.clone()
    }

    fn check(&mut self) -> Result<()> {
        if self.failures_left > 0 {
            self.failures_left -= 1;
            return Err(anyhow!("clipboard busy"));
        }
        Ok(())
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.check()?;
        self.text = Some(text.to_owned());
        Ok(())
    }

    fn get_text(&mut self) -> Result<String> {
        self.check()?;
        self.text.clone().ok_or_else(|| anyhow!("clipboard is empty"))
    }
}

// =============================================================================
// RetryPolicy
// =============================================================================

/// How often and how patiently to retry a clipboard access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: usize,
    /// Sleep before the second attempt
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// No sleeping, for tests and headless use
    pub fn immediate(attempts: usize) -> Self {
        Self {
            attempts,
            delay: Duration::ZERO,
        }
    }

    /// Run `op` until it succeeds or the attempts are used up.
    pub fn run<T>(&self, what: &str, mut op: impl FnMut() -> Result<T>) -> Result<T> {
        let attempts = self.attempts.max(1);
        let mut last_err = None;
        for attempt in 1..=attempts {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) => {
                    tracing::warn!("{what} failed (attempt {attempt}/{attempts}): {e:#}");
                    last_err = Some(e);
                    if attempt == 1 && attempts > 2 && !self.delay.is_zero() {
                        std::thread::sleep(self.delay);
                    }
                }
            }
        }
        Err(last_err.unwrap_or_else(|| anyhow!("{what} failed")))
    }
}
