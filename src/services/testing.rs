//! Fakes shared by service tests.

use anyhow::Result;
use async_trait::async_trait;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;

use crate::clients::{PasswordChanger, SempError};
use crate::constants::storage::TARGET_PREFIX;
use crate::db::{KvStore, MemoryKvStore};
use crate::models::Target;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeReply {
    Accept,
    Reject(&'static str),
    Unreachable,
}

/// Programmable stand-in for a broker.
pub struct FakeChanger {
    reply: Mutex<FakeReply>,
    delay: Duration,
    calls: Mutex<Vec<(String, String)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeChanger {
    pub fn new(reply: FakeReply) -> Self {
        Self::with_delay(reply, Duration::ZERO)
    }

    pub fn with_delay(reply: FakeReply, delay: Duration) -> Self {
        Self {
            reply: Mutex::new(reply),
            delay,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn set_reply(&self, reply: FakeReply) {
        *self.reply.lock().unwrap() = reply;
    }

    /// `(remote_username, new_password)` for every call, in order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PasswordChanger for FakeChanger {
    async fn change_password(
        &self,
        target: &Target,
        username: &str,
        new_password: &str,
    ) -> Result<(), SempError> {
        self.calls
            .lock()
            .unwrap()
            .push((username.to_string(), new_password.to_string()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let reply = *self.reply.lock().unwrap();
        match reply {
            FakeReply::Accept => Ok(()),
            FakeReply::Reject(message) => Err(SempError::Rejected {
                code: Some("fail".to_string()),
                message: message.to_string(),
            }),
            FakeReply::Unreachable => Err(SempError::Transport {
                url: format!("{}/SEMP", target.semp_url),
                detail: "connection refused".to_string(),
            }),
        }
    }
}

/// Memory store whose writes can be made to fail and whose target reads can
/// be slowed down.
#[derive(Default)]
pub struct FlakyKvStore {
    inner: MemoryKvStore,
    fail_puts: AtomicBool,
    target_read_delay: Mutex<Duration>,
}

impl FlakyKvStore {
    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    pub fn slow_target_reads(&self, delay: Duration) {
        *self.target_read_delay.lock().unwrap() = delay;
    }
}

#[async_trait]
impl KvStore for FlakyKvStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let delay = *self.target_read_delay.lock().unwrap();
        if key.starts_with(TARGET_PREFIX) && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        if self.fail_puts.load(Ordering::SeqCst) {
            anyhow::bail!("disk full");
        }
        self.inner.put(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.inner.delete(key).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        self.inner.list(prefix).await
    }
}

/// Collects formatted log output for assertions.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Installs a subscriber for the current thread. Keep the guard alive for
    /// the duration of the test.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

pub fn sample_target(url: &str) -> Target {
    Target {
        semp_url: url.to_string(),
        admin_username: "admin".to_string(),
        admin_password: "adminpass".to_string(),
        semp_version: Some("soltr/10_4".to_string()),
        tls_skip_verify: false,
    }
}
