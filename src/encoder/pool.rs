//! Fixed-size pool of reusable encoders.
//!
//! Encoding allocates buffers that are then resized, so a send borrows one of
//! a bounded set of encoders instead of allocating. Borrowing waits while every
//! encoder is lent out; no overflow encoders are ever created, so memory stays
//! bounded by the pool capacity.

use super::buffer::Encoder;
use super::error::EncodeError;
use super::format::EncoderFormat;
use parking_lot::Mutex;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStats {
    pub capacity: usize,
    pub idle: usize,
    pub borrowed: u64,
    pub returned: u64,
}

#[derive(Debug)]
struct PoolInner {
    format: EncoderFormat,
    capacity: usize,
    idle: Mutex<Vec<Encoder>>,
    // One permit per idle encoder
    available: Arc<Semaphore>,
    borrowed: AtomicU64,
    returned: AtomicU64,
}

#[derive(Debug, Clone)]
pub struct EncoderPool {
    inner: Arc<PoolInner>,
}

impl EncoderPool {
    pub fn new(format: EncoderFormat, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let encoders = (0..capacity).map(|id| Encoder::new(id, format)).collect();

        Self {
            inner: Arc::new(PoolInner {
                format,
                capacity,
                idle: Mutex::new(encoders),
                available: Arc::new(Semaphore::new(capacity)),
                borrowed: AtomicU64::new(0),
                returned: AtomicU64::new(0),
            }),
        }
    }

    /// Builds a pool from a format name such as `"msgpack"` or `"json"`.
    pub fn from_name(format: &str, capacity: usize) -> Result<Self, EncodeError> {
        Ok(Self::new(format.parse()?, capacity))
    }

    pub fn format(&self) -> EncoderFormat {
        self.inner.format
    }

    pub fn content_type(&self) -> &'static str {
        self.inner.format.content_type()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Takes an idle encoder, waiting until one is returned if all are lent out.
    pub async fn borrow(&self) -> Result<PooledEncoder, EncodeError> {
        let permit = Arc::clone(&self.inner.available)
            .acquire_owned()
            .await
            .map_err(|_| EncodeError::PoolClosed)?;
        self.checkout(permit)
    }

    /// Takes an idle encoder without waiting.
    pub fn try_borrow(&self) -> Option<PooledEncoder> {
        let permit = Arc::clone(&self.inner.available).try_acquire_owned().ok()?;
        self.checkout(permit).ok()
    }

    fn checkout(&self, permit: OwnedSemaphorePermit) -> Result<PooledEncoder, EncodeError> {
        // A permit is only released after its encoder is back in `idle`
        let encoder = self.inner.idle.lock().pop().ok_or(EncodeError::PoolClosed)?;
        self.inner.borrowed.fetch_add(1, Ordering::Relaxed);

        Ok(PooledEncoder {
            encoder,
            pool: Arc::clone(&self.inner),
            _permit: permit,
        })
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            capacity: self.inner.capacity,
            idle: self.inner.idle.lock().len(),
            borrowed: self.inner.borrowed.load(Ordering::Relaxed),
            returned: self.inner.returned.load(Ordering::Relaxed),
        }
    }
}

/// An encoder on loan from an [`EncoderPool`].
///
/// Dropping the guard resets the encoder and hands it back, so every exit
/// path of a send returns exactly what it borrowed.
#[derive(Debug)]
pub struct PooledEncoder {
    encoder: Encoder,
    pool: Arc<PoolInner>,
    // Dropped after `Drop::drop` has pushed the encoder back
    _permit: OwnedSemaphorePermit,
}

impl Deref for PooledEncoder {
    type Target = Encoder;

    fn deref(&self) -> &Self::Target {
        &self.encoder
    }
}

impl DerefMut for PooledEncoder {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.encoder
    }
}

impl Drop for PooledEncoder {
    fn drop(&mut self) {
        let mut encoder =
            std::mem::replace(&mut self.encoder, Encoder::detached(self.pool.format));
        encoder.reset();
        self.pool.idle.lock().push(encoder);
        self.pool.returned.fetch_add(1, Ordering::Relaxed);
    }
}
