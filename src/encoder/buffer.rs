use super::error::EncodeError;
use super::format::EncoderFormat;
use crate::domain::Trace;
use bytes::{BufMut, Bytes, BytesMut};

pub(crate) const INITIAL_CAPACITY: usize = 4 * 1024; // 4KB
// Buffers that grew past this are dropped on reset instead of being kept around
pub(crate) const MAX_RETAINED_CAPACITY: usize = 4 * 1024 * 1024; // 4MB

/// A reusable serialization buffer bound to one wire format.
#[derive(Debug)]
pub struct Encoder {
    id: usize,
    format: EncoderFormat,
    buf: BytesMut,
    encoded_len: usize,
}

impl Encoder {
    pub fn new(id: usize, format: EncoderFormat) -> Self {
        Self {
            id,
            format,
            buf: BytesMut::with_capacity(INITIAL_CAPACITY),
            encoded_len: 0,
        }
    }

    /// Placeholder that owns no allocation.
    pub(crate) fn detached(format: EncoderFormat) -> Self {
        Self {
            id: usize::MAX,
            format,
            buf: BytesMut::new(),
            encoded_len: 0,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn format(&self) -> EncoderFormat {
        self.format
    }

    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }

    /// Serializes `traces` and hands back the encoded stream.
    ///
    /// The returned `Bytes` shares the encoder's allocation; once it is dropped
    /// a later `reset` reclaims the space instead of allocating again.
    pub fn encode(&mut self, traces: &[Trace]) -> Result<Bytes, EncodeError> {
        if self.format == EncoderFormat::Json {
            check_finite_metrics(traces)?;
        }

        self.buf.clear();
        let mut writer = (&mut self.buf).writer();

        match self.format {
            EncoderFormat::Msgpack => rmp_serde::encode::write_named(&mut writer, traces)?,
            EncoderFormat::Json => serde_json::to_writer(&mut writer, traces)?,
        }

        self.encoded_len = self.buf.len();
        Ok(self.buf.split().freeze())
    }

    /// Size of the last encoded payload.
    pub fn len(&self) -> usize {
        self.encoded_len
    }

    pub fn is_empty(&self) -> bool {
        self.encoded_len == 0
    }

    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    pub fn reset(&mut self) {
        self.buf.clear();

        if self.encoded_len > MAX_RETAINED_CAPACITY || self.buf.capacity() > MAX_RETAINED_CAPACITY
        {
            self.buf = BytesMut::with_capacity(INITIAL_CAPACITY);
        } else {
            self.buf.reserve(self.encoded_len.max(INITIAL_CAPACITY));
        }

        self.encoded_len = 0;
    }
}

// serde_json writes NaN and infinities as `null`
fn check_finite_metrics(traces: &[Trace]) -> Result<(), EncodeError> {
    let non_finite = traces
        .iter()
        .flatten()
        .flat_map(|span| &span.metrics)
        .find(|(_, value)| !value.is_finite());

    match non_finite {
        Some((key, value)) => Err(EncodeError::NonFiniteMetric {
            key: key.clone(),
            value: *value,
        }),
        None => Ok(()),
    }
}
