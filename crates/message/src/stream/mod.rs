//! Lifecycle-aware byte streams.
//!
//! A [`Stream`] owns a [`Resource`] and exposes read, write and seek operations
//! whose availability is derived once from the resource's [`AccessMode`]. Unlike
//! the message types, a stream is mutated in place.
//!
//! # Lifecycle
//!
//! ```text
//!            detach()
//!   Open ──────────────▶ Detached
//!     │
//!     │ close() / drop
//!     ▼
//!   Closed
//! ```
//!
//! Once a stream has left the open state every I/O operation fails with an
//! I/O error, the capability flags read false and [`Stream::size`] is `None`.
//! [`Stream::detach`] hands the resource back to the caller the first time and
//! returns `None` afterwards.

mod body;
mod resource;

pub use body::Body;
pub use resource::AccessMode;
pub use resource::Backing;
pub use resource::OpenKind;
pub use resource::Resource;
pub use resource::StreamMetadata;

use std::io::{Read, Seek, SeekFrom, Write};
use std::mem;
use std::path::PathBuf;

use bytes::Bytes;
use tracing::{trace, warn};

use crate::utils::ensure;
use crate::{MessageError, Result};

/// Describes where a new stream gets its resource from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamSource {
    /// An in-memory stream holding the given content.
    Text(String),
    /// A file opened with the given access mode.
    File { path: PathBuf, mode: AccessMode },
}

#[derive(Debug)]
enum StreamState {
    Open(Resource),
    Detached,
    Closed,
}

/// A byte stream over an owned resource.
#[derive(Debug)]
pub struct Stream {
    state: StreamState,
    size: Option<u64>,
    readable: bool,
    writable: bool,
    seekable: bool,
}

impl Stream {
    /// Creates a stream from an explicit source.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be opened or measured.
    pub fn new(source: StreamSource) -> Result<Self> {
        match source {
            StreamSource::Text(content) => Ok(Self::from_text(content)),
            StreamSource::File { path, mode } => Self::open(path, mode),
        }
    }

    /// Creates a readable, writable and seekable in-memory stream positioned at 0.
    pub fn from_text(content: impl Into<String>) -> Self {
        let content: String = content.into();
        let size = content.len() as u64;
        let resource = Resource::memory(content.into_bytes());
        let mode = resource.mode();
        Self {
            state: StreamState::Open(resource),
            size: Some(size),
            readable: mode.is_readable(),
            writable: mode.is_writable(),
            seekable: true,
        }
    }

    /// Opens the file at `path`.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be opened with `mode`.
    pub fn open(path: impl Into<PathBuf>, mode: AccessMode) -> Result<Self> {
        let resource = Resource::open(path.into(), mode)?;
        Self::from_resource(resource)
    }

    /// Wraps an existing resource, deriving the capability flags from its access mode.
    ///
    /// # Errors
    ///
    /// Fails when the size of the resource cannot be read.
    pub fn from_resource(resource: Resource) -> Result<Self> {
        let mode = resource.mode();
        let size = resource.len()?;
        Ok(Self {
            readable: mode.is_readable(),
            writable: mode.is_writable(),
            seekable: resource.is_seekable(),
            size: Some(size),
            state: StreamState::Open(resource),
        })
    }

    /// Returns the cached size in bytes, `None` once the stream left the open state.
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn is_readable(&self) -> bool {
        self.readable
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn is_seekable(&self) -> bool {
        self.seekable
    }

    /// True while the stream still owns its resource.
    pub fn is_open(&self) -> bool {
        matches!(self.state, StreamState::Open(_))
    }

    /// Returns the metadata of the open resource.
    pub fn metadata(&self) -> Option<StreamMetadata> {
        match &self.state {
            StreamState::Open(resource) => Some(resource.metadata()),
            StreamState::Detached | StreamState::Closed => None,
        }
    }

    /// Returns the current position of the read/write pointer.
    ///
    /// # Errors
    ///
    /// Fails if the stream is detached or the position cannot be read.
    pub fn position(&mut self) -> Result<u64> {
        let resource = self.resource()?;
        Ok(resource.stream_position()?)
    }

    /// Returns true when the pointer is at or past the end of the stream.
    ///
    /// # Errors
    ///
    /// Fails if the stream is detached.
    pub fn eof(&mut self) -> Result<bool> {
        let resource = self.resource()?;
        let position = resource.stream_position()?;
        Ok(position >= resource.len()?)
    }

    /// Moves the pointer, returning the new position.
    ///
    /// # Errors
    ///
    /// Fails if the stream is detached, not seekable, or the resulting offset is negative.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        ensure!(self.is_open(), MessageError::detached());
        ensure!(self.seekable, MessageError::unsupported("seekable"));
        let resource = self.resource()?;
        Ok(resource.seek(pos)?)
    }

    /// # Errors
    ///
    /// See [`Stream::seek`].
    pub fn rewind(&mut self) -> Result<()> {
        self.seek(SeekFrom::Start(0)).map(|_| ())
    }

    /// Reads up to `length` bytes from the current position.
    ///
    /// Reading nothing at all, either because `length` is zero or the pointer
    /// is at the end, is reported as an error.
    ///
    /// # Errors
    ///
    /// Fails if the stream is detached, not readable, or nothing could be read.
    pub fn read(&mut self, length: usize) -> Result<Bytes> {
        ensure!(self.is_open(), MessageError::detached());
        ensure!(self.readable, MessageError::unsupported("readable"));
        let resource = self.resource()?;

        let mut buf = Vec::new();
        resource.take(length as u64).read_to_end(&mut buf)?;
        ensure!(
            !buf.is_empty(),
            MessageError::io(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "the stream could not be read"))
        );

        trace!(len = buf.len(), "read stream bytes");
        Ok(Bytes::from(buf))
    }

    /// Writes all of `data` at the current position and returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Fails if the stream is detached, not writable, or the write fails.
    pub fn write(&mut self, data: &[u8]) -> Result<usize> {
        ensure!(self.is_open(), MessageError::detached());
        ensure!(self.writable, MessageError::unsupported("writable"));
        let resource = self.resource()?;

        resource.write_all(data)?;
        resource.flush()?;
        let size = resource.len()?;
        self.size = Some(size);

        trace!(len = data.len(), size, "wrote stream bytes");
        Ok(data.len())
    }

    /// Reads everything from the current position to the end.
    ///
    /// # Errors
    ///
    /// Fails if the stream is detached, not readable, or the read fails.
    pub fn contents(&mut self) -> Result<Bytes> {
        ensure!(self.is_open(), MessageError::detached());
        ensure!(self.readable, MessageError::unsupported("readable"));
        let resource = self.resource()?;

        let mut buf = Vec::new();
        resource.read_to_end(&mut buf)?;
        Ok(Bytes::from(buf))
    }

    /// Reads the whole stream as text, leaving the pointer at the start.
    ///
    /// Never fails: any error is logged and turned into an empty string, so the
    /// method can back a `Display` implementation.
    pub fn contents_lossy(&mut self) -> String {
        match self.rewound_contents() {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                warn!(cause = %e, "failed to convert stream into string");
                String::new()
            }
        }
    }

    fn rewound_contents(&mut self) -> Result<Bytes> {
        self.rewind()?;
        let contents = self.contents()?;
        self.rewind()?;
        Ok(contents)
    }

    /// Gives up ownership of the resource and resets the stream.
    ///
    /// Returns `None` when the stream is already detached or closed.
    pub fn detach(&mut self) -> Option<Resource> {
        match mem::replace(&mut self.state, StreamState::Detached) {
            StreamState::Open(resource) => {
                self.reset();
                trace!(backing = ?resource.backing(), "detached stream");
                Some(resource)
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Releases the resource. Calling it again is a no-op.
    pub fn close(&mut self) {
        if let Some(resource) = self.detach() {
            trace!(backing = ?resource.backing(), "closed stream");
            drop(resource);
        }
        self.state = StreamState::Closed;
    }

    fn reset(&mut self) {
        self.size = None;
        self.readable = false;
        self.writable = false;
        self.seekable = false;
    }

    fn resource(&mut self) -> Result<&mut Resource> {
        match &mut self.state {
            StreamState::Open(resource) => Ok(resource),
            StreamState::Detached | StreamState::Closed => Err(MessageError::detached()),
        }
    }
}

impl Drop for Stream {
    fn drop(&mut self) {
        self.close();
    }
}

impl From<String> for Stream {
    fn from(content: String) -> Self {
        Self::from_text(content)
    }
}

impl From<&str> for Stream {
    fn from(content: &str) -> Self {
        Self::from_text(content)
    }
}
