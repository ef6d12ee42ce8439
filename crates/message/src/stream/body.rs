use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use triomphe::Arc;

use crate::stream::Stream;

/// A message body: a [`Stream`] shared between the copies of a message.
///
/// Cloning a `Body` does not copy the stream. Every copy of a message produced
/// by a `with_*` method points at the same stream until the body is replaced,
/// so reads and writes through one copy are visible through the others.
#[derive(Debug, Clone)]
pub struct Body {
    inner: Arc<Mutex<Stream>>,
}

impl Body {
    pub fn new(stream: Stream) -> Self {
        Self { inner: Arc::new(Mutex::new(stream)) }
    }

    /// An empty in-memory body.
    pub fn empty() -> Self {
        Self::new(Stream::from_text(""))
    }

    /// Locks the underlying stream for exclusive use.
    ///
    /// A panic while the lock was held does not make the stream unusable: the
    /// guard is recovered from the poisoned lock.
    pub fn lock(&self) -> MutexGuard<'_, Stream> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_seekable(&self) -> bool {
        self.lock().is_seekable()
    }

    pub fn size(&self) -> Option<u64> {
        self.lock().size()
    }

    /// Returns true when both bodies share the same stream.
    pub fn ptr_eq(this: &Body, other: &Body) -> bool {
        Arc::ptr_eq(&this.inner, &other.inner)
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Stream> for Body {
    fn from(stream: Stream) -> Self {
        Self::new(stream)
    }
}

/// Renders the whole stream, see [`Stream::contents_lossy`].
impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lock().contents_lossy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_stream() {
        let body = Body::new(Stream::from_text("shared"));
        let copy = body.clone();
        assert!(Body::ptr_eq(&body, &copy));

        copy.lock().read(3).unwrap();
        assert_eq!(body.lock().position().unwrap(), 3);
    }

    #[test]
    fn display_reads_everything() {
        let body = Body::from(Stream::from_text("hello body"));
        body.lock().read(5).unwrap();
        assert_eq!(body.to_string(), "hello body");
        assert_eq!(body.size(), Some(10));
    }

    #[test]
    fn display_of_closed_body_is_empty() {
        let body = Body::empty();
        body.lock().close();
        assert_eq!(body.to_string(), "");
        assert!(!body.is_seekable());
    }
}
