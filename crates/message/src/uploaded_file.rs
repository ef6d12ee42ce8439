//! Files received through a form upload.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};
use triomphe::Arc;

use crate::stream::{AccessMode, Body, Stream};
use crate::utils::ensure;
use crate::{MessageError, Result};

/// Outcome of an upload as reported by the server, with the standard numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum UploadError {
    Ok = 0,
    IniSize = 1,
    FormSize = 2,
    Partial = 3,
    NoFile = 4,
    NoTmpDir = 6,
    CantWrite = 7,
    Extension = 8,
}

impl UploadError {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_ok(self) -> bool {
        self == UploadError::Ok
    }
}

impl TryFrom<i64> for UploadError {
    type Error = MessageError;

    fn try_from(code: i64) -> Result<Self> {
        let error = match code {
            0 => UploadError::Ok,
            1 => UploadError::IniSize,
            2 => UploadError::FormSize,
            3 => UploadError::Partial,
            4 => UploadError::NoFile,
            6 => UploadError::NoTmpDir,
            7 => UploadError::CantWrite,
            8 => UploadError::Extension,
            _ => return Err(MessageError::validation(format!("{code} is not a valid upload error code"))),
        };
        Ok(error)
    }
}

/// An uploaded file and its client-side metadata.
///
/// Clones share the stream and the moved flag: once any clone has been moved,
/// none of them gives access to the stream anymore.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    stream: Body,
    size: Option<u64>,
    error: UploadError,
    client_filename: Option<String>,
    client_media_type: Option<String>,
    moved: Arc<AtomicBool>,
}

impl UploadedFile {
    /// Wraps `stream`; a missing `size` defaults to the size of the stream.
    pub fn new(
        stream: impl Into<Body>,
        size: Option<u64>,
        error: UploadError,
        client_filename: Option<String>,
        client_media_type: Option<String>,
    ) -> Self {
        let stream = stream.into();
        let size = size.or_else(|| stream.size());
        Self { stream, size, error, client_filename, client_media_type, moved: Arc::new(AtomicBool::new(false)) }
    }

    /// Opens the temporary file at `path` for reading and wraps it.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be opened for reading.
    pub fn from_path(
        path: impl Into<PathBuf>,
        size: Option<u64>,
        error: UploadError,
        client_filename: Option<String>,
        client_media_type: Option<String>,
    ) -> Result<Self> {
        let stream = Stream::open(path, AccessMode::READ)?;
        Ok(Self::new(stream, size, error, client_filename, client_media_type))
    }

    /// # Errors
    ///
    /// Returns an io error when the file was moved or the upload failed.
    pub fn stream(&self) -> Result<&Body> {
        self.ensure_available()?;
        Ok(&self.stream)
    }

    /// Persists the upload at `target`.
    ///
    /// A file-backed stream is renamed, an in-memory stream has its contents
    /// written out. Either way the file counts as moved afterwards.
    ///
    /// # Errors
    ///
    /// Returns a validation error when `target` is a directory, and an io error when the file was already moved, the upload failed, the stream is detached or the file system refuses the move.
    pub fn move_to(&self, target: impl AsRef<Path>) -> Result<()> {
        let target = target.as_ref();
        ensure!(!target.is_dir(), MessageError::validation(format!("{} is a directory", target.display())));
        self.ensure_available()?;
        ensure!(
            self.moved.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_ok(),
            already_moved()
        );

        if let Err(e) = self.persist(target) {
            self.moved.store(false, Ordering::Release);
            return Err(e);
        }

        debug!(path = %target.display(), "uploaded file moved");
        Ok(())
    }

    fn persist(&self, target: &Path) -> Result<()> {
        let mut stream = self.stream.lock();
        let metadata = stream.metadata().ok_or_else(MessageError::detached)?;
        match metadata.path {
            Some(origin) => rename(&origin, target)?,
            None => {
                stream.rewind()?;
                let contents = stream.contents()?;
                stream.rewind()?;
                fs::write(target, &contents)?;
            }
        }
        Ok(())
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn error(&self) -> UploadError {
        self.error
    }

    pub fn client_filename(&self) -> Option<&str> {
        self.client_filename.as_deref()
    }

    pub fn client_media_type(&self) -> Option<&str> {
        self.client_media_type.as_deref()
    }

    pub fn is_moved(&self) -> bool {
        self.moved.load(Ordering::Acquire)
    }

    fn ensure_available(&self) -> Result<()> {
        ensure!(!self.is_moved(), already_moved());
        ensure!(
            self.error.is_ok(),
            MessageError::io(io::Error::other(format!("the upload failed with code {}", self.error.code())))
        );
        Ok(())
    }
}

fn already_moved() -> MessageError {
    MessageError::io(io::Error::other("the uploaded file was already moved"))
}

/// Renames `origin`, falling back to copy and remove across file systems.
fn rename(origin: &Path, target: &Path) -> Result<()> {
    if let Err(e) = fs::rename(origin, target) {
        warn!(cause = %e, origin = %origin.display(), "rename failed, copying instead");
        fs::copy(origin, target)?;
        fs::remove_file(origin)?;
    }
    Ok(())
}
