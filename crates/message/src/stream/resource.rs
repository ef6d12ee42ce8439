//! The byte-oriented resources a [`Stream`](super::Stream) can own.
//!
//! A resource is either an in-memory buffer or an open file. Files are opened
//! with an fopen-style [`AccessMode`] which decides whether the wrapping stream
//! is readable, writable or both.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::trace;

use crate::MessageError;

/// The base letter of an fopen-style mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OpenKind {
    /// `r`: open an existing file
    Read,
    /// `w`: create or truncate
    Write,
    /// `a`: create, every write goes to the end
    Append,
    /// `x`: create, fails if the file exists
    Exclusive,
    /// `c`: create, never truncate
    Create,
}

/// An fopen-style access mode such as `r`, `w+` or `rb+`.
///
/// The optional `b`/`t` flag is accepted and ignored: there is no text translation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AccessMode {
    kind: OpenKind,
    update: bool,
}

impl AccessMode {
    pub const READ: AccessMode = AccessMode { kind: OpenKind::Read, update: false };
    pub const READ_WRITE: AccessMode = AccessMode { kind: OpenKind::Read, update: true };

    pub fn new(kind: OpenKind, update: bool) -> Self {
        Self { kind, update }
    }

    pub fn kind(&self) -> OpenKind {
        self.kind
    }

    /// True for `r` and every `+` mode.
    pub fn is_readable(&self) -> bool {
        self.kind == OpenKind::Read || self.update
    }

    /// True for `w`, `a`, `x`, `c` and every `+` mode.
    pub fn is_writable(&self) -> bool {
        self.kind != OpenKind::Read || self.update
    }

    fn open_options(&self) -> OpenOptions {
        let mut options = OpenOptions::new();
        options.read(self.is_readable());
        match self.kind {
            OpenKind::Read => options.write(self.update),
            OpenKind::Write => options.write(true).create(true).truncate(true),
            OpenKind::Append => options.append(true).create(true),
            OpenKind::Exclusive => options.write(true).create_new(true),
            OpenKind::Create => options.write(true).create(true),
        };
        options
    }
}

impl Default for AccessMode {
    fn default() -> Self {
        Self::READ_WRITE
    }
}

impl FromStr for AccessMode {
    type Err = MessageError;

    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        let invalid = || MessageError::validation(format!("[{mode}] is not a valid access mode"));

        let mut chars = mode.chars();
        let kind = match chars.next() {
            Some('r') => OpenKind::Read,
            Some('w') => OpenKind::Write,
            Some('a') => OpenKind::Append,
            Some('x') => OpenKind::Exclusive,
            Some('c') => OpenKind::Create,
            _ => return Err(invalid()),
        };

        let mut update = false;
        let mut flag = false;
        for c in chars {
            match c {
                '+' if !update => update = true,
                'b' | 't' if !flag => flag = true,
                _ => return Err(invalid()),
            }
        }

        Ok(Self { kind, update })
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self.kind {
            OpenKind::Read => 'r',
            OpenKind::Write => 'w',
            OpenKind::Append => 'a',
            OpenKind::Exclusive => 'x',
            OpenKind::Create => 'c',
        };
        if self.update { write!(f, "{letter}+") } else { write!(f, "{letter}") }
    }
}

/// What backs a stream.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Backing {
    Memory,
    File,
}

/// Metadata describing an open stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamMetadata {
    pub backing: Backing,
    pub mode: AccessMode,
    pub seekable: bool,
    /// The file path, `None` for in-memory streams.
    pub path: Option<PathBuf>,
}

/// An owned I/O resource.
#[derive(Debug)]
pub enum Resource {
    Memory(Cursor<Vec<u8>>),
    File { file: File, path: PathBuf, mode: AccessMode },
}

impl Resource {
    /// Creates an in-memory resource positioned at the start of `content`.
    pub fn memory(content: impl Into<Vec<u8>>) -> Self {
        Resource::Memory(Cursor::new(content.into()))
    }

    /// Opens the file at `path` with the given access mode.
    ///
    /// # Errors
    ///
    /// Fails when the file system refuses to open the file.
    pub fn open(path: impl AsRef<Path>, mode: AccessMode) -> crate::Result<Self> {
        let path = path.as_ref();
        let file = mode.open_options().open(path).map_err(|e| {
            MessageError::io(io::Error::new(e.kind(), format!("{} could not be opened: {e}", path.display())))
        })?;
        trace!(path = %path.display(), %mode, "opened file resource");
        Ok(Resource::File { file, path: path.to_path_buf(), mode })
    }

    /// Wraps an already opened file. `mode` must describe how `file` was opened.
    pub fn from_file(file: File, path: impl Into<PathBuf>, mode: AccessMode) -> Self {
        Resource::File { file, path: path.into(), mode }
    }

    pub fn mode(&self) -> AccessMode {
        match self {
            Resource::Memory(_) => AccessMode::READ_WRITE,
            Resource::File { mode, .. } => *mode,
        }
    }

    pub fn backing(&self) -> Backing {
        match self {
            Resource::Memory(_) => Backing::Memory,
            Resource::File { .. } => Backing::File,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Resource::Memory(_) => None,
            Resource::File { path, .. } => Some(path),
        }
    }

    /// Both memory buffers and regular files support random access.
    pub fn is_seekable(&self) -> bool {
        true
    }

    pub(crate) fn len(&self) -> io::Result<u64> {
        match self {
            Resource::Memory(cursor) => Ok(cursor.get_ref().len() as u64),
            Resource::File { file, .. } => Ok(file.metadata()?.len()),
        }
    }

    pub(crate) fn metadata(&self) -> StreamMetadata {
        StreamMetadata {
            backing: self.backing(),
            mode: self.mode(),
            seekable: self.is_seekable(),
            path: self.path().map(Path::to_path_buf),
        }
    }
}

impl Read for Resource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Resource::Memory(cursor) => cursor.read(buf),
            Resource::File { file, .. } => file.read(buf),
        }
    }
}

impl Write for Resource {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Resource::Memory(cursor) => cursor.write(buf),
            Resource::File { file, .. } => file.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Resource::Memory(cursor) => cursor.flush(),
            Resource::File { file, .. } => file.flush(),
        }
    }
}

impl Seek for Resource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            Resource::Memory(cursor) => cursor.seek(pos),
            Resource::File { file, .. } => file.seek(pos),
        }
    }
}
