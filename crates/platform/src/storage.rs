//! Storage abstraction for the persistent sound-file tree (`sounds/NNNN.wav`).

/// Storage trait for file system access.
pub trait Storage {
    /// Error type.
    type Error: core::fmt::Debug;
    /// File type.
    type File: File;

    /// Open a file for reading at `path`.
    fn open_file(
        &mut self,
        path: &str,
    ) -> impl core::future::Future<Output = Result<Self::File, Self::Error>>;

    /// Check whether `path` exists.
    fn exists(
        &mut self,
        path: &str,
    ) -> impl core::future::Future<Output = Result<bool, Self::Error>>;

    /// Whether the backing medium (SD card, flash filesystem) is mounted.
    ///
    /// `open_file`/`exists` on an unmounted store are expected to fail; this
    /// lets callers short-circuit without attempting I/O.
    fn is_mounted(&self) -> bool;
}

/// File trait for reading an open file.
pub trait File {
    /// Error type.
    type Error: core::fmt::Debug;

    /// Read from the current position, returning the number of bytes read.
    fn read(
        &mut self,
        buf: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, Self::Error>>;

    /// Seek to an absolute byte offset from the start of the file.
    fn seek_set(
        &mut self,
        abs_offset: u64,
    ) -> impl core::future::Future<Output = Result<u64, Self::Error>>;

    /// Total file size in bytes.
    fn size(&self) -> u64;
}
