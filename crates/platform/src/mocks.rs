//! Mock implementations of the platform traits, for use in unit and
//! integration tests elsewhere in the workspace.

#![cfg(any(test, feature = "std"))]

use heapless::Vec;

use crate::bus::{Bus, Frame};
use crate::sink::Sink;
use crate::storage::{File, Storage};

/// Mock [`Sink`] that records every write instead of touching hardware.
pub struct MockSink {
    ready: bool,
    written: Vec<i16, 4096>,
}

impl MockSink {
    /// Create a mock sink, initially not ready.
    #[must_use]
    pub fn new() -> Self {
        Self { ready: false, written: Vec::new() }
    }

    /// Mark the sink as ready to accept writes.
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// All samples written so far, in write order.
    #[must_use]
    pub fn written(&self) -> &[i16] {
        &self.written
    }
}

impl Default for MockSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for MockSink {
    type Error = core::convert::Infallible;

    fn sink_ready(&self) -> bool {
        self.ready
    }

    async fn sink_write(&mut self, frames_le16: &[i16]) -> Result<usize, Self::Error> {
        for &s in frames_le16 {
            if self.written.push(s).is_err() {
                break;
            }
        }
        Ok(frames_le16.len())
    }
}

/// Mock [`File`] backed by an in-memory byte buffer.
pub struct MockFile {
    data: std::vec::Vec<u8>,
    pos: usize,
}

impl MockFile {
    /// Wrap a byte buffer as a readable/seekable file.
    #[must_use]
    pub fn new(data: std::vec::Vec<u8>) -> Self {
        Self { data, pos: 0 }
    }
}

impl File for MockFile {
    type Error = core::convert::Infallible;

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let remaining = self.data.len().saturating_sub(self.pos);
        let n = remaining.min(buf.len());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    async fn seek_set(&mut self, abs_offset: u64) -> Result<u64, Self::Error> {
        self.pos = (abs_offset as usize).min(self.data.len());
        Ok(self.pos as u64)
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Mock [`Storage`] backed by an in-memory path -> bytes map.
pub struct MockStorage {
    files: std::collections::HashMap<std::string::String, std::vec::Vec<u8>>,
    mounted: bool,
}

impl MockStorage {
    /// Create an empty, mounted mock store.
    #[must_use]
    pub fn new() -> Self {
        Self { files: std::collections::HashMap::new(), mounted: true }
    }

    /// Insert a file at `path`, overwriting any existing content.
    pub fn put(&mut self, path: &str, bytes: std::vec::Vec<u8>) {
        self.files.insert(path.to_owned(), bytes);
    }

    /// Remove a file, simulating deletion.
    pub fn remove(&mut self, path: &str) {
        self.files.remove(path);
    }

    /// Simulate an unmounted card/filesystem.
    pub fn set_mounted(&mut self, mounted: bool) {
        self.mounted = mounted;
    }
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MockStorage {
    type Error = core::convert::Infallible;
    type File = MockFile;

    async fn open_file(&mut self, path: &str) -> Result<Self::File, Self::Error> {
        Ok(MockFile::new(self.files.get(path).cloned().unwrap_or_default()))
    }

    async fn exists(&mut self, path: &str) -> Result<bool, Self::Error> {
        Ok(self.files.contains_key(path))
    }

    fn is_mounted(&self) -> bool {
        self.mounted
    }
}

/// Mock [`Bus`] with separate inbound/outbound queues for driving protocol tests.
pub struct MockBus {
    inbound: std::collections::VecDeque<Frame>,
    outbound: std::vec::Vec<Frame>,
}

impl MockBus {
    /// Create an empty mock bus.
    #[must_use]
    pub fn new() -> Self {
        Self { inbound: std::collections::VecDeque::new(), outbound: std::vec::Vec::new() }
    }

    /// Queue a frame to be returned by the next `bus_recv`.
    pub fn push_inbound(&mut self, frame: Frame) {
        self.inbound.push_back(frame);
    }

    /// All frames sent via `bus_send`, in send order.
    #[must_use]
    pub fn sent(&self) -> &[Frame] {
        &self.outbound
    }
}

impl Default for MockBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for MockBus {
    type Error = core::convert::Infallible;

    async fn bus_recv(&mut self, _timeout_ms: u64) -> Result<Option<Frame>, Self::Error> {
        Ok(self.inbound.pop_front())
    }

    async fn bus_send(&mut self, frame: &Frame) -> Result<(), Self::Error> {
        self.outbound.push(*frame);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_sink_records_writes() {
        let mut sink = MockSink::new();
        sink.set_ready(true);
        assert!(sink.sink_ready());
        sink.sink_write(&[1, 2, 3]).await.unwrap();
        assert_eq!(sink.written(), &[1, 2, 3]);
    }

    #[tokio::test]
    async fn mock_storage_round_trip() {
        let mut storage = MockStorage::new();
        storage.put("sounds/0001.wav", b"RIFF....".to_vec());
        assert!(storage.exists("sounds/0001.wav").await.unwrap());
        let mut file = storage.open_file("sounds/0001.wav").await.unwrap();
        let mut buf = [0u8; 8];
        let n = file.read(&mut buf).await.unwrap();
        assert_eq!(n, 8);
        assert_eq!(&buf, b"RIFF....");
    }

    #[tokio::test]
    async fn mock_storage_missing_file_is_empty() {
        let mut storage = MockStorage::new();
        assert!(!storage.exists("sounds/9999.wav").await.unwrap());
    }

    #[tokio::test]
    async fn mock_storage_reports_unmounted() {
        let mut storage = MockStorage::new();
        storage.set_mounted(false);
        assert!(!storage.is_mounted());
    }

    #[tokio::test]
    async fn mock_bus_echoes_queued_frames() {
        let mut bus = MockBus::new();
        bus.push_inbound(Frame::new(0x411, &[]));
        let got = bus.bus_recv(100).await.unwrap().expect("frame queued");
        assert_eq!(got.id, 0x411);

        bus.bus_send(&Frame::new(0x410, &[1, 2, 3])).await.unwrap();
        assert_eq!(bus.sent().len(), 1);
        assert_eq!(bus.sent()[0].id, 0x410);
    }
}
