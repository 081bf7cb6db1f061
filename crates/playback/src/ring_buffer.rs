//! Lock-free, const-generic ring buffer for 16-bit PCM samples.
//!
//! `RingBuffer<N>` is a single-producer / single-consumer (SPSC) queue of up
//! to `N` `i16` samples, shared between a decoder task (writer) and the
//! mixer task (reader) through a `'static` reference (see
//! `slot::SlotChannel`). Unlike the original cooperative-scheduler design
//! this replaces, the two tasks here may run as genuinely concurrent OS
//! threads (the emulator build runs on tokio's multi-thread runtime), so
//! the head/tail indices are atomics rather than plain fields.
//!
//! # Safety model
//!
//! Only the producer calls [`RingBuffer::write_slice`]; only the consumer
//! calls [`RingBuffer::read_slice`]. The producer never writes past
//! `tail - head` samples behind the reader, and the consumer never reads
//! past what the producer has published, so the two never access the same
//! cell concurrently — the classic SPSC invariant.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicUsize, Ordering};

/// A fixed-capacity, lock-free SPSC ring buffer for `i16` audio samples.
pub struct RingBuffer<const N: usize> {
    buf: UnsafeCell<[i16; N]>,
    head: AtomicUsize, // next sample index to read, monotonically increasing
    tail: AtomicUsize, // next sample index to write, monotonically increasing
}

// SAFETY: `buf` cells in `head..tail` are owned by the consumer (read-only
// after publication) and cells in `tail..head+N` are owned by the producer;
// the single-writer/single-reader discipline documented above ensures these
// ranges never overlap, so concurrent access from one producer thread and
// one consumer thread never touches the same cell at the same time.
unsafe impl<const N: usize> Sync for RingBuffer<N> {}

impl<const N: usize> RingBuffer<N> {
    /// Create a new, empty ring buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: UnsafeCell::new([0i16; N]),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        }
    }

    /// Write as many samples from `data` as fit in the remaining capacity.
    ///
    /// Returns the number of samples actually written (may be less than
    /// `data.len()` under backpressure). Producer-only.
    #[allow(clippy::indexing_slicing)] // index is always `i % N`, in bounds by construction
    #[allow(clippy::arithmetic_side_effects)] // monotonic counters; wrap is the documented design
    pub fn write_slice(&self, data: &[i16]) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Relaxed);
        let free = N - (tail - head);
        let n = data.len().min(free);

        // SAFETY: indices `tail..tail+n` are producer-owned (not yet
        // visible to the consumer, which only reads up to `tail` after the
        // Release store below).
        let slots = unsafe { &mut *self.buf.get() };
        for (i, &sample) in data.iter().take(n).enumerate() {
            slots[(tail + i) % N] = sample;
        }
        self.tail.store(tail + n, Ordering::Release);
        n
    }

    /// Read up to `out.len()` samples into `out`.
    ///
    /// Returns the number of samples actually read (may be less than
    /// `out.len()` if fewer are available). Consumer-only, non-blocking.
    #[allow(clippy::indexing_slicing)] // index is always `i % N`, in bounds by construction
    #[allow(clippy::arithmetic_side_effects)] // monotonic counters; wrap is the documented design
    pub fn read_slice(&self, out: &mut [i16]) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Relaxed);
        let available = tail - head;
        let n = out.len().min(available);

        // SAFETY: indices `head..head+n` have already been published by the
        // producer's Release store of `tail`, observed via the Acquire load
        // above.
        let slots = unsafe { &*self.buf.get() };
        for (i, slot) in out.iter_mut().take(n).enumerate() {
            *slot = slots[(head + i) % N];
        }
        self.head.store(head + n, Ordering::Release);
        n
    }

    /// Number of samples currently available to read.
    #[allow(clippy::arithmetic_side_effects)] // monotonic counters; tail never trails head
    pub fn available(&self) -> usize {
        self.tail.load(Ordering::Acquire) - self.head.load(Ordering::Acquire)
    }

    /// Maximum number of samples the buffer can hold.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// `true` when no samples are present.
    pub fn is_empty(&self) -> bool {
        self.available() == 0
    }

    /// `true` when the buffer is completely full.
    pub fn is_full(&self) -> bool {
        self.available() == N
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn write_then_read_round_trips() {
        let ring: RingBuffer<16> = RingBuffer::new();
        let n = ring.write_slice(&[1, 2, 3, 4]);
        assert_eq!(n, 4);
        let mut out = [0i16; 4];
        let r = ring.read_slice(&mut out);
        assert_eq!(r, 4);
        assert_eq!(out, [1, 2, 3, 4]);
    }

    #[test]
    fn write_partial_when_full() {
        let ring: RingBuffer<4> = RingBuffer::new();
        assert_eq!(ring.write_slice(&[1, 2, 3, 4, 5]), 4);
        assert!(ring.is_full());
        assert_eq!(ring.write_slice(&[6]), 0);
    }

    #[test]
    fn read_partial_when_empty() {
        let ring: RingBuffer<4> = RingBuffer::new();
        ring.write_slice(&[1, 2]);
        let mut out = [0i16; 4];
        assert_eq!(ring.read_slice(&mut out), 2);
        assert_eq!(ring.read_slice(&mut out), 0);
    }

    #[test]
    fn wraps_around_correctly() {
        let ring: RingBuffer<4> = RingBuffer::new();
        ring.write_slice(&[1, 2, 3]);
        let mut out = [0i16; 2];
        ring.read_slice(&mut out);
        ring.write_slice(&[4, 5]);
        let mut rest = [0i16; 3];
        let n = ring.read_slice(&mut rest);
        assert_eq!(n, 3);
        assert_eq!(rest, [3, 4, 5]);
    }

    #[test]
    fn concurrent_producer_consumer_no_corruption() {
        let ring = Arc::new(RingBuffer::<64>::new());
        let w = ring.clone();
        let total = 10_000usize;

        let writer = thread::spawn(move || {
            let mut i: i16 = 0;
            let mut sent = 0usize;
            while sent < total {
                let batch = [i, i.wrapping_add(1)];
                let n = w.write_slice(&batch[..(total - sent).min(2)]);
                sent += n;
                i = i.wrapping_add(n as i16);
                thread::yield_now();
            }
        });

        let mut received = std::vec::Vec::with_capacity(total);
        while received.len() < total {
            let mut buf = [0i16; 8];
            let n = ring.read_slice(&mut buf);
            received.extend_from_slice(&buf[..n]);
            thread::yield_now();
        }
        writer.join().unwrap();

        for (expected, &actual) in (0i16..).zip(received.iter()) {
            assert_eq!(expected, actual, "sample stream must stay ordered and uncorrupted");
        }
    }
}
