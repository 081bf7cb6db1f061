//! Top-level engine wiring: owns the slot table and the per-slot static
//! ring/flag storage, and exposes the metadata-only operations a command
//! adapter drives (`create_source`, `stop`, `stop_all`, volume, pause).
//!
//! `create_source` never performs I/O: resolving `sound_index` to bytes
//! (storage lookup, asset registry fallback) is the caller's job, done
//! before the slot-table lock is taken, exactly as the coarse-mutex
//! contract requires.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use static_cell::StaticCell;

use platform::config::MAX_SOURCES;
use platform::{QueueId, SoundIndex};

use crate::flags::SlotFlags;
use crate::ring_buffer::RingBuffer;
use crate::slot::{FinishReason, SlotChannel, SlotState, SlotTable, RING_SAMPLES};

static RINGS: StaticCell<[RingBuffer<RING_SAMPLES>; MAX_SOURCES]> = StaticCell::new();
static FLAGS: StaticCell<[SlotFlags; MAX_SOURCES]> = StaticCell::new();

/// Error returned by [`Engine::create_source`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateSourceError {
    /// No free slot and interruption was not requested.
    MixerFull,
}

/// Owns the per-slot static storage and the slot table mutex. One `Engine`
/// is created at startup (typically behind its own `StaticCell` in the
/// firmware/emulator binary) and shared by the command adapter and the
/// mixer loop.
pub struct Engine {
    /// Slot table, master volume, and sink-ready flag, one mutex for all three.
    pub table: Mutex<CriticalSectionRawMutex, SlotTable<MAX_SOURCES>>,
    rings: &'static [RingBuffer<RING_SAMPLES>; MAX_SOURCES],
    flags: &'static [SlotFlags; MAX_SOURCES],
}

impl Engine {
    /// Initialize per-slot static storage and an empty slot table.
    ///
    /// Must be called at most once per process; a second call panics
    /// (`StaticCell::init` enforces single-use), since a second set of
    /// rings/flags would leave the first set's slots orphaned.
    #[must_use]
    pub fn new() -> Self {
        let rings = RINGS.init(core::array::from_fn(|_| RingBuffer::new()));
        let flags = FLAGS.init(core::array::from_fn(|_| SlotFlags::new()));
        Self { table: Mutex::new(SlotTable::new()), rings, flags }
    }

    /// Mark the sink ready, gating the mixer's first write. Idempotent.
    pub async fn set_sink_ready(&self) {
        self.table.lock().await.sink_ready = true;
    }

    /// Allocate a slot for a new playback.
    ///
    /// On success, returns the slot index and the `SlotChannel` the caller
    /// must hand to a spawned `decoder::run` task, plus any slots that were
    /// interrupted (tagged slots the caller should notify with
    /// `FinishReason::Stopped`).
    ///
    /// # Errors
    ///
    /// Returns [`CreateSourceError::MixerFull`] if no slot is free and
    /// `interrupt` was not requested.
    pub async fn create_source(
        &self,
        label: &str,
        volume: u8,
        interrupt: bool,
    ) -> Result<(usize, SlotChannel, heapless::Vec<(QueueId, SoundIndex), MAX_SOURCES>), CreateSourceError> {
        let mut guard = self.table.lock().await;

        let interrupted = if interrupt { guard.stop_all() } else { heapless::Vec::new() };

        let idx = match guard.find_free() {
            Some(idx) => idx,
            None => return Err(CreateSourceError::MixerFull),
        };

        #[allow(clippy::indexing_slicing)] // idx < MAX_SOURCES, guaranteed by find_free
        let channel = SlotChannel { ring: &self.rings[idx], flags: &self.flags[idx] };
        channel.flags.reset();
        guard.activate(idx, label, volume, false, channel);

        Ok((idx, channel, interrupted))
    }

    /// As [`Engine::create_source`], but also marks the slot as looping.
    pub async fn create_looping_source(
        &self,
        label: &str,
        volume: u8,
        interrupt: bool,
    ) -> Result<(usize, SlotChannel, heapless::Vec<(QueueId, SoundIndex), MAX_SOURCES>), CreateSourceError> {
        let result = self.create_source(label, volume, interrupt).await;
        if let Ok((idx, ..)) = result {
            self.table.lock().await.slots[idx].loop_enabled = true;
        }
        result
    }

    /// Attach `(queue_id, sound_index)` to a freshly-created slot.
    pub async fn assign_queue_id(&self, idx: usize, queue_id: QueueId, sound_index: SoundIndex) {
        self.table.lock().await.assign_queue_id(idx, queue_id, sound_index);
    }

    /// Stop the slot tagged with `queue_id`. Returns the tag if it was
    /// found and stopped (so the caller can emit `FINISHED`).
    pub async fn stop_by_queue_id(&self, queue_id: QueueId) -> Option<(QueueId, SoundIndex)> {
        let mut guard = self.table.lock().await;
        let idx = guard.find_by_queue_id(queue_id)?;
        guard.stop(idx)
    }

    /// Stop every playing/paused slot.
    pub async fn stop_all(&self) -> heapless::Vec<(QueueId, SoundIndex), MAX_SOURCES> {
        self.table.lock().await.stop_all()
    }

    /// Set master volume, clamped to 0..=100.
    pub async fn set_master_volume(&self, volume: u8) {
        self.table.lock().await.set_master_volume(volume);
    }

    /// Read master volume.
    pub async fn master_volume(&self) -> u8 {
        self.table.lock().await.master_volume()
    }

    /// Pause/resume the slot tagged with `queue_id`, if found.
    pub async fn set_paused_by_queue_id(&self, queue_id: QueueId, paused: bool) {
        let mut guard = self.table.lock().await;
        if let Some(idx) = guard.find_by_queue_id(queue_id) {
            if paused {
                guard.pause(idx);
            } else {
                guard.resume(idx);
            }
        }
    }

    /// `true` if any slot is currently `PLAYING`.
    pub async fn any_playing(&self) -> bool {
        let guard = self.table.lock().await;
        guard.slots.iter().any(|s| s.state == SlotState::Playing)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert an interrupted/stopped tag list into `FinishReason::Stopped`
/// triples, matching `mixer::tick`'s return shape for a uniform notifier.
#[must_use]
pub fn as_stopped_finishes(
    tags: heapless::Vec<(QueueId, SoundIndex), MAX_SOURCES>,
) -> heapless::Vec<(QueueId, SoundIndex, FinishReason), MAX_SOURCES> {
    tags.into_iter().map(|(q, s)| (q, s, FinishReason::Stopped)).collect()
}
