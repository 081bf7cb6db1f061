//! Source slots (C4): the fixed-size table of concurrent playback contexts.
//!
//! The slot table, master volume, and sink-ready flag share one coarse
//! mutex (spec'd cross-task contract): all mutations here are short,
//! metadata-only, and never perform I/O while the lock is held. Each slot's
//! ring and cross-task flags are `'static` references into engine-owned
//! storage, so the decoder task can reach them independent of the table
//! lock.

use embassy_time::Instant;
use heapless::String;

use platform::{QueueId, SoundIndex, VolumePercent};

use crate::flags::SlotFlags;
use crate::ring_buffer::RingBuffer;

/// Ring buffer capacity in samples (`RING_BYTES / 2`).
pub const RING_SAMPLES: usize = platform::config::RING_BYTES / 2;

/// Lifecycle state of a source slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// No decoder running; ring (if any) is stale and awaiting reclamation.
    Idle,
    /// Actively decoding and contributing to the mix.
    Playing,
    /// Decoding paused; ring retained, decoder still alive.
    Paused,
    /// Asked to stop; decoder observes `stopping` and will exit.
    Stopping,
    /// Decoder has exited; waiting for the sink's own buffer to flush.
    Draining,
    /// Fully stopped; eligible for reuse on the next `create_source`.
    Stopped,
}

/// Reason a tagged playback reached `SOUND_FINISHED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// Decoder reached end of input (no loop) and drained normally.
    Completed,
    /// Stopped by `STOP_SOUND`, `STOP_ALL`, or an interrupting `PLAY_SOUND`.
    Stopped,
    /// Decoder aborted due to a read error.
    Error,
}

/// A single concurrent playback context.
pub struct Slot {
    /// Current lifecycle state.
    pub state: SlotState,
    /// Short human-readable origin (file path or `"[memory:<N>]"`).
    pub label: String<48>,
    /// Per-source volume, 0..=100.
    pub volume: VolumePercent,
    /// Restart at EOF.
    pub loop_enabled: bool,
    /// External playback tag; `QueueId::UNTAGGED` if not tracked.
    pub queue_id: QueueId,
    /// Opaque id echoed in notifications; `SoundIndex::UNSET` if unset.
    pub sound_index: SoundIndex,
    /// Instant at which a `Draining` slot transitions to `Stopped`.
    pub drain_deadline: Option<Instant>,
    /// The slot's ring and cross-task flags; `None` when `Idle`/unallocated.
    pub channel: Option<SlotChannel>,
}

/// The live resources a decoder and the mixer share for one slot.
///
/// Both fields are `'static` references into engine-owned storage (see
/// `engine::Engine::new`, which allocates one ring and one flag block per
/// slot index via `static_cell::StaticCell` and hands out references — the
/// usual no-heap way to share long-lived state across async tasks in an
/// embedded build). A slot's `SlotChannel` is always the same pair of
/// statics for the lifetime of the program; only the slot metadata that
/// *uses* them is reset between playbacks.
#[derive(Clone, Copy)]
pub struct SlotChannel {
    /// Lock-free byte ring connecting decoder (writer) and mixer (reader).
    pub ring: &'static RingBuffer<RING_SAMPLES>,
    /// Cross-task flags: `stopping`, `eof_reached`, and decoded channel count.
    pub flags: &'static SlotFlags,
}

impl Slot {
    const fn idle() -> Self {
        Self {
            state: SlotState::Idle,
            label: String::new(),
            volume: VolumePercent::FULL,
            loop_enabled: false,
            queue_id: QueueId::UNTAGGED,
            sound_index: SoundIndex::UNSET,
            drain_deadline: None,
            channel: None,
        }
    }

    /// `true` if this slot is not tracked by the external controller.
    #[must_use]
    pub fn is_untagged(&self) -> bool {
        self.queue_id.is_untagged()
    }
}

/// Error returned when no slot is available and interruption was not requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoSlotError;

/// The fixed-size table of `MAX_SOURCES` slots, plus master volume and the
/// sink-ready gate, all under one mutex.
pub struct SlotTable<const N: usize> {
    /// The slots themselves.
    pub slots: [Slot; N],
    /// Master volume, 0..=100, applied after per-source mixing.
    pub master_volume: VolumePercent,
    /// Gates the mixer's first sink write; set once, never cleared.
    pub sink_ready: bool,
}

impl<const N: usize> SlotTable<N> {
    /// Create a table of `N` idle slots with full master volume.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| Slot::idle()),
            master_volume: VolumePercent::FULL,
            sink_ready: false,
        }
    }

    /// First index with `state == Idle` (or `Stopped`, which is reusable).
    #[must_use]
    pub fn find_free(&self) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| matches!(s.state, SlotState::Idle | SlotState::Stopped))
    }

    /// Allocate slot `idx` for a fresh playback.
    ///
    /// Drops any stale channel from a previous occupant (the decoder for
    /// that occupant is guaranteed to have already exited, since only
    /// `Stopped`/`Idle` slots are reallocated). Clamps `volume`.
    pub fn activate(
        &mut self,
        idx: usize,
        label: &str,
        volume: u8,
        loop_enabled: bool,
        channel: SlotChannel,
    ) {
        #[allow(clippy::indexing_slicing)] // idx < N, caller-guaranteed (always from find_free)
        let slot = &mut self.slots[idx];
        slot.state = SlotState::Playing;
        slot.label = String::try_from(label).unwrap_or_default();
        slot.volume = VolumePercent::new(volume);
        slot.loop_enabled = loop_enabled;
        slot.queue_id = QueueId::UNTAGGED;
        slot.sound_index = SoundIndex::UNSET;
        slot.drain_deadline = None;
        slot.channel = Some(channel);
    }

    /// Attach `(queue_id, sound_index)` to an already-activated slot.
    pub fn assign_queue_id(&mut self, idx: usize, queue_id: QueueId, sound_index: SoundIndex) {
        #[allow(clippy::indexing_slicing)] // idx < N, caller-guaranteed (always a just-activated slot)
        let slot = &mut self.slots[idx];
        slot.queue_id = queue_id;
        slot.sound_index = sound_index;
    }

    /// Mark `idx` stopping. Returns `Some(FinishReason::Stopped)` payload
    /// info (queue_id, sound_index) if the slot was tagged and should emit
    /// `SOUND_FINISHED` immediately (callers emit it outside the lock).
    ///
    /// Clears the slot's tag before returning it: the mixer's own
    /// `Stopped`-branch reclaim only notifies `Completed` for still-tagged
    /// slots, so this keeps a stop-triggered reclaim from notifying twice.
    pub fn stop(&mut self, idx: usize) -> Option<(QueueId, SoundIndex)> {
        #[allow(clippy::indexing_slicing)] // idx < N, caller-guaranteed
        let slot = &mut self.slots[idx];
        if matches!(slot.state, SlotState::Idle | SlotState::Stopped) {
            return None;
        }
        let tagged = (!slot.is_untagged()).then_some((slot.queue_id, slot.sound_index));
        if let Some(channel) = &slot.channel {
            channel.flags.stopping.store(true, core::sync::atomic::Ordering::Release);
        }
        slot.state = SlotState::Stopping;
        slot.queue_id = QueueId::UNTAGGED;
        slot.sound_index = SoundIndex::UNSET;
        tagged
    }

    /// Stop every `Playing`/`Paused` slot. Returns the tagged slots that
    /// should emit `SOUND_FINISHED(reason = Stopped)`.
    pub fn stop_all(&mut self) -> heapless::Vec<(QueueId, SoundIndex), N> {
        let mut finished = heapless::Vec::new();
        for idx in 0..N {
            #[allow(clippy::indexing_slicing)] // idx < N, loop range bound
            let state = self.slots[idx].state;
            if matches!(state, SlotState::Playing | SlotState::Paused) {
                if let Some(tag) = self.stop(idx) {
                    let _ = finished.push(tag);
                }
            }
        }
        finished
    }

    /// Find the slot tagged with `queue_id`, if any.
    #[must_use]
    pub fn find_by_queue_id(&self, queue_id: QueueId) -> Option<usize> {
        if queue_id.is_untagged() {
            return None;
        }
        self.slots.iter().position(|s| s.queue_id.get() == queue_id.get() && !s.is_untagged())
    }

    /// Set per-slot volume, clamped to 0..=100.
    pub fn set_volume(&mut self, idx: usize, volume: u8) {
        #[allow(clippy::indexing_slicing)] // idx < N, caller-guaranteed
        let slot = &mut self.slots[idx];
        slot.volume = VolumePercent::new(volume);
    }

    /// Set master volume, clamped to 0..=100.
    pub fn set_master_volume(&mut self, volume: u8) {
        self.master_volume = VolumePercent::new(volume);
    }

    /// Read the current master volume.
    #[must_use]
    pub fn master_volume(&self) -> u8 {
        self.master_volume.get()
    }

    /// `Playing -> Paused`; other states are no-ops.
    pub fn pause(&mut self, idx: usize) {
        #[allow(clippy::indexing_slicing)] // idx < N, caller-guaranteed
        let slot = &mut self.slots[idx];
        if slot.state == SlotState::Playing {
            slot.state = SlotState::Paused;
        }
    }

    /// `Paused -> Playing`; other states are no-ops.
    pub fn resume(&mut self, idx: usize) {
        #[allow(clippy::indexing_slicing)] // idx < N, caller-guaranteed
        let slot = &mut self.slots[idx];
        if slot.state == SlotState::Paused {
            slot.state = SlotState::Playing;
        }
    }

    /// Read-only snapshot of a slot's externally-visible state.
    #[must_use]
    pub fn info(&self, idx: usize) -> (SlotState, VolumePercent) {
        #[allow(clippy::indexing_slicing)] // idx < N, caller-guaranteed
        let slot = &self.slots[idx];
        (slot.state, slot.volume)
    }
}

impl<const N: usize> Default for SlotTable<N> {
    fn default() -> Self {
        Self::new()
    }
}
