//! Command adapter (C6): the sole task that touches the message bus.
//!
//! Owns the queue-id allocator and the module's externally-visible error/
//! status state. Resolves `PLAY_SOUND` sources (storage first, asset
//! registry fallback) and drives `Engine` for every command; never performs
//! decode or mix work itself.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::Instant;

use platform::{AssetRegistry, Frame, MessageBus as Bus, QueueId, SoundIndex, Storage};
use playback::engine::as_stopped_finishes;
use playback::{decoder, CreateSourceError, DecodeSource, Engine, FinishReason, SlotState};

use crate::error::ErrorCode;
use crate::frame::{self, id, PlaySoundCmd, StopSoundCmd};
use crate::spawn::TaskSpawner;

/// Capacity of the mixer -> adapter finished-playback notification channel;
/// at most one entry per slot can be pending between adapter polls.
pub const FINISHED_CHANNEL_CAPACITY: usize = platform::config::MAX_SOURCES;

/// MPSC channel the mixer loop posts terminal-state notifications to; the
/// command adapter drains it each poll and emits `SOUND_FINISHED` frames.
pub type FinishedChannel =
    Channel<CriticalSectionRawMutex, (QueueId, SoundIndex, FinishReason), FINISHED_CHANNEL_CAPACITY>;

/// Fixed module type reported in `MODULE_ANNOUNCE`.
pub const MODULE_TYPE: u8 = 0x01;
const VERSION_MAJOR: u8 = 0;
const VERSION_MINOR: u8 = 1;

const CAP_MULTI_SOURCE: u8 = 1 << 0;
const CAP_LOOP: u8 = 1 << 1;
const CAP_VOLUME_CONTROL: u8 = 1 << 2;
const CAPABILITIES: u8 = CAP_MULTI_SOURCE | CAP_LOOP | CAP_VOLUME_CONTROL;

const STATE_READY: u8 = 1 << 0;
const STATE_STORAGE_MOUNTED: u8 = 1 << 1;
const STATE_PLAYING: u8 = 1 << 2;
const STATE_MUTED: u8 = 1 << 3;
const STATE_ERROR: u8 = 1 << 4;

/// Volume byte `0xFF` means "use external/master control": a source plays
/// at its own nominal level and only master volume attenuates it further.
const VOLUME_USE_EXTERNAL_DEFAULT: u8 = 100;

/// Drives C6 against a borrowed [`Engine`]. One adapter per module instance.
pub struct CommandAdapter<'e> {
    engine: &'e Engine,
    node_id: u8,
    queue_id_counter: QueueId,
    last_error: ErrorCode,
    boot: Instant,
    last_status: Instant,
}

impl<'e> CommandAdapter<'e> {
    /// Create an adapter bound to `engine`, reporting `node_id` in announces.
    #[must_use]
    pub fn new(engine: &'e Engine, node_id: u8) -> Self {
        let now = Instant::now();
        Self {
            engine,
            node_id,
            queue_id_counter: QueueId::UNTAGGED,
            last_error: ErrorCode::Ok,
            boot: now,
            last_status: now,
        }
    }

    fn next_queue_id(&mut self) -> QueueId {
        self.queue_id_counter = self.queue_id_counter.next();
        self.queue_id_counter
    }

    /// Emit `MODULE_ANNOUNCE` unconditionally; call once at boot if desired.
    pub async fn announce_boot<B: Bus>(&self, bus: &mut B) {
        self.emit_announce(bus).await;
    }

    async fn emit_announce<B: Bus>(&self, bus: &mut B) {
        let f = frame::module_announce(MODULE_TYPE, VERSION_MAJOR, VERSION_MINOR, CAPABILITIES, self.node_id);
        let _ = bus.bus_send(&f).await;
    }

    /// One iteration: drain pending `SOUND_FINISHED` notifications, service
    /// at most one inbound frame (bounded by `BUS_RECV_TIMEOUT_MS`), then
    /// emit `SOUND_STATUS` if the periodic interval has elapsed.
    pub async fn poll<B, S, A, Sp>(
        &mut self,
        bus: &mut B,
        storage: &mut S,
        registry: &A,
        spawner: &Sp,
        finished: &FinishedChannel,
    ) where
        B: Bus,
        S: Storage,
        S::File: Send + 'static,
        A: AssetRegistry,
        Sp: TaskSpawner,
    {
        while let Ok(tag) = finished.try_receive() {
            let f = frame::sound_finished(tag.0, tag.1, tag.2);
            let _ = bus.bus_send(&f).await;
        }

        if let Ok(Some(f)) = bus.bus_recv(platform::config::BUS_RECV_TIMEOUT_MS).await {
            self.dispatch(bus, storage, registry, spawner, &f).await;
        }

        let now = Instant::now();
        if (now - self.last_status).as_millis() >= platform::config::STATUS_INTERVAL_MS {
            self.emit_status(bus, storage).await;
            self.last_status = now;
        }
    }

    async fn dispatch<B, S, A, Sp>(&mut self, bus: &mut B, storage: &mut S, registry: &A, spawner: &Sp, frame: &Frame)
    where
        B: Bus,
        S: Storage,
        S::File: Send + 'static,
        A: AssetRegistry,
        Sp: TaskSpawner,
    {
        match frame.id {
            id::MODULE_QUERY => self.emit_announce(bus).await,
            id::PLAY_SOUND => {
                if let Some(cmd) = PlaySoundCmd::decode(frame) {
                    self.handle_play_sound(bus, storage, registry, spawner, cmd).await;
                }
            }
            id::STOP_SOUND => {
                if let Some(cmd) = StopSoundCmd::decode(frame) {
                    self.handle_stop_sound(bus, cmd).await;
                }
            }
            id::STOP_ALL => {
                let stopped = self.engine.stop_all().await;
                for (queue_id, sound_index, reason) in as_stopped_finishes(stopped) {
                    let f = frame::sound_finished(queue_id, sound_index, reason);
                    let _ = bus.bus_send(&f).await;
                }
            }
            _ => {}
        }
    }

    async fn handle_stop_sound<B: Bus>(&mut self, bus: &mut B, cmd: StopSoundCmd) {
        match self.engine.stop_by_queue_id(cmd.queue_id).await {
            Some((queue_id, sound_index)) => {
                self.last_error = ErrorCode::Ok;
                let f = frame::sound_ack(true, sound_index, queue_id, ErrorCode::Ok, cmd.request_id);
                let _ = bus.bus_send(&f).await;
                let f = frame::sound_finished(queue_id, sound_index, FinishReason::Stopped);
                let _ = bus.bus_send(&f).await;
            }
            None => {
                self.last_error = ErrorCode::InvalidQueueId;
                let f = frame::sound_ack(false, SoundIndex::UNSET, cmd.queue_id, ErrorCode::InvalidQueueId, cmd.request_id);
                let _ = bus.bus_send(&f).await;
            }
        }
    }

    async fn handle_play_sound<B, S, A, Sp>(
        &mut self,
        bus: &mut B,
        storage: &mut S,
        registry: &A,
        spawner: &Sp,
        cmd: PlaySoundCmd,
    ) where
        B: Bus,
        S: Storage,
        S::File: Send + 'static,
        A: AssetRegistry,
        Sp: TaskSpawner,
    {
        let path = platform::sound_paths::sound_path(cmd.sound_index.get());

        let resolved = self.resolve_source(storage, registry, &path, cmd.sound_index).await;
        let Some((source, pre_parsed)) = resolved else {
            self.last_error = ErrorCode::FileNotFound;
            let f = frame::sound_ack(false, cmd.sound_index, QueueId::UNTAGGED, ErrorCode::FileNotFound, cmd.request_id);
            let _ = bus.bus_send(&f).await;
            return;
        };

        let volume = cmd.volume.unwrap_or(VOLUME_USE_EXTERNAL_DEFAULT);
        let create_result = if cmd.loop_enabled {
            self.engine.create_looping_source(path.as_str(), volume, cmd.interrupt).await
        } else {
            self.engine.create_source(path.as_str(), volume, cmd.interrupt).await
        };

        let (idx, channel, interrupted) = match create_result {
            Ok(v) => v,
            Err(CreateSourceError::MixerFull) => {
                self.last_error = ErrorCode::MixerFull;
                let f = frame::sound_ack(false, cmd.sound_index, QueueId::UNTAGGED, ErrorCode::MixerFull, cmd.request_id);
                let _ = bus.bus_send(&f).await;
                return;
            }
        };

        for (queue_id, sound_index) in interrupted {
            let f = frame::sound_finished(queue_id, sound_index, FinishReason::Stopped);
            let _ = bus.bus_send(&f).await;
        }

        let queue_id = self.next_queue_id();
        self.engine.assign_queue_id(idx, queue_id, cmd.sound_index).await;

        let loop_enabled = cmd.loop_enabled;
        spawner.spawn(async move {
            let _ = decoder::run(source, pre_parsed, loop_enabled, channel.ring, channel.flags).await;
        });

        self.last_error = ErrorCode::Ok;
        let f = frame::sound_ack(true, cmd.sound_index, queue_id, ErrorCode::Ok, cmd.request_id);
        let _ = bus.bus_send(&f).await;
    }

    /// Resolve `sound_index` to a decode source: persistent storage first,
    /// falling back to the asset registry. Returns `None` if neither holds
    /// the id (`FileNotFound`).
    async fn resolve_source<S, A>(
        &self,
        storage: &mut S,
        registry: &A,
        path: &str,
        sound_index: SoundIndex,
    ) -> Option<(DecodeSource<S::File>, Option<playback::wav::WavInfo>)>
    where
        S: Storage,
        A: AssetRegistry,
    {
        if storage.exists(path).await.unwrap_or(false) {
            if let Ok(file) = storage.open_file(path).await {
                return Some((DecodeSource::Stream(file), None));
            }
        }

        let entry = registry.lookup(sound_index.get())?;
        let info = playback::wav::parse_slice(entry.bytes).ok()?;
        Some((DecodeSource::Memory(entry.bytes), Some(info)))
    }

    async fn emit_status<B: Bus, S: Storage>(&mut self, bus: &mut B, storage: &S) {
        let (playing, current, master_volume, sink_ready) = {
            let guard = self.engine.table.lock().await;
            let playing = guard.slots.iter().any(|s| s.state == SlotState::Playing);
            let current =
                guard.slots.iter().find(|s| s.state == SlotState::Playing).map_or(SoundIndex::UNSET, |s| s.sound_index);
            (playing, current, guard.master_volume(), guard.sink_ready)
        };

        let mut bits = 0u8;
        if sink_ready {
            bits |= STATE_READY;
        }
        if storage.is_mounted() {
            bits |= STATE_STORAGE_MOUNTED;
        }
        if playing {
            bits |= STATE_PLAYING;
        }
        if master_volume == 0 {
            bits |= STATE_MUTED;
        }
        if self.last_error != ErrorCode::Ok {
            bits |= STATE_ERROR;
        }

        let uptime_s = u16::try_from((Instant::now() - self.boot).as_secs()).unwrap_or(u16::MAX);
        let f = frame::sound_status(bits, current, self.last_error, master_volume, uptime_s);
        let _ = bus.bus_send(&f).await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::spawn::TokioSpawner;
    use crate::test_support::engine;
    use platform::mocks::{MockBus, MockStorage};
    use platform::{AssetEntry, StaticAssetRegistry};
    use std::sync::OnceLock;

    fn build_wav(channels: u16, bits: u16, sample_rate: u32, data: &[u8]) -> std::vec::Vec<u8> {
        let mut v = std::vec::Vec::new();
        v.extend_from_slice(b"RIFF");
        v.extend_from_slice(&0u32.to_le_bytes());
        v.extend_from_slice(b"WAVE");
        v.extend_from_slice(b"fmt ");
        v.extend_from_slice(&16u32.to_le_bytes());
        v.extend_from_slice(&1u16.to_le_bytes());
        v.extend_from_slice(&channels.to_le_bytes());
        v.extend_from_slice(&sample_rate.to_le_bytes());
        let byte_rate = sample_rate * u32::from(channels) * u32::from(bits) / 8;
        v.extend_from_slice(&byte_rate.to_le_bytes());
        let block_align = channels * bits / 8;
        v.extend_from_slice(&block_align.to_le_bytes());
        v.extend_from_slice(&bits.to_le_bytes());
        v.extend_from_slice(b"data");
        v.extend_from_slice(&(data.len() as u32).to_le_bytes());
        v.extend_from_slice(data);
        v
    }

    static EMPTY_ENTRIES: &[AssetEntry] = &[];

    #[tokio::test]
    async fn module_query_yields_announce() {
        let engine = engine();
        engine.stop_all().await;
        let mut adapter = CommandAdapter::new(engine, 7);
        let mut bus = MockBus::new();
        let mut storage = MockStorage::new();
        let registry = StaticAssetRegistry::new(EMPTY_ENTRIES);
        let finished = FinishedChannel::new();

        bus.push_inbound(Frame::new(id::MODULE_QUERY, &[]));
        adapter.poll(&mut bus, &mut storage, &registry, &TokioSpawner, &finished).await;

        let sent = bus.sent();
        assert_eq!(sent[0].id, id::MODULE_ANNOUNCE);
        assert_eq!(sent[0].payload()[5], 7);
    }

    #[tokio::test]
    async fn play_sound_missing_everywhere_is_file_not_found() {
        let engine = engine();
        engine.stop_all().await;
        let mut adapter = CommandAdapter::new(engine, 0);
        let mut bus = MockBus::new();
        let mut storage = MockStorage::new();
        let registry = StaticAssetRegistry::new(EMPTY_ENTRIES);
        let finished = FinishedChannel::new();

        bus.push_inbound(Frame::new(id::PLAY_SOUND, &[99, 0, 0, 100, 1, 0]));
        adapter.poll(&mut bus, &mut storage, &registry, &TokioSpawner, &finished).await;

        let sent = bus.sent();
        assert_eq!(sent[0].id, id::SOUND_ACK);
        assert_eq!(sent[0].payload()[0], 0);
        assert_eq!(sent[0].payload()[4], ErrorCode::FileNotFound as u8);
    }

    #[tokio::test]
    async fn play_sound_from_storage_acks_and_spawns_decoder() {
        let engine = engine();
        engine.stop_all().await;
        engine.set_sink_ready().await;
        let mut adapter = CommandAdapter::new(engine, 0);
        let mut bus = MockBus::new();
        let mut storage = MockStorage::new();
        storage.put("sounds/0001.wav", build_wav(1, 8, 44_100, &[128, 128]));
        let registry = StaticAssetRegistry::new(EMPTY_ENTRIES);
        let finished = FinishedChannel::new();

        bus.push_inbound(Frame::new(id::PLAY_SOUND, &[1, 0, 0, 100, 5, 0]));
        adapter.poll(&mut bus, &mut storage, &registry, &TokioSpawner, &finished).await;

        let sent = bus.sent();
        assert_eq!(sent[0].id, id::SOUND_ACK);
        assert_eq!(sent[0].payload()[0], 1);
        let queue_id = sent[0].payload()[3];
        assert_ne!(queue_id, 0);
    }

    #[tokio::test]
    async fn play_sound_falls_back_to_asset_registry() {
        let engine = engine();
        engine.stop_all().await;
        let mut adapter = CommandAdapter::new(engine, 0);
        let mut bus = MockBus::new();
        let mut storage = MockStorage::new();
        let bytes: &'static [u8] =
            std::boxed::Box::leak(build_wav(1, 8, 44_100, &[128, 128]).into_boxed_slice());
        static ENTRIES: OnceLock<std::vec::Vec<AssetEntry>> = OnceLock::new();
        let entries = ENTRIES.get_or_init(|| std::vec![AssetEntry { sound_id: 10, bytes, name: "chime" }]);
        let registry = StaticAssetRegistry::new(entries);
        let finished = FinishedChannel::new();

        bus.push_inbound(Frame::new(id::PLAY_SOUND, &[10, 0, 0, 100, 0, 0]));
        adapter.poll(&mut bus, &mut storage, &registry, &TokioSpawner, &finished).await;

        let sent = bus.sent();
        assert_eq!(sent[0].id, id::SOUND_ACK);
        assert_eq!(sent[0].payload()[0], 1);
    }

    #[tokio::test]
    async fn stop_sound_unknown_queue_id_is_rejected() {
        let engine = engine();
        engine.stop_all().await;
        let mut adapter = CommandAdapter::new(engine, 0);
        let mut bus = MockBus::new();
        let mut storage = MockStorage::new();
        let registry = StaticAssetRegistry::new(EMPTY_ENTRIES);
        let finished = FinishedChannel::new();

        bus.push_inbound(Frame::new(id::STOP_SOUND, &[42, 0, 0, 0, 0]));
        adapter.poll(&mut bus, &mut storage, &registry, &TokioSpawner, &finished).await;

        let sent = bus.sent();
        assert_eq!(sent[0].id, id::SOUND_ACK);
        assert_eq!(sent[0].payload()[0], 0);
        assert_eq!(sent[0].payload()[4], ErrorCode::InvalidQueueId as u8);
    }

    #[tokio::test]
    async fn stop_sound_on_a_live_tagged_slot_acks_then_emits_finished() {
        let engine = engine();
        engine.stop_all().await;
        engine.set_sink_ready().await;
        let mut adapter = CommandAdapter::new(engine, 0);
        let mut bus = MockBus::new();
        let mut storage = MockStorage::new();
        storage.put("sounds/0001.wav", build_wav(1, 8, 44_100, &[128, 128]));
        let registry = StaticAssetRegistry::new(EMPTY_ENTRIES);
        let finished = FinishedChannel::new();

        bus.push_inbound(Frame::new(id::PLAY_SOUND, &[1, 0, 0, 100, 5, 0]));
        adapter.poll(&mut bus, &mut storage, &registry, &TokioSpawner, &finished).await;
        let queue_id = bus.sent()[0].payload()[3];

        bus.push_inbound(Frame::new(id::STOP_SOUND, &[queue_id, 0, 0, 0, 6]));
        adapter.poll(&mut bus, &mut storage, &registry, &TokioSpawner, &finished).await;

        let sent = bus.sent();
        assert_eq!(sent[1].id, id::SOUND_ACK);
        assert_eq!(sent[1].payload()[0], 1);
        assert_eq!(sent[1].payload()[3], queue_id);
        assert_eq!(sent[2].id, id::SOUND_FINISHED);
        assert_eq!(sent[2].payload()[0], queue_id);
        assert_eq!(sent[2].payload()[3], FinishReason::Stopped as u8);
    }

    #[tokio::test]
    async fn stop_all_emits_finished_for_every_tagged_slot() {
        let engine = engine();
        engine.stop_all().await;
        engine.set_sink_ready().await;
        let mut adapter = CommandAdapter::new(engine, 0);
        let mut bus = MockBus::new();
        let mut storage = MockStorage::new();
        storage.put("sounds/0001.wav", build_wav(1, 8, 44_100, &[128, 128]));
        storage.put("sounds/0002.wav", build_wav(1, 8, 44_100, &[128, 128]));
        let registry = StaticAssetRegistry::new(EMPTY_ENTRIES);
        let finished = FinishedChannel::new();

        bus.push_inbound(Frame::new(id::PLAY_SOUND, &[1, 0, 0, 100, 1, 0]));
        adapter.poll(&mut bus, &mut storage, &registry, &TokioSpawner, &finished).await;
        bus.push_inbound(Frame::new(id::PLAY_SOUND, &[2, 0, 0, 100, 2, 0]));
        adapter.poll(&mut bus, &mut storage, &registry, &TokioSpawner, &finished).await;

        bus.push_inbound(Frame::new(id::STOP_ALL, &[]));
        adapter.poll(&mut bus, &mut storage, &registry, &TokioSpawner, &finished).await;

        let finished_frames: std::vec::Vec<_> = bus.sent().iter().filter(|f| f.id == id::SOUND_FINISHED).collect();
        assert_eq!(finished_frames.len(), 2);
        for f in finished_frames {
            assert_eq!(f.payload()[3], FinishReason::Stopped as u8);
        }
    }

    #[tokio::test]
    async fn finished_channel_is_drained_as_sound_finished_frames() {
        let engine = engine();
        engine.stop_all().await;
        let mut adapter = CommandAdapter::new(engine, 0);
        let mut bus = MockBus::new();
        let mut storage = MockStorage::new();
        let registry = StaticAssetRegistry::new(EMPTY_ENTRIES);
        let finished = FinishedChannel::new();
        finished.try_send((QueueId::new(3), SoundIndex::new(1), FinishReason::Completed)).expect("channel has room");

        adapter.poll(&mut bus, &mut storage, &registry, &TokioSpawner, &finished).await;

        let sent = bus.sent();
        assert_eq!(sent[0].id, id::SOUND_FINISHED);
        assert_eq!(sent[0].payload()[0], 3);
        assert_eq!(sent[0].payload()[3], 0);
    }
}
