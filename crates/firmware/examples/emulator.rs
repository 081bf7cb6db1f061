//! Desktop emulator demo.
//!
//! Wires the command protocol, playback engine, and a console sink together
//! on tokio, drives a couple of commands through an in-memory bus, and
//! prints every frame the module sends back.
//!
//! Run with: cargo run --example emulator --features emulator

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use playback::Engine;
use platform::mocks::MockBus;
use platform::{AssetEntry, Frame, Sink, StaticAssetRegistry, Storage};
use protocol::spawn::TokioSpawner;
use protocol::{frame::id, CommandAdapter, FinishedChannel};

/// Audio sink that discards samples but counts them, for a println heartbeat.
struct ConsoleSink {
    ready: bool,
    samples_written: AtomicU64,
}

impl ConsoleSink {
    fn new() -> Self {
        Self { ready: true, samples_written: AtomicU64::new(0) }
    }
}

impl Sink for ConsoleSink {
    type Error = std::convert::Infallible;

    fn sink_ready(&self) -> bool {
        self.ready
    }

    async fn sink_write(&mut self, frames_le16: &[i16]) -> Result<usize, Self::Error> {
        self.samples_written.fetch_add(frames_le16.len() as u64, Ordering::Relaxed);
        Ok(frames_le16.len())
    }
}

static EMBEDDED_ASSETS: &[AssetEntry] = &[];

#[allow(clippy::indexing_slicing)] // every frame kind here has a fixed-size payload
fn describe(frame: &Frame) -> String {
    match frame.id {
        id::MODULE_ANNOUNCE => "MODULE_ANNOUNCE".to_string(),
        id::SOUND_ACK => {
            let p = frame.payload();
            format!("SOUND_ACK ok={} queue_id={} error_code={}", p[0] == 1, p[3], p[4])
        }
        id::SOUND_STATUS => "SOUND_STATUS".to_string(),
        id::SOUND_FINISHED => format!("SOUND_FINISHED queue_id={}", frame.payload()[0]),
        other => format!("frame 0x{other:03x}"),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    println!("=== Sound module emulator ===\n");

    let root = std::env::var("MUSIC_PATH").unwrap_or_else(|_| ".".to_string());
    let mut storage = platform::storage_local::LocalFileStorage::new(&root);
    tracing::info!(root = %root, mounted = storage.is_mounted(), "storage mounted");
    println!("storage root: {root} (mounted={})", storage.is_mounted());

    let registry = StaticAssetRegistry::new(EMBEDDED_ASSETS);
    let engine = Engine::new();
    let mut adapter = CommandAdapter::new(&engine, 0);
    let mut bus = MockBus::new();
    let finished = FinishedChannel::new();
    let mut sink = ConsoleSink::new();

    engine.set_sink_ready().await;

    // sound_index=1, reserved, reserved, volume=80, request_id=1, flags=0 (no loop/interrupt)
    bus.push_inbound(Frame::new(id::PLAY_SOUND, &[1, 0, 0, 80, 1, 0]));

    // The mixer loop never returns; race it against a handful of adapter
    // polls and drop it once the demo command has been serviced and acked.
    tokio::select! {
        () = async { let _ = protocol::run_mixer_loop(&engine, &mut sink, &finished).await; } => {}
        () = async {
            for _ in 0..5 {
                adapter.poll(&mut bus, &mut storage, &registry, &TokioSpawner, &finished).await;
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        } => {}
    }

    for frame in bus.sent() {
        println!("<- {}", describe(frame));
    }

    println!("\n=== Done ===");
}
