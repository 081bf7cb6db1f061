//! Embassy task wrappers — hardware target only.
//!
//! `#[embassy_executor::task]` functions cannot be generic, so each long-running
//! job the command protocol defines generically (`CommandAdapter::poll`,
//! `protocol::run_mixer_loop`) gets one concrete, monomorphized wrapper here,
//! wired against the hardware doubles in [`crate::bus_hardware`] and
//! [`crate::sink_hardware`].

use platform::storage_sdmmc::SdmmcStorage;
use platform::StaticAssetRegistry;
use playback::Engine;
use protocol::spawn::TaskSpawner;
use protocol::{CommandAdapter, FinishedChannel};

use crate::bus_hardware::UartBus;
use crate::sink_hardware::HardwareSink;

static NO_EMBEDDED_ASSETS: &[platform::AssetEntry] = &[];

/// Decoder spawner for the hardware target.
///
/// `DecodeSource` is generic over its storage's `File` type, so spawning a
/// decoder needs a concrete, monomorphized Embassy task per storage backend
/// — out of scope until [`SdmmcStorage`] is a real implementation rather
/// than a stub. Until then every decode future is dropped unrun; no sound
/// plays, but the rest of the command protocol (acks, status, stop) is
/// unaffected, same as [`crate::bus_hardware::UartBus`] and
/// [`crate::sink_hardware::HardwareSink`].
pub struct NullSpawner;

impl TaskSpawner for NullSpawner {
    fn spawn<Fut>(&self, _fut: Fut)
    where
        Fut: core::future::Future<Output = ()> + Send + 'static,
    {
    }
}

/// Command adapter poll loop, spawned once at boot.
#[embassy_executor::task]
pub async fn adapter_task(engine: &'static Engine, finished: &'static FinishedChannel) {
    let mut adapter = CommandAdapter::new(engine, 0);
    let mut bus = UartBus::new();
    let mut storage = SdmmcStorage::new();
    let registry = StaticAssetRegistry::new(NO_EMBEDDED_ASSETS);

    adapter.announce_boot(&mut bus).await;
    loop {
        adapter.poll(&mut bus, &mut storage, &registry, &NullSpawner, finished).await;
    }
}

/// Mixer tick loop, spawned once at boot alongside [`adapter_task`].
#[embassy_executor::task]
pub async fn mixer_task(engine: &'static Engine, finished: &'static FinishedChannel) {
    let mut sink = HardwareSink::new();
    protocol::run_mixer_loop(engine, &mut sink, finished).await;
}
