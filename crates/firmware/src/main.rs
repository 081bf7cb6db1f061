//! Sound module firmware — hardware entry point.

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use static_cell::StaticCell;

use playback::Engine;
use protocol::FinishedChannel;

// Panic handler
use panic_probe as _;

static ENGINE: StaticCell<Engine> = StaticCell::new();
static FINISHED: StaticCell<FinishedChannel> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    defmt::info!("{=str} firmware starting", platform::config::APP_NAME_SHORT);

    // `Engine::new` owns process-wide `StaticCell`s for the per-slot ring
    // buffers and EOF flags, so it must be called exactly once; storing the
    // instance in its own `StaticCell` gives the two tasks below the
    // `&'static Engine` they need without an `unsafe` static mut.
    let engine: &'static Engine = ENGINE.init(Engine::new());
    let finished: &'static FinishedChannel = FINISHED.init(FinishedChannel::new());

    // TODO: once a real `platform::Sink` is wired in `sink_hardware`, call
    // `engine.set_sink_ready().await` here after confirming the DAC path is
    // live, rather than leaving the mixer permanently gated off.

    spawner.must_spawn(firmware::tasks::adapter_task(engine, finished));
    spawner.must_spawn(firmware::tasks::mixer_task(engine, finished));

    defmt::info!("Adapter and mixer tasks spawned");
}
