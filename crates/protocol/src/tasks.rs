//! Long-running task bodies that glue `playback` and the command adapter.

use embassy_time::Instant;

use platform::Sink;
use playback::Engine;

use crate::adapter::FinishedChannel;

/// Drive the mixer tick forever, forwarding every terminal slot it reports
/// to `finished` so [`crate::adapter::CommandAdapter`] can emit
/// `SOUND_FINISHED`.
///
/// Runs until cancelled; intended to be spawned as its own task alongside
/// the command adapter's poll loop.
pub async fn run_mixer_loop<S: Sink>(engine: &Engine, sink: &mut S, finished: &FinishedChannel) -> ! {
    loop {
        let done = playback::mixer::tick(&engine.table, sink, Instant::now()).await;
        for tag in done {
            finished.send(tag).await;
        }
    }
}
