//! Mixer loop (C5): the periodic consumer that drains every playing slot's
//! ring, mixes to mono-duplicated stereo with saturation, applies master
//! volume, and writes the tick to the sink.
//!
//! Both mono and stereo sources are downmixed to mono before output: a
//! stereo pair `(l, r)` becomes `m = (l + r) / 2` and is written identically
//! to both output channels. The physical sink is a single speaker wired to
//! both channels, so there is no point carrying a stereo image past this
//! stage — this is a deliberate, tested policy, not an oversight.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, Instant, Timer};

use platform::{QueueId, Sink, SoundIndex};

use crate::slot::{FinishReason, SlotState, SlotTable};
use crate::volume::{downmix_mono, saturate_i16, scale};

const TICK_SAMPLES: usize = platform::config::FRAMES_PER_TICK * 2;

/// One pass of the mixer loop.
///
/// Returns the tagged slots that reached a terminal state this tick; the
/// caller (the command adapter, or a test) turns each into a
/// `SOUND_FINISHED` notification outside the lock.
pub async fn tick<S: Sink, const N: usize>(
    table: &Mutex<CriticalSectionRawMutex, SlotTable<N>>,
    sink: &mut S,
    now: Instant,
) -> heapless::Vec<(QueueId, SoundIndex, FinishReason), N> {
    let mut acc = [0i32; TICK_SAMPLES];
    let mut scratch = [0i16; TICK_SAMPLES];
    let mut max_written = 0usize;
    let mut any_playing = false;
    let mut finished: heapless::Vec<(QueueId, SoundIndex, FinishReason), N> = heapless::Vec::new();

    let (sink_ready, master_volume) = {
        let mut guard = table.lock().await;
        let sink_ready = guard.sink_ready;
        let master_volume = guard.master_volume.get();

        for idx in 0..N {
            process_slot(&mut guard, idx, now, &mut scratch, &mut acc, &mut max_written, &mut finished);
            if guard.slots[idx].state == SlotState::Playing {
                any_playing = true;
            }
        }

        (sink_ready, master_volume)
    };

    if max_written > 0 && master_volume != 100 {
        #[allow(clippy::indexing_slicing)] // max_written <= TICK_SAMPLES by construction
        for sample in &mut acc[..max_written] {
            *sample = scale(*sample, master_volume);
        }
    }

    let mut out = [0i16; TICK_SAMPLES];
    for (o, a) in out.iter_mut().zip(acc.iter()) {
        *o = saturate_i16(*a);
    }

    if sink_ready {
        let _ = sink.sink_write(&out).await;
    }
    if !sink_ready || !any_playing {
        Timer::after(Duration::from_millis(platform::config::MIXER_IDLE_SLEEP_MS)).await;
    }

    finished
}

#[allow(clippy::too_many_arguments)]
fn process_slot<const N: usize>(
    guard: &mut SlotTable<N>,
    idx: usize,
    now: Instant,
    scratch: &mut [i16; TICK_SAMPLES],
    acc: &mut [i32; TICK_SAMPLES],
    max_written: &mut usize,
    finished: &mut heapless::Vec<(QueueId, SoundIndex, FinishReason), N>,
) {
    #[allow(clippy::indexing_slicing)] // idx < N by the caller's loop range
    let state = guard.slots[idx].state;

    if state == SlotState::Stopped {
        #[allow(clippy::indexing_slicing)]
        let slot = &mut guard.slots[idx];
        if !slot.is_untagged() {
            let _ = finished.push((slot.queue_id, slot.sound_index, FinishReason::Completed));
        }
        slot.state = SlotState::Idle;
        return;
    }

    if state == SlotState::Stopping {
        #[allow(clippy::indexing_slicing)]
        let slot = &mut guard.slots[idx];
        slot.state = SlotState::Draining;
        slot.drain_deadline = Some(now + Duration::from_millis(platform::config::DRAIN_MS));
        return;
    }

    if state == SlotState::Draining {
        #[allow(clippy::indexing_slicing)]
        let slot = &mut guard.slots[idx];
        if let Some(deadline) = slot.drain_deadline {
            if now >= deadline {
                slot.state = SlotState::Stopped;
            }
        }
        return;
    }

    if state != SlotState::Playing {
        return;
    }

    #[allow(clippy::indexing_slicing)]
    let Some(channel) = guard.slots[idx].channel else { return };
    let channels = channel.flags.channels();
    if channels == 0 {
        return;
    }
    let channels = channels as usize;
    let budget = (platform::config::FRAMES_PER_TICK * channels).min(scratch.len());
    #[allow(clippy::indexing_slicing)]
    let n = channel.ring.read_slice(&mut scratch[..budget]);

    if n == 0 {
        if channel.flags.is_eof() {
            #[allow(clippy::indexing_slicing)]
            let slot = &mut guard.slots[idx];
            slot.state = SlotState::Draining;
            slot.drain_deadline = Some(now + Duration::from_millis(platform::config::DRAIN_MS));
        }
        return;
    }

    #[allow(clippy::indexing_slicing)]
    let volume: u8 = guard.slots[idx].volume.get();
    let frames = n / channels;

    #[allow(clippy::indexing_slicing)] // frames*2 <= TICK_SAMPLES since frames <= FRAMES_PER_TICK
    for f in 0..frames {
        let mixed = if channels == 1 {
            scale(i32::from(scratch[f]), volume)
        } else {
            let l = i32::from(scratch[f * 2]);
            let r = i32::from(scratch[f * 2 + 1]);
            scale(downmix_mono(l, r), volume)
        };
        acc[f * 2] = acc[f * 2].saturating_add(mixed);
        acc[f * 2 + 1] = acc[f * 2 + 1].saturating_add(mixed);
    }
    *max_written = (*max_written).max(frames * 2);
}
