//! Decoder task spawning abstraction.
//!
//! A decoder is generic over its [`platform::File`] type, and
//! `#[embassy_executor::task]` functions cannot be generic, so the command
//! adapter spawns decoders through this trait instead of a concrete Embassy
//! task. The emulator build satisfies it with [`TokioSpawner`]; a hardware
//! build needs one concrete, monomorphized Embassy task per storage
//! backend, which is out of scope here.

/// Fire-and-forget spawner for decoder futures.
pub trait TaskSpawner {
    /// Run `fut` to completion, detached from the caller.
    fn spawn<Fut>(&self, fut: Fut)
    where
        Fut: core::future::Future<Output = ()> + Send + 'static;
}

/// [`TaskSpawner`] backed by `tokio::spawn`, for the desktop emulator and tests.
#[cfg(any(test, feature = "std"))]
pub struct TokioSpawner;

#[cfg(any(test, feature = "std"))]
impl TaskSpawner for TokioSpawner {
    fn spawn<Fut>(&self, fut: Fut)
    where
        Fut: core::future::Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(fut);
    }
}
