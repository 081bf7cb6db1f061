//! UART command bus stub for the hardware target.
//!
//! This is a placeholder that compiles but never transports a frame.
//! The full implementation requires an Embassy UART (or CAN transceiver)
//! peripheral and a framing layer on top of it; both are blocked on board
//! bring-up.
//!
//! # TODO
//! Replace the stub body in `bus_recv`/`bus_send` with real UART DMA
//! transfers once the transceiver pins and baud rate are finalized.

use platform::{Frame, MessageBus as Bus};

/// Error type for the hardware command bus.
#[derive(Debug)]
pub enum UartBusError {
    /// This stub operation is not yet implemented.
    NotImplemented,
}

impl core::fmt::Display for UartBusError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotImplemented => f.write_str("UART command bus not yet implemented"),
        }
    }
}

/// UART-backed command bus — stub implementation.
///
/// Construct with `UartBus::new(uart_peripheral)` once the transceiver is
/// wired. For now every call returns `NotImplemented`, matching
/// `platform::storage_sdmmc::SdmmcStorage`: the command adapter swallows
/// both `bus_recv` and `bus_send` errors, so the rest of the protocol runs
/// unaffected while this stays stubbed.
pub struct UartBus;

impl UartBus {
    /// Create a new (stub) UART command bus.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for UartBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus for UartBus {
    type Error = UartBusError;

    async fn bus_recv(&mut self, _timeout_ms: u64) -> Result<Option<Frame>, Self::Error> {
        Err(UartBusError::NotImplemented)
    }

    async fn bus_send(&mut self, _frame: &Frame) -> Result<(), Self::Error> {
        Err(UartBusError::NotImplemented)
    }
}
