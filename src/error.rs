//! Error types for receipt encoding and printer transport.
//!
//! This module defines all possible errors that can occur while turning a
//! pixel image into an ESC/POS command stream and delivering it to the
//! physical device.

use rusb;
use thiserror::Error;

/// Main error type for encoder and transport operations.
///
/// Validation and source errors fail before any bytes are produced, so a
/// caller never receives a partially encoded receipt. Transport errors are
/// surfaced with enough detail to show a user-facing retry prompt; they are
/// never swallowed, because a failed print has a real-world consequence.
#[derive(Error, Debug)]
pub enum Error {
    /// USB communication error.
    ///
    /// Wraps underlying rusb errors for device communication issues,
    /// timeouts, or permission problems.
    #[error(transparent)]
    UsbError(#[from] rusb::Error),

    /// Image has zero width or zero height.
    #[error("Image is empty (zero width or height)")]
    EmptyImage,

    /// Image dimensions do not fit the 16-bit raster header fields.
    ///
    /// GS v 0 encodes bytes-per-line and row count as little-endian u16,
    /// so either dimension above 65535 is a caller error. Nothing is
    /// encoded when this is returned.
    #[error("Image dimensions {width}x{height} exceed the 16-bit raster limit")]
    DimensionOverflow { width: u32, height: u32 },

    #[error("Pixel source is not ready")]
    SourceNotReady,

    #[error("Pixel read out of bounds at ({x}, {y})")]
    OutOfBounds { x: u32, y: u32 },

    #[error("Pixel data is {actual} bytes, expected {expected} for the given dimensions")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// The operating system refused to hand over the device.
    ///
    /// Typically a permissions problem (udev rules on Linux, missing
    /// entitlement elsewhere) or another process holding the printer.
    #[error("Access to the printer device was denied")]
    ConnectionDenied,

    /// Printer device is not connected or not responding.
    #[error("Device is offline")]
    DeviceOffline,

    #[error("Can't read device list, permission issue ?")]
    DeviceListNotReadable,

    /// The matched device exposes no bulk output endpoint, so it cannot
    /// accept a print stream.
    #[error("Device has no bulk output endpoint")]
    DeviceNotSupported,

    /// Another session is already open in this process.
    ///
    /// The transport allows at most one live session per process; close
    /// the existing one before opening again.
    #[error("A printer session is already open")]
    SessionBusy,

    #[error("Session is closed")]
    SessionClosed,

    /// The device stopped accepting data mid-stream.
    #[error("Write stalled after {written} of {total} bytes")]
    WriteFailed { written: usize, total: usize },

    /// The write timed out with an unknown amount of data printed.
    ///
    /// The outcome is ambiguous, so the session is closed and must be
    /// reopened. Re-sending the stream risks a duplicate receipt; that
    /// decision belongs to the caller.
    #[error("Write timed out after {written} bytes, session closed")]
    WriteTimeout { written: usize },
}
