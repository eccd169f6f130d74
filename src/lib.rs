//! ESC/POS Raster Receipt Printing
//!
//! This crate converts a rendered RGBA image into an ESC/POS raster
//! command stream and drives a USB thermal printer with it.
//!
//! # Example
//!
//! ```rust,no_run
//! use escpos_raster::{encode, EncodeOptions, PixelBuffer, Session, TransportConfig};
//!
//! let receipt = PixelBuffer::new(escpos_raster::PRINTER_58MM_WIDTH, 240);
//! let stream = encode(&receipt, &EncodeOptions::new()).unwrap();
//!
//! let config = TransportConfig::new(0x0456, 0x0808);
//! let mut session = Session::open(config).unwrap();
//! session.write(&stream).unwrap();
//! session.close();
//! ```

mod encoder;
mod error;
mod image;
mod transport;

pub use crate::{
    encoder::{encode, Align, CommandStream, CutMode, EncodeOptions},
    error::Error,
    image::{luminance, PixelBuffer, PixelSource},
    transport::{Session, TransportConfig},
};

/// Dot width of a 58 mm thermal print head.
///
/// Receipts rendered for the common 58 mm paper should be 384 pixels wide,
/// packing to 48 bytes per raster row (384 / 8 = 48).
pub const PRINTER_58MM_WIDTH: u32 = 384;

/// Dot width of an 80 mm thermal print head.
///
/// 80 mm paper carries 576 pixels across, packing to 72 bytes per raster
/// row (576 / 8 = 72).
pub const PRINTER_80MM_WIDTH: u32 = 576;
