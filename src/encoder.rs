use crate::{
    error::Error,
    image::{is_dark, PixelSource},
};

/// Horizontal alignment of the raster block on the paper.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    fn code(self) -> u8 {
        match self {
            Self::Left => 0x00,
            Self::Center => 0x01,
            Self::Right => 0x02,
        }
    }
}

/// Cut issued after the receipt.
///
/// Partial leaves a small uncut tab so the receipt does not drop; full
/// separates the paper completely.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CutMode {
    Partial,
    Full,
}

impl CutMode {
    fn code(self) -> u8 {
        match self {
            Self::Partial => 0x01,
            Self::Full => 0x00,
        }
    }
}

/// Encoding configuration.
///
/// # Example
///
/// ```
/// use escpos_raster::{Align, EncodeOptions};
///
/// let options = EncodeOptions::new()
///     .threshold(160)
///     .align(Align::Center)
///     .feed_lines(2);
/// ```
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    threshold: u8,
    align: Option<Align>,
    leading_init: bool,
    feed_lines: u8,
    append_cut: bool,
    cut_mode: CutMode,
}

impl EncodeOptions {
    /// Default options: threshold 128, initialize printer, no alignment
    /// command, 3 feed lines, partial cut.
    pub fn new() -> Self {
        EncodeOptions {
            threshold: 128,
            align: None,
            leading_init: true,
            feed_lines: 3,
            append_cut: true,
            cut_mode: CutMode::Partial,
        }
    }

    /// Preset for text-heavy receipts.
    ///
    /// Raises the dark threshold to 200 so thin anti-aliased glyph edges
    /// still come out as solid dots.
    pub fn high_contrast() -> Self {
        EncodeOptions {
            threshold: 200,
            ..Self::new()
        }
    }

    /// Set the dark threshold. A pixel prints when its paper-composited
    /// luminance is strictly below this value.
    pub fn threshold(self, threshold: u8) -> Self {
        EncodeOptions { threshold, ..self }
    }

    /// Emit an alignment command before the raster block.
    pub fn align(self, align: Align) -> Self {
        EncodeOptions {
            align: Some(align),
            ..self
        }
    }

    /// Whether to prepend the initialize-printer command.
    pub fn leading_init(self, flag: bool) -> Self {
        EncodeOptions {
            leading_init: flag,
            ..self
        }
    }

    /// Number of line feeds after the raster block, advancing the paper
    /// past the print head. 2 or 3 is conventional.
    pub fn feed_lines(self, lines: u8) -> Self {
        EncodeOptions {
            feed_lines: lines,
            ..self
        }
    }

    /// Whether to append the cut command.
    pub fn append_cut(self, flag: bool) -> Self {
        EncodeOptions {
            append_cut: flag,
            ..self
        }
    }

    pub fn cut_mode(self, mode: CutMode) -> Self {
        EncodeOptions {
            cut_mode: mode,
            ..self
        }
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// A built ESC/POS command stream, ready to hand to the transport.
///
/// Immutable once built. Encoding is a pure function of the image and
/// options, so identical inputs always produce an identical stream.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandStream {
    bytes: Vec<u8>,
    raster_len: usize,
}

impl CommandStream {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Length of the raster payload alone: `ceil(width / 8) * height`.
    pub fn raster_payload_len(&self) -> usize {
        self.raster_len
    }
}

/// Encode a pixel image as an ESC/POS raster print stream.
///
/// Single synchronous pass: validate dimensions, emit the preamble and the
/// GS v 0 header, pack each row into `ceil(width / 8)` bytes MSB-first,
/// then feed and cut. Rows run top to bottom, bytes left to right; bits
/// past the right edge of the image stay 0 (white).
///
/// Fails before emitting anything on an empty or oversized image, and
/// aborts without output if the source refuses a pixel read.
pub fn encode<S: PixelSource>(image: &S, options: &EncodeOptions) -> Result<CommandStream, Error> {
    let width = image.width();
    let height = image.height();

    if width == 0 || height == 0 {
        return Err(Error::EmptyImage);
    }
    if width > 0xFFFF || height > 0xFFFF {
        return Err(Error::DimensionOverflow { width, height });
    }

    let bytes_per_line = ((width + 7) / 8) as usize;
    let raster_len = bytes_per_line * height as usize;
    let mut buf: Vec<u8> = Vec::with_capacity(raster_len + 16);

    if options.leading_init {
        buf.extend_from_slice(&[0x1B, 0x40]); // ESC @ : Initialize printer
    }
    if let Some(align) = options.align {
        buf.extend_from_slice(&[0x1B, 0x61, align.code()]); // ESC a : Set alignment
    }

    // GS v 0 m xL xH yL yH : Raster bit image, normal density
    buf.extend_from_slice(&[0x1D, 0x76, 0x30, 0x00]);
    buf.extend_from_slice(&(bytes_per_line as u16).to_le_bytes());
    buf.extend_from_slice(&(height as u16).to_le_bytes());

    for y in 0..height {
        for group in 0..bytes_per_line as u32 {
            let mut byte: u8 = 0x00;
            for bit in 0..8 {
                let x = group * 8 + bit;
                if x >= width {
                    break;
                }
                if is_dark(image.pixel(x, y)?, options.threshold) {
                    byte |= 0x80 >> bit;
                }
            }
            buf.push(byte);
        }
    }

    for _ in 0..options.feed_lines {
        buf.push(0x0A); // LF : Advance paper
    }
    if options.append_cut {
        buf.extend_from_slice(&[0x1D, 0x56, options.cut_mode.code()]); // GS V : Cut paper
    }

    Ok(CommandStream {
        bytes: buf,
        raster_len,
    })
}
