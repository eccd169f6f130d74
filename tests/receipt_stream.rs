//! End-to-end checks on the public encoding API: a synthetic receipt goes
//! in, a fully framed ESC/POS command stream comes out. Transport delivery
//! needs a physical printer and is exercised by the demos instead.

use escpos_raster::{encode, Align, CommandStream, CutMode, EncodeOptions, PixelBuffer};

const BLACK: [u8; 4] = [0x00, 0x00, 0x00, 0xFF];

/// A small receipt-like image: header bar, a few "text" lines of gray
/// pixels, and a separator rule.
fn sample_receipt(width: u32) -> PixelBuffer {
    let mut image = PixelBuffer::new(width, 96);
    image.fill_rect(0, 0, width, 20, BLACK);
    for line in 0..4 {
        image.fill_rect(8, 32 + line * 12, width - 16, 6, [90, 90, 90, 0xFF]);
    }
    image.fill_rect(0, 88, width, 2, BLACK);
    image
}

fn raster_offset(init: bool, align: bool) -> usize {
    (if init { 2 } else { 0 }) + (if align { 3 } else { 0 })
}

#[test]
fn full_receipt_framing() {
    let image = sample_receipt(384);
    let stream = encode(&image, &EncodeOptions::new()).unwrap();
    let bytes = stream.as_bytes();

    // 384 wide -> 48 bytes per line, 96 rows.
    assert_eq!(stream.raster_payload_len(), 48 * 96);

    // ESC @ up front.
    assert_eq!(&bytes[..2], &[0x1B, 0x40]);

    // GS v 0 header with little-endian dimensions.
    let header = &bytes[raster_offset(true, false)..raster_offset(true, false) + 8];
    assert_eq!(header, &[0x1D, 0x76, 0x30, 0x00, 48, 0, 96, 0]);

    // Three feeds then a partial cut close the stream.
    let tail = &bytes[bytes.len() - 6..];
    assert_eq!(tail, &[0x0A, 0x0A, 0x0A, 0x1D, 0x56, 0x01]);

    // Total length is fully determined by the options and dimensions.
    assert_eq!(bytes.len(), 2 + 8 + 48 * 96 + 3 + 3);
}

#[test]
fn centered_full_cut_variant() {
    let image = sample_receipt(384);
    let options = EncodeOptions::new()
        .align(Align::Center)
        .cut_mode(CutMode::Full)
        .feed_lines(2);
    let stream = encode(&image, &options).unwrap();
    let bytes = stream.as_bytes();

    assert_eq!(&bytes[2..5], &[0x1B, 0x61, 0x01]);
    assert_eq!(&bytes[bytes.len() - 3..], &[0x1D, 0x56, 0x00]);
    assert_eq!(bytes.len(), 2 + 3 + 8 + 48 * 96 + 2 + 3);
}

#[test]
fn contrast_presets_share_framing_but_differ_in_payload() {
    // Gray 90 text lines print under both thresholds; gray 150 only under
    // the high-contrast preset.
    let mut image = sample_receipt(384);
    image.fill_rect(8, 80, 368, 6, [150, 150, 150, 0xFF]);

    let normal = encode(&image, &EncodeOptions::new()).unwrap();
    let contrast = encode(&image, &EncodeOptions::high_contrast()).unwrap();

    assert_eq!(normal.len(), contrast.len());
    assert_ne!(normal, contrast);

    let start = raster_offset(true, false) + 8;
    let row = |s: &CommandStream, y: usize| s.as_bytes()[start + y * 48..start + (y + 1) * 48].to_vec();

    // The solid header bar is identical under both presets.
    assert_eq!(row(&normal, 0), row(&contrast, 0));
    assert_eq!(row(&normal, 0), vec![0xFF; 48]);

    // The light-gray rule at y=80 only shows up in the contrast variant.
    assert_eq!(row(&normal, 80), vec![0x00; 48]);
    assert_ne!(row(&contrast, 80), vec![0x00; 48]);
}

#[test]
fn streams_do_not_share_state() {
    // Two receipts encoded back to back with cuts enabled are complete,
    // independent streams: both end in their own cut sequence.
    let first = encode(&sample_receipt(384), &EncodeOptions::new()).unwrap();
    let second = encode(&sample_receipt(384), &EncodeOptions::new()).unwrap();

    for stream in [&first, &second].iter() {
        let bytes = stream.as_bytes();
        assert_eq!(&bytes[..2], &[0x1B, 0x40]);
        assert_eq!(&bytes[bytes.len() - 3..], &[0x1D, 0x56, 0x01]);
    }
    assert_eq!(first, second);
}
