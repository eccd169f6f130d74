use escpos_raster::{encode, Align, EncodeOptions, PixelBuffer, Session, TransportConfig};
use qrcode::QrCode;
use std::env;

//
// cargo run --example print_qr -- "https://example.com/ticket/42"
//
// Renders a QR code and prints it centered, followed by a partial cut.
// Printer selection via PRINTER_VID / PRINTER_PID / PRINTER_SERIAL, see
// print_image.rs.
//

fn parse_id(s: &str) -> Option<u16> {
    if let Some(hex) = s.strip_prefix("0x") {
        u16::from_str_radix(hex, 16).ok()
    } else {
        s.parse().ok()
    }
}

fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let data = match args.get(1) {
        Some(data) => data.clone(),
        None => {
            println!("Usage: cargo run --example print_qr -- <data>");
            return;
        }
    };

    let code = QrCode::new(data.as_bytes()).expect("data too long for a QR code");
    let qr: image::ImageBuffer<image::Rgba<u8>, std::vec::Vec<u8>> = code
        .render::<image::Rgba<u8>>()
        .quiet_zone(false)
        .min_dimensions(200, 200)
        .build();

    let (width, height) = qr.dimensions();
    let buffer = PixelBuffer::from_rgba(width, height, qr.into_raw()).unwrap();

    // QR modules are pure black on white; the high-contrast preset keeps
    // the module edges crisp on worn heads.
    let options = EncodeOptions::high_contrast().align(Align::Center);
    let stream = match encode(&buffer, &options) {
        Ok(stream) => stream,
        Err(err) => {
            eprintln!("encode failed: {}", err);
            return;
        }
    };

    let vid = env::var("PRINTER_VID")
        .ok()
        .and_then(|s| parse_id(&s))
        .expect("PRINTER_VID must be set (e.g. 0x0456)");
    let pid = env::var("PRINTER_PID")
        .ok()
        .and_then(|s| parse_id(&s))
        .expect("PRINTER_PID must be set (e.g. 0x0808)");

    let mut config = TransportConfig::new(vid, pid);
    if let Ok(serial) = env::var("PRINTER_SERIAL") {
        config = config.serial(serial);
    }

    match Session::open(config) {
        Ok(mut session) => match session.write(&stream) {
            Ok(()) => println!("printed {} bytes", stream.len()),
            Err(err) => eprintln!("print failed: {}", err),
        },
        Err(err) => eprintln!("could not open printer: {}", err),
    }
}
