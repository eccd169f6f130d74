use escpos_raster::{encode, EncodeOptions, PixelBuffer, Session, TransportConfig};
use image::GenericImageView;
use std::env;

//
// cargo run --example print_image -- path/to/receipt.png [contrast]
//
// Printer selection comes from the environment (or a .env file):
//   PRINTER_VID=0x0456
//   PRINTER_PID=0x0808
//   PRINTER_SERIAL=TP001234   (optional)
//

fn print_usage() {
    println!("Usage: cargo run --example print_image -- <file> [OPTION]");
    println!("Options:");
    println!("  normal     Default threshold (128), for logos and graphics");
    println!("  contrast   High-contrast threshold (200), for text-heavy receipts");
    println!("\nIf no option is provided, 'normal' is used.");
}

fn parse_id(s: &str) -> Option<u16> {
    if let Some(hex) = s.strip_prefix("0x") {
        u16::from_str_radix(hex, 16).ok()
    } else {
        s.parse().ok()
    }
}

fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{}:{}] {} - {}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.level(),
                record.args()
            )
        })
        .init();

    let args: Vec<String> = env::args().collect();

    let file = match args.get(1) {
        Some(file) if file != "--help" && file != "-h" => file.clone(),
        _ => {
            print_usage();
            return;
        }
    };

    let options = match args.get(2).map(String::as_str) {
        None | Some("normal") => EncodeOptions::new(),
        Some("contrast") => EncodeOptions::high_contrast(),
        Some(other) => {
            eprintln!("Error: Unknown option '{}'", other);
            print_usage();
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

    let img = image::open(&file).expect("could not open image file");
    let (width, height) = img.dimensions();
    println!("Printing {} ({}x{})", file, width, height);

    let rgba = img.to_rgba8();
    let buffer = PixelBuffer::from_rgba(width, height, rgba.into_raw()).unwrap();

    let stream = match encode(&buffer, &options) {
        Ok(stream) => stream,
        Err(err) => {
            eprintln!("encode failed: {}", err);
            return;
        }
    };

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
