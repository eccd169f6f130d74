use std::str::FromStr;

//
// cargo run list
// cargo run test 0x0456 0x0808 [serial]
//
use rusb::{Context, UsbContext};

use escpos_raster::{encode, EncodeOptions, PixelBuffer, Session, TransportConfig};

/// USB base class for printers.
const CLASS_PRINTER: u8 = 0x07;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("list") => list_devices(),
        Some("test") => {
            if args.len() < 4 {
                print_usage();
                return;
            }
            let vid = match parse_id(&args[2]) {
                Some(id) => id,
                None => {
                    eprintln!("Invalid vendor id: {}", args[2]);
                    return;
                }
            };
            let pid = match parse_id(&args[3]) {
                Some(id) => id,
                None => {
                    eprintln!("Invalid product id: {}", args[3]);
                    return;
                }
            };
            let serial = args.get(4).cloned();
            print_test_page(vid, pid, serial);
        }
        _ => print_usage(),
    }
}

fn print_usage() {
    println!("Usage:");
    println!("  escpos-raster list                         List USB devices, flag printers");
    println!("  escpos-raster test <vid> <pid> [serial]    Print a self-test receipt");
    println!();
    println!("Ids are hex with an 0x prefix, or decimal.");
}

fn parse_id(s: &str) -> Option<u16> {
    if let Some(hex) = s.strip_prefix("0x") {
        u16::from_str_radix(hex, 16).ok()
    } else {
        u16::from_str(s).ok()
    }
}

fn list_devices() {
    let context = match Context::new() {
        Ok(context) => context,
        Err(e) => {
            eprintln!("could not initialize libusb: {}", e);
            return;
        }
    };

    let devices = match context.devices() {
        Ok(devices) => devices,
        Err(e) => {
            eprintln!("could not read device list: {}", e);
            return;
        }
    };

    for device in devices.iter() {
        let device_desc = match device.device_descriptor() {
            Ok(d) => d,
            Err(_) => continue,
        };

        let mut printer_iface = false;
        for n in 0..device_desc.num_configurations() {
            let config_desc = match device.config_descriptor(n) {
                Ok(c) => c,
                Err(_) => continue,
            };
            for interface in config_desc.interfaces() {
                for interface_desc in interface.descriptors() {
                    if interface_desc.class_code() == CLASS_PRINTER {
                        printer_iface = true;
                    }
                }
            }
        }

        println!(
            "{:04x}:{:04x} bus {:03} addr {:03}{}",
            device_desc.vendor_id(),
            device_desc.product_id(),
            device.bus_number(),
            device.address(),
            if printer_iface { "  [printer]" } else { "" }
        );
    }
}

/// Checkerboard plus solid bars: enough structure to judge head contrast
/// and row alignment at a glance.
fn test_pattern(width: u32) -> PixelBuffer {
    let black = [0x00, 0x00, 0x00, 0xFF];
    let mut image = PixelBuffer::new(width, 160);

    // Solid bar top and bottom
    image.fill_rect(0, 0, width, 16, black);
    image.fill_rect(0, 144, width, 16, black);

    // 16x16 checkerboard in between
    for row in 0..7 {
        for col in 0..(width / 16) {
            if (row + col) % 2 == 0 {
                image.fill_rect(col * 16, 24 + row * 16, 16, 16, black);
            }
        }
    }

    image
}

fn print_test_page(vid: u16, pid: u16, serial: Option<String>) {
    let image = test_pattern(escpos_raster::PRINTER_58MM_WIDTH);
    let stream = match encode(&image, &EncodeOptions::new()) {
        Ok(stream) => stream,
        Err(e) => {
            eprintln!("encode failed: {}", e);
            return;
        }
    };

    let mut config = TransportConfig::new(vid, pid);
    if let Some(serial) = serial {
        config = config.serial(serial);
    }

    let mut session = match Session::open(config) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("could not open printer {:04x}:{:04x}: {}", vid, pid, e);
            return;
        }
    };

    match session.write(&stream) {
        Ok(()) => println!("sent {} bytes, check the paper", stream.len()),
        Err(e) => eprintln!("print failed: {}", e),
    }

    session.close();
}
