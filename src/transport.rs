use log::{debug, info};
use rusb::{Context, Device, DeviceDescriptor, DeviceHandle, Direction, TransferType, UsbContext};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::{encoder::CommandStream, error::Error};

/// Consecutive zero-byte bulk writes tolerated before giving up.
const MAX_WRITE_STALLS: u32 = 3;

/// One live session per process. A thermal printer has no internal job
/// queue, so two owners of the same device would interleave receipts.
static SESSION_ACTIVE: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone, Copy)]
struct Endpoint {
    iface: u8,
    setting: u8,
    address: u8,
}

/// Transport configuration.
///
/// Identifies the printer on the bus by vendor/product id, optionally
/// narrowed to one unit by USB serial string when several identical
/// printers are attached.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    vendor_id: u16,
    product_id: u16,
    serial: Option<String>,
    write_timeout: Duration,
}

impl TransportConfig {
    pub fn new(vendor_id: u16, product_id: u16) -> Self {
        TransportConfig {
            vendor_id,
            product_id,
            serial: None,
            write_timeout: Duration::from_secs(10),
        }
    }

    /// Match only the unit with this USB serial number string.
    pub fn serial(self, serial: String) -> Self {
        TransportConfig {
            serial: Some(serial),
            ..self
        }
    }

    /// Timeout for each bulk write. On expiry the session is closed, see
    /// [`Session::write`].
    pub fn write_timeout(self, timeout: Duration) -> Self {
        TransportConfig {
            write_timeout: timeout,
            ..self
        }
    }
}

/// An open, exclusive connection to the printer.
///
/// Acquired once with [`Session::open`], reused across prints, released
/// with [`Session::close`] (or on drop). At most one session can be open
/// per process; a second `open` fails with [`Error::SessionBusy`] instead
/// of aliasing the device.
pub struct Session {
    handle: DeviceHandle<Context>,
    endpoint_out: Endpoint,
    write_timeout: Duration,
    closed: bool,
}

impl Session {
    /// Open the printer described by `config`.
    pub fn open(config: TransportConfig) -> Result<Self, Error> {
        if SESSION_ACTIVE.swap(true, Ordering::SeqCst) {
            return Err(Error::SessionBusy);
        }
        match Self::open_inner(&config) {
            Ok(session) => Ok(session),
            Err(err) => {
                SESSION_ACTIVE.store(false, Ordering::SeqCst);
                Err(err)
            }
        }
    }

    fn open_inner(config: &TransportConfig) -> Result<Session, Error> {
        let mut context = Context::new()?;
        let (mut device, device_desc, mut handle) = Self::open_device(
            &mut context,
            config.vendor_id,
            config.product_id,
            config.serial.as_deref(),
        )?;

        handle.reset()?;

        let endpoint_out =
            match Self::find_endpoint(&mut device, &device_desc, Direction::Out, TransferType::Bulk)
            {
                Some(endpoint) => endpoint,
                None => return Err(Error::DeviceNotSupported),
            };

        // Without detaching the kernel's usblp driver the interface claim
        // fails on Linux.
        handle.set_auto_detach_kernel_driver(true)?;
        let has_kernel_driver = matches!(handle.kernel_driver_active(endpoint_out.iface), Ok(true));
        info!("Kernel driver support is {}", has_kernel_driver);

        handle.set_active_configuration(1)?;
        handle.claim_interface(endpoint_out.iface)?;
        handle.set_alternate_setting(endpoint_out.iface, endpoint_out.setting)?;

        Ok(Session {
            handle,
            endpoint_out,
            write_timeout: config.write_timeout,
            closed: false,
        })
    }

    fn open_device(
        context: &mut Context,
        vid: u16,
        pid: u16,
        serial: Option<&str>,
    ) -> Result<(Device<Context>, DeviceDescriptor, DeviceHandle<Context>), Error> {
        let devices = match context.devices() {
            Ok(devices) => devices,
            Err(err) => {
                debug!("Failed to read device list: {:?}", err);
                return Err(Error::DeviceListNotReadable);
            }
        };

        let mut access_denied = false;

        for device in devices.iter() {
            let device_desc = match device.device_descriptor() {
                Ok(d) => d,
                Err(err) => {
                    debug!("{:?}", err);
                    continue;
                }
            };

            if device_desc.vendor_id() != vid || device_desc.product_id() != pid {
                continue;
            }

            let handle = match device.open() {
                Ok(handle) => handle,
                Err(rusb::Error::Access) => {
                    debug!("Access denied opening {:04x}:{:04x}", vid, pid);
                    access_denied = true;
                    continue;
                }
                Err(err) => {
                    debug!("Failed to open device: {:?}", err);
                    continue;
                }
            };

            let serial = match serial {
                Some(serial) => serial,
                None => return Ok((device, device_desc, handle)),
            };

            let timeout = Duration::from_secs(1);
            let languages = match handle.read_languages(timeout) {
                Ok(languages) => languages,
                Err(_) => continue,
            };
            if languages.is_empty() {
                continue;
            }
            match handle.read_serial_number_string(languages[0], &device_desc, timeout) {
                Ok(s) if s == serial => return Ok((device, device_desc, handle)),
                Ok(_) => continue,
                Err(err) => {
                    debug!("Failed to read serial number string: {:?}", err);
                    continue;
                }
            }
        }

        if access_denied {
            Err(Error::ConnectionDenied)
        } else {
            debug!("No device match for {:04x}:{:04x} serial {:?}", vid, pid, serial);
            Err(Error::DeviceOffline)
        }
    }

    fn find_endpoint(
        device: &mut Device<Context>,
        device_desc: &DeviceDescriptor,
        direction: Direction,
        transfer_type: TransferType,
    ) -> Option<Endpoint> {
        for n in 0..device_desc.num_configurations() {
            let config_desc = match device.config_descriptor(n) {
                Ok(c) => c,
                Err(_) => continue,
            };
            for interface in config_desc.interfaces() {
                for interface_desc in interface.descriptors() {
                    for endpoint_desc in interface_desc.endpoint_descriptors() {
                        if endpoint_desc.direction() == direction
                            && endpoint_desc.transfer_type() == transfer_type
                        {
                            return Some(Endpoint {
                                iface: interface_desc.interface_number(),
                                setting: interface_desc.setting_number(),
                                address: endpoint_desc.address(),
                            });
                        }
                    }
                }
            }
        }
        None
    }

    /// Write a full command stream to the printer.
    ///
    /// Short bulk writes are resumed from where the device left off until
    /// the stream is fully delivered; resuming a sub-complete write is the
    /// only retry this layer performs. A timeout leaves the job outcome
    /// unknown — paper may or may not have printed — so the session is
    /// closed and the error reports how many bytes the device accepted.
    /// Whether to re-open and print again (risking a duplicate receipt)
    /// is the caller's decision.
    pub fn write(&mut self, stream: &CommandStream) -> Result<(), Error> {
        if self.closed {
            return Err(Error::SessionClosed);
        }

        let bytes = stream.as_bytes();
        let mut written: usize = 0;
        let mut stalls: u32 = 0;

        while written < bytes.len() {
            match self
                .handle
                .write_bulk(self.endpoint_out.address, &bytes[written..], self.write_timeout)
            {
                Ok(0) => {
                    stalls += 1;
                    if stalls >= MAX_WRITE_STALLS {
                        debug!("write stalled at {} of {} bytes", written, bytes.len());
                        return Err(Error::WriteFailed {
                            written,
                            total: bytes.len(),
                        });
                    }
                }
                Ok(n) => {
                    stalls = 0;
                    written += n;
                    if written < bytes.len() {
                        debug!("short write, resuming at byte {}", written);
                    }
                }
                Err(rusb::Error::Timeout) => {
                    debug!("write timeout after {} of {} bytes", written, bytes.len());
                    self.close();
                    return Err(Error::WriteTimeout { written });
                }
                Err(err) => return Err(Error::UsbError(err)),
            }
        }

        debug!("wrote {} bytes", written);
        Ok(())
    }

    /// Close the session and release the device. Safe to call twice.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(err) = self.handle.release_interface(self.endpoint_out.iface) {
            debug!("release_interface failed: {:?}", err);
        }
        SESSION_ACTIVE.store(false, Ordering::SeqCst);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = TransportConfig::new(0x0456, 0x0808);
        assert_eq!(config.vendor_id, 0x0456);
        assert_eq!(config.product_id, 0x0808);
        assert_eq!(config.serial, None);
        assert_eq!(config.write_timeout, Duration::from_secs(10));
    }

    #[test]
    fn config_builder() {
        let config = TransportConfig::new(0x0456, 0x0808)
            .serial("TP001234".to_string())
            .write_timeout(Duration::from_secs(3));
        assert_eq!(config.serial.as_deref(), Some("TP001234"));
        assert_eq!(config.write_timeout, Duration::from_secs(3));
    }

    // Session open/write/close need a physical printer on the bus;
    // exercised manually via the bundled demos.
}
