use std::time::Duration;

use log::{debug, warn};
use rusb::{DeviceHandle, Direction, GlobalContext, TransferType};

use super::{PrinterConnector, PrinterError, PrinterPort};

/// Opens a USB printer by vendor and product id.
#[derive(Debug, Clone)]
pub struct UsbConnector {
    pub vendor_id: u16,
    pub product_id: u16,
    /// Per-transfer timeout. Zero waits indefinitely.
    pub timeout: Duration,
}

impl UsbConnector {
    pub fn new(vendor_id: u16, product_id: u16, timeout: Duration) -> Self {
        Self {
            vendor_id,
            product_id,
            timeout,
        }
    }
}

impl PrinterConnector for UsbConnector {
    fn open(&self) -> Result<Box<dyn PrinterPort>, PrinterError> {
        let handle = rusb::open_device_with_vid_pid(self.vendor_id, self.product_id).ok_or(
            PrinterError::DeviceNotFound {
                vendor_id: self.vendor_id,
                product_id: self.product_id,
            },
        )?;

        let (interface, endpoint) = find_bulk_out(&handle)?;

        let reattach = handle.kernel_driver_active(interface).unwrap_or(false);
        if reattach {
            handle.detach_kernel_driver(interface)?;
        }
        claim_or_restore(
            || handle.claim_interface(interface),
            reattach.then_some(|| handle.attach_kernel_driver(interface)),
        )?;
        debug!(
            "Claimed interface {} endpoint {:#04x} on {:04x}:{:04x}",
            interface, endpoint, self.vendor_id, self.product_id
        );

        Ok(Box::new(UsbPort {
            handle,
            interface,
            endpoint,
            timeout: self.timeout,
            reattach,
            closed: false,
        }))
    }
}

/// Claims the interface. If that fails, gives the kernel driver back before
/// returning the claim error.
fn claim_or_restore<C, R>(claim: C, restore: Option<R>) -> rusb::Result<()>
where
    C: FnOnce() -> rusb::Result<()>,
    R: FnOnce() -> rusb::Result<()>,
{
    let claimed = claim();
    if claimed.is_err() {
        if let Some(Err(err)) = restore.map(|restore| restore()) {
            warn!("Failed to reattach kernel driver: {}", err);
        }
    }
    claimed
}

/// Releases the interface and then reattaches the kernel driver, attempting
/// both steps. The first error is returned.
fn release_and_restore<L, R>(release: L, restore: Option<R>) -> rusb::Result<()>
where
    L: FnOnce() -> rusb::Result<()>,
    R: FnOnce() -> rusb::Result<()>,
{
    let released = release();
    let restored = restore.map_or(Ok(()), |restore| restore());
    released.and(restored)
}

fn find_bulk_out(handle: &DeviceHandle<GlobalContext>) -> Result<(u8, u8), PrinterError> {
    let config = handle.device().active_config_descriptor()?;

    for interface in config.interfaces() {
        for descriptor in interface.descriptors() {
            for endpoint in descriptor.endpoint_descriptors() {
                if endpoint.direction() == Direction::Out
                    && endpoint.transfer_type() == TransferType::Bulk
                {
                    return Ok((descriptor.interface_number(), endpoint.address()));
                }
            }
        }
    }

    Err(PrinterError::NoBulkEndpoint)
}

pub struct UsbPort {
    handle: DeviceHandle<GlobalContext>,
    interface: u8,
    endpoint: u8,
    timeout: Duration,
    reattach: bool,
    closed: bool,
}

impl UsbPort {
    fn release(&mut self) -> Result<(), PrinterError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let handle = &self.handle;
        let interface = self.interface;
        release_and_restore(
            || handle.release_interface(interface),
            self.reattach.then_some(|| handle.attach_kernel_driver(interface)),
        )?;
        Ok(())
    }
}

impl PrinterPort for UsbPort {
    fn write_all(&mut self, mut data: &[u8]) -> Result<(), PrinterError> {
        while !data.is_empty() {
            let written = self.handle.write_bulk(self.endpoint, data, self.timeout)?;
            if written == 0 {
                return Err(PrinterError::Transfer(format!(
                    "device accepted 0 of {} bytes",
                    data.len()
                )));
            }
            data = &data[written..];
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), PrinterError> {
        self.release()
    }
}

impl Drop for UsbPort {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            warn!("Failed to release printer interface: {}", err);
        }
    }
}
