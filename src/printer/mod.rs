//! Thermal printer access.
//!
//! [`PrinterConnector`] opens a [`PrinterPort`]; [`ThermalPrinter`] speaks
//! ESC/POS over whichever port it was given.

pub mod escpos;
pub mod usb;

use std::fmt;

use image::DynamicImage;
use log::{debug, warn};

pub use self::usb::{UsbConnector, UsbPort};

#[derive(Debug)]
pub enum PrinterError {
    DeviceNotFound { vendor_id: u16, product_id: u16 },
    NoBulkEndpoint,
    Usb(rusb::Error),
    Transfer(String),
}

impl fmt::Display for PrinterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrinterError::DeviceNotFound {
                vendor_id,
                product_id,
            } => write!(
                f,
                "No USB printer found with id {:04x}:{:04x}",
                vendor_id, product_id
            ),
            PrinterError::NoBulkEndpoint => write!(f, "Printer has no bulk OUT endpoint"),
            PrinterError::Usb(err) => write!(f, "USB error: {}", err),
            PrinterError::Transfer(msg) => write!(f, "Transfer failed: {}", msg),
        }
    }
}

impl std::error::Error for PrinterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PrinterError::Usb(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusb::Error> for PrinterError {
    fn from(err: rusb::Error) -> Self {
        PrinterError::Usb(err)
    }
}

/// An open byte channel to a printer.
pub trait PrinterPort {
    fn write_all(&mut self, data: &[u8]) -> Result<(), PrinterError>;

    /// Releases the device. Called exactly once, also after a failed write.
    fn close(&mut self) -> Result<(), PrinterError>;
}

pub trait PrinterConnector {
    fn open(&self) -> Result<Box<dyn PrinterPort>, PrinterError>;
}

pub struct ThermalPrinter {
    port: Box<dyn PrinterPort>,
}

impl ThermalPrinter {
    /// Opens a port and resets the printer. The port is closed again if the
    /// reset cannot be sent.
    pub fn open(connector: &dyn PrinterConnector) -> Result<Self, PrinterError> {
        let mut port = connector.open()?;
        if let Err(err) = port.write_all(&escpos::INITIALIZE) {
            if let Err(close_err) = port.close() {
                warn!("Failed to close printer after reset error: {}", close_err);
            }
            return Err(err);
        }
        Ok(Self { port })
    }

    pub fn print_image(&mut self, image: &DynamicImage) -> Result<(), PrinterError> {
        let data = escpos::raster_image(image);
        debug!("Sending {} bytes of raster data", data.len());
        self.port.write_all(&data)
    }

    pub fn cut(&mut self) -> Result<(), PrinterError> {
        self.port.write_all(&escpos::cut())
    }

    pub fn close(mut self) -> Result<(), PrinterError> {
        self.port.close()
    }
}
