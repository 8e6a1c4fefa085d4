use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use log::{info, warn};
use uuid::Uuid;

use super::{template, Rasterizer, Ticket, TicketError};
use crate::printer::{PrinterConnector, ThermalPrinter};

/// Renders tickets to PNG files and sends them to the printer.
pub struct TicketPrinter {
    rasterizer: Box<dyn Rasterizer>,
    connector: Box<dyn PrinterConnector>,
    output_dir: PathBuf,
}

impl TicketPrinter {
    pub fn new(
        rasterizer: Box<dyn Rasterizer>,
        connector: Box<dyn PrinterConnector>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            rasterizer,
            connector,
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Renders and prints one ticket, returning the path of the kept PNG.
    ///
    /// The PNG is removed when any step fails. The printer connection, once
    /// opened, is always closed.
    pub fn print(&self, ticket: &Ticket) -> Result<PathBuf, TicketError> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(format!("{}.png", Uuid::new_v4()));
        let html = template::render(ticket);

        if let Err(err) = self.render_and_print(&html, &path) {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
            }
            return Err(err);
        }

        info!("Printed ticket {}", path.display());
        Ok(path)
    }

    fn render_and_print(&self, html: &str, path: &Path) -> Result<(), TicketError> {
        self.rasterizer.rasterize(html, path)?;
        let image = image::open(path)?;

        let mut printer = ThermalPrinter::open(self.connector.as_ref())?;
        let printed = printer.print_image(&image).and_then(|()| printer.cut());
        let closed = printer.close();

        printed?;
        closed?;
        Ok(())
    }

    /// PNG files in the output directory, newest first.
    pub fn list_generated(&self) -> Result<Vec<PathBuf>, TicketError> {
        let entries = match fs::read_dir(&self.output_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files: Vec<(SystemTime, PathBuf)> = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != "png") || !path.is_file() {
                continue;
            }
            let modified = entry.metadata()?.modified()?;
            files.push((modified, path));
        }

        files.sort_by(|a, b| b.cmp(a));
        Ok(files.into_iter().map(|(_, path)| path).collect())
    }
}
