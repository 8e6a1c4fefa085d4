use std::io;
use std::path::Path;

use log::{error, info};

use ticketdesk::cli::Menu;
use ticketdesk::config::TicketConfig;
use ticketdesk::printer::UsbConnector;
use ticketdesk::ticket::{ChromeRasterizer, TicketPrinter};

fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = TicketConfig::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    let rasterizer = ChromeRasterizer::discover(config.chrome_path.as_deref().map(Path::new))
        .map_err(|e| {
            error!("{}", e);
            io::Error::new(io::ErrorKind::NotFound, e)
        })?;
    info!("Rendering tickets with {}", rasterizer.binary().display());

    let connector = UsbConnector::new(
        config.printer_vendor_id,
        config.printer_product_id,
        config.printer_timeout,
    );
    let printer = TicketPrinter::new(Box::new(rasterizer), Box::new(connector), &config.output_dir);

    let stdin = io::stdin();
    Menu::new(stdin.lock(), io::stdout(), &printer).run()
}
