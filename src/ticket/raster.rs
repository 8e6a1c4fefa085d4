//! HTML to PNG rendering through a headless Chromium-family browser.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;

use super::TicketError;

/// Paper width of a 58mm thermal printer, in dots.
pub const TICKET_WIDTH: u32 = 384;

/// Viewport height used for the screenshot. Blank space below the content is
/// printed as-is, so this stays close to the template's natural height.
pub const TICKET_HEIGHT: u32 = 750;

const BROWSER_NAMES: [&str; 5] = [
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "chrome",
];

const FALLBACK_PATHS: [&str; 3] = [
    "/usr/bin/google-chrome",
    "/usr/bin/chromium",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
];

/// Renders an HTML document into a PNG file.
pub trait Rasterizer {
    fn rasterize(&self, html: &str, output: &Path) -> Result<(), TicketError>;
}

/// Screenshots the document with `chrome --headless --screenshot`.
#[derive(Debug, Clone)]
pub struct ChromeRasterizer {
    binary: PathBuf,
}

impl ChromeRasterizer {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Locates a browser binary.
    ///
    /// Tries `explicit_path` first, then each known browser name on `PATH`,
    /// then a few common install locations.
    pub fn discover(explicit_path: Option<&Path>) -> Result<Self, TicketError> {
        let candidates = Self::candidates(explicit_path);

        candidates
            .iter()
            .find(|candidate| candidate.is_file())
            .map(|found| {
                debug!("Using browser at {}", found.display());
                Self::new(found.clone())
            })
            .ok_or_else(|| {
                TicketError::Rasterize(format!(
                    "no Chrome or Chromium binary found (searched {})",
                    candidates
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }

    fn candidates(explicit_path: Option<&Path>) -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        if let Some(p) = explicit_path {
            candidates.push(p.to_path_buf());
        }
        candidates.extend(BROWSER_NAMES.iter().filter_map(|name| which::which(name).ok()));
        candidates.extend(FALLBACK_PATHS.iter().map(PathBuf::from));

        candidates
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn args(page: &Path, output: &Path) -> Vec<String> {
        vec![
            "--headless".to_string(),
            "--disable-gpu".to_string(),
            "--hide-scrollbars".to_string(),
            "--no-sandbox".to_string(),
            "--default-background-color=ffffffff".to_string(),
            format!("--window-size={},{}", TICKET_WIDTH, TICKET_HEIGHT),
            format!("--screenshot={}", output.display()),
            format!("file://{}", page.display()),
        ]
    }
}

impl Rasterizer for ChromeRasterizer {
    fn rasterize(&self, html: &str, output: &Path) -> Result<(), TicketError> {
        let mut page = tempfile::Builder::new()
            .prefix("ticket-")
            .suffix(".html")
            .tempfile()?;
        page.write_all(html.as_bytes())?;
        page.flush()?;

        let result = Command::new(&self.binary)
            .args(Self::args(page.path(), output))
            .output()
            .map_err(|e| {
                TicketError::Rasterize(format!("failed to run {}: {}", self.binary.display(), e))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(TicketError::Rasterize(format!(
                "browser exited with {}: {}",
                result.status,
                stderr.trim()
            )));
        }
        if !output.is_file() {
            return Err(TicketError::Rasterize(format!(
                "browser did not write {}",
                output.display()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_is_tried_first() {
        let candidates = ChromeRasterizer::candidates(Some(Path::new("/opt/chrome/chrome")));
        assert_eq!(candidates[0], PathBuf::from("/opt/chrome/chrome"));
        assert!(candidates.len() > FALLBACK_PATHS.len());
    }

    #[test]
    fn test_discover_accepts_existing_explicit_file() {
        let fake = tempfile::NamedTempFile::new().unwrap();
        let rasterizer = ChromeRasterizer::discover(Some(fake.path())).unwrap();
        assert_eq!(rasterizer.binary(), fake.path());
    }

    #[test]
    fn test_screenshot_args() {
        let args = ChromeRasterizer::args(Path::new("/tmp/t.html"), Path::new("/tmp/t.png"));

        assert!(args.contains(&"--headless".to_string()));
        assert!(args.contains(&"--window-size=384,750".to_string()));
        assert!(args.contains(&"--screenshot=/tmp/t.png".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("file:///tmp/t.html"));
    }

    #[test]
    fn test_missing_binary_is_a_rasterize_error() {
        let dir = tempfile::tempdir().unwrap();
        let rasterizer = ChromeRasterizer::new(dir.path().join("no-such-browser"));

        let err = rasterizer
            .rasterize("<html></html>", &dir.path().join("out.png"))
            .unwrap_err();
        assert!(matches!(err, TicketError::Rasterize(_)));
    }
}
