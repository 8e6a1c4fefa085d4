//! Physical task tickets: HTML layout, rasterization and printing.

pub mod pipeline;
pub mod raster;
pub mod template;

use std::fmt;

use crate::printer::PrinterError;

pub use self::pipeline::TicketPrinter;
pub use self::raster::{ChromeRasterizer, Rasterizer};

/// The five fields printed on a ticket. All values are plain display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub emoji: String,
    pub urgency: String,
    pub task: String,
    pub due_date: String,
    pub due_hour: String,
}

impl Ticket {
    pub fn new(urgency: Urgency, task: &str, due_date: &str, due_hour: &str) -> Self {
        Self {
            emoji: urgency.emoji().to_string(),
            urgency: urgency.label().to_string(),
            task: task.trim().to_string(),
            due_date: due_date.trim().to_string(),
            due_hour: due_hour.trim().to_string(),
        }
    }

    /// Looks up a field by its template placeholder name.
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "emoji" => Some(&self.emoji),
            "urgency" => Some(&self.urgency),
            "task" => Some(&self.task),
            "due_date" => Some(&self.due_date),
            "due_hour" => Some(&self.due_hour),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Urgent,
    High,
    Medium,
    Low,
    Done,
}

impl Urgency {
    pub const ALL: [Urgency; 5] = [
        Urgency::Urgent,
        Urgency::High,
        Urgency::Medium,
        Urgency::Low,
        Urgency::Done,
    ];

    /// Maps a menu answer (`"1"` to `"5"`) to an urgency level.
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(Urgency::Urgent),
            "2" => Some(Urgency::High),
            "3" => Some(Urgency::Medium),
            "4" => Some(Urgency::Low),
            "5" => Some(Urgency::Done),
            _ => None,
        }
    }

    pub fn choice(self) -> u8 {
        match self {
            Urgency::Urgent => 1,
            Urgency::High => 2,
            Urgency::Medium => 3,
            Urgency::Low => 4,
            Urgency::Done => 5,
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Urgency::Urgent => "🚨",
            Urgency::High => "⚠️",
            Urgency::Medium => "❗",
            Urgency::Low => "🐢",
            Urgency::Done => "✅",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Urgency::Urgent => "Urgente",
            Urgency::High => "Alta",
            Urgency::Medium => "Média",
            Urgency::Low => "Baixa",
            Urgency::Done => "Concluída",
        }
    }
}

#[derive(Debug)]
pub enum TicketError {
    Rasterize(String),
    Image(image::ImageError),
    Io(std::io::Error),
    Printer(PrinterError),
}

impl fmt::Display for TicketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketError::Rasterize(msg) => write!(f, "Failed to render ticket: {}", msg),
            TicketError::Image(err) => write!(f, "Failed to load ticket image: {}", err),
            TicketError::Io(err) => write!(f, "I/O error: {}", err),
            TicketError::Printer(err) => write!(f, "Printer error: {}", err),
        }
    }
}

impl std::error::Error for TicketError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TicketError::Rasterize(_) => None,
            TicketError::Image(err) => Some(err),
            TicketError::Io(err) => Some(err),
            TicketError::Printer(err) => Some(err),
        }
    }
}

impl From<image::ImageError> for TicketError {
    fn from(err: image::ImageError) -> Self {
        TicketError::Image(err)
    }
}

impl From<std::io::Error> for TicketError {
    fn from(err: std::io::Error) -> Self {
        TicketError::Io(err)
    }
}

impl From<PrinterError> for TicketError {
    fn from(err: PrinterError) -> Self {
        TicketError::Printer(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urgency_choices() {
        assert_eq!(Urgency::from_choice("1"), Some(Urgency::Urgent));
        assert_eq!(Urgency::from_choice(" 4\n"), Some(Urgency::Low));
        assert_eq!(Urgency::from_choice("0"), None);
        assert_eq!(Urgency::from_choice("6"), None);
        assert_eq!(Urgency::from_choice("urgente"), None);

        for urgency in Urgency::ALL {
            assert_eq!(Urgency::from_choice(&urgency.choice().to_string()), Some(urgency));
        }
    }

    #[test]
    fn test_ticket_from_urgency() {
        let ticket = Ticket::new(Urgency::Medium, "  Call the bank ", "2024-03-01", "09:30");

        assert_eq!(ticket.emoji, "❗");
        assert_eq!(ticket.urgency, "Média");
        assert_eq!(ticket.task, "Call the bank");
        assert_eq!(ticket.field("due_hour"), Some("09:30"));
        assert_eq!(ticket.field("assignee"), None);
    }
}
