//! Colored banners for the ticket menu.

use std::io::{self, Write};

const BRIGHT_WHITE: &str = "\x1b[97;1m";
const GREEN: &str = "\x1b[32m";
const BLUE: &str = "\x1b[34m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

const RULE: &str = "==================================================================";

fn framed(out: &mut impl Write, icon: &str, color: &str, message: &str) -> io::Result<()> {
    writeln!(out, "{}\n{}", BRIGHT_WHITE, RULE)?;
    writeln!(
        out,
        "    {}{} {} {}{}",
        icon, color, message, BRIGHT_WHITE, icon
    )?;
    writeln!(out, "{}{}", RULE, RESET)
}

pub fn banner(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}\n{}", BRIGHT_WHITE, RULE)?;
    writeln!(
        out,
        "            {}||  SHOW ME THE TICKETS  ||{}",
        GREEN, BRIGHT_WHITE
    )?;
    writeln!(out, "{}{}", RULE, RESET)
}

pub fn menu_options(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", BRIGHT_WHITE)?;
    writeln!(out, "    [1] - Create a new ticket")?;
    writeln!(out, "    [2] - List all tickets")?;
    writeln!(out, "    [3] - Exit")?;
    writeln!(out, "{}", RESET)
}

pub fn creating_ticket(out: &mut impl Write) -> io::Result<()> {
    framed(out, "🆕", BLUE, "Creating a new ticket...")
}

pub fn success(out: &mut impl Write, message: &str) -> io::Result<()> {
    framed(out, "✅", GREEN, message)
}

pub fn error(out: &mut impl Write, message: &str) -> io::Result<()> {
    framed(out, "❌", RED, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_banners_reset_colors() {
        let text = render(|out| error(out, "Printer offline"));
        assert!(text.contains("❌\x1b[31m Printer offline"));
        assert!(text.trim_end().ends_with(RESET));

        let text = render(|out| banner(out));
        assert!(text.contains("SHOW ME THE TICKETS"));
    }

    #[test]
    fn test_menu_lists_three_options() {
        let text = render(|out| menu_options(out));
        assert!(text.contains("[1] - Create a new ticket"));
        assert!(text.contains("[2] - List all tickets"));
        assert!(text.contains("[3] - Exit"));
    }
}
