use std::io::{self, BufRead, Write};

use log::{error, info};

use super::visuals;
use crate::ticket::{Ticket, TicketPrinter, Urgency};

enum Flow {
    Continue,
    Exit,
}

/// Interactive ticket menu reading answers line by line from `input`.
pub struct Menu<'a, R, W> {
    input: R,
    out: W,
    printer: &'a TicketPrinter,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(input: R, out: W, printer: &'a TicketPrinter) -> Self {
        Self {
            input,
            out,
            printer,
        }
    }

    /// Runs until the user picks exit or input ends.
    pub fn run(&mut self) -> io::Result<()> {
        visuals::banner(&mut self.out)?;

        loop {
            visuals::menu_options(&mut self.out)?;
            let Some(choice) = self.prompt("Enter your choice: ")? else {
                break;
            };

            let flow = match choice.as_str() {
                "1" => self.create_ticket()?,
                "2" => self.list_tickets()?,
                "3" => Flow::Exit,
                _ => {
                    writeln!(self.out, "Invalid choice. Please try again.")?;
                    Flow::Continue
                }
            };
            if let Flow::Exit = flow {
                break;
            }
        }

        writeln!(self.out, "Goodbye!")?;
        self.out.flush()
    }

    /// Prints `label` and reads one trimmed line. `None` at end of input.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.out, "{}", label)?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.out)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn create_ticket(&mut self) -> io::Result<Flow> {
        visuals::creating_ticket(&mut self.out)?;
        writeln!(self.out, "Select the emoji to use:")?;
        for urgency in Urgency::ALL {
            writeln!(
                self.out,
                "    {} - {} - {}",
                urgency.choice(),
                urgency.emoji(),
                urgency.label()
            )?;
        }

        let Some(choice) = self.prompt("Enter your choice: ")? else {
            return Ok(Flow::Exit);
        };
        let Some(urgency) = Urgency::from_choice(&choice) else {
            visuals::error(&mut self.out, "Invalid choice. Please try again.")?;
            return Ok(Flow::Continue);
        };

        let Some(task) = self.prompt("Enter the task: ")? else {
            return Ok(Flow::Exit);
        };
        if task.is_empty() {
            visuals::error(&mut self.out, "The task cannot be empty.")?;
            return Ok(Flow::Continue);
        }
        let Some(due_date) = self.prompt("Enter the due date: ")? else {
            return Ok(Flow::Exit);
        };
        let Some(due_hour) = self.prompt("Enter the due hour: ")? else {
            return Ok(Flow::Exit);
        };

        let ticket = Ticket::new(urgency, &task, &due_date, &due_hour);
        match self.printer.print(&ticket) {
            Ok(path) => {
                info!("Ticket saved to {}", path.display());
                visuals::success(&mut self.out, "Ticket printed!")?;
            }
            Err(err) => {
                error!("Ticket failed: {}", err);
                visuals::error(&mut self.out, &format!("Error creating ticket: {}", err))?;
            }
        }
        Ok(Flow::Continue)
    }

    fn list_tickets(&mut self) -> io::Result<Flow> {
        match self.printer.list_generated() {
            Ok(paths) if paths.is_empty() => {
                writeln!(self.out, "No tickets generated yet.")?;
            }
            Ok(paths) => {
                writeln!(self.out, "Tickets in {}:", self.printer.output_dir().display())?;
                for path in paths {
                    writeln!(self.out, "    {}", path.display())?;
                }
            }
            Err(err) => {
                visuals::error(&mut self.out, &format!("Could not list tickets: {}", err))?;
            }
        }
        Ok(Flow::Continue)
    }
}
