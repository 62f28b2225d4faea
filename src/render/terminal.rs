use super::{Surface, View};
use std::io::{self, Stderr, Stdout, Write};

/// Writes views to a terminal.
///
/// Streamed text only ever grows, so progress views print just the newly
/// appended suffix and the marker is left out. Warnings and errors go to the
/// second writer.
pub struct TerminalSurface<O: Write, E: Write> {
    out: O,
    err: E,
    printed: String,
}

impl TerminalSurface<Stdout, Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> TerminalSurface<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self {
            out,
            err,
            printed: String::new(),
        }
    }

    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }

    fn write_text(&mut self, text: &str) -> io::Result<()> {
        match text.strip_prefix(self.printed.as_str()) {
            Some(suffix) => self.out.write_all(suffix.as_bytes())?,
            None => {
                if !self.printed.is_empty() {
                    self.out.write_all(b"\n")?;
                }
                self.out.write_all(text.as_bytes())?;
            }
        }
        self.printed = text.to_string();
        self.out.flush()
    }

    fn write_view(&mut self, view: View) -> io::Result<()> {
        match view {
            View::Progress(text) => self.write_text(&text),
            View::Result(text) => {
                self.write_text(&text)?;
                self.out.write_all(b"\n")?;
                self.printed.clear();
                self.out.flush()
            }
            View::Warning(_) | View::Error(_) => {
                if !self.printed.is_empty() {
                    self.out.write_all(b"\n")?;
                    self.out.flush()?;
                }
                writeln!(self.err, "{}", view)
            }
        }
    }
}

impl<O: Write, E: Write> Surface for TerminalSurface<O, E> {
    fn show(&mut self, view: View) {
        if let Err(e) = self.write_view(view) {
            tracing::warn!("Failed to write to terminal: {}", e);
        }
    }
}
