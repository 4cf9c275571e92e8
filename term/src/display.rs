use std::io::{self, Stdout, Write};

use chip::{
    definitions::display::HEIGHT,
    devices::DisplayCommands,
    display::Framebuffer,
};
use crossterm::{
    cursor, execute, queue,
    style::Print,
    terminal::{self, ClearType},
};

/// Turns two display rows into a single line of half block glyphs
fn render_pair(top: &[bool], bottom: &[bool]) -> String {
    top.iter()
        .zip(bottom)
        .map(|(&top, &bottom)| match (top, bottom) {
            (true, true) => '█',
            (true, false) => '▀',
            (false, true) => '▄',
            (false, false) => ' ',
        })
        .collect()
}

/// Will render the whole framebuffer, every line of text holds two rows.
pub fn render(frame: &Framebuffer) -> Vec<String> {
    frame
        .to_pixels()
        .chunks_exact(2)
        .map(|rows| render_pair(&rows[0], &rows[1]))
        .collect()
}

/// Draws into the alternate screen of the terminal, the terminal is put
/// back into its normal state on drop.
pub struct TermDisplay {
    stdout: Stdout,
    last: Option<Framebuffer>,
}

impl TermDisplay {
    pub fn new() -> io::Result<Self> {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            terminal::Clear(ClearType::All),
            cursor::Hide
        )?;
        Ok(Self { stdout, last: None })
    }

    fn draw(&mut self, frame: &Framebuffer) -> io::Result<()> {
        for (line, text) in render(frame).into_iter().enumerate() {
            queue!(self.stdout, cursor::MoveTo(0, line as u16), Print(text))?;
        }
        self.stdout.flush()
    }

    /// Will show the given text below the display
    pub fn status(&mut self, text: &str) -> io::Result<()> {
        queue!(
            self.stdout,
            cursor::MoveTo(0, (HEIGHT / 2) as u16 + 1),
            terminal::Clear(ClearType::CurrentLine),
            Print(text)
        )?;
        self.stdout.flush()
    }
}

impl DisplayCommands for TermDisplay {
    fn display(&mut self, framebuffer: &Framebuffer) {
        if self.last.as_ref() == Some(framebuffer) {
            return;
        }
        match self.draw(framebuffer) {
            Ok(()) => self.last = Some(*framebuffer),
            Err(err) => log::error!("Unable to draw the display: {}", err),
        }
    }
}

impl Drop for TermDisplay {
    fn drop(&mut self) {
        let restored = execute!(self.stdout, cursor::Show, terminal::LeaveAlternateScreen)
            .and_then(|_| terminal::disable_raw_mode());
        if let Err(err) = restored {
            log::error!("Unable to restore the terminal: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chip::definitions::display::WIDTH;

    #[test]
    fn test_render_half_blocks() {
        let mut frame = Framebuffer::new();
        // glyph 0 in the top left corner
        frame.draw_sprite(0, 0, &[0xF0, 0x90, 0x90, 0x90, 0xF0]);

        let lines = render(&frame);
        assert_eq!(lines.len(), HEIGHT / 2);
        assert!(lines.iter().all(|line| line.chars().count() == WIDTH));
        assert!(lines[0].starts_with("█▀▀█ "));
        assert!(lines[1].starts_with("█  █ "));
        assert!(lines[2].starts_with("▀▀▀▀ "));
        assert!(lines[3].trim().is_empty());

        // the bottom row lands in the lower half of the last line
        frame.draw_sprite(62, 31, &[0xC0]);
        let lines = render(&frame);
        assert!(lines[HEIGHT / 2 - 1].ends_with(" ▄▄"));
    }
}
