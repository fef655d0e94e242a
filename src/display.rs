use crate::machine::Framebuffer;
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

/// Display is used by the environment to put the framebuffer on a screen. It
/// should abstract the implementation details, so a variety of kinds of screen
/// would work. The interpreter itself never sees it.
pub trait Display {
    /// draw the current frame
    fn draw(&mut self, frame: &Framebuffer) -> Result<(), io::Error>;
}

// store useful metadata about the screen
struct Resolution(usize, usize);

impl Resolution {
    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// canvas coordinates of every pixel that is `lit` (or unlit); y grows
    /// downward on the chip-8 but upward on the canvas
    fn points<'a>(
        &self,
        frame: &'a Framebuffer,
        lit: bool,
    ) -> impl std::iter::Iterator<Item = (f64, f64)> + 'a {
        let w = self.0;
        frame
            .pixels()
            .iter()
            .enumerate()
            .filter(move |(_, p)| **p == lit)
            .map(move |(count, _)| {
                (
                    (count % w) as f64,        // x
                    -1.0 * (count / w) as f64, // y
                )
            })
    }
}

/// monochrome display in a terminal, rendered using TUI and Crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
}

impl MonoTermDisplay {
    pub fn new(x: usize, y: usize) -> Result<MonoTermDisplay, io::Error> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        terminal.hide_cursor()?;
        Ok(MonoTermDisplay {
            terminal,
            resolution: Resolution(x, y),
        })
    }
}

impl Drop for MonoTermDisplay {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, frame: &Framebuffer) -> Result<(), io::Error> {
        // make sure we're given exactly the right shape of frame
        assert_eq!(
            (frame.width(), frame.height()),
            (self.resolution.0, self.resolution.1),
            "MonoTermDisplay must have a correct-sized frame to draw"
        );

        // for now this assumes a 1:1 ratio between terminal, chip8 and the
        // internal TUI canvas
        let resolution = &self.resolution;
        self.terminal.draw(|f| {
            let size = Rect::new(0, 0, 2 + resolution.0 as u16, 2 + resolution.1 as u16);

            let off: Vec<_> = resolution.points(frame, false).collect();
            let on: Vec<_> = resolution.points(frame, true).collect();
            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(resolution.x_bounds())
                .y_bounds(resolution.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &off,
                        color: Color::Black,
                    });
                    ctx.draw(&Points {
                        coords: &on,
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

/// useful for testing non-display routines; remembers how many frames it got
/// and the last one
pub struct DummyDisplay {
    pub frames: usize,
    pub last: Option<Framebuffer>,
}

impl DummyDisplay {
    pub fn new() -> DummyDisplay {
        DummyDisplay {
            frames: 0,
            last: None,
        }
    }
}

impl Default for DummyDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, frame: &Framebuffer) -> Result<(), io::Error> {
        self.frames += 1;
        self.last = Some(frame.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_x_bounds() {
        let r = Resolution(64, 32);
        assert_eq!(r.x_bounds(), [0.0, 63.0]);
    }

    #[test]
    fn test_y_bounds() {
        let r = Resolution(64, 32);
        assert_eq!(r.y_bounds(), [-31.0, 0.0]);
    }

    #[test]
    fn test_blank_frame_has_no_lit_points() {
        let r = Resolution(64, 32);
        let fb = Framebuffer::new();
        assert_eq!(r.points(&fb, true).count(), 0);
        assert_eq!(r.points(&fb, false).count(), 2048);
    }

    #[test]
    fn test_lit_points_are_flipped_vertically() {
        let r = Resolution(64, 32);
        let mut fb = Framebuffer::new();
        fb.flip(5, 0);
        fb.flip(63, 31);
        let lit: Vec<_> = r.points(&fb, true).collect();
        assert_eq!(lit, vec![(5.0, 0.0), (63.0, -31.0)]);
    }

    #[test]
    fn test_dummy_display_counts_frames() -> Result<(), io::Error> {
        let mut d = DummyDisplay::new();
        let mut fb = Framebuffer::new();
        d.draw(&fb)?;
        fb.flip(1, 1);
        d.draw(&fb)?;
        assert_eq!(d.frames, 2);
        assert!(d.last.as_ref().map(|f| f.pixel(1, 1)).unwrap_or(false));
        Ok(())
    }

    #[test]
    #[ignore]
    // NB. figure out how to stop rendering during tests
    fn test_draw_blank_frame() -> Result<(), io::Error> {
        let mut d = MonoTermDisplay::new(64, 32)?;
        d.draw(&Framebuffer::new())
    }
}
