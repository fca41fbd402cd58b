//! Live terminal preview of the pipeline.

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use std::io::{self, Stdout, Write};

use super::braille::{render_mask_into, CellGrid, BRAILLE_BASE};
use super::screen::AlternateScreenGuard;
use super::status_bar::format_status;
use super::{Preview, PreviewError, TickView};
use crate::policy::Decision;

const HEADER: &str = " dino-bot | q / Esc / Ctrl+C to quit";

/// Marker drawn in empty cells on the jump-distance column.
const JUMP_MARKER: char = '│';

/// Draws the mask as braille with obstacle boxes and the jump threshold
/// highlighted, plus a status line.
pub struct TerminalPreview<W: Write = Stdout> {
    out: W,
    char_width: u16,
    chars: Vec<char>,
    /// Present when this preview owns the terminal's alternate screen
    _screen: Option<AlternateScreenGuard>,
}

impl TerminalPreview<Stdout> {
    /// Take over the terminal (alternate screen) and draw to stdout.
    ///
    /// The normal screen is restored when the preview is dropped.
    pub fn open(char_width: u16) -> Result<Self, PreviewError> {
        let screen = AlternateScreenGuard::enter()?;
        Ok(Self {
            out: io::stdout(),
            char_width,
            chars: Vec::new(),
            _screen: Some(screen),
        })
    }
}

impl<W: Write> TerminalPreview<W> {
    /// Draw into an arbitrary writer without touching terminal modes.
    pub fn with_writer(out: W, char_width: u16) -> Self {
        Self {
            out,
            char_width,
            chars: Vec::new(),
            _screen: None,
        }
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    fn draw(&mut self, view: &TickView<'_>) -> io::Result<()> {
        let (width, height) = view.mask.dimensions();
        let grid = CellGrid::fit(width, height, self.char_width);
        render_mask_into(view.mask, &grid, &mut self.chars);

        queue!(self.out, MoveTo(0, 0), Print(HEADER), Clear(ClearType::UntilNewLine))?;

        for cy in 0..grid.char_height {
            queue!(self.out, MoveTo(0, cy + 1))?;
            let rows = grid.row_span(cy);

            for cx in 0..grid.char_width {
                let cols = grid.column_span(cx);
                let idx = cy as usize * grid.char_width as usize + cx as usize;
                let mut ch = self.chars.get(idx).copied().unwrap_or(BRAILLE_BASE);
                let mut color = cell_color(view.decision, cols, rows);

                let on_jump_line = view.jump_distance >= cols.0 && view.jump_distance < cols.1;
                if ch == BRAILLE_BASE && on_jump_line {
                    ch = JUMP_MARKER;
                    color = Color::Green;
                }

                queue!(self.out, SetForegroundColor(color), Print(ch))?;
            }
            queue!(self.out, ResetColor, Clear(ClearType::UntilNewLine))?;
        }

        let status = format_status(view);
        queue!(self.out, MoveTo(0, grid.char_height + 1))?;
        if view.jumped {
            queue!(self.out, SetForegroundColor(Color::Green))?;
        }
        queue!(
            self.out,
            Print(status),
            ResetColor,
            Clear(ClearType::UntilNewLine),
            Clear(ClearType::FromCursorDown)
        )?;

        self.out.flush()
    }
}

impl<W: Write> Preview for TerminalPreview<W> {
    fn show(&mut self, view: &TickView<'_>) -> Result<(), PreviewError> {
        self.draw(view)?;
        Ok(())
    }
}

/// Color of a character cell covering pixel ranges `cols` x `rows`.
///
/// Cells over the nearest obstacle are red, over other obstacles yellow.
fn cell_color(decision: &Decision, cols: (u32, u32), rows: (u32, u32)) -> Color {
    let overlaps = |o: &crate::vision::Obstacle| {
        o.x < cols.1 && o.right() > cols.0 && o.y < rows.1 && o.bottom() > rows.0
    };

    if decision.nearest.as_ref().is_some_and(overlaps) {
        Color::Red
    } else if decision.obstacles.iter().any(overlaps) {
        Color::Yellow
    } else {
        Color::Grey
    }
}
