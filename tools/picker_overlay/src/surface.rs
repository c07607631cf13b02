use std::io::Write;

use picker_core::{PickerSurface, VisibleList};

/// Plain-text picker surface; the selected row is prefixed with `>`.
pub struct TextSurface<W: Write> {
    out: W,
}

impl<W: Write> TextSurface<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn write_list(&mut self, list: &VisibleList) -> std::io::Result<()> {
        writeln!(self.out, "picker ({} entries)", list.rows.len())?;
        for row in &list.rows {
            let cursor = if row.selected { '>' } else { ' ' };
            writeln!(self.out, "{cursor} {}", row.text)?;
        }
        self.out.flush()
    }
}

impl<W: Write> PickerSurface for TextSurface<W> {
    fn present(&mut self, list: &VisibleList) {
        if let Err(err) = self.write_list(list) {
            log::warn!("failed to draw picker: {err}");
        }
    }

    fn hide(&mut self) {
        let result = writeln!(self.out, "picker hidden").and_then(|_| self.out.flush());
        if let Err(err) = result {
            log::warn!("failed to hide picker: {err}");
        }
    }
}
