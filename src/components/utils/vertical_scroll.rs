use std::cell::Cell;

/// Tracks the first visible row of a list so the selection stays on screen.
/// Updated during rendering, hence the `Cell`.
pub struct VerticalScroll {
    pub y_offset: Cell<usize>,
}

impl VerticalScroll {
    pub fn new() -> Self {
        VerticalScroll {
            y_offset: Cell::new(0),
        }
    }

    /// Moves the window only as far as needed to show `selection`, and
    /// returns the new offset.
    pub fn update(&self, visible_height: usize, selection: usize, len: usize) -> usize {
        if visible_height == 0 || len == 0 {
            self.y_offset.set(0);
            return 0;
        }

        let max_offset = len.saturating_sub(visible_height);
        let mut offset = self.y_offset.get().min(max_offset);
        let selection = selection.min(len - 1);

        if selection < offset {
            offset = selection;
        } else if selection >= offset + visible_height {
            offset = selection + 1 - visible_height;
        }

        self.y_offset.set(offset);
        offset
    }
}
