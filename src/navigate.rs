//! Moving between titles relative to the cursor, and landing on one.

use crate::host::Editor;
use crate::types::{Direction, Selection, Title};

/// Index of the title to jump to from `current_line`, or `None` at the boundary.
///
/// Down picks the first title strictly below the cursor. Up picks the nearest
/// title strictly above it: the first title above whose successor is at or
/// below the cursor, or the last title when it has no successor.
#[must_use]
pub fn next_title(titles: &[Title], current_line: usize, direction: Direction) -> Option<usize> {
    match direction {
        Direction::Down => titles.iter().position(|t| t.line > current_line),
        Direction::Up => {
            for (i, title) in titles.iter().enumerate() {
                if title.line >= current_line {
                    continue;
                }
                match titles.get(i + 1) {
                    Some(next) if next.line >= current_line => return Some(i),
                    Some(_) => {}
                    None => return Some(i),
                }
            }
            None
        }
    }
}

/// Put a single caret at the end of `line` and center the view on it.
pub fn jump_to_line(editor: &mut dyn Editor, line: usize) {
    let region = editor.line_span(line);
    editor.clear_selection();
    editor.add_selection(Selection::cursor(region.end));
    editor.show_at_center(region.end);
    tracing::debug!(line, offset = region.end, "jumped");
}
