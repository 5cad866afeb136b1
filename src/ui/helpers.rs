use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Cell, Row};

use crate::models::StudentRecord;

/// Column headers for the roster table, in display order.
pub(crate) const COLUMN_HEADERS: [&str; 4] = ["Id", "Name", "Course", "Mobile"];

/// Build one table row. Rows matched by the last search get a highlight so
/// every hit stays visible while the cursor sits on the first one.
pub(crate) fn student_row(record: &StudentRecord, matched: bool) -> Row<'static> {
    let cells = [
        Cell::from(record.id.to_string()),
        Cell::from(record.name.clone()),
        Cell::from(record.course.as_str()),
        Cell::from(record.mobile.clone()),
    ];
    let row = Row::new(cells);
    if matched {
        row.style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        row
    }
}

/// Clamp `current + offset` into `0..len`. Returns 0 for an empty table.
pub(crate) fn offset_index(current: usize, offset: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let target = current as isize + offset;
    target.clamp(0, len as isize - 1) as usize
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}
