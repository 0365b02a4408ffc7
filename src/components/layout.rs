//! Layout calculations for the UI

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Main screen layout areas
pub struct MainLayout {
    pub tabs: Rect,
    pub content: Rect,
    pub status: Option<Rect>,
    pub help: Rect,
}

/// Areas of a table view
pub struct TableLayout {
    pub filters: Rect,
    pub table: Rect,
    pub pagination: Rect,
}

/// Calculate centered popup area
pub fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    let popup_x = area.x + (area.width.saturating_sub(width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect::new(
        popup_x,
        popup_y,
        width.min(area.width),
        height.min(area.height),
    )
}

/// Calculate main screen layout: tabs, content, optional status line, help bar
pub fn calculate_main_layout(area: Rect, has_status: bool) -> MainLayout {
    let mut constraints = vec![Constraint::Length(3), Constraint::Min(0)];
    if has_status {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Length(3));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let (status, help) = if has_status {
        (Some(chunks[2]), chunks[3])
    } else {
        (None, chunks[2])
    };

    MainLayout {
        tabs: chunks[0],
        content: chunks[1],
        status,
        help,
    }
}

/// Split a table view into filter bar, rows and pagination bar
pub fn calculate_table_layout(area: Rect) -> TableLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    TableLayout {
        filters: chunks[0],
        table: chunks[1],
        pagination: chunks[2],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_popup_clamps_to_area() {
        let area = Rect::new(0, 0, 20, 10);
        let popup = centered_popup(area, 40, 6);
        assert_eq!(popup.width, 20);
        assert_eq!(popup.y, 2);
    }

    #[test]
    fn test_main_layout_status_line() {
        let area = Rect::new(0, 0, 80, 30);
        let layout = calculate_main_layout(area, true);
        assert_eq!(layout.status.map(|r| r.height), Some(1));
        assert_eq!(layout.content.height, 30 - 3 - 1 - 3);

        let layout = calculate_main_layout(area, false);
        assert!(layout.status.is_none());
    }
}
