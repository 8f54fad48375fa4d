//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::Priority;
use crate::store::NoticeLevel;

pub const DARK_GREEN: Color = Color::Rgb(0, 80, 0);
pub const GOLD: Color = Color::Rgb(255, 215, 0);
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
pub const ORANGE: Color = Color::Rgb(230, 120, 20);
/// Status bar background when no notice is shown.
pub const BAR_BLUE: Color = Color::Rgb(30, 60, 120);

/// Badge color for a priority level.
pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Urgent => Color::LightRed,
        Priority::High => ORANGE,
        Priority::Medium => Color::LightBlue,
        Priority::Low => Color::LightGreen,
    }
}

/// Status bar background for a notice.
pub fn notice_color(level: NoticeLevel) -> Color {
    match level {
        NoticeLevel::Success => DARK_GREEN,
        NoticeLevel::Error => DARK_RED,
    }
}
