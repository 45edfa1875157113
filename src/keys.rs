// Keyboard bindings for the sheet
//
//   Arrows       move (Shift = fine step)
//   r / g / b    red / green / blue
//   h, F4        minimize / restore
//   f, F11       fullscreen / restore
//   F10          toggle window decoration
//   0-9          transparency level (0 = default)
//   Escape       close

use crate::geometry::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    /// Lowercase letter as typed
    Char(char),
    Digit(u8),
    F4,
    F10,
    F11,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit offset in screen coordinates (y grows downward).
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Nudge { direction: Direction, fine: bool },
    SetColor(Color),
    ToggleMinimize,
    ToggleFullscreen,
    ToggleDecorations,
    SetAlpha(f32),
    Close,
}

/// Look up the action bound to `key`. Letter and digit bindings only fire
/// without Shift, as a shifted key produces a different character.
pub fn action_for(key: Key, shift: bool) -> Option<Action> {
    let nudge = |direction| Some(Action::Nudge { direction, fine: shift });

    match key {
        Key::Up => nudge(Direction::Up),
        Key::Down => nudge(Direction::Down),
        Key::Left => nudge(Direction::Left),
        Key::Right => nudge(Direction::Right),
        Key::F4 => Some(Action::ToggleMinimize),
        Key::F10 => Some(Action::ToggleDecorations),
        Key::F11 => Some(Action::ToggleFullscreen),
        Key::Escape => Some(Action::Close),
        _ if shift => None,
        Key::Char('r') => Some(Action::SetColor(Color::RED)),
        Key::Char('g') => Some(Action::SetColor(Color::GREEN)),
        Key::Char('b') => Some(Action::SetColor(Color::BLUE)),
        Key::Char('h') => Some(Action::ToggleMinimize),
        Key::Char('f') => Some(Action::ToggleFullscreen),
        Key::Char(_) => None,
        Key::Digit(d) if d <= 9 => Some(Action::SetAlpha(f32::from(d))),
        Key::Digit(_) => None,
    }
}
