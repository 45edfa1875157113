// Value types shared by the sheet state machine and the window layer

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Window rectangle in screen pixels (outer frame, top-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }
}

/// Mouse cursor the window should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    #[default]
    Default,
    Move,
    ResizeNwse,
    ResizeNesw,
}

/// One of the four resizer frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::NorthWest,
        Corner::NorthEast,
        Corner::SouthWest,
        Corner::SouthEast,
    ];

    pub fn cursor(self) -> CursorShape {
        match self {
            Corner::NorthWest | Corner::SouthEast => CursorShape::ResizeNwse,
            Corner::NorthEast | Corner::SouthWest => CursorShape::ResizeNesw,
        }
    }

    /// Top-left of a `frame`-sized square anchored at this corner of `area`.
    pub fn frame_origin(self, area: Rect, frame: i32) -> Point {
        let right = area.x + area.width - frame;
        let bottom = area.y + area.height - frame;
        match self {
            Corner::NorthWest => Point::new(area.x, area.y),
            Corner::NorthEast => Point::new(right, area.y),
            Corner::SouthWest => Point::new(area.x, bottom),
            Corner::SouthEast => Point::new(right, bottom),
        }
    }

    pub fn frame_rect(self, area: Rect, frame: i32) -> Rect {
        let origin = self.frame_origin(area, frame);
        Rect::new(origin.x, origin.y, frame, frame)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseColorError {
    #[error("empty color string")]
    Empty,
    #[error("invalid hex color `{0}`")]
    InvalidHex(String),
    #[error("unknown color name `{0}`")]
    UnknownName(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const RED: Color = Color::rgb(0xFF, 0x00, 0x00);
    // Tk's "green" is the dark web green, not #00FF00
    pub const GREEN: Color = Color::rgb(0x00, 0x80, 0x00);
    pub const BLUE: Color = Color::rgb(0x00, 0x00, 0xFF);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    fn from_name(name: &str) -> Option<Color> {
        let color = match name.to_ascii_lowercase().as_str() {
            "red" => Color::RED,
            "green" => Color::GREEN,
            "blue" => Color::BLUE,
            "black" => Color::rgb(0x00, 0x00, 0x00),
            "white" => Color::rgb(0xFF, 0xFF, 0xFF),
            "yellow" => Color::rgb(0xFF, 0xFF, 0x00),
            "cyan" => Color::rgb(0x00, 0xFF, 0xFF),
            "magenta" => Color::rgb(0xFF, 0x00, 0xFF),
            _ => return None,
        };
        Some(color)
    }

    fn from_hex(digits: &str) -> Option<Color> {
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match digits.len() {
            6 => {
                let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
                Some(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
            }
            3 => {
                let channel = |i: usize| {
                    u8::from_str_radix(&digits[i..i + 1], 16)
                        .ok()
                        .map(|v| v * 0x11)
                };
                Some(Color::rgb(channel(0)?, channel(1)?, channel(2)?))
            }
            _ => None,
        }
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseColorError::Empty);
        }
        if let Some(digits) = s.strip_prefix('#') {
            return Color::from_hex(digits).ok_or_else(|| ParseColorError::InvalidHex(s.into()));
        }
        Color::from_name(s).ok_or_else(|| ParseColorError::UnknownName(s.into()))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}
