// Overlay window model, independent of the windowing system.
//
// The platform layer feeds input into a `Sheet` and pushes the resulting
// `Appearance` to the real window. Minimized, fullscreen and resizing are
// on/off modes; each holds what it restores when it ends.

use crate::geometry::{Color, Corner, CursorShape, Point, Rect, Size};
use crate::keys::{Action, Direction};

/// Tunables for sizing and movement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Behavior {
    pub width_ratio: f32,
    pub height_ratio: f32,
    pub move_step: i32,
    pub micro_move_step: i32,
    pub min_size: i32,
    /// Side of the square resizer frame in each corner
    pub frame_size: i32,
    /// Level used when transparency is reset with `0`
    pub default_alpha_level: f32,
    pub minimized_rect: Rect,
    pub minimized_alpha: f32,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            width_ratio: 0.5,
            height_ratio: 0.4,
            move_step: 25,
            micro_move_step: 3,
            min_size: 50,
            frame_size: 20,
            default_alpha_level: 7.0,
            minimized_rect: Rect::new(2, 2, 100, 100),
            minimized_alpha: 0.5,
        }
    }
}

/// Everything the platform layer needs to draw the window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Appearance {
    pub geometry: Rect,
    pub color: Color,
    pub alpha: f32,
    pub decorated: bool,
    pub cursor: CursorShape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Close,
}

#[derive(Debug, Clone, Copy)]
struct Minimized {
    geometry: Rect,
    alpha: f32,
    color: Color,
}

#[derive(Debug, Clone, Copy)]
struct ResizeGrab {
    corner: Corner,
    /// Press position relative to the frame's top-left
    offset: Point,
}

#[derive(Debug, Clone)]
pub struct Sheet {
    screen: Size,
    behavior: Behavior,
    geometry: Rect,
    color: Color,
    alpha: f32,
    decorated: bool,
    cursor: CursorShape,
    minimized: Option<Minimized>,
    fullscreen: Option<Rect>,
    resizing: Option<ResizeGrab>,
    drag_grab: Option<Point>,
    hover: Option<Corner>,
}

impl Sheet {
    pub fn new(screen: Size, behavior: Behavior, color: Color, alpha_level: f32) -> Self {
        let mut sheet = Self {
            screen,
            behavior,
            geometry: Rect::default(),
            color,
            alpha: behavior.default_alpha_level / 10.0,
            decorated: false,
            cursor: CursorShape::Default,
            minimized: None,
            fullscreen: None,
            resizing: None,
            drag_grab: None,
            hover: None,
        };
        sheet.change_alpha(alpha_level);
        sheet.center(behavior.width_ratio, behavior.height_ratio);
        sheet
    }

    pub fn appearance(&self) -> Appearance {
        Appearance {
            geometry: self.geometry,
            color: self.color,
            alpha: self.alpha,
            decorated: self.decorated,
            cursor: self.cursor,
        }
    }

    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    pub fn is_minimized(&self) -> bool {
        self.minimized.is_some()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen.is_some()
    }

    pub fn is_resizing(&self) -> bool {
        self.resizing.is_some()
    }

    /// Resizer frames are shown unless minimized or fullscreen.
    pub fn frames_visible(&self) -> bool {
        !self.is_minimized() && !self.is_fullscreen()
    }

    /// Resizer frame under `p`, in client coordinates.
    pub fn corner_at(&self, p: Point, client: Size) -> Option<Corner> {
        if !self.frames_visible() {
            return None;
        }
        let area = Rect::new(0, 0, client.width, client.height);
        Corner::ALL
            .into_iter()
            .find(|c| c.frame_rect(area, self.behavior.frame_size).contains(p))
    }

    fn center(&mut self, width_ratio: f32, height_ratio: f32) {
        let width = (self.screen.width as f32 * width_ratio) as i32;
        let height = (self.screen.height as f32 * height_ratio) as i32;
        let x = (self.screen.width - width) / 2;
        let y = (self.screen.height - height) / 2;
        self.geometry = Rect::new(x, y, width, height);
    }

    pub fn perform(&mut self, action: Action) -> Outcome {
        match action {
            Action::Nudge { direction, fine } => self.nudge(direction, fine),
            Action::SetColor(color) => self.change_color(color),
            Action::ToggleMinimize => self.toggle_minimize(),
            Action::ToggleFullscreen => self.toggle_fullscreen(),
            Action::ToggleDecorations => self.toggle_decorations(),
            Action::SetAlpha(level) => self.change_alpha(level),
            Action::Close => return Outcome::Close,
        }
        Outcome::Continue
    }

    pub fn toggle_minimize(&mut self) {
        match self.minimized.take() {
            Some(saved) => {
                self.geometry = saved.geometry;
                self.alpha = saved.alpha;
                self.color = saved.color;
                tracing::debug!(geometry = ?self.geometry, "restored from minimized");
            }
            None => {
                self.minimized = Some(Minimized {
                    geometry: self.geometry,
                    alpha: self.alpha,
                    color: self.color,
                });
                self.geometry = self.behavior.minimized_rect;
                self.alpha = self.behavior.minimized_alpha;
                self.hover = None;
                tracing::debug!("minimized");
            }
        }
    }

    pub fn toggle_fullscreen(&mut self) {
        match self.fullscreen.take() {
            Some(saved) => {
                self.geometry = saved;
                tracing::debug!(geometry = ?saved, "left fullscreen");
            }
            None => {
                self.fullscreen = Some(self.geometry);
                self.geometry = Rect::new(0, 0, self.screen.width, self.screen.height);
                self.hover = None;
                tracing::debug!("entered fullscreen");
            }
        }
    }

    pub fn toggle_decorations(&mut self) {
        self.decorated = !self.decorated;
        tracing::debug!(decorated = self.decorated, "window decoration toggled");
    }

    pub fn change_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Set transparency to `level / 10`. Level 0 restores the default.
    /// Ignored while minimized.
    pub fn change_alpha(&mut self, level: f32) {
        if self.is_minimized() {
            return;
        }
        let level = if level == 0.0 {
            self.behavior.default_alpha_level
        } else {
            level
        };
        if (0.0..=10.0).contains(&level) {
            self.alpha = level / 10.0;
        }
    }

    pub fn nudge(&mut self, direction: Direction, fine: bool) {
        let step = if fine {
            self.behavior.micro_move_step
        } else {
            self.behavior.move_step
        };
        let (dx, dy) = direction.offset();
        self.geometry.x += dx * step;
        self.geometry.y += dy * step;
    }

    /// Left button went down at `client` (window-relative); `screen` is the
    /// same position in screen coordinates.
    pub fn press(&mut self, client: Point, client_size: Size, screen: Point) {
        if let Some(corner) = self.corner_at(client, client_size) {
            self.start_resize(corner, screen);
        }
        self.begin_drag(client);
    }

    /// Pointer moved with the left button held.
    pub fn motion(&mut self, client: Point, screen: Point) {
        if self.is_resizing() {
            self.resize_to(screen);
        } else {
            self.drag_to(client);
        }
    }

    pub fn begin_drag(&mut self, client: Point) {
        if self.is_resizing() || self.is_fullscreen() {
            return;
        }
        self.cursor = CursorShape::Move;
        self.drag_grab = Some(client);
    }

    pub fn drag_to(&mut self, client: Point) {
        if self.is_resizing() || self.is_fullscreen() {
            return;
        }
        if let Some(grab) = self.drag_grab {
            self.geometry.x += client.x - grab.x;
            self.geometry.y += client.y - grab.y;
        }
    }

    pub fn start_resize(&mut self, corner: Corner, screen: Point) {
        let origin = corner.frame_origin(self.geometry, self.behavior.frame_size);
        self.resizing = Some(ResizeGrab {
            corner,
            offset: Point::new(screen.x - origin.x, screen.y - origin.y),
        });
        tracing::debug!(?corner, "resize started");
    }

    pub fn resize_to(&mut self, screen: Point) {
        let Some(grab) = self.resizing else {
            return;
        };
        let origin = grab.corner.frame_origin(self.geometry, self.behavior.frame_size);
        let dx = screen.x - origin.x - grab.offset.x;
        let dy = screen.y - origin.y - grab.offset.y;
        let min = self.behavior.min_size;

        let Rect {
            mut x,
            mut y,
            mut width,
            mut height,
        } = self.geometry;

        // Which edges follow the pointer: west/north edges move the origin
        let (west, north) = match grab.corner {
            Corner::NorthWest => (true, true),
            Corner::NorthEast => (false, true),
            Corner::SouthWest => (true, false),
            Corner::SouthEast => (false, false),
        };

        if west {
            width -= dx;
            x += dx;
        } else {
            width += dx;
        }
        if north {
            height -= dy;
            y += dy;
        } else {
            height += dy;
        }

        if width <= min {
            width = min;
            if west {
                x -= dx;
            }
        }
        if height <= min {
            height = min;
            if north {
                y -= dy;
            }
        }

        self.geometry = Rect::new(x, y, width, height);
    }

    /// Left button released: ends any drag or resize.
    pub fn release(&mut self) {
        if self.resizing.take().is_some() {
            tracing::debug!(geometry = ?self.geometry, "resize finished");
        }
        self.drag_grab = None;
        self.cursor = CursorShape::Default;
    }

    /// Pointer moved with no button held. Returns true when the window was
    /// restored from minimized and should take keyboard focus.
    pub fn pointer_moved(&mut self, client: Point, client_size: Size) -> bool {
        if self.is_minimized() {
            self.toggle_minimize();
            self.hover = None;
            return true;
        }

        let corner = self.corner_at(client, client_size);
        if corner != self.hover {
            self.cursor = match corner {
                Some(c) => c.cursor(),
                None => CursorShape::Default,
            };
            self.hover = corner;
        }
        false
    }

    /// Adopt geometry changed outside the sheet (native frame drag, DPI move).
    pub fn sync_geometry(&mut self, rect: Rect) {
        self.geometry = rect;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{action_for, Key};

    const SCREEN: Size = Size::new(1920, 1080);

    fn sheet() -> Sheet {
        Sheet::new(SCREEN, Behavior::default(), Color::RED, 7.5)
    }

    fn sheet_at(rect: Rect) -> Sheet {
        let mut s = sheet();
        s.sync_geometry(rect);
        s
    }

    #[test]
    fn starts_centered_red_and_borderless() {
        let s = sheet();
        let a = s.appearance();
        assert_eq!(a.geometry, Rect::new(480, 324, 960, 432));
        assert_eq!(a.color, Color::RED);
        assert_eq!(a.alpha, 0.75);
        assert!(!a.decorated);
        assert_eq!(a.cursor, CursorShape::Default);
        assert!(s.frames_visible());
    }

    #[test]
    fn minimize_round_trip_restores_everything() {
        let mut s = sheet();
        let before = s.appearance();

        s.toggle_minimize();
        assert!(s.is_minimized());
        assert_eq!(s.geometry(), Rect::new(2, 2, 100, 100));
        assert_eq!(s.appearance().alpha, 0.5);
        assert!(!s.frames_visible());

        s.change_color(Color::BLUE);
        s.toggle_minimize();
        assert!(!s.is_minimized());
        assert_eq!(s.appearance(), before);
        assert!(s.frames_visible());
    }

    #[test]
    fn alpha_changes_are_ignored_while_minimized() {
        let mut s = sheet();
        s.toggle_minimize();
        s.change_alpha(2.0);
        assert_eq!(s.appearance().alpha, 0.5);
        s.toggle_minimize();
        assert_eq!(s.appearance().alpha, 0.75);
    }

    #[test]
    fn alpha_levels() {
        let mut s = sheet();
        s.change_alpha(3.0);
        assert_eq!(s.appearance().alpha, 0.3);
        s.change_alpha(0.0);
        assert_eq!(s.appearance().alpha, 0.7);
        s.change_alpha(11.0);
        assert_eq!(s.appearance().alpha, 0.7);
        s.change_alpha(-1.0);
        assert_eq!(s.appearance().alpha, 0.7);
    }

    #[test]
    fn fullscreen_covers_screen_and_restores() {
        let mut s = sheet_at(Rect::new(10, 20, 300, 200));
        s.toggle_fullscreen();
        assert_eq!(s.geometry(), Rect::new(0, 0, 1920, 1080));
        assert!(!s.frames_visible());
        assert_eq!(s.corner_at(Point::new(0, 0), SCREEN), None);

        s.toggle_fullscreen();
        assert_eq!(s.geometry(), Rect::new(10, 20, 300, 200));
        assert!(s.frames_visible());
    }

    #[test]
    fn drag_is_refused_in_fullscreen_but_nudge_is_not() {
        let mut s = sheet();
        s.toggle_fullscreen();
        s.begin_drag(Point::new(50, 50));
        s.drag_to(Point::new(80, 90));
        assert_eq!(s.geometry(), Rect::new(0, 0, 1920, 1080));
        assert_eq!(s.appearance().cursor, CursorShape::Default);

        s.nudge(Direction::Right, false);
        assert_eq!(s.geometry().x, 25);
    }

    #[test]
    fn nudge_steps() {
        let mut s = sheet_at(Rect::new(100, 100, 200, 200));
        s.perform(action_for(Key::Up, false).unwrap());
        assert_eq!(s.geometry(), Rect::new(100, 75, 200, 200));
        s.perform(action_for(Key::Left, true).unwrap());
        assert_eq!(s.geometry(), Rect::new(97, 75, 200, 200));
    }

    #[test]
    fn drag_keeps_grab_point_under_pointer() {
        let mut s = sheet_at(Rect::new(100, 100, 400, 300));
        let client = Size::new(400, 300);
        s.press(Point::new(200, 150), client, Point::new(300, 250));
        assert_eq!(s.appearance().cursor, CursorShape::Move);

        // Window-relative coordinates after the pointer moved by (+30, -10)
        s.motion(Point::new(230, 140), Point::new(330, 240));
        assert_eq!(s.geometry(), Rect::new(130, 90, 400, 300));

        // Window has caught up, pointer is over the grab point again
        s.motion(Point::new(200, 150), Point::new(330, 240));
        assert_eq!(s.geometry(), Rect::new(130, 90, 400, 300));

        s.release();
        assert_eq!(s.appearance().cursor, CursorShape::Default);
        s.drag_to(Point::new(0, 0));
        assert_eq!(s.geometry(), Rect::new(130, 90, 400, 300));
    }

    #[test]
    fn pressing_a_corner_resizes_instead_of_dragging() {
        let mut s = sheet_at(Rect::new(100, 100, 400, 300));
        let client = Size::new(400, 300);
        s.press(Point::new(390, 290), client, Point::new(490, 390));
        assert!(s.is_resizing());
        assert_eq!(s.appearance().cursor, CursorShape::Default);

        s.motion(Point::new(440, 320), Point::new(540, 420));
        assert_eq!(s.geometry(), Rect::new(100, 100, 450, 330));

        // Frame moved with the corner, so the same pointer is no further delta
        s.motion(Point::new(440, 320), Point::new(540, 420));
        assert_eq!(s.geometry(), Rect::new(100, 100, 450, 330));

        s.release();
        assert!(!s.is_resizing());
    }

    #[test]
    fn north_west_resize_moves_origin() {
        let mut s = sheet_at(Rect::new(100, 100, 400, 300));
        s.start_resize(Corner::NorthWest, Point::new(105, 105));
        s.resize_to(Point::new(145, 125));
        assert_eq!(s.geometry(), Rect::new(140, 120, 360, 280));
    }

    #[test]
    fn north_east_resize_moves_top_only() {
        let mut s = sheet_at(Rect::new(100, 100, 400, 300));
        s.start_resize(Corner::NorthEast, Point::new(490, 105));
        s.resize_to(Point::new(510, 95));
        assert_eq!(s.geometry(), Rect::new(100, 90, 420, 310));
    }

    #[test]
    fn south_west_resize_moves_left_only() {
        let mut s = sheet_at(Rect::new(100, 100, 400, 300));
        s.start_resize(Corner::SouthWest, Point::new(105, 390));
        s.resize_to(Point::new(125, 410));
        assert_eq!(s.geometry(), Rect::new(120, 100, 380, 320));
    }

    #[test]
    fn resize_clamps_to_minimum_size() {
        let mut s = sheet_at(Rect::new(100, 100, 60, 300));
        s.start_resize(Corner::NorthWest, Point::new(105, 105));
        s.resize_to(Point::new(120, 105));
        assert_eq!(s.geometry(), Rect::new(100, 100, 50, 300));

        let mut s = sheet_at(Rect::new(100, 100, 400, 300));
        s.start_resize(Corner::SouthEast, Point::new(490, 390));
        s.resize_to(Point::new(0, 0));
        assert_eq!(s.geometry(), Rect::new(100, 100, 50, 50));

        let mut s = sheet_at(Rect::new(100, 100, 400, 60));
        s.start_resize(Corner::NorthEast, Point::new(490, 105));
        s.resize_to(Point::new(490, 150));
        assert_eq!(s.geometry(), Rect::new(100, 100, 400, 50));
    }

    #[test]
    fn drag_is_blocked_while_resizing() {
        let mut s = sheet_at(Rect::new(100, 100, 400, 300));
        s.start_resize(Corner::SouthEast, Point::new(490, 390));
        s.begin_drag(Point::new(10, 10));
        s.drag_to(Point::new(50, 50));
        assert_eq!(s.geometry(), Rect::new(100, 100, 400, 300));
    }

    #[test]
    fn hover_over_minimized_sheet_restores_and_focuses() {
        let mut s = sheet();
        let before = s.geometry();
        s.toggle_minimize();

        assert!(s.pointer_moved(Point::new(50, 50), Size::new(100, 100)));
        assert!(!s.is_minimized());
        assert_eq!(s.geometry(), before);

        assert!(!s.pointer_moved(Point::new(50, 50), before.size()));
    }

    #[test]
    fn hovering_frames_switches_cursor() {
        let mut s = sheet_at(Rect::new(0, 0, 400, 300));
        let client = Size::new(400, 300);

        s.pointer_moved(Point::new(5, 5), client);
        assert_eq!(s.appearance().cursor, CursorShape::ResizeNwse);

        s.pointer_moved(Point::new(200, 150), client);
        assert_eq!(s.appearance().cursor, CursorShape::Default);

        s.pointer_moved(Point::new(395, 5), client);
        assert_eq!(s.appearance().cursor, CursorShape::ResizeNesw);

        s.pointer_moved(Point::new(5, 295), client);
        assert_eq!(s.appearance().cursor, CursorShape::ResizeNesw);

        s.pointer_moved(Point::new(395, 295), client);
        assert_eq!(s.appearance().cursor, CursorShape::ResizeNwse);
    }

    #[test]
    fn keys_drive_modes_and_close() {
        let mut s = sheet();
        assert_eq!(
            s.perform(action_for(Key::Char('f'), false).unwrap()),
            Outcome::Continue
        );
        assert!(s.is_fullscreen());
        s.perform(action_for(Key::F11, false).unwrap());
        assert!(!s.is_fullscreen());

        s.perform(action_for(Key::F10, false).unwrap());
        assert!(s.appearance().decorated);

        s.perform(action_for(Key::Char('b'), false).unwrap());
        assert_eq!(s.appearance().color, Color::BLUE);

        s.perform(action_for(Key::Digit(4), false).unwrap());
        assert_eq!(s.appearance().alpha, 0.4);

        assert_eq!(s.perform(action_for(Key::Escape, false).unwrap()), Outcome::Close);
    }
}
