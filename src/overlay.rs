// Win32 host window for the sheet.
//
// A single layered, topmost popup window. Input messages are translated into
// `Sheet` operations; after each one the sheet's `Appearance` is pushed to
// the window (position, size, alpha, style, color, cursor). Only what changed
// since the last push is re-applied.

use std::cell::RefCell;

use anyhow::Context;
use windows::core::PCWSTR;
use windows::Win32::Foundation::{COLORREF, HWND, LPARAM, LRESULT, POINT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BeginPaint, ClientToScreen, CreateSolidBrush, DeleteObject, EndPaint, FillRect,
    InvalidateRect, HGDIOBJ, PAINTSTRUCT,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    GetKeyState, ReleaseCapture, SetCapture, SetFocus, VIRTUAL_KEY, VK_DOWN, VK_ESCAPE, VK_F10,
    VK_F11, VK_F4, VK_LEFT, VK_RIGHT, VK_SHIFT, VK_UP,
};
use windows::Win32::UI::WindowsAndMessaging::*;

use crate::geometry::{Color, CursorShape, Point, Rect, Size};
use crate::keys::{self, Key};
use crate::sheet::{Appearance, Outcome, Sheet};

const CLASS_NAME: &str = "RedSheetOverlay";
const WINDOW_TITLE: &str = "RedSheet";

// wParam flag of WM_MOUSEMOVE while the left button is held
const MK_LBUTTON: usize = 0x0001;

struct OverlayState {
    sheet: Sheet,
    /// Appearance last pushed to the window
    applied: Option<Appearance>,
}

thread_local! {
    static STATE: RefCell<Option<OverlayState>> = const { RefCell::new(None) };
}

/// Run `f` against the window state. Returns `None` before the window is
/// set up, after it is destroyed, or when called re-entrantly from a
/// message sent while the state is already borrowed.
fn with_state<R>(f: impl FnOnce(&mut OverlayState) -> R) -> Option<R> {
    STATE.with(|cell| {
        let mut guard = cell.try_borrow_mut().ok()?;
        guard.as_mut().map(f)
    })
}

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn colorref(color: Color) -> COLORREF {
    COLORREF(u32::from(color.r) | u32::from(color.g) << 8 | u32::from(color.b) << 16)
}

fn alpha_byte(alpha: f32) -> u8 {
    (alpha.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn point_from_lparam(lparam: LPARAM) -> Point {
    let x = (lparam.0 & 0xFFFF) as i16 as i32;
    let y = ((lparam.0 >> 16) & 0xFFFF) as i16 as i32;
    Point::new(x, y)
}

fn rect_from_win32(r: RECT) -> Rect {
    Rect::new(r.left, r.top, r.right - r.left, r.bottom - r.top)
}

fn to_screen(hwnd: HWND, client: Point) -> Point {
    let mut pt = POINT {
        x: client.x,
        y: client.y,
    };
    unsafe {
        let _ = ClientToScreen(hwnd, &mut pt);
    }
    Point::new(pt.x, pt.y)
}

fn client_size(hwnd: HWND) -> Size {
    let mut rect = RECT::default();
    unsafe {
        let _ = GetClientRect(hwnd, &mut rect);
    }
    rect_from_win32(rect).size()
}

fn shift_held() -> bool {
    unsafe { GetKeyState(VK_SHIFT.0 as i32) < 0 }
}

fn key_from_vk(vk: VIRTUAL_KEY) -> Option<Key> {
    let key = match vk {
        VK_UP => Key::Up,
        VK_DOWN => Key::Down,
        VK_LEFT => Key::Left,
        VK_RIGHT => Key::Right,
        VK_F4 => Key::F4,
        VK_F10 => Key::F10,
        VK_F11 => Key::F11,
        VK_ESCAPE => Key::Escape,
        // Virtual key codes for letters and digits are their ASCII uppercase
        VIRTUAL_KEY(code @ 0x30..=0x39) => Key::Digit((code - 0x30) as u8),
        VIRTUAL_KEY(code @ 0x41..=0x5A) => Key::Char((code as u8 as char).to_ascii_lowercase()),
        _ => return None,
    };
    Some(key)
}

fn set_cursor(shape: CursorShape) {
    let id = match shape {
        CursorShape::Default => IDC_ARROW,
        CursorShape::Move => IDC_SIZEALL,
        CursorShape::ResizeNwse => IDC_SIZENWSE,
        CursorShape::ResizeNesw => IDC_SIZENESW,
    };
    unsafe {
        if let Ok(cursor) = LoadCursorW(None, id) {
            let _ = SetCursor(Some(cursor));
        }
    }
}

fn take_focus(hwnd: HWND) {
    unsafe {
        let _ = SetForegroundWindow(hwnd);
        let _ = SetFocus(Some(hwnd));
    }
}

/// Primary screen size in pixels
pub fn screen_size() -> Size {
    unsafe { Size::new(GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) }
}

/// Push the sheet's appearance to the window.
fn apply(hwnd: HWND) {
    let Some((next, prev)) = with_state(|state| {
        let next = state.sheet.appearance();
        (next, state.applied.replace(next))
    }) else {
        return;
    };
    if prev == Some(next) {
        return;
    }
    let decorated_changed = prev.map_or(true, |p| p.decorated != next.decorated);
    let alpha_changed = prev.map_or(true, |p| p.alpha != next.alpha);
    let color_changed = prev.map_or(true, |p| p.color != next.color);
    let cursor_changed = prev.map_or(true, |p| p.cursor != next.cursor);

    unsafe {
        let mut flags = SWP_NOACTIVATE;
        if decorated_changed {
            let style = if next.decorated {
                WS_OVERLAPPEDWINDOW | WS_VISIBLE
            } else {
                WS_POPUP | WS_VISIBLE
            };
            let _ = SetWindowLongPtrW(hwnd, GWL_STYLE, style.0 as isize);
            flags |= SWP_FRAMECHANGED;
        }

        let g = next.geometry;
        if let Err(err) = SetWindowPos(
            hwnd,
            Some(HWND_TOPMOST),
            g.x,
            g.y,
            g.width,
            g.height,
            flags,
        ) {
            tracing::warn!(geometry = ?g, "SetWindowPos failed: {err}");
        }

        if alpha_changed {
            if let Err(err) =
                SetLayeredWindowAttributes(hwnd, COLORREF(0), alpha_byte(next.alpha), LWA_ALPHA)
            {
                tracing::warn!(alpha = next.alpha, "SetLayeredWindowAttributes failed: {err}");
            }
        }

        if color_changed {
            let _ = InvalidateRect(Some(hwnd), None, false);
        }
    }

    if cursor_changed {
        set_cursor(next.cursor);
    }
}

fn on_key(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    let key = key_from_vk(VIRTUAL_KEY(wparam.0 as u16));
    // Alt combinations stay with the system, except F10 which Windows
    // always reports as a system key
    let key = match key {
        Some(Key::F10) => Some(Key::F10),
        Some(k) if msg != WM_SYSKEYDOWN => Some(k),
        _ => None,
    };
    let Some(action) = key.and_then(|k| keys::action_for(k, shift_held())) else {
        return unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) };
    };

    tracing::debug!(?action, "key action");
    match with_state(|state| state.sheet.perform(action)) {
        Some(Outcome::Close) => unsafe {
            if let Err(err) = DestroyWindow(hwnd) {
                tracing::error!("DestroyWindow failed: {err}");
                PostQuitMessage(0);
            }
        },
        _ => apply(hwnd),
    }
    LRESULT(0)
}

unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_PAINT => {
            let mut ps = PAINTSTRUCT::default();
            let hdc = BeginPaint(hwnd, &mut ps);
            let color = with_state(|state| state.sheet.appearance().color).unwrap_or(Color::RED);
            let brush = CreateSolidBrush(colorref(color));
            FillRect(hdc, &ps.rcPaint, brush);
            let _ = DeleteObject(HGDIOBJ::from(brush));
            let _ = EndPaint(hwnd, &ps);
            LRESULT(0)
        }

        // Painted in full by WM_PAINT
        WM_ERASEBKGND => LRESULT(1),

        WM_KEYDOWN | WM_SYSKEYDOWN => on_key(hwnd, msg, wparam, lparam),

        WM_LBUTTONDOWN => {
            let client = point_from_lparam(lparam);
            let size = client_size(hwnd);
            let screen = to_screen(hwnd, client);
            let _ = SetCapture(hwnd);
            with_state(|state| state.sheet.press(client, size, screen));
            apply(hwnd);
            LRESULT(0)
        }

        WM_MOUSEMOVE => {
            let client = point_from_lparam(lparam);
            if wparam.0 & MK_LBUTTON != 0 {
                let screen = to_screen(hwnd, client);
                with_state(|state| state.sheet.motion(client, screen));
                apply(hwnd);
            } else {
                let size = client_size(hwnd);
                let restored = with_state(|state| state.sheet.pointer_moved(client, size));
                apply(hwnd);
                if restored == Some(true) {
                    take_focus(hwnd);
                }
            }
            LRESULT(0)
        }

        WM_LBUTTONUP => {
            let _ = ReleaseCapture();
            with_state(|state| state.sheet.release());
            apply(hwnd);
            LRESULT(0)
        }

        // Capture taken away mid-gesture (e.g. Alt+Tab)
        WM_CAPTURECHANGED => {
            with_state(|state| state.sheet.release());
            apply(hwnd);
            LRESULT(0)
        }

        WM_SETCURSOR if (lparam.0 & 0xFFFF) as u32 == HTCLIENT => {
            if let Some(cursor) = with_state(|state| state.sheet.appearance().cursor) {
                set_cursor(cursor);
            }
            LRESULT(1)
        }

        WM_WINDOWPOSCHANGED => {
            // Keep the sheet in step with moves made by the system, such as
            // dragging the native title bar while decorated
            if !IsIconic(hwnd).as_bool() {
                let mut rect = RECT::default();
                if GetWindowRect(hwnd, &mut rect).is_ok() {
                    with_state(|state| state.sheet.sync_geometry(rect_from_win32(rect)));
                }
            }
            DefWindowProcW(hwnd, msg, wparam, lparam)
        }

        WM_DESTROY => {
            STATE.with(|cell| {
                if let Ok(mut guard) = cell.try_borrow_mut() {
                    guard.take();
                }
            });
            PostQuitMessage(0);
            LRESULT(0)
        }

        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

fn create_window(sheet: &Sheet) -> anyhow::Result<HWND> {
    let class_name = wide(CLASS_NAME);
    let title = wide(WINDOW_TITLE);

    unsafe {
        let hinstance = GetModuleHandleW(PCWSTR::null()).context("GetModuleHandleW")?;

        let wc = WNDCLASSW {
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(wnd_proc),
            hInstance: hinstance.into(),
            lpszClassName: PCWSTR(class_name.as_ptr()),
            hCursor: LoadCursorW(None, IDC_ARROW).unwrap_or_default(),
            ..Default::default()
        };
        if RegisterClassW(&wc) == 0 {
            anyhow::bail!(
                "registering window class: {}",
                std::io::Error::last_os_error()
            );
        }

        // Layered windows stay invisible until their alpha is set, which
        // the first `apply` does before the window is shown
        let g = sheet.geometry();
        let hwnd = CreateWindowExW(
            WS_EX_LAYERED | WS_EX_TOPMOST,
            PCWSTR(class_name.as_ptr()),
            PCWSTR(title.as_ptr()),
            WS_POPUP,
            g.x,
            g.y,
            g.width,
            g.height,
            None,
            None,
            Some(hinstance.into()),
            None,
        )
        .context("creating overlay window")?;

        Ok(hwnd)
    }
}

/// Create the overlay for `sheet` and pump messages until it is closed.
pub fn run(sheet: Sheet) -> anyhow::Result<()> {
    let hwnd = create_window(&sheet)?;
    STATE.with(|cell| {
        *cell.borrow_mut() = Some(OverlayState {
            sheet,
            applied: None,
        })
    });

    apply(hwnd);
    unsafe {
        let _ = ShowWindow(hwnd, SW_SHOW);
    }
    take_focus(hwnd);
    tracing::info!("overlay window shown");

    unsafe {
        let mut msg = MSG::default();
        while GetMessageW(&mut msg, None, 0, 0).as_bool() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }

    tracing::info!("overlay closed");
    Ok(())
}
