//! Host input events → [`InputState`].
//!
//! The host reports pointer coordinates with a bottom-left origin relative to
//! the region under the cursor; the GUI library wants top-left. Keys go
//! through a fixed table; anything not in it is ignored.

use crate::input::{InputState, Key, MouseButton};
use crate::Vec2;

/// Host event type identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    MouseMove,
    LeftMouse,
    RightMouse,
    MiddleMouse,
    WheelUpMouse,
    WheelDownMouse,

    Tab,
    LeftArrow,
    RightArrow,
    UpArrow,
    DownArrow,
    Home,
    End,
    Insert,
    Del,
    BackSpace,
    Ret,
    Esc,
    PageUp,
    PageDown,
    A,
    C,
    V,
    X,
    Y,
    Z,
    LeftCtrl,
    RightCtrl,
    LeftAlt,
    RightAlt,
    LeftShift,
    RightShift,
    OsKey,

    /// Text-only events and every key the overlay does not care about.
    Other(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventValue {
    Press,
    Release,
    #[default]
    Nothing,
}

/// One event from the host's input stream.
#[derive(Debug, Clone, PartialEq)]
pub struct HostEvent {
    pub kind:  EventKind,
    pub value: EventValue,
    /// Pointer position in region pixels, bottom-left origin.
    pub mouse_region_x: f32,
    pub mouse_region_y: f32,
    /// Character produced by the event, if any.
    pub unicode: Option<char>,
}

impl HostEvent {
    pub fn new(kind: EventKind, value: EventValue) -> Self {
        Self { kind, value, mouse_region_x: 0.0, mouse_region_y: 0.0, unicode: None }
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.mouse_region_x = x;
        self.mouse_region_y = y;
        self
    }

    pub fn with_unicode(mut self, ch: char) -> Self {
        self.unicode = Some(ch);
        self
    }
}

/// Host key identifier → GUI key slot.
pub const KEY_TABLE: [(EventKind, Key); 27] = [
    (EventKind::Tab,        Key::Tab),
    (EventKind::LeftArrow,  Key::LeftArrow),
    (EventKind::RightArrow, Key::RightArrow),
    (EventKind::UpArrow,    Key::UpArrow),
    (EventKind::DownArrow,  Key::DownArrow),
    (EventKind::Home,       Key::Home),
    (EventKind::End,        Key::End),
    (EventKind::Insert,     Key::Insert),
    (EventKind::Del,        Key::Delete),
    (EventKind::BackSpace,  Key::Backspace),
    (EventKind::Ret,        Key::Enter),
    (EventKind::Esc,        Key::Escape),
    (EventKind::PageUp,     Key::PageUp),
    (EventKind::PageDown,   Key::PageDown),
    (EventKind::A,          Key::A),
    (EventKind::C,          Key::C),
    (EventKind::V,          Key::V),
    (EventKind::X,          Key::X),
    (EventKind::Y,          Key::Y),
    (EventKind::Z,          Key::Z),
    (EventKind::LeftCtrl,   Key::LeftCtrl),
    (EventKind::RightCtrl,  Key::RightCtrl),
    (EventKind::LeftAlt,    Key::LeftAlt),
    (EventKind::RightAlt,   Key::RightAlt),
    (EventKind::LeftShift,  Key::LeftShift),
    (EventKind::RightShift, Key::RightShift),
    (EventKind::OsKey,      Key::OsKey),
];

pub fn key_for(kind: EventKind) -> Option<Key> {
    KEY_TABLE.iter().find(|(k, _)| *k == kind).map(|&(_, key)| key)
}

/// Apply one host event to `input`. `region_height` is the height of the
/// region the event's coordinates are relative to.
pub fn translate(input: &mut InputState, event: &HostEvent, region_height: f32) {
    input.mouse_pos = Vec2::new(
        event.mouse_region_x,
        region_height - 1.0 - event.mouse_region_y,
    );

    let pressed = event.value == EventValue::Press;
    match event.kind {
        EventKind::LeftMouse   => input.set_mouse_button(MouseButton::Left, pressed),
        EventKind::RightMouse  => input.set_mouse_button(MouseButton::Right, pressed),
        EventKind::MiddleMouse => input.set_mouse_button(MouseButton::Middle, pressed),
        EventKind::WheelUpMouse   => input.add_mouse_wheel(1.0),
        EventKind::WheelDownMouse => input.add_mouse_wheel(-1.0),
        _ => {}
    }

    if let Some(key) = key_for(event.kind) {
        match event.value {
            EventValue::Press   => input.set_key(key, true),
            EventValue::Release => input.set_key(key, false),
            EventValue::Nothing => {}
        }
    }

    input.refresh_modifiers();

    if let Some(ch) = event.unicode {
        if ('\u{1}'..'\u{10000}').contains(&ch) {
            input.add_text(ch);
        }
    }
}
