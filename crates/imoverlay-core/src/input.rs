//! Keyboard and mouse input state, as seen by the GUI library.

use crate::Vec2;

/// Number of key slots. Matches the legacy ImGui `KeysDown` array.
pub const KEY_SLOTS: usize = 512;

/// Length of [`Key::NAVIGATION`].
pub const NAVIGATION_KEYS: usize = 20;

// ─── MouseButton ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton { Left = 0, Right = 1, Middle = 2 }

// ─── Key ─────────────────────────────────────────────────────────────────────

/// The GUI library's virtual keys. The discriminant is the key's slot in
/// [`InputState::keys_down`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Key {
    Tab = 0,
    LeftArrow, RightArrow, UpArrow, DownArrow,
    PageUp, PageDown, Home, End, Insert, Delete,
    Backspace, Enter, Escape,
    A, C, V, X, Y, Z, // select-all/copy/paste/cut/redo/undo shortcuts
    // Modifiers have no virtual key; they live above the printable range.
    LeftCtrl = 128 + 1,
    RightCtrl,
    LeftAlt,
    RightAlt,
    LeftShift,
    RightShift,
    OsKey,
}

impl Key {
    /// Keys the GUI library reads through its key map.
    pub const NAVIGATION: [Key; NAVIGATION_KEYS] = [
        Key::Tab, Key::LeftArrow, Key::RightArrow, Key::UpArrow, Key::DownArrow,
        Key::PageUp, Key::PageDown, Key::Home, Key::End, Key::Insert, Key::Delete,
        Key::Backspace, Key::Enter, Key::Escape,
        Key::A, Key::C, Key::V, Key::X, Key::Y, Key::Z,
    ];

    #[inline] pub fn slot(self) -> usize { self as usize }
}

// ─── Modifiers ───────────────────────────────────────────────────────────────

bitflags::bitflags! {
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Modifiers: u8 {
        const CTRL  = 1 << 0;
        const SHIFT = 1 << 1;
        const ALT   = 1 << 2;
        const SUPER = 1 << 3;
    }
}

// ─── InputState ──────────────────────────────────────────────────────────────

/// Mutable view of the input devices, written by
/// [`translate`](crate::translate::translate) and read when a frame is built.
#[derive(Debug, Clone)]
pub struct InputState {
    // Display
    pub display_size:      Vec2,
    pub framebuffer_scale: Vec2,
    pub font_global_scale: f32,

    // Mouse
    pub mouse_pos:   Vec2,
    pub mouse_down:  [bool; 3],
    pub mouse_wheel: f32,

    // Keyboard / text
    pub keys_down:  [bool; KEY_SLOTS],
    /// Virtual key → slot in `keys_down`; `None` until the map is installed.
    pub key_map:    [Option<usize>; NAVIGATION_KEYS],
    pub modifiers:  Modifiers,
    pub text_input: Vec<char>,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            display_size:      Vec2::ZERO,
            framebuffer_scale: Vec2::ONE,
            font_global_scale: 1.0,
            mouse_pos:         Vec2::new(-f32::MAX, -f32::MAX),
            mouse_down:        [false; 3],
            mouse_wheel:       0.0,
            keys_down:         [false; KEY_SLOTS],
            key_map:           [None; NAVIGATION_KEYS],
            modifiers:         Modifiers::empty(),
            text_input:        Vec::new(),
        }
    }
}

impl InputState {
    /// Map every navigation key to the slot of the same number. Host key
    /// codes are opaque integers that only have to agree on both sides.
    pub fn install_identity_key_map(&mut self) {
        for (entry, key) in self.key_map.iter_mut().zip(Key::NAVIGATION) {
            *entry = Some(key.slot());
        }
    }

    /// Slot the GUI library reads for `key`, if the map is installed.
    pub fn mapped_slot(&self, key: Key) -> Option<usize> {
        let i = Key::NAVIGATION.iter().position(|&k| k == key)?;
        self.key_map[i]
    }

    /// Roll per-frame accumulators once a frame has consumed them.
    pub fn new_frame(&mut self) {
        self.mouse_wheel = 0.0;
    }

    /// Take the queued text codepoints in arrival order.
    pub fn drain_text(&mut self) -> std::vec::Drain<'_, char> {
        self.text_input.drain(..)
    }

    // ── builder helpers ──────────────────────────────────────────────────────

    pub fn set_mouse_button(&mut self, btn: MouseButton, down: bool) {
        self.mouse_down[btn as usize] = down;
    }

    pub fn add_mouse_wheel(&mut self, y: f32) { self.mouse_wheel += y; }

    pub fn set_key(&mut self, key: Key, down: bool) {
        self.keys_down[key.slot()] = down;
    }

    pub fn add_text(&mut self, ch: char) { self.text_input.push(ch); }

    /// Recompute modifier flags from the left/right key slots.
    pub fn refresh_modifiers(&mut self) {
        let mut m = Modifiers::empty();
        m.set(Modifiers::CTRL,  self.key_down(Key::LeftCtrl)  || self.key_down(Key::RightCtrl));
        m.set(Modifiers::ALT,   self.key_down(Key::LeftAlt)   || self.key_down(Key::RightAlt));
        m.set(Modifiers::SHIFT, self.key_down(Key::LeftShift) || self.key_down(Key::RightShift));
        m.set(Modifiers::SUPER, self.key_down(Key::OsKey));
        self.modifiers = m;
    }

    // ── query helpers ─────────────────────────────────────────────────────────

    #[inline] pub fn mouse_down(&self, btn: MouseButton) -> bool { self.mouse_down[btn as usize] }
    #[inline] pub fn key_down(&self, k: Key) -> bool { self.keys_down[k.slot()] }

    #[inline] pub fn ctrl(&self)  -> bool { self.modifiers.contains(Modifiers::CTRL)  }
    #[inline] pub fn shift(&self) -> bool { self.modifiers.contains(Modifiers::SHIFT) }
    #[inline] pub fn alt(&self)   -> bool { self.modifiers.contains(Modifiers::ALT)   }
    #[inline] pub fn super_key(&self) -> bool { self.modifiers.contains(Modifiers::SUPER) }
}
