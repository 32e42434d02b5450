//! Symbolic key names and platform virtual-key codes
//!
//! Codes follow the Windows virtual-key numbering. Function keys are not
//! listed individually: `F<n>` maps to `VK_F1 + (n - 1)` for `n` in 1..=24.

use std::fmt;
use std::str::FromStr;

/// Virtual-key code of `F1`; `F2..F24` follow contiguously
pub const VK_F1: u16 = 0x70;
/// Index of the first function key (`F1`)
pub const FIRST_FUNCTION_KEY: u8 = 1;
/// Index of the last function key (`F24`)
pub const LAST_FUNCTION_KEY: u8 = 24;

/// A physical key identified by its virtual-key code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VirtualKey(pub u16);

const NAMED_KEYS: &[(&str, u16)] = &[
    // Editing and whitespace
    ("backspace", 0x08),
    ("tab", 0x09),
    ("enter", 0x0D),
    ("return", 0x0D),
    ("pause", 0x13),
    ("capslock", 0x14),
    ("escape", 0x1B),
    ("esc", 0x1B),
    ("space", 0x20),
    // Navigation
    ("pageup", 0x21),
    ("pagedown", 0x22),
    ("end", 0x23),
    ("home", 0x24),
    ("left", 0x25),
    ("up", 0x26),
    ("right", 0x27),
    ("down", 0x28),
    ("insert", 0x2D),
    ("delete", 0x2E),
    // Modifiers
    ("shift", 0x10),
    ("ctrl", 0x11),
    ("control", 0x11),
    ("alt", 0x12),
    ("lshift", 0xA0),
    ("rshift", 0xA1),
    ("lctrl", 0xA2),
    ("rctrl", 0xA3),
    ("lalt", 0xA4),
    ("ralt", 0xA5),
    // Numpad
    ("numpad0", 0x60),
    ("numpad1", 0x61),
    ("numpad2", 0x62),
    ("numpad3", 0x63),
    ("numpad4", 0x64),
    ("numpad5", 0x65),
    ("numpad6", 0x66),
    ("numpad7", 0x67),
    ("numpad8", 0x68),
    ("numpad9", 0x69),
    ("multiply", 0x6A),
    ("add", 0x6B),
    ("subtract", 0x6D),
    ("decimal", 0x6E),
    ("divide", 0x6F),
];

impl VirtualKey {
    /// The function key `F<index>`, if `index` is in range
    pub fn function_key(index: u8) -> Option<Self> {
        if (FIRST_FUNCTION_KEY..=LAST_FUNCTION_KEY).contains(&index) {
            Some(VirtualKey(VK_F1 + u16::from(index - FIRST_FUNCTION_KEY)))
        } else {
            None
        }
    }

    /// Parse a key name such as `"F1"`, `"a"`, `"7"` or `"PageUp"` (case-insensitive)
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();

        if let [c] = name.as_bytes() {
            return match c {
                b'a'..=b'z' => Some(VirtualKey(u16::from(c.to_ascii_uppercase()))),
                b'0'..=b'9' => Some(VirtualKey(u16::from(*c))),
                _ => None,
            };
        }

        if let Some(index) = name.strip_prefix('f').and_then(function_index) {
            return Self::function_key(index);
        }

        NAMED_KEYS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, code)| VirtualKey(*code))
    }

    /// Raw virtual-key code
    pub fn code(&self) -> u16 {
        self.0
    }

    /// Canonical display name, e.g. `F1`, `A`, `Escape`
    pub fn name(&self) -> String {
        let code = self.0;
        if (VK_F1..=VK_F1 + u16::from(LAST_FUNCTION_KEY - FIRST_FUNCTION_KEY)).contains(&code) {
            return format!("F{}", code - VK_F1 + u16::from(FIRST_FUNCTION_KEY));
        }
        if let Ok(c @ (b'A'..=b'Z' | b'0'..=b'9')) = u8::try_from(code) {
            return char::from(c).to_string();
        }
        match NAMED_KEYS.iter().find(|(_, c)| *c == code) {
            Some((name, _)) => capitalize(name),
            None => format!("VK(0x{:02X})", code),
        }
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

impl fmt::Display for VirtualKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Digits of an `F<n>` name; no sign and no leading zero
fn function_index(digits: &str) -> Option<u8> {
    let well_formed = !digits.is_empty()
        && !digits.starts_with('0')
        && digits.bytes().all(|b| b.is_ascii_digit());
    if well_formed {
        digits.parse().ok()
    } else {
        None
    }
}

impl FromStr for VirtualKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VirtualKey::parse(s).ok_or_else(|| format!("unknown key name '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_function_key_range() {
        assert_eq!(VirtualKey::function_key(1), Some(VirtualKey(0x70)));
        assert_eq!(VirtualKey::function_key(12), Some(VirtualKey(0x7B)));
        assert_eq!(VirtualKey::function_key(24), Some(VirtualKey(0x87)));
        assert_eq!(VirtualKey::function_key(0), None);
        assert_eq!(VirtualKey::function_key(25), None);
    }

    #[test]
    fn test_parse_function_keys() {
        assert_eq!(VirtualKey::parse("F1"), Some(VirtualKey(0x70)));
        assert_eq!(VirtualKey::parse("f9"), Some(VirtualKey(0x78)));
        assert_eq!(VirtualKey::parse("F24"), Some(VirtualKey(0x87)));
        assert_eq!(VirtualKey::parse("F25"), None);
        assert_eq!(VirtualKey::parse("F0"), None);
    }

    #[test]
    fn test_parse_rejects_malformed_function_keys() {
        assert_eq!(VirtualKey::parse("f+1"), None);
        assert_eq!(VirtualKey::parse("F01"), None);
        assert_eq!(VirtualKey::parse("F-1"), None);
        assert_eq!(VirtualKey::parse("F1 2"), None);
        assert_eq!(VirtualKey::parse("F10"), Some(VirtualKey(0x79)));
    }

    #[test]
    fn test_parse_letters_digits_and_names() {
        assert_eq!(VirtualKey::parse("a"), Some(VirtualKey(0x41)));
        assert_eq!(VirtualKey::parse("Z"), Some(VirtualKey(0x5A)));
        assert_eq!(VirtualKey::parse("7"), Some(VirtualKey(0x37)));
        // a lone "f" is a letter, not a function key
        assert_eq!(VirtualKey::parse("f"), Some(VirtualKey(0x46)));
        assert_eq!(VirtualKey::parse("Escape"), Some(VirtualKey(0x1B)));
        assert_eq!(VirtualKey::parse(" PageUp "), Some(VirtualKey(0x21)));
        assert_eq!(VirtualKey::parse("numpad5"), Some(VirtualKey(0x65)));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(VirtualKey::parse(""), None);
        assert_eq!(VirtualKey::parse("hyper"), None);
        assert_eq!(VirtualKey::parse("?"), None);
        assert!("nope".parse::<VirtualKey>().is_err());
    }

    #[test]
    fn test_names() {
        assert_eq!(VirtualKey(0x70).name(), "F1");
        assert_eq!(VirtualKey(0x87).name(), "F24");
        assert_eq!(VirtualKey(0x41).to_string(), "A");
        assert_eq!(VirtualKey(0x35).to_string(), "5");
        assert_eq!(VirtualKey(0x21).to_string(), "Pageup");
        assert_eq!(VirtualKey(0xFF).to_string(), "VK(0xFF)");
    }
}
