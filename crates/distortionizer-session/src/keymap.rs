//! Default keyboard bindings.

use std::str::FromStr;

use distortionizer_core::{Channel, Eye, Term};

use crate::{AxisAdjust, Command, Direction, SessionError};

/// Keys the calibration console reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Return,
    Space,
    Left,
    Right,
    Up,
    Down,
    /// Printable key, compared case-insensitively.
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        control: false,
    };
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        control: false,
    };
    pub const CONTROL: Modifiers = Modifiers {
        shift: false,
        control: true,
    };
}

/// Map a key press to its command. Shift wins over Control on arrows.
///
/// Returns `None` for unbound keys.
pub fn command_for_key(key: Key, modifiers: Modifiers) -> Option<Command> {
    let arrow = |shift_v: i32, shift_h: i32, aspect_w: i32, aspect_h: i32, plain: Command| {
        if modifiers.shift {
            Command::ShiftCenter {
                vertical: shift_v,
                horizontal: shift_h,
            }
        } else if modifiers.control {
            Command::AdjustAspect {
                width: AxisAdjust::from(aspect_w),
                height: AxisAdjust::from(aspect_h),
            }
        } else {
            plain
        }
    };

    let command = match key {
        Key::Escape => Command::Quit,
        Key::Enter | Key::Return => Command::CycleTransformMode,
        Key::Space => Command::ToggleOverlay,
        Key::Left => arrow(0, -1, -1, 0, Command::ShiftStep(-1)),
        Key::Right => arrow(0, 1, 1, 0, Command::ShiftStep(1)),
        Key::Down => arrow(1, 0, 0, -1, Command::AdjustCoefficient(Direction::Decrease)),
        Key::Up => arrow(-1, 0, 0, 1, Command::AdjustCoefficient(Direction::Increase)),
        Key::Char(c) => match c.to_ascii_lowercase() {
            's' => Command::Save,
            'l' => Command::Load,
            '1' => Command::ToggleTerm(Term::First),
            '2' => Command::ToggleTerm(Term::Second),
            '3' => Command::ToggleTerm(Term::Third),
            'q' => Command::ToggleChannel(Channel::Green),
            'w' => Command::ToggleChannel(Channel::Blue),
            'e' => Command::ToggleChannel(Channel::Red),
            'z' => Command::ToggleEye(Eye::Left),
            'x' => Command::ToggleEye(Eye::Right),
            'i' => Command::ApplyCenterToIntrinsics,
            'g' => Command::ResetCenter,
            'h' => Command::AdjustCoefficient(Direction::Reset),
            'j' => Command::AdjustAspect {
                width: AxisAdjust::Reset,
                height: AxisAdjust::Reset,
            },
            _ => return None,
        },
    };
    Some(command)
}

/// A key with its modifiers, parsed from text such as `shift+left`,
/// `ctrl+up` or `q`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyChord {
    pub fn command(&self) -> Option<Command> {
        command_for_key(self.key, self.modifiers)
    }
}

impl FromStr for KeyChord {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut modifiers = Modifiers::NONE;
        let mut key = None;
        for part in s.trim().split('+') {
            match part.to_ascii_lowercase().as_str() {
                "shift" => modifiers.shift = true,
                "ctrl" | "control" => modifiers.control = true,
                "esc" | "escape" => key = Some(Key::Escape),
                "enter" => key = Some(Key::Enter),
                "return" => key = Some(Key::Return),
                "space" => key = Some(Key::Space),
                "left" => key = Some(Key::Left),
                "right" => key = Some(Key::Right),
                "up" => key = Some(Key::Up),
                "down" => key = Some(Key::Down),
                other => {
                    let mut chars = other.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => key = Some(Key::Char(c)),
                        _ => {
                            return Err(SessionError::InvalidCommand(format!(
                                "unknown key `{part}`"
                            )))
                        }
                    }
                }
            }
        }
        let key = key.ok_or_else(|| SessionError::InvalidCommand(format!("no key in `{s}`")))?;
        Ok(KeyChord { key, modifiers })
    }
}
