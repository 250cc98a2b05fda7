use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a selector name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}`")]
pub struct ParseSelectorError {
    /// Selector kind that was being parsed (`eye`, `channel`, `term`).
    pub kind: &'static str,
    /// Rejected input.
    pub value: String,
}

/// A small closed set of values that index one axis of the calibration bank.
///
/// Implemented by [`Eye`], [`Channel`] and [`Term`]; selection sets in the
/// session crate are generic over this trait.
pub trait Selector: Copy + Eq + fmt::Debug + 'static {
    /// Every value, in storage order.
    const ALL: &'static [Self];

    /// Storage index of this value (`0..ALL.len()`).
    fn index(self) -> usize;
}

/// Which half of the stereo display a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Eye {
    Left,
    Right,
}

impl Eye {
    pub const BOTH: [Eye; 2] = [Eye::Left, Eye::Right];

    pub fn name(self) -> &'static str {
        match self {
            Eye::Left => "left",
            Eye::Right => "right",
        }
    }
}

impl Selector for Eye {
    const ALL: &'static [Self] = &Eye::BOTH;

    fn index(self) -> usize {
        self as usize
    }
}

/// Color plane with its own radial polynomial.
///
/// Storage order is green, blue, red, matching the `distortion`,
/// `distortion_blue` and `distortion_red` blocks of the persisted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Green,
    Blue,
    Red,
}

impl Channel {
    pub const EVERY: [Channel; 3] = [Channel::Green, Channel::Blue, Channel::Red];

    pub fn name(self) -> &'static str {
        match self {
            Channel::Green => "green",
            Channel::Blue => "blue",
            Channel::Red => "red",
        }
    }
}

impl Selector for Channel {
    const ALL: &'static [Self] = &Channel::EVERY;

    fn index(self) -> usize {
        self as usize
    }
}

/// Polynomial term of the radial correction (`k1`, `k2`, `k3`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    First,
    Second,
    Third,
}

impl Term {
    pub const EVERY: [Term; 3] = [Term::First, Term::Second, Term::Third];

    pub fn name(self) -> &'static str {
        match self {
            Term::First => "first",
            Term::Second => "second",
            Term::Third => "third",
        }
    }
}

impl Selector for Term {
    const ALL: &'static [Self] = &Term::EVERY;

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Eye {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn parse_named<T: Selector>(
    kind: &'static str,
    s: &str,
    aliases: &[(&str, T)],
) -> Result<T, ParseSelectorError> {
    let needle = s.trim().to_ascii_lowercase();
    aliases
        .iter()
        .find(|(name, _)| *name == needle)
        .map(|(_, value)| *value)
        .ok_or_else(|| ParseSelectorError {
            kind,
            value: s.to_string(),
        })
}

impl FromStr for Eye {
    type Err = ParseSelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named(
            "eye",
            s,
            &[("left", Eye::Left), ("l", Eye::Left), ("right", Eye::Right), ("r", Eye::Right)],
        )
    }
}

impl FromStr for Channel {
    type Err = ParseSelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named(
            "channel",
            s,
            &[
                ("green", Channel::Green),
                ("g", Channel::Green),
                ("blue", Channel::Blue),
                ("b", Channel::Blue),
                ("red", Channel::Red),
                ("r", Channel::Red),
            ],
        )
    }
}

impl FromStr for Term {
    type Err = ParseSelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_named(
            "term",
            s,
            &[
                ("first", Term::First),
                ("1", Term::First),
                ("k1", Term::First),
                ("second", Term::Second),
                ("2", Term::Second),
                ("k2", Term::Second),
                ("third", Term::Third),
                ("3", Term::Third),
                ("k3", Term::Third),
            ],
        )
    }
}
