use std::fmt;
use std::str::FromStr;

use distortionizer_core::{Channel, Eye, Term};

use crate::SessionError;

/// Sign of a coefficient adjustment.
///
/// Cells are updated as `old·|d| + step·d`, so `Reset` zeroes the selected
/// cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Decrease,
    Reset,
    Increase,
}

impl Direction {
    pub fn value(self) -> i32 {
        match self {
            Direction::Decrease => -1,
            Direction::Reset => 0,
            Direction::Increase => 1,
        }
    }
}

impl FromStr for Direction {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "-1" | "-" | "decrease" | "down" => Ok(Direction::Decrease),
            "0" | "+0" | "-0" | "reset" | "zero" => Ok(Direction::Reset),
            "1" | "+1" | "+" | "increase" | "up" => Ok(Direction::Increase),
            other => Err(SessionError::InvalidCommand(format!(
                "expected -1, 0 or +1, got `{other}`"
            ))),
        }
    }
}

/// Per-axis aspect-ratio change: a signed number of steps, or a reset to the
/// resolution-derived nominal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisAdjust {
    Step(i32),
    Reset,
}

impl AxisAdjust {
    pub const NONE: AxisAdjust = AxisAdjust::Step(0);
}

impl From<i32> for AxisAdjust {
    /// `-2` is the historical reset sentinel.
    fn from(value: i32) -> Self {
        if value == -2 {
            AxisAdjust::Reset
        } else {
            AxisAdjust::Step(value)
        }
    }
}

impl FromStr for AxisAdjust {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "reset" {
            return Ok(AxisAdjust::Reset);
        }
        s.parse::<i32>()
            .map(AxisAdjust::from)
            .map_err(|_| SessionError::InvalidCommand(format!("invalid aspect delta `{s}`")))
    }
}

impl fmt::Display for AxisAdjust {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisAdjust::Step(n) => write!(f, "{n}"),
            AxisAdjust::Reset => f.write_str("reset"),
        }
    }
}

/// Discrete operator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    ToggleEye(Eye),
    ToggleChannel(Channel),
    ToggleTerm(Term),
    CycleTransformMode,
    AdjustCoefficient(Direction),
    ShiftCenter { vertical: i32, horizontal: i32 },
    AdjustAspect { width: AxisAdjust, height: AxisAdjust },
    ShiftStep(i32),
    ApplyCenterToIntrinsics,
    ApplyIntrinsicsToCenter,
    ResetCenter,
    Save,
    Load,
    Quit,
    ToggleOverlay,
}

/// What the host must do after a command has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// State may have changed; render a new frame.
    Redraw,
    /// Write [`CalibrationSession::export_record`](crate::CalibrationSession::export_record).
    Save,
    /// Read a record and hand it to
    /// [`CalibrationSession::load_record`](crate::CalibrationSession::load_record).
    Load,
    Quit,
}

impl Command {
    /// Kebab-case command name, as accepted by [`Command::from_str`].
    pub fn name(&self) -> &'static str {
        match self {
            Command::ToggleEye(_) => "toggle-eye",
            Command::ToggleChannel(_) => "toggle-channel",
            Command::ToggleTerm(_) => "toggle-term",
            Command::CycleTransformMode => "cycle-transform-mode",
            Command::AdjustCoefficient(_) => "adjust-coefficient",
            Command::ShiftCenter { .. } => "shift-center",
            Command::AdjustAspect { .. } => "adjust-aspect",
            Command::ShiftStep(_) => "shift-step",
            Command::ApplyCenterToIntrinsics => "apply-center-to-intrinsics",
            Command::ApplyIntrinsicsToCenter => "apply-intrinsics-to-center",
            Command::ResetCenter => "reset-center",
            Command::Save => "save",
            Command::Load => "load",
            Command::Quit => "quit",
            Command::ToggleOverlay => "toggle-overlay",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())?;
        match self {
            Command::ToggleEye(eye) => write!(f, " {eye}"),
            Command::ToggleChannel(channel) => write!(f, " {channel}"),
            Command::ToggleTerm(term) => write!(f, " {term}"),
            Command::AdjustCoefficient(d) => write!(f, " {:+}", d.value()),
            Command::ShiftCenter {
                vertical,
                horizontal,
            } => write!(f, " {vertical} {horizontal}"),
            Command::AdjustAspect { width, height } => write!(f, " {width} {height}"),
            Command::ShiftStep(n) => write!(f, " {n:+}"),
            _ => Ok(()),
        }
    }
}

impl FromStr for Command {
    type Err = SessionError;

    /// Parse `name arg...`, e.g. `toggle-eye left`, `shift-center -1 0`,
    /// `adjust-aspect reset reset`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let name = parts
            .next()
            .ok_or_else(|| SessionError::InvalidCommand("empty command".into()))?
            .to_ascii_lowercase();
        let args: Vec<&str> = parts.collect();

        let expect = |n: usize| -> Result<(), SessionError> {
            if args.len() == n {
                Ok(())
            } else {
                Err(SessionError::InvalidCommand(format!(
                    "`{name}` takes {n} argument(s), got {}",
                    args.len()
                )))
            }
        };

        let command = match name.as_str() {
            "toggle-eye" => {
                expect(1)?;
                Command::ToggleEye(parse_arg(args[0])?)
            }
            "toggle-channel" => {
                expect(1)?;
                Command::ToggleChannel(parse_arg(args[0])?)
            }
            "toggle-term" => {
                expect(1)?;
                Command::ToggleTerm(parse_arg(args[0])?)
            }
            "cycle-transform-mode" | "toggle-transform-mode" => {
                expect(0)?;
                Command::CycleTransformMode
            }
            "adjust-coefficient" => {
                expect(1)?;
                Command::AdjustCoefficient(args[0].parse()?)
            }
            "shift-center" => {
                expect(2)?;
                Command::ShiftCenter {
                    vertical: parse_int(args[0])?,
                    horizontal: parse_int(args[1])?,
                }
            }
            "adjust-aspect" => {
                expect(2)?;
                Command::AdjustAspect {
                    width: args[0].parse()?,
                    height: args[1].parse()?,
                }
            }
            "shift-step" => {
                expect(1)?;
                Command::ShiftStep(parse_int(args[0])?)
            }
            "apply-center-to-intrinsics" => {
                expect(0)?;
                Command::ApplyCenterToIntrinsics
            }
            "apply-intrinsics-to-center" => {
                expect(0)?;
                Command::ApplyIntrinsicsToCenter
            }
            "reset-center" => {
                expect(0)?;
                Command::ResetCenter
            }
            "save" => {
                expect(0)?;
                Command::Save
            }
            "load" => {
                expect(0)?;
                Command::Load
            }
            "quit" | "exit" => {
                expect(0)?;
                Command::Quit
            }
            "toggle-overlay" => {
                expect(0)?;
                Command::ToggleOverlay
            }
            other => {
                return Err(SessionError::InvalidCommand(format!(
                    "unknown command `{other}`"
                )))
            }
        };
        Ok(command)
    }
}

fn parse_arg<T>(s: &str) -> Result<T, SessionError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    s.parse::<T>()
        .map_err(|e| SessionError::InvalidCommand(e.to_string()))
}

fn parse_int(s: &str) -> Result<i32, SessionError> {
    s.parse::<i32>()
        .map_err(|_| SessionError::InvalidCommand(format!("expected an integer, got `{s}`")))
}
