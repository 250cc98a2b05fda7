//! Headless operator console for HMD lens-distortion calibration.
//!
//! Reads one command per line from `--script` or stdin. A line is either a
//! named command (`adjust-coefficient +1`, `shift-center 0 -1`, ...) or a key
//! chord prefixed with `key` (`key shift+left`, `key q`). Lines starting with
//! `#` are ignored.

use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use distortionizer_config::{AppSettings, ConfigStore};
use distortionizer_core::pattern::{test_pattern, PatternOptions};
use distortionizer_core::CoefficientOrdering;
use distortionizer_session::{
    CalibrationSession, Command, CommandOutcome, KeyChord, SessionError,
};
use log::{error, info, warn};

/// Interactive radial-distortion calibration for stereo HMDs.
#[derive(Debug, Parser)]
#[command(name = "distortionizer", version, about = "HMD lens distortion calibration console")]
struct Args {
    /// Optional JSON settings file. Flags below override its values.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Calibration document to load and save (default: HMD_Config.json).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Framebuffer width in pixels.
    #[arg(long)]
    width: Option<u32>,

    /// Framebuffer height in pixels.
    #[arg(long)]
    height: Option<u32>,

    /// Initial adjustment step size.
    #[arg(long)]
    step: Option<f64>,

    /// Coefficient magnitude ordering enforced on every update.
    #[arg(long, value_enum)]
    ordering: Option<OrderingArg>,

    /// Read commands from this file instead of stdin.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Write the corrected test pattern (JSON) here before exiting.
    #[arg(long)]
    pattern_out: Option<PathBuf>,

    /// Start from an identity calibration instead of loading the document.
    #[arg(long)]
    skip_load: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OrderingArg {
    Disabled,
    Descending,
    StrictlyDescending,
}

impl From<OrderingArg> for CoefficientOrdering {
    fn from(value: OrderingArg) -> Self {
        match value {
            OrderingArg::Disabled => CoefficientOrdering::Disabled,
            OrderingArg::Descending => CoefficientOrdering::Descending,
            OrderingArg::StrictlyDescending => CoefficientOrdering::StrictlyDescending,
        }
    }
}

fn resolve_settings(args: &Args) -> Result<AppSettings> {
    let mut settings = match &args.settings {
        Some(path) => AppSettings::load(path)
            .with_context(|| format!("reading settings {}", path.display()))?,
        None => AppSettings::default(),
    };
    if let Some(path) = &args.config {
        settings.config_path = path.clone();
    }
    if let Some(width) = args.width {
        settings.screen_width = width;
    }
    if let Some(height) = args.height {
        settings.screen_height = height;
    }
    if let Some(step) = args.step {
        settings.step = step;
    }
    if let Some(ordering) = args.ordering {
        settings.ordering = ordering.into();
    }
    Ok(settings.sanitized())
}

/// Session plus the IO it needs to carry out command outcomes.
struct Console {
    session: CalibrationSession,
    store: ConfigStore,
    pattern: PatternOptions,
    applied: usize,
}

impl Console {
    fn new(settings: &AppSettings) -> Self {
        Self {
            session: CalibrationSession::with_options(
                settings.screen(),
                settings.session_options(),
            ),
            store: ConfigStore::new(&settings.config_path),
            pattern: settings.pattern.clone(),
            applied: 0,
        }
    }

    fn load_initial(&mut self) -> Result<()> {
        self.store.load_into(&mut self.session).with_context(|| {
            format!(
                "unable to load {}; make sure the calibration file exists and try again",
                self.store.path().display()
            )
        })
    }

    /// Run commands until input ends or `quit` is read.
    fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        for (lineno, line) in input.lines().enumerate() {
            let line = line.context("reading command input")?;
            let command = match parse_line(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    warn!("line {}: {e}", lineno + 1);
                    continue;
                }
            };
            if !self.execute(command, out)? {
                break;
            }
        }
        Ok(())
    }

    /// Apply one command. Returns `false` when the console should stop.
    fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> Result<bool> {
        self.applied += 1;
        match self.session.apply(command) {
            Ok(CommandOutcome::Redraw) => {
                if self.session.overlay_visible() {
                    writeln!(out, "{}", self.session.status_line())?;
                }
            }
            Ok(CommandOutcome::Save) => match self.store.save_from(&self.session) {
                Ok(()) => self.session.log_success("save"),
                Err(e) => {
                    error!("save failed: {e}");
                    self.session.log_failure("save", e.to_string());
                }
            },
            Ok(CommandOutcome::Load) => match self.store.load_into(&mut self.session) {
                Ok(()) => self.session.log_success("load"),
                Err(e) => {
                    error!("load failed: {e}");
                    self.session.log_failure("load", e.to_string());
                }
            },
            Ok(CommandOutcome::Quit) => return Ok(false),
            Err(e @ SessionError::CoefficientOrderingViolation { .. }) => {
                // Terminal bell.
                write!(out, "\x07")?;
                warn!("{e}");
            }
            Err(e) => warn!("{e}"),
        }
        Ok(true)
    }

    fn write_pattern(&self, path: &Path) -> Result<()> {
        let pattern = test_pattern(&self.session.model(), &self.session.cops(), &self.pattern);
        let json = serde_json::to_string_pretty(&pattern)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        info!(
            "test pattern written to {} ({} vertices)",
            path.display(),
            pattern.vertex_count()
        );
        Ok(())
    }
}

/// Parse one console line. Blank lines and comments yield `None`.
fn parse_line(line: &str) -> Result<Option<Command>, SessionError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    if let Some(text) = line.strip_prefix("key ") {
        let chord: KeyChord = text.parse()?;
        return match chord.command() {
            Some(command) => Ok(Some(command)),
            None => Err(SessionError::InvalidCommand(format!(
                "key `{}` is not bound",
                text.trim()
            ))),
        };
    }
    line.parse().map(Some)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let settings = resolve_settings(&args)?;
    let mut console = Console::new(&settings);

    if !args.skip_load {
        console.load_initial()?;
    }

    let mut stdout = io::stdout().lock();
    match &args.script {
        Some(path) => {
            let file = fs::File::open(path)
                .with_context(|| format!("opening script {}", path.display()))?;
            console.run(BufReader::new(file), &mut stdout)?;
        }
        None => console.run(io::stdin().lock(), &mut stdout)?,
    }

    if let Some(path) = &args.pattern_out {
        console.write_pattern(path)?;
    }
    info!("{} command(s) applied", console.applied);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use distortionizer_core::{Channel, Eye, ScreenSize, Term};
    use serde_json::Value;
    use std::io::Cursor;
    use tempfile::{tempdir, NamedTempFile};

    fn settings_for(path: &Path) -> AppSettings {
        AppSettings {
            config_path: path.to_path_buf(),
            ..AppSettings::default()
        }
    }

    fn run_script(console: &mut Console, script: &str) -> String {
        let mut out = Vec::new();
        console.run(Cursor::new(script), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn parses_named_commands_and_key_chords() {
        assert_eq!(parse_line("  # comment").unwrap(), None);
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("save").unwrap(), Some(Command::Save));
        assert_eq!(
            parse_line("key shift+left").unwrap(),
            Some(Command::ShiftCenter {
                vertical: 0,
                horizontal: -1
            })
        );
        assert!(parse_line("key p").is_err());
        assert!(parse_line("fly").is_err());
    }

    #[test]
    fn flags_override_settings() {
        let args = Args::parse_from([
            "distortionizer",
            "--width",
            "1920",
            "--step",
            "0.01",
            "--ordering",
            "strictly-descending",
            "--config",
            "custom.json",
        ]);
        let settings = resolve_settings(&args).unwrap();
        assert_eq!(settings.screen(), ScreenSize::new(1920, 1200));
        assert_eq!(settings.step, 0.01);
        assert_eq!(settings.ordering, CoefficientOrdering::StrictlyDescending);
        assert_eq!(settings.config_path, PathBuf::from("custom.json"));
    }

    #[test]
    fn non_finite_step_flag_uses_default() {
        let args = Args::parse_from(["distortionizer", "--step", "NaN"]);
        let settings = resolve_settings(&args).unwrap();
        assert_eq!(settings.step, 1e-3);

        let file = NamedTempFile::new().unwrap();
        let mut console = Console::new(&AppSettings {
            config_path: file.path().to_path_buf(),
            ..settings
        });
        run_script(&mut console, "adjust-coefficient +1\nsave\n");
        let mut reloaded = CalibrationSession::new(ScreenSize::default());
        ConfigStore::new(file.path()).load_into(&mut reloaded).unwrap();
        assert_eq!(
            reloaded.coefficients().value(Eye::Right, Channel::Red, Term::Third),
            1e-3
        );
    }

    #[test]
    fn status_line_follows_overlay_toggle() {
        let file = NamedTempFile::new().unwrap();
        let mut console = Console::new(&settings_for(file.path()));
        assert_eq!(run_script(&mut console, "shift-step -1\n"), "");
        let output = run_script(&mut console, "key space\nshift-step +1\n");
        assert_eq!(output.lines().count(), 2);
        assert!(output.lines().all(|line| line.contains("mode=none")));
        assert_eq!(console.applied, 3);
    }

    #[test]
    fn missing_document_aborts_initial_load() {
        let dir = tempdir().unwrap();
        let mut console = Console::new(&settings_for(&dir.path().join("HMD_Config.json")));
        let err = console.load_initial().unwrap_err();
        assert!(err.to_string().contains("HMD_Config.json"));
    }

    #[test]
    fn script_session_saves_and_reloads() {
        let file = NamedTempFile::new().unwrap();
        let mut console = Console::new(&settings_for(file.path()));

        let output = run_script(
            &mut console,
            "key space\ntoggle-eye right\nkey w\nkey e\nkey 2\nkey 3\nkey up\nkey up\nsave\nkey h\nload\nquit\nkey up\n",
        );
        assert!(output.contains("mode=none"));

        let k = console
            .session
            .coefficients()
            .value(Eye::Left, Channel::Green, Term::First);
        assert!((k - 2e-3).abs() < 1e-15);

        let saved: Value = serde_json::from_str(&fs::read_to_string(file.path()).unwrap()).unwrap();
        assert_eq!(saved["tracking_to_eye_transform"][0]["distortion"]["coeffs"][0], k);
        assert_eq!(saved["tracking_to_eye_transform"][1]["distortion"]["coeffs"][0], 0.0);
    }

    #[test]
    fn ordering_violation_rings_bell_and_continues() {
        let file = NamedTempFile::new().unwrap();
        let settings = AppSettings {
            ordering: CoefficientOrdering::Descending,
            ..settings_for(file.path())
        };
        let mut console = Console::new(&settings);
        let output = run_script(&mut console, "key 1\nkey up\ntoggle-overlay\nkey 2\n");

        assert!(output.contains('\x07'));
        assert!(console.session.coefficients().iter().all(|(_, _, k)| k.is_zero()));
        assert!(!console.session.selection().terms.contains(Term::Second));
    }

    #[test]
    fn writes_test_pattern() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("pattern.json");
        let settings = AppSettings {
            screen_width: 400,
            screen_height: 200,
            ..settings_for(&dir.path().join("HMD_Config.json"))
        };
        let mut console = Console::new(&settings);
        run_script(&mut console, "adjust-coefficient +1\n");
        console.write_pattern(&out).unwrap();

        let pattern: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(pattern["crosshairs"].as_array().unwrap().len(), 4);
        assert!(!pattern["polylines"].as_array().unwrap().is_empty());
    }
}
