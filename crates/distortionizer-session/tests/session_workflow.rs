//! End-to-end operator workflows driven through text commands and key
//! chords.

use distortionizer_core::pattern::{test_pattern, PatternOptions};
use distortionizer_core::{Channel, Eye, Pt2, ScreenSize, Term, TransformMode};
use distortionizer_session::{
    CalibrationSession, Command, CommandOutcome, KeyChord, SessionError,
};

fn run(session: &mut CalibrationSession, script: &str) -> Vec<CommandOutcome> {
    script
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|line| {
            let command: Command = line.parse().unwrap();
            session.apply(command).unwrap()
        })
        .collect()
}

fn press(session: &mut CalibrationSession, chord: &str) -> CommandOutcome {
    let chord: KeyChord = chord.parse().unwrap();
    session.apply(chord.command().unwrap()).unwrap()
}

#[test]
fn tune_left_green_first_term() {
    let mut session = CalibrationSession::new(ScreenSize::default());
    run(
        &mut session,
        "
        toggle-eye right
        toggle-channel blue
        toggle-channel red
        toggle-term 2
        toggle-term 3
        shift-step +1
        adjust-coefficient +1
        adjust-coefficient +1
        ",
    );

    let bank = session.coefficients();
    assert!((bank.value(Eye::Left, Channel::Green, Term::First) - 0.02).abs() < 1e-15);
    let nonzero = bank
        .iter()
        .flat_map(|(_, _, k)| k.to_array())
        .filter(|v| *v != 0.0)
        .count();
    assert_eq!(nonzero, 1);
}

#[test]
fn keyboard_session_matches_named_commands() {
    let mut by_key = CalibrationSession::new(ScreenSize::default());
    let mut by_name = CalibrationSession::new(ScreenSize::default());

    for chord in ["x", "shift+up", "shift+right", "ctrl+up", "enter", "up"] {
        press(&mut by_key, chord);
    }
    run(
        &mut by_name,
        "
        toggle-eye right
        shift-center -1 0
        shift-center 0 1
        adjust-aspect 0 1
        cycle-transform-mode
        adjust-coefficient +1
        ",
    );

    assert_eq!(by_key.export_record(), by_name.export_record());
    assert_eq!(by_key.cops(), by_name.cops());
    assert_eq!(by_key.mode(), TransformMode::LinearFull);
}

#[test]
fn io_commands_are_reported_to_host() {
    let mut session = CalibrationSession::new(ScreenSize::default());
    let outcomes = run(&mut session, "save\nload\nquit");
    assert_eq!(
        outcomes,
        vec![CommandOutcome::Save, CommandOutcome::Load, CommandOutcome::Quit]
    );
    assert_eq!(press(&mut session, "esc"), CommandOutcome::Quit);
}

#[test]
fn record_roundtrip_reproduces_session() {
    let mut session = CalibrationSession::new(ScreenSize::default());
    run(
        &mut session,
        "
        shift-step +2
        adjust-coefficient +1
        toggle-term 1
        adjust-coefficient -1
        adjust-aspect reset reset
        cycle-transform-mode
        shift-center 1 -1
        ",
    );
    let saved = session.export_record();

    let mut restored = CalibrationSession::new(ScreenSize::default());
    restored.load_record(&saved).unwrap();
    assert_eq!(restored.export_record(), saved);
    assert_eq!(restored.coefficients(), session.coefficients());
    for eye in Eye::BOTH {
        assert_eq!(restored.intrinsics(eye), session.intrinsics(eye));
    }
}

#[test]
fn rejected_update_keeps_bank() {
    let mut session = CalibrationSession::new(ScreenSize::default());
    session.set_ordering(distortionizer_core::CoefficientOrdering::Descending);
    run(&mut session, "toggle-term 1\ntoggle-term 2");

    let before = *session.coefficients();
    let err = session
        .apply("adjust-coefficient +1".parse().unwrap())
        .unwrap_err();
    assert!(matches!(err, SessionError::CoefficientOrderingViolation { .. }));
    assert_eq!(*session.coefficients(), before);
}

#[test]
fn pattern_follows_live_centers() {
    let mut session = CalibrationSession::new(ScreenSize::new(800, 400));
    run(&mut session, "toggle-eye right\nshift-center 0 20");

    let cops = session.cops();
    assert_eq!(cops[0], Pt2::new(220.0, 200.0));

    let pattern = test_pattern(&session.model(), &cops, &PatternOptions::default());
    let left_vertical = pattern
        .crosshairs
        .iter()
        .find(|s| s.eye == Eye::Left && s.start.x == s.end.x)
        .unwrap();
    assert_eq!(left_vertical.start.x, 220.0);
    assert!(pattern
        .polylines
        .iter()
        .filter(|p| p.eye == Eye::Left)
        .flat_map(|p| p.points.iter())
        .all(|p| p.x >= 0.0 && p.x <= 400.0));
}
