//! Calibration session container with mutable state.
//!
//! The session owns every parameter the operator tunes and exposes one
//! method per command. Each method runs to completion and leaves the session
//! consistent; hosts take a [`DistortionModel`] snapshot afterwards and
//! render with it.

use distortionizer_core::{
    Channel, CoefficientBank, CoefficientOrdering, DistortionModel, Eye, EyeIntrinsics, Pt2,
    RadialCoefficients, Real, ScreenSize, Selector, Term, TransformMode,
};
use log::{debug, info, warn};
use std::collections::VecDeque;

use super::types::LogEntry;
use crate::{
    AxisAdjust, CalibrationRecord, CenterOfProjection, CenterSource, Command, CommandOutcome,
    Direction, EyeRecord, Selection, SessionError,
};

/// Smallest step size reachable through [`CalibrationSession::shift_step_size`].
pub const MIN_STEP: Real = 1e-10;
/// Largest step size reachable through [`CalibrationSession::shift_step_size`].
pub const MAX_STEP: Real = 1.0;
/// Entries kept in [`CalibrationSession::log`]; older ones are dropped.
pub const MAX_LOG_ENTRIES: usize = 1024;

/// Construction options for [`CalibrationSession`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionOptions {
    /// Initial step size, clamped to `[MIN_STEP, MAX_STEP]`. Non-finite or
    /// non-positive values fall back to the default.
    pub initial_step: Real,
    /// Magnitude ordering enforced on every coefficient update.
    pub ordering: CoefficientOrdering,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            initial_step: DEFAULT_STEP,
            ordering: CoefficientOrdering::Disabled,
        }
    }
}

const DEFAULT_STEP: Real = 1e-3;

/// `step` clamped to `[MIN_STEP, MAX_STEP]`, or the default step when it is
/// not a positive finite number.
pub fn valid_step(step: Real) -> Real {
    if step.is_finite() && step > 0.0 {
        step.clamp(MIN_STEP, MAX_STEP)
    } else {
        warn!("invalid step size {step}, using {DEFAULT_STEP:e}");
        DEFAULT_STEP
    }
}

/// Mutable calibration state for both eyes.
///
/// # Centers of projection
///
/// Each eye keeps a manual center and an intrinsics-derived center side by
/// side (see [`CenterOfProjection`]). The transform mode selects which one is
/// live: `None` uses the manual center, the three linear modes use the
/// derived one. Mode changes only flip the source, so cycling through all
/// four modes restores the starting center exactly.
///
/// # Example
///
/// ```
/// use distortionizer_core::{Eye, ScreenSize};
/// use distortionizer_session::CalibrationSession;
///
/// let mut session = CalibrationSession::new(ScreenSize::new(2160, 1200));
/// assert_eq!(session.cop(Eye::Left).x, 540.0);
///
/// session.shift_step_size(1);
/// assert!((session.step() - 1e-2).abs() < 1e-15);
/// ```
#[derive(Debug, Clone)]
pub struct CalibrationSession {
    screen: ScreenSize,
    coefficients: CoefficientBank,
    intrinsics: [EyeIntrinsics; 2],
    centers: [CenterOfProjection; 2],
    selection: Selection,
    step: Real,
    ordering: CoefficientOrdering,
    overlay_visible: bool,

    /// Operation log (lightweight audit trail), newest last. Holds at most
    /// [`MAX_LOG_ENTRIES`].
    pub log: VecDeque<LogEntry>,
}

impl CalibrationSession {
    // ─────────────────────────────────────────────────────────────────────────
    // Construction
    // ─────────────────────────────────────────────────────────────────────────

    /// Fresh session: zero coefficients, identity intrinsics, default
    /// centers, everything selected, mode `None`, step `1e-3`, overlay
    /// hidden.
    pub fn new(screen: ScreenSize) -> Self {
        Self::with_options(screen, SessionOptions::default())
    }

    pub fn with_options(screen: ScreenSize, options: SessionOptions) -> Self {
        Self {
            screen,
            coefficients: CoefficientBank::zeros(),
            intrinsics: [EyeIntrinsics::identity(); 2],
            centers: [
                CenterOfProjection::at_default(Eye::Left, &screen),
                CenterOfProjection::at_default(Eye::Right, &screen),
            ],
            selection: Selection::default(),
            step: valid_step(options.initial_step),
            ordering: options.ordering,
            overlay_visible: false,
            log: VecDeque::new(),
        }
    }

    /// Adopt new framebuffer dimensions.
    ///
    /// Manual centers still sitting on the old default move to the new
    /// default; moved centers are kept. Derived centers are recomputed.
    pub fn resize(&mut self, screen: ScreenSize) {
        if screen == self.screen {
            return;
        }
        for eye in Eye::BOTH {
            let center = &mut self.centers[eye.index()];
            if center.manual() == self.screen.default_center(eye) {
                center.set_manual(screen.default_center(eye));
            }
        }
        debug!(
            "resize {}x{} -> {}x{}",
            self.screen.width, self.screen.height, screen.width, screen.height
        );
        self.screen = screen;
        self.sync_centers();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn screen(&self) -> ScreenSize {
        self.screen
    }

    pub fn coefficients(&self) -> &CoefficientBank {
        &self.coefficients
    }

    pub fn intrinsics(&self, eye: Eye) -> &EyeIntrinsics {
        &self.intrinsics[eye.index()]
    }

    pub fn center(&self, eye: Eye) -> &CenterOfProjection {
        &self.centers[eye.index()]
    }

    /// Live center of projection of `eye`.
    pub fn cop(&self, eye: Eye) -> Pt2 {
        self.center(eye).live()
    }

    /// Live centers of projection, left then right.
    pub fn cops(&self) -> [Pt2; 2] {
        [self.cop(Eye::Left), self.cop(Eye::Right)]
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn mode(&self) -> TransformMode {
        self.selection.mode
    }

    pub fn step(&self) -> Real {
        self.step
    }

    pub fn ordering(&self) -> CoefficientOrdering {
        self.ordering
    }

    pub fn set_ordering(&mut self, ordering: CoefficientOrdering) {
        self.ordering = ordering;
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    /// Snapshot of everything [`DistortionModel::transform`] reads.
    pub fn model(&self) -> DistortionModel {
        DistortionModel {
            screen: self.screen,
            mode: self.selection.mode,
            coefficients: self.coefficients,
            intrinsics: self.intrinsics,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Selection
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns whether `eye` is selected afterwards.
    pub fn toggle_eye(&mut self, eye: Eye) -> bool {
        self.selection.eyes.toggle(eye)
    }

    pub fn toggle_channel(&mut self, channel: Channel) -> bool {
        self.selection.channels.toggle(channel)
    }

    pub fn toggle_term(&mut self, term: Term) -> bool {
        self.selection.terms.toggle(term)
    }

    /// Advance `None → LinearFull → CenterOnly → AspectOnly → None` and
    /// switch both eyes to the matching center source.
    pub fn cycle_transform_mode(&mut self) -> TransformMode {
        let from = self.selection.mode;
        self.selection.mode = from.next();
        self.sync_centers();
        debug!("transform mode {from} -> {}", self.selection.mode);
        self.selection.mode
    }

    pub fn toggle_overlay(&mut self) -> bool {
        self.overlay_visible = !self.overlay_visible;
        self.overlay_visible
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Coefficients and step size
    // ─────────────────────────────────────────────────────────────────────────

    /// Update every selected (eye, channel, term) cell to
    /// `old·|d| + step·d`.
    ///
    /// `Direction::Reset` zeroes exactly the selected cells. The update is
    /// staged on a copy of the bank and committed only if the whole bank
    /// satisfies the configured ordering.
    ///
    /// # Errors
    ///
    /// [`SessionError::CoefficientOrderingViolation`] for the first offending
    /// (eye, channel) slot; the bank is left unchanged.
    pub fn adjust_coefficient(&mut self, direction: Direction) -> Result<(), SessionError> {
        let d = Real::from(direction.value());
        let mut staged = self.coefficients;
        for (eye, channel, term) in self.selection.cells() {
            let old = staged.value(eye, channel, term);
            staged.set_value(eye, channel, term, old * d.abs() + self.step * d);
        }

        if let Some((eye, channel, coefficients)) = staged.first_ordering_violation(self.ordering)
        {
            warn!(
                "rejected coefficient update: {eye}/{channel} k = {:?}",
                coefficients.to_array()
            );
            return Err(SessionError::CoefficientOrderingViolation {
                eye,
                channel,
                coefficients,
            });
        }

        self.coefficients = staged;
        debug!(
            "adjusted {} coefficient(s) by {:+}·{:e}",
            self.selection.cells().count(),
            direction.value(),
            self.step
        );
        Ok(())
    }

    /// Multiply the step size by `10^direction`, clamped to
    /// `[MIN_STEP, MAX_STEP]`. Returns the new step.
    pub fn shift_step_size(&mut self, direction: i32) -> Real {
        self.step = (self.step * 10f64.powi(direction)).clamp(MIN_STEP, MAX_STEP);
        debug!("step size {:e}", self.step);
        self.step
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Centers and intrinsics
    // ─────────────────────────────────────────────────────────────────────────

    /// Move the center of projection of the selected eye(s).
    ///
    /// In `LinearFull` / `CenterOnly` the intrinsics center offsets move by
    /// `step·delta` (vertical offset decreases with `vertical`; horizontal
    /// offset mirrors between eyes) and the derived centers follow.
    ///
    /// Otherwise the manual centers move by whole pixels. With both eyes
    /// selected a horizontal shift moves them in opposite directions around
    /// the screen midline; vertical shifts move each eye the same way.
    pub fn shift_center(&mut self, vertical: i32, horizontal: i32) {
        let (v, h) = (Real::from(vertical), Real::from(horizontal));

        if self.selection.mode.edits_intrinsics_center() {
            for eye in self.selection.eyes.iter() {
                let mirror = match eye {
                    Eye::Left => -1.0,
                    Eye::Right => 1.0,
                };
                let k = &mut self.intrinsics[eye.index()];
                k.set_center_x(k.center_x() + self.step * mirror * h);
                k.set_center_y(k.center_y() + self.step * -v);
            }
            self.sync_centers();
        } else {
            let eyes = self.selection.eyes;
            if horizontal != 0 {
                if eyes.is_all() {
                    self.centers[Eye::Left.index()].nudge_manual(-h, 0.0);
                    self.centers[Eye::Right.index()].nudge_manual(h, 0.0);
                } else {
                    for eye in eyes.iter() {
                        self.centers[eye.index()].nudge_manual(h, 0.0);
                    }
                }
            }
            if vertical != 0 {
                for eye in eyes.iter() {
                    self.centers[eye.index()].nudge_manual(0.0, -v);
                }
            }
        }
        debug!(
            "center shift v={vertical} h={horizontal}: left {:?} right {:?}",
            self.cop(Eye::Left),
            self.cop(Eye::Right)
        );
    }

    /// Change the intrinsics scale terms of the selected eye(s) by
    /// `step·delta`, or reset an axis to the nominal value for the current
    /// screen (`height/1000` horizontally, `width/2000` vertically).
    pub fn adjust_aspect_ratio(&mut self, width: AxisAdjust, height: AxisAdjust) {
        let (nominal_x, nominal_y) = self.screen.nominal_aspect();
        for eye in self.selection.eyes.iter() {
            let k = &mut self.intrinsics[eye.index()];
            match width {
                AxisAdjust::Reset => k.set_scale_x(nominal_x),
                AxisAdjust::Step(n) => k.set_scale_x(k.scale_x() + Real::from(n) * self.step),
            }
            match height {
                AxisAdjust::Reset => k.set_scale_y(nominal_y),
                AxisAdjust::Step(n) => k.set_scale_y(k.scale_y() + Real::from(n) * self.step),
            }
            debug!("{eye} aspect ({}, {})", k.scale_x(), k.scale_y());
        }
    }

    /// Store the live centers as intrinsics center offsets for both eyes and
    /// make them the manual centers too.
    pub fn apply_center_to_intrinsics(&mut self) {
        for eye in Eye::BOTH {
            let live = self.cop(eye);
            self.intrinsics[eye.index()].set_center_from(eye, &self.screen, &live);
            self.centers[eye.index()].set_manual(live);
        }
        self.sync_centers();
        debug!(
            "centers -> intrinsics: left ({}, {}) right ({}, {})",
            self.intrinsics[0].center_x(),
            self.intrinsics[0].center_y(),
            self.intrinsics[1].center_x(),
            self.intrinsics[1].center_y()
        );
    }

    /// Overwrite both manual centers with the intrinsics-derived centers.
    pub fn apply_intrinsics_to_center(&mut self) {
        self.sync_centers();
        for center in &mut self.centers {
            center.set_manual(center.derived());
        }
        debug!(
            "intrinsics -> centers: left {:?} right {:?}",
            self.centers[0].manual(),
            self.centers[1].manual()
        );
    }

    /// Put the manual center of the selected eye(s) back on the geometric
    /// default.
    pub fn reset_center(&mut self) {
        for eye in self.selection.eyes.iter() {
            self.centers[eye.index()].set_manual(self.screen.default_center(eye));
        }
    }

    fn sync_centers(&mut self) {
        let source = CenterSource::for_mode(self.selection.mode);
        for eye in Eye::BOTH {
            let center = &mut self.centers[eye.index()];
            center.refresh_derived(eye, &self.intrinsics[eye.index()], &self.screen);
            center.set_source(source);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace coefficients and intrinsics with `record`, then derive the
    /// centers from the intrinsics.
    ///
    /// # Errors
    ///
    /// [`SessionError::MalformedRecord`] if any value is not finite. Nothing
    /// is modified in that case.
    pub fn load_record(&mut self, record: &CalibrationRecord) -> Result<(), SessionError> {
        record.validate()?;

        let mut coefficients = CoefficientBank::zeros();
        for eye in Eye::BOTH {
            let rec = record.eye(eye);
            for channel in Channel::EVERY {
                coefficients.set(
                    eye,
                    channel,
                    RadialCoefficients::from_array(*rec.coefficients(channel)),
                );
            }
            self.intrinsics[eye.index()] = EyeIntrinsics::from_rows(&rec.intrinsics);
        }
        self.coefficients = coefficients;
        self.apply_intrinsics_to_center();

        info!(
            "loaded calibration: left cop {:?}, right cop {:?}",
            self.cop(Eye::Left),
            self.cop(Eye::Right)
        );
        Ok(())
    }

    /// Current parameters as a plain record.
    pub fn export_record(&self) -> CalibrationRecord {
        let mut record = CalibrationRecord::default();
        for eye in Eye::BOTH {
            let k = self.intrinsics(eye);
            let mut rec = EyeRecord {
                center: [k.center_x(), k.center_y()],
                intrinsics: k.to_rows(),
                ..EyeRecord::default()
            };
            for channel in Channel::EVERY {
                *rec.coefficients_mut(channel) = self.coefficients.get(eye, channel).to_array();
            }
            *record.eye_mut(eye) = rec;
        }
        record
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Command dispatch
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply one operator command and record it in [`Self::log`].
    ///
    /// `Save`, `Load` and `Quit` do not touch the state; the returned
    /// [`CommandOutcome`] tells the host which IO to perform.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::adjust_coefficient`] failures.
    pub fn apply(&mut self, command: Command) -> Result<CommandOutcome, SessionError> {
        let outcome = match command {
            Command::ToggleEye(eye) => {
                self.toggle_eye(eye);
                CommandOutcome::Redraw
            }
            Command::ToggleChannel(channel) => {
                self.toggle_channel(channel);
                CommandOutcome::Redraw
            }
            Command::ToggleTerm(term) => {
                self.toggle_term(term);
                CommandOutcome::Redraw
            }
            Command::CycleTransformMode => {
                self.cycle_transform_mode();
                CommandOutcome::Redraw
            }
            Command::AdjustCoefficient(direction) => {
                if let Err(e) = self.adjust_coefficient(direction) {
                    self.log_failure(command.name(), e.to_string());
                    return Err(e);
                }
                CommandOutcome::Redraw
            }
            Command::ShiftCenter {
                vertical,
                horizontal,
            } => {
                self.shift_center(vertical, horizontal);
                CommandOutcome::Redraw
            }
            Command::AdjustAspect { width, height } => {
                self.adjust_aspect_ratio(width, height);
                CommandOutcome::Redraw
            }
            Command::ShiftStep(direction) => {
                self.shift_step_size(direction);
                CommandOutcome::Redraw
            }
            Command::ApplyCenterToIntrinsics => {
                self.apply_center_to_intrinsics();
                CommandOutcome::Redraw
            }
            Command::ApplyIntrinsicsToCenter => {
                self.apply_intrinsics_to_center();
                CommandOutcome::Redraw
            }
            Command::ResetCenter => {
                self.reset_center();
                CommandOutcome::Redraw
            }
            Command::ToggleOverlay => {
                self.toggle_overlay();
                CommandOutcome::Redraw
            }
            Command::Save => CommandOutcome::Save,
            Command::Load => CommandOutcome::Load,
            Command::Quit => CommandOutcome::Quit,
        };
        self.log_success_with_notes(command.name(), command.to_string());
        Ok(outcome)
    }

    /// One-line summary of the selection, step and per-eye parameters.
    ///
    /// Hosts show it while [`Self::overlay_visible`] is set.
    pub fn status_line(&self) -> String {
        let mut line = format!("{} step={:e}", self.selection, self.step);
        for eye in Eye::BOTH {
            let cop = self.cop(eye);
            let k = self.intrinsics(eye);
            line.push_str(&format!(
                " | {eye}: cop=({:.1}, {:.1}) aspect=({:.4}, {:.4})",
                cop.x,
                cop.y,
                k.scale_x(),
                k.scale_y()
            ));
            for channel in Channel::EVERY {
                let c = self.coefficients.get(eye, channel);
                line.push_str(&format!(
                    " {channel}=[{:.4e}, {:.4e}, {:.4e}]",
                    c.k1, c.k2, c.k3
                ));
            }
        }
        line
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Logging
    // ─────────────────────────────────────────────────────────────────────────

    /// Add a success log entry.
    pub fn log_success(&mut self, operation: impl Into<String>) {
        self.push_log(LogEntry::success(operation));
    }

    /// Add a success log entry with notes.
    pub fn log_success_with_notes(
        &mut self,
        operation: impl Into<String>,
        notes: impl Into<String>,
    ) {
        self.push_log(LogEntry::success_with_notes(operation, notes));
    }

    /// Add a failure log entry.
    pub fn log_failure(&mut self, operation: impl Into<String>, error: impl Into<String>) {
        self.push_log(LogEntry::failure(operation, error));
    }

    fn push_log(&mut self, entry: LogEntry) {
        if self.log.len() == MAX_LOG_ENTRIES {
            self.log.pop_front();
        }
        self.log.push_back(entry);
    }
}
