use distortionizer_core::{Eye, EyeIntrinsics, Pt2, ScreenSize, TransformMode};

/// Which representation of the center of projection is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CenterSource {
    /// Operator-positioned pixel coordinates.
    #[default]
    Manual,
    /// Derived from the intrinsics center offsets.
    Derived,
}

impl CenterSource {
    pub fn for_mode(mode: TransformMode) -> Self {
        if mode.uses_derived_center() {
            CenterSource::Derived
        } else {
            CenterSource::Manual
        }
    }
}

/// Per-eye center of projection with both representations kept side by
/// side.
///
/// Switching `source` never rewrites either point, so leaving a derived mode
/// brings back the manual center exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterOfProjection {
    source: CenterSource,
    manual: Pt2,
    derived: Pt2,
}

impl CenterOfProjection {
    /// Both representations at the eye's geometric default.
    pub fn at_default(eye: Eye, screen: &ScreenSize) -> Self {
        let p = screen.default_center(eye);
        Self {
            source: CenterSource::Manual,
            manual: p,
            derived: p,
        }
    }

    /// The center the distortion model should use.
    pub fn live(&self) -> Pt2 {
        match self.source {
            CenterSource::Manual => self.manual,
            CenterSource::Derived => self.derived,
        }
    }

    pub fn source(&self) -> CenterSource {
        self.source
    }

    pub fn manual(&self) -> Pt2 {
        self.manual
    }

    pub fn derived(&self) -> Pt2 {
        self.derived
    }

    pub fn set_source(&mut self, source: CenterSource) {
        self.source = source;
    }

    pub fn set_manual(&mut self, p: Pt2) {
        self.manual = p;
    }

    /// Move the manual center by a pixel offset.
    pub fn nudge_manual(&mut self, dx: f64, dy: f64) {
        self.manual.x += dx;
        self.manual.y += dy;
    }

    /// Recompute the derived center from `intrinsics`.
    pub fn refresh_derived(&mut self, eye: Eye, intrinsics: &EyeIntrinsics, screen: &ScreenSize) {
        self.derived = intrinsics.derived_center(eye, screen);
    }
}
