//! Test-pattern geometry for visual calibration.
//!
//! The pattern mirrors what an operator looks at through the headset:
//! uncorrected crosshairs through each center of projection, plus a grid and
//! a set of concentric circles drawn once per color channel through the
//! [`DistortionModel`]. When the coefficients are right, the three colored
//! copies of each line overlap into a straight white line.
//!
//! Everything here is deterministic; the host only rasterizes the returned
//! vertices.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::{Channel, DistortionModel, Eye, Pt2, Real, ScreenSize, Selector};

/// Straight, uncorrected segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub eye: Eye,
    pub start: Pt2,
    pub end: Pt2,
}

/// Corrected vertex strip for one eye and one channel.
///
/// Culled vertices are already removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub eye: Eye,
    pub channel: Channel,
    pub points: Vec<Pt2>,
}

/// Narrowest grid spacing, in pixels, [`test_pattern`] will draw.
pub const MIN_GRID_SPACING: Real = 1.0;
/// Largest circle radius, as a fraction of a quarter screen width.
pub const MAX_CIRCLE_FRACTION: Real = 2.0;

/// Layout parameters for [`test_pattern`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternOptions {
    /// Distance in pixels between neighbouring grid lines.
    pub grid_spacing: Real,
    /// Circle radii as fractions of a quarter of the screen width.
    pub circle_fractions: Vec<Real>,
}

impl Default for PatternOptions {
    fn default() -> Self {
        Self {
            grid_spacing: 40.0,
            circle_fractions: vec![0.1, 0.3, 0.7],
        }
    }
}

impl PatternOptions {
    /// Copy with the layout bounded to something drawable.
    ///
    /// A non-finite spacing falls back to the default, a positive one is
    /// raised to [`MIN_GRID_SPACING`]; zero or negative keeps the grid off.
    /// Circle fractions outside `(0, MAX_CIRCLE_FRACTION]` are dropped.
    pub fn sanitized(&self) -> Self {
        let grid_spacing = if !self.grid_spacing.is_finite() {
            Self::default().grid_spacing
        } else if self.grid_spacing > 0.0 {
            self.grid_spacing.max(MIN_GRID_SPACING)
        } else {
            0.0
        };
        let circle_fractions = self
            .circle_fractions
            .iter()
            .copied()
            .filter(|f| f.is_finite() && *f > 0.0 && *f <= MAX_CIRCLE_FRACTION)
            .collect();
        Self {
            grid_spacing,
            circle_fractions,
        }
    }
}

/// Full pattern for both eyes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestPattern {
    pub crosshairs: Vec<Segment>,
    pub polylines: Vec<Polyline>,
}

impl TestPattern {
    /// Total number of corrected vertices.
    pub fn vertex_count(&self) -> usize {
        self.polylines.iter().map(|p| p.points.len()).sum()
    }
}

/// Horizontal and vertical line through each eye's center of projection,
/// clipped to that eye's half of the screen.
pub fn crosshairs(screen: &ScreenSize, cops: &[Pt2; 2]) -> Vec<Segment> {
    let mut out = Vec::with_capacity(4);
    for eye in Eye::BOTH {
        let cop = cops[eye.index()];
        let (x_min, x_max) = screen.eye_x_range(eye);
        out.push(Segment {
            eye,
            start: Pt2::new(x_min, cop.y),
            end: Pt2::new(x_max, cop.y),
        });
        out.push(Segment {
            eye,
            start: Pt2::new(cop.x, 0.0),
            end: Pt2::new(cop.x, screen.height_f()),
        });
    }
    out
}

/// Grid lines every `spacing` pixels on both sides of `cop`, restricted to
/// the eye's half of the screen. Lines through `cop` itself are left to
/// [`crosshairs`].
pub fn grid_segments(screen: &ScreenSize, eye: Eye, cop: &Pt2, spacing: Real) -> Vec<Segment> {
    let mut out = Vec::new();
    if spacing.is_nan() || spacing <= 0.0 {
        return out;
    }
    let spacing = spacing.max(MIN_GRID_SPACING);
    let (x_min, x_max) = screen.eye_x_range(eye);
    let height = screen.height_f();

    let mut r = spacing;
    while cop.x + r < x_max {
        out.push(vertical(eye, cop.x + r, height));
        r += spacing;
    }
    let mut r = spacing;
    while cop.x - r > x_min {
        out.push(vertical(eye, cop.x - r, height));
        r += spacing;
    }
    let mut r = spacing;
    while cop.y - r > 0.0 {
        out.push(horizontal(eye, cop.y - r, x_min, x_max));
        r += spacing;
    }
    let mut r = spacing;
    while cop.y + r < height {
        out.push(horizontal(eye, cop.y + r, x_min, x_max));
        r += spacing;
    }
    out
}

fn vertical(eye: Eye, x: Real, height: Real) -> Segment {
    Segment {
        eye,
        start: Pt2::new(x, 0.0),
        end: Pt2::new(x, height - 1.0),
    }
}

fn horizontal(eye: Eye, y: Real, x_min: Real, x_max: Real) -> Segment {
    Segment {
        eye,
        start: Pt2::new(x_min, y),
        end: Pt2::new(x_max, y),
    }
}

/// Sample a straight segment every pixel and correct each sample.
pub fn corrected_line(
    model: &DistortionModel,
    start: &Pt2,
    end: &Pt2,
    cop: &Pt2,
    channel: Channel,
    eye: Eye,
) -> Vec<Pt2> {
    let delta = *end - *start;
    let len = delta.norm();
    if len == 0.0 {
        return model
            .transform_visible(start, cop, channel, eye)
            .into_iter()
            .collect();
    }
    let dir = delta / len;
    let samples = len.floor() as usize + 1;
    (0..samples)
        .filter_map(|i| {
            let p = *start + dir * (i as Real);
            model.transform_visible(&p, cop, channel, eye)
        })
        .collect()
}

/// Sample a circle with angular step `1 / radius` and correct each sample.
pub fn corrected_circle(
    model: &DistortionModel,
    center: &Pt2,
    radius: Real,
    cop: &Pt2,
    channel: Channel,
    eye: Eye,
) -> Vec<Pt2> {
    if radius <= 0.0 {
        return Vec::new();
    }
    let step = 1.0 / radius;
    let samples = (2.0 * PI / step).floor() as usize + 1;
    (0..samples)
        .filter_map(|i| {
            let theta = i as Real * step;
            let p = Pt2::new(center.x + radius * theta.cos(), center.y + radius * theta.sin());
            model.transform_visible(&p, cop, channel, eye)
        })
        .collect()
}

/// Build the complete calibration pattern for both eyes.
///
/// `cops` holds the live center of projection of the left and right eye.
pub fn test_pattern(model: &DistortionModel, cops: &[Pt2; 2], options: &PatternOptions) -> TestPattern {
    let screen = model.screen;
    let options = options.sanitized();
    let mut pattern = TestPattern {
        crosshairs: crosshairs(&screen, cops),
        polylines: Vec::new(),
    };

    for eye in Eye::BOTH {
        let cop = cops[eye.index()];
        for segment in grid_segments(&screen, eye, &cop, options.grid_spacing) {
            for channel in Channel::EVERY {
                pattern.polylines.push(Polyline {
                    eye,
                    channel,
                    points: corrected_line(model, &segment.start, &segment.end, &cop, channel, eye),
                });
            }
        }
        for fraction in &options.circle_fractions {
            let radius = fraction * screen.width_f() / 4.0;
            for channel in Channel::EVERY {
                pattern.polylines.push(Polyline {
                    eye,
                    channel,
                    points: corrected_circle(model, &cop, radius, &cop, channel, eye),
                });
            }
        }
    }

    log::debug!(
        "test pattern: {} polylines, {} vertices",
        pattern.polylines.len(),
        pattern.vertex_count()
    );
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RadialCoefficients;

    fn small_screen() -> ScreenSize {
        ScreenSize::new(400, 200)
    }

    #[test]
    fn crosshairs_stay_in_eye_halves() {
        let screen = small_screen();
        let cops = [screen.default_center(Eye::Left), screen.default_center(Eye::Right)];
        let lines = crosshairs(&screen, &cops);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].start, Pt2::new(0.0, 100.0));
        assert_eq!(lines[0].end, Pt2::new(200.0, 100.0));
        assert_eq!(lines[2].start, Pt2::new(200.0, 100.0));
        assert_eq!(lines[3].start, Pt2::new(300.0, 0.0));
    }

    #[test]
    fn grid_is_symmetric_around_default_center() {
        let screen = small_screen();
        let cop = screen.default_center(Eye::Left);
        let segments = grid_segments(&screen, Eye::Left, &cop, 40.0);
        // x: 140, 180 / 60, 20 ; y: 60, 20 / 140, 180
        assert_eq!(segments.len(), 8);
        assert!(segments
            .iter()
            .all(|s| s.start.x >= 0.0 && s.end.x <= 200.0));
    }

    #[test]
    fn identity_line_keeps_every_sample() {
        let model = DistortionModel::identity(small_screen());
        let cop = Pt2::new(100.0, 100.0);
        let points = corrected_line(
            &model,
            &Pt2::new(10.0, 50.0),
            &Pt2::new(10.0, 60.0),
            &cop,
            Channel::Green,
            Eye::Left,
        );
        assert_eq!(points.len(), 11);
        assert_eq!(points[10], Pt2::new(10.0, 60.0));
    }

    #[test]
    fn culled_samples_are_dropped() {
        let model = DistortionModel::identity(small_screen());
        let cop = Pt2::new(100.0, 100.0);
        // Crosses the midline at x = 200: only x ∈ [190, 200] survives.
        let points = corrected_line(
            &model,
            &Pt2::new(190.0, 50.0),
            &Pt2::new(230.0, 50.0),
            &cop,
            Channel::Red,
            Eye::Left,
        );
        assert_eq!(points.len(), 11);
        assert!(points.iter().all(|p| p.x <= 200.0));
    }

    #[test]
    fn circle_radius_shrinks_with_positive_k1() {
        let mut model = DistortionModel::identity(small_screen());
        model
            .coefficients
            .set(Eye::Left, Channel::Blue, RadialCoefficients::new(2.0, 0.0, 0.0));
        let cop = Pt2::new(100.0, 100.0);
        let points = corrected_circle(&model, &cop, 30.0, &cop, Channel::Blue, Eye::Left);
        assert!(!points.is_empty());
        for p in &points {
            assert!((*p - cop).norm() < 30.0);
        }
    }

    #[test]
    fn full_pattern_has_three_channels_per_primitive() {
        let screen = small_screen();
        let model = DistortionModel::identity(screen);
        let cops = [screen.default_center(Eye::Left), screen.default_center(Eye::Right)];
        let pattern = test_pattern(&model, &cops, &PatternOptions::default());

        assert_eq!(pattern.crosshairs.len(), 4);
        assert_eq!(pattern.polylines.len() % 3, 0);
        assert!(pattern.vertex_count() > 0);
        let json = serde_json::to_string(&pattern).unwrap();
        assert!(json.contains("\"channel\":\"green\""));
    }

    #[test]
    fn pathological_options_are_bounded() {
        let options = PatternOptions {
            grid_spacing: 1e-6,
            circle_fractions: vec![0.5, 1e9, -0.1, Real::NAN],
        }
        .sanitized();
        assert_eq!(options.grid_spacing, MIN_GRID_SPACING);
        assert_eq!(options.circle_fractions, vec![0.5]);

        let fallback = PatternOptions {
            grid_spacing: Real::INFINITY,
            circle_fractions: Vec::new(),
        };
        assert_eq!(fallback.sanitized().grid_spacing, 40.0);

        let screen = small_screen();
        let cop = screen.default_center(Eye::Left);
        // One line per pixel at most: 199 vertical + 199 horizontal.
        let segments = grid_segments(&screen, Eye::Left, &cop, 1e-6);
        assert!(segments.len() < 400);
    }
}
