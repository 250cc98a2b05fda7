use serde::{Deserialize, Serialize};

use super::{Channel, Eye, Selector, Term};
use crate::Real;

/// Radial polynomial for one eye and one color channel.
///
/// The radial scale applied to an offset of length `r` is
/// `1 / (1 + k1·r² + k2·r⁴ + k3·r⁶)`, with each `k` first normalized by the
/// matching power of the screen width (see [`Self::normalized`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RadialCoefficients {
    pub k1: Real,
    pub k2: Real,
    pub k3: Real,
}

/// How strictly the magnitudes of `k1`, `k2`, `k3` must decrease.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoefficientOrdering {
    /// No check.
    #[default]
    Disabled,
    /// `|k1| ≥ |k2| ≥ |k3|`.
    Descending,
    /// `|k1| > |k2| > |k3|` among the leading non-zero terms; zeros may
    /// only trail, so `(k, 0, 0)` passes and `(0, k, 0)` does not.
    StrictlyDescending,
}

impl RadialCoefficients {
    pub fn new(k1: Real, k2: Real, k3: Real) -> Self {
        Self { k1, k2, k3 }
    }

    pub fn from_array(k: [Real; 3]) -> Self {
        Self::new(k[0], k[1], k[2])
    }

    pub fn to_array(&self) -> [Real; 3] {
        [self.k1, self.k2, self.k3]
    }

    pub fn get(&self, term: Term) -> Real {
        match term {
            Term::First => self.k1,
            Term::Second => self.k2,
            Term::Third => self.k3,
        }
    }

    pub fn get_mut(&mut self, term: Term) -> &mut Real {
        match term {
            Term::First => &mut self.k1,
            Term::Second => &mut self.k2,
            Term::Third => &mut self.k3,
        }
    }

    /// Resolution-independent coefficients for a screen `width` pixels wide.
    ///
    /// `k1 / width²`, `k2 / width⁴`, `k3 / width⁶`.
    pub fn normalized(&self, width: Real) -> Self {
        let w2 = width * width;
        let w4 = w2 * w2;
        Self {
            k1: self.k1 / w2,
            k2: self.k2 / w4,
            k3: self.k3 / (w4 * w2),
        }
    }

    /// Radial scale `1 / (1 + k1·r² + k2·r⁴ + k3·r⁶)` for already-normalized
    /// coefficients.
    pub fn radial_scale(&self, r: Real) -> Real {
        let r2 = r * r;
        let r4 = r2 * r2;
        let r6 = r4 * r2;
        1.0 / (1.0 + self.k1 * r2 + self.k2 * r4 + self.k3 * r6)
    }

    /// Check the magnitude ordering `|k1| ≥ |k2| ≥ |k3|` under `ordering`.
    pub fn satisfies(&self, ordering: CoefficientOrdering) -> bool {
        let (a1, a2, a3) = (self.k1.abs(), self.k2.abs(), self.k3.abs());
        match ordering {
            CoefficientOrdering::Disabled => true,
            CoefficientOrdering::Descending => a1 >= a2 && a2 >= a3,
            CoefficientOrdering::StrictlyDescending => {
                let strictly_above = |hi: Real, lo: Real| lo == 0.0 || hi > lo;
                strictly_above(a1, a2) && strictly_above(a2, a3) && (a2 != 0.0 || a3 == 0.0)
            }
        }
    }

    pub fn is_zero(&self) -> bool {
        self.k1 == 0.0 && self.k2 == 0.0 && self.k3 == 0.0
    }
}

/// Radial coefficients for every (eye, channel) pair: 2 × 3 × 3 values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CoefficientBank {
    cells: [[RadialCoefficients; 3]; 2],
}

impl CoefficientBank {
    /// Bank with every coefficient set to zero (identity correction).
    pub fn zeros() -> Self {
        Self::default()
    }

    pub fn get(&self, eye: Eye, channel: Channel) -> &RadialCoefficients {
        &self.cells[eye.index()][channel.index()]
    }

    pub fn get_mut(&mut self, eye: Eye, channel: Channel) -> &mut RadialCoefficients {
        &mut self.cells[eye.index()][channel.index()]
    }

    pub fn set(&mut self, eye: Eye, channel: Channel, coefficients: RadialCoefficients) {
        self.cells[eye.index()][channel.index()] = coefficients;
    }

    pub fn value(&self, eye: Eye, channel: Channel, term: Term) -> Real {
        self.get(eye, channel).get(term)
    }

    pub fn set_value(&mut self, eye: Eye, channel: Channel, term: Term, value: Real) {
        *self.get_mut(eye, channel).get_mut(term) = value;
    }

    /// Every (eye, channel) slot with its coefficients, in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (Eye, Channel, &RadialCoefficients)> + '_ {
        Eye::BOTH.into_iter().flat_map(move |eye| {
            Channel::EVERY
                .into_iter()
                .map(move |channel| (eye, channel, self.get(eye, channel)))
        })
    }

    /// First (eye, channel) slot violating `ordering`, if any.
    pub fn first_ordering_violation(
        &self,
        ordering: CoefficientOrdering,
    ) -> Option<(Eye, Channel, RadialCoefficients)> {
        self.iter()
            .find(|(_, _, k)| !k.satisfies(ordering))
            .map(|(eye, channel, k)| (eye, channel, *k))
    }
}
