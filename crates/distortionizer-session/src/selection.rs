use std::fmt;
use std::marker::PhantomData;

use distortionizer_core::{Channel, Eye, Selector, Term, TransformMode};

/// Set of selector values (eyes, channels or terms), stored as a bit mask
/// indexed by [`Selector::index`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectorSet<T: Selector> {
    bits: u8,
    _marker: PhantomData<T>,
}

impl<T: Selector> SelectorSet<T> {
    /// Every value selected.
    pub fn all() -> Self {
        Self::from_bits((1u8 << T::ALL.len()) - 1)
    }

    pub fn empty() -> Self {
        Self::from_bits(0)
    }

    /// Exactly one value selected.
    pub fn only(value: T) -> Self {
        let mut set = Self::empty();
        set.insert(value);
        set
    }

    fn from_bits(bits: u8) -> Self {
        Self {
            bits,
            _marker: PhantomData,
        }
    }

    pub fn contains(&self, value: T) -> bool {
        self.bits & (1 << value.index()) != 0
    }

    pub fn insert(&mut self, value: T) {
        self.bits |= 1 << value.index();
    }

    pub fn remove(&mut self, value: T) {
        self.bits &= !(1 << value.index());
    }

    /// Flip membership of `value`; returns whether it is selected afterwards.
    pub fn toggle(&mut self, value: T) -> bool {
        self.bits ^= 1 << value.index();
        self.contains(value)
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn is_all(&self) -> bool {
        *self == Self::all()
    }

    /// Selected values in storage order.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        T::ALL.iter().copied().filter(move |v| self.contains(*v))
    }
}

impl<T: Selector> Default for SelectorSet<T> {
    fn default() -> Self {
        Self::all()
    }
}

impl<T: Selector + fmt::Display> fmt::Debug for SelectorSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: Selector + fmt::Display> fmt::Display for SelectorSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        for (i, value) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{value}")?;
        }
        Ok(())
    }
}

/// Which parameters the next adjustment command targets.
///
/// Eyes, channels and terms toggle independently; the transform mode is a
/// separate enum, so no combination of toggles can alias another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub eyes: SelectorSet<Eye>,
    pub channels: SelectorSet<Channel>,
    pub terms: SelectorSet<Term>,
    pub mode: TransformMode,
}

impl Selection {
    /// Whether the (eye, channel, term) cell is targeted by coefficient
    /// commands.
    pub fn targets(&self, eye: Eye, channel: Channel, term: Term) -> bool {
        self.eyes.contains(eye) && self.channels.contains(channel) && self.terms.contains(term)
    }

    /// Every targeted (eye, channel, term) cell in storage order.
    pub fn cells(&self) -> impl Iterator<Item = (Eye, Channel, Term)> + '_ {
        self.eyes.iter().flat_map(move |eye| {
            self.channels
                .iter()
                .flat_map(move |channel| self.terms.iter().map(move |term| (eye, channel, term)))
        })
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "eyes={} channels={} terms={} mode={}",
            self.eyes, self.channels, self.terms, self.mode
        )
    }
}
