//! Reduced-motion preference with change broadcast.
//!
//! One `MotionPreference` is owned by the host (render loop, CLI driver, WASM
//! shell) and consulted once per frame. Components that need to react to a
//! change, rather than poll, register a listener with [`MotionPreference::subscribe`].
//! Changes take effect immediately; there is no interpolation between the
//! animated and frozen states.

use std::fmt;

/// Handle returned by [`MotionPreference::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(bool)>;

/// The shared "prefers reduced motion" flag.
///
/// Listeners receive the new `reduced` value and are called in subscription
/// order, only when the value actually changes.
pub struct MotionPreference {
    reduced: bool,
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl MotionPreference {
    pub fn new(reduced: bool) -> Self {
        Self {
            reduced,
            next_id: 0,
            listeners: Vec::new(),
        }
    }

    pub fn is_reduced(&self) -> bool {
        self.reduced
    }

    /// `true` when animations should run. This is the value passed to
    /// `ParticleField::step`.
    pub fn motion_enabled(&self) -> bool {
        !self.reduced
    }

    /// Sets the flag, notifying listeners if it changed.
    pub fn set_reduced(&mut self, reduced: bool) {
        if self.reduced == reduced {
            return;
        }
        self.reduced = reduced;
        tracing::debug!(
            reduced,
            listeners = self.listeners.len(),
            "motion preference changed"
        );
        for (_, listener) in &mut self.listeners {
            listener(reduced);
        }
    }

    /// Flips the flag and returns the new `reduced` value.
    pub fn toggle(&mut self) -> bool {
        self.set_reduced(!self.reduced);
        self.reduced
    }

    pub fn subscribe(&mut self, listener: impl FnMut(bool) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Collapses a tween duration to zero when motion is reduced.
    pub fn reduced_duration(&self, normal: f64) -> f64 {
        if self.reduced {
            0.0
        } else {
            normal
        }
    }
}

impl Default for MotionPreference {
    fn default() -> Self {
        Self::new(false)
    }
}

impl fmt::Debug for MotionPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionPreference")
            .field("reduced", &self.reduced)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
