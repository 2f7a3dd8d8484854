//! Scoped-duration status effects
//!
//! `engage` runs the activation side effect at once and holds the effect for a duration.
//! The expiry side effect runs exactly once per engagement: when the duration runs out, or
//! earlier through [`StatusEffect::release`] when the holder goes away. Owners must route
//! every removal path through `release`; dropping an engaged effect is logged as a leak.

/// Expiry side effect, run against the holder's context
type Expiry<C> = Box<dyn FnOnce(&mut C)>;

pub struct StatusEffect<C> {
    remaining: f32,
    on_expire: Option<Expiry<C>>,
}

impl<C> Default for StatusEffect<C> {
    fn default() -> Self {
        Self {
            remaining: 0.0,
            on_expire: None,
        }
    }
}

impl<C> std::fmt::Debug for StatusEffect<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusEffect")
            .field("engaged", &self.is_engaged())
            .field("remaining", &self.remaining)
            .finish()
    }
}

impl<C> StatusEffect<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_engaged(&self) -> bool {
        self.on_expire.is_some()
    }

    /// Seconds left, zero when idle
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    /// Start the effect; returns false (and does nothing) if one is already engaged
    pub fn engage<A, E>(&mut self, ctx: &mut C, duration: f32, on_activate: A, on_expire: E) -> bool
    where
        A: FnOnce(&mut C),
        E: FnOnce(&mut C) + 'static,
    {
        if self.is_engaged() {
            return false;
        }
        self.remaining = duration.max(0.0);
        self.on_expire = Some(Box::new(on_expire));
        on_activate(ctx);
        true
    }

    /// Let time pass; returns true if the effect expired during this call
    pub fn advance(&mut self, ctx: &mut C, dt: f32) -> bool {
        if !self.is_engaged() {
            return false;
        }
        self.remaining -= dt.max(0.0);
        if self.remaining <= 0.0 {
            self.expire(ctx);
            true
        } else {
            false
        }
    }

    /// End the effect early, still running its expiry; no-op when idle
    pub fn release(&mut self, ctx: &mut C) -> bool {
        if !self.is_engaged() {
            return false;
        }
        self.expire(ctx);
        true
    }

    fn expire(&mut self, ctx: &mut C) {
        self.remaining = 0.0;
        // Taken before running so a nested release cannot fire it twice
        if let Some(on_expire) = self.on_expire.take() {
            on_expire(ctx);
        }
    }
}

impl<C> Drop for StatusEffect<C> {
    fn drop(&mut self) {
        if self.is_engaged() {
            log::warn!(
                "status effect dropped while engaged ({:.2}s left), expiry skipped",
                self.remaining
            );
        }
    }
}
