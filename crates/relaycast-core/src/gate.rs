use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide switch deciding whether admin media is broadcast.
///
/// Suppressed media is not queued; while off, it is relayed like any admin message.
#[derive(Debug)]
pub struct MailingGate {
    active: AtomicBool,
}

impl Default for MailingGate {
    fn default() -> Self {
        Self::new(true)
    }
}

impl MailingGate {
    pub fn new(active: bool) -> Self {
        Self {
            active: AtomicBool::new(active),
        }
    }

    /// Flip the gate and return the new state.
    pub fn toggle(&self) -> bool {
        !self.active.fetch_xor(true, Ordering::SeqCst)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}
