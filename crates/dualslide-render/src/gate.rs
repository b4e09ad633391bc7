//! Generation counter that drops stale render completions.
//!
//! Every navigation takes a ticket before rendering; a finished render is only
//! applied if its ticket is still the latest one.

/// Proof of which render generation produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTicket(u64);

#[derive(Debug, Default)]
pub struct RenderGate {
    generation: u64,
}

impl RenderGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation, making all earlier tickets stale.
    pub fn begin(&mut self) -> RenderTicket {
        self.generation += 1;
        RenderTicket(self.generation)
    }

    pub fn is_current(&self, ticket: RenderTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Make every outstanding ticket stale.
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_latest_ticket_is_current() {
        let mut gate = RenderGate::new();
        let first = gate.begin();
        let second = gate.begin();
        assert!(!gate.is_current(first));
        assert!(gate.is_current(second));

        gate.invalidate();
        assert!(!gate.is_current(second));
    }
}
