//! Identifiers and simple allocators for actors and service requests.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Actor index as reported by the posing service.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u32);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle pairing an outgoing service request with its completion.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct RequestTicket(pub u64);

/// Per-actor, per-channel sequence number used to discard stale completions.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Sequence(pub u64);

/// Monotonic allocator for tickets and sequence numbers.
#[derive(Default, Debug)]
pub struct TicketAllocator {
    next_ticket: u64,
    next_sequence: u64,
}

impl TicketAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_ticket(&mut self) -> RequestTicket {
        let id = RequestTicket(self.next_ticket);
        self.next_ticket = self.next_ticket.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_sequence(&mut self) -> Sequence {
        let seq = Sequence(self.next_sequence);
        self.next_sequence = self.next_sequence.wrapping_add(1);
        seq
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = TicketAllocator::new();
        assert_eq!(alloc.alloc_ticket(), RequestTicket(0));
        assert_eq!(alloc.alloc_ticket(), RequestTicket(1));
        assert_eq!(alloc.alloc_sequence(), Sequence(0));
        assert_eq!(alloc.alloc_sequence(), Sequence(1));
        alloc.reset();
        assert_eq!(alloc.alloc_ticket(), RequestTicket(0));
    }

    #[test]
    fn actor_display_is_bare_index() {
        assert_eq!(ActorId(7).to_string(), "7");
    }
}
