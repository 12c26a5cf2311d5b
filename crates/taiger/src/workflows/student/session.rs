use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Tracks whether a view is still interested in the response of an in-flight request.
///
/// Each request takes a ticket; starting a newer request or closing the view makes older
/// tickets stale so their responses can be dropped.
#[derive(Debug, Default)]
pub struct ViewSession {
    generation: AtomicU64,
    closed: AtomicBool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket(u64);

impl ViewSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> RequestTicket {
        RequestTicket(self.generation.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        !self.is_closed() && self.generation.load(Ordering::Acquire) == ticket.0
    }

    pub fn accept<T>(&self, ticket: RequestTicket, value: T) -> Option<T> {
        self.is_current(ticket).then_some(value)
    }
}
