/// Position of a load request in issue order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Issues monotonically increasing tickets for one kind of load.
///
/// Only the response holding the most recently issued ticket may be
/// applied; anything older has been superseded.
#[derive(Debug, Clone, Default)]
pub struct RequestSequencer {
    latest: u64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> RequestTicket {
        self.latest += 1;
        RequestTicket(self.latest)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.latest
    }

    pub fn latest(&self) -> Option<RequestTicket> {
        (self.latest > 0).then_some(RequestTicket(self.latest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_latest_is_current() {
        let mut sequencer = RequestSequencer::new();
        assert_eq!(sequencer.latest(), None);

        let first = sequencer.issue();
        assert!(sequencer.is_current(first));

        let second = sequencer.issue();
        assert!(second > first);
        assert!(!sequencer.is_current(first));
        assert!(sequencer.is_current(second));
        assert_eq!(sequencer.latest(), Some(second));
    }
}
