use crate::dns::CurrentDns;

/// Observed DNS state for the host. One instance per process, owned by the
/// caller and handed to the switcher; the control surface reads it, never
/// writes it.
///
/// `None` means the state has not been read yet, or the last read failed.
/// That is not the same as `Some(CurrentDns::Automatic)`, which records an
/// explicit "no DNS servers set" answer from the OS.
#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct DnsState {
    current: Option<CurrentDns>,
}

impl DnsState {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn current(&self) -> Option<&CurrentDns> {
        self.current.as_ref()
    }

    /// Records an address confirmed applied to all eligible services. Only
    /// the switcher calls this, and only after the elevated command
    /// succeeded.
    pub(crate) fn record_applied(&mut self, address: &str) {
        self.current = Some(CurrentDns::Servers(address.to_string()));
    }

    /// Records the outcome of an explicit refresh read.
    pub fn record_reading(&mut self, reading: CurrentDns) {
        self.current = Some(reading);
    }

    /// Forgets the recorded state after a failed refresh read.
    pub fn mark_unknown(&mut self) {
        self.current = None;
    }

    pub fn describe(&self) -> String {
        match &self.current {
            Some(current) => current.to_string(),
            None => "Unknown".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_is_distinct_from_automatic() {
        let mut state = DnsState::new();
        assert_eq!(state.describe(), "Unknown");

        state.record_reading(CurrentDns::Automatic);
        assert_eq!(state.describe(), "Automatic");
        assert_eq!(state.current(), Some(&CurrentDns::Automatic));

        state.mark_unknown();
        assert_eq!(state.current(), None);
    }

    #[test]
    fn test_record_applied_overwrites_reading() {
        let mut state = DnsState::new();
        state.record_reading(CurrentDns::Servers("8.8.8.8".to_string()));
        state.record_applied("1.1.1.1");
        assert_eq!(state.describe(), "1.1.1.1");
    }
}
