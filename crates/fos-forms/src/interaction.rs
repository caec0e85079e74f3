//! Interaction Tracking
//!
//! Accumulates the trigger events a control has seen since its last reset.
//! `has_interacted` gates the user-facing validity presentation.

use indexmap::IndexSet;

fn unique<I, S>(triggers: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    triggers
        .into_iter()
        .map(Into::into)
        .collect::<IndexSet<String>>()
        .into_iter()
        .collect()
}

/// Per control record of observed interaction triggers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionRecord {
    triggers: Vec<String>,
    seen: IndexSet<String>,
    has_interacted: bool,
}

impl InteractionRecord {
    /// Record waiting for every event name in `triggers`
    pub fn new<I, S>(triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            triggers: unique(triggers),
            seen: IndexSet::new(),
            has_interacted: false,
        }
    }

    /// Replace the trigger list, keeping the interacted flag and any seen
    /// events that are still triggers
    pub fn set_triggers<I, S>(&mut self, triggers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.triggers = unique(triggers);
        let triggers = &self.triggers;
        self.seen.retain(|seen| triggers.contains(seen));
    }

    pub fn triggers(&self) -> &[String] {
        &self.triggers
    }

    /// Trigger names observed since the last reset, in arrival order
    pub fn seen(&self) -> impl Iterator<Item = &str> {
        self.seen.iter().map(String::as_str)
    }

    pub fn has_interacted(&self) -> bool {
        self.has_interacted
    }

    /// Note an event on the control
    ///
    /// Returns true when this event completed the trigger set. Events that
    /// are not triggers are ignored; an empty trigger list never completes.
    pub fn observe(&mut self, event_type: &str) -> bool {
        if self.has_interacted || !self.triggers.iter().any(|t| t == event_type) {
            return false;
        }
        self.seen.insert(event_type.to_string());
        if self.seen.len() == self.triggers.len() {
            self.has_interacted = true;
            return true;
        }
        false
    }

    /// Force the interacted state (submit attempts, failed reports)
    ///
    /// Returns true if the flag changed.
    pub fn mark_interacted(&mut self) -> bool {
        !std::mem::replace(&mut self.has_interacted, true)
    }

    /// Clear the flag and the observed triggers together
    ///
    /// Returns true if the flag changed.
    pub fn reset(&mut self) -> bool {
        self.seen.clear();
        std::mem::replace(&mut self.has_interacted, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_triggers_required() {
        let mut record = InteractionRecord::new(["input", "blur"]);
        assert!(!record.observe("input"));
        assert!(!record.observe("input"));
        assert!(!record.observe("focus"));
        assert!(!record.has_interacted());
        assert!(record.observe("blur"));
        assert!(record.has_interacted());
        assert_eq!(record.seen().collect::<Vec<_>>(), vec!["input", "blur"]);
    }

    #[test]
    fn test_monotonic_until_reset() {
        let mut record = InteractionRecord::new(["pc-input"]);
        assert!(record.observe("pc-input"));
        for _ in 0..5 {
            assert!(!record.observe("pc-input"));
            assert!(record.has_interacted());
        }

        assert!(record.reset());
        assert!(!record.has_interacted());
        assert_eq!(record.seen().count(), 0);
        assert!(!record.reset());
    }

    #[test]
    fn test_mark_interacted() {
        let mut record = InteractionRecord::new(Vec::<String>::new());
        assert!(!record.observe("input"));
        assert!(record.mark_interacted());
        assert!(!record.mark_interacted());
        assert!(record.has_interacted());
    }

    #[test]
    fn test_set_triggers_keeps_flag() {
        let mut record = InteractionRecord::default();
        assert!(record.mark_interacted());
        record.set_triggers(["input", "blur", "input"]);
        assert_eq!(record.triggers(), ["input", "blur"]);
        assert!(record.has_interacted());

        record.reset();
        assert!(!record.observe("input"));
        assert!(record.observe("blur"));
    }

    #[test]
    fn test_duplicate_triggers_collapse() {
        let mut record = InteractionRecord::new(["blur", "blur"]);
        assert_eq!(record.triggers().len(), 1);
        assert!(record.observe("blur"));
    }
}
