//! Per-operation loading and error tracking

use shared::{Operation, OperationStatus};

/// Holds the in-flight flag and last error of each operation family
///
/// Overlapping calls for the same operation are not prevented here; the
/// views disable their submit affordance while `in_flight` is set. `finish`
/// clears the flag unconditionally, so the first of two overlapping calls
/// to settle already reports the family as idle.
#[derive(Debug, Clone, Default)]
pub struct OperationTracker {
    status: OperationStatus,
}

impl OperationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the operation as in flight and clear its last error
    pub fn begin(&mut self, op: Operation) {
        let state = self.status.get_mut(op);
        state.in_flight = true;
        state.last_error = None;
    }

    /// Mark the operation as settled, whatever the outcome
    pub fn finish(&mut self, op: Operation) {
        self.status.get_mut(op).in_flight = false;
    }

    pub fn record_error(&mut self, op: Operation, message: impl Into<String>) {
        self.status.get_mut(op).last_error = Some(message.into());
    }

    pub fn is_in_flight(&self, op: Operation) -> bool {
        self.status.in_flight(op)
    }

    pub fn last_error(&self, op: Operation) -> Option<&str> {
        self.status.get(op).last_error.as_deref()
    }

    /// Snapshot for the views
    pub fn status(&self) -> OperationStatus {
        self.status.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_and_finish() {
        let mut tracker = OperationTracker::new();
        assert!(!tracker.is_in_flight(Operation::Weather));

        tracker.begin(Operation::Weather);
        assert!(tracker.is_in_flight(Operation::Weather));
        assert!(!tracker.is_in_flight(Operation::Ask));

        tracker.finish(Operation::Weather);
        assert!(!tracker.is_in_flight(Operation::Weather));
    }

    #[test]
    fn test_begin_clears_last_error() {
        let mut tracker = OperationTracker::new();
        tracker.begin(Operation::Prediction);
        tracker.record_error(Operation::Prediction, "Prediction request failed.");
        tracker.finish(Operation::Prediction);
        assert_eq!(
            tracker.last_error(Operation::Prediction),
            Some("Prediction request failed.")
        );

        tracker.begin(Operation::Prediction);
        assert_eq!(tracker.last_error(Operation::Prediction), None);
    }

    #[test]
    fn test_overlapping_calls_are_not_exclusive() {
        let mut tracker = OperationTracker::new();
        tracker.begin(Operation::Ask);
        tracker.begin(Operation::Ask);
        assert!(tracker.is_in_flight(Operation::Ask));

        // First settlement clears the flag even though another call is pending
        tracker.finish(Operation::Ask);
        assert!(!tracker.is_in_flight(Operation::Ask));
        tracker.finish(Operation::Ask);
        assert!(!tracker.is_in_flight(Operation::Ask));
    }

    #[test]
    fn test_operations_are_independent() {
        let mut tracker = OperationTracker::new();
        tracker.begin(Operation::Weather);
        tracker.record_error(Operation::Weather, "Weather data could not be fetched.");
        tracker.begin(Operation::Ask);
        tracker.finish(Operation::Ask);

        assert!(tracker.is_in_flight(Operation::Weather));
        assert_eq!(tracker.last_error(Operation::Ask), None);
    }
}
