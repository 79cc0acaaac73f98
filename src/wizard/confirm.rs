// ABOUTME: Yes/no confirmation gates surfaced by the wizard before lossy transitions
// ABOUTME: Callers supply the decision through the ConfirmationGate trait

/// The decisions the wizard may ask its caller to confirm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Moving forward while the current step's required tasks are unfinished
    IncompleteTasks,
    /// Discarding all progress
    Reset,
}

impl Confirmation {
    pub fn message(&self) -> &'static str {
        match self {
            Confirmation::IncompleteTasks => {
                "Some recommended tasks are not completed. Do you want to continue anyway?"
            }
            Confirmation::Reset => "Are you sure you want to start over? All progress will be lost.",
        }
    }
}

pub trait ConfirmationGate {
    fn confirm(&mut self, request: Confirmation) -> bool;
}

impl<F> ConfirmationGate for F
where
    F: FnMut(Confirmation) -> bool,
{
    fn confirm(&mut self, request: Confirmation) -> bool {
        self(request)
    }
}

/// Answers every confirmation with a fixed decision.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl ConfirmationGate for AutoConfirm {
    fn confirm(&mut self, _request: Confirmation) -> bool {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_gate_sees_request() {
        let mut seen = Vec::new();
        let mut gate = |request: Confirmation| {
            seen.push(request);
            false
        };

        assert!(!gate.confirm(Confirmation::Reset));
        assert_eq!(seen, vec![Confirmation::Reset]);
    }

    #[test]
    fn test_auto_confirm() {
        assert!(AutoConfirm(true).confirm(Confirmation::IncompleteTasks));
        assert!(!AutoConfirm(false).confirm(Confirmation::Reset));
        assert!(Confirmation::Reset.message().contains("start over"));
    }
}
