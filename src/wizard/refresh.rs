// ABOUTME: Coalescing refresh scheduler between the wizard and its view
// ABOUTME: Repeated repaint requests within one tick collapse into a single pending refresh

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refresh {
    Indicator,
    Buttons,
    Content,
    PathOptions,
    ChecklistItem { task_id: String, checked: bool },
}

/// Everything the view must repaint on its next tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingRefresh {
    pub indicator: bool,
    pub buttons: bool,
    pub content: bool,
    pub path_options: bool,
    /// Latest checked state per toggled checklist item
    pub checklist: BTreeMap<String, bool>,
}

impl PendingRefresh {
    pub fn is_full(&self) -> bool {
        self.indicator && self.buttons && self.content
    }

    fn merge(&mut self, refresh: Refresh) {
        match refresh {
            Refresh::Indicator => self.indicator = true,
            Refresh::Buttons => self.buttons = true,
            Refresh::Content => self.content = true,
            Refresh::PathOptions => self.path_options = true,
            Refresh::ChecklistItem { task_id, checked } => {
                self.checklist.insert(task_id, checked);
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct RefreshScheduler {
    pending: Option<PendingRefresh>,
    coalesced: usize,
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, refresh: Refresh) {
        match self.pending {
            Some(ref mut pending) => {
                self.coalesced += 1;
                pending.merge(refresh);
            }
            None => {
                let mut pending = PendingRefresh::default();
                pending.merge(refresh);
                self.pending = Some(pending);
            }
        }
    }

    pub fn schedule_full(&mut self) {
        self.schedule(Refresh::Indicator);
        self.schedule(Refresh::Content);
        self.schedule(Refresh::Buttons);
    }

    pub fn is_scheduled(&self) -> bool {
        self.pending.is_some()
    }

    /// Requests folded into an already-scheduled refresh since the last take
    pub fn coalesced(&self) -> usize {
        self.coalesced
    }

    /// Drain the pending refresh for this tick
    pub fn take(&mut self) -> Option<PendingRefresh> {
        self.coalesced = 0;
        self.pending.take()
    }
}
