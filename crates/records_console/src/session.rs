use std::time::{Duration, Instant};

use console_logging::{console_debug, console_warn};
use records_core::{update, AppState, AppViewModel, Msg, RecordId};

use crate::effects::EffectRunner;

/// Owns the core state and routes every message through `update`.
pub struct Session {
    state: AppState,
    runner: EffectRunner,
}

impl Session {
    pub fn new(state: AppState, runner: EffectRunner) -> Self {
        Self { state, runner }
    }

    /// Applies `msg` and starts the resulting effects. Returns records the
    /// user asked to edit.
    pub fn dispatch(&mut self, msg: Msg) -> Vec<RecordId> {
        console_debug!("dispatch {:?}", msg_name(&msg));
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.enqueue(effects)
    }

    /// Feeds engine results back in until no fetch, delete or update is
    /// outstanding, or `timeout` elapses. Reports still being written are
    /// not waited for. Returns whether the requests settled.
    pub fn settle(&mut self, timeout: Duration) -> bool {
        self.wait_until(timeout, |runner| runner.requests_pending() == 0)
    }

    /// Like [`Session::settle`] but also waits for pending reports.
    pub fn settle_all(&mut self, timeout: Duration) -> bool {
        self.wait_until(timeout, |runner| {
            runner.requests_pending() + runner.reports_pending() == 0
        })
    }

    /// Waits up to `timeout` for one engine result and applies it. Returns
    /// whether a result arrived.
    pub fn step(&mut self, timeout: Duration) -> bool {
        match self.runner.next_msg(timeout) {
            Some(msg) => {
                self.dispatch(msg);
                true
            }
            None => false,
        }
    }

    /// Applies one engine result if it has already arrived, without
    /// blocking.
    pub fn try_step(&mut self) -> bool {
        match self.runner.try_next_msg() {
            Some(msg) => {
                self.dispatch(msg);
                true
            }
            None => false,
        }
    }

    pub fn requests_pending(&self) -> usize {
        self.runner.requests_pending()
    }

    pub fn reports_pending(&self) -> usize {
        self.runner.reports_pending()
    }

    fn wait_until(&mut self, timeout: Duration, done: impl Fn(&EffectRunner) -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while !done(&self.runner) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                console_warn!(
                    "Gave up waiting for {} request(s) and {} report(s)",
                    self.runner.requests_pending(),
                    self.runner.reports_pending()
                );
                return false;
            }
            self.step(remaining);
        }
        true
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Returns whether the view changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        self.state.consume_dirty()
    }
}

fn msg_name(msg: &Msg) -> &'static str {
    match msg {
        Msg::RefreshRequested => "RefreshRequested",
        Msg::CollectionLoaded(_) => "CollectionLoaded",
        Msg::CollectionLoadFailed => "CollectionLoadFailed",
        Msg::SearchChanged(_) => "SearchChanged",
        Msg::StatusFilterChanged(_) => "StatusFilterChanged",
        Msg::SortRequested(_) => "SortRequested",
        Msg::ColumnClicked(_) => "ColumnClicked",
        Msg::DeleteClicked(_) => "DeleteClicked",
        Msg::DeleteConfirmed => "DeleteConfirmed",
        Msg::DeleteCancelled => "DeleteCancelled",
        Msg::DeleteFinished { .. } => "DeleteFinished",
        Msg::EditClicked(_) => "EditClicked",
        Msg::UpdateSubmitted { .. } => "UpdateSubmitted",
        Msg::UpdateFinished { .. } => "UpdateFinished",
        Msg::ExportClicked => "ExportClicked",
        Msg::ReportFinished(_) => "ReportFinished",
        Msg::NoticeDismissed => "NoticeDismissed",
    }
}
