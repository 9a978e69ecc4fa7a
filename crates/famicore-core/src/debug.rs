//! Debugger intent tracking.
//!
//! The debug surface accepts any register or memory value, including ones
//! normal execution could never produce. Pokes aimed at ROM cannot land;
//! they update the open-bus latch like real bus traffic would and are
//! appended to an intent history a front-end can display or replay.

/// One debugger write that could not (or did not) mutate hardware state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugIntent {
    /// Target address.
    pub addr: u16,
    /// Value the debugger asked for.
    pub value: u8,
}

/// Append-only history of ROM-targeted pokes.
#[derive(Debug, Default)]
pub struct IntentLog {
    entries: Vec<DebugIntent>,
}

impl IntentLog {
    /// Record an intent.
    pub fn record(&mut self, addr: u16, value: u8) {
        self.entries.push(DebugIntent { addr, value });
    }

    /// The recorded intents, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[DebugIntent] {
        &self.entries
    }

    /// Drop the history.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
