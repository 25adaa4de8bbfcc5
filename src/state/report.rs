//! Pass outcome reporting

use std::fmt;

/// Why a crawl pass stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The wall-clock budget for this pass ran out; resumable
    TimeBudget,

    /// Server load reached the configured ceiling; resumable
    LoadLimit,

    /// The cursor reached the end of the snapshot; terminal for this profile
    EndOfSitemap,

    /// The pass aborted on an unrecoverable error
    Fatal,
}

impl StopReason {
    /// True when the next invocation resumes the same profile from the cursor
    pub fn is_resumable(&self) -> bool {
        matches!(self, Self::TimeBudget | Self::LoadLimit)
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::TimeBudget => "time budget reached",
            Self::LoadLimit => "server load limit reached",
            Self::EndOfSitemap => "end of sitemap",
            Self::Fatal => "fatal error",
        };
        f.write_str(s)
    }
}

/// Result of one bounded crawl pass
#[derive(Debug, Clone)]
pub struct PassReport {
    /// URLs probed during this pass (successes and failures)
    pub crawled: usize,

    /// URLs that failed probing; merged into the blacklist by the driver
    pub blacklist: Vec<String>,

    /// Error detail when `reason` is [`StopReason::Fatal`]
    pub error: Option<String>,

    pub reason: StopReason,

    /// Cursor value when the pass started
    pub start_pos: usize,

    /// Cursor value persisted when the pass stopped
    pub end_pos: usize,
}

impl PassReport {
    pub fn hit_end(&self) -> bool {
        self.reason == StopReason::EndOfSitemap
    }
}
