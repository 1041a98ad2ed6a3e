use std::fmt::{Debug, Display};
use std::future::Future;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select {0}")]
    MissingSelection(&'static str),
    #[error("Please choose a start and end date")]
    MissingDateRange,
    #[error("Start date must be on or before end date")]
    InvalidDateRange,
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: String,
        max: String,
    },
}

/// Why `begin_submit` refused to start.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SubmitBlocked {
    #[error("form is not open")]
    NotOpen,
    #[error("a submission is already in flight")]
    InFlight,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Draft state owned by one modal. Validation is synchronous and runs
/// before any request goes out.
pub trait FormDraft: Clone + Default {
    fn validate(&self) -> Result<(), ValidationError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ModalPhase {
    #[default]
    Closed,
    Open,
    Submitting,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Inline message shown inside a modal or as a toast.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}

/// Closing side of a cancellation pair.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Checked by the batch runner before each item.
#[derive(Clone, Debug)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// A token that is never cancelled.
    pub fn never() -> Self {
        cancel_pair().1
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }
}

pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

/// Handed to the caller when a submission starts.
#[derive(Clone, Debug)]
pub struct Submission<D> {
    pub draft: D,
    pub cancel: CancelToken,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct BatchProgress {
    pub current: usize,
    pub total: usize,
}

impl BatchProgress {
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.current.min(self.total) * 100) / self.total) as u8
    }
}

/// Closed -> Open -> Submitting -> Closed on success, or back to Open with
/// an inline error on failure. The draft survives failures.
#[derive(Debug, Default)]
pub struct ModalForm<D> {
    phase: ModalPhase,
    draft: D,
    notice: Option<Notice>,
    progress: Option<BatchProgress>,
    cancel: Option<CancelHandle>,
}

impl<D: FormDraft> ModalForm<D> {
    pub fn new() -> Self {
        Self {
            phase: ModalPhase::Closed,
            draft: D::default(),
            notice: None,
            progress: None,
            cancel: None,
        }
    }

    pub fn phase(&self) -> ModalPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase != ModalPhase::Closed
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == ModalPhase::Submitting
    }

    pub fn draft(&self) -> &D {
        &self.draft
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn progress(&self) -> Option<BatchProgress> {
        self.progress
    }

    pub fn open(&mut self, seed: D) {
        self.phase = ModalPhase::Open;
        self.draft = seed;
        self.notice = None;
        self.progress = None;
        self.cancel = None;
    }

    /// Edits are ignored unless the form is open and idle.
    pub fn update(&mut self, edit: impl FnOnce(&mut D)) -> bool {
        if self.phase != ModalPhase::Open {
            return false;
        }
        edit(&mut self.draft);
        true
    }

    pub fn begin_submit(&mut self) -> Result<Submission<D>, SubmitBlocked> {
        match self.phase {
            ModalPhase::Closed => return Err(SubmitBlocked::NotOpen),
            ModalPhase::Submitting => return Err(SubmitBlocked::InFlight),
            ModalPhase::Open => {}
        }
        if let Err(err) = self.draft.validate() {
            self.notice = Some(Notice::error(err.to_string()));
            return Err(err.into());
        }

        let (handle, token) = cancel_pair();
        self.phase = ModalPhase::Submitting;
        self.notice = None;
        self.progress = None;
        self.cancel = Some(handle);
        Ok(Submission {
            draft: self.draft.clone(),
            cancel: token,
        })
    }

    /// Ignored once the modal is no longer submitting.
    pub fn set_progress(&mut self, progress: BatchProgress) {
        if self.phase == ModalPhase::Submitting {
            self.progress = Some(progress);
        }
    }

    /// Returns true when the modal closed as a result.
    pub fn finish(&mut self, result: Result<(), String>) -> bool {
        if self.phase != ModalPhase::Submitting {
            return false;
        }
        self.cancel = None;
        match result {
            Ok(()) => {
                self.reset();
                true
            }
            Err(message) => {
                self.phase = ModalPhase::Open;
                self.notice = Some(Notice::error(message));
                false
            }
        }
    }

    /// Closes the modal, cancelling an in-flight batch.
    pub fn close(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.phase = ModalPhase::Closed;
        self.draft = D::default();
        self.notice = None;
        self.progress = None;
        self.cancel = None;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchReport<I> {
    pub total: usize,
    pub attempted: usize,
    pub succeeded: Vec<I>,
    pub failed: Vec<(I, String)>,
    pub cancelled: bool,
}

impl<I> BatchReport<I> {
    pub fn is_complete_success(&self) -> bool {
        !self.cancelled && self.failed.is_empty() && self.attempted == self.total
    }

    pub fn summary(&self) -> String {
        let mut out = format!(
            "{} of {} succeeded",
            self.succeeded.len(),
            self.total
        );
        if !self.failed.is_empty() {
            out.push_str(&format!(", {} failed", self.failed.len()));
        }
        if self.cancelled {
            out.push_str(", cancelled");
        }
        out
    }
}

/// Submits items one at a time. Progress is reported before each call; a
/// failed item is logged and the batch moves on. Cancellation is checked
/// before each item and stops any further calls; the report is flagged
/// cancelled whenever the token fired before the batch returned.
pub async fn run_sequential<I, E, F, Fut>(
    items: Vec<I>,
    cancel: &CancelToken,
    mut on_progress: impl FnMut(BatchProgress),
    mut submit: F,
) -> BatchReport<I>
where
    I: Clone + Debug,
    E: Display,
    F: FnMut(I) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    let total = items.len();
    let mut report = BatchReport {
        total,
        attempted: 0,
        succeeded: Vec::new(),
        failed: Vec::new(),
        cancelled: false,
    };
    info!(total, "batch submission started");

    for (idx, item) in items.into_iter().enumerate() {
        if cancel.is_cancelled() {
            report.cancelled = true;
            break;
        }
        on_progress(BatchProgress {
            current: idx + 1,
            total,
        });
        report.attempted += 1;
        match submit(item.clone()).await {
            Ok(()) => report.succeeded.push(item),
            Err(err) => {
                warn!(item = ?item, %err, "batch item failed");
                report.failed.push((item, err.to_string()));
            }
        }
    }
    // A cancel that lands while the last item is in flight still counts.
    report.cancelled |= cancel.is_cancelled();

    info!(
        attempted = report.attempted,
        failed = report.failed.len(),
        cancelled = report.cancelled,
        "batch submission finished"
    );
    report
}
