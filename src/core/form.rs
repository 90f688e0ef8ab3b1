//! Conversion form state machine
//!
//! Every operation updates the shared [`FormState`] immediately and, where a
//! result has to be revealed, schedules a commit behind a fixed simulated
//! delay. How overlapping commits interact is decided by [`CommitPolicy`].

use crate::core::config::{CommitPolicy, LatencyConfig};
use crate::core::rates::RateMatrix;
use crate::core::validation::{AmountError, validate_amount};
use futures::future::join_all;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    From,
    To,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Exchanging,
    Swapping,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormState {
    pub from_currency: String,
    pub to_currency: String,
    /// Raw user input, kept verbatim.
    pub from_amount: String,
    /// Display value of the last committed conversion.
    pub to_amount: String,
    pub is_swapping: bool,
    pub is_exchanging: bool,
    /// Inline validation message for `from_amount`.
    pub error: Option<AmountError>,
}

impl FormState {
    pub fn phase(&self) -> Phase {
        if self.is_swapping {
            Phase::Swapping
        } else if self.is_exchanging {
            Phase::Exchanging
        } else {
            Phase::Idle
        }
    }

    /// The submit control is disabled while an exchange is in flight.
    pub fn can_submit(&self) -> bool {
        !self.is_exchanging
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    Busy,
    Invalid(AmountError),
}

impl Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitError::Busy => write!(f, "An exchange is already in progress"),
            SubmitError::Invalid(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SubmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SubmitError::Busy => None,
            SubmitError::Invalid(e) => Some(e),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Busy {
    Exchanging,
    Swapping,
}

#[derive(Debug)]
struct Commit {
    ticket: u64,
    busy: Busy,
    to_amount: String,
    selection: Option<(String, String)>,
}

struct Inner {
    form: FormState,
    latest_ticket: u64,
    pending: Vec<JoinHandle<()>>,
}

impl Inner {
    fn apply(&mut self, commit: Commit, policy: CommitPolicy) {
        if policy == CommitPolicy::LatestRequestWins && commit.ticket != self.latest_ticket {
            debug!(ticket = commit.ticket, latest = self.latest_ticket, "Discarding stale commit");
            return;
        }
        debug!(ticket = commit.ticket, busy = ?commit.busy, to_amount = %commit.to_amount, "Committing");
        match commit.busy {
            Busy::Exchanging => self.form.is_exchanging = false,
            Busy::Swapping => self.form.is_swapping = false,
        }
        if let Some((from, to)) = commit.selection {
            self.form.from_currency = from;
            self.form.to_currency = to;
        }
        self.form.to_amount = commit.to_amount;
    }
}

/// Drives a [`FormState`] shared with the delayed commit tasks.
///
/// Methods spawn tokio tasks and must be called from within a runtime.
#[derive(Clone)]
pub struct FormController {
    rates: Arc<RateMatrix>,
    latency: LatencyConfig,
    inner: Arc<Mutex<Inner>>,
}

impl FormController {
    pub fn new(rates: Arc<RateMatrix>, from: &str, to: &str, latency: LatencyConfig) -> Self {
        let form = FormState {
            from_currency: from.to_string(),
            to_currency: to.to_string(),
            ..FormState::default()
        };
        Self {
            rates,
            latency,
            inner: Arc::new(Mutex::new(Inner {
                form,
                latest_ticket: 0,
                pending: Vec::new(),
            })),
        }
    }

    pub fn rates(&self) -> &RateMatrix {
        &self.rates
    }

    pub async fn snapshot(&self) -> FormState {
        self.inner.lock().await.form.clone()
    }

    /// Stores the raw input and validates it on the spot. The output amount
    /// is left alone until the next currency change, swap or submit.
    pub async fn set_amount(&self, raw: &str) -> Result<(), AmountError> {
        let mut inner = self.inner.lock().await;
        inner.form.from_amount = raw.to_string();
        let result = validate_amount(raw).map(|_| ());
        inner.form.error = result.err();
        result
    }

    pub async fn clear_amount(&self) {
        let mut inner = self.inner.lock().await;
        self.supersede(&mut inner);
        inner.form.from_amount.clear();
        inner.form.to_amount.clear();
        inner.form.error = None;
    }

    /// Selects a new currency for one side. The selection changes now; the
    /// recomputed output lands after the exchange delay.
    pub async fn change_currency(&self, side: Side, code: &str) {
        let mut inner = self.inner.lock().await;
        let (from, to) = match side {
            Side::From => (code, inner.form.to_currency.as_str()),
            Side::To => (inner.form.from_currency.as_str(), code),
        };
        let converted = self.rates.convert(&inner.form.from_amount, from, to);
        match side {
            Side::From => inner.form.from_currency = code.to_string(),
            Side::To => inner.form.to_currency = code.to_string(),
        }

        self.schedule(&mut inner, self.latency.exchange_delay(), Busy::Exchanging, converted, None);
        if !inner.form.from_amount.is_empty() {
            inner.form.is_exchanging = true;
        }
    }

    /// Swaps the two selections after the swap delay. The pair and amount are
    /// captured now.
    pub async fn swap(&self) {
        let mut inner = self.inner.lock().await;
        let from = inner.form.from_currency.clone();
        let to = inner.form.to_currency.clone();
        let converted = self.rates.convert(&inner.form.from_amount, &to, &from);

        self.schedule(
            &mut inner,
            self.latency.swap_delay(),
            Busy::Swapping,
            converted,
            Some((to, from)),
        );
        inner.form.is_swapping = true;
    }

    /// Validates the amount and, if it passes, commits the conversion after
    /// the exchange delay. A rejected submit only updates the inline message.
    pub async fn submit(&self) -> Result<(), SubmitError> {
        let mut inner = self.inner.lock().await;
        if !inner.form.can_submit() {
            return Err(SubmitError::Busy);
        }
        if let Err(e) = validate_amount(&inner.form.from_amount) {
            debug!(amount = %inner.form.from_amount, error = %e, "Submit rejected");
            inner.form.error = Some(e);
            return Err(SubmitError::Invalid(e));
        }
        inner.form.error = None;

        let converted = self.rates.convert(
            &inner.form.from_amount,
            &inner.form.from_currency,
            &inner.form.to_currency,
        );
        self.schedule(&mut inner, self.latency.exchange_delay(), Busy::Exchanging, converted, None);
        inner.form.is_exchanging = true;
        Ok(())
    }

    /// Waits until every scheduled commit has fired or been cancelled.
    pub async fn wait_idle(&self) {
        loop {
            let handles: Vec<JoinHandle<()>> = {
                let mut inner = self.inner.lock().await;
                inner.pending.drain(..).collect()
            };
            if handles.is_empty() {
                break;
            }
            for result in join_all(handles).await {
                if let Err(e) = result {
                    if !e.is_cancelled() {
                        debug!(error = %e, "Commit task failed");
                    }
                }
            }
        }
    }

    // Under `LatestRequestWins`, takes a new ticket and cancels everything
    // pending. Flags owned by cancelled commits are reset here since those
    // commits will never clear them.
    fn supersede(&self, inner: &mut Inner) -> u64 {
        inner.latest_ticket += 1;
        inner.pending.retain(|handle| !handle.is_finished());
        if self.latency.policy == CommitPolicy::LatestRequestWins && !inner.pending.is_empty() {
            debug!(cancelled = inner.pending.len(), "Cancelling pending commits");
            for handle in inner.pending.drain(..) {
                handle.abort();
            }
            inner.form.is_exchanging = false;
            inner.form.is_swapping = false;
        }
        inner.latest_ticket
    }

    fn schedule(
        &self,
        inner: &mut Inner,
        delay: Duration,
        busy: Busy,
        to_amount: String,
        selection: Option<(String, String)>,
    ) {
        let ticket = self.supersede(inner);
        let commit = Commit {
            ticket,
            busy,
            to_amount,
            selection,
        };
        debug!(ticket, ?delay, busy = ?commit.busy, "Scheduling commit");

        let shared = Arc::clone(&self.inner);
        let policy = self.latency.policy;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            shared.lock().await.apply(commit, policy);
        });
        inner.pending.push(handle);
    }
}
