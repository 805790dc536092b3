//! Poll-and-merge controller.
//!
//! Owns the dashboard's view of the backend. A background task polls the
//! mentions list and the summary on a fixed interval and reports each cycle
//! over a channel; the owner applies reports on its own task, so the state is
//! only ever touched from one place. Submissions are inserted at the head of
//! the list as soon as the backend accepts them and are superseded by the next
//! poll.

use crate::config::Config;
use crate::error::{ApiError, FetchError, SubmitError};
use crate::feeds::{Mention, MentionsApi, NewMention, Summary};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    pub interval: Duration,
    pub limit: usize,
    pub source: String,
}

impl From<&Config> for ControllerConfig {
    fn from(config: &Config) -> Self {
        Self {
            interval: config.polling.interval(),
            limit: config.polling.limit,
            source: config.api.source.clone(),
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// Read-only view handed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    mentions: Vec<Mention>,
    summary: Option<Summary>,
    loading: bool,
    error: Option<String>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            mentions: Vec::new(),
            summary: None,
            loading: true,
            error: None,
        }
    }
}

impl DashboardState {
    /// Newest first.
    pub fn mentions(&self) -> &[Mention] {
        &self.mentions
    }

    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    /// True until the first poll cycle has completed.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[cfg(test)]
    pub(crate) fn with_data(
        mentions: Vec<Mention>,
        summary: Option<Summary>,
        error: Option<&str>,
    ) -> Self {
        Self {
            mentions,
            summary,
            loading: false,
            error: error.map(str::to_string),
        }
    }

    fn replace(&mut self, mentions: Vec<Mention>, summary: Summary) {
        let mut seen = HashSet::with_capacity(mentions.len());
        self.mentions = mentions
            .into_iter()
            .filter(|mention| seen.insert(mention.id.clone()))
            .collect();
        self.summary = Some(summary);
    }

    fn insert_front(&mut self, mention: Mention) {
        self.mentions.retain(|existing| existing.id != mention.id);
        self.mentions.insert(0, mention);
    }

    fn upsert(&mut self, mention: Mention) -> &Mention {
        match self.mentions.iter().position(|m| m.id == mention.id) {
            Some(index) => {
                self.mentions[index] = mention;
                &self.mentions[index]
            }
            None => {
                self.insert_front(mention);
                &self.mentions[0]
            }
        }
    }
}

/// Both halves of one successful poll.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub mentions: Vec<Mention>,
    pub summary: Summary,
}

#[derive(Debug)]
pub struct CycleReport {
    generation: u64,
    outcome: Result<Snapshot, FetchError>,
}

impl CycleReport {
    pub fn outcome(&self) -> &Result<Snapshot, FetchError> {
        &self.outcome
    }
}

/// Fetches mentions and summary concurrently. Fails as soon as either fails.
pub async fn fetch_cycle(api: &dyn MentionsApi, limit: usize) -> Result<Snapshot, FetchError> {
    let (mentions, summary) =
        futures::future::try_join(api.list_mentions(limit), api.summary()).await?;
    Ok(Snapshot { mentions, summary })
}

pub struct Controller {
    api: Arc<dyn MentionsApi>,
    config: ControllerConfig,
    state: DashboardState,
    reports_tx: mpsc::UnboundedSender<CycleReport>,
    reports_rx: mpsc::UnboundedReceiver<CycleReport>,
    poller: Option<JoinHandle<()>>,
    generation: u64,
}

impl Controller {
    pub fn new(api: Arc<dyn MentionsApi>, config: ControllerConfig) -> Self {
        let (reports_tx, reports_rx) = mpsc::unbounded_channel();
        Self {
            api,
            config,
            state: DashboardState::default(),
            reports_tx,
            reports_rx,
            poller: None,
            generation: 0,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.poller.is_some()
    }

    /// Starts polling: one cycle now, then one per interval. No-op if running.
    pub fn start(&mut self) {
        if self.poller.is_some() {
            return;
        }

        self.generation += 1;
        let generation = self.generation;
        let api = Arc::clone(&self.api);
        let tx = self.reports_tx.clone();
        let ControllerConfig {
            interval, limit, ..
        } = self.config.clone();

        self.poller = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // Counted from cycle start; a slow cycle lets the next one begin right away.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let outcome = fetch_cycle(api.as_ref(), limit).await;
                if tx.send(CycleReport { generation, outcome }).is_err() {
                    break;
                }
            }
        }));

        info!(
            interval_ms = interval.as_millis() as u64,
            limit, "polling started"
        );
    }

    /// Stops polling. Cycles still in flight, or already queued, are dropped.
    pub fn stop(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.abort();
            self.generation += 1;
            info!("polling stopped");
        }
    }

    /// Waits for the next report from the poll task.
    pub async fn next_report(&mut self) -> Option<CycleReport> {
        self.reports_rx.recv().await
    }

    /// Applies every report already waiting. Returns how many were applied.
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(report) = self.reports_rx.try_recv() {
            if self.apply(report) {
                applied += 1;
            }
        }
        applied
    }

    /// Applies a report from the current poll loop. Reports from a stopped
    /// loop are discarded and `false` is returned.
    pub fn apply(&mut self, report: CycleReport) -> bool {
        if self.poller.is_none() || report.generation != self.generation {
            debug!(
                generation = report.generation,
                current = self.generation,
                "discarding report from stopped poller"
            );
            return false;
        }
        self.apply_outcome(report.outcome);
        true
    }

    /// Runs one cycle inline and applies it, whether or not polling is on.
    pub async fn refresh(&mut self) {
        let outcome = self.cycle().await;
        self.apply_outcome(outcome);
    }

    /// One poll cycle that does not borrow the controller, for callers that
    /// run it on another task and hand the result to [`Self::apply_outcome`].
    pub fn cycle(&self) -> impl Future<Output = Result<Snapshot, FetchError>> + Send + 'static {
        let api = Arc::clone(&self.api);
        let limit = self.config.limit;
        async move { fetch_cycle(api.as_ref(), limit).await }
    }

    /// Merges a finished cycle: success replaces everything and clears the
    /// error, failure records the error and keeps the data.
    pub fn apply_outcome(&mut self, outcome: Result<Snapshot, FetchError>) {
        match outcome {
            Ok(Snapshot { mentions, summary }) => {
                debug!(mentions = mentions.len(), total = summary.total_mentions, "cycle applied");
                self.state.replace(mentions, summary);
                self.state.error = None;
            }
            Err(err) => {
                warn!(error = %err, "poll cycle failed, keeping previous data");
                self.state.error = Some(err.to_string());
            }
        }
        self.state.loading = false;
    }

    /// Sends a new mention. On success it is shown at the head of the list
    /// immediately; on failure nothing changes.
    pub async fn submit(&mut self, text: &str) -> Result<&Mention, SubmitError> {
        let created = self.submission(text)?.await?;
        Ok(self.accept_submitted(created))
    }

    /// Validates `text` and returns the creation request without sending it.
    /// Blank text fails here, before anything touches the network.
    pub fn submission(
        &self,
        text: &str,
    ) -> Result<impl Future<Output = Result<Mention, SubmitError>> + Send + 'static, SubmitError> {
        if text.trim().is_empty() {
            return Err(SubmitError::Validation);
        }

        let api = Arc::clone(&self.api);
        let request = NewMention {
            text: text.to_string(),
            source: Some(self.config.source.clone()),
        };
        Ok(async move {
            api.create_mention(&request).await.map_err(|err| {
                warn!(error = %err, "mention rejected");
                SubmitError::from(err)
            })
        })
    }

    /// Puts a mention the backend just accepted at the head of the list.
    pub fn accept_submitted(&mut self, created: Mention) -> &Mention {
        info!(id = %created.id, status = %created.status, "mention submitted");
        self.state.insert_front(created);
        &self.state.mentions[0]
    }

    /// Re-reads one mention and replaces it in place.
    pub async fn refresh_mention(&mut self, id: &str) -> Result<&Mention, ApiError> {
        let mention = self.mention_request(id).await?;
        Ok(self.accept_mention(mention))
    }

    pub fn mention_request(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Mention, ApiError>> + Send + 'static {
        let api = Arc::clone(&self.api);
        let id = id.to_string();
        async move { api.get_mention(&id).await }
    }

    pub fn accept_mention(&mut self, mention: Mention) -> &Mention {
        debug!(id = %mention.id, status = %mention.status, "mention refreshed");
        self.state.upsert(mention)
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.abort();
        }
    }
}
