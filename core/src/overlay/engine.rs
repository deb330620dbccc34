use chrono::NaiveDateTime;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, mpsc, watch};
use tokio::time::MissedTickBehavior;

use super::handle::{EngineCommand, OverlayHandle, OverlaySnapshot};
use super::resume::scan_log;
use super::tail::LogTail;
use super::update::{OverlayUpdate, UpdateHandler};
use crate::analysis::{ColorSuggestion, DeckAnalyzer, DeckRecommendation};
use crate::draft::{CardId, DraftState, DraftStateMachine, FoldOutcome};
use crate::error::OverlayError;
use crate::log::{LogEvent, classify_line};
use crate::ratings::{ALL_FILTER, CardRating, PackRatings, RatingsProvider};
use pickwatch_types::{ColorAffinityConfig, OverlaySettings};

/// Runtime settings for one [`OverlayEngine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub log_path: PathBuf,
    /// Backup poll cadence when change notifications are missed.
    pub poll_interval: Duration,
    pub resume_enabled: bool,
    /// Replay window in hours. 0 replays the whole file.
    pub lookback_hours: u32,
    pub top_n: usize,
    pub colors: ColorAffinityConfig,
}

impl EngineConfig {
    pub fn new(log_path: impl Into<PathBuf>, settings: &OverlaySettings) -> Self {
        Self {
            log_path: log_path.into(),
            poll_interval: Duration::from_millis(settings.poll_interval_ms.max(1)),
            resume_enabled: settings.resume_enabled,
            lookback_hours: settings.lookback_hours,
            top_n: settings.top_n,
            colors: settings.colors.clone(),
        }
    }
}

/// Tails the game log and turns draft activity into [`OverlayUpdate`]s.
///
/// The engine is the only writer of draft state. Readers go through an
/// [`OverlayHandle`], which sees whole [`OverlaySnapshot`]s published after
/// every fold.
pub struct OverlayEngine {
    config: EngineConfig,
    ratings: Arc<dyn RatingsProvider>,
    analyzer: Arc<dyn DeckAnalyzer>,
    handler: Option<Box<dyn UpdateHandler>>,
    machine: DraftStateMachine,
    selected: Option<ColorSuggestion>,
    current_ratings: Option<PackRatings>,
    /// Updates from the current fold, delivered once its snapshot is published.
    outbox: Vec<OverlayUpdate>,
    shared: Arc<RwLock<OverlaySnapshot>>,
    cmd_tx: mpsc::Sender<EngineCommand>,
    cmd_rx: mpsc::Receiver<EngineCommand>,
}

impl OverlayEngine {
    pub fn new(
        config: EngineConfig,
        ratings: Arc<dyn RatingsProvider>,
        analyzer: Arc<dyn DeckAnalyzer>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        Self {
            config,
            ratings,
            analyzer,
            handler: None,
            machine: DraftStateMachine::new(),
            selected: None,
            current_ratings: None,
            outbox: Vec::new(),
            shared: Arc::new(RwLock::new(OverlaySnapshot::default())),
            cmd_tx,
            cmd_rx,
        }
    }

    /// Replace the update handler. Only one is ever active.
    pub fn set_update_handler(&mut self, handler: impl UpdateHandler + 'static) {
        self.handler = Some(Box::new(handler));
    }

    pub fn handle(&self) -> OverlayHandle {
        OverlayHandle {
            cmd_tx: self.cmd_tx.clone(),
            shared: Arc::clone(&self.shared),
        }
    }

    /// Run until cancelled or stopped.
    ///
    /// Returns `Err(OverlayError::Cancelled)` when `cancel` flips to `true`
    /// and `Ok(())` after a stop command. Failing to open the log or to
    /// subscribe to change notifications is fatal.
    pub async fn start(mut self, mut cancel: watch::Receiver<bool>) -> Result<(), OverlayError> {
        if *cancel.borrow() {
            return Err(OverlayError::Cancelled);
        }

        let path = self.config.log_path.clone();
        let file = tokio::fs::File::open(&path)
            .await
            .map_err(|source| OverlayError::OpenLog {
                path: path.clone(),
                source,
            })?;
        let file_len = file
            .metadata()
            .await
            .map_err(|source| OverlayError::SeekLog {
                path: path.clone(),
                source,
            })?
            .len();
        drop(file);

        let start_offset = if self.config.resume_enabled {
            let scan = scan_log(&path, self.config.lookback_hours)?;
            self.resume(&scan.events).await;
            scan.end_offset
        } else {
            file_len
        };

        let mut tail = LogTail::new(&path, start_offset);
        let (notify_tx, mut notify_rx) = mpsc::channel::<()>(16);
        let _watcher = watch_log(&path, notify_tx)?;

        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cancel_open = true;

        tracing::info!(
            path = %path.display(),
            offset = start_offset,
            poll_ms = self.config.poll_interval.as_millis() as u64,
            "[TAIL] Live monitoring started"
        );

        loop {
            tokio::select! {
                changed = cancel.changed(), if cancel_open => match changed {
                    Ok(()) if *cancel.borrow() => {
                        tracing::info!("[TAIL] Monitoring cancelled");
                        return Err(OverlayError::Cancelled);
                    }
                    Ok(()) => {}
                    // Nobody can cancel any more; keep running until stopped.
                    Err(_) => cancel_open = false,
                },
                Some(cmd) = self.cmd_rx.recv() => match cmd {
                    EngineCommand::Reset => self.reset().await,
                    EngineCommand::Stop => {
                        tracing::info!("[TAIL] Monitoring stopped");
                        return Ok(());
                    }
                },
                Some(()) = notify_rx.recv() => {
                    while notify_rx.try_recv().is_ok() {}
                    self.poll_log(&mut tail).await;
                }
                _ = ticker.tick() => self.poll_log(&mut tail).await,
            }
        }
    }

    // ─── Resume ─────────────────────────────────────────────────────────────

    /// Fold the scanned history without dispatching, then announce whatever
    /// draft is still open as if it had just arrived.
    async fn resume(&mut self, events: &[LogEvent]) {
        let mut rejected = 0usize;
        for event in events {
            if let Err(e) = self.machine.fold(event) {
                rejected += 1;
                tracing::debug!(error = %e, "[RESUME] Skipping unreadable event");
            }
        }

        let active = self
            .machine
            .snapshot()
            .filter(|s| s.event.in_progress && s.current_pack.is_some())
            .cloned();

        let Some(state) = active else {
            tracing::info!(events = events.len(), rejected, "[RESUME] No active draft found");
            self.publish().await;
            return;
        };

        tracing::info!(
            draft_type = ?state.event.draft_type,
            set = %state.event.set_code,
            pack = state.event.current_pack,
            pick = state.event.current_pick,
            picks = state.picks.len(),
            "[RESUME] Resuming active draft"
        );

        self.refresh_colors(&state);
        self.emit(OverlayUpdate::DraftStart {
            timestamp: state.event.start_time,
            state: state.clone(),
        });
        let pack_time = state
            .current_pack
            .as_ref()
            .map_or(state.event.start_time, |p| p.timestamp);
        self.on_pack(&state, pack_time);
        self.publish().await;
        self.deliver();
    }

    // ─── Live ───────────────────────────────────────────────────────────────

    /// Read and fold anything appended since the last call. Safe to call
    /// when nothing changed.
    async fn poll_log(&mut self, tail: &mut LogTail) {
        let lines = match tail.read_lines().await {
            Ok(lines) => lines,
            Err(e) => {
                tracing::warn!(path = %tail.path().display(), error = %e, "[TAIL] Failed to read log");
                return;
            }
        };
        for line in &lines {
            self.process_line(line).await;
        }
    }

    async fn process_line(&mut self, line: &str) {
        let Some(event) = classify_line(line) else {
            return;
        };
        let outcome = match self.machine.fold(&event) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(kind = ?event.kind, error = %e, "[DRAFT] Skipping malformed event");
                return;
            }
        };
        self.dispatch(outcome, event.timestamp);
        self.publish().await;
        self.deliver();
    }

    async fn reset(&mut self) {
        tracing::info!("[DRAFT] State reset");
        self.machine.reset();
        self.selected = None;
        self.current_ratings = None;
        self.publish().await;
    }

    async fn publish(&mut self) {
        let snapshot = OverlaySnapshot {
            draft: self.machine.snapshot().cloned(),
            ratings: self.current_ratings.clone(),
            selected_colors: self.selected.clone(),
        };
        *self.shared.write().await = snapshot;
    }

    // ─── Dispatch ───────────────────────────────────────────────────────────

    fn dispatch(&mut self, outcome: FoldOutcome, timestamp: NaiveDateTime) {
        if outcome.is_noop() {
            return;
        }
        let Some(state) = self.machine.snapshot().cloned() else {
            return;
        };

        if outcome.draft_started {
            self.selected = None;
            self.current_ratings = None;
            self.emit(OverlayUpdate::DraftStart {
                timestamp,
                state: state.clone(),
            });
        }
        if outcome.pick_recorded {
            self.on_pick(&state, timestamp);
        }
        if outcome.pack_installed && state.event.in_progress {
            self.on_pack(&state, timestamp);
        }
        if outcome.completed {
            self.on_complete(&state, timestamp);
        }
    }

    fn on_pack(&mut self, state: &DraftState, timestamp: NaiveDateTime) {
        let Some(pack) = &state.current_pack else {
            return;
        };
        if state.is_sealed() {
            self.refresh_colors(state);
        }

        let ratings = self.ratings.pack_ratings(pack, self.color_filter());
        let best_pick = ratings.best_pick().cloned();
        let top_picks = ratings.top_n(self.config.top_n).to_vec();
        self.current_ratings = Some(ratings.clone());

        self.emit(OverlayUpdate::NewPack {
            timestamp,
            state: state.clone(),
            ratings,
            best_pick,
            top_picks,
            colors: self.selected.clone(),
        });
    }

    fn on_pick(&mut self, state: &DraftState, timestamp: NaiveDateTime) {
        let previous = self.selected.clone();
        self.refresh_colors(state);

        self.emit(OverlayUpdate::PickMade {
            timestamp,
            state: state.clone(),
            pick: state.picks.last().cloned(),
        });

        if self.selected != previous
            && let Some(colors) = self.selected.clone()
        {
            tracing::debug!(colors = %colors.primary(), "[DRAFT] Color selection changed");
            self.emit(OverlayUpdate::ColorRecommendation { timestamp, colors });
        }
    }

    fn on_complete(&mut self, state: &DraftState, timestamp: NaiveDateTime) {
        self.emit(OverlayUpdate::DraftEnd {
            timestamp,
            state: state.clone(),
        });
        let deck = self.recommend_deck(state);
        self.emit(OverlayUpdate::DeckBuilder {
            timestamp,
            state: state.clone(),
            deck,
        });
    }

    fn emit(&mut self, update: OverlayUpdate) {
        self.outbox.push(update);
    }

    fn deliver(&mut self) {
        for update in self.outbox.drain(..) {
            tracing::debug!(kind = ?update.kind(), "[DRAFT] Dispatching update");
            if let Some(handler) = self.handler.as_mut() {
                handler.on_update(update);
            }
        }
    }

    // ─── Collaborators ──────────────────────────────────────────────────────

    fn color_filter(&self) -> &str {
        self.selected
            .as_ref()
            .map(ColorSuggestion::primary)
            .filter(|c| !c.is_empty())
            .unwrap_or(ALL_FILTER)
    }

    /// Recompute the color selection once the pool is big enough. A failed
    /// selection keeps the previous one.
    fn refresh_colors(&mut self, state: &DraftState) {
        let pool = pool_ids(state);
        if pool.len() < self.config.colors.min_cards {
            return;
        }
        match self.analyzer.auto_select_colors(&self.rate(&pool)) {
            Ok(suggestion) => self.selected = Some(suggestion),
            Err(e) => tracing::debug!(error = %e, "[DRAFT] Color selection unavailable"),
        }
    }

    fn recommend_deck(&self, state: &DraftState) -> Option<DeckRecommendation> {
        let pool = self.rate(&pool_ids(state));
        let colors = match &self.selected {
            Some(suggestion) => suggestion.primary().to_string(),
            None => self
                .analyzer
                .auto_select_colors(&pool)
                .inspect_err(|e| tracing::warn!(error = %e, "[DRAFT] No colors for deck"))
                .ok()?
                .primary()
                .to_string(),
        };
        self.analyzer
            .build_deck(&pool, &colors)
            .inspect_err(|e| tracing::warn!(colors = %colors, error = %e, "[DRAFT] Deck build failed"))
            .ok()
    }

    fn rate(&self, card_ids: &[CardId]) -> Vec<CardRating> {
        card_ids
            .iter()
            .filter_map(|&id| self.ratings.card_rating(id, ALL_FILTER).ok())
            .collect()
    }
}

/// Cards the player owns: the picks of a draft, or a sealed pool.
fn pool_ids(state: &DraftState) -> Vec<CardId> {
    if state.is_sealed() {
        state
            .current_pack
            .as_ref()
            .map(|p| p.card_ids.clone())
            .unwrap_or_default()
    } else {
        state.picked_cards()
    }
}

/// Watch the log's directory and nudge the control loop on any change.
fn watch_log(path: &Path, tx: mpsc::Sender<()>) -> Result<RecommendedWatcher, OverlayError> {
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        if let Ok(event) = res
            && matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
        {
            let _ = tx.try_send(());
        }
    })
    .map_err(|source| OverlayError::Watch {
        path: path.to_path_buf(),
        source,
    })?;

    // The game may recreate the file, so watch the directory.
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    watcher
        .watch(dir, RecursiveMode::NonRecursive)
        .map_err(|source| OverlayError::Watch {
            path: dir.to_path_buf(),
            source,
        })?;

    Ok(watcher)
}
