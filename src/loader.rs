//! Progressive loader.
//!
//! Drives a [`DataProvider`] through one load session: metadata first,
//! then rows in small sub-chunks that are published as they arrive, so the
//! table fills in visibly instead of blocking on one large fetch. After
//! the initial target is reached, scrolling near the end of the loaded set
//! pulls further chunks on demand.
//!
//! ## Session lifecycle
//!
//! ```text
//! Idle → MetadataLoading → InitialLoading → Ready ⇄ LoadingMore
//!                 \________________\____________\→ Error
//! ```
//!
//! Every reset (start, retry, sheet switch) bumps a generation counter and
//! clears the row buffer *before* any new fetch begins. In-flight fetches
//! are never cancelled; instead each fetch captures the generation at
//! start, and a chunk that resolves under a stale generation is discarded
//! rather than appended. That closes the stale-write race without needing
//! cancellable I/O.
//!
//! At most one fetch is in flight at a time; `load_more` while anything is
//! loading is a no-op.

use crate::constants::{INITIAL_ROW_CAP, LOAD_MORE_MARGIN, LOAD_MORE_ROWS, SUB_CHUNK_ROWS};
use crate::error::{DataError, DataResult};
use crate::provider::DataProvider;
use crate::view::TableViewModel;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Load-session phase, published with every progress update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum LoadPhase {
    #[default]
    Idle,
    MetadataLoading,
    InitialLoading,
    Ready,
    LoadingMore,
    Error,
}

/// Progress contract consumed by the shell's indicators.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Progress {
    pub loaded_rows: usize,
    pub total_rows: usize,
    pub loading_more: bool,
    pub error: Option<String>,
    pub phase: LoadPhase,
}

/// Loader pacing knobs. The source viewers hardcoded different values at
/// different call sites; here they are configuration with one default.
#[derive(Clone, Copy, Debug)]
pub struct LoaderConfig {
    /// Rows loaded before the session is Ready
    pub initial_row_cap: usize,
    /// Rows per sub-chunk during the initial load
    pub sub_chunk_rows: usize,
    /// Rows per "load more" chunk
    pub load_more_rows: usize,
    /// Trigger distance from the end of the loaded set
    pub load_more_margin: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            initial_row_cap: INITIAL_ROW_CAP,
            sub_chunk_rows: SUB_CHUNK_ROWS,
            load_more_rows: LOAD_MORE_ROWS,
            load_more_margin: LOAD_MORE_MARGIN,
        }
    }
}

struct LoaderState {
    phase: LoadPhase,
    error: Option<String>,
    active_sheet: usize,
}

/// Orchestrates progressive loading of one provider into one view model.
pub struct ProgressiveLoader {
    provider: Arc<dyn DataProvider>,
    view: Arc<RwLock<TableViewModel>>,
    config: LoaderConfig,
    /// Bumped on every reset; stale fetches check it before appending
    generation: AtomicU64,
    state: Mutex<LoaderState>,
    progress_tx: watch::Sender<Progress>,
}

impl ProgressiveLoader {
    pub fn new(provider: Arc<dyn DataProvider>, config: LoaderConfig) -> Self {
        let (progress_tx, _) = watch::channel(Progress::default());
        Self {
            provider,
            view: Arc::new(RwLock::new(TableViewModel::new())),
            config,
            generation: AtomicU64::new(0),
            state: Mutex::new(LoaderState {
                phase: LoadPhase::Idle,
                error: None,
                active_sheet: 0,
            }),
            progress_tx,
        }
    }

    /// The view model this loader appends into. The renderer reads it;
    /// all mutation goes through the loader.
    pub fn view(&self) -> Arc<RwLock<TableViewModel>> {
        self.view.clone()
    }

    /// Subscribe to progress updates.
    pub fn progress(&self) -> watch::Receiver<Progress> {
        self.progress_tx.subscribe()
    }

    /// Current progress snapshot.
    pub fn snapshot(&self) -> Progress {
        self.progress_tx.borrow().clone()
    }

    pub fn phase(&self) -> LoadPhase {
        self.state.lock().phase
    }

    /// Discard the session: bump the generation, clear the row buffer and
    /// all view state, return to Idle. Completes before this returns, so
    /// no stale chunk can land after it.
    pub fn reset(&self) -> u64 {
        let mut state = self.state.lock();
        // Bumping under the state lock keeps the bump and the buffer clear
        // atomic with respect to append_chunk, which holds the same lock.
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        state.phase = LoadPhase::Idle;
        state.error = None;
        self.view.write().reset();
        self.publish(&state);
        drop(state);
        debug!(generation, "loader reset");
        generation
    }

    /// Start (or restart) loading from scratch. Any previous session's
    /// buffer is discarded first.
    pub async fn start(&self) -> DataResult<()> {
        let generation = self.reset();
        self.run_session(generation).await
    }

    /// Switch the active sheet and reload against the same provider.
    ///
    /// The reset fully completes (buffer and view state cleared) before
    /// the provider is asked to switch, so a chunk from the previous sheet
    /// resolving late can never be appended to the new one.
    pub async fn switch_sheet(&self, index: usize) -> DataResult<()> {
        let generation = self.reset();
        self.state.lock().active_sheet = index;
        if let Err(err) = self.provider.switch_sheet(index) {
            return self.fail(generation, err);
        }
        self.run_session(generation).await
    }

    /// Fetch the next chunk if the session is Ready and rows remain.
    ///
    /// Returns `Ok(true)` when a chunk was fetched and appended. Calls
    /// while another load is in flight (or before the session is Ready)
    /// are no-ops.
    pub async fn load_more(&self) -> DataResult<bool> {
        let generation = self.generation.load(Ordering::SeqCst);
        let (offset, total) = {
            let mut state = self.state.lock();
            if state.phase != LoadPhase::Ready {
                return Ok(false);
            }
            let (loaded, total) = {
                let view = self.view.read();
                (view.loaded_rows(), view.total_rows())
            };
            if loaded >= total {
                return Ok(false);
            }
            state.phase = LoadPhase::LoadingMore;
            self.publish(&state);
            (loaded, total)
        };

        let want = self.config.load_more_rows.min(total - offset);
        let rows = match self.provider.load_data(offset, want) {
            Ok(rows) => rows,
            Err(err) => return self.fail(generation, err).map(|_| false),
        };

        let appended = self.append_chunk(generation, rows);
        if appended {
            self.transition(generation, LoadPhase::Ready);
        }
        Ok(appended)
    }

    /// One full session: metadata, then the initial chunked load.
    async fn run_session(&self, generation: u64) -> DataResult<()> {
        self.transition(generation, LoadPhase::MetadataLoading);
        let metadata = match self.provider.load_metadata() {
            Ok(m) => m,
            Err(err) => return self.fail(generation, err),
        };

        {
            let mut state = self.state.lock();
            if self.generation.load(Ordering::SeqCst) != generation {
                return Ok(());
            }
            let active_sheet = state.active_sheet;
            self.view.write().install_metadata(&metadata, active_sheet);
            state.phase = LoadPhase::InitialLoading;
            self.publish(&state);
        }

        let target = self.config.initial_row_cap.min(metadata.num_rows);
        let mut loaded = 0;
        while loaded < target {
            let want = self.config.sub_chunk_rows.min(target - loaded);
            let rows = match self.provider.load_data(loaded, want) {
                Ok(rows) => rows,
                Err(err) => return self.fail(generation, err),
            };
            let got = rows.len();
            if !self.append_chunk(generation, rows) {
                return Ok(());
            }
            loaded += got;
            if got < want {
                // Provider ran dry before the metadata row count; publish
                // what exists rather than spinning.
                break;
            }
            // Hand control back to the scheduler between sub-chunks so the
            // renderer can paint the rows that just landed.
            tokio::task::yield_now().await;
        }

        self.transition(generation, LoadPhase::Ready);
        Ok(())
    }

    /// Append a resolved chunk unless the session it belongs to has been
    /// superseded. Returns false when the chunk was discarded.
    fn append_chunk(&self, generation: u64, rows: Vec<crate::provider::Row>) -> bool {
        let state = self.state.lock();
        if self.generation.load(Ordering::SeqCst) != generation {
            warn!(
                generation,
                discarded_rows = rows.len(),
                "discarding chunk from superseded session"
            );
            return false;
        }
        self.view.write().append_rows(rows);
        self.publish(&state);
        true
    }

    fn transition(&self, generation: u64, phase: LoadPhase) {
        let mut state = self.state.lock();
        if self.generation.load(Ordering::SeqCst) != generation {
            return;
        }
        state.phase = phase;
        self.publish(&state);
    }

    /// Record a failure for the current session. Stale sessions swallow
    /// their errors; the newer session owns the state now.
    fn fail(&self, generation: u64, err: DataError) -> DataResult<()> {
        let mut state = self.state.lock();
        if self.generation.load(Ordering::SeqCst) != generation {
            warn!(generation, %err, "error from superseded session");
            return Ok(());
        }
        state.phase = LoadPhase::Error;
        state.error = Some(match &err {
            // Parse errors already carry the format name.
            DataError::Parse { .. } => err.to_string(),
            other => format!("{}: {}", self.provider.format_name(), other),
        });
        self.publish(&state);
        drop(state);
        Err(err)
    }

    fn publish(&self, state: &LoaderState) {
        let view = self.view.read();
        self.progress_tx.send_replace(Progress {
            loaded_rows: view.loaded_rows(),
            total_rows: view.total_rows(),
            loading_more: state.phase == LoadPhase::LoadingMore,
            error: state.error.clone(),
            phase: state.phase,
        });
    }
}
