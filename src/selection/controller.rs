use crate::api::backend::CharityBackend;
use crate::api::models::{Charity, CharityKey, UserProfile};
use crate::error::AppError;
use crate::session::Session;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

use super::state::SelectionState;

/// Progress of one initial fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchState {
    Idle,
    Loading,
    Ready,
    Failed(AppError),
}

impl BranchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, BranchState::Loading)
    }

    pub fn error(&self) -> Option<&AppError> {
        match self {
            BranchState::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Overall controller state derived from the two branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Ready,
    Error,
}

/// A selection whose remote write failed. The local selection is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionWarning {
    pub charity: CharityKey,
    pub error: AppError,
}

enum Event {
    Catalog {
        generation: u64,
        result: Result<Vec<Charity>, AppError>,
    },
    Profile {
        generation: u64,
        result: Result<UserProfile, AppError>,
    },
    Persisted {
        charity: CharityKey,
        result: Result<(), AppError>,
    },
}

/// Keeps the charity catalog, the search box and the user's selection
/// consistent with each other and with the backend.
///
/// Network calls run on worker threads and report back through an event
/// queue; all state changes happen on the thread that owns the controller,
/// when it calls [`poll`](Self::poll), [`wait_until`](Self::wait_until) or
/// [`wait_idle`](Self::wait_idle). Dropping the controller closes the queue,
/// so results that arrive afterwards are discarded.
pub struct CharitySelectionController<B: CharityBackend> {
    backend: Arc<B>,
    session: Session,
    catalog: Vec<Charity>,
    state: SelectionState,
    profile: Option<UserProfile>,
    catalog_state: BranchState,
    profile_state: BranchState,
    // Bumped by every initialize(); results tagged with an older generation are stale.
    generation: u64,
    // Set once the user selects during the current generation.
    selection_touched: bool,
    in_flight: usize,
    pending_writes: usize,
    warnings: Vec<SelectionWarning>,
    // Counts worker results that found the queue closed.
    discarded: Arc<AtomicUsize>,
    events_tx: Sender<Event>,
    events_rx: Receiver<Event>,
}

impl<B: CharityBackend> CharitySelectionController<B> {
    pub fn new(backend: Arc<B>, session: Session) -> Self {
        let (events_tx, events_rx) = mpsc::channel();

        CharitySelectionController {
            backend,
            session,
            catalog: Vec::new(),
            state: SelectionState::new(),
            profile: None,
            catalog_state: BranchState::Idle,
            profile_state: BranchState::Idle,
            generation: 0,
            selection_touched: false,
            in_flight: 0,
            pending_writes: 0,
            warnings: Vec::new(),
            discarded: Arc::new(AtomicUsize::new(0)),
            events_tx,
            events_rx,
        }
    }

    /// Starts the catalog and profile fetches. Calling it again refetches both.
    pub fn initialize(&mut self) {
        self.generation += 1;
        self.selection_touched = false;
        self.catalog_state = BranchState::Loading;
        self.profile_state = BranchState::Loading;

        let generation = self.generation;
        debug!(generation, user = self.session.user(), "initializing charity selection");

        self.spawn(move |backend, _| Event::Catalog {
            generation,
            result: backend.fetch_catalog(),
        });
        self.spawn(move |backend, session| Event::Profile {
            generation,
            result: backend.fetch_profile(session),
        });
    }

    /// Filters the visible rows by `term`. Never touches the catalog.
    pub fn search(&mut self, term: &str) {
        self.state.search(term, &self.catalog);
    }

    /// Selects `charity` right away and writes it to the backend in the
    /// background. Charities outside the loaded catalog are rejected without
    /// changing anything.
    pub fn select(&mut self, charity: CharityKey) -> Result<(), AppError> {
        if !self.catalog.iter().any(|c| c.key() == charity) {
            return Err(AppError::UnknownCharity(charity.to_string()));
        }

        self.state.selected = Some(charity.clone());
        self.selection_touched = true;
        if let Some(profile) = self.profile.as_mut() {
            profile.charity = Some(charity.clone());
        }

        let profile = self.profile.clone();
        self.pending_writes += 1;
        self.spawn(move |backend, session| Event::Persisted {
            result: backend.persist_selection(session, profile.as_ref(), &charity),
            charity,
        });

        Ok(())
    }

    /// Applies every event that has already arrived. Returns how many were applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Blocks, applying events as they arrive, until `done` holds or nothing
    /// is left in flight.
    pub fn wait_until<F>(&mut self, done: F)
    where
        F: Fn(&Self) -> bool,
    {
        self.poll();
        while !done(self) && self.in_flight > 0 {
            match self.events_rx.recv() {
                Ok(event) => self.apply(event),
                Err(_) => break,
            }
        }
    }

    /// Blocks until both initial fetches have settled.
    pub fn wait_for_load(&mut self) {
        self.wait_until(|c| !c.catalog_state.is_loading() && !c.profile_state.is_loading());
    }

    /// Blocks until every fetch and write has finished.
    pub fn wait_idle(&mut self) {
        self.wait_until(|_| false);
    }

    /// Tears the controller down; results still in flight are dropped.
    pub fn dispose(self) {
        debug!(
            in_flight = self.in_flight,
            user = self.session.user(),
            "disposing charity selection"
        );
    }

    pub fn selected(&self) -> Option<&CharityKey> {
        self.state.selected.as_ref()
    }

    pub fn selected_charity(&self) -> Option<&Charity> {
        let selected = self.state.selected.as_ref()?;
        self.catalog.iter().find(|c| c.key() == *selected)
    }

    pub fn is_selected(&self, charity: &Charity) -> bool {
        self.state.is_selected(charity)
    }

    pub fn search_term(&self) -> &str {
        &self.state.search_term
    }

    pub fn visible(&self) -> &[Charity] {
        &self.state.visible
    }

    pub fn catalog(&self) -> &[Charity] {
        &self.catalog
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn catalog_state(&self) -> &BranchState {
        &self.catalog_state
    }

    pub fn profile_state(&self) -> &BranchState {
        &self.profile_state
    }

    pub fn phase(&self) -> Phase {
        let branches = [&self.catalog_state, &self.profile_state];
        if branches.iter().any(|b| matches!(b, BranchState::Idle | BranchState::Loading)) {
            Phase::Loading
        } else if branches.iter().any(|b| b.error().is_some()) {
            Phase::Error
        } else {
            Phase::Ready
        }
    }

    pub fn pending_writes(&self) -> usize {
        self.pending_writes
    }

    pub fn warnings(&self) -> &[SelectionWarning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<SelectionWarning> {
        std::mem::take(&mut self.warnings)
    }

    fn spawn<F>(&mut self, task: F)
    where
        F: FnOnce(&B, &Session) -> Event + Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        let session = self.session.clone();
        let events = self.events_tx.clone();
        let discarded = Arc::clone(&self.discarded);
        self.in_flight += 1;

        thread::spawn(move || {
            let event = task(&*backend, &session);
            if events.send(event).is_err() {
                discarded.fetch_add(1, Ordering::SeqCst);
                debug!(user = session.user(), "controller gone, discarding late result");
            }
        });
    }

    fn apply(&mut self, event: Event) {
        self.in_flight = self.in_flight.saturating_sub(1);

        match event {
            Event::Catalog { generation, result } => {
                if generation != self.generation {
                    debug!(generation, current = self.generation, "discarding stale catalog");
                    return;
                }
                match result {
                    Ok(catalog) => {
                        debug!(charities = catalog.len(), "catalog loaded");
                        self.catalog = catalog;
                        self.catalog_state = BranchState::Ready;
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to load charity catalog");
                        self.catalog.clear();
                        self.catalog_state = BranchState::Failed(e);
                    }
                }
                self.state.refresh(&self.catalog);
            }
            Event::Profile { generation, result } => {
                if generation != self.generation {
                    debug!(generation, current = self.generation, "discarding stale profile");
                    return;
                }
                match result {
                    Ok(mut profile) => {
                        if self.selection_touched {
                            // The user picked while the profile was loading; keep their choice.
                            profile.charity = self.state.selected.clone();
                        } else {
                            self.state.selected = profile.charity.clone();
                        }
                        debug!(charity = ?profile.charity, "profile loaded");
                        self.profile = Some(profile);
                        self.profile_state = BranchState::Ready;
                    }
                    Err(e) => {
                        warn!(error = %e, user = self.session.user(), "failed to load user profile");
                        self.profile_state = BranchState::Failed(e);
                    }
                }
            }
            Event::Persisted { charity, result } => {
                self.pending_writes = self.pending_writes.saturating_sub(1);
                match result {
                    Ok(()) => info!(charity = %charity, "charity selection saved"),
                    Err(error) => {
                        warn!(charity = %charity, error = %error, "failed to save charity selection");
                        self.warnings.push(SelectionWarning { charity, error });
                    }
                }
            }
        }
    }
}
