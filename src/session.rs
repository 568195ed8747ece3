use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::FetchError;
use crate::models::{PageResult, SearchEntry, StoryHit};
use crate::search_cache::SearchCache;
use crate::sort_view::{self, SortKey, SortState};

/// Handed out for every fetch the session allows. A completion is only
/// applied when its ticket is still the outstanding one for its term and was
/// issued in the current epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub term: String,
    pub page: u32,
    request_id: u64,
    epoch: u64,
}

/// All state behind the browser window: the cache, what is typed, what is
/// shown, how it is sorted and which fetches are outstanding.
#[derive(Debug)]
pub struct SearchSession {
    cache: SearchCache,
    input: String,
    active_term: String,
    sort: SortState,
    last_error: Option<FetchError>,
    // term -> request id of its outstanding fetch
    in_flight: HashMap<String, u64>,
    next_request_id: u64,
    epoch: u64,
}

impl SearchSession {
    pub fn new(initial_input: impl Into<String>) -> Self {
        Self {
            cache: SearchCache::new(),
            input: initial_input.into(),
            active_term: String::new(),
            sort: SortState::default(),
            last_error: None,
            in_flight: HashMap::new(),
            next_request_id: 0,
            epoch: 0,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn active_term(&self) -> &str {
        &self.active_term
    }

    pub fn sort_state(&self) -> SortState {
        self.sort
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    pub fn cache(&self) -> &SearchCache {
        &self.cache
    }

    /// Makes the typed input the active term. Returns a ticket for page 0 if
    /// the term has never been fetched.
    pub fn submit(&mut self) -> Option<FetchTicket> {
        if self.input.is_empty() {
            return None;
        }

        self.activate(self.input.clone());
        self.last_error = None;

        if self.cache.needs_fetch(&self.active_term) {
            let term = self.active_term.clone();
            self.begin_fetch(&term, 0)
        } else {
            debug!(term = %self.active_term, "search served from cache");
            None
        }
    }

    pub fn activate(&mut self, term: String) {
        debug!(%term, "activated search term");
        self.active_term = term;
    }

    /// Ticket for the page after the active term's last one. A term with no
    /// data yet starts at page 0.
    pub fn request_more(&mut self) -> Option<FetchTicket> {
        if self.active_term.is_empty() {
            return None;
        }

        let term = self.active_term.clone();
        let page = if self.cache.needs_fetch(&term) {
            0
        } else {
            let last = self.cache.current_page(&term);
            match last.checked_add(1) {
                Some(next) => next,
                None => {
                    warn!(term = %term, page = last, "no page after the last one reported");
                    return None;
                }
            }
        };
        self.begin_fetch(&term, page)
    }

    /// Registers an outstanding fetch for `term`. Rejected while another fetch
    /// for the same term has not completed.
    pub fn begin_fetch(&mut self, term: &str, page: u32) -> Option<FetchTicket> {
        if self.in_flight.contains_key(term) {
            warn!(term, page, "fetch already in flight, rejecting");
            return None;
        }

        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.in_flight.insert(term.to_string(), request_id);

        debug!(term, page, request_id, "fetch started");
        Some(FetchTicket {
            term: term.to_string(),
            page,
            request_id,
            epoch: self.epoch,
        })
    }

    /// Applies a finished fetch. Returns false, changing nothing, when the
    /// ticket was cancelled or belongs to a closed session.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<PageResult, FetchError>,
    ) -> bool {
        if ticket.epoch != self.epoch
            || self.in_flight.get(&ticket.term) != Some(&ticket.request_id)
        {
            debug!(term = %ticket.term, request_id = ticket.request_id, "ignoring stale fetch");
            return false;
        }
        self.in_flight.remove(&ticket.term);

        match result {
            Ok(page) => self.cache.merge(&ticket.term, page),
            Err(err) => {
                warn!(term = %ticket.term, page = ticket.page, error = %err, "fetch failed");
                self.last_error = Some(err);
            }
        }
        true
    }

    /// Forgets all outstanding fetches; their completions will be ignored.
    pub fn cancel_pending(&mut self) {
        if !self.in_flight.is_empty() {
            debug!(count = self.in_flight.len(), "cancelled pending fetches");
        }
        self.in_flight.clear();
    }

    /// Marks the owning view as gone. Nothing issued before this call can
    /// change the session afterwards.
    #[allow(dead_code)]
    pub fn close(&mut self) {
        self.epoch += 1;
        self.in_flight.clear();
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.contains_key(&self.active_term)
    }

    /// True while any term still has a fetch outstanding.
    pub fn has_pending(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn dismiss(&mut self, id: &str) {
        self.cache.dismiss(&self.active_term, id);
    }

    pub fn toggle_sort(&mut self, column: SortKey) {
        self.sort.toggle(column);
    }

    pub fn active_entry(&self) -> Option<&SearchEntry> {
        self.cache.entry(&self.active_term)
    }

    pub fn display_list(&self) -> Vec<StoryHit> {
        sort_view::project(self.active_entry(), self.sort)
    }

    pub fn current_page(&self) -> u32 {
        self.cache.current_page(&self.active_term)
    }
}
