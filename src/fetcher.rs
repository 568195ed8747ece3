use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;

use tracing::debug;

use crate::error::FetchError;
use crate::hn_client::StorySource;
use crate::models::PageResult;
use crate::session::FetchTicket;

pub struct FetchOutcome {
    pub ticket: FetchTicket,
    pub result: Result<PageResult, FetchError>,
}

/// Runs each fetch on its own thread and funnels the outcomes back through a
/// single channel that the UI drains once per frame.
pub struct FetchWorker {
    source: Arc<dyn StorySource>,
    tx: Sender<FetchOutcome>,
    rx: Receiver<FetchOutcome>,
}

impl FetchWorker {
    pub fn new(source: Arc<dyn StorySource>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { source, tx, rx }
    }

    pub fn spawn(&self, ticket: FetchTicket) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();

        thread::spawn(move || {
            let result = source.fetch_page(&ticket.term, ticket.page);
            // The receiver is gone once the window closes; nothing to report to.
            if tx.send(FetchOutcome { ticket, result }).is_err() {
                debug!("fetch finished after the browser shut down");
            }
        });
    }

    /// Outcomes that have arrived since the last call, without blocking.
    pub fn drain(&self) -> Vec<FetchOutcome> {
        let mut outcomes = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(outcome) => outcomes.push(outcome),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        outcomes
    }
}
