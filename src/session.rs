//! In-process conversation memory.
//!
//! Bounded per-session exchange history giving the composer short-term
//! context. Process-lifetime only: sessions are conversational scratch, not
//! an audit log, so losing them on restart is fine. Concurrent appends to
//! the same session are serialized by the store lock; across processes the
//! store is not shared at all.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::Exchange;

pub struct SessionStore {
    max_exchanges: usize,
    sessions: Mutex<HashMap<String, Vec<Exchange>>>,
}

impl SessionStore {
    pub fn new(max_exchanges: usize) -> Self {
        Self {
            max_exchanges,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// The session's exchanges in insertion order. Unknown sessions read as
    /// empty; the entry is only created on first append.
    pub fn history(&self, session_id: &str) -> Vec<Exchange> {
        let sessions = self.sessions.lock().expect("session lock poisoned");
        sessions.get(session_id).cloned().unwrap_or_default()
    }

    /// Append one exchange, evicting the oldest beyond the cap.
    pub fn append(&self, session_id: &str, exchange: Exchange) {
        let mut sessions = self.sessions.lock().expect("session lock poisoned");
        let history = sessions.entry(session_id.to_string()).or_default();
        history.push(exchange);
        if history.len() > self.max_exchanges {
            let excess = history.len() - self.max_exchanges;
            history.drain(..excess);
        }
    }
}
