use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use super::connect::{Endpoint, Sender};

struct IdleConnection {
    sender: Sender,
    idle_since: Instant,
}

/// Idle HTTP/1.1 connections kept for keep-alive mode.
pub(super) struct ConnectionPool {
    idle: Mutex<HashMap<Endpoint, Vec<IdleConnection>>>,
    max_idle_per_host: usize,
    idle_timeout: Duration,
}

impl ConnectionPool {
    pub(super) fn new(max_idle_per_host: usize, idle_timeout: Duration) -> Self {
        Self {
            idle: Mutex::new(HashMap::new()),
            max_idle_per_host,
            idle_timeout,
        }
    }

    /// Takes the most recently used live connection for `endpoint`, dropping
    /// expired or closed ones along the way.
    pub(super) fn checkout(&self, endpoint: &Endpoint) -> Option<Sender> {
        let mut idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner);
        let connections = idle.get_mut(endpoint)?;
        while let Some(connection) = connections.pop() {
            if connection.sender.is_closed() {
                continue;
            }
            if connection.idle_since.elapsed() > self.idle_timeout {
                continue;
            }
            return Some(connection.sender);
        }
        None
    }

    /// Returns a connection after its response was fully read.
    pub(super) fn checkin(&self, endpoint: &Endpoint, sender: Sender) {
        if sender.is_closed() || self.max_idle_per_host == 0 {
            return;
        }
        let mut idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner);
        let connections = idle.entry(endpoint.clone()).or_default();
        if connections.len() < self.max_idle_per_host {
            connections.push(IdleConnection {
                sender,
                idle_since: Instant::now(),
            });
        }
    }

    #[cfg(test)]
    pub(super) fn idle_count(&self, endpoint: &Endpoint) -> usize {
        let idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner);
        idle.get(endpoint).map_or(0, Vec::len)
    }
}
