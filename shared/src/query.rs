//! Keyed snapshot cache for the two collections.
//!
//! A [`Query`] never talks to the store itself. Callers ask it for a
//! [`FetchTicket`], run the list call however their executor allows, and hand
//! the outcome back through [`Query::resolve`]. That keeps the cache usable
//! from an Elm-style update loop as well as from plain async code.

use std::fmt;

use crate::model::{Finance, Task};
use crate::store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Tasks,
    Finances,
}

impl QueryKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKey::Tasks => "tasks",
            QueryKey::Finances => "finances",
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Proof that a fetch was issued. Only the latest ticket for a key is honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    key: QueryKey,
    generation: u64,
}

impl FetchTicket {
    pub fn key(&self) -> QueryKey {
        self.key
    }
}

/// What a screen renders from.
#[derive(Debug)]
pub struct QueryStatus<'a, T> {
    pub data: Option<&'a [T]>,
    pub error: Option<&'a StoreError>,
    /// No snapshot and no error yet.
    pub is_loading: bool,
    /// A fetch is in flight, possibly behind a stale snapshot.
    pub is_fetching: bool,
    pub is_error: bool,
}

#[derive(Debug)]
pub struct Query<T> {
    key: QueryKey,
    data: Option<Vec<T>>,
    error: Option<StoreError>,
    stale: bool,
    in_flight: Option<u64>,
    generation: u64,
    invalidations: u64,
}

impl<T> Query<T> {
    pub fn new(key: QueryKey) -> Self {
        Self {
            key,
            data: None,
            error: None,
            stale: true,
            in_flight: None,
            generation: 0,
            invalidations: 0,
        }
    }

    pub fn key(&self) -> QueryKey {
        self.key
    }

    pub fn needs_fetch(&self) -> bool {
        self.stale && self.in_flight.is_none()
    }

    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        if !self.needs_fetch() {
            return None;
        }
        self.generation += 1;
        self.in_flight = Some(self.generation);
        tracing::debug!(key = %self.key, generation = self.generation, "fetch issued");
        Some(FetchTicket {
            key: self.key,
            generation: self.generation,
        })
    }

    /// Applies a finished fetch. Returns `false` when the ticket was
    /// superseded and the result dropped.
    pub fn resolve(&mut self, ticket: FetchTicket, result: Result<Vec<T>, StoreError>) -> bool {
        if ticket.key != self.key || self.in_flight != Some(ticket.generation) {
            tracing::debug!(
                key = %self.key,
                generation = ticket.generation,
                "dropping superseded fetch result"
            );
            return false;
        }
        self.in_flight = None;
        self.stale = false;
        match result {
            Ok(records) => {
                tracing::debug!(key = %self.key, count = records.len(), "snapshot refreshed");
                self.data = Some(records);
                self.error = None;
            }
            Err(err) => {
                tracing::warn!(key = %self.key, %err, "fetch failed");
                self.error = Some(err);
            }
        }
        true
    }

    /// Marks the snapshot stale. A fetch already in flight is retired so the
    /// next read goes back to the store.
    pub fn invalidate(&mut self) {
        self.invalidations += 1;
        self.stale = true;
        if let Some(generation) = self.in_flight.take() {
            tracing::debug!(key = %self.key, generation, "in-flight fetch superseded");
        }
        tracing::debug!(key = %self.key, "snapshot invalidated");
    }

    /// A screen showing this key was (re)mounted: refetch on next read.
    /// Does not count as an invalidation.
    pub fn mount(&mut self) {
        self.stale = true;
    }

    pub fn invalidations(&self) -> u64 {
        self.invalidations
    }

    pub fn data(&self) -> Option<&[T]> {
        self.data.as_deref()
    }

    pub fn status(&self) -> QueryStatus<'_, T> {
        QueryStatus {
            data: self.data.as_deref(),
            error: self.error.as_ref(),
            is_loading: self.data.is_none() && self.error.is_none(),
            is_fetching: self.in_flight.is_some(),
            is_error: self.error.is_some(),
        }
    }
}

/// The application's cache, built once at the composition root and passed
/// down to whatever needs it.
#[derive(Debug)]
pub struct QueryClient {
    tasks: Query<Task>,
    finances: Query<Finance>,
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryClient {
    pub fn new() -> Self {
        Self {
            tasks: Query::new(QueryKey::Tasks),
            finances: Query::new(QueryKey::Finances),
        }
    }

    pub fn tasks(&self) -> &Query<Task> {
        &self.tasks
    }

    pub fn tasks_mut(&mut self) -> &mut Query<Task> {
        &mut self.tasks
    }

    pub fn finances(&self) -> &Query<Finance> {
        &self.finances
    }

    pub fn finances_mut(&mut self) -> &mut Query<Finance> {
        &mut self.finances
    }

    pub fn invalidate(&mut self, key: QueryKey) {
        match key {
            QueryKey::Tasks => self.tasks.invalidate(),
            QueryKey::Finances => self.finances.invalidate(),
        }
    }

    pub fn mount(&mut self, key: QueryKey) {
        match key {
            QueryKey::Tasks => self.tasks.mount(),
            QueryKey::Finances => self.finances.mount(),
        }
    }

    pub fn needs_fetch(&self, key: QueryKey) -> bool {
        match key {
            QueryKey::Tasks => self.tasks.needs_fetch(),
            QueryKey::Finances => self.finances.needs_fetch(),
        }
    }

    pub fn invalidations(&self, key: QueryKey) -> u64 {
        match key {
            QueryKey::Tasks => self.tasks.invalidations(),
            QueryKey::Finances => self.finances.invalidations(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> Query<u32> {
        Query::new(QueryKey::Tasks)
    }

    #[test]
    fn only_one_fetch_in_flight() {
        let mut q = query();
        assert!(q.status().is_loading);
        let ticket = q.begin_fetch().expect("first fetch");
        assert!(q.begin_fetch().is_none());
        assert!(q.status().is_fetching);

        assert!(q.resolve(ticket, Ok(vec![1, 2, 3])));
        assert_eq!(q.data(), Some(&[1, 2, 3][..]));
        assert!(!q.needs_fetch());
        assert!(q.begin_fetch().is_none());
    }

    #[test]
    fn stale_snapshot_stays_visible_while_refetching() {
        let mut q = query();
        let ticket = q.begin_fetch().unwrap();
        q.resolve(ticket, Ok(vec![1]));

        q.invalidate();
        let refetch = q.begin_fetch().expect("refetch after invalidation");
        let status = q.status();
        assert_eq!(status.data, Some(&[1][..]));
        assert!(!status.is_loading);
        assert!(status.is_fetching);

        q.resolve(refetch, Ok(vec![1, 2]));
        assert_eq!(q.data(), Some(&[1, 2][..]));
    }

    #[test]
    fn invalidation_supersedes_in_flight_fetch() {
        let mut q = query();
        let first = q.begin_fetch().unwrap();
        q.invalidate();
        let second = q.begin_fetch().expect("fresh ticket");

        assert!(q.resolve(second, Ok(vec![2])));
        assert!(!q.resolve(first, Ok(vec![1])));
        assert_eq!(q.data(), Some(&[2][..]));
    }

    #[test]
    fn each_invalidation_is_counted() {
        let mut client = QueryClient::new();
        client.invalidate(QueryKey::Tasks);
        client.invalidate(QueryKey::Tasks);
        assert_eq!(client.invalidations(QueryKey::Tasks), 2);
        assert_eq!(client.invalidations(QueryKey::Finances), 0);
    }

    #[test]
    fn failed_fetch_keeps_previous_data_and_waits_for_remount() {
        let mut q = query();
        let ticket = q.begin_fetch().unwrap();
        q.resolve(ticket, Ok(vec![7]));
        q.invalidate();
        let ticket = q.begin_fetch().unwrap();
        q.resolve(ticket, Err(StoreError::Unavailable("offline".into())));

        let status = q.status();
        assert!(status.is_error);
        assert_eq!(status.data, Some(&[7][..]));
        assert!(!q.needs_fetch());

        q.mount();
        let ticket = q.begin_fetch().expect("remount retries");
        q.resolve(ticket, Ok(vec![8]));
        assert!(!q.status().is_error);
        assert_eq!(q.invalidations(), 1);
    }

    #[test]
    fn ticket_for_other_key_is_ignored() {
        let mut tasks: Query<u32> = Query::new(QueryKey::Tasks);
        let mut finances: Query<u32> = Query::new(QueryKey::Finances);
        let _ = tasks.begin_fetch().unwrap();
        let finance_ticket = finances.begin_fetch().unwrap();
        assert_eq!(finance_ticket.key(), QueryKey::Finances);
        assert!(!tasks.resolve(finance_ticket, Ok(vec![1])));
    }
}
