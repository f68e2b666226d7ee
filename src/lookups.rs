//! Screen-local lookup lists.
//!
//! Lists fetched for the selection screens live here rather than in the
//! draft. Each fetch is issued a ticket; a response arriving for a ticket that
//! has since been superseded or closed is dropped, so a slow page load can
//! never overwrite a newer list. Failures leave the list empty and retryable
//! and never touch the draft.

use crate::api::{ApiError, Client, LookupKind};
use crate::resolver::LookupEntity;
use log::*;
use std::collections::HashMap;

/// Specifying the state of a lookup list.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookupStatus {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Identifies one fetch of a lookup list.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket {
    pub kind: LookupKind,
    id: u64,
}

#[derive(Debug)]
struct Slot {
    ticket: u64,
    status: LookupStatus,
    entities: Vec<LookupEntity>,
}

/// Holds the lookup lists of the screens currently open.
///
#[derive(Debug, Default)]
pub struct LookupBoard {
    next_ticket: u64,
    slots: HashMap<LookupKind, Slot>,
}

impl LookupBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch, superseding any fetch of the same list in flight.
    ///
    pub fn begin(&mut self, kind: LookupKind) -> Ticket {
        self.next_ticket += 1;
        let id = self.next_ticket;
        let slot = self.slots.entry(kind).or_insert_with(|| Slot {
            ticket: id,
            status: LookupStatus::Idle,
            entities: vec![],
        });
        slot.ticket = id;
        slot.status = LookupStatus::Loading;
        Ticket { kind, id }
    }

    /// Apply the result of a fetch. Returns false when the ticket is stale
    /// and the result was dropped.
    ///
    pub fn complete(&mut self, ticket: Ticket, result: Result<Vec<LookupEntity>, ApiError>) -> bool {
        let slot = match self.slots.get_mut(&ticket.kind) {
            Some(slot) if slot.ticket == ticket.id => slot,
            _ => {
                debug!("Dropping stale {} response (ticket {}).", ticket.kind, ticket.id);
                return false;
            }
        };
        match result {
            Ok(entities) => {
                debug!("Loaded {} {} entries.", entities.len(), ticket.kind);
                slot.entities = entities;
                slot.status = LookupStatus::Ready;
            }
            Err(e) => {
                warn!("Failed to load {}: {}", ticket.kind, e);
                slot.entities.clear();
                slot.status = LookupStatus::Failed;
            }
        }
        true
    }

    pub fn entities(&self, kind: LookupKind) -> &[LookupEntity] {
        self.slots
            .get(&kind)
            .map(|slot| slot.entities.as_slice())
            .unwrap_or(&[])
    }

    pub fn status(&self, kind: LookupKind) -> LookupStatus {
        self.slots
            .get(&kind)
            .map(|slot| slot.status)
            .unwrap_or(LookupStatus::Idle)
    }

    pub fn needs_retry(&self, kind: LookupKind) -> bool {
        self.status(kind) == LookupStatus::Failed
    }

    /// Forget a list when its screen closes. Responses still in flight for
    /// it become stale.
    ///
    pub fn close(&mut self, kind: LookupKind) {
        self.slots.remove(&kind);
    }

    /// Fetch several lists concurrently and apply the results.
    ///
    pub async fn refresh(&mut self, client: &Client, requests: &[(LookupKind, Vec<(String, String)>)]) {
        let mut handles = Vec::with_capacity(requests.len());
        for (kind, params) in requests {
            let ticket = self.begin(*kind);
            let client = client.clone();
            let params = params.clone();
            let handle = tokio::spawn(async move {
                let params: Vec<(&str, &str)> = params
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str()))
                    .collect();
                client.lookups(ticket.kind, &params).await
            });
            handles.push((ticket, handle));
        }
        for (ticket, handle) in handles {
            match handle.await {
                Ok(result) => {
                    self.complete(ticket, result);
                }
                Err(e) => {
                    error!("Lookup task for {} failed: {}", ticket.kind, e);
                    self.complete(
                        ticket,
                        Err(ApiError::Unsuccessful {
                            endpoint: ticket.kind.endpoint().to_string(),
                            message: e.to_string(),
                        }),
                    );
                }
            }
        }
    }
}
