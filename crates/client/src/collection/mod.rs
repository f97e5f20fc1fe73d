//! Collection state: local mirrors of the server-held cart and wishlist.
//!
//! # Synchronization model
//!
//! - The server is authoritative. Every successful mutation is followed by a
//!   full re-read; nothing is inserted, merged or removed locally. The one
//!   exception is `clear`, whose result is known (empty).
//! - A mirror is keyed by the identity that owns it. Changing identity bumps
//!   an epoch and empties the mirror; reads that were issued under an older
//!   epoch are discarded when they resolve.
//! - Overlapping reads under the same identity are not deduplicated. The last
//!   one to resolve wins.
//! - Derived values (`count`, `total`) are recomputed from the mirror on every
//!   call.
//!
//! The backend is abstracted behind [`CartBackend`] / [`WishlistBackend`] so
//! the synchronization logic can run against in-memory fakes.

mod cart;
mod wishlist;

#[cfg(test)]
pub(crate) mod fake;

pub use cart::{CartBackend, CartState};
pub use wishlist::{WishlistBackend, WishlistState};

use std::sync::{Mutex, MutexGuard, PoisonError};

use shopfront_core::Identity;
use tracing::debug;

use crate::routes::{self, Access, Requirement};

/// Identifies the identity epoch a request was issued under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Ticket {
    epoch: u64,
}

/// Items plus the bookkeeping needed to accept or discard responses.
pub(crate) struct Mirror<T> {
    state: Mutex<MirrorState<T>>,
}

struct MirrorState<T> {
    owner: Option<Identity>,
    epoch: u64,
    items: Vec<T>,
    in_flight: usize,
}

impl<T> Mirror<T> {
    pub(crate) const fn new() -> Self {
        Self {
            state: Mutex::new(MirrorState {
                owner: None,
                epoch: 0,
                items: Vec::new(),
                in_flight: 0,
            }),
        }
    }

    // No await happens while the lock is held, so a poisoned lock can only
    // come from a panic inside one of these short critical sections.
    fn lock(&self) -> MutexGuard<'_, MirrorState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Guard decision for commands on this collection.
    pub(crate) fn access(&self) -> Access {
        routes::check(self.lock().owner.as_ref(), Requirement::Authenticated)
    }

    /// Record the owning identity. Returns `true` if the owner changed, in
    /// which case the items were emptied and in-flight reads invalidated.
    pub(crate) fn set_owner(&self, identity: Option<&Identity>) -> bool {
        let mut state = self.lock();
        let changed = state.owner.as_ref().map(|o| &o.id) != identity.map(|i| &i.id);
        state.owner = identity.cloned();
        if changed {
            state.epoch += 1;
            state.items.clear();
            state.in_flight = 0;
        }
        changed
    }

    /// Start a read. With no owner the items are emptied and `None` is returned.
    ///
    /// The read counts as in flight until the returned [`PendingFetch`] is
    /// finished or dropped, so an abandoned read never leaves the mirror
    /// loading.
    pub(crate) fn begin_fetch(&self) -> Option<PendingFetch<'_, T>> {
        let mut state = self.lock();
        if state.owner.is_none() {
            state.items.clear();
            return None;
        }
        state.in_flight += 1;
        Some(PendingFetch {
            mirror: self,
            ticket: Ticket { epoch: state.epoch },
        })
    }

    /// The current epoch, if there is an owner.
    pub(crate) fn ticket(&self) -> Option<Ticket> {
        let state = self.lock();
        state.owner.as_ref().map(|_| Ticket { epoch: state.epoch })
    }

    pub(crate) fn is_current(&self, ticket: Ticket) -> bool {
        self.lock().epoch == ticket.epoch
    }

    /// Empty the mirror if `ticket` is still current.
    pub(crate) fn clear_items(&self, ticket: Ticket) {
        let mut state = self.lock();
        if ticket.epoch == state.epoch {
            state.items.clear();
        }
    }

    pub(crate) fn with_items<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.lock().items)
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.lock().in_flight > 0
    }

    fn settle(&self, ticket: Ticket) {
        let mut state = self.lock();
        if ticket.epoch == state.epoch {
            state.in_flight = state.in_flight.saturating_sub(1);
        }
    }
}

impl<T: Clone> Mirror<T> {
    pub(crate) fn items(&self) -> Vec<T> {
        self.lock().items.clone()
    }
}

/// A read in progress against a [`Mirror`].
pub(crate) struct PendingFetch<'a, T> {
    mirror: &'a Mirror<T>,
    ticket: Ticket,
}

impl<T> PendingFetch<'_, T> {
    pub(crate) const fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// Finish the read. `items` replaces the mirror wholesale if the ticket
    /// is still current. Returns whether the items were applied.
    pub(crate) fn finish(self, items: Option<Vec<T>>) -> bool {
        let mut state = self.mirror.lock();
        if self.ticket.epoch != state.epoch {
            debug!(
                ticket_epoch = self.ticket.epoch,
                current_epoch = state.epoch,
                "Discarding response issued for a previous identity"
            );
            return false;
        }
        match items {
            Some(items) => {
                state.items = items;
                true
            }
            None => false,
        }
    }
}

impl<T> Drop for PendingFetch<'_, T> {
    fn drop(&mut self) {
        self.mirror.settle(self.ticket);
    }
}

#[cfg(test)]
mod tests {
    use super::fake::identity;
    use super::*;

    #[test]
    fn test_set_owner_reports_changes_by_user_id() {
        let mirror: Mirror<u32> = Mirror::new();
        assert!(!mirror.set_owner(None));
        assert!(mirror.set_owner(Some(&identity("u1"))));
        assert!(!mirror.set_owner(Some(&identity("u1"))));
        assert!(mirror.set_owner(Some(&identity("u2"))));
        assert!(mirror.set_owner(None));
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let mirror: Mirror<u32> = Mirror::new();
        mirror.set_owner(Some(&identity("u1")));
        let Some(pending) = mirror.begin_fetch() else {
            panic!("owner is set");
        };
        assert!(mirror.is_loading());

        mirror.set_owner(None);
        assert!(!pending.finish(Some(vec![1, 2, 3])));
        assert!(mirror.items().is_empty());
        assert!(!mirror.is_loading());
    }

    #[test]
    fn test_last_resolved_fetch_wins() {
        let mirror: Mirror<u32> = Mirror::new();
        mirror.set_owner(Some(&identity("u1")));
        let (Some(first), Some(second)) = (mirror.begin_fetch(), mirror.begin_fetch()) else {
            panic!("owner is set");
        };

        assert!(second.finish(Some(vec![2])));
        assert!(mirror.is_loading());
        assert!(first.finish(Some(vec![1])));
        assert_eq!(mirror.items(), vec![1]);
        assert!(!mirror.is_loading());
    }

    #[test]
    fn test_dropped_fetch_stops_loading() {
        let mirror: Mirror<u32> = Mirror::new();
        mirror.set_owner(Some(&identity("u1")));
        let pending = mirror.begin_fetch();
        assert!(mirror.is_loading());

        drop(pending);
        assert!(!mirror.is_loading());
    }

    #[test]
    fn test_stale_drop_leaves_new_reads_loading() {
        let mirror: Mirror<u32> = Mirror::new();
        mirror.set_owner(Some(&identity("u1")));
        let stale = mirror.begin_fetch();
        mirror.set_owner(Some(&identity("u2")));
        let current = mirror.begin_fetch();

        drop(stale);
        assert!(mirror.is_loading());
        drop(current);
        assert!(!mirror.is_loading());
    }

    #[test]
    fn test_begin_fetch_without_owner_clears() {
        let mirror: Mirror<u32> = Mirror::new();
        assert!(mirror.begin_fetch().is_none());
        assert!(mirror.ticket().is_none());
        assert_eq!(mirror.access(), Access::Redirect(crate::routes::Route::Login));
    }
}
