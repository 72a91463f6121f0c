//! Progressive reveal: how many locally-known entries the rendering window
//! may draw from, and when to go back to the remote source for more.
//!
//! ## Usage
//!
//! The controller drains the locally buffered batch first: while unseen
//! local entries remain, [`RevealController::request_more`] grows the
//! reveal window synchronously with no network cost. Only once the local
//! buffer is exhausted does it dispatch a remote page fetch.
use tracing::{debug, trace};

use crate::source::{RemoteState, SourceGeneration};

/// Default number of entries revealed for a fresh source.
pub const DEFAULT_INITIAL_BATCH: usize = 16;
/// Default number of entries added per reveal step.
pub const DEFAULT_LOAD_MORE_BATCH: usize = 16;

/// Batch sizes for the reveal window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevealConfig {
    /// Entries revealed immediately after a source identity change.
    pub initial_batch: usize,
    /// Entries added by each local reveal step.
    pub load_more_batch: usize,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            initial_batch: DEFAULT_INITIAL_BATCH,
            load_more_batch: DEFAULT_LOAD_MORE_BATCH,
        }
    }
}

/// The currently revealed slice of a source, as counts.
///
/// Pure function of controller state and inputs; recompute on every
/// change to the source, the reveal window, or the remote flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Exposure {
    /// Entries the rendering window may draw from.
    pub exposed_count: usize,
    /// Whether more entries exist, locally buffered or remote.
    pub has_next_page: bool,
}

/// What a [`RevealController::request_more`] call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestOutcome {
    /// A load was already in flight, or nothing remained to reveal.
    Ignored,
    /// Unseen local entries were revealed, no network involved.
    RevealedLocally {
        /// The reveal window size after the step.
        revealed_count: usize,
    },
    /// The local buffer was drained; a remote page fetch was dispatched.
    RemoteFetchStarted(SourceGeneration),
}

/// Owns the reveal window and the in-flight flag for one grid.
///
/// `revealed_count` is monotonically non-decreasing within one source
/// identity and snaps back to the initial batch whenever the identity
/// changes.
pub struct RevealController {
    config: RevealConfig,
    revealed_count: usize,
    remote_load_in_flight: bool,
    generation: u64,
}

impl RevealController {
    /// Creates a controller with the reveal window at its initial size.
    pub fn new(config: RevealConfig) -> Self {
        Self {
            config,
            revealed_count: config.initial_batch,
            remote_load_in_flight: false,
            generation: 0,
        }
    }

    /// The token identifying the current source identity.
    pub fn generation(&self) -> SourceGeneration {
        SourceGeneration(self.generation)
    }

    /// Current reveal window size, uncapped by source length.
    pub fn revealed_count(&self) -> usize {
        self.revealed_count
    }

    /// Whether a remote fetch dispatched by this controller is pending.
    pub fn remote_load_in_flight(&self) -> bool {
        self.remote_load_in_flight
    }

    /// Computes the exposed slice for the current state.
    pub fn compute_exposure(&self, source_len: usize, remote_has_more: bool) -> Exposure {
        let exposed_count = self.revealed_count.min(source_len);
        Exposure {
            exposed_count,
            has_next_page: exposed_count < source_len || remote_has_more,
        }
    }

    /// Resets the reveal window for a new source identity.
    ///
    /// Must run before the next exposure computation so a previous
    /// source's tail is never revealed. Minting a new generation also
    /// orphans any fetch still in flight for the old identity.
    pub fn reset_on_source_change(&mut self) -> SourceGeneration {
        self.revealed_count = self.config.initial_batch;
        self.remote_load_in_flight = false;
        self.generation += 1;
        debug!(
            generation = self.generation,
            revealed = self.revealed_count,
            "reveal window reset for new source"
        );
        SourceGeneration(self.generation)
    }

    /// Grows the reveal window, preferring a free local reveal over a
    /// remote fetch.
    ///
    /// No-op while a load is in flight, either this controller's own or
    /// the remote collaborator's (`remote.loading`). `dispatch` runs only
    /// when a remote fetch actually starts and receives the generation to
    /// echo back on completion.
    pub fn request_more<F>(
        &mut self,
        source_len: usize,
        remote: RemoteState,
        dispatch: F,
    ) -> RequestOutcome
    where
        F: FnOnce(SourceGeneration),
    {
        if self.remote_load_in_flight || remote.loading {
            trace!("request_more ignored, load already in flight");
            return RequestOutcome::Ignored;
        }

        let exposed = self.revealed_count.min(source_len);
        if exposed < source_len {
            self.revealed_count = exposed
                .saturating_add(self.config.load_more_batch)
                .min(source_len);
            debug!(revealed = self.revealed_count, "revealed local batch");
            return RequestOutcome::RevealedLocally {
                revealed_count: self.revealed_count,
            };
        }

        if remote.has_more {
            self.remote_load_in_flight = true;
            let generation = SourceGeneration(self.generation);
            debug!(generation = self.generation, "dispatching remote page fetch");
            dispatch(generation);
            return RequestOutcome::RemoteFetchStarted(generation);
        }

        RequestOutcome::Ignored
    }

    /// Clears the in-flight flag once a fetch resolves, success or
    /// failure.
    ///
    /// Completions carrying a stale generation belong to a replaced
    /// source and are ignored; leaving the flag untouched for them is
    /// what keeps a new identity's state clean. Returns whether the
    /// completion was accepted.
    pub fn finish_remote_load(&mut self, generation: SourceGeneration) -> bool {
        if generation.0 != self.generation {
            debug!(
                stale = generation.0,
                current = self.generation,
                "ignoring stale remote-load completion"
            );
            return false;
        }
        self.remote_load_in_flight = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> RevealController {
        RevealController::new(RevealConfig {
            initial_batch: 16,
            load_more_batch: 16,
        })
    }

    const NO_REMOTE: RemoteState = RemoteState {
        has_more: false,
        loading: false,
    };

    #[test]
    fn test_initial_exposure() {
        let c = controller();
        let exposure = c.compute_exposure(40, false);
        assert_eq!(exposure.exposed_count, 16);
        assert!(exposure.has_next_page);
    }

    #[test]
    fn test_exposure_capped_by_short_source() {
        let c = controller();
        let exposure = c.compute_exposure(10, false);
        assert_eq!(exposure.exposed_count, 10);
        assert!(!exposure.has_next_page);

        let exposure = c.compute_exposure(10, true);
        assert!(exposure.has_next_page);
    }

    #[test]
    fn test_local_reveal_steps_then_caps() {
        let mut c = controller();

        let outcome = c.request_more(40, NO_REMOTE, |_| panic!("no fetch expected"));
        assert_eq!(outcome, RequestOutcome::RevealedLocally { revealed_count: 32 });
        assert_eq!(c.compute_exposure(40, false).exposed_count, 32);

        // 32 + 16 caps at the source length, not 48.
        let outcome = c.request_more(40, NO_REMOTE, |_| panic!("no fetch expected"));
        assert_eq!(outcome, RequestOutcome::RevealedLocally { revealed_count: 40 });

        let exposure = c.compute_exposure(40, false);
        assert_eq!(exposure.exposed_count, 40);
        assert!(!exposure.has_next_page);
        assert!(c.compute_exposure(40, true).has_next_page);
    }

    #[test]
    fn test_remote_fetch_only_after_local_drained() {
        let mut c = controller();
        let remote = RemoteState {
            has_more: true,
            loading: false,
        };

        // 16 of 16 exposed: local buffer is drained, so this goes remote.
        let mut dispatched = None;
        let outcome = c.request_more(16, remote, |generation| dispatched = Some(generation));
        assert_eq!(
            outcome,
            RequestOutcome::RemoteFetchStarted(c.generation())
        );
        assert_eq!(dispatched, Some(c.generation()));
        assert!(c.remote_load_in_flight());
    }

    #[test]
    fn test_request_more_idempotent_while_in_flight() {
        let mut c = controller();
        let remote = RemoteState {
            has_more: true,
            loading: false,
        };
        c.request_more(16, remote, |_| {});
        assert!(c.remote_load_in_flight());

        let before = c.revealed_count();
        let outcome = c.request_more(100, remote, |_| panic!("must not re-dispatch"));
        assert_eq!(outcome, RequestOutcome::Ignored);
        assert_eq!(c.revealed_count(), before);
    }

    #[test]
    fn test_external_loading_flag_also_blocks() {
        let mut c = controller();
        let remote = RemoteState {
            has_more: true,
            loading: true,
        };
        let outcome = c.request_more(40, remote, |_| panic!("must not dispatch"));
        assert_eq!(outcome, RequestOutcome::Ignored);
        assert_eq!(c.revealed_count(), 16);
    }

    #[test]
    fn test_monotone_within_identity_reset_on_change() {
        let mut c = controller();
        c.request_more(40, NO_REMOTE, |_| {});
        assert_eq!(c.revealed_count(), 32);

        let old = c.generation();
        let new = c.reset_on_source_change();
        assert_ne!(old, new);
        assert_eq!(c.revealed_count(), 16);
        assert!(!c.remote_load_in_flight());
    }

    #[test]
    fn test_stale_completion_does_not_touch_new_identity() {
        let mut c = controller();
        let remote = RemoteState {
            has_more: true,
            loading: false,
        };
        let mut captured = None;
        c.request_more(16, remote, |generation| captured = Some(generation));
        let stale = captured.unwrap();

        // Source replaced mid-flight.
        c.reset_on_source_change();
        c.request_more(16, remote, |_| {});
        assert!(c.remote_load_in_flight());

        // The old identity's completion must not clear the new flag.
        assert!(!c.finish_remote_load(stale));
        assert!(c.remote_load_in_flight());

        assert!(c.finish_remote_load(c.generation()));
        assert!(!c.remote_load_in_flight());
    }

    #[test]
    fn test_exhausted_source_without_remote_is_ignored() {
        let mut c = controller();
        c.request_more(16, NO_REMOTE, |_| panic!("no fetch expected"));
        let outcome = c.request_more(16, NO_REMOTE, |_| panic!("no fetch expected"));
        assert_eq!(outcome, RequestOutcome::Ignored);
    }
}
