//! The multi-step form engine.
//!
//! UI-agnostic: the machine owns the draft and step position, validates
//! forward navigation, and persists every mutation through an injected
//! key-value store. A frontend drives it with `update`/`next`/`back`/`approve`
//! and renders whatever step it reports.

mod machine;
mod store;
mod validators;

pub use machine::{Advance, FormMachine, StepId};
pub use store::{DraftStore, FileStore, KvStore, MemoryStore, PersistedState, StoreError};
pub use validators::{
    address_valid, applicant_info_valid, demographics_valid, eligibility_valid, employment_valid,
    household_valid, step_valid,
};

use std::sync::atomic::{AtomicBool, Ordering};

use crate::geo::{LocationFetch, LocationResolver};

/// Fill the draft's detected-location fields from the resolver, once.
///
/// This is the eligibility-step entry action. The caller passes a cancellation
/// flag tied to its own lifetime; a result that arrives after cancellation is
/// discarded so a stale response never overwrites newer state.
pub async fn prefill_location<S, F>(
    machine: &mut FormMachine<S>,
    resolver: &LocationResolver<F>,
    cancelled: &AtomicBool,
) where
    S: KvStore,
    F: LocationFetch,
{
    if machine.draft().eligibility.has_detected_location() {
        return;
    }

    if let Some(info) = resolver.resolve().await {
        if !cancelled.load(Ordering::Acquire) {
            machine.apply_detected_location(&info);
        }
    }
}
