//! The multi-step form state machine.
//!
//! Exactly one step is active at a time. Navigation is strictly sequential:
//! `next` advances only when the active step validates, `back` always retreats
//! except from the first step. Leaving the applicant-info step for the first
//! time additionally requires an explicit approval, remembered until the draft
//! is reset. Finishing the last step builds the submission payload and
//! atomically resets the draft.

use crate::models::{Draft, LocationInfo, SubmissionRequest};

use super::store::{DraftStore, KvStore, STEP_COUNT};
use super::validators::step_valid;

/// The six form steps, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepId {
    Eligibility,
    ApplicantInfo,
    Demographics,
    Address,
    Household,
    Employment,
}

impl StepId {
    pub const ALL: [StepId; STEP_COUNT] = [
        StepId::Eligibility,
        StepId::ApplicantInfo,
        StepId::Demographics,
        StepId::Address,
        StepId::Household,
        StepId::Employment,
    ];

    pub fn index(self) -> usize {
        match self {
            StepId::Eligibility => 0,
            StepId::ApplicantInfo => 1,
            StepId::Demographics => 2,
            StepId::Address => 3,
            StepId::Household => 4,
            StepId::Employment => 5,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            StepId::Eligibility => "Overview & Eligibility",
            StepId::ApplicantInfo => "Applicant Info",
            StepId::Demographics => "Demographics",
            StepId::Address => "Address",
            StepId::Household => "Household",
            StepId::Employment => "Employment",
        }
    }

    pub fn is_last(self) -> bool {
        self == StepId::Employment
    }
}

/// Outcome of a navigation request.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// Navigation was refused; the active step is unchanged.
    Stayed,
    /// Moved to the given step.
    Moved(StepId),
    /// The applicant-info step is valid but the approval gate has not been
    /// granted yet; the caller should prompt and then call `approve`.
    AwaitingApproval,
    /// The final step was confirmed: the payload is ready to send and the
    /// draft has been reset to step 0.
    Submitted(Box<SubmissionRequest>),
}

/// The form engine. Owns the draft, the step position and the approval latch,
/// and persists every mutation through the injected store.
pub struct FormMachine<S> {
    store: DraftStore<S>,
    draft: Draft,
    step: usize,
    approval_granted: bool,
}

impl<S: KvStore> FormMachine<S> {
    /// Restore the machine from whatever the store holds, or start fresh.
    pub fn new(store: DraftStore<S>) -> Self {
        let state = store.load();
        Self {
            store,
            draft: state.draft,
            step: state.step,
            approval_granted: state.approval_granted,
        }
    }

    pub fn current_step(&self) -> StepId {
        StepId::ALL[self.step]
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn approval_granted(&self) -> bool {
        self.approval_granted
    }

    /// Whether the active step currently validates.
    pub fn can_advance(&self) -> bool {
        step_valid(&self.draft, self.current_step())
    }

    /// Apply a mutation to the draft and persist it.
    ///
    /// Normalizes the demographics invariant afterwards: declining to state
    /// clears any race selections, so the two can never coexist.
    pub fn update(&mut self, mutate: impl FnOnce(&mut Draft)) {
        mutate(&mut self.draft);
        if self.draft.demographics.decline {
            self.draft.demographics.races.clear();
        }
        self.persist();
    }

    /// Fill the detected-location fields from a geolocation result. Each field
    /// is written only while blank, so a detected value is never clobbered by
    /// a later lookup.
    pub fn apply_detected_location(&mut self, location: &LocationInfo) {
        let eligibility = &mut self.draft.eligibility;
        if eligibility.detected_city.is_empty() {
            if let Some(city) = &location.city {
                eligibility.detected_city = city.clone();
            }
        }
        if eligibility.detected_region.is_empty() {
            if let Some(region) = &location.region {
                eligibility.detected_region = region.clone();
            }
        }
        if eligibility.detected_region_code.is_empty() {
            if let Some(code) = &location.region_code {
                eligibility.detected_region_code = code.clone();
            }
        }
        self.persist();
    }

    /// Try to advance past the active step.
    pub fn next(&mut self) -> Advance {
        let step = self.current_step();
        if !step_valid(&self.draft, step) {
            return Advance::Stayed;
        }

        if step == StepId::ApplicantInfo && !self.approval_granted {
            return Advance::AwaitingApproval;
        }

        if step.is_last() {
            let payload = SubmissionRequest::from(self.draft.clone());
            self.reset();
            tracing::debug!("Application completed; draft reset");
            return Advance::Submitted(Box::new(payload));
        }

        self.step += 1;
        self.persist();
        tracing::debug!("Advanced to step: {}", self.current_step().title());
        Advance::Moved(self.current_step())
    }

    /// Grant the one-shot approval and continue. The latch persists until the
    /// draft is reset, so the prompt never reappears.
    pub fn approve(&mut self) -> Advance {
        self.approval_granted = true;
        self.persist();
        self.next()
    }

    /// Retreat one step. Never blocked by validation.
    pub fn back(&mut self) -> Advance {
        if self.step == 0 {
            return Advance::Stayed;
        }
        self.step -= 1;
        self.persist();
        Advance::Moved(self.current_step())
    }

    /// Restore the default empty draft at step 0, clearing the approval latch.
    pub fn reset(&mut self) {
        self.draft = Draft::default();
        self.step = 0;
        self.approval_granted = false;
        self.store.reset();
    }

    fn persist(&mut self) {
        self.store
            .save(&self.draft, self.step, self.approval_granted);
    }
}
