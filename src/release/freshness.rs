//! Staleness policy
//!
//! Two tiers: the per-app `max_age_days` of the descriptor, which an exempted
//! version text may skip, and a global ceiling no enforced app may exceed.

use chrono::{DateTime, FixedOffset};
use tracing::debug;

use crate::config::DEFAULT_GLOBAL_MAX_AGE_DAYS;
use crate::release::artifact::FetchResult;
use crate::release::descriptor::ApplicationDescriptor;
use crate::release::outcome::ResolutionOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessValidator {
    global_max_age_days: u32,
}

impl FreshnessValidator {
    pub fn new(global_max_age_days: u32) -> Self {
        Self {
            global_max_age_days,
        }
    }

    pub fn global_max_age_days(&self) -> u32 {
        self.global_max_age_days
    }

    pub fn validate(
        &self,
        result: FetchResult,
        policy: &ApplicationDescriptor,
        now: DateTime<FixedOffset>,
    ) -> ResolutionOutcome {
        let Some(max_age_days) = policy.max_age_days else {
            return ResolutionOutcome::Success(result);
        };

        let age = (now - result.published_at).num_days();
        let version_text = result.version.version_text();

        if policy.is_exempt(version_text) {
            debug!(
                "{}: version {} is exempt from the {} day threshold",
                policy.id, version_text, max_age_days
            );
        } else if age >= i64::from(max_age_days) {
            return ResolutionOutcome::StaleRelease {
                age_in_days: age,
                threshold_in_days: i64::from(max_age_days),
            };
        }

        if age >= i64::from(self.global_max_age_days) {
            return ResolutionOutcome::StaleRelease {
                age_in_days: age,
                threshold_in_days: i64::from(self.global_max_age_days),
            };
        }

        ResolutionOutcome::Success(result)
    }
}

impl Default for FreshnessValidator {
    fn default() -> Self {
        Self::new(DEFAULT_GLOBAL_MAX_AGE_DAYS)
    }
}
