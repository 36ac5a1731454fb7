// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

//! Property-based tests for scaledjob-webhook.
//!
//! Uses proptest to generate random ScaledJobs and verify admission invariants.

#[path = "../common/mod.rs"]
mod common;

use proptest::prelude::*;

use common::fixtures::{RecordingTriggerValidator, ScaledJobBuilder};
use scaledjob_webhook::crd::ScaledJob;
use scaledjob_webhook::webhooks::TriggerOperation;
use scaledjob_webhook::webhooks::policies::{
    ValidationContext, finalizer::is_removing_finalizer, validate_create, validate_update,
};

/// Strategy for finalizer lists of up to three entries.
fn finalizers() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,8}(\\.keda\\.sh)?", 0..=3)
}

/// Strategy for trigger definitions (type, name, one metadata value).
fn triggers() -> impl Strategy<Value = Vec<(String, String, String)>> {
    prop::collection::vec(
        (
            prop_oneof![Just("cron"), Just("kafka"), Just("rabbitmq"), Just("")],
            prop_oneof![Just(""), Just("a"), Just("b")],
            "[0-9]{1,3}",
        )
            .prop_map(|(kind, name, value)| (kind.to_string(), name.to_string(), value)),
        0..4,
    )
}

fn build(finalizers: &[String], triggers: &[(String, String, String)], max: i32) -> ScaledJob {
    let refs: Vec<&str> = finalizers.iter().map(String::as_str).collect();
    let mut builder = ScaledJobBuilder::new("job")
        .finalizers(&refs)
        .max_replica_count(max);
    for (kind, name, value) in triggers {
        builder = builder.trigger(kind, name, &[("value", value.as_str())]);
    }
    builder.build()
}

proptest! {
    /// Exemption never applies unless exactly one finalizer was present before.
    #[test]
    fn exemption_requires_exactly_one_old_finalizer(
        old_finalizers in finalizers(),
        spec in triggers(),
        max in 0..50i32,
    ) {
        let old = build(&old_finalizers, &spec, max);
        let new = build(&[], &spec, max);
        let ctx = ValidationContext::new(&new, false).with_old(Some(&old));

        prop_assert_eq!(is_removing_finalizer(&ctx), old_finalizers.len() == 1);
    }

    /// With finalizers left on the candidate, the exemption never applies.
    #[test]
    fn exemption_requires_empty_candidate_finalizers(
        new_finalizers in finalizers().prop_filter("non-empty", |f| !f.is_empty()),
        spec in triggers(),
    ) {
        let old = build(&["finalizer.keda.sh".to_string()], &spec, 10);
        let new = build(&new_finalizers, &spec, 10);
        let ctx = ValidationContext::new(&new, false).with_old(Some(&old));

        prop_assert!(!is_removing_finalizer(&ctx));
    }

    /// Any spec difference disables the exemption.
    #[test]
    fn spec_change_disables_exemption(
        spec in triggers(),
        max in 0..50i32,
        delta in 1..10i32,
    ) {
        let old = build(&["finalizer.keda.sh".to_string()], &spec, max);
        let new = build(&[], &spec, max + delta);
        let ctx = ValidationContext::new(&new, false).with_old(Some(&old));

        prop_assert!(!is_removing_finalizer(&ctx));
    }

    /// The outcome does not depend on the dry-run flag, which is still forwarded.
    #[test]
    fn dry_run_does_not_change_outcome(
        old_finalizers in finalizers(),
        new_finalizers in finalizers(),
        spec in triggers(),
        reject in any::<bool>(),
    ) {
        let old = build(&old_finalizers, &spec, 10);
        let new = build(&new_finalizers, &spec, 10);
        let validator = if reject {
            RecordingTriggerValidator::rejecting("invalid")
        } else {
            RecordingTriggerValidator::accepting()
        };

        let wet = validate_update(&ValidationContext::new(&new, false).with_old(Some(&old)), &validator);
        let dry = validate_update(&ValidationContext::new(&new, true).with_old(Some(&old)), &validator);
        prop_assert_eq!(wet, dry);

        let calls = validator.calls();
        if !calls.is_empty() {
            prop_assert_eq!(
                calls,
                vec![(TriggerOperation::Update, false), (TriggerOperation::Update, true)]
            );
        }
    }

    /// Repeated evaluation with identical inputs yields identical decisions.
    #[test]
    fn evaluation_is_idempotent(spec in triggers(), reject in any::<bool>()) {
        let job = build(&[], &spec, 10);
        let validator = if reject {
            RecordingTriggerValidator::rejecting("invalid")
        } else {
            RecordingTriggerValidator::accepting()
        };
        let ctx = ValidationContext::new(&job, false);

        let first = validate_create(&ctx, &validator);
        let second = validate_create(&ctx, &validator);

        prop_assert_eq!(first.is_allowed(), !reject);
        prop_assert_eq!(first, second);
    }
}
