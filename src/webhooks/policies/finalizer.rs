//! Finalizer-removal exemption.
//!
//! Controllers drop the last finalizer from a ScaledJob as the final step of
//! cleanup. That update must go through even when the triggers no longer
//! validate, as long as the spec itself is untouched.

use serde::Serialize;

use super::ValidationContext;

/// True when the update removes the only finalizer and leaves the spec unchanged.
///
/// The check is literal: exactly one finalizer before, none after. Dropping
/// one of several finalizers does not qualify.
pub fn is_removing_finalizer(ctx: &ValidationContext<'_>) -> bool {
    let old = match ctx.old_resource {
        Some(r) => r,
        None => return false,
    };
    let new = ctx.resource;

    new.finalizer_count() == 0 && old.finalizer_count() == 1 && same_spec(&new.spec, &old.spec)
}

/// Structural equality through the JSON encoding.
///
/// A value that fails to encode is never equal to anything.
fn same_spec<T: Serialize>(a: &T, b: &T) -> bool {
    match (serde_json::to_vec(a), serde_json::to_vec(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
