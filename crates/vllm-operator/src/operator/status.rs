use chrono::{DateTime, Utc};
use k8s_openapi::api::apps::v1::Deployment;

use super::crd::{Condition, VllmDeploymentStatus};
use crate::error::VllmOperatorError;

pub const AVAILABLE: &str = "Available";
pub const RECONCILE_FAILED: &str = "ReconcileFailed";

/// Inserts or replaces the condition with the same type.
///
/// The transition time moves only when the condition's status changes, so
/// re-applying an unchanged condition leaves `conditions` equal.
pub fn set_condition(
    conditions: &mut Vec<Condition>,
    mut condition: Condition,
    now: DateTime<Utc>,
) {
    match conditions.iter_mut().find(|c| c.type_ == condition.type_) {
        Some(existing) => {
            condition.last_transition_time = if existing.status == condition.status {
                existing.last_transition_time
            } else {
                now
            };
            *existing = condition;
        }
        None => {
            condition.last_transition_time = now;
            conditions.push(condition);
        }
    }
}

pub fn remove_condition(conditions: &mut Vec<Condition>, type_: &str) {
    conditions.retain(|c| c.type_ != type_);
}

/// Status reflecting a deployment that matches the spec.
pub fn synced_status(
    current: Option<&VllmDeploymentStatus>,
    generation: Option<i64>,
    deployment: &Deployment,
    now: DateTime<Utc>,
) -> VllmDeploymentStatus {
    let mut status = current.cloned().unwrap_or_default();

    let desired = deployment
        .spec
        .as_ref()
        .and_then(|s| s.replicas)
        .unwrap_or(1);
    let observed = deployment.status.as_ref();
    let available = observed.and_then(|s| s.available_replicas).unwrap_or(0);

    status.replicas = observed.and_then(|s| s.replicas);
    status.ready_replicas = observed.and_then(|s| s.ready_replicas);
    status.available_replicas = observed.and_then(|s| s.available_replicas);
    status.observed_generation = generation;

    let condition = if available >= desired {
        Condition::new(
            AVAILABLE,
            true,
            "MinimumReplicasAvailable",
            format!("{available}/{desired} replicas available"),
        )
    } else {
        Condition::new(
            AVAILABLE,
            false,
            "MinimumReplicasUnavailable",
            format!("{available}/{desired} replicas available"),
        )
    };
    set_condition(&mut status.conditions, condition, now);
    remove_condition(&mut status.conditions, RECONCILE_FAILED);

    status
}

/// Status recording why the last pass failed.
pub fn failed_status(
    current: Option<&VllmDeploymentStatus>,
    error: &VllmOperatorError,
    now: DateTime<Utc>,
) -> VllmDeploymentStatus {
    let mut status = current.cloned().unwrap_or_default();
    set_condition(
        &mut status.conditions,
        Condition::new(RECONCILE_FAILED, true, error.reason(), error.to_string()),
        now,
    );
    status
}
