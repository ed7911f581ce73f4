//! Unit component lifecycle.
//!
//! `planning -> manufactured -> transported -> accepted -> installed`, plus a
//! single absorbing `rejected` state reachable from anywhere else.

use crate::domain::model::{Component, ComponentStatus, StatusEntry};
use crate::domain::session::Actor;
use crate::utils::error::TransitionError;
use chrono::{DateTime, Utc};

/// Status that follows `status` in the pipeline. `None` for `installed` and
/// for `rejected`, which is not part of the ordering.
pub fn next_status(status: ComponentStatus) -> Option<ComponentStatus> {
    let index = ComponentStatus::PIPELINE
        .iter()
        .position(|candidate| *candidate == status)?;
    ComponentStatus::PIPELINE.get(index + 1).copied()
}

pub fn advance(component: &Component, actor: Actor) -> Result<Component, TransitionError> {
    advance_at(component, actor, Utc::now())
}

pub fn advance_at(
    component: &Component,
    actor: Actor,
    now: DateTime<Utc>,
) -> Result<Component, TransitionError> {
    let next = next_status(component.status).ok_or(TransitionError::NoNextStatus {
        status: component.status,
    })?;

    // Restricted actors may only accept a delivery.
    if !actor.is_elevated() && component.status != ComponentStatus::Transported {
        return Err(TransitionError::Unauthorized {
            status: component.status,
        });
    }

    Ok(with_status(component, next, now))
}

pub fn reject(component: &Component) -> Result<Component, TransitionError> {
    reject_at(component, Utc::now())
}

pub fn reject_at(component: &Component, now: DateTime<Utc>) -> Result<Component, TransitionError> {
    if component.status == ComponentStatus::Rejected {
        return Err(TransitionError::AlreadyRejected);
    }
    Ok(with_status(component, ComponentStatus::Rejected, now))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailableActions {
    pub advance_to: Option<ComponentStatus>,
    pub can_reject: bool,
}

/// What `advance` and `reject` would allow right now, for building buttons.
pub fn available_actions(component: &Component, actor: Actor) -> AvailableActions {
    let advance_to = next_status(component.status)
        .filter(|_| actor.is_elevated() || component.status == ComponentStatus::Transported);

    AvailableActions {
        advance_to,
        can_reject: component.status != ComponentStatus::Rejected,
    }
}

fn with_status(component: &Component, status: ComponentStatus, now: DateTime<Utc>) -> Component {
    let mut updated = Component {
        status,
        updated_at: now,
        ..component.clone()
    };
    updated.status_history.push(StatusEntry {
        status,
        timestamp: now,
    });
    updated
}
