//! Who may move a booking, and where it may move to.
//!
//! Authorization is checked before the transition itself.

use thiserror::Error;
use uuid::Uuid;

use crate::models::{Booking, BookingAction, BookingStatus, EmployeeRole, TransitionError};

/// The employee performing an action, with their role as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub employee_id: Uuid,
    pub role: EmployeeRole,
}

impl Actor {
    pub fn new(employee_id: Uuid, role: EmployeeRole) -> Self {
        Self { employee_id, role }
    }

    pub fn is_reviewer(&self) -> bool {
        self.role.is_reviewer()
    }
}

/// Refusal of an action on the grounds of who is asking.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizationError {
    #[error("Only admins and approvers may {0} bookings")]
    ReviewerRequired(BookingAction),

    #[error("Only the booking owner may {0} this booking")]
    OwnerRequired(BookingAction),
}

/// Why a lifecycle action cannot proceed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Forbidden(#[from] AuthorizationError),

    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),
}

/// Checks that `actor` may perform `action` on a booking owned by `owner_id`.
///
/// Review actions need a reviewer role; trip recording and cancelling belong
/// to the owner alone.
pub fn authorize(
    action: BookingAction,
    actor: &Actor,
    owner_id: Uuid,
) -> Result<(), AuthorizationError> {
    if action.is_review() {
        if actor.is_reviewer() {
            Ok(())
        } else {
            Err(AuthorizationError::ReviewerRequired(action))
        }
    } else if actor.employee_id == owner_id {
        Ok(())
    } else {
        Err(AuthorizationError::OwnerRequired(action))
    }
}

/// Whether `actor` may read the booking (and its trip log).
pub fn can_view(actor: &Actor, booking: &Booking) -> bool {
    actor.is_reviewer() || booking.is_owned_by(actor.employee_id)
}

/// Authorizes and plans an action, returning the status it leads to.
pub fn plan(
    action: BookingAction,
    actor: &Actor,
    booking: &Booking,
) -> Result<BookingStatus, LifecycleError> {
    authorize(action, actor, booking.employee_id)?;
    Ok(booking.status.apply(action)?)
}
