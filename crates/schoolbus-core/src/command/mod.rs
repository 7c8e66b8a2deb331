// ── Command API ──
//
// All write operations flow through a unified `Command` enum. The
// controller validates each command up front, then routes it to the
// local snapshot or the remote backend.

pub mod requests;

use std::fmt;

use serde::Serialize;

use crate::error::CoreError;
use crate::model::{DeletePolicy, EntityId, EntityKind, Record};

pub use requests::{
    CreateBusRequest, CreateDriverRequest, CreateEstablishmentRequest, CreateParentRequest,
    CreateRouteRequest, CreateStudentRequest, CreateTripRequest, UpdateBusRequest,
    UpdateDriverRequest, UpdateEstablishmentRequest, UpdateParentRequest, UpdateRouteRequest,
    UpdateStudentRequest, UpdateTripRequest,
};

/// A create payload for one record type.
pub trait CreateRequest: Serialize + Send + Sync {
    type Record: Record;

    /// Required-field checks, run before any gateway call.
    fn validate(&self) -> Result<(), CoreError>;

    /// Build the record under a locally assigned identity.
    fn into_record(self, id: EntityId) -> Self::Record;
}

/// An all-optional patch for one record type.
pub trait UpdateRequest: Serialize + Send + Sync {
    type Record: Record;

    fn validate(&self) -> Result<(), CoreError>;

    /// Merge the patch. Identity is restored by the gateway afterwards.
    fn apply(&self, record: &mut Self::Record);
}

/// All write operations against the collections.
#[derive(Debug, Clone)]
pub enum Command {
    // ── Establishments ───────────────────────────────────────────────
    CreateEstablishment(CreateEstablishmentRequest),
    UpdateEstablishment {
        id: EntityId,
        update: UpdateEstablishmentRequest,
    },

    // ── Fleet ────────────────────────────────────────────────────────
    CreateBus(CreateBusRequest),
    UpdateBus {
        id: EntityId,
        update: UpdateBusRequest,
    },
    CreateDriver(CreateDriverRequest),
    UpdateDriver {
        id: EntityId,
        update: UpdateDriverRequest,
    },

    // ── Families ─────────────────────────────────────────────────────
    /// Creates the parent and its link rows as one unit.
    CreateParent(CreateParentRequest),
    UpdateParent {
        id: EntityId,
        update: UpdateParentRequest,
    },
    CreateStudent(CreateStudentRequest),
    UpdateStudent {
        id: EntityId,
        update: UpdateStudentRequest,
    },

    // ── Routes and trips ─────────────────────────────────────────────
    CreateRoute(CreateRouteRequest),
    UpdateRoute {
        id: EntityId,
        update: UpdateRouteRequest,
    },
    CreateTrip(CreateTripRequest),
    UpdateTrip {
        id: EntityId,
        update: UpdateTripRequest,
    },

    // ── Any kind ─────────────────────────────────────────────────────
    /// Delete following the kind's declared policy.
    Delete { kind: EntityKind, id: EntityId },
}

impl Command {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::CreateEstablishment(_) | Self::UpdateEstablishment { .. } => {
                EntityKind::Establishment
            }
            Self::CreateBus(_) | Self::UpdateBus { .. } => EntityKind::Bus,
            Self::CreateDriver(_) | Self::UpdateDriver { .. } => EntityKind::Driver,
            Self::CreateParent(_) | Self::UpdateParent { .. } => EntityKind::Parent,
            Self::CreateStudent(_) | Self::UpdateStudent { .. } => EntityKind::Student,
            Self::CreateRoute(_) | Self::UpdateRoute { .. } => EntityKind::Route,
            Self::CreateTrip(_) | Self::UpdateTrip { .. } => EntityKind::Trip,
            Self::Delete { kind, .. } => *kind,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::CreateEstablishment(r) => r.validate(),
            Self::UpdateEstablishment { update, .. } => update.validate(),
            Self::CreateBus(r) => r.validate(),
            Self::UpdateBus { update, .. } => update.validate(),
            Self::CreateDriver(r) => r.validate(),
            Self::UpdateDriver { update, .. } => update.validate(),
            Self::CreateParent(r) => r.validate(),
            Self::UpdateParent { update, .. } => update.validate(),
            Self::CreateStudent(r) => r.validate(),
            Self::UpdateStudent { update, .. } => update.validate(),
            Self::CreateRoute(r) => r.validate(),
            Self::UpdateRoute { update, .. } => update.validate(),
            Self::CreateTrip(r) => r.validate(),
            Self::UpdateTrip { update, .. } => update.validate(),
            Self::Delete { .. } => Ok(()),
        }
    }
}

/// Outcome of a committed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandResult {
    Created {
        kind: EntityKind,
        id: EntityId,
    },
    Updated {
        kind: EntityKind,
        id: EntityId,
    },
    Deleted {
        kind: EntityKind,
        id: EntityId,
        policy: DeletePolicy,
    },
}

impl CommandResult {
    pub fn id(&self) -> EntityId {
        match self {
            Self::Created { id, .. } | Self::Updated { id, .. } | Self::Deleted { id, .. } => *id,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Created { kind, .. } | Self::Updated { kind, .. } | Self::Deleted { kind, .. } => {
                *kind
            }
        }
    }
}

/// The success acknowledgement shown to the user.
impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created { kind, id } => write!(f, "Created {} {id}", kind.label()),
            Self::Updated { kind, id } => write!(f, "Updated {} {id}", kind.label()),
            Self::Deleted { kind, id, .. } => write!(f, "Deleted {} {id}", kind.label()),
        }
    }
}
