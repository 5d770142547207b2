//! Engine error taxonomy.

use crate::interaction::ActionType;
use crate::scene::ObjectId;

/// An action was attempted against an invalid target, reference or state.
///
/// Always detected before any mutation; the engine state is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionViolation {
    #[error("no scene is loaded")]
    NoSceneLoaded,
    #[error("no action type is chosen")]
    NoActionChosen,
    #[error("object `{0}` is not in the scene")]
    UnknownObject(ObjectId),
    #[error("scene contains object id `{0}` more than once")]
    DuplicateObjectId(ObjectId),
    #[error("{action} needs a reference distinct from the target `{target}`")]
    SameObject { action: ActionType, target: ObjectId },
    #[error("`{0}` is not a container")]
    NotAContainer(ObjectId),
    #[error("container `{0}` is closed")]
    ContainerClosed(ObjectId),
    #[error("cannot put on `{0}`: it is a container, use PUT_IN")]
    ReferenceIsContainer(ObjectId),
    #[error("`{0}` has no mapped lid")]
    NoMappedLid(ObjectId),
    #[error("`{lid}` is not the mapped lid of `{container}`")]
    LidMismatch { container: ObjectId, lid: ObjectId },
    #[error("`{0}` is already open")]
    AlreadyOpen(ObjectId),
    #[error("`{0}` is already closed")]
    AlreadyClosed(ObjectId),
    #[error("{0} needs a reference object")]
    MissingReference(ActionType),
    #[error("no step action to commit")]
    NothingToCommit,
    #[error("nothing to save")]
    NothingToSave,
}

/// A scene load or trajectory save failed at the collaborator boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    #[error("collaborator returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed collaborator response: {0}")]
    Malformed(String),
    #[error("collaborator unreachable: {0}")]
    Transport(String),
}

/// Broken relation bookkeeping. Indicates an engine defect, never user error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("`{0}` is the moving member of more than one on/in relation")]
    MultiplePlacements(ObjectId),
    #[error("container `{0}` is listed as closed more than once")]
    DuplicateClosed(ObjectId),
}

/// Error surfaced by engine operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Precondition(#[from] PreconditionViolation),
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}
