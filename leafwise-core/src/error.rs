use thiserror::Error;

use crate::artifact::ValidationError;
use crate::camera::CameraError;
use crate::diagnose::DiagnosisError;
use crate::history::PersistenceError;

/// Aggregate of every failure domain in the crate.
///
/// The individual domains are the types callers usually want to match on;
/// this enum exists for callers that funnel everything through one error
/// type. None of these conditions is fatal to the process: validation and
/// camera failures are recoverable by the user, diagnosis failures by
/// re-invoking, and persistence failures degrade history only.
#[derive(Debug, Error)]
pub enum LeafwiseError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error(transparent)]
    Diagnosis(#[from] DiagnosisError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

pub type Result<T> = std::result::Result<T, LeafwiseError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn takes_aggregate(err: impl Into<LeafwiseError>) -> LeafwiseError {
        err.into()
    }

    #[test]
    fn domain_errors_convert_into_the_aggregate() {
        assert!(matches!(
            takes_aggregate(CameraError::PermissionDenied),
            LeafwiseError::Camera(CameraError::PermissionDenied)
        ));
        assert!(matches!(
            takes_aggregate(ValidationError::Empty),
            LeafwiseError::Validation(_)
        ));
        assert!(matches!(
            takes_aggregate(DiagnosisError::EnrichmentUnavailable("down".into())),
            LeafwiseError::Diagnosis(_)
        ));
        assert!(matches!(
            takes_aggregate(PersistenceError::WriteRejected("full".into())),
            LeafwiseError::Persistence(_)
        ));
    }

    #[test]
    fn aggregate_messages_are_transparent() {
        let err = takes_aggregate(CameraError::DeviceNotFound);
        assert_eq!(err.to_string(), CameraError::DeviceNotFound.to_string());
    }
}
