//! Error types for the `domain` layer.
use entity_api::error::Error as EntityApiError;
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors are modeled as a tree: `error_kind` says what went wrong and where
/// (inside the relay, or at an external collaborator such as the transport),
/// `source` keeps the lower-layer error that caused it. Entry points turn the
/// kind into a client-error or server-error status; the fanout engine uses the
/// delivery kinds to decide whether a target is stale.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// Errors raised by the relay itself or its registry store.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    /// A registry write (`put` / `delete`) or read failed.
    Storage,
    /// The snapshot a broadcast needs could not be read; nothing was delivered.
    RegistryUnavailable,
    Message(MessageErrorKind),
    Config,
    Other(String),
}

#[derive(Debug, PartialEq)]
pub enum MessageErrorKind {
    /// Inbound payload is not a well-formed message envelope.
    Invalid,
    /// An outbound envelope could not be serialized.
    Encode,
}

/// Errors reported by collaborators outside the relay.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Delivery(DeliveryErrorKind),
    Network,
    Other(String),
}

#[derive(Debug, PartialEq)]
pub enum DeliveryErrorKind {
    /// The target's transport session no longer exists.
    TargetGone,
    /// The target could not be reached this time; it may still be live.
    Transient,
    /// The endpoint refused the request (401/403). The target may be live.
    Rejected,
}

impl Error {
    pub fn new(error_kind: DomainErrorKind) -> Self {
        Error {
            source: None,
            error_kind,
        }
    }

    pub fn with_source(
        error_kind: DomainErrorKind,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Error {
            source: Some(source.into()),
            error_kind,
        }
    }

    pub fn invalid_message(reason: impl Into<String>) -> Self {
        let reason: String = reason.into();
        Self::with_source(
            DomainErrorKind::Internal(InternalErrorKind::Message(MessageErrorKind::Invalid)),
            reason,
        )
    }

    pub fn target_gone(reason: impl Into<String>) -> Self {
        let reason: String = reason.into();
        Self::with_source(
            DomainErrorKind::External(ExternalErrorKind::Delivery(DeliveryErrorKind::TargetGone)),
            reason,
        )
    }

    pub fn transient(reason: impl Into<String>) -> Self {
        let reason: String = reason.into();
        Self::with_source(
            DomainErrorKind::External(ExternalErrorKind::Delivery(DeliveryErrorKind::Transient)),
            reason,
        )
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        let reason: String = reason.into();
        Self::with_source(
            DomainErrorKind::External(ExternalErrorKind::Delivery(DeliveryErrorKind::Rejected)),
            reason,
        )
    }

    /// Re-labels a storage failure seen while taking a broadcast snapshot.
    pub fn into_registry_unavailable(self) -> Self {
        Error {
            source: Some(Box::new(self)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::RegistryUnavailable),
        }
    }

    pub fn is_target_gone(&self) -> bool {
        self.error_kind
            == DomainErrorKind::External(ExternalErrorKind::Delivery(DeliveryErrorKind::TargetGone))
    }

    pub fn is_invalid_message(&self) -> bool {
        self.error_kind
            == DomainErrorKind::Internal(InternalErrorKind::Message(MessageErrorKind::Invalid))
    }

    pub fn is_registry_unavailable(&self) -> bool {
        self.error_kind == DomainErrorKind::Internal(InternalErrorKind::RegistryUnavailable)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "Domain Error ({:?}): {source}", self.error_kind),
            None => write!(f, "Domain Error ({:?})", self.error_kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// Every entity_api failure is a registry storage failure at this layer.
impl From<EntityApiError> for Error {
    fn from(err: EntityApiError) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Storage),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Message(
                MessageErrorKind::Encode,
            )),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Builder errors happen before any network call is made.
        if err.is_builder() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
            }
        } else {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        }
    }
}
