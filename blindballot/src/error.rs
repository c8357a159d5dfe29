use thiserror::Error;

/// Errors raised by the cryptographic primitives
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("blindballot: invalid key material: {0}")]
    InvalidKey(&'static str),

    #[error("blindballot: unable to parse key: {0}")]
    KeyParse(String),

    #[error("blindballot: value has no inverse modulo n")]
    NoInverse,

    #[error("blindballot: arithmetic domain error: {0}")]
    Domain(&'static str),

    #[error("blindballot: invalid hexidecimal integer")]
    InvalidHex,
}

/// Credential issuance and vote casting errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("blindballot: vote session {0} is closed")]
    SessionClosed(uuid::Uuid),

    #[error("blindballot: a voting key was already issued for this voter and session")]
    AlreadyIssued,

    #[error("blindballot: voting key has already been consumed")]
    AlreadyConsumed,

    // Must never reveal which check failed
    #[error("blindballot: invalid or already-used credential")]
    InvalidSignature,

    #[error("blindballot: vote session {0} does not exist")]
    UnknownSession(uuid::Uuid),

    #[error("blindballot: unknown voting key")]
    UnknownKey,

    #[error("blindballot: voter {0} is not eligible for this vote session")]
    NotEligible(uuid::Uuid),

    #[error("blindballot: {0} is not the signer for this vote session")]
    NotSigner(uuid::Uuid),

    #[error("blindballot: {0}")]
    Crypto(#[from] Error),
}

impl FlowError {
    /// Fatal errors come from broken key material or internal inconsistency.
    ///
    /// Everything else is an expected rejection of the voter's request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FlowError::Crypto(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crypto_errors_are_fatal() {
        assert!(FlowError::from(Error::NoInverse).is_fatal());
        assert!(FlowError::Crypto(Error::InvalidKey("missing private exponent")).is_fatal());
        assert!(!FlowError::AlreadyConsumed.is_fatal());
        assert!(!FlowError::SessionClosed(uuid::Uuid::nil()).is_fatal());
        assert!(!FlowError::InvalidSignature.is_fatal());
    }

    #[test]
    fn invalid_signature_message_is_uniform() {
        assert_eq!(
            FlowError::InvalidSignature.to_string(),
            "blindballot: invalid or already-used credential"
        );
    }
}
