use crate::*;
use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

/// A candidate choice that a voter gets blind-signed.
///
/// Encoded as `<candidate>:<nonce hex>`. The random nonce keeps two voters who
/// pick the same candidate from presenting identical tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateToken {
    candidate: String,
    nonce: [u8; 16],
}

impl CandidateToken {
    pub fn new<R: CryptoRng + RngCore>(rng: &mut R, candidate: &str) -> Self {
        let mut nonce = [0u8; 16];
        rng.fill_bytes(&mut nonce);
        CandidateToken {
            candidate: candidate.to_owned(),
            nonce,
        }
    }

    /// Parse a token, returning `None` if it is not well formed
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let text = std::str::from_utf8(bytes).ok()?;
        let (candidate, nonce_hex) = text.rsplit_once(':')?;
        if candidate.is_empty() {
            return None;
        }

        let decoded = hex::decode(nonce_hex).ok()?;
        if decoded.len() != 16 {
            return None;
        }
        let mut nonce = [0u8; 16];
        nonce.copy_from_slice(&decoded);

        Some(CandidateToken {
            candidate: candidate.to_owned(),
            nonce,
        })
    }

    pub fn candidate(&self) -> &str {
        &self.candidate
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        format!("{}:{}", self.candidate, hex::encode(self.nonce)).into_bytes()
    }
}

/// Records accepted votes.
///
/// Implementations enforce that each credential (unblinded signature) is
/// recorded at most once per session.
pub trait VoteLedger {
    fn record(
        &self,
        session_id: Uuid,
        token: &CandidateToken,
        credential: &BigUint,
    ) -> Result<(), FlowError>;
}

impl<T: VoteLedger + ?Sized> VoteLedger for Arc<T> {
    fn record(
        &self,
        session_id: Uuid,
        token: &CandidateToken,
        credential: &BigUint,
    ) -> Result<(), FlowError> {
        (**self).record(session_id, token, credential)
    }
}

#[derive(Default)]
struct LedgerInner {
    used: HashSet<(Uuid, BigUint)>,
    votes: HashMap<Uuid, Vec<String>>,
}

/// A vote ledger kept in memory
#[derive(Default)]
pub struct MemVoteLedger {
    inner: Mutex<LedgerInner>,
}

impl MemVoteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Candidates recorded for a session, in the order the votes were cast
    pub fn votes(&self, session_id: Uuid) -> Vec<String> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.votes.get(&session_id).cloned().unwrap_or_default()
    }
}

impl VoteLedger for MemVoteLedger {
    fn record(
        &self,
        session_id: Uuid,
        token: &CandidateToken,
        credential: &BigUint,
    ) -> Result<(), FlowError> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if !inner.used.insert((session_id, credential.clone())) {
            return Err(FlowError::AlreadyConsumed);
        }
        inner
            .votes
            .entry(session_id)
            .or_default()
            .push(token.candidate().to_owned());
        Ok(())
    }
}

/// The vote-casting gate: nothing reaches the ledger without a valid signature
pub struct VoteRedemption<D, L> {
    sessions: D,
    ledger: L,
    cache: Arc<KeyCache>,
}

impl<D, L> VoteRedemption<D, L>
where
    D: VoteSessionDirectory,
    L: VoteLedger,
{
    pub fn new(sessions: D, ledger: L, cache: Arc<KeyCache>) -> Self {
        VoteRedemption {
            sessions,
            ledger,
            cache,
        }
    }

    /// Cast a vote with an unblinded signature over `message_token`.
    ///
    /// Any rejection is reported as `InvalidSignature`.
    pub fn cast_vote(
        &self,
        unblinded_signature: &BigUint,
        message_token: &[u8],
        session_id: Uuid,
    ) -> Result<(), FlowError> {
        let public_key = self.cache.get_or_load(&self.sessions, session_id)?;

        match verify(unblinded_signature, message_token, &public_key) {
            Ok(true) => {}
            Ok(false) => {
                debug!("rejected vote in session {}: signature mismatch", session_id);
                return Err(FlowError::InvalidSignature);
            }
            Err(e) => {
                error!("unable to verify vote in session {}: {}", session_id, e);
                return Err(FlowError::InvalidSignature);
            }
        }

        let token = CandidateToken::parse(message_token).ok_or_else(|| {
            debug!("rejected vote in session {}: malformed token", session_id);
            FlowError::InvalidSignature
        })?;

        self.ledger
            .record(session_id, &token, unblinded_signature)
            .map_err(|e| {
                debug!("rejected vote in session {}: {}", session_id, e);
                FlowError::InvalidSignature
            })
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }
}
