use crate::*;
use num_bigint::BigUint;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;
use uuid::Uuid;

/// Issuance state of a (voter, vote session) pair
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IssuanceState {
    NotIssued,
    KeyIssued,
    Consumed,
}

/// Single-use token that authorizes exactly one blind-signing request
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct RedemptionKey([u8; 32]);

impl RedemptionKey {
    pub fn generate<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        RedemptionKey(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for RedemptionKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for RedemptionKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // Prefix only
        write!(f, "RedemptionKey({}..)", hex::encode(&self.0[..4]))
    }
}

impl FromStr for RedemptionKey {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|_| FlowError::UnknownKey)?;
        if bytes.len() != 32 {
            return Err(FlowError::UnknownKey);
        }
        let mut key = [0u8; 32];
        key.copy_from_slice(&bytes);
        Ok(RedemptionKey(key))
    }
}

/// What a redemption key was issued for
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RedemptionRecord {
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub state: IssuanceState,
}

/// Voter eligibility, owned by the user management system
pub trait UserDirectory {
    fn is_eligible(&self, user_id: Uuid, session_id: Uuid) -> bool;
}

impl<T: UserDirectory + ?Sized> UserDirectory for Arc<T> {
    fn is_eligible(&self, user_id: Uuid, session_id: Uuid) -> bool {
        (**self).is_eligible(user_id, session_id)
    }
}

/// Persistent redemption key state.
///
/// `issue` and `mark_consumed` must each be atomic: at most one key per
/// (voter, session), and at most one successful consumption per key.
pub trait RedemptionKeyStore {
    /// Issue a new key, failing with `AlreadyIssued` if the pair already has one
    fn issue(&self, user_id: Uuid, session_id: Uuid) -> Result<RedemptionKey, FlowError>;

    /// Look up what a key was issued for
    fn lookup(&self, key: &RedemptionKey) -> Option<RedemptionRecord>;

    /// Move a key from `KeyIssued` to `Consumed`.
    ///
    /// Returns `true` only for the caller that performed the transition.
    fn mark_consumed(&self, key: &RedemptionKey) -> bool;

    /// Current state for a (voter, session) pair
    fn state(&self, user_id: Uuid, session_id: Uuid) -> IssuanceState;
}

impl<T: RedemptionKeyStore + ?Sized> RedemptionKeyStore for Arc<T> {
    fn issue(&self, user_id: Uuid, session_id: Uuid) -> Result<RedemptionKey, FlowError> {
        (**self).issue(user_id, session_id)
    }

    fn lookup(&self, key: &RedemptionKey) -> Option<RedemptionRecord> {
        (**self).lookup(key)
    }

    fn mark_consumed(&self, key: &RedemptionKey) -> bool {
        (**self).mark_consumed(key)
    }

    fn state(&self, user_id: Uuid, session_id: Uuid) -> IssuanceState {
        (**self).state(user_id, session_id)
    }
}

/// A simple eligibility list kept in memory
#[derive(Default, Clone)]
pub struct MemUserDirectory {
    eligible: HashMap<Uuid, Vec<Uuid>>,
}

impl MemUserDirectory {
    /// Allow a voter to take part in a session
    pub fn allow(&mut self, user_id: Uuid, session_id: Uuid) {
        let sessions = self.eligible.entry(user_id).or_default();
        if !sessions.contains(&session_id) {
            sessions.push(session_id);
        }
    }
}

impl UserDirectory for MemUserDirectory {
    fn is_eligible(&self, user_id: Uuid, session_id: Uuid) -> bool {
        self.eligible
            .get(&user_id)
            .map_or(false, |sessions| sessions.contains(&session_id))
    }
}

#[derive(Default)]
struct MemKeys {
    by_key: HashMap<RedemptionKey, RedemptionRecord>,
    by_voter: HashMap<(Uuid, Uuid), RedemptionKey>,
}

/// Redemption keys held in memory behind a single lock
#[derive(Default)]
pub struct MemRedemptionKeyStore {
    inner: Mutex<MemKeys>,
}

impl MemRedemptionKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RedemptionKeyStore for MemRedemptionKeyStore {
    fn issue(&self, user_id: Uuid, session_id: Uuid) -> Result<RedemptionKey, FlowError> {
        let mut keys = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if keys.by_voter.contains_key(&(user_id, session_id)) {
            return Err(FlowError::AlreadyIssued);
        }

        let key = RedemptionKey::generate(&mut OsRng);
        keys.by_voter.insert((user_id, session_id), key);
        keys.by_key.insert(
            key,
            RedemptionRecord {
                user_id,
                session_id,
                state: IssuanceState::KeyIssued,
            },
        );
        Ok(key)
    }

    fn lookup(&self, key: &RedemptionKey) -> Option<RedemptionRecord> {
        let keys = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        keys.by_key.get(key).copied()
    }

    fn mark_consumed(&self, key: &RedemptionKey) -> bool {
        let mut keys = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        match keys.by_key.get_mut(key) {
            Some(record) if record.state == IssuanceState::KeyIssued => {
                record.state = IssuanceState::Consumed;
                true
            }
            _ => false,
        }
    }

    fn state(&self, user_id: Uuid, session_id: Uuid) -> IssuanceState {
        let keys = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        keys.by_voter
            .get(&(user_id, session_id))
            .and_then(|key| keys.by_key.get(key))
            .map_or(IssuanceState::NotIssued, |record| record.state)
    }
}

/// Issues one-time voting keys and gates blind signing on them
pub struct CredentialIssuer<S, U, K> {
    sessions: S,
    users: U,
    keys: K,
}

impl<S, U, K> CredentialIssuer<S, U, K>
where
    S: VoteSessionDirectory,
    U: UserDirectory,
    K: RedemptionKeyStore,
{
    pub fn new(sessions: S, users: U, keys: K) -> Self {
        CredentialIssuer {
            sessions,
            users,
            keys,
        }
    }

    /// Issue a voting key to an eligible voter of an open session
    pub fn issue(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        now: SystemTime,
    ) -> Result<RedemptionKey, FlowError> {
        let session = self
            .sessions
            .get_session(session_id)
            .ok_or(FlowError::UnknownSession(session_id))?;
        if !session.is_open(now) {
            return Err(FlowError::SessionClosed(session_id));
        }
        if !self.users.is_eligible(user_id, session_id) {
            return Err(FlowError::NotEligible(user_id));
        }

        let key = self.keys.issue(user_id, session_id)?;
        info!("issued voting key for voter {} in session {}", user_id, session_id);
        Ok(key)
    }

    /// Blind-sign on behalf of `signer_id`, consuming `key`.
    ///
    /// Concurrent calls with the same key produce exactly one signature; every
    /// other caller gets `AlreadyConsumed`. Nothing is consumed on failure.
    pub fn sign_blinded(
        &self,
        signer_id: Uuid,
        key: &RedemptionKey,
        blinded_value: &BigUint,
        now: SystemTime,
    ) -> Result<BigUint, FlowError> {
        let record = self.keys.lookup(key).ok_or(FlowError::UnknownKey)?;
        if record.state == IssuanceState::Consumed {
            return Err(FlowError::AlreadyConsumed);
        }

        let session = self
            .sessions
            .get_session(record.session_id)
            .ok_or(FlowError::UnknownSession(record.session_id))?;
        if !session.is_open(now) {
            return Err(FlowError::SessionClosed(record.session_id));
        }

        let private_key = self.sessions.get_private_key(record.session_id, signer_id)?;
        let blind_signature = sign(blinded_value, &private_key)?;

        if !self.keys.mark_consumed(key) {
            return Err(FlowError::AlreadyConsumed);
        }
        info!("consumed voting key in session {}", record.session_id);

        Ok(blind_signature)
    }

    /// Where a voter stands in a session
    pub fn state(&self, user_id: Uuid, session_id: Uuid) -> IssuanceState {
        self.keys.state(user_id, session_id)
    }
}
