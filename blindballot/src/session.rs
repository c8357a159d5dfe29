use crate::*;
use rand::{CryptoRng, RngCore};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::SystemTime;
use uuid::Uuid;

/// A vote session as seen by the ballot core
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct VoteSession {
    pub id: Uuid,

    /// Credentials can be issued and signed strictly before this instant
    pub end_date: SystemTime,

    /// The only identity allowed to load the session's private key
    pub signer: Uuid,

    /// Public-only key material handed to voters
    pub public_key: KeyMaterial,
}

impl VoteSession {
    pub fn is_open(&self, now: SystemTime) -> bool {
        now < self.end_date
    }
}

/// Read access to vote sessions and their keys
pub trait VoteSessionDirectory {
    /// Get a vote session
    fn get_session(&self, id: Uuid) -> Option<VoteSession>;

    /// Get the private key of a session.
    ///
    /// Implementations must refuse anyone but the session's assigned signer.
    fn get_private_key(&self, id: Uuid, signer: Uuid) -> Result<KeyMaterial, FlowError>;

    /// Get the public key of a session
    fn get_public_key(&self, id: Uuid) -> Result<KeyMaterial, FlowError> {
        match self.get_session(id) {
            Some(session) => Ok(session.public_key),
            None => Err(FlowError::UnknownSession(id)),
        }
    }
}

impl<T: VoteSessionDirectory + ?Sized> VoteSessionDirectory for Arc<T> {
    fn get_session(&self, id: Uuid) -> Option<VoteSession> {
        (**self).get_session(id)
    }

    fn get_private_key(&self, id: Uuid, signer: Uuid) -> Result<KeyMaterial, FlowError> {
        (**self).get_private_key(id, signer)
    }

    fn get_public_key(&self, id: Uuid) -> Result<KeyMaterial, FlowError> {
        (**self).get_public_key(id)
    }
}

/// A simple session directory that keeps everything in memory
#[derive(Default, Clone)]
pub struct MemSessionDirectory {
    sessions: HashMap<Uuid, VoteSession>,
    private_keys: HashMap<Uuid, KeyMaterial>,
}

impl MemSessionDirectory {
    /// Create a session with a freshly generated key pair
    pub fn create_session<R: CryptoRng + RngCore>(
        &mut self,
        rng: &mut R,
        end_date: SystemTime,
        signer: Uuid,
        bits: usize,
    ) -> Result<Uuid, Error> {
        let generated = KeyMaterial::generate(rng, bits)?;
        let session = VoteSession {
            id: Uuid::new_v4(),
            end_date,
            signer,
            public_key: generated.material.to_public(),
        };
        let id = session.id;
        self.insert(session, generated.material)?;

        Ok(id)
    }

    /// Register a session with existing key material
    pub fn insert(&mut self, session: VoteSession, private_key: KeyMaterial) -> Result<(), Error> {
        if !private_key.is_private() {
            return Err(Error::InvalidKey("missing private exponent"));
        }
        if session.public_key != private_key.to_public() {
            return Err(Error::InvalidKey("session public key does not match private key"));
        }

        self.private_keys.insert(session.id, private_key);
        self.sessions.insert(session.id, session);
        Ok(())
    }
}

impl VoteSessionDirectory for MemSessionDirectory {
    fn get_session(&self, id: Uuid) -> Option<VoteSession> {
        self.sessions.get(&id).cloned()
    }

    fn get_private_key(&self, id: Uuid, signer: Uuid) -> Result<KeyMaterial, FlowError> {
        let session = self.sessions.get(&id).ok_or(FlowError::UnknownSession(id))?;
        if session.signer != signer {
            warn!("{} attempted to load the private key of session {}", signer, id);
            return Err(FlowError::NotSigner(signer));
        }

        self.private_keys
            .get(&id)
            .cloned()
            .ok_or(FlowError::UnknownSession(id))
    }
}

/// Read-through cache of session public keys.
///
/// Key material never changes after a session is created, so entries are only
/// dropped explicitly.
#[derive(Default)]
pub struct KeyCache {
    inner: RwLock<HashMap<Uuid, Arc<KeyMaterial>>>,
}

impl KeyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the public key of a session, loading it from `directory` on a miss
    pub fn get_or_load<D: VoteSessionDirectory + ?Sized>(
        &self,
        directory: &D,
        session_id: Uuid,
    ) -> Result<Arc<KeyMaterial>, FlowError> {
        {
            let cached = self.inner.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(key) = cached.get(&session_id) {
                return Ok(key.clone());
            }
        }

        let key = Arc::new(directory.get_public_key(session_id)?.to_public());
        let mut cached = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        Ok(cached.entry(session_id).or_insert(key).clone())
    }

    pub fn invalidate(&self, session_id: Uuid) {
        let mut cached = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        cached.remove(&session_id);
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::textbook_session;
    use std::cell::Cell;
    use std::time::Duration;

    /// Counts how often the public key is fetched
    struct CountingDirectory {
        inner: MemSessionDirectory,
        loads: Cell<usize>,
    }

    impl VoteSessionDirectory for CountingDirectory {
        fn get_session(&self, id: Uuid) -> Option<VoteSession> {
            self.inner.get_session(id)
        }

        fn get_private_key(&self, id: Uuid, signer: Uuid) -> Result<KeyMaterial, FlowError> {
            self.inner.get_private_key(id, signer)
        }

        fn get_public_key(&self, id: Uuid) -> Result<KeyMaterial, FlowError> {
            self.loads.set(self.loads.get() + 1);
            self.inner.get_public_key(id)
        }
    }

    #[test]
    fn session_open_until_end_date() {
        let now = SystemTime::now();
        let (session, _key) = textbook_session(now + Duration::from_secs(60));
        assert!(session.is_open(now));
        assert!(!session.is_open(now + Duration::from_secs(60)));
        assert!(!session.is_open(now + Duration::from_secs(61)));
    }

    #[test]
    fn only_the_signer_gets_the_private_key() {
        let (session, key) = textbook_session(SystemTime::now());
        let mut directory = MemSessionDirectory::default();
        directory.insert(session.clone(), key.clone()).unwrap();

        assert_eq!(directory.get_private_key(session.id, session.signer).unwrap(), key);

        let intruder = Uuid::new_v4();
        assert_eq!(
            directory.get_private_key(session.id, intruder),
            Err(FlowError::NotSigner(intruder))
        );

        let public_key = directory.get_public_key(session.id).unwrap();
        assert!(!public_key.is_private());

        let missing = Uuid::new_v4();
        assert_eq!(
            directory.get_public_key(missing),
            Err(FlowError::UnknownSession(missing))
        );
    }

    #[test]
    fn insert_rejects_mismatched_keys() {
        let (session, key) = textbook_session(SystemTime::now());
        let mut directory = MemSessionDirectory::default();

        assert!(directory.insert(session.clone(), key.to_public()).is_err());

        let other = KeyMaterial::new(
            num_bigint::BigUint::from(3233u32),
            num_bigint::BigUint::from(7u32),
            Some(num_bigint::BigUint::from(1783u32)),
        )
        .unwrap();
        assert!(directory.insert(session, other).is_err());
    }

    #[test]
    fn create_session_generates_keys() {
        let mut rng = rand::thread_rng();
        let mut directory = MemSessionDirectory::default();
        let signer = Uuid::new_v4();

        // Note: Uses INSECURE 512 bit key for quick testing
        let id = directory
            .create_session(&mut rng, SystemTime::now(), signer, 512)
            .unwrap();

        let session = directory.get_session(id).unwrap();
        assert_eq!(session.signer, signer);
        assert_eq!(session.public_key.bits(), 512);
        assert_eq!(
            directory.get_private_key(id, signer).unwrap().to_public(),
            session.public_key
        );
    }

    #[test]
    fn cache_reads_through_once() {
        let (session, key) = textbook_session(SystemTime::now());
        let mut inner = MemSessionDirectory::default();
        inner.insert(session.clone(), key.clone()).unwrap();
        let directory = CountingDirectory {
            inner,
            loads: Cell::new(0),
        };

        let cache = KeyCache::new();
        assert!(cache.is_empty());

        let first = cache.get_or_load(&directory, session.id).unwrap();
        let second = cache.get_or_load(&directory, session.id).unwrap();
        assert_eq!(*first, key.to_public());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(directory.loads.get(), 1);
        assert_eq!(cache.len(), 1);

        cache.invalidate(session.id);
        cache.get_or_load(&directory, session.id).unwrap();
        assert_eq!(directory.loads.get(), 2);

        // Misses are not cached
        assert!(cache.get_or_load(&directory, Uuid::new_v4()).is_err());
        assert_eq!(cache.len(), 1);
    }
}
