//! Profile and session management
//!
//! Authentication proper is out of scope; this is the mocked collaborator the
//! core talks to. It owns the [`UserProfile`] and exposes a defined mutation
//! surface: the core reads `credits`/`id` and mutates only through
//! [`AuthClient::debit_credit`].

use std::sync::{Arc, Mutex};

use crate::error::Error;
use crate::ids;
use crate::model::{Currency, UserProfile};
use crate::store::KvStore;

/// Session key in the key-value boundary
pub const SESSION_KEY: &str = "carscube_session";

/// Credits granted to a newly created profile
pub const STARTING_CREDITS: u32 = 5;

/// Client for profile and session state
pub struct AuthClient {
    kv: Arc<dyn KvStore>,

    /// The current session
    session: Mutex<Option<UserProfile>>,
}

impl AuthClient {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self {
            kv,
            session: Mutex::new(None),
        }
    }

    /// Restore a persisted session, if any
    pub async fn load_session(&self) -> Result<Option<UserProfile>, Error> {
        let Some(raw) = self.kv.get(SESSION_KEY).await? else {
            return Ok(None);
        };
        let profile: Option<UserProfile> = serde_json::from_str(&raw).map_err(|e| {
            log::error!("stored session failed to parse: {e}");
            e
        })?;
        *self.session.lock().unwrap() = profile.clone();
        Ok(profile)
    }

    /// Mock sign-in: creates a fresh profile with starting credits and
    /// persists it as the active session
    pub async fn sign_in(&self, name: &str, email: &str) -> Result<UserProfile, Error> {
        let profile = UserProfile {
            id: ids::random_base36(9),
            name: name.to_string(),
            email: email.to_string(),
            phone: None,
            currency: Currency::Inr,
            company_name: None,
            credits: STARTING_CREDITS,
            has_completed_onboarding: false,
        };

        self.persist(Some(&profile)).await?;
        *self.session.lock().unwrap() = Some(profile.clone());
        Ok(profile)
    }

    /// Clear the active session
    pub async fn sign_out(&self) -> Result<(), Error> {
        self.persist(None).await?;
        *self.session.lock().unwrap() = None;
        Ok(())
    }

    /// The current profile, if signed in
    pub fn current_user(&self) -> Option<UserProfile> {
        self.session.lock().unwrap().clone()
    }

    /// Replace the profile (name, phone, company details) and persist it
    pub async fn update_profile(&self, profile: UserProfile) -> Result<(), Error> {
        self.persist(Some(&profile)).await?;
        *self.session.lock().unwrap() = Some(profile);
        Ok(())
    }

    /// Spend one credit. The in-memory profile is updated first so the debit
    /// is visible immediately; persistence follows. Fails at zero credits
    /// without touching anything.
    pub async fn debit_credit(&self) -> Result<u32, Error> {
        let debited = {
            let mut session = self.session.lock().unwrap();
            let profile = session
                .as_mut()
                .ok_or_else(|| Error::general("no active session"))?;
            profile.credits = profile
                .credits
                .checked_sub(1)
                .ok_or(Error::InsufficientCredits)?;
            profile.clone()
        };

        if let Err(e) = self.persist(Some(&debited)).await {
            // The in-memory debit stands; the stored profile will lag until
            // the next successful persist
            log::error!("credit debit not persisted: {e}");
            return Err(e);
        }
        Ok(debited.credits)
    }

    /// One-way false -> true transition
    pub async fn complete_onboarding(&self) -> Result<(), Error> {
        let updated = {
            let mut session = self.session.lock().unwrap();
            let profile = session
                .as_mut()
                .ok_or_else(|| Error::general("no active session"))?;
            profile.has_completed_onboarding = true;
            profile.clone()
        };
        self.persist(Some(&updated)).await
    }

    async fn persist(&self, profile: Option<&UserProfile>) -> Result<(), Error> {
        let encoded = serde_json::to_string(&profile)?;
        self.kv.set(SESSION_KEY, &encoded).await
    }
}
