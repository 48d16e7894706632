//! The ceremony orchestrator: ties options generation and
//! response verification to the storage adapter, and owns session
//! lifecycle operations.

use chrono::{Duration, Utc};
use tracing::{info, warn};

use crate::authentication::{
    self, AuthenticationOptions, AuthenticationOptionsOverrides, StoredCredentialView,
    VerifiedAuthenticationInfo,
};
use crate::config::RelyingPartyConfig;
use crate::error::{AuthError, Result};
use crate::model::{ChallengeData, Operation, Session, UserId};
use crate::providers::{ChallengeStore, CredentialStore, SessionStore};
use crate::registration::{
    self, RegistrationOptions, RegistrationOptionsOverrides, UserHandleInput,
    VerifiedRegistrationInfo,
};
use crate::session_token;
use crate::wire::{AuthenticationCredential, RegistrationCredential};

/// Counts of expired records removed by [`RelyingParty::cleanup`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Expired challenges removed.
    pub challenges_deleted: u64,
    /// Expired sessions removed.
    pub sessions_deleted: u64,
}

/// The relying party: configuration plus the storage adapters the core
/// needs to orchestrate ceremonies.
///
/// The challenge and session stores are required type parameters rather
/// than optional fields; a caller with no interest in one of them can
/// supply a no-op implementation instead of relying on an `Option` field.
pub struct RelyingParty<Ch, Se, Cr> {
    config: RelyingPartyConfig,
    challenges: Ch,
    sessions: Se,
    credentials: Cr,
}

impl<Ch, Se, Cr> RelyingParty<Ch, Se, Cr>
where
    Ch: ChallengeStore,
    Se: SessionStore,
    Cr: CredentialStore,
{
    /// Construct a relying party, validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] if `config` fails validation.
    pub fn new(config: RelyingPartyConfig, challenges: Ch, sessions: Se, credentials: Cr) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            challenges,
            sessions,
            credentials,
        })
    }

    /// The relying-party configuration.
    #[must_use]
    pub const fn config(&self) -> &RelyingPartyConfig {
        &self.config
    }

    /// Begin a registration ceremony: build options and persist the
    /// challenge.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Storage`] if the challenge store write fails.
    pub async fn start_registration(
        &self,
        user: &UserHandleInput<'_>,
        user_id: Option<UserId>,
        overrides: &RegistrationOptionsOverrides,
    ) -> Result<RegistrationOptions> {
        let options = registration::build_creation_options(&self.config, user, overrides);
        self.persist_challenge(&options.challenge, user_id, Operation::Registration)
            .await?;
        info!(rp_id = %self.config.rp_id, "registration challenge issued");
        Ok(options)
    }

    /// Verify a `create` ceremony response and consume its challenge.
    ///
    /// # Errors
    ///
    /// Returns the first failing verification step's error. If
    /// verification succeeds but the challenge was already consumed by a
    /// concurrent call, returns [`AuthError::ChallengeMismatch`].
    pub async fn finish_registration(
        &self,
        credential: &RegistrationCredential,
        expected_challenge: &str,
        expected_origins: Option<&[String]>,
        expected_rp_ids: Option<&[String]>,
        require_user_verification: Option<bool>,
    ) -> Result<VerifiedRegistrationInfo> {
        let info = registration::verify_registration(
            &self.config,
            credential,
            expected_challenge,
            expected_origins,
            expected_rp_ids,
            require_user_verification,
        )?;
        self.consume_challenge(expected_challenge).await?;
        info!(credential_id = %info.credential_id, "registration verified");
        Ok(info)
    }

    /// Begin an authentication ceremony: build options and persist the
    /// challenge.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Storage`] if the challenge store write fails.
    pub async fn start_authentication(
        &self,
        user_id: Option<UserId>,
        overrides: &AuthenticationOptionsOverrides,
    ) -> Result<AuthenticationOptions> {
        let options = authentication::build_request_options(&self.config, overrides);
        self.persist_challenge(&options.challenge, user_id, Operation::Authentication)
            .await?;
        info!(rp_id = %self.config.rp_id, "authentication challenge issued");
        Ok(options)
    }

    /// Verify a `get` ceremony response, consume its challenge, and update
    /// the credential's counter and `last_used_at`.
    ///
    /// # Errors
    ///
    /// Returns the first failing verification step's error, including
    /// [`AuthError::CounterError`] on a cloned-authenticator signal.
    pub async fn finish_authentication(
        &self,
        credential: &AuthenticationCredential,
        expected_challenge: &str,
        stored: &StoredCredentialView<'_>,
        expected_origins: Option<&[String]>,
        expected_rp_ids: Option<&[String]>,
        require_user_verification: Option<bool>,
    ) -> Result<VerifiedAuthenticationInfo> {
        let info = authentication::verify_authentication(
            &self.config,
            credential,
            expected_challenge,
            stored,
            expected_origins,
            expected_rp_ids,
            require_user_verification,
        )?;

        self.credentials
            .update_counter(&info.credential_id, info.new_counter)
            .await?;
        self.credentials.update_last_used(&info.credential_id).await?;
        self.consume_challenge(expected_challenge).await?;

        info!(credential_id = %info.credential_id, new_counter = info.new_counter, "authentication verified");
        Ok(info)
    }

    /// Create and persist a new session, returning a sealed token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Storage`] if the session store write fails, or
    /// [`AuthError::TokenCreationFailed`] on sealing failure.
    pub async fn create_session(
        &self,
        user_id: UserId,
        credential_id: String,
        user_verified: bool,
        extra: std::collections::HashMap<String, serde_json::Value>,
    ) -> Result<String> {
        let session_id = session_token::generate_session_id();
        let session = Session {
            session_id: session_id.clone(),
            user_id,
            credential_id,
            user_verified,
            expires_at: Utc::now() + Duration::milliseconds(self.config.session_duration_ms_i64()),
            extra,
        };
        self.sessions.create(&session_id, session.clone()).await?;
        let token = session_token::seal(&session_id, &session, &self.config.token_secret)?;
        info!(session_id = %session_id, "session created");
        Ok(token)
    }

    /// Open and validate a session token, preferring the stored session
    /// over the token-embedded copy.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`], [`AuthError::SessionExpired`],
    /// or [`AuthError::SessionNotFound`].
    pub async fn validate_session(&self, token: &str) -> Result<Session> {
        let opened = session_token::open(token, &self.config.token_secret)?;
        if opened.session.is_expired(Utc::now()) {
            return Err(AuthError::SessionExpired);
        }
        match self.sessions.find(&opened.session_id).await? {
            Some(stored) => Ok(stored),
            None => Err(AuthError::SessionNotFound),
        }
    }

    /// Validate a session, then extend its expiry and reseal it.
    ///
    /// # Errors
    ///
    /// Same as [`Self::validate_session`], plus sealing failures.
    pub async fn refresh_session(&self, token: &str) -> Result<String> {
        let mut session = self.validate_session(token).await?;
        session.expires_at = Utc::now() + Duration::milliseconds(self.config.session_duration_ms_i64());
        self.sessions.update(&session.session_id, session.clone()).await?;
        let new_token = session_token::seal(&session.session_id, &session, &self.config.token_secret)?;
        info!(session_id = %session.session_id, "session refreshed");
        Ok(new_token)
    }

    /// Revoke a session token. Never fails: an invalid token is treated as
    /// a no-op.
    pub async fn revoke_session(&self, token: &str) {
        match session_token::open(token, &self.config.token_secret) {
            Ok(opened) => match self.sessions.delete(&opened.session_id).await {
                Ok(()) => info!(session_id = %opened.session_id, "session revoked"),
                Err(err) => warn!(error = %err, "session revocation storage error"),
            },
            Err(_) => warn!("revoke_session called with an invalid token; treating as no-op"),
        }
    }

    /// Sweep expired challenges and sessions.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Storage`] if either sweep fails.
    pub async fn cleanup(&self) -> Result<CleanupReport> {
        let challenges_deleted = self.challenges.delete_expired().await?;
        let sessions_deleted = self.sessions.delete_expired().await?;
        info!(challenges_deleted, sessions_deleted, "cleanup swept expired records");
        Ok(CleanupReport {
            challenges_deleted,
            sessions_deleted,
        })
    }

    async fn persist_challenge(
        &self,
        challenge: &str,
        user_id: Option<UserId>,
        operation: Operation,
    ) -> Result<()> {
        let now = Utc::now();
        self.challenges
            .create(ChallengeData {
                challenge: challenge.to_string(),
                user_id,
                operation,
                created_at: now,
                expires_at: now + Duration::milliseconds(self.config.operation_timeout_ms_i64()),
            })
            .await
    }

    async fn consume_challenge(&self, challenge: &str) -> Result<()> {
        if self.challenges.delete(challenge).await? {
            Ok(())
        } else {
            Err(AuthError::ChallengeMismatch)
        }
    }
}
