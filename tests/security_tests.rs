//! Adversarial tests covering the properties an attacker would try to
//! break: phishing (origin mismatch), replay (challenge/token reuse),
//! cloned authenticators (counter regression), and token tampering.

mod support;

use passkey_core::authentication::{AuthenticationOptionsOverrides, StoredCredentialView};
use passkey_core::authenticator_data::flags;
use passkey_core::config::RelyingPartyConfig;
use passkey_core::error::AuthError;
use passkey_core::mocks::{InMemoryChallengeStore, InMemoryCredentialStore, InMemorySessionStore};
use passkey_core::orchestrator::RelyingParty;
use passkey_core::registration::{RegistrationOptionsOverrides, UserHandleInput};

const RP_ID: &str = "example.com";
const ORIGIN: &str = "https://example.com";

fn config() -> RelyingPartyConfig {
    RelyingPartyConfig::new("Example Co", RP_ID, vec![5u8; 32]).with_origin(ORIGIN)
}

fn rp() -> RelyingParty<InMemoryChallengeStore, InMemorySessionStore, InMemoryCredentialStore> {
    RelyingParty::new(
        config(),
        InMemoryChallengeStore::new(),
        InMemorySessionStore::new(),
        InMemoryCredentialStore::new(),
    )
    .expect("config validates")
}

async fn register_credential(
    rp: &RelyingParty<InMemoryChallengeStore, InMemorySessionStore, InMemoryCredentialStore>,
    credential_id: &str,
    counter: u32,
) -> passkey_core::registration::VerifiedRegistrationInfo {
    let keypair = support::es256_keypair();
    let aaguid = [0x44; 16];
    let auth_data = support::build_authenticator_data(
        RP_ID,
        flags::UP | flags::UV | flags::AT,
        counter,
        Some((&aaguid, credential_id.as_bytes(), &keypair.cose_key_bytes)),
    );
    let options = rp
        .start_registration(
            &UserHandleInput {
                username: "victim",
                display_name: "Victim",
            },
            Some("victim-user".into()),
            &RegistrationOptionsOverrides::default(),
        )
        .await
        .unwrap();
    let (_, client_data) =
        support::build_client_data_b64url("webauthn.create", &options.challenge, ORIGIN);
    let credential = support::registration_credential(
        credential_id,
        client_data,
        support::build_attestation_object(&auth_data),
    );
    rp.finish_registration(&credential, &options.challenge, None, None, None)
        .await
        .unwrap()
}

#[tokio::test]
async fn phishing_origin_is_rejected() {
    let rp = rp();
    let options = rp
        .start_registration(
            &UserHandleInput {
                username: "alice",
                display_name: "Alice",
            },
            None,
            &RegistrationOptionsOverrides::default(),
        )
        .await
        .unwrap();

    let keypair = support::es256_keypair();
    let aaguid = [0x01; 16];
    let auth_data = support::build_authenticator_data(
        RP_ID,
        flags::UP | flags::UV | flags::AT,
        0,
        Some((&aaguid, b"cred-phish", &keypair.cose_key_bytes)),
    );
    let (_, client_data) = support::build_client_data_b64url(
        "webauthn.create",
        &options.challenge,
        "https://attacker.example",
    );
    let credential = support::registration_credential(
        "cred-phish",
        client_data,
        support::build_attestation_object(&auth_data),
    );

    let err = rp
        .finish_registration(&credential, &options.challenge, None, None, None)
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::OriginMismatch);
    assert_eq!(err.code(), "ORIGIN_MISMATCH");
    assert!(err.is_security_issue());
}

#[tokio::test]
async fn tampered_challenge_is_rejected() {
    let rp = rp();
    let options = rp
        .start_registration(
            &UserHandleInput {
                username: "alice",
                display_name: "Alice",
            },
            None,
            &RegistrationOptionsOverrides::default(),
        )
        .await
        .unwrap();

    let keypair = support::es256_keypair();
    let aaguid = [0x02; 16];
    let auth_data = support::build_authenticator_data(
        RP_ID,
        flags::UP | flags::UV | flags::AT,
        0,
        Some((&aaguid, b"cred-chal", &keypair.cose_key_bytes)),
    );
    // Flip one bit of the challenge presented back in clientData: the
    // orchestrator is still given the real expected_challenge, so this
    // simulates an attacker substituting a different client-data blob.
    let mut tampered_challenge = options.challenge.clone();
    let last = tampered_challenge.pop().unwrap();
    tampered_challenge.push(if last == 'A' { 'B' } else { 'A' });
    let (_, client_data) =
        support::build_client_data_b64url("webauthn.create", &tampered_challenge, ORIGIN);
    let credential = support::registration_credential(
        "cred-chal",
        client_data,
        support::build_attestation_object(&auth_data),
    );

    let err = rp
        .finish_registration(&credential, &options.challenge, None, None, None)
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::ChallengeMismatch);
}

#[tokio::test]
async fn cloned_authenticator_counter_regression_is_rejected() {
    let rp = rp();
    let verified = register_credential(&rp, "cred-counter", 5).await;
    assert_eq!(verified.counter, 5);

    let keypair_for_auth = support::es256_keypair();
    let auth_options = rp
        .start_authentication(None, &AuthenticationOptionsOverrides::default())
        .await
        .unwrap();

    // A non-advancing counter (equal to the stored value) signals a cloned
    // authenticator replaying an old state.
    let assertion_auth_data =
        support::build_authenticator_data(RP_ID, flags::UP | flags::UV, 5, None);
    let (client_data_bytes, client_data_b64) =
        support::build_client_data_b64url("webauthn.get", &auth_options.challenge, ORIGIN);
    let mut signing_input = assertion_auth_data.clone();
    signing_input.extend_from_slice(&passkey_core::crypto::hash::sha256(&client_data_bytes));
    // Signed with an unrelated key: this test only needs to reach the
    // counter check, which runs before signature verification.
    let signature = support::sign_es256(&keypair_for_auth.signing_key, &signing_input);

    let auth_credential = support::authentication_credential(
        "cred-counter",
        client_data_b64,
        assertion_auth_data,
        signature,
    );
    let stored = StoredCredentialView {
        credential_id: "cred-counter",
        public_key_cose: &verified.public_key_cose,
        counter: verified.counter,
    };

    let err = rp
        .finish_authentication(
            &auth_credential,
            &auth_options.challenge,
            &stored,
            None,
            None,
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::CounterError);
    assert!(err.is_security_issue());
}

#[tokio::test]
async fn tampered_session_token_is_rejected() {
    let rp = rp();
    let token = rp
        .create_session(
            "user-1".into(),
            "cred-1".into(),
            true,
            std::collections::HashMap::new(),
        )
        .await
        .unwrap();

    let mut tampered = token.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    let err = rp.validate_session(&tampered).await.unwrap_err();
    assert_eq!(err, AuthError::InvalidToken);
    assert!(err.is_security_issue());
}

#[tokio::test]
async fn session_token_sealed_with_wrong_secret_is_rejected() {
    let rp = rp();
    let token = rp
        .create_session(
            "user-1".into(),
            "cred-1".into(),
            true,
            std::collections::HashMap::new(),
        )
        .await
        .unwrap();

    let other_rp = RelyingParty::new(
        RelyingPartyConfig::new("Example Co", RP_ID, vec![9u8; 32]).with_origin(ORIGIN),
        InMemoryChallengeStore::new(),
        InMemorySessionStore::new(),
        InMemoryCredentialStore::new(),
    )
    .unwrap();

    let err = other_rp.validate_session(&token).await.unwrap_err();
    assert_eq!(err, AuthError::InvalidToken);
}

#[tokio::test]
async fn concurrent_registration_finish_consumes_challenge_exactly_once() {
    use std::sync::Arc;

    let rp = Arc::new(rp());
    let options = rp
        .start_registration(
            &UserHandleInput {
                username: "alice",
                display_name: "Alice",
            },
            None,
            &RegistrationOptionsOverrides::default(),
        )
        .await
        .unwrap();

    let keypair = support::es256_keypair();
    let aaguid = [0x05; 16];
    let auth_data = support::build_authenticator_data(
        RP_ID,
        flags::UP | flags::UV | flags::AT,
        0,
        Some((&aaguid, b"cred-race", &keypair.cose_key_bytes)),
    );
    let (_, client_data) =
        support::build_client_data_b64url("webauthn.create", &options.challenge, ORIGIN);
    let attestation_object = support::build_attestation_object(&auth_data);

    let mut handles = Vec::new();
    for _ in 0..10 {
        let rp = Arc::clone(&rp);
        let challenge = options.challenge.clone();
        let client_data = client_data.clone();
        let attestation_object = attestation_object.clone();
        handles.push(tokio::spawn(async move {
            let credential = support::registration_credential(
                "cred-race",
                client_data,
                attestation_object,
            );
            rp.finish_registration(&credential, &challenge, None, None, None)
                .await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }
    assert_eq!(successes, 1);
}
