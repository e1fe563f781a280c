#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use portal_guard::{
	_preludet::*,
	auth::{CredentialSecret, Role},
	session::{RefreshOutcome, SessionState, SignOutReason, Trust},
	store::CredentialStore,
};

async fn seed_credential(store: &dyn CredentialStore, token: &str) {
	store
		.save(CredentialSecret::new(token))
		.await
		.expect("Seeding the credential store should succeed.");
}

fn confirmed_user_body() -> serde_json::Value {
	serde_json::json!({
		"user": {
			"id": "user-1",
			"name": "Confirmed User",
			"email": "user@example.com",
			"role": "admin",
			"permissions": ["expense.read", "expense.write"],
			"portalAccess": ["crm"],
		}
	})
}

#[tokio::test]
async fn bootstrap_hydrates_a_provisional_identity_without_network() {
	let server = MockServer::start_async().await;
	let (session, store) = build_reqwest_test_session(&server.base_url());
	let claims = sample_claims(Role::Admin);

	seed_credential(store.as_ref(), &issue_token(&claims)).await;

	let state = session.bootstrap().await.expect("Bootstrap should succeed.");

	// No mock was registered: any backend call would have failed loudly. The identity
	// readable right now is the token-derived one.
	match state {
		SessionState::Authenticated { identity, trust } => {
			assert_eq!(trust, Trust::Provisional);
			assert_eq!(identity.id, claims.id);
			assert_eq!(identity.role, Role::Admin);
		},
		other => panic!("Expected a provisional identity, got {other:?}."),
	}
	assert!(session.is_authenticated());
}

#[tokio::test]
async fn bootstrap_without_credential_signs_out() {
	let server = MockServer::start_async().await;
	let (session, _store) = build_reqwest_test_session(&server.base_url());
	let state = session.bootstrap().await.expect("Bootstrap should succeed.");

	assert_eq!(state, SessionState::SignedOut { reason: SignOutReason::MissingCredential });
}

#[tokio::test]
async fn bootstrap_with_expired_credential_purges_and_signs_out() {
	let server = MockServer::start_async().await;
	let (session, store) = build_reqwest_test_session(&server.base_url());
	let expired = sample_claims_expiring(Role::Admin, OffsetDateTime::now_utc() - Duration::minutes(1));

	seed_credential(store.as_ref(), &issue_token(&expired)).await;

	let state = session.bootstrap().await.expect("Bootstrap should succeed.");

	assert_eq!(state, SessionState::SignedOut { reason: SignOutReason::Expired });
	assert!(
		store.load().await.expect("Store load should succeed.").is_none(),
		"An expired credential must be purged."
	);
}

#[tokio::test]
async fn bootstrap_with_restricted_role_purges_and_signs_out() {
	let server = MockServer::start_async().await;
	let (session, store) = build_reqwest_test_session(&server.base_url());

	seed_credential(store.as_ref(), &issue_token(&sample_claims(Role::Supplier))).await;

	let state = session.bootstrap().await.expect("Bootstrap should succeed.");

	assert_eq!(state, SessionState::SignedOut { reason: SignOutReason::AccessDenied });
	assert!(store.load().await.expect("Store load should succeed.").is_none());
}

#[tokio::test]
async fn bootstrap_with_garbage_credential_signs_out() {
	let server = MockServer::start_async().await;
	let (session, store) = build_reqwest_test_session(&server.base_url());

	seed_credential(store.as_ref(), "not-a-jwt-at-all").await;

	let state = session.bootstrap().await.expect("Bootstrap should succeed.");

	assert_eq!(state, SessionState::SignedOut { reason: SignOutReason::InvalidCredential });
}

#[tokio::test]
async fn refresh_failure_leaves_the_provisional_identity_untouched() {
	let server = MockServer::start_async().await;
	let (session, store) = build_reqwest_test_session(&server.base_url());
	let claims = sample_claims(Role::Admin);

	seed_credential(store.as_ref(), &issue_token(&claims)).await;
	session.bootstrap().await.expect("Bootstrap should succeed.");

	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/auth/me");
			then.status(503);
		})
		.await;
	let before = session.state();
	let outcome = session.refresh_in_background().await;

	mock.assert_async().await;

	assert_eq!(outcome, RefreshOutcome::Unavailable);
	assert_eq!(session.state(), before, "A transient failure must never mutate the identity.");
	assert_eq!(session.refresh_metrics.failures(), 1);
	assert!(session.is_authenticated());
}

#[tokio::test]
async fn refresh_confirms_and_replaces_the_identity() {
	let server = MockServer::start_async().await;
	let (session, store) = build_reqwest_test_session(&server.base_url());

	seed_credential(store.as_ref(), &issue_token(&sample_claims(Role::Admin))).await;
	session.bootstrap().await.expect("Bootstrap should succeed.");

	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/auth/me");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(confirmed_user_body());
		})
		.await;
	let outcome = session.refresh_in_background().await;

	mock.assert_async().await;

	assert_eq!(outcome, RefreshOutcome::Refreshed);

	let state = session.state();

	assert_eq!(state.trust(), Some(Trust::Confirmed));
	assert_eq!(
		state.identity().map(|identity| identity.name.as_str()),
		Some("Confirmed User"),
		"The backend profile fully replaces the token-derived identity."
	);
}

#[tokio::test]
async fn refresh_without_portal_access_signs_out_and_purges() {
	let server = MockServer::start_async().await;
	let (session, store) = build_reqwest_test_session(&server.base_url());

	seed_credential(store.as_ref(), &issue_token(&sample_claims(Role::Employee))).await;
	session.bootstrap().await.expect("Bootstrap should succeed.");

	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/auth/me");
			then.status(200).header("content-type", "application/json").json_body(
				serde_json::json!({
					"user": {
						"id": "user-1",
						"name": "Scoped Out",
						"email": "user@example.com",
						"role": "employee",
						"permissions": [],
						"portalAccess": ["supplier-hub"],
					}
				}),
			);
		})
		.await;
	let outcome = session.refresh_in_background().await;

	mock.assert_async().await;

	assert_eq!(outcome, RefreshOutcome::SignedOut);
	assert_eq!(
		session.state(),
		SessionState::SignedOut { reason: SignOutReason::AccessDenied },
	);
	assert!(
		store.load().await.expect("Store load should succeed.").is_none(),
		"Revoked portal access must purge the credential."
	);
}

#[tokio::test]
async fn concurrent_refreshes_coalesce_into_one_backend_call() {
	let server = MockServer::start_async().await;
	let (session, store) = build_reqwest_test_session(&server.base_url());

	seed_credential(store.as_ref(), &issue_token(&sample_claims(Role::Admin))).await;
	session.bootstrap().await.expect("Bootstrap should succeed.");

	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/auth/me");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(confirmed_user_body());
		})
		.await;
	let (first, second) =
		tokio::join!(session.refresh_in_background(), session.refresh_in_background());

	mock.assert_hits_async(1).await;

	let mut outcomes = [first, second];

	outcomes.sort_by_key(|outcome| format!("{outcome:?}"));

	assert_eq!(outcomes, [RefreshOutcome::Coalesced, RefreshOutcome::Refreshed]);
}

#[tokio::test]
async fn sequential_refreshes_dial_the_backend_each_time() {
	let server = MockServer::start_async().await;
	let (session, store) = build_reqwest_test_session(&server.base_url());

	seed_credential(store.as_ref(), &issue_token(&sample_claims(Role::Admin))).await;
	session.bootstrap().await.expect("Bootstrap should succeed.");

	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/auth/me");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(confirmed_user_body());
		})
		.await;

	assert_eq!(session.refresh_in_background().await, RefreshOutcome::Refreshed);
	assert_eq!(
		session.refresh_in_background().await,
		RefreshOutcome::Refreshed,
		"Only overlapping flights coalesce; a later refresh re-validates."
	);

	mock.assert_hits_async(2).await;
}

#[tokio::test]
async fn responses_landing_after_logout_are_discarded() {
	let server = MockServer::start_async().await;
	let (session, store) = build_reqwest_test_session(&server.base_url());

	seed_credential(store.as_ref(), &issue_token(&sample_claims(Role::Admin))).await;
	session.bootstrap().await.expect("Bootstrap should succeed.");

	server
		.mock_async(|when, then| {
			when.method(GET).path("/auth/me");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(confirmed_user_body())
				.delay(std::time::Duration::from_millis(300));
		})
		.await;

	let background = {
		let session = session.clone();

		tokio::spawn(async move { session.refresh_in_background().await })
	};

	tokio::time::sleep(std::time::Duration::from_millis(100)).await;
	session.logout().await.expect("Logout should succeed.");

	let outcome = background.await.expect("Refresh task should not panic.");

	assert_eq!(outcome, RefreshOutcome::Discarded);
	assert_eq!(
		session.state(),
		SessionState::SignedOut { reason: SignOutReason::LoggedOut },
		"A stale refresh must not resurrect a logged-out session."
	);
}

#[tokio::test]
async fn refresh_on_a_signed_out_session_is_idle() {
	let server = MockServer::start_async().await;
	let (session, _store) = build_reqwest_test_session(&server.base_url());

	session.bootstrap().await.expect("Bootstrap should succeed.");

	assert_eq!(session.refresh_in_background().await, RefreshOutcome::Idle);
}
