//! Credential codec: HS256 signature verification plus the browser-equivalent unverified peek.
//!
//! Two decode paths exist on purpose. The route authorizer holds the signing secret and runs
//! [`JwtVerifier::verify`]; the in-browser session bootstrapper has no secret and uses
//! [`decode_unverified`] to hydrate an identity instantly, trusting the backend to re-validate
//! in the background. Expiry is checked against a caller-provided instant in both paths so
//! decisions stay deterministic under test; `jsonwebtoken`'s own clock-based check is disabled.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};
// self
use crate::{_prelude::*, auth::Claims, error::CredentialError};

/// Verifying half of the credential codec.
#[derive(Clone)]
pub struct JwtVerifier {
	decoding_key: DecodingKey,
	validation: Validation,
}
impl JwtVerifier {
	/// Builds a verifier for HS256-signed credentials over the provided shared secret.
	pub fn hs256(secret: &[u8]) -> Self {
		let mut validation = Validation::new(Algorithm::HS256);

		// Expiry is validated explicitly against an injected instant; see `verify_at`.
		validation.validate_exp = false;
		validation.validate_aud = false;
		validation.required_spec_claims = Default::default();

		Self { decoding_key: DecodingKey::from_secret(secret), validation }
	}

	/// Verifies the signature and decodes the claims, without an expiry check.
	pub fn verify(&self, token: &str) -> Result<Claims, CredentialError> {
		jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
			.map(|data| data.claims)
			.map_err(|e| match e.kind() {
				ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Utf8(_) =>
					CredentialError::MalformedStructure,
				_ => CredentialError::Verification { source: e },
			})
	}

	/// Verifies the signature and requires the claims to be active at `now`.
	pub fn verify_at(&self, token: &str, now: OffsetDateTime) -> Result<Claims, CredentialError> {
		let claims = self.verify(token)?;

		if claims.is_expired_at(now) {
			return Err(CredentialError::Expired);
		}

		Ok(claims)
	}
}
impl Debug for JwtVerifier {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("JwtVerifier")
			.field("algorithm", &Algorithm::HS256)
			.field("decoding_key", &"<redacted>")
			.finish()
	}
}

/// Decodes the claims payload without verifying the signature.
///
/// This mirrors what browser code can do with a cookie credential: read the payload for
/// instant hydration. Anything derived from it is Provisional until the backend confirms.
pub fn decode_unverified(token: &str) -> Result<Claims, CredentialError> {
	let segments: Vec<&str> = token.split('.').collect();

	if segments.len() != 3 {
		return Err(CredentialError::MalformedStructure);
	}

	let payload =
		URL_SAFE_NO_PAD.decode(segments[1]).map_err(|_| CredentialError::MalformedStructure)?;
	let mut deserializer = serde_json::Deserializer::from_slice(&payload);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| CredentialError::MalformedPayload { source })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		_preludet::{TEST_SECRET, issue_token, sample_claims, sample_claims_expiring},
		auth::Role,
	};

	#[test]
	fn verify_round_trips_signed_claims() {
		let claims = sample_claims(Role::Admin);
		let token = issue_token(&claims);
		let verifier = JwtVerifier::hs256(TEST_SECRET);
		let decoded = verifier.verify(&token).expect("Signed token should verify successfully.");

		assert_eq!(decoded, claims);
	}

	#[test]
	fn verify_rejects_wrong_secret_and_garbage() {
		let token = issue_token(&sample_claims(Role::Admin));
		let verifier = JwtVerifier::hs256(b"a-different-secret");

		assert!(matches!(
			verifier.verify(&token),
			Err(CredentialError::Verification { .. }),
		));
		assert!(matches!(
			verifier.verify("not-a-token"),
			Err(CredentialError::MalformedStructure),
		));
		assert!(matches!(
			verifier.verify("a.b"),
			Err(CredentialError::MalformedStructure),
		));
	}

	#[test]
	fn verify_at_enforces_strict_expiry() {
		let now = OffsetDateTime::now_utc();
		let claims = sample_claims_expiring(Role::Employee, now);
		let token = issue_token(&claims);
		let verifier = JwtVerifier::hs256(TEST_SECRET);

		assert!(
			verifier.verify(&token).is_ok(),
			"Signature verification alone must not consult the clock."
		);
		assert!(matches!(verifier.verify_at(&token, now), Err(CredentialError::Expired)));
		assert!(verifier.verify_at(&token, now - Duration::seconds(1)).is_ok());
	}

	#[test]
	fn unverified_decode_needs_no_secret() {
		let claims = sample_claims(Role::Accountant);
		let token = issue_token(&claims);
		let decoded =
			decode_unverified(&token).expect("Unverified decode should parse the payload.");

		assert_eq!(decoded, claims);
	}

	#[test]
	fn unverified_decode_rejects_malformed_tokens() {
		assert!(matches!(
			decode_unverified("one.two"),
			Err(CredentialError::MalformedStructure),
		));
		assert!(matches!(
			decode_unverified("!!!.###.$$$"),
			Err(CredentialError::MalformedStructure),
		));

		let not_claims = URL_SAFE_NO_PAD.encode(b"{\"role\":\"warehouse\"}");
		let err = decode_unverified(&format!("h.{not_claims}.s"))
			.expect_err("Out-of-vocabulary payloads must be rejected.");

		assert!(matches!(err, CredentialError::MalformedPayload { .. }));
	}

	#[test]
	fn verifier_debug_redacts_key_material() {
		let rendered = format!("{:?}", JwtVerifier::hs256(TEST_SECRET));

		assert!(rendered.contains("<redacted>"));
		assert!(!rendered.contains("portal-guard-test-secret"));
	}
}
