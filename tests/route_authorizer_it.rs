// self
use portal_guard::{
	_preludet::*,
	auth::{Claims, PermissionSet, Role},
	policy::PortalPolicy,
	routes::{Authorizer, RouteRule, RouteTable, Verdict},
};

fn permissions(entries: &[&str]) -> PermissionSet {
	PermissionSet::new(entries.iter().copied()).expect("Permission fixture should be valid.")
}

fn claims_with(role: Role, granted: &[&str]) -> Claims {
	let mut claims = sample_claims(role);

	claims.permissions = permissions(granted);

	claims
}

fn authorizer() -> Authorizer {
	let table = RouteTable::builder()
		.rule(RouteRule::for_prefix("/users").require_roles([Role::SuperAdmin, Role::Admin]))
		.rule(
			RouteRule::for_prefix("/expenses")
				.require_permissions(permissions(&["expense.read", "expense.write"])),
		)
		.rule(RouteRule::for_prefix("/buying").require_roles([Role::Admin]))
		.rule(
			RouteRule::for_prefix("/buying/return")
				.require_roles([Role::Admin, Role::Manager]),
		)
		.build()
		.expect("Route table fixture should build successfully.");

	Authorizer::new(table, PortalPolicy::default(), test_verifier())
}

#[test]
fn missing_cookie_redirects_with_return_path() {
	let decision = authorizer().authorize_now("/dispatch-orders", None);

	assert_eq!(
		decision.redirect_location().as_deref(),
		Some("/login?redirect=%2Fdispatch-orders"),
	);
	assert!(!decision.clear_credential);
}

#[test]
fn expired_and_malformed_tokens_never_reach_protected_paths() {
	let authorizer = authorizer();
	let expired = issue_token(&sample_claims_expiring(
		Role::Admin,
		OffsetDateTime::now_utc() - Duration::minutes(1),
	));
	let forged = {
		// Signed with a different secret than the verifier's.
		let mut segments: Vec<String> =
			issue_token(&sample_claims(Role::Admin)).split('.').map(str::to_owned).collect();

		segments[2] = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA".into();
		segments.join(".")
	};

	for token in [expired.as_str(), forged.as_str(), "garbage", "a.b", ""] {
		let decision = authorizer.authorize_now("/dispatch-orders", Some(token));

		assert!(
			!decision.is_allowed(),
			"Token `{token}` must not be allowed onto a protected path."
		);
		assert_eq!(
			decision.redirect_location().as_deref(),
			Some("/login?redirect=%2Fdispatch-orders"),
		);
	}
}

#[test]
fn restricted_roles_are_denied_on_every_path_with_credential_clear() {
	let authorizer = authorizer();

	for role in [Role::Supplier, Role::Distributor, Role::Buyer] {
		let token = issue_token(&sample_claims(role));

		for path in ["/home", "/users", "/expenses", "/login", "/anything/nested"] {
			let decision = authorizer.authorize_now(path, Some(&token));

			assert_eq!(
				decision.redirect_location().as_deref(),
				Some("/login?error=access_denied"),
				"role: {role}, path: {path}"
			);
			assert!(decision.clear_credential, "role: {role}, path: {path}");
		}
	}
}

#[test]
fn role_rule_is_enforced_exhaustively_across_the_enum() {
	let authorizer = authorizer();

	for role in Role::ALL {
		let token = issue_token(&sample_claims(role));
		let decision = authorizer.authorize_now("/users", Some(&token));
		let should_allow = matches!(role, Role::SuperAdmin | Role::Admin);

		assert_eq!(decision.is_allowed(), should_allow, "role: {role}");

		if !should_allow {
			let expected = if PortalPolicy::default().role_allows(role) {
				"/unauthorized"
			} else {
				"/login?error=access_denied"
			};

			assert_eq!(
				decision.redirect_location().as_deref(),
				Some(expected),
				"role: {role}"
			);
		}
	}
}

#[test]
fn super_admin_satisfies_permission_rules_without_the_grants() {
	let token = issue_token(&claims_with(Role::SuperAdmin, &[]));
	let decision = authorizer().authorize_now("/expenses", Some(&token));

	assert!(decision.is_allowed());
}

#[test]
fn permission_rules_require_any_matching_grant() {
	let authorizer = authorizer();
	let holder = issue_token(&claims_with(Role::Employee, &["expense.read"]));
	let allowed = authorizer.authorize_now("/expenses/new", Some(&holder));

	assert!(allowed.is_allowed());

	let outsider = issue_token(&claims_with(Role::Employee, &["logistics.read"]));
	let denied = authorizer.authorize_now("/expenses/new", Some(&outsider));

	assert_eq!(denied.redirect_location().as_deref(), Some("/unauthorized"));
	assert!(
		!denied.clear_credential,
		"Insufficient rights keep the credential; the user is legitimately logged in."
	);
}

#[test]
fn employee_requesting_users_is_unauthorized() {
	let token = issue_token(&sample_claims(Role::Employee));
	let decision = authorizer().authorize_now("/users", Some(&token));

	assert_eq!(decision.redirect_location().as_deref(), Some("/unauthorized"));
}

#[test]
fn authenticated_identity_on_auth_pages_lands_on_home() {
	let authorizer = authorizer();
	let token = issue_token(&sample_claims(Role::SuperAdmin));

	for path in ["/login", "/register"] {
		let decision = authorizer.authorize_now(path, Some(&token));

		assert_eq!(decision.redirect_location().as_deref(), Some("/home"), "path: {path}");
	}
}

#[test]
fn longest_prefix_rule_wins_for_nested_paths() {
	let authorizer = authorizer();
	let token = issue_token(&sample_claims(Role::Manager));
	let nested = authorizer.authorize_now("/buying/return/42", Some(&token));

	assert!(nested.is_allowed(), "The `/buying/return` rule admits managers.");

	let parent = authorizer.authorize_now("/buying/orders", Some(&token));

	assert_eq!(
		parent.redirect_location().as_deref(),
		Some("/unauthorized"),
		"The `/buying` rule admits admins only."
	);
}

#[test]
fn allowed_requests_forward_identity_context() {
	let claims = sample_claims(Role::Admin);
	let token = issue_token(&claims);
	let decision = authorizer().authorize_now("/home", Some(&token));

	match decision.verdict {
		Verdict::Allow { context: Some(context) } => {
			assert_eq!(context.id, claims.id);
			assert_eq!(context.email, claims.email);
			assert_eq!(context.role, Role::Admin);
		},
		other => panic!("Expected an allow with forwarded context, got {other:?}."),
	}
}

#[test]
fn unruled_paths_require_authentication_only() {
	let authorizer = authorizer();
	let token = issue_token(&sample_claims(Role::Accountant));
	let decision = authorizer.authorize_now("/logistics/shipments", Some(&token));

	assert!(decision.is_allowed(), "Paths without a rule admit any authenticated identity.");
}
