//! Identity and authorization oracles.
//!
//! The gateway treats both as boolean oracles: an [`IdentityProvider`]
//! either resolves an identity from the request headers or it does not, and
//! an [`Authorizer`] either grants the fixed `execute`-on-`kernels` check or
//! it does not. Concrete deployments plug in their own implementations.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

/// A resolved, authenticated identity. Opaque to the gateway beyond its name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    /// Stable identifier for logs and authorization checks.
    pub name: String,
}

impl Identity {
    /// Create an identity with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Resolves the requesting identity from HTTP material, or refuses.
pub trait IdentityProvider: Send + Sync {
    /// Authenticate the request. `None` means no identity is resolvable.
    fn authenticate(&self, headers: &HeaderMap) -> Option<Identity>;
}

/// Decides whether an identity may perform an action on a resource class.
pub trait Authorizer: Send + Sync {
    /// `true` grants the action.
    fn is_authorized(&self, user: &Identity, action: &str, resource: &str) -> bool;
}

/// Identity provider that accepts a single shared token.
///
/// Expects `Authorization: token <value>` (or the `Bearer` scheme), matching
/// the value configured at startup.
pub struct TokenIdentityProvider {
    token: String,
}

impl TokenIdentityProvider {
    /// Provider accepting only `token`.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl IdentityProvider for TokenIdentityProvider {
    fn authenticate(&self, headers: &HeaderMap) -> Option<Identity> {
        let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
        let presented = value
            .strip_prefix("token ")
            .or_else(|| value.strip_prefix("Bearer "))?;
        if presented == self.token {
            Some(Identity::new("token-user"))
        } else {
            None
        }
    }
}

/// Identity provider for unauthenticated local development: every request
/// resolves to the same anonymous identity.
#[derive(Default)]
pub struct AnonymousIdentityProvider;

impl IdentityProvider for AnonymousIdentityProvider {
    fn authenticate(&self, _headers: &HeaderMap) -> Option<Identity> {
        Some(Identity::new("anonymous"))
    }
}

/// Authorizer that grants every check.
#[derive(Default)]
pub struct AllowAllAuthorizer;

impl Authorizer for AllowAllAuthorizer {
    fn is_authorized(&self, _user: &Identity, _action: &str, _resource: &str) -> bool {
        true
    }
}
