//! Authentication guards
//!
//! An [`AuthGuard`] tries a list of [`AuthProvider`] strategies in order, keeps
//! the first context one of them recognizes, and checks it against an
//! [`AuthPolicy`]:
//! - User authentication (identity headers from a trusted proxy)
//! - Service-to-service (API keys)
//! - Admin access
//! - Anonymous fallback

use crate::config::AuthConfig;
use crate::core::error::{ConfigError, RequestError};
use anyhow::Result;
use async_trait::async_trait;
use axum::http::HeaderMap;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Authorization context extracted from a request
#[derive(Debug, Clone, PartialEq)]
pub enum AuthContext {
    /// Authenticated user
    User {
        user_id: Uuid,
        tenant_id: Option<Uuid>,
        roles: Vec<String>,
    },

    /// Service-to-service communication
    Service {
        service_name: String,
        tenant_id: Option<Uuid>,
    },

    /// System administrator
    Admin { admin_id: Uuid },

    /// No authentication (public access)
    Anonymous,
}

impl AuthContext {
    /// Get tenant_id from context if available
    pub fn tenant_id(&self) -> Option<Uuid> {
        match self {
            AuthContext::User { tenant_id, .. } => *tenant_id,
            AuthContext::Service { tenant_id, .. } => *tenant_id,
            AuthContext::Admin { .. } => None,
            AuthContext::Anonymous => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, AuthContext::Admin { .. })
    }

    pub fn is_service(&self) -> bool {
        matches!(self, AuthContext::Service { .. })
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, AuthContext::Anonymous)
    }

    /// Get user_id if available
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            AuthContext::User { user_id, .. } => Some(*user_id),
            AuthContext::Admin { admin_id } => Some(*admin_id),
            _ => None,
        }
    }
}

/// Authorization policy for an operation
#[derive(Debug, Clone)]
pub enum AuthPolicy {
    /// Public access (no auth required)
    Public,

    /// Any authenticated caller
    Authenticated,

    /// User must have one of these roles
    HasRole(Vec<String>),

    /// Service-to-service only
    ServiceOnly,

    /// Admin only
    AdminOnly,

    /// Combination of policies (AND)
    And(Vec<AuthPolicy>),

    /// Combination of policies (OR)
    Or(Vec<AuthPolicy>),

    /// Custom policy function
    Custom(fn(&AuthContext) -> bool),
}

impl AuthPolicy {
    /// Check if auth context satisfies this policy
    pub fn check(&self, context: &AuthContext) -> bool {
        match self {
            AuthPolicy::Public => true,

            AuthPolicy::Authenticated => !context.is_anonymous(),

            AuthPolicy::HasRole(required_roles) => match context {
                AuthContext::User { roles, .. } => required_roles.iter().any(|r| roles.contains(r)),
                _ => false,
            },

            AuthPolicy::ServiceOnly => context.is_service(),

            AuthPolicy::AdminOnly => context.is_admin(),

            AuthPolicy::And(policies) => policies.iter().all(|p| p.check(context)),

            AuthPolicy::Or(policies) => policies.iter().any(|p| p.check(context)),

            AuthPolicy::Custom(f) => f(context),
        }
    }

    /// Parse policy from string (for YAML config)
    pub fn parse_policy(s: &str) -> Self {
        if let Some(role) = s.strip_prefix("role:") {
            return AuthPolicy::HasRole(vec![role.to_string()]);
        }
        if let Some(role) = s.strip_prefix("admin_or_role:") {
            return AuthPolicy::Or(vec![
                AuthPolicy::AdminOnly,
                AuthPolicy::HasRole(vec![role.to_string()]),
            ]);
        }
        match s {
            "public" => AuthPolicy::Public,
            "authenticated" => AuthPolicy::Authenticated,
            "service_only" => AuthPolicy::ServiceOnly,
            "admin_only" => AuthPolicy::AdminOnly,
            _ => AuthPolicy::Authenticated, // Default
        }
    }
}

/// One authentication strategy
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Strategy name as used in configuration
    fn name(&self) -> &'static str;

    /// Extract a context from request headers
    ///
    /// `Ok(None)` means the request carries nothing this strategy understands.
    async fn authenticate(&self, headers: &HeaderMap) -> Result<Option<AuthContext>>;
}

/// Explicit anonymous access (for development)
///
/// Never claims a request, so the strategies listed after it still run and
/// an unclaimed request resolves to [`AuthContext::Anonymous`].
pub struct NoAuthProvider;

#[async_trait]
impl AuthProvider for NoAuthProvider {
    fn name(&self) -> &'static str {
        "none"
    }

    async fn authenticate(&self, _headers: &HeaderMap) -> Result<Option<AuthContext>> {
        Ok(None)
    }
}

/// `x-api-key` header checked against configured keys
pub struct ApiKeyProvider {
    keys: HashMap<String, String>,
}

impl ApiKeyProvider {
    pub const HEADER: &'static str = "x-api-key";

    /// `keys` maps API key → service name
    pub fn new(keys: HashMap<String, String>) -> Self {
        Self { keys }
    }
}

#[async_trait]
impl AuthProvider for ApiKeyProvider {
    fn name(&self) -> &'static str {
        "api-key"
    }

    async fn authenticate(&self, headers: &HeaderMap) -> Result<Option<AuthContext>> {
        let Some(key) = headers.get(Self::HEADER) else {
            return Ok(None);
        };
        let key = key.to_str()?;

        Ok(self.keys.get(key).map(|service_name| AuthContext::Service {
            service_name: service_name.clone(),
            tenant_id: None,
        }))
    }
}

/// Identity headers injected by a trusted upstream proxy
///
/// `x-user-id` is required; `x-tenant-id` and the comma-separated
/// `x-user-roles` are optional. The `admin` role yields [`AuthContext::Admin`].
///
/// The headers are taken at face value. Only enable this strategy when a proxy
/// in front of the service strips them from client requests.
pub struct HeaderUserProvider;

impl HeaderUserProvider {
    pub const USER_HEADER: &'static str = "x-user-id";
    pub const TENANT_HEADER: &'static str = "x-tenant-id";
    pub const ROLES_HEADER: &'static str = "x-user-roles";
}

#[async_trait]
impl AuthProvider for HeaderUserProvider {
    fn name(&self) -> &'static str {
        "header"
    }

    async fn authenticate(&self, headers: &HeaderMap) -> Result<Option<AuthContext>> {
        let Some(user_id) = headers.get(Self::USER_HEADER) else {
            return Ok(None);
        };
        let user_id = Uuid::parse_str(user_id.to_str()?)?;

        let tenant_id = match headers.get(Self::TENANT_HEADER) {
            Some(value) => Some(Uuid::parse_str(value.to_str()?)?),
            None => None,
        };

        let roles: Vec<String> = match headers.get(Self::ROLES_HEADER) {
            Some(value) => value
                .to_str()?
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string)
                .collect(),
            None => Vec::new(),
        };

        if roles.iter().any(|r| r == "admin") {
            return Ok(Some(AuthContext::Admin { admin_id: user_id }));
        }

        Ok(Some(AuthContext::User {
            user_id,
            tenant_id,
            roles,
        }))
    }
}

/// Strategy-selecting guard
#[derive(Clone)]
pub struct AuthGuard {
    providers: Vec<Arc<dyn AuthProvider>>,
    policy: AuthPolicy,
}

impl AuthGuard {
    pub fn new(providers: Vec<Arc<dyn AuthProvider>>, policy: AuthPolicy) -> Self {
        Self { providers, policy }
    }

    /// Build providers from configured strategy names, in order
    ///
    /// An empty list is rejected: there is no implicit strategy.
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        if config.strategies.is_empty() {
            return Err(ConfigError::MissingField {
                field: "strategies".to_string(),
                context: "auth".to_string(),
            });
        }

        let mut providers: Vec<Arc<dyn AuthProvider>> = Vec::with_capacity(config.strategies.len());
        for strategy in &config.strategies {
            let provider: Arc<dyn AuthProvider> = match strategy.as_str() {
                "api-key" => Arc::new(ApiKeyProvider::new(config.api_keys.clone())),
                "header" => Arc::new(HeaderUserProvider),
                "none" => Arc::new(NoAuthProvider),
                other => {
                    return Err(ConfigError::InvalidValue {
                        field: "auth.strategies".to_string(),
                        value: other.to_string(),
                        message: "expected one of: api-key, header, none".to_string(),
                    });
                }
            };
            providers.push(provider);
        }

        Ok(Self::new(providers, AuthPolicy::parse_policy(&config.policy)))
    }

    pub fn policy(&self) -> &AuthPolicy {
        &self.policy
    }

    /// Resolve the caller's context without applying the policy
    pub async fn resolve(&self, headers: &HeaderMap) -> AuthContext {
        for provider in &self.providers {
            match provider.authenticate(headers).await {
                Ok(Some(context)) => {
                    tracing::debug!(strategy = provider.name(), "request authenticated");
                    return context;
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(strategy = provider.name(), error = %e, "auth strategy rejected credentials");
                }
            }
        }
        AuthContext::Anonymous
    }

    /// Resolve the caller and check the policy
    pub async fn authorize(&self, headers: &HeaderMap) -> Result<AuthContext, RequestError> {
        let context = self.resolve(headers).await;
        if self.policy.check(&context) {
            return Ok(context);
        }

        if context.is_anonymous() {
            Err(RequestError::Unauthorized {
                message: "valid credentials required".to_string(),
            })
        } else {
            Err(RequestError::Forbidden {
                message: "caller is not allowed to perform this operation".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    fn api_keys() -> HashMap<String, String> {
        HashMap::from([("secret-1".to_string(), "billing".to_string())])
    }

    #[test]
    fn test_policy_check() {
        let user_context = AuthContext::User {
            user_id: Uuid::new_v4(),
            tenant_id: Some(Uuid::new_v4()),
            roles: vec!["editor".to_string()],
        };

        assert!(AuthPolicy::Authenticated.check(&user_context));
        assert!(AuthPolicy::HasRole(vec!["editor".into()]).check(&user_context));
        assert!(!AuthPolicy::AdminOnly.check(&user_context));

        let anon_context = AuthContext::Anonymous;
        assert!(AuthPolicy::Public.check(&anon_context));
        assert!(!AuthPolicy::Authenticated.check(&anon_context));
    }

    #[test]
    fn test_policy_check_and_or() {
        let admin = AuthContext::Admin {
            admin_id: Uuid::new_v4(),
        };
        let either = AuthPolicy::Or(vec![AuthPolicy::ServiceOnly, AuthPolicy::AdminOnly]);
        assert!(either.check(&admin));

        let both = AuthPolicy::And(vec![AuthPolicy::Authenticated, AuthPolicy::ServiceOnly]);
        assert!(!both.check(&admin));
    }

    #[test]
    fn test_policy_check_custom() {
        fn tenant_bound(ctx: &AuthContext) -> bool {
            ctx.tenant_id().is_some()
        }
        let policy = AuthPolicy::Custom(tenant_bound);
        assert!(!policy.check(&AuthContext::Anonymous));
    }

    #[test]
    fn test_parse_policy() {
        assert!(matches!(AuthPolicy::parse_policy("public"), AuthPolicy::Public));
        assert!(matches!(
            AuthPolicy::parse_policy("service_only"),
            AuthPolicy::ServiceOnly
        ));
        match AuthPolicy::parse_policy("role:postmaster") {
            AuthPolicy::HasRole(roles) => assert_eq!(roles, vec!["postmaster"]),
            other => panic!("Expected HasRole, got {:?}", other),
        }
        match AuthPolicy::parse_policy("admin_or_role:ops") {
            AuthPolicy::Or(policies) => {
                assert_eq!(policies.len(), 2);
                assert!(matches!(policies[0], AuthPolicy::AdminOnly));
            }
            other => panic!("Expected Or policy, got {:?}", other),
        }
        assert!(matches!(
            AuthPolicy::parse_policy("something_unknown"),
            AuthPolicy::Authenticated
        ));
    }

    #[tokio::test]
    async fn test_api_key_provider() {
        let provider = ApiKeyProvider::new(api_keys());

        let ctx = provider
            .authenticate(&headers(&[("x-api-key", "secret-1")]))
            .await
            .unwrap();
        assert_eq!(
            ctx,
            Some(AuthContext::Service {
                service_name: "billing".to_string(),
                tenant_id: None
            })
        );

        assert_eq!(
            provider
                .authenticate(&headers(&[("x-api-key", "wrong")]))
                .await
                .unwrap(),
            None
        );
        assert_eq!(provider.authenticate(&HeaderMap::new()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_header_user_provider() {
        let user_id = Uuid::new_v4();
        let tenant_id = Uuid::new_v4();
        let (uid, tid) = (user_id.to_string(), tenant_id.to_string());
        let ctx = HeaderUserProvider
            .authenticate(&headers(&[
                ("x-user-id", uid.as_str()),
                ("x-tenant-id", tid.as_str()),
                ("x-user-roles", "editor, viewer"),
            ]))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(ctx.user_id(), Some(user_id));
        assert_eq!(ctx.tenant_id(), Some(tenant_id));
        assert!(AuthPolicy::HasRole(vec!["viewer".into()]).check(&ctx));
    }

    #[tokio::test]
    async fn test_header_user_provider_admin_role() {
        let user_id = Uuid::new_v4();
        let uid = user_id.to_string();
        let ctx = HeaderUserProvider
            .authenticate(&headers(&[
                ("x-user-id", uid.as_str()),
                ("x-user-roles", "admin"),
            ]))
            .await
            .unwrap()
            .unwrap();
        assert!(ctx.is_admin());
    }

    #[tokio::test]
    async fn test_header_user_provider_rejects_bad_uuid() {
        let result = HeaderUserProvider
            .authenticate(&headers(&[("x-user-id", "not-a-uuid")]))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_guard_first_matching_strategy_wins() {
        let guard = AuthGuard::new(
            vec![
                Arc::new(ApiKeyProvider::new(api_keys())),
                Arc::new(HeaderUserProvider),
            ],
            AuthPolicy::Authenticated,
        );

        let uid = Uuid::new_v4().to_string();
        let ctx = guard
            .authorize(&headers(&[("x-api-key", "secret-1"), ("x-user-id", uid.as_str())]))
            .await
            .unwrap();
        assert!(ctx.is_service());
    }

    #[tokio::test]
    async fn test_guard_failing_strategy_falls_through() {
        let guard = AuthGuard::new(
            vec![
                Arc::new(HeaderUserProvider),
                Arc::new(ApiKeyProvider::new(api_keys())),
            ],
            AuthPolicy::ServiceOnly,
        );

        let ctx = guard
            .authorize(&headers(&[
                ("x-user-id", "garbage"),
                ("x-api-key", "secret-1"),
            ]))
            .await
            .unwrap();
        assert!(ctx.is_service());
    }

    #[tokio::test]
    async fn test_guard_unauthorized_vs_forbidden() {
        let guard = AuthGuard::new(vec![Arc::new(HeaderUserProvider)], AuthPolicy::AdminOnly);

        let err = guard.authorize(&HeaderMap::new()).await.unwrap_err();
        assert!(matches!(err, RequestError::Unauthorized { .. }));

        let uid = Uuid::new_v4().to_string();
        let err = guard
            .authorize(&headers(&[("x-user-id", uid.as_str())]))
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::Forbidden { .. }));
    }

    #[test]
    fn test_guard_from_config_unknown_strategy() {
        let config = AuthConfig {
            strategies: vec!["header".to_string(), "oauth".to_string()],
            ..AuthConfig::default()
        };
        match AuthGuard::from_config(&config) {
            Err(ConfigError::InvalidValue { value, .. }) => assert_eq!(value, "oauth"),
            Err(other) => panic!("Expected InvalidValue, got {:?}", other),
            Ok(_) => panic!("Expected an error"),
        }
    }

    #[test]
    fn test_guard_from_config_requires_a_strategy() {
        assert!(matches!(
            AuthGuard::from_config(&AuthConfig::default()),
            Err(ConfigError::MissingField { .. })
        ));
    }

    #[tokio::test]
    async fn test_guard_without_header_strategy_ignores_identity_headers() {
        let config = AuthConfig {
            strategies: vec!["api-key".to_string()],
            policy: "admin_only".to_string(),
            api_keys: api_keys(),
        };
        let guard = AuthGuard::from_config(&config).unwrap();

        let uid = Uuid::new_v4().to_string();
        let err = guard
            .authorize(&headers(&[("x-user-id", uid.as_str()), ("x-user-roles", "admin")]))
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::Unauthorized { .. }));
    }

    #[tokio::test]
    async fn test_none_strategy_does_not_shadow_later_strategies() {
        let config = AuthConfig {
            strategies: vec!["none".to_string(), "api-key".to_string()],
            policy: "public".to_string(),
            api_keys: api_keys(),
        };
        let guard = AuthGuard::from_config(&config).unwrap();

        let ctx = guard.resolve(&headers(&[("x-api-key", "secret-1")])).await;
        assert!(ctx.is_service());
        assert_eq!(guard.resolve(&HeaderMap::new()).await, AuthContext::Anonymous);
    }

    #[tokio::test]
    async fn test_guard_from_config() {
        let config = AuthConfig {
            strategies: vec!["api-key".to_string()],
            policy: "service_only".to_string(),
            api_keys: api_keys(),
        };
        let guard = AuthGuard::from_config(&config).unwrap();
        assert!(guard.authorize(&headers(&[("x-api-key", "secret-1")])).await.is_ok());
    }
}
