use super::model::AuthenticatedUser;
use crate::core::error::AppError;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

use super::jwks::JwksClient;

pub struct JwtValidator {
    jwks_client: Arc<JwksClient>,
    issuer: String,
    audience: String,
    leeway: u64,
    roles_claim: String,
}

#[derive(Debug, Clone, Deserialize)]
struct Claims {
    // iss, aud, exp and nbf are checked by jsonwebtoken
    sub: String,
    #[serde(default)]
    email: Option<String>,

    // Everything else, including the provider-specific roles claim
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl JwtValidator {
    pub fn new(
        jwks_client: Arc<JwksClient>,
        issuer: String,
        audience: String,
        leeway: Duration,
        roles_claim: String,
    ) -> Self {
        Self {
            jwks_client,
            issuer,
            audience,
            leeway: leeway.as_secs(),
            roles_claim,
        }
    }

    pub async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let header = decode_header(token).map_err(|e| AppError::Auth(e.to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(AppError::Auth(format!(
                "Unsupported algorithm: {:?}. Only RS256 is allowed",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| AppError::Auth("Missing kid in token header".to_string()))?;

        let decoding_key = self
            .jwks_client
            .get_key(&kid)
            .await
            .map_err(|e| AppError::Auth(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.leeway = self.leeway;
        validation.validate_nbf = true;

        let claims = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| AppError::Auth(e.to_string()))?
            .claims;

        let roles = extract_roles(&claims.extra, &self.roles_claim);

        Ok(AuthenticatedUser {
            sub: claims.sub,
            email: claims.email,
            roles,
        })
    }
}

/// Read roles from a claim that may be nested (`realm_access.roles`) and may
/// hold either a single role string or an array of strings.
///
/// A claim name that literally contains dots (namespaced URL claims) is
/// looked up as-is before being treated as a path.
fn extract_roles(claims: &Map<String, Value>, claim: &str) -> Vec<String> {
    let value = claims.get(claim).or_else(|| {
        let mut segments = claim.split('.');
        let first = claims.get(segments.next()?)?;
        segments.try_fold(first, |current, segment| current.get(segment))
    });

    match value {
        Some(Value::String(role)) if !role.is_empty() => vec![role.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("claims must be an object"),
        }
    }

    #[test]
    fn test_roles_from_array() {
        let c = claims(json!({ "roles": ["admin", "customer", 7] }));
        assert_eq!(extract_roles(&c, "roles"), vec!["admin", "customer"]);
    }

    #[test]
    fn test_roles_from_single_string() {
        let c = claims(json!({ "role": "super_admin" }));
        assert_eq!(extract_roles(&c, "role"), vec!["super_admin"]);
    }

    #[test]
    fn test_roles_from_nested_path() {
        let c = claims(json!({ "realm_access": { "roles": ["admin"] } }));
        assert_eq!(extract_roles(&c, "realm_access.roles"), vec!["admin"]);
    }

    #[test]
    fn test_roles_from_namespaced_claim() {
        let c = claims(json!({ "https://shop.example/roles": ["admin"] }));
        assert_eq!(
            extract_roles(&c, "https://shop.example/roles"),
            vec!["admin"]
        );
    }

    #[test]
    fn test_missing_roles_claim_yields_no_roles() {
        let c = claims(json!({ "scope": "openid" }));
        assert!(extract_roles(&c, "roles").is_empty());
        assert!(extract_roles(&c, "realm_access.roles").is_empty());
    }

    #[test]
    fn test_claims_collect_unknown_fields() {
        let parsed: Claims = serde_json::from_value(json!({
            "sub": "user-1",
            "email": "a@b.c",
            "iss": "https://auth.example",
            "roles": ["admin"]
        }))
        .unwrap();

        assert_eq!(parsed.sub, "user-1");
        assert_eq!(parsed.email.as_deref(), Some("a@b.c"));
        assert!(parsed.extra.contains_key("roles"));
    }
}
