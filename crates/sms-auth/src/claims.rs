//! JWT claim structure for access tokens.

use serde::{Deserialize, Serialize};
use sms_core::Role;
use utoipa::ToSchema;

/// JWT claims for access tokens.
///
/// Role names are kept as strings on the wire so that tokens issued for
/// roles this service does not know about still verify; [`Claims::roles`]
/// parses the ones that matter here.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// User identifier (subject claim)
    pub sub: String,
    /// User's email address
    pub email: String,
    /// Role names granted to the user
    #[serde(default)]
    pub roles: Vec<String>,
    /// Token expiration timestamp (Unix timestamp)
    pub exp: usize,
    /// Token issued-at timestamp (Unix timestamp)
    pub iat: usize,
}

impl Claims {
    pub fn roles(&self) -> Vec<Role> {
        Role::parse_all(&self.roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(roles: &[&str]) -> Claims {
        Claims {
            sub: "user-id-123".to_string(),
            email: "test@example.com".to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            exp: 1234567890,
            iat: 1234567800,
        }
    }

    #[test]
    fn test_claims_serialize() {
        let serialized = serde_json::to_string(&claims(&["admin"])).unwrap();
        assert!(serialized.contains(r#""sub":"user-id-123""#));
        assert!(serialized.contains(r#""roles":["admin"]"#));
    }

    #[test]
    fn test_claims_deserialize_without_roles() {
        let json = r#"{"sub":"7","email":"user@test.com","exp":9999999999,"iat":9999999900}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.sub, "7");
        assert!(claims.roles.is_empty());
        assert!(claims.roles().is_empty());
    }

    #[test]
    fn test_roles_ignores_unknown_names() {
        let claims = claims(&["manager", "auditor"]);
        assert_eq!(claims.roles(), vec![Role::Manager]);
    }
}
