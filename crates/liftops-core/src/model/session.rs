// Signed-in user and roles.

use liftops_api::AccessClaims;

/// Back-office roles.
///
/// `Patron` is the administrative role and a capability superset:
/// any check that `Personel` passes, `Patron` passes too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Patron,
    Personel,
}

impl Role {
    /// Does this role satisfy a check requiring `required`?
    pub fn satisfies(self, required: Role) -> bool {
        self == Role::Patron || self == required
    }
}

/// The signed-in user, derived from the typed access-token claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl Session {
    pub fn from_claims(claims: &AccessClaims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username.clone(),
            role: claims.role.into(),
        }
    }
}
