//! Database client abstraction and DDL construction
//!
//! The database-user strategy provisions a login with one DDL statement over
//! a TLS-authenticated connection. Identifier validation is strict: the
//! accepted shape is a letter or underscore followed by up to 62 letters,
//! digits, underscores, or dollar signs.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::core::{DatabaseError, SecretValue};

#[cfg(feature = "postgres")]
pub mod postgres;

/// Connection parameters for the administrative session
pub struct ConnectionTarget {
    /// DNS name of the database endpoint
    pub hostname: String,
    /// Administrator login
    pub username: String,
    /// Administrator password
    pub password: SecretValue,
}

/// Client capable of executing a DDL statement as the administrator.
///
/// `verify_connectivity` opens and closes a session without running
/// anything; what-if simulations use it to prove the administrator
/// credential works before reporting success.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Open a session to confirm the target accepts the credential
    async fn verify_connectivity(&self, target: &ConnectionTarget) -> Result<(), DatabaseError>;

    /// Execute one DDL statement in a fresh session
    async fn execute(&self, target: &ConnectionTarget, statement: &str)
        -> Result<(), DatabaseError>;
}

/// Validate an identifier: `^[A-Za-z_][A-Za-z0-9_$]{0,62}$`
pub fn is_valid_identifier(ident: &str) -> bool {
    if ident.is_empty() || ident.len() > 63 {
        return false;
    }

    let mut chars = ident.chars();
    let first_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');

    first_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Double-quote an identifier, doubling embedded quotes
pub fn quote_identifier(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Single-quote a literal, doubling embedded quotes
pub fn quote_literal(literal: &str) -> String {
    format!("'{}'", literal.replace('\'', "''"))
}

/// Build the user-provisioning statement.
///
/// The `IN ROLE` clause is omitted entirely when no roles are configured;
/// the server rejects an empty membership list.
pub fn create_user_statement(
    username: &str,
    password: &SecretValue,
    roles: &[String],
    valid_until: DateTime<Utc>,
) -> String {
    let mut statement = format!(
        "CREATE USER {} PASSWORD {}",
        quote_identifier(username),
        quote_literal(password.expose())
    );

    if !roles.is_empty() {
        let members = roles
            .iter()
            .map(|role| quote_identifier(role))
            .collect::<Vec<_>>()
            .join(", ");
        statement.push_str(&format!(" IN ROLE {members}"));
    }

    statement.push_str(&format!(
        " VALID UNTIL {}",
        quote_literal(&valid_until.to_rfc3339_opts(SecondsFormat::Secs, true))
    ));

    statement
}
