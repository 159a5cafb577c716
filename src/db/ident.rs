//! Identifier escaping for generated SQL.
//!
//! Names coming from requests are always emitted as quoted identifiers, so they can
//! never be read as SQL syntax. Values never go through here: they are bound as
//! statement parameters.

use crate::error::{AdminError, AdminResult};

/// Maximum identifier length PostgreSQL keeps (NAMEDATALEN - 1).
pub const MAX_IDENTIFIER_BYTES: usize = 63;

/// Quote a single identifier: `users` -> `"users"`, `a"b` -> `"a""b"`.
///
/// Quoting preserves case, so `Sales` and `sales` name different objects.
pub fn quote_ident(name: &str) -> AdminResult<String> {
    if name.is_empty() {
        return Err(AdminError::validation("Identifier must not be empty"));
    }
    if name.contains('\0') {
        return Err(AdminError::validation(format!(
            "Identifier {:?} contains a NUL byte",
            name
        )));
    }
    if name.len() > MAX_IDENTIFIER_BYTES {
        return Err(AdminError::validation(format!(
            "Identifier '{}' is longer than {} bytes",
            name, MAX_IDENTIFIER_BYTES
        )));
    }

    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for c in name.chars() {
        if c == '"' {
            quoted.push('"');
        }
        quoted.push(c);
    }
    quoted.push('"');
    Ok(quoted)
}

/// Quote a schema-qualified name: `"schema"."table"`.
pub fn qualified_name(schema: &str, name: &str) -> AdminResult<String> {
    Ok(format!("{}.{}", quote_ident(schema)?, quote_ident(name)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_identifier() {
        assert_eq!(quote_ident("sales").unwrap(), "\"sales\"");
    }

    #[test]
    fn test_preserves_case_and_spaces() {
        assert_eq!(quote_ident("Order Items").unwrap(), "\"Order Items\"");
    }

    #[test]
    fn test_escapes_embedded_quotes() {
        assert_eq!(quote_ident("a\"b").unwrap(), "\"a\"\"b\"");
    }

    #[test]
    fn test_injection_attempt_stays_inside_identifier() {
        let quoted = quote_ident("x\"; DROP TABLE users; --").unwrap();
        assert_eq!(quoted, "\"x\"\"; DROP TABLE users; --\"");
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(
            quote_ident("").unwrap_err(),
            AdminError::Validation { .. }
        ));
    }

    #[test]
    fn test_rejects_nul() {
        assert!(quote_ident("bad\0name").is_err());
    }

    #[test]
    fn test_rejects_too_long() {
        let name = "a".repeat(MAX_IDENTIFIER_BYTES + 1);
        assert!(quote_ident(&name).is_err());
        assert!(quote_ident(&"a".repeat(MAX_IDENTIFIER_BYTES)).is_ok());
    }

    #[test]
    fn test_qualified_name() {
        assert_eq!(
            qualified_name("sales", "customers").unwrap(),
            "\"sales\".\"customers\""
        );
    }
}
