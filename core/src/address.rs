//! Hierarchical resource addresses for routing CRUD calls.
//!
//! Syntax: `row://namespace[/table[/id]]`. The namespace must match the
//! consumer's configured one, the path holds at most two segments, and an id
//! segment must be a base-10 non-negative integer. An empty table name
//! denotes a raw, ungated query and is only legal for reads.

use std::fmt;

use crate::error::{CoreError, Result};
use crate::schema::is_identifier;

/// URI scheme of all resource addresses.
pub const SCHEME: &str = "row";

/// A parsed resource address: namespace, optional table, optional row id.
///
/// # Examples
///
/// ```
/// use rowkit_core::ResourceAddress;
///
/// let address = ResourceAddress::parse("row://app.demo/people/7", "app.demo").unwrap();
/// assert_eq!(address.table_name(), "people");
/// assert_eq!(address.id(), Some(7));
/// assert_eq!(address.to_string(), "row://app.demo/people/7");
///
/// assert!(ResourceAddress::parse("row://other/people", "app.demo").is_err());
/// assert!(ResourceAddress::parse("row://app.demo/people/abc", "app.demo").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceAddress {
    namespace: String,
    table: String,
    id: Option<i64>,
}

impl ResourceAddress {
    /// The bare namespace address (empty table, raw queries only).
    pub fn base(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            table: String::new(),
            id: None,
        }
    }

    /// The address of a whole table.
    pub fn table(namespace: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            table: table.into(),
            id: None,
        }
    }

    /// The address of one row.
    pub fn row(namespace: impl Into<String>, table: impl Into<String>, id: i64) -> Self {
        Self {
            namespace: namespace.into(),
            table: table.into(),
            id: Some(id),
        }
    }

    /// Parses an address and validates it against the expected namespace.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidAddress`] on a wrong scheme or namespace,
    /// more than two path segments, a table name that is not a plain
    /// identifier, or an id segment that is not a non-negative integer.
    pub fn parse(uri: &str, namespace: &str) -> Result<Self> {
        let invalid = |detail: String| CoreError::InvalidAddress(detail);

        let rest = uri
            .strip_prefix(SCHEME)
            .and_then(|r| r.strip_prefix("://"))
            .ok_or_else(|| invalid(format!("expected scheme '{SCHEME}://': '{uri}'")))?;

        let mut parts = rest.split('/');
        let found = parts.next().unwrap_or_default();
        if found != namespace {
            return Err(invalid(format!(
                "expected namespace '{namespace}', got '{found}'"
            )));
        }

        let segments: Vec<&str> = parts.collect();
        if segments.len() > 2 {
            return Err(invalid(format!("path too long: '{uri}'")));
        }

        let table = segments.first().copied().unwrap_or_default();
        if !table.is_empty() && !is_identifier(table) {
            return Err(invalid(format!("bad table name: '{table}'")));
        }

        let id = match segments.get(1) {
            None => None,
            Some(_) if table.is_empty() => {
                return Err(invalid(format!("id without table: '{uri}'")));
            }
            Some(segment) => Some(
                segment
                    .parse::<i64>()
                    .ok()
                    .filter(|id| *id >= 0)
                    .ok_or_else(|| invalid(format!("not a valid id: '{segment}'")))?,
            ),
        };

        Ok(Self {
            namespace: namespace.to_string(),
            table: table.to_string(),
            id,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The addressed table; empty for a raw/ungated address.
    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    /// True if no table is addressed (raw query escape hatch).
    pub fn is_raw(&self) -> bool {
        self.table.is_empty()
    }

    /// The same table address with the given row id appended.
    pub fn with_id(&self, id: i64) -> Self {
        Self {
            namespace: self.namespace.clone(),
            table: self.table.clone(),
            id: Some(id),
        }
    }
}

impl fmt::Display for ResourceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME}://{}", self.namespace)?;
        if !self.table.is_empty() {
            write!(f, "/{}", self.table)?;
        }
        if let Some(id) = self.id {
            write!(f, "/{id}")?;
        }
        Ok(())
    }
}
