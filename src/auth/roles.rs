// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Roles and role sets.
//!
//! Roles travel as plain strings on the wire (the token `role` claim and the
//! `X-User-Role` header, comma-joined when there are several). Inside the
//! process they are always a [`RoleSet`]; conversion happens only at those
//! two boundaries.

use std::collections::BTreeSet;
use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Prefix some upstreams put in front of role names (`ROLE_ADMIN`).
const AUTHORITY_PREFIX: &str = "ROLE_";

/// Roles recognised at the trust boundary.
///
/// - `Admin` - administrative end user
/// - `User` - regular end user
/// - `Service` - another internal service presenting the shared credential
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    /// Newly registered accounts are plain users.
    #[default]
    User,
    Service,
}

const ROLE_NAMES: &[&str] = &["ADMIN", "USER", "SERVICE"];

impl Role {
    /// Parse a role name (case-insensitive, optional `ROLE_` prefix).
    pub fn parse(s: &str) -> Option<Role> {
        let s = s.trim();
        let name = match s.get(..AUTHORITY_PREFIX.len()) {
            Some(head) if head.eq_ignore_ascii_case(AUTHORITY_PREFIX) => &s[AUTHORITY_PREFIX.len()..],
            _ => s,
        };
        match name.to_ascii_uppercase().as_str() {
            "ADMIN" => Some(Role::Admin),
            "USER" => Some(Role::User),
            "SERVICE" => Some(Role::Service),
            _ => None,
        }
    }

    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
            Role::Service => "SERVICE",
        }
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Role::parse(&name).ok_or_else(|| de::Error::unknown_variant(&name, ROLE_NAMES))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered set of roles granted for one request or held by one account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(role: Role) -> Self {
        Self(BTreeSet::from([role]))
    }

    /// Decode a header or claim value.
    ///
    /// A value containing a comma is split on commas; otherwise the whole
    /// value is one role. Each entry is trimmed. Unrecognised names are
    /// skipped, so the result may be empty.
    pub fn from_header_value(value: &str) -> Self {
        let roles = if value.contains(',') {
            value.split(',').filter_map(parse_entry).collect()
        } else {
            parse_entry(value).into_iter().collect()
        };
        Self(roles)
    }

    /// Encode as a comma-joined value, e.g. `ADMIN,USER`.
    pub fn to_header_value(&self) -> String {
        self.0
            .iter()
            .map(Role::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn insert(&mut self, role: Role) -> bool {
        self.0.insert(role)
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }
}

fn parse_entry(entry: &str) -> Option<Role> {
    let role = Role::parse(entry);
    if role.is_none() && !entry.trim().is_empty() {
        tracing::debug!(role = entry.trim(), "Ignoring unrecognised role");
    }
    role
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Accepts the same names as [`Role::parse`] and skips unknown ones.
impl<'de> Deserialize<'de> for RoleSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        Ok(names.iter().filter_map(|name| parse_entry(name)).collect())
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_header_value())
    }
}
