//! Authorization scope for approval decisions.
//!
//! Determines whether an actor may act on a claim at all, independent of
//! step activation. "Not your claim" (`OutOfScope`) is deliberately
//! distinct from "not your turn" (`NotActiveApprover`).

use serde::{Deserialize, Serialize};
use std::fmt;

use claimflow_shared::types::{CompanyId, UserId};

use crate::approval::error::ApprovalError;

/// User role in the company.
///
/// A closed enum; no ad-hoc role strings are compared anywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Submits claims; may act only on their own.
    Employee,
    /// Reviews claims of direct reports (and their own).
    Manager,
    /// Finance reviewer, company-wide.
    Financer,
    /// Executive reviewer, company-wide.
    Director,
    /// Full access within the company, including the override fallback.
    Admin,
}

impl Role {
    /// Parse a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "employee" => Some(Self::Employee),
            "manager" => Some(Self::Manager),
            "financer" => Some(Self::Financer),
            "director" => Some(Self::Director),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Manager => "manager",
            Self::Financer => "financer",
            Self::Director => "director",
            Self::Admin => "admin",
        }
    }

    /// Whether this role may invoke the admin-override fallback.
    #[must_use]
    pub const fn can_override(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether this role reviews claims beyond its own.
    #[must_use]
    pub const fn is_reviewer(&self) -> bool {
        matches!(self, Self::Manager | Self::Financer | Self::Director | Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Directory view of a user, resolved once per decision call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// The user's identity.
    pub id: UserId,
    /// The user's company.
    pub company: CompanyId,
    /// The user's role.
    pub role: Role,
    /// The user's recorded manager, if any.
    pub manager: Option<UserId>,
}

impl UserProfile {
    /// Whether this user is the recorded direct manager of `other`.
    /// No transitive descent through the org chart.
    #[must_use]
    pub fn is_direct_manager_of(&self, other: &UserProfile) -> bool {
        other.manager == Some(self.id)
    }
}

/// Scope predicates for approval decisions.
pub struct AuthorizationScope;

impl AuthorizationScope {
    /// Checks whether `actor` may act on a claim submitted by `submitter`
    /// within `claim_company`.
    ///
    /// - Everyone may act on their own claims (the manager pre-step edge
    ///   case where the submitter approves their own claim).
    /// - Managers additionally reach their direct reports' claims.
    /// - Financers, directors, and admins reach any claim in their company.
    ///
    /// # Errors
    ///
    /// Returns `OutOfScope` when none of the predicates hold.
    pub fn can_decide(
        actor: &UserProfile,
        submitter: &UserProfile,
        claim_company: CompanyId,
    ) -> Result<(), ApprovalError> {
        if actor.company != claim_company {
            return Err(ApprovalError::OutOfScope { actor: actor.id });
        }
        if actor.id == submitter.id {
            return Ok(());
        }
        match actor.role {
            Role::Admin | Role::Financer | Role::Director => Ok(()),
            Role::Manager if actor.is_direct_manager_of(submitter) => Ok(()),
            Role::Manager | Role::Employee => {
                Err(ApprovalError::OutOfScope { actor: actor.id })
            }
        }
    }
}
