//! Store seams consumed by the approval engine.
//!
//! Persistence of workflows, claims, and users belongs to the surrounding
//! application; the engine only depends on these traits. The claim store
//! is optimistically versioned so that `decide` commits as a single
//! read-modify-write unit.

use claimflow_shared::types::{ClaimId, CompanyId, UserId, WorkflowId};

use crate::approval::error::ApprovalError;
use crate::approval::scope::UserProfile;
use crate::approval::types::{ClaimRecord, WorkflowDefinition};

/// Opaque optimistic-concurrency token handed out on load and verified on
/// save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionToken(pub u64);

/// Read-only access to workflow definitions.
#[cfg_attr(test, mockall::automock)]
pub trait WorkflowStore {
    /// Fetches a workflow definition by id.
    ///
    /// # Errors
    ///
    /// Returns `WorkflowNotFound` if the workflow does not exist.
    fn get_by_id(&self, id: WorkflowId) -> Result<WorkflowDefinition, ApprovalError>;
}

/// Versioned access to claim records.
#[cfg_attr(test, mockall::automock)]
pub trait ClaimStore {
    /// Loads a claim together with its current version token.
    ///
    /// # Errors
    ///
    /// Returns `ClaimNotFound` if the claim does not exist.
    fn load(&self, id: ClaimId) -> Result<(ClaimRecord, VersionToken), ApprovalError>;

    /// Persists a claim if the token still matches the stored version.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` on a version mismatch; nothing is written in
    /// that case.
    fn save(&self, record: &ClaimRecord, token: VersionToken) -> Result<(), ApprovalError>;
}

/// Resolves identities to directory profiles.
#[cfg_attr(test, mockall::automock)]
pub trait UserDirectory {
    /// Fetches a user's profile (role, company, recorded manager).
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if the user does not exist.
    fn profile(&self, id: UserId) -> Result<UserProfile, ApprovalError>;

    /// Whether `user` is a known member of `company`.
    fn is_member(&self, company: CompanyId, user: UserId) -> Result<bool, ApprovalError>;
}

// Shared-ownership passthroughs so hosts can keep a handle on a store
// while handing it to the service.

impl<T: WorkflowStore + ?Sized> WorkflowStore for std::sync::Arc<T> {
    fn get_by_id(&self, id: WorkflowId) -> Result<WorkflowDefinition, ApprovalError> {
        (**self).get_by_id(id)
    }
}

impl<T: ClaimStore + ?Sized> ClaimStore for std::sync::Arc<T> {
    fn load(&self, id: ClaimId) -> Result<(ClaimRecord, VersionToken), ApprovalError> {
        (**self).load(id)
    }

    fn save(&self, record: &ClaimRecord, token: VersionToken) -> Result<(), ApprovalError> {
        (**self).save(record, token)
    }
}

impl<T: UserDirectory + ?Sized> UserDirectory for std::sync::Arc<T> {
    fn profile(&self, id: UserId) -> Result<UserProfile, ApprovalError> {
        (**self).profile(id)
    }

    fn is_member(&self, company: CompanyId, user: UserId) -> Result<bool, ApprovalError> {
        (**self).is_member(company, user)
    }
}
