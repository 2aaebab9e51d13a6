//! In-memory store implementations.
//!
//! Reference implementations of the store seams backed by mutex-guarded
//! maps, used by the test suites and by embedding hosts that do not need
//! durable persistence. The claim store enforces the same optimistic
//! version check a database-backed store would.

use std::collections::HashMap;
use std::sync::Mutex;

use claimflow_shared::types::{ClaimId, CompanyId, UserId, WorkflowId};

use crate::approval::error::ApprovalError;
use crate::approval::scope::UserProfile;
use crate::approval::store::{ClaimStore, UserDirectory, VersionToken, WorkflowStore};
use crate::approval::types::{ClaimRecord, WorkflowDefinition};

fn poisoned() -> ApprovalError {
    ApprovalError::Storage("in-memory store lock poisoned".to_string())
}

/// In-memory workflow definition store.
#[derive(Debug, Default)]
pub struct InMemoryWorkflowStore {
    workflows: Mutex<HashMap<WorkflowId, WorkflowDefinition>>,
}

impl InMemoryWorkflowStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a workflow definition.
    pub fn insert(&self, workflow: WorkflowDefinition) -> Result<(), ApprovalError> {
        self.workflows
            .lock()
            .map_err(|_| poisoned())?
            .insert(workflow.id, workflow);
        Ok(())
    }
}

impl WorkflowStore for InMemoryWorkflowStore {
    fn get_by_id(&self, id: WorkflowId) -> Result<WorkflowDefinition, ApprovalError> {
        self.workflows
            .lock()
            .map_err(|_| poisoned())?
            .get(&id)
            .cloned()
            .ok_or(ApprovalError::WorkflowNotFound(id))
    }
}

/// In-memory versioned claim store.
#[derive(Debug, Default)]
pub struct InMemoryClaimStore {
    claims: Mutex<HashMap<ClaimId, (ClaimRecord, u64)>>,
}

impl InMemoryClaimStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a freshly submitted claim at version 0.
    pub fn insert(&self, record: ClaimRecord) -> Result<(), ApprovalError> {
        self.claims
            .lock()
            .map_err(|_| poisoned())?
            .insert(record.id, (record, 0));
        Ok(())
    }
}

impl ClaimStore for InMemoryClaimStore {
    fn load(&self, id: ClaimId) -> Result<(ClaimRecord, VersionToken), ApprovalError> {
        self.claims
            .lock()
            .map_err(|_| poisoned())?
            .get(&id)
            .map(|(record, version)| (record.clone(), VersionToken(*version)))
            .ok_or(ApprovalError::ClaimNotFound(id))
    }

    fn save(&self, record: &ClaimRecord, token: VersionToken) -> Result<(), ApprovalError> {
        let mut claims = self.claims.lock().map_err(|_| poisoned())?;
        let Some((stored, version)) = claims.get_mut(&record.id) else {
            return Err(ApprovalError::ClaimNotFound(record.id));
        };
        if *version != token.0 {
            return Err(ApprovalError::Conflict(record.id));
        }
        *stored = record.clone();
        *version += 1;
        Ok(())
    }
}

/// In-memory user directory.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: Mutex<HashMap<UserId, UserProfile>>,
}

impl InMemoryUserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a user profile.
    pub fn insert(&self, profile: UserProfile) -> Result<(), ApprovalError> {
        self.users
            .lock()
            .map_err(|_| poisoned())?
            .insert(profile.id, profile);
        Ok(())
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn profile(&self, id: UserId) -> Result<UserProfile, ApprovalError> {
        self.users
            .lock()
            .map_err(|_| poisoned())?
            .get(&id)
            .cloned()
            .ok_or(ApprovalError::UserNotFound(id))
    }

    fn is_member(&self, company: CompanyId, user: UserId) -> Result<bool, ApprovalError> {
        Ok(self
            .users
            .lock()
            .map_err(|_| poisoned())?
            .get(&user)
            .is_some_and(|p| p.company == company))
    }
}
