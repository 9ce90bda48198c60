//! Account and credit collaborator
//!
//! Session identity, role, and the credit record gating how many reports
//! a user may generate. Injected into the generation flow so the core
//! stays testable in isolation; the managed backend behind it is not
//! modeled here.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use medscribe_foundation::GenerationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credits {
    pub total: u32,
    pub used: u32,
}

impl Credits {
    pub fn remaining(&self) -> u32 {
        self.total.saturating_sub(self.used)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub user_id: String,
    pub email: String,
}

pub trait AccountService: Send + Sync {
    fn session(&self) -> Option<SessionIdentity>;
    fn role(&self) -> Role;
    fn credits(&self) -> Credits;
    /// Record one consumed report credit; fails at zero remaining
    fn consume_credit(&self) -> Result<(), GenerationError>;
}

/// In-memory account, used by the console session and by tests
pub struct MemoryAccount {
    identity: SessionIdentity,
    role: Role,
    credits: Mutex<Credits>,
}

impl MemoryAccount {
    pub fn new(identity: SessionIdentity, role: Role, total_credits: u32) -> Self {
        Self {
            identity,
            role,
            credits: Mutex::new(Credits {
                total: total_credits,
                used: 0,
            }),
        }
    }

    pub fn local(total_credits: u32) -> Self {
        Self::new(
            SessionIdentity {
                user_id: "local".to_string(),
                email: "local@medscribe".to_string(),
            },
            Role::User,
            total_credits,
        )
    }
}

impl AccountService for MemoryAccount {
    fn session(&self) -> Option<SessionIdentity> {
        Some(self.identity.clone())
    }

    fn role(&self) -> Role {
        self.role
    }

    fn credits(&self) -> Credits {
        *self.credits.lock()
    }

    fn consume_credit(&self) -> Result<(), GenerationError> {
        let mut credits = self.credits.lock();
        if credits.remaining() == 0 {
            return Err(GenerationError::CreditsExhausted);
        }
        credits.used += 1;
        Ok(())
    }
}
