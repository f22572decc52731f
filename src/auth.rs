use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, Result};
use crate::types::AdminId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdminRole {
    Moderator,
    Admin,
    SuperAdmin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminStatus {
    Active,
    Suspended,
}

/// an operator of the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    pub id: AdminId,
    pub name: String,
    pub email: String,
    pub role: AdminRole,
    pub status: AdminStatus,
}

impl Admin {
    pub fn new(id: AdminId, name: &str, email: &str, role: AdminRole) -> Self {
        Self {
            id,
            name: name.to_string(),
            email: email.trim().to_lowercase(),
            role,
            status: AdminStatus::Active,
        }
    }
}

/// proof that the caller is an active administrator
///
/// Can only be obtained through [`AdminToken::issue`]; every privileged ledger
/// operation takes one by reference.
///
/// Admin status and role are checked once, at issue. The ledger does not look
/// the admin up again, so a token stays valid after its admin is suspended or
/// demoted. Callers drop tokens at the end of a session and issue a fresh one
/// per authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminToken {
    admin_id: AdminId,
    role: AdminRole,
}

impl AdminToken {
    pub fn issue(admin: &Admin) -> Result<Self> {
        if admin.status == AdminStatus::Suspended {
            return Err(LedgerError::Unauthorized {
                message: format!("admin {} is suspended", admin.id),
            });
        }
        Ok(Self {
            admin_id: admin.id,
            role: admin.role,
        })
    }

    pub fn admin_id(&self) -> AdminId {
        self.admin_id
    }

    pub fn role(&self) -> AdminRole {
        self.role
    }

    pub fn can_adjust_balances(&self) -> bool {
        self.role >= AdminRole::Admin
    }

    pub fn can_edit_catalog(&self) -> bool {
        self.role >= AdminRole::Admin
    }

    pub(crate) fn require_balance_rights(&self) -> Result<()> {
        if !self.can_adjust_balances() {
            return Err(self.denied("adjust balances"));
        }
        Ok(())
    }

    pub(crate) fn require_catalog_rights(&self) -> Result<()> {
        if !self.can_edit_catalog() {
            return Err(self.denied("edit the plan catalog"));
        }
        Ok(())
    }

    fn denied(&self, what: &str) -> LedgerError {
        LedgerError::Unauthorized {
            message: format!("{:?} {} may not {}", self.role, self.admin_id, what),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use uuid::Uuid;

    #[test]
    fn test_suspended_admin_gets_no_token() {
        let mut admin = Admin::new(Uuid::new_v4(), "Ops", "ops@example.com", AdminRole::SuperAdmin);
        assert!(AdminToken::issue(&admin).is_ok());

        admin.status = AdminStatus::Suspended;
        let err = AdminToken::issue(&admin).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authorization);
    }

    #[test]
    fn test_token_snapshots_admin_at_issue() {
        let mut admin = Admin::new(Uuid::new_v4(), "Ops", "ops@example.com", AdminRole::Admin);
        let token = AdminToken::issue(&admin).unwrap();

        admin.status = AdminStatus::Suspended;
        admin.role = AdminRole::Moderator;
        assert_eq!(token.role(), AdminRole::Admin);
        assert!(token.require_balance_rights().is_ok());
        assert!(AdminToken::issue(&admin).is_err());
    }

    #[test]
    fn test_moderator_rights() {
        let moderator = Admin::new(Uuid::new_v4(), "Mod", "mod@example.com", AdminRole::Moderator);
        let token = AdminToken::issue(&moderator).unwrap();
        assert!(!token.can_adjust_balances());
        assert!(token.require_catalog_rights().is_err());

        let admin = Admin::new(Uuid::new_v4(), "Admin", "admin@example.com", AdminRole::Admin);
        let token = AdminToken::issue(&admin).unwrap();
        assert!(token.require_balance_rights().is_ok());
        assert!(token.require_catalog_rights().is_ok());
    }

    #[test]
    fn test_role_serializes_kebab_case() {
        let json = serde_json::to_string(&AdminRole::SuperAdmin).unwrap();
        assert_eq!(json, "\"super-admin\"");
    }
}
