//! Role policy: which roles may perform which action.

use uuid::Uuid;

use super::Rejection;
use crate::models::{Principal, Role};

/// Guarded operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    CreateDevice,
    ReportFault,
    AssignFault,
    StartRepair,
    EndRepair,
    ConfirmFault,
    RequestTransfer,
    ApproveTransfer,
    RejectTransfer,
    ListUsers,
    ViewAllFaults,
    ViewReports,
    ViewAnnualReports,
    ViewAuditLog,
    ViewSystemStats,
}

impl Action {
    /// Roles allowed to perform the action, `None` when any principal may.
    ///
    /// Ownership rules (assignee, creator) are checked by the transition
    /// itself on top of this table.
    pub fn allowed_roles(self) -> Option<&'static [Role]> {
        match self {
            Action::CreateDevice => Some(&[Role::Manager, Role::Technician]),
            Action::AssignFault => Some(&[Role::Manager]),
            Action::StartRepair | Action::EndRepair => Some(&[Role::Technician]),
            Action::ApproveTransfer | Action::RejectTransfer => Some(&[Role::Quality]),
            Action::ListUsers | Action::ViewAllFaults | Action::ViewReports => {
                Some(&[Role::Manager, Role::Quality])
            }
            Action::ViewAnnualReports | Action::ViewAuditLog | Action::ViewSystemStats => {
                Some(&[Role::Quality])
            }
            Action::ReportFault | Action::ConfirmFault | Action::RequestTransfer => None,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Action::CreateDevice => "create devices",
            Action::ReportFault => "report faults",
            Action::AssignFault => "assign faults",
            Action::StartRepair => "start repairs",
            Action::EndRepair => "end repairs",
            Action::ConfirmFault => "confirm repairs",
            Action::RequestTransfer => "request transfers",
            Action::ApproveTransfer => "approve transfers",
            Action::RejectTransfer => "reject transfers",
            Action::ListUsers => "list users",
            Action::ViewAllFaults => "view all faults",
            Action::ViewReports => "view reports",
            Action::ViewAnnualReports => "view annual reports",
            Action::ViewAuditLog => "view the audit log",
            Action::ViewSystemStats => "view system statistics",
        }
    }

    pub fn authorize(self, principal: &Principal) -> Result<(), Rejection> {
        match self.allowed_roles() {
            Some(roles) if !roles.contains(&principal.role) => Err(Rejection::ForbiddenRole {
                action: self,
                role: principal.role,
            }),
            _ => Ok(()),
        }
    }
}

/// Which faults a principal sees in the default fault list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultScope {
    All,
    AssignedTo(Uuid),
    CreatedBy(Uuid),
}

pub fn fault_scope(principal: &Principal) -> FaultScope {
    match principal.role {
        Role::Technician => FaultScope::AssignedTo(principal.id),
        Role::HealthStaff => FaultScope::CreatedBy(principal.id),
        Role::Manager | Role::Quality => FaultScope::All,
    }
}

pub(crate) fn require_assignee(principal: &Principal, assigned_to: Option<Uuid>) -> Result<(), Rejection> {
    if assigned_to == Some(principal.id) {
        Ok(())
    } else {
        Err(Rejection::WrongAssignee)
    }
}

pub(crate) fn require_creator(principal: &Principal, created_by: Uuid) -> Result<(), Rejection> {
    if created_by == principal.id {
        Ok(())
    } else {
        Err(Rejection::NotCreator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::testing::principal;
    use assert_matches::assert_matches;

    const ROLES: [Role; 4] = [Role::HealthStaff, Role::Technician, Role::Manager, Role::Quality];

    #[test]
    fn test_open_actions_accept_every_role() {
        for role in ROLES {
            let who = principal(role, "anyone");
            assert!(Action::ReportFault.authorize(&who).is_ok());
            assert!(Action::ConfirmFault.authorize(&who).is_ok());
            assert!(Action::RequestTransfer.authorize(&who).is_ok());
        }
    }

    #[test]
    fn test_assignment_is_manager_only() {
        for role in ROLES {
            let result = Action::AssignFault.authorize(&principal(role, "x"));
            if role == Role::Manager {
                assert!(result.is_ok());
            } else {
                assert_matches!(
                    result,
                    Err(Rejection::ForbiddenRole { action: Action::AssignFault, role: r }) if r == role
                );
            }
        }
    }

    #[test]
    fn test_reports_split_between_manager_and_quality() {
        let manager = principal(Role::Manager, "m");
        let quality = principal(Role::Quality, "q");
        assert!(manager.require(Action::ViewReports).is_ok());
        assert!(quality.require(Action::ViewReports).is_ok());
        assert!(manager.require(Action::ViewAnnualReports).is_err());
        assert!(quality.require(Action::ViewAuditLog).is_ok());
        assert!(manager.require(Action::ApproveTransfer).is_err());
    }

    #[test]
    fn test_fault_scope() {
        let tech = principal(Role::Technician, "t");
        let staff = principal(Role::HealthStaff, "s");
        assert_eq!(fault_scope(&tech), FaultScope::AssignedTo(tech.id));
        assert_eq!(fault_scope(&staff), FaultScope::CreatedBy(staff.id));
        assert_eq!(fault_scope(&principal(Role::Quality, "q")), FaultScope::All);
    }

    #[test]
    fn test_ownership_helpers() {
        let tech = principal(Role::Technician, "t");
        assert!(require_assignee(&tech, Some(tech.id)).is_ok());
        assert_eq!(require_assignee(&tech, None), Err(Rejection::WrongAssignee));
        assert_eq!(require_creator(&tech, Uuid::new_v4()), Err(Rejection::NotCreator));
    }
}
