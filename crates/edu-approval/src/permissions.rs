//! Permission-scoped transition validation.
//!
//! Role branching lives in one table, [`grant`], keyed by `(Role, Capability)`.
//! A transition is legal when the status graph allows the edge, every
//! capability the edge needs is granted, and the actor's scope covers the
//! target school.

use std::fmt;

use edu_core::entities::{Actor, OrgTarget};
use edu_core::enums::{EntryStatus, Role, ScopeLevel};
use edu_core::responses::TransitionDecision;

/// Denial reason for any actor acting outside its bound organization.
pub const SCOPE_MISMATCH: &str = "scope mismatch";

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Write data for a target at all.
    Act,
    /// Move an entry into `pending`.
    Submit,
    /// Move a returned entry back to `draft`.
    Reopen,
    SectorApprove,
    RegionApprove,
    /// Move an entry into `approved`.
    FinalApprove,
    Return,
    Reject,
    /// Reopen a locked or terminal entry outside the normal graph.
    Override,
}

impl Capability {
    pub const ALL: [Self; 9] = [
        Self::Act,
        Self::Submit,
        Self::Reopen,
        Self::SectorApprove,
        Self::RegionApprove,
        Self::FinalApprove,
        Self::Return,
        Self::Reject,
        Self::Override,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Act => "act",
            Self::Submit => "submit",
            Self::Reopen => "reopen",
            Self::SectorApprove => "sector approve",
            Self::RegionApprove => "region approve",
            Self::FinalApprove => "final approve",
            Self::Return => "return",
            Self::Reject => "reject",
            Self::Override => "override",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Grant
// ---------------------------------------------------------------------------

/// Which field of the target must equal the actor's bound org id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Unscoped,
    Within(ScopeLevel),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    Allow(Scope),
    /// Allowed only for actors holding final-approval rights.
    WithFinalApproval(Scope),
    Deny,
}

const SCHOOL: Scope = Scope::Within(ScopeLevel::School);
const SECTOR: Scope = Scope::Within(ScopeLevel::Sector);
const REGION: Scope = Scope::Within(ScopeLevel::Region);

/// The permission matrix.
#[must_use]
pub const fn grant(role: Role, capability: Capability) -> Grant {
    use Capability as C;
    match (role, capability) {
        (Role::SuperAdmin, _) => Grant::Allow(Scope::Unscoped),

        (Role::SchoolAdmin, C::Act | C::Submit | C::Reopen) => Grant::Allow(SCHOOL),
        (Role::SchoolAdmin, _) => Grant::Deny,

        (
            Role::SectorAdmin,
            C::Act | C::Submit | C::Reopen | C::SectorApprove | C::Return | C::Reject,
        ) => Grant::Allow(SECTOR),
        (Role::SectorAdmin, C::FinalApprove) => Grant::WithFinalApproval(SECTOR),
        (Role::SectorAdmin, C::RegionApprove | C::Override) => Grant::Deny,

        (Role::RegionAdmin, C::FinalApprove) => Grant::WithFinalApproval(REGION),
        (Role::RegionAdmin, C::Override) => Grant::Deny,
        (Role::RegionAdmin, _) => Grant::Allow(REGION),
    }
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

fn scope_covers(actor: &Actor, target: &OrgTarget) -> bool {
    let Some(level) = actor.role.scope_level() else {
        return true;
    };
    let Some(org_id) = actor.org_id.as_deref() else {
        return false;
    };
    let target_id = match level {
        ScopeLevel::School => &target.school_id,
        ScopeLevel::Sector => &target.sector_id,
        ScopeLevel::Region => &target.region_id,
    };
    target_id == org_id
}

/// Whether `actor` holds `capability`, ignoring scope.
fn check_capability(actor: &Actor, capability: Capability) -> Result<(), String> {
    match grant(actor.role, capability) {
        Grant::Allow(_) => Ok(()),
        Grant::WithFinalApproval(_) if actor.final_approval && actor.role >= Role::SectorAdmin => {
            Ok(())
        }
        Grant::WithFinalApproval(_) => Err(format!(
            "{} requires final approval rights",
            capability.as_str()
        )),
        Grant::Deny => Err(format!(
            "{} may not {}",
            actor.role.as_str(),
            capability.as_str()
        )),
    }
}

/// Whether `actor` may act on `target` at all.
#[must_use]
pub fn can_act(actor: &Actor, target: &OrgTarget) -> bool {
    check_capability(actor, Capability::Act).is_ok() && scope_covers(actor, target)
}

/// Capability that moves an entry forward out of `status`, if any.
const fn forward_capability(status: EntryStatus) -> Option<Capability> {
    match status {
        EntryStatus::Pending => Some(Capability::SectorApprove),
        EntryStatus::SectorApproved => Some(Capability::RegionApprove),
        EntryStatus::RegionApproved => Some(Capability::FinalApprove),
        _ => None,
    }
}

/// Capabilities required to move an entry from `current` to `next`.
fn required_capabilities(current: EntryStatus, next: EntryStatus) -> Vec<Capability> {
    match next {
        EntryStatus::Draft => vec![Capability::Reopen],
        EntryStatus::Pending => vec![Capability::Submit],
        EntryStatus::SectorApproved => vec![Capability::SectorApprove],
        EntryStatus::RegionApproved => vec![Capability::RegionApprove],
        EntryStatus::Approved => vec![Capability::FinalApprove],
        EntryStatus::Returned => {
            let mut caps = vec![Capability::Return];
            caps.extend(forward_capability(current));
            caps
        }
        EntryStatus::Rejected => {
            let mut caps = vec![Capability::Reject];
            caps.extend(forward_capability(current));
            caps
        }
    }
}

/// Decide whether `actor` may move an entry of `target` from `current` to
/// `next`. Scope is checked before anything else.
#[must_use]
pub fn can_transition(
    current: EntryStatus,
    next: EntryStatus,
    actor: &Actor,
    target: &OrgTarget,
) -> TransitionDecision {
    if !can_act(actor, target) {
        return TransitionDecision::deny(SCOPE_MISMATCH);
    }
    if current == next {
        return TransitionDecision::deny(format!("entry is already {current}"));
    }
    if !current.can_transition_to(next) {
        return TransitionDecision::deny(format!("cannot move from {current} to {next}"));
    }
    for capability in required_capabilities(current, next) {
        if let Err(reason) = check_capability(actor, capability) {
            return TransitionDecision::deny(reason);
        }
    }
    TransitionDecision::allow()
}

/// The stricter check a proxy submission needs to skip `pending`.
#[must_use]
pub fn can_auto_approve(actor: &Actor, target: &OrgTarget) -> TransitionDecision {
    if actor.role < Role::SectorAdmin {
        return TransitionDecision::deny(format!(
            "{} may not auto-approve",
            actor.role.as_str()
        ));
    }
    if !can_act(actor, target) {
        return TransitionDecision::deny(SCOPE_MISMATCH);
    }
    if let Err(reason) = check_capability(actor, Capability::FinalApprove) {
        return TransitionDecision::deny(reason);
    }
    can_transition(EntryStatus::Pending, EntryStatus::Approved, actor, target)
}

/// Whether `actor` may reopen locked entries of `target`.
#[must_use]
pub fn can_override(actor: &Actor, target: &OrgTarget) -> TransitionDecision {
    if !can_act(actor, target) {
        return TransitionDecision::deny(SCOPE_MISMATCH);
    }
    match check_capability(actor, Capability::Override) {
        Ok(()) => TransitionDecision::allow(),
        Err(reason) => TransitionDecision::deny(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn target() -> OrgTarget {
        OrgTarget {
            school_id: "sch-1".into(),
            sector_id: "sec-1".into(),
            region_id: "reg-1".into(),
        }
    }

    fn actor(role: Role) -> Actor {
        match role {
            Role::SchoolAdmin => Actor::school_admin("usr-00000001", "sch-1"),
            Role::SectorAdmin => Actor::sector_admin("usr-00000002", "sec-1"),
            Role::RegionAdmin => Actor::region_admin("usr-00000003", "reg-1"),
            Role::SuperAdmin => Actor::superadmin("usr-00000004"),
        }
    }

    #[rstest]
    #[case(Role::SchoolAdmin, Capability::Act, Grant::Allow(SCHOOL))]
    #[case(Role::SchoolAdmin, Capability::SectorApprove, Grant::Deny)]
    #[case(Role::SchoolAdmin, Capability::Return, Grant::Deny)]
    #[case(Role::SectorAdmin, Capability::SectorApprove, Grant::Allow(SECTOR))]
    #[case(Role::SectorAdmin, Capability::RegionApprove, Grant::Deny)]
    #[case(Role::SectorAdmin, Capability::FinalApprove, Grant::WithFinalApproval(SECTOR))]
    #[case(Role::RegionAdmin, Capability::RegionApprove, Grant::Allow(REGION))]
    #[case(Role::RegionAdmin, Capability::FinalApprove, Grant::WithFinalApproval(REGION))]
    #[case(Role::RegionAdmin, Capability::Override, Grant::Deny)]
    #[case(Role::SuperAdmin, Capability::Override, Grant::Allow(Scope::Unscoped))]
    fn matrix_rows(#[case] role: Role, #[case] capability: Capability, #[case] expected: Grant) {
        assert_eq!(grant(role, capability), expected);
    }

    #[test]
    fn only_superadmin_may_override() {
        for capability in Capability::ALL {
            assert_eq!(
                grant(Role::SuperAdmin, capability),
                Grant::Allow(Scope::Unscoped)
            );
        }
        for role in [Role::SchoolAdmin, Role::SectorAdmin, Role::RegionAdmin] {
            assert_eq!(grant(role, Capability::Override), Grant::Deny);
        }
    }

    #[test]
    fn scoped_grants_use_the_role_level() {
        for role in [Role::SchoolAdmin, Role::SectorAdmin, Role::RegionAdmin] {
            for capability in Capability::ALL {
                match grant(role, capability) {
                    Grant::Allow(Scope::Within(level))
                    | Grant::WithFinalApproval(Scope::Within(level)) => {
                        assert_eq!(Some(level), role.scope_level());
                    }
                    Grant::Deny => {}
                    other => panic!("unexpected grant {other:?} for {role}"),
                }
            }
        }
    }

    #[rstest]
    #[case(Actor::school_admin("usr-00000001", "sch-1"), true)]
    #[case(Actor::school_admin("usr-00000001", "sch-2"), false)]
    #[case(Actor::sector_admin("usr-00000002", "sec-1"), true)]
    #[case(Actor::sector_admin("usr-00000002", "sec-2"), false)]
    #[case(Actor::region_admin("usr-00000003", "reg-1"), true)]
    #[case(Actor::region_admin("usr-00000003", "reg-2"), false)]
    #[case(Actor::superadmin("usr-00000004"), true)]
    #[case(Actor::new("usr-00000005", Role::SectorAdmin, None), false)]
    fn scope_rule(#[case] actor: Actor, #[case] expected: bool) {
        assert_eq!(can_act(&actor, &target()), expected);
    }

    #[test]
    fn region_admin_out_of_region_gets_scope_mismatch() {
        let actor = Actor::region_admin("usr-00000003", "R2");
        let target = OrgTarget {
            school_id: "sch-1".into(),
            sector_id: "sec-1".into(),
            region_id: "R1".into(),
        };
        let decision = can_transition(EntryStatus::Pending, EntryStatus::Approved, &actor, &target);
        assert!(!decision.allowed);
        assert_eq!(decision.reason.as_deref(), Some("scope mismatch"));
    }

    #[rstest]
    #[case(Role::SchoolAdmin, EntryStatus::Draft, EntryStatus::Pending, true)]
    #[case(Role::SchoolAdmin, EntryStatus::Returned, EntryStatus::Draft, true)]
    #[case(Role::SchoolAdmin, EntryStatus::Returned, EntryStatus::Pending, true)]
    #[case(Role::SchoolAdmin, EntryStatus::Pending, EntryStatus::SectorApproved, false)]
    #[case(Role::SchoolAdmin, EntryStatus::Pending, EntryStatus::Returned, false)]
    #[case(Role::SectorAdmin, EntryStatus::Pending, EntryStatus::SectorApproved, true)]
    #[case(Role::SectorAdmin, EntryStatus::Pending, EntryStatus::Returned, true)]
    #[case(Role::SectorAdmin, EntryStatus::Pending, EntryStatus::Rejected, true)]
    #[case(Role::SectorAdmin, EntryStatus::Pending, EntryStatus::Approved, false)]
    #[case(Role::SectorAdmin, EntryStatus::SectorApproved, EntryStatus::RegionApproved, false)]
    #[case(Role::SectorAdmin, EntryStatus::SectorApproved, EntryStatus::Returned, false)]
    #[case(Role::RegionAdmin, EntryStatus::SectorApproved, EntryStatus::RegionApproved, true)]
    #[case(Role::RegionAdmin, EntryStatus::SectorApproved, EntryStatus::Rejected, true)]
    #[case(Role::RegionAdmin, EntryStatus::RegionApproved, EntryStatus::Approved, false)]
    #[case(Role::RegionAdmin, EntryStatus::RegionApproved, EntryStatus::Returned, false)]
    #[case(Role::SuperAdmin, EntryStatus::RegionApproved, EntryStatus::Approved, true)]
    #[case(Role::SuperAdmin, EntryStatus::Pending, EntryStatus::Approved, true)]
    #[case(Role::SuperAdmin, EntryStatus::Draft, EntryStatus::SectorApproved, false)]
    #[case(Role::SuperAdmin, EntryStatus::Approved, EntryStatus::Pending, false)]
    fn transition_table(
        #[case] role: Role,
        #[case] from: EntryStatus,
        #[case] to: EntryStatus,
        #[case] expected: bool,
    ) {
        let decision = can_transition(from, to, &actor(role), &target());
        assert_eq!(decision.allowed, expected, "{role}: {from} -> {to}");
        if !decision.allowed {
            assert!(!decision.reason_str().is_empty());
        }
    }

    #[test]
    fn final_approval_flag_unlocks_approved() {
        let sector = actor(Role::SectorAdmin).with_final_approval(true);
        assert!(can_transition(EntryStatus::Pending, EntryStatus::Approved, &sector, &target()).allowed);

        let region = actor(Role::RegionAdmin).with_final_approval(true);
        assert!(
            can_transition(EntryStatus::RegionApproved, EntryStatus::Approved, &region, &target())
                .allowed
        );
        assert!(
            can_transition(EntryStatus::RegionApproved, EntryStatus::Returned, &region, &target())
                .allowed
        );
    }

    #[test]
    fn final_approval_flag_does_not_help_school_admin() {
        let school = actor(Role::SchoolAdmin).with_final_approval(true);
        let decision = can_transition(EntryStatus::Pending, EntryStatus::Approved, &school, &target());
        assert!(!decision.allowed);
    }

    #[test]
    fn every_denial_carries_a_reason() {
        for role in [
            Role::SchoolAdmin,
            Role::SectorAdmin,
            Role::RegionAdmin,
            Role::SuperAdmin,
        ] {
            for from in EntryStatus::ALL {
                for to in EntryStatus::ALL {
                    let decision = can_transition(from, to, &actor(role), &target());
                    if !decision.allowed {
                        assert!(!decision.reason_str().trim().is_empty());
                    }
                }
            }
        }
    }

    #[test]
    fn allowed_transitions_follow_the_graph() {
        for from in EntryStatus::ALL {
            for to in EntryStatus::ALL {
                let decision = can_transition(from, to, &actor(Role::SuperAdmin), &target());
                assert_eq!(decision.allowed, from.can_transition_to(to));
            }
        }
    }

    #[test]
    fn auto_approve_requires_final_approval_rights() {
        let plain = actor(Role::SectorAdmin);
        assert!(!can_auto_approve(&plain, &target()).allowed);

        let granted = actor(Role::SectorAdmin).with_final_approval(true);
        assert!(can_auto_approve(&granted, &target()).allowed);

        assert!(can_auto_approve(&actor(Role::SuperAdmin), &target()).allowed);
    }

    #[test]
    fn auto_approve_rejects_school_admin_and_foreign_scope() {
        let school = actor(Role::SchoolAdmin).with_final_approval(true);
        assert!(!can_auto_approve(&school, &target()).allowed);

        let foreign = Actor::sector_admin("usr-00000002", "sec-9").with_final_approval(true);
        let decision = can_auto_approve(&foreign, &target());
        assert_eq!(decision.reason.as_deref(), Some(SCOPE_MISMATCH));
    }

    #[test]
    fn override_is_superadmin_only() {
        assert!(can_override(&actor(Role::SuperAdmin), &target()).allowed);
        assert!(!can_override(&actor(Role::RegionAdmin), &target()).allowed);
    }
}
