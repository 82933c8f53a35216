//! Role → capability table
//!
//! Every role-dependent decision in the enrollment core reads this table
//! instead of matching on the role at the call site.

use shared::models::Role;

/// Which payments a role may see in the history view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeRule {
    All,
    AssignedOrEnrolled,
    AgentNetwork,
    EnrolledBy,
    Own,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolePolicy {
    /// May record a manually attested cash payment
    pub accepts_cash: bool,
    /// Cash enrollments by this role are announced to all admins
    pub notifies_admins_on_cash: bool,
    /// May enroll someone other than itself
    pub enrolls_others: bool,
    pub history_scope: ScopeRule,
}

const ADMIN: RolePolicy = RolePolicy {
    accepts_cash: true,
    notifies_admins_on_cash: false,
    enrolls_others: true,
    history_scope: ScopeRule::All,
};

const EMPLOYEE: RolePolicy = RolePolicy {
    accepts_cash: true,
    notifies_admins_on_cash: true,
    enrolls_others: true,
    history_scope: ScopeRule::AssignedOrEnrolled,
};

const AGENT: RolePolicy = RolePolicy {
    accepts_cash: false,
    notifies_admins_on_cash: false,
    enrolls_others: true,
    history_scope: ScopeRule::AgentNetwork,
};

const ASSOCIATE: RolePolicy = RolePolicy {
    accepts_cash: false,
    notifies_admins_on_cash: false,
    enrolls_others: true,
    history_scope: ScopeRule::EnrolledBy,
};

const USER: RolePolicy = RolePolicy {
    accepts_cash: false,
    notifies_admins_on_cash: false,
    enrolls_others: false,
    history_scope: ScopeRule::Own,
};

pub const fn policy_for(role: Role) -> &'static RolePolicy {
    match role {
        Role::Admin => &ADMIN,
        Role::Employee => &EMPLOYEE,
        Role::Agent => &AGENT,
        Role::Associate => &ASSOCIATE,
        Role::User => &USER,
    }
}
