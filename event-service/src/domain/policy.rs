//! 用户变更的授权判定。
//!
//! 纯函数，无副作用；每个角色的权限范围由 [`Role::mutation_scope`] 决定。

use uuid::Uuid;

use crate::domain::models::user::{Principal, Role};

/// 角色可变更的用户记录范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationScope {
    /// 只能变更自己的记录
    OwnRecord,
    AnyRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }
}

impl Role {
    pub fn mutation_scope(self) -> MutationScope {
        match self {
            Role::Admin => MutationScope::AnyRecord,
            Role::ContentManager => MutationScope::OwnRecord,
        }
    }

    pub fn can_assign_roles(self) -> bool {
        self.mutation_scope() == MutationScope::AnyRecord
    }
}

pub fn can_mutate(principal: &Principal, target_id: Uuid) -> Decision {
    match principal.role.mutation_scope() {
        MutationScope::AnyRecord => Decision::Allow,
        MutationScope::OwnRecord if principal.id == target_id => Decision::Allow,
        MutationScope::OwnRecord => Decision::Deny,
    }
}

/// 角色字段只能由不受限角色改变；请求值与当前值相同视为未改变
pub fn can_change_role(principal: &Principal, current: Role, requested: Role) -> Decision {
    if requested == current || principal.role.can_assign_roles() {
        Decision::Allow
    } else {
        Decision::Deny
    }
}
