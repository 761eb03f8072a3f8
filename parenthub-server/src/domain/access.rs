//! Access gate: one predicate table for every route class.
//!
//! The gate is a pure function of the requester identity and the route
//! requirement. Callers turn the decision into a redirect (page routes) or a
//! 401/403 response (API routes).

use super::error::DomainError;
use super::post::{PostKind, PostRef};
use super::user::{AccountStatus, Role};

/// Request-scoped identity decoded from the session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Identity {
    pub(crate) user_id: i64,
    pub(crate) nickname: String,
    pub(crate) role: Role,
    pub(crate) status: AccountStatus,
}

impl Identity {
    pub(crate) fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Requirement {
    Public,
    Authenticated,
    /// Expert or admin; column authoring.
    ColumnAuthor,
    OwnerOrAdmin { owner_id: i64 },
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GateDecision {
    Allow,
    RedirectToLogin,
    RedirectToUnauthorized,
}

impl GateDecision {
    pub(crate) fn into_result(self) -> Result<(), DomainError> {
        match self {
            GateDecision::Allow => Ok(()),
            GateDecision::RedirectToLogin => Err(DomainError::AuthenticationRequired),
            GateDecision::RedirectToUnauthorized => Err(DomainError::Forbidden),
        }
    }
}

pub(crate) fn evaluate(identity: Option<&Identity>, requirement: Requirement) -> GateDecision {
    let Some(identity) = identity else {
        return match requirement {
            Requirement::Public => GateDecision::Allow,
            _ => GateDecision::RedirectToLogin,
        };
    };

    // banned beats every role, including admin
    if identity.status == AccountStatus::Banned {
        return GateDecision::RedirectToUnauthorized;
    }

    let allowed = match requirement {
        Requirement::Public | Requirement::Authenticated => true,
        Requirement::ColumnAuthor => matches!(identity.role, Role::Expert | Role::Admin),
        Requirement::OwnerOrAdmin { owner_id } => {
            identity.user_id == owner_id || identity.is_admin()
        }
        Requirement::Admin => identity.is_admin(),
    };

    if allowed {
        GateDecision::Allow
    } else {
        GateDecision::RedirectToUnauthorized
    }
}

/// Shorthand for services: evaluate and convert into a domain error.
pub(crate) fn authorize(
    identity: Option<&Identity>,
    requirement: Requirement,
) -> Result<(), DomainError> {
    evaluate(identity, requirement).into_result()
}

/// Route classes of the web front-end's page paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PageRoute {
    Public,
    Detail(PostKind),
    Write(PostKind),
    Edit(PostRef),
    Member,
    Admin,
}

impl PageRoute {
    /// Requirement for every class except `Edit`, whose owner must be looked up first.
    pub(crate) fn requirement(self) -> Option<Requirement> {
        match self {
            PageRoute::Public => Some(Requirement::Public),
            PageRoute::Detail(_) | PageRoute::Member => Some(Requirement::Authenticated),
            PageRoute::Write(PostKind::Column) => Some(Requirement::ColumnAuthor),
            PageRoute::Write(PostKind::Community) => Some(Requirement::Authenticated),
            PageRoute::Admin => Some(Requirement::Admin),
            PageRoute::Edit(_) => None,
        }
    }
}

pub(crate) fn classify_page(path: &str) -> PageRoute {
    let path = path
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim_end_matches('/');
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match segments.as_slice() {
        ["admin", ..] => PageRoute::Admin,
        ["mypage", ..] => PageRoute::Member,
        [board, rest @ ..] => {
            let kind = match *board {
                "column" => PostKind::Column,
                "community" => PostKind::Community,
                _ => return PageRoute::Public,
            };
            match rest {
                [] => PageRoute::Public,
                ["write"] => PageRoute::Write(kind),
                ["edit", id] => match id.parse::<i64>() {
                    Ok(id) if id > 0 => PageRoute::Edit(PostRef { kind, id }),
                    _ => PageRoute::Detail(kind),
                },
                _ => PageRoute::Detail(kind),
            }
        }
        [] => PageRoute::Public,
    }
}
