//! Authorization policy.
//!
//! Every permission decision in the service goes through [`allowed`]. It only
//! looks at the resolved caller and the stored owner of the target, so it is
//! evaluated without touching the database or the transport layer.

use super::Role;

/// Identity resolved from a verified access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: i32,
    pub username: String,
    pub role: Role,
}

/// Whoever is making the current request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Caller {
    #[default]
    Anonymous,
    User(Principal),
}

impl Caller {
    #[must_use]
    pub const fn principal(&self) -> Option<&Principal> {
        match self {
            Self::Anonymous => None,
            Self::User(principal) => Some(principal),
        }
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::User(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    #[must_use]
    pub const fn is_write(self) -> bool {
        !matches!(self, Self::Read)
    }
}

/// Target of an action. Authored resources carry the stored author id when
/// the action targets an existing record, and `None` for collection-level
/// actions such as create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Category,
    Genre,
    Title,
    /// Account management by username (`/users`, `/users/{username}`).
    UserAccount,
    /// The caller's own profile (`/users/me`).
    OwnProfile,
    Review { author_id: Option<i32> },
    Comment { author_id: Option<i32> },
}

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// No credentials were presented.
    Unauthenticated,
    /// Credentials were valid but do not grant the action.
    Forbidden,
}

#[must_use]
pub fn allowed(caller: &Caller, action: Action, resource: Resource) -> bool {
    match resource {
        Resource::Category | Resource::Genre | Resource::Title => {
            !action.is_write() || has_role(caller, Role::Admin)
        }
        Resource::UserAccount => has_role(caller, Role::Admin),
        Resource::OwnProfile => {
            caller.is_authenticated() && matches!(action, Action::Read | Action::Update)
        }
        Resource::Review { author_id } | Resource::Comment { author_id } => match action {
            Action::Read => true,
            Action::Create => caller.is_authenticated(),
            Action::Update | Action::Delete => {
                has_role(caller, Role::Moderator) || is_author(caller, author_id)
            }
        },
    }
}

/// [`allowed`], turned into the refusal the transport layer reports.
pub fn authorize(caller: &Caller, action: Action, resource: Resource) -> Result<(), Denial> {
    if allowed(caller, action, resource) {
        Ok(())
    } else if caller.is_authenticated() {
        Err(Denial::Forbidden)
    } else {
        Err(Denial::Unauthenticated)
    }
}

fn has_role(caller: &Caller, required: Role) -> bool {
    caller
        .principal()
        .is_some_and(|principal| principal.role.at_least(required))
}

fn is_author(caller: &Caller, author_id: Option<i32>) -> bool {
    match (caller.principal(), author_id) {
        (Some(principal), Some(author_id)) => principal.id == author_id,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i32, role: Role) -> Caller {
        Caller::User(Principal {
            id,
            username: format!("user{id}"),
            role,
        })
    }

    const ALL_ACTIONS: [Action; 4] = [Action::Read, Action::Create, Action::Update, Action::Delete];

    #[test]
    fn test_catalog_is_admin_write_public_read() {
        for resource in [Resource::Category, Resource::Genre, Resource::Title] {
            assert!(allowed(&Caller::Anonymous, Action::Read, resource));
            assert!(allowed(&user(1, Role::User), Action::Read, resource));

            for action in [Action::Create, Action::Update, Action::Delete] {
                assert!(!allowed(&Caller::Anonymous, action, resource));
                assert!(!allowed(&user(1, Role::User), action, resource));
                assert!(!allowed(&user(1, Role::Moderator), action, resource));
                assert!(allowed(&user(1, Role::Admin), action, resource));
            }
        }
    }

    #[test]
    fn test_user_accounts_are_admin_only() {
        for action in ALL_ACTIONS {
            assert!(!allowed(&Caller::Anonymous, action, Resource::UserAccount));
            assert!(!allowed(&user(1, Role::User), action, Resource::UserAccount));
            assert!(!allowed(&user(1, Role::Moderator), action, Resource::UserAccount));
            assert!(allowed(&user(1, Role::Admin), action, Resource::UserAccount));
        }
    }

    #[test]
    fn test_own_profile_read_and_update_only() {
        let caller = user(3, Role::User);
        assert!(allowed(&caller, Action::Read, Resource::OwnProfile));
        assert!(allowed(&caller, Action::Update, Resource::OwnProfile));
        assert!(!allowed(&caller, Action::Delete, Resource::OwnProfile));
        assert!(!allowed(&caller, Action::Create, Resource::OwnProfile));
        assert!(!allowed(&Caller::Anonymous, Action::Read, Resource::OwnProfile));
    }

    #[test]
    fn test_review_write_rules() {
        let existing = Resource::Review { author_id: Some(7) };
        let collection = Resource::Review { author_id: None };

        assert!(allowed(&Caller::Anonymous, Action::Read, existing));
        assert!(!allowed(&Caller::Anonymous, Action::Create, collection));
        assert!(allowed(&user(9, Role::User), Action::Create, collection));

        for action in [Action::Update, Action::Delete] {
            assert!(allowed(&user(7, Role::User), action, existing));
            assert!(!allowed(&user(8, Role::User), action, existing));
            assert!(allowed(&user(8, Role::Moderator), action, existing));
            assert!(allowed(&user(8, Role::Admin), action, existing));
            assert!(!allowed(&Caller::Anonymous, action, existing));
        }
    }

    #[test]
    fn test_comment_follows_review_rules() {
        let existing = Resource::Comment { author_id: Some(2) };
        assert!(allowed(&user(2, Role::User), Action::Delete, existing));
        assert!(!allowed(&user(5, Role::User), Action::Update, existing));
        assert!(allowed(&user(5, Role::Moderator), Action::Update, existing));
    }

    #[test]
    fn test_missing_author_never_matches() {
        let collection = Resource::Review { author_id: None };
        assert!(!allowed(&user(1, Role::User), Action::Delete, collection));
    }

    #[test]
    fn test_authorize_distinguishes_anonymous() {
        assert_eq!(
            authorize(&Caller::Anonymous, Action::Create, Resource::Category),
            Err(Denial::Unauthenticated)
        );
        assert_eq!(
            authorize(&user(1, Role::User), Action::Create, Resource::Category),
            Err(Denial::Forbidden)
        );
        assert_eq!(
            authorize(&user(1, Role::Admin), Action::Create, Resource::Category),
            Ok(())
        );
    }
}
