use modbot_common::models::ChatEvent;
use tracing::debug;

use crate::Error;
use crate::services::notices;

/// Who may run a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Anyone,
    /// Admins in groups; anyone in a private chat (the sender owns it).
    GroupAdmin,
    GroupOnly,
    PrivateOnly,
}

/// Central capability check. Handlers call this explicitly; admin status comes
/// from `ChatEvent::sender_is_admin`, which the pipeline resolves through the
/// platform before dispatch.
pub fn require(event: &ChatEvent, role: Role) -> Result<(), Error> {
    let allowed = match role {
        Role::Anyone => true,
        Role::GroupAdmin => event.is_private() || event.sender_is_admin,
        Role::GroupOnly => event.is_group(),
        Role::PrivateOnly => event.is_private(),
    };
    debug!(
        chat_id = event.chat_id,
        user_id = event.sender_id,
        "Permission check {:?} => {}",
        role,
        allowed
    );
    if allowed {
        Ok(())
    } else {
        Err(Error::PermissionDenied(denial_notice(role).to_string()))
    }
}

/// Fixed notice shown to a user who failed `require` for `role`.
pub fn denial_notice(role: Role) -> &'static str {
    match role {
        Role::Anyone | Role::GroupAdmin => notices::ADMIN_ONLY,
        Role::GroupOnly => notices::GROUP_ONLY,
        Role::PrivateOnly => notices::PRIVATE_ONLY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modbot_common::models::ChatKind;

    fn event(kind: ChatKind, admin: bool) -> ChatEvent {
        ChatEvent {
            chat_id: 1,
            sender_id: 2,
            message_id: 3,
            text: String::new(),
            sender_is_admin: admin,
            sender_is_bot: false,
            chat_kind: kind,
            chat_title: None,
            sender_username: None,
            reply_to_user_id: None,
            reply_to_message_id: None,
        }
    }

    #[test]
    fn test_group_admin_role() {
        assert!(require(&event(ChatKind::Group, true), Role::GroupAdmin).is_ok());
        assert!(require(&event(ChatKind::Private, false), Role::GroupAdmin).is_ok());
        assert!(matches!(
            require(&event(ChatKind::Group, false), Role::GroupAdmin),
            Err(Error::PermissionDenied(_))
        ));
    }

    #[test]
    fn test_chat_kind_roles() {
        assert!(require(&event(ChatKind::Group, false), Role::GroupOnly).is_ok());
        assert!(require(&event(ChatKind::Private, false), Role::GroupOnly).is_err());
        assert!(require(&event(ChatKind::Private, false), Role::PrivateOnly).is_ok());
        assert!(require(&event(ChatKind::Group, true), Role::PrivateOnly).is_err());
    }
}
