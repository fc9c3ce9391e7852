//! Правила доступа к постам и комментариям.
//!
//! Функции ничего не меняют и не возвращают ошибок: `false` превращает в
//! `DomainError::Forbidden` вызывающий сервис.

use super::comment::Comment;
use super::post::Post;
use super::principal::Principal;

pub(crate) fn can_mutate_post(principal: &Principal, post: &Post) -> bool {
    principal.id == post.user_id || principal.is_admin
}

pub(crate) fn can_delete_post(principal: &Principal, post: &Post) -> bool {
    can_mutate_post(principal, post)
}

pub(crate) fn can_mutate_comment(principal: &Principal, comment: &Comment) -> bool {
    principal.id == comment.user_id || principal.is_admin
}

/// Автор поста теряет право удалять комментарии, если сам пост удалён.
pub(crate) fn can_delete_comment(
    principal: &Principal,
    comment: &Comment,
    parent_post: &Post,
) -> bool {
    principal.id == comment.user_id
        || (principal.id == parent_post.user_id && !parent_post.is_deleted())
        || principal.is_admin
}
