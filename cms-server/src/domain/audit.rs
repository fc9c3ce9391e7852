use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Кто и когда создал, изменил и удалил запись.
///
/// Встраивается в `Post` и `Comment`. Непустое `deleted` означает мягкое
/// удаление: запись остаётся в таблице, но исключается из обычных выборок.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct AuditFields {
    pub(crate) created: Option<DateTime<Utc>>,
    pub(crate) created_user: Option<String>,
    pub(crate) updated: Option<DateTime<Utc>>,
    pub(crate) updated_user: Option<String>,
    pub(crate) deleted: Option<DateTime<Utc>>,
    pub(crate) deleted_user: Option<String>,
}

impl AuditFields {
    pub(crate) fn stamp_create(&mut self, actor: &str, now: DateTime<Utc>) {
        self.created = Some(now);
        self.created_user = Some(actor.to_string());
        self.updated = Some(now);
        self.updated_user = Some(actor.to_string());
    }

    pub(crate) fn stamp_update(&mut self, actor: &str, now: DateTime<Utc>) {
        self.updated = Some(now);
        self.updated_user = Some(actor.to_string());
    }

    /// Повторный вызов ничего не меняет: сохраняется первое удаление.
    pub(crate) fn stamp_delete(&mut self, actor: &str, now: DateTime<Utc>) {
        if self.is_deleted() {
            return;
        }
        self.deleted = Some(now);
        self.deleted_user = Some(actor.to_string());
    }

    pub(crate) fn is_deleted(&self) -> bool {
        self.deleted.is_some()
    }
}
