use serde::{Deserialize, Serialize};

/// Аутентифицированный пользователь, от имени которого выполняется запрос.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Principal {
    pub(crate) id: i64,
    pub(crate) email: String,
    pub(crate) is_admin: bool,
}

impl Principal {
    pub(crate) fn new(id: i64, email: impl Into<String>, is_admin: bool) -> Self {
        Self {
            id,
            email: email.into(),
            is_admin,
        }
    }
}
