use serde::{Deserialize, Serialize};

/// Краткие сведения об авторе записи из таблицы `users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Author {
    pub(crate) id: i64,
    pub(crate) email: String,
}

impl Author {
    pub(crate) fn new(id: i64, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
        }
    }
}
