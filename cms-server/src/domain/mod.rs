pub(crate) mod audit;
pub(crate) mod author;
pub(crate) mod comment;
pub(crate) mod error;
pub(crate) mod policy;
pub(crate) mod post;
pub(crate) mod principal;
