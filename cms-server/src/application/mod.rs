pub(crate) mod comment_service;
pub(crate) mod post_service;

#[cfg(test)]
pub(crate) mod fakes;
