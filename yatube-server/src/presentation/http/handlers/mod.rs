pub(crate) mod accounts;
pub(crate) mod auth;
pub(crate) mod groups;
pub(crate) mod pages;
pub(crate) mod posts;
