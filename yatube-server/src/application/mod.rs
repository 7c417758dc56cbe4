pub(crate) mod auth_service;
pub(crate) mod group_service;
pub(crate) mod outcome;
pub(crate) mod pages;
pub(crate) mod post_service;
