use std::sync::Arc;

use crate::application::auth_service::AuthService;
use crate::application::group_service::GroupService;
use crate::application::post_service::PostService;
use crate::data::group_repository::DynGroupRepository;
use crate::data::post_repository::DynPostRepository;
use crate::data::user_repository::DynUserRepository;
use crate::infrastructure::jwt::JwtService;

pub(crate) mod http;

pub(crate) type AppPostService =
    PostService<DynPostRepository, DynGroupRepository, DynUserRepository>;
pub(crate) type AppGroupService = GroupService<DynGroupRepository>;
pub(crate) type AppAuthService = AuthService<DynUserRepository>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) auth_service: Arc<AppAuthService>,
    pub(crate) post_service: Arc<AppPostService>,
    pub(crate) group_service: Arc<AppGroupService>,
    pub(crate) secure_cookies: bool,
}

impl AppState {
    pub(crate) fn new(
        posts: DynPostRepository,
        groups: DynGroupRepository,
        users: DynUserRepository,
        jwt: JwtService,
        staff_usernames: Vec<String>,
        secure_cookies: bool,
    ) -> Self {
        Self {
            auth_service: Arc::new(AuthService::new(users.clone(), jwt)),
            post_service: Arc::new(PostService::new(posts, groups.clone(), users)),
            group_service: Arc::new(GroupService::new(groups, staff_usernames)),
            secure_cookies,
        }
    }
}
