use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::http::handlers::auth::{AuthResponseDto, LoginDto, RegisterDto, UserDto};
use crate::presentation::http::handlers::groups::{CreateGroupDto, GroupDto};
use crate::presentation::http::handlers::posts::{
    GroupRefDto, PostDetailDto, PostDto, PostPageDto, PostPayloadDto,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::http::handlers::auth::register,
        crate::presentation::http::handlers::auth::login,
        crate::presentation::http::handlers::posts::list_posts,
        crate::presentation::http::handlers::posts::get_post,
        crate::presentation::http::handlers::posts::create_post,
        crate::presentation::http::handlers::posts::update_post,
        crate::presentation::http::handlers::posts::profile_posts,
        crate::presentation::http::handlers::groups::list_groups,
        crate::presentation::http::handlers::groups::create_group,
        crate::presentation::http::handlers::groups::delete_group,
        crate::presentation::http::handlers::groups::group_posts
    ),
    components(
        schemas(
            RegisterDto,
            LoginDto,
            AuthResponseDto,
            UserDto,
            PostPayloadDto,
            GroupRefDto,
            PostDto,
            PostDetailDto,
            PostPageDto,
            CreateGroupDto,
            GroupDto
        )
    ),
    tags(
        (name = "auth", description = "Registration and tokens"),
        (name = "posts", description = "Posts and author feeds"),
        (name = "groups", description = "Communities")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}
