use tracing::{info, warn};

use crate::application::outcome::{Outcome, post_path, profile_path};
use crate::application::pages::{ListingPage, ListingScope, PostDetailPage, PostFormPage};
use crate::data::group_repository::GroupRepository;
use crate::data::post_repository::{NewPost, PostFilter, PostPatch, PostRepository};
use crate::data::user_repository::UserRepository;
use crate::domain::error::{DomainError, FieldErrors};
use crate::domain::pagination::{POSTS_PER_PAGE, Page, Paginator};
use crate::domain::post::{INVALID_CHOICE, Post, PostDraft, PostInput};
use crate::domain::user::{Caller, Identity};

enum Cleaned {
    Valid(PostDraft),
    Invalid(FieldErrors),
}

pub(crate) struct PostService<P, G, U> {
    posts: P,
    groups: G,
    users: U,
}

impl<P, G, U> PostService<P, G, U>
where
    P: PostRepository,
    G: GroupRepository,
    U: UserRepository,
{
    pub(crate) fn new(posts: P, groups: G, users: U) -> Self {
        Self {
            posts,
            groups,
            users,
        }
    }

    pub(crate) async fn index(
        &self,
        page: Option<&str>,
    ) -> Result<Outcome<ListingPage>, DomainError> {
        let page = self.paginate(PostFilter::All, page).await?;
        Ok(Outcome::Rendered(ListingPage {
            scope: ListingScope::All,
            page,
        }))
    }

    pub(crate) async fn group_posts(
        &self,
        slug: &str,
        page: Option<&str>,
    ) -> Result<Outcome<ListingPage>, DomainError> {
        let Some(group) = self.groups.find_by_slug(slug).await? else {
            return Ok(Outcome::NotFound);
        };

        let page = self.paginate(PostFilter::Group(group.id), page).await?;
        Ok(Outcome::Rendered(ListingPage {
            scope: ListingScope::Group(group),
            page,
        }))
    }

    pub(crate) async fn profile(
        &self,
        username: &str,
        page: Option<&str>,
    ) -> Result<Outcome<ListingPage>, DomainError> {
        let Some(author) = self.users.find_user(username).await? else {
            return Ok(Outcome::NotFound);
        };

        let page = self.paginate(PostFilter::Author(author.id), page).await?;
        Ok(Outcome::Rendered(ListingPage {
            scope: ListingScope::Author(author),
            page,
        }))
    }

    pub(crate) async fn post_detail(
        &self,
        post_id: i64,
    ) -> Result<Outcome<PostDetailPage>, DomainError> {
        let Some(post) = self.posts.get_post(post_id).await? else {
            return Ok(Outcome::NotFound);
        };

        let author_post_count = self
            .posts
            .count_posts(PostFilter::Author(post.author.id))
            .await?;
        Ok(Outcome::Rendered(PostDetailPage {
            post,
            author_post_count,
        }))
    }

    /// `full_path` is the requested path with its query string, used as the
    /// login `next` for anonymous callers.
    pub(crate) async fn create_form(
        &self,
        caller: &Caller,
        full_path: &str,
    ) -> Result<Outcome<PostFormPage>, DomainError> {
        if caller.identity().is_none() {
            return Ok(Outcome::login_required(full_path));
        }

        let form = self
            .form_page(PostInput::default(), FieldErrors::default(), None)
            .await?;
        Ok(Outcome::Rendered(form))
    }

    pub(crate) async fn create_post(
        &self,
        caller: &Caller,
        full_path: &str,
        input: PostInput,
    ) -> Result<Outcome<PostFormPage>, DomainError> {
        let Some(identity) = caller.identity() else {
            return Ok(Outcome::login_required(full_path));
        };

        let draft = match self.clean(&input).await? {
            Cleaned::Valid(draft) => draft,
            Cleaned::Invalid(errors) => {
                let form = self.form_page(input, errors, None).await?;
                return Ok(Outcome::ValidationFailed(form));
            }
        };

        let new_post = NewPost {
            text: draft.text,
            author_id: identity.user_id,
            group_id: draft.group_id,
        };
        match self.posts.create_post(new_post).await {
            Ok(post) => {
                info!(post_id = post.id, author = %identity.username, "post created");
                Ok(Outcome::RedirectTo(profile_path(&identity.username)))
            }
            // группу удалили между проверкой и вставкой
            Err(DomainError::NotFound(resource)) if resource == "group" => {
                let form = self.form_page(input, group_choice_error(), None).await?;
                Ok(Outcome::ValidationFailed(form))
            }
            Err(err) => Err(err),
        }
    }

    pub(crate) async fn edit_form(
        &self,
        caller: &Caller,
        full_path: &str,
        post_id: i64,
    ) -> Result<Outcome<PostFormPage>, DomainError> {
        let Some(identity) = caller.identity() else {
            return Ok(Outcome::login_required(full_path));
        };
        let Some(post) = self.posts.get_post(post_id).await? else {
            return Ok(Outcome::NotFound);
        };
        if !post.is_authored_by(identity.user_id) {
            return Ok(Outcome::RedirectTo(post_path(post.id)));
        }

        let form = self
            .form_page(PostInput::from_post(&post), FieldErrors::default(), Some(post.id))
            .await?;
        Ok(Outcome::Rendered(form))
    }

    /// Non-authors are sent back to the post without any change being applied.
    pub(crate) async fn edit_post(
        &self,
        caller: &Caller,
        full_path: &str,
        post_id: i64,
        input: PostInput,
    ) -> Result<Outcome<PostFormPage>, DomainError> {
        let Some(identity) = caller.identity() else {
            return Ok(Outcome::login_required(full_path));
        };
        let Some(post) = self.posts.get_post(post_id).await? else {
            return Ok(Outcome::NotFound);
        };
        if !post.is_authored_by(identity.user_id) {
            warn!(post_id, user = %identity.username, "edit attempt by non-author ignored");
            return Ok(Outcome::RedirectTo(post_path(post.id)));
        }

        let draft = match self.clean(&input).await? {
            Cleaned::Valid(draft) => draft,
            Cleaned::Invalid(errors) => {
                let form = self.form_page(input, errors, Some(post.id)).await?;
                return Ok(Outcome::ValidationFailed(form));
            }
        };

        let patch = PostPatch {
            text: draft.text,
            group_id: draft.group_id,
        };
        match self
            .posts
            .update_post_owned(post.id, identity.user_id, patch)
            .await
        {
            Ok(Some(updated)) => {
                info!(post_id = updated.id, author = %identity.username, "post edited");
                Ok(Outcome::RedirectTo(post_path(updated.id)))
            }
            Ok(None) => Ok(Outcome::NotFound),
            Err(DomainError::NotFound(resource)) if resource == "group" => {
                let form = self
                    .form_page(input, group_choice_error(), Some(post.id))
                    .await?;
                Ok(Outcome::ValidationFailed(form))
            }
            Err(err) => Err(err),
        }
    }

    /// Creates a post on behalf of `author`; validation problems become
    /// `DomainError::Validation`.
    pub(crate) async fn publish(
        &self,
        author: &Identity,
        input: PostInput,
    ) -> Result<Post, DomainError> {
        let draft = match self.clean(&input).await? {
            Cleaned::Valid(draft) => draft,
            Cleaned::Invalid(errors) => return Err(errors.into()),
        };

        let post = self
            .posts
            .create_post(NewPost {
                text: draft.text,
                author_id: author.user_id,
                group_id: draft.group_id,
            })
            .await?;
        info!(post_id = post.id, author = %author.username, "post created");
        Ok(post)
    }

    /// Unlike the page flow, editing someone else's post is reported as
    /// `DomainError::Forbidden`.
    pub(crate) async fn revise(
        &self,
        author: &Identity,
        post_id: i64,
        input: PostInput,
    ) -> Result<Post, DomainError> {
        let post = self
            .posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))?;
        if !post.is_authored_by(author.user_id) {
            return Err(DomainError::Forbidden);
        }

        let draft = match self.clean(&input).await? {
            Cleaned::Valid(draft) => draft,
            Cleaned::Invalid(errors) => return Err(errors.into()),
        };

        let patch = PostPatch {
            text: draft.text,
            group_id: draft.group_id,
        };
        let updated = self
            .posts
            .update_post_owned(post_id, author.user_id, patch)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))?;
        info!(post_id, author = %author.username, "post edited");
        Ok(updated)
    }

    async fn clean(&self, input: &PostInput) -> Result<Cleaned, DomainError> {
        let draft = match input.validate() {
            Ok(draft) => draft,
            Err(errors) => return Ok(Cleaned::Invalid(errors)),
        };

        if let Some(group_id) = draft.group_id
            && self.groups.find_by_id(group_id).await?.is_none()
        {
            return Ok(Cleaned::Invalid(group_choice_error()));
        }
        Ok(Cleaned::Valid(draft))
    }

    async fn paginate(
        &self,
        filter: PostFilter,
        raw_page: Option<&str>,
    ) -> Result<Page<Post>, DomainError> {
        let total = self.posts.count_posts(filter).await?;
        let paginator = Paginator::new(total, POSTS_PER_PAGE);
        let number = paginator.resolve(raw_page);
        let items = self
            .posts
            .list_posts(filter, paginator.window(number))
            .await?;

        Ok(paginator.page(number, items))
    }

    async fn form_page(
        &self,
        input: PostInput,
        errors: FieldErrors,
        editing: Option<i64>,
    ) -> Result<PostFormPage, DomainError> {
        let groups = self.groups.list_groups().await?;
        Ok(PostFormPage {
            input,
            groups,
            errors,
            editing,
        })
    }
}

fn group_choice_error() -> FieldErrors {
    let mut errors = FieldErrors::default();
    errors.push("group", INVALID_CHOICE);
    errors
}
