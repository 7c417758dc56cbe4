use crate::domain::error::FieldErrors;
use crate::domain::group::Group;
use crate::domain::pagination::Page;
use crate::domain::post::{Post, PostInput};
use crate::domain::user::User;

#[derive(Debug, Clone)]
pub(crate) enum ListingScope {
    All,
    Group(Group),
    Author(User),
}

/// One page of a post listing plus what the listing was filtered by.
#[derive(Debug, Clone)]
pub(crate) struct ListingPage {
    pub(crate) scope: ListingScope,
    pub(crate) page: Page<Post>,
}

#[derive(Debug, Clone)]
pub(crate) struct PostDetailPage {
    pub(crate) post: Post,
    pub(crate) author_post_count: i64,
}

/// Post form, either blank, pre-filled for editing, or re-presented with errors.
#[derive(Debug, Clone)]
pub(crate) struct PostFormPage {
    pub(crate) input: PostInput,
    pub(crate) groups: Vec<Group>,
    pub(crate) errors: FieldErrors,
    pub(crate) editing: Option<i64>,
}

impl PostFormPage {
    pub(crate) fn is_edit(&self) -> bool {
        self.editing.is_some()
    }

    pub(crate) fn selected_group(&self) -> Option<i64> {
        self.input.group_id().ok().flatten()
    }
}
