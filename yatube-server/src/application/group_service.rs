use std::collections::HashSet;

use tracing::info;

use crate::data::group_repository::{GroupRepository, NewGroup};
use crate::domain::error::DomainError;
use crate::domain::group::{CreateGroupRequest, Group};
use crate::domain::user::Identity;

/// Group administration. Creating and deleting groups is reserved for staff.
pub(crate) struct GroupService<G: GroupRepository> {
    repo: G,
    staff: HashSet<String>,
}

impl<G: GroupRepository> GroupService<G> {
    pub(crate) fn new(repo: G, staff: impl IntoIterator<Item = String>) -> Self {
        Self {
            repo,
            staff: staff.into_iter().collect(),
        }
    }

    pub(crate) fn is_staff(&self, identity: &Identity) -> bool {
        self.staff.contains(&identity.username)
    }

    pub(crate) async fn list_groups(&self) -> Result<Vec<Group>, DomainError> {
        self.repo.list_groups().await
    }

    pub(crate) async fn create_group(
        &self,
        actor: &Identity,
        req: CreateGroupRequest,
    ) -> Result<Group, DomainError> {
        self.ensure_staff(actor)?;
        let req = req.validate()?;
        let slug = req
            .slug
            .ok_or_else(|| DomainError::Unexpected("slug missing after validation".to_string()))?;

        let group = self
            .repo
            .create_group(NewGroup {
                title: req.title,
                slug,
                description: req.description,
            })
            .await?;
        info!(group = %group.slug, by = %actor.username, "group created");
        Ok(group)
    }

    /// Posts of the deleted group stay, just without a group.
    pub(crate) async fn delete_group(&self, actor: &Identity, slug: &str) -> Result<(), DomainError> {
        self.ensure_staff(actor)?;

        if !self.repo.delete_by_slug(slug).await? {
            return Err(DomainError::NotFound(format!("group slug: {slug}")));
        }
        info!(group = %slug, by = %actor.username, "group deleted");
        Ok(())
    }

    fn ensure_staff(&self, actor: &Identity) -> Result<(), DomainError> {
        if self.is_staff(actor) {
            Ok(())
        } else {
            Err(DomainError::Forbidden)
        }
    }
}
