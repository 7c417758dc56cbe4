use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::post_repository::{NewPost, PostFilter, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::pagination::PageWindow;
use crate::domain::post::{Author, GroupRef, Post};

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

struct PostRow {
    id: i64,
    text: String,
    pub_date: DateTime<Utc>,
    author_id: i64,
    author_username: String,
    group_id: Option<i64>,
    group_slug: Option<String>,
    group_title: Option<String>,
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let row = sqlx::query_as!(
            PostRow,
            r#"
            WITH inserted AS (
                INSERT INTO posts (text, author_id, group_id)
                VALUES ($1, $2, $3)
                RETURNING id, text, pub_date, author_id, group_id
            )
            SELECT
                p.id AS "id!",
                p.text AS "text!",
                p.pub_date AS "pub_date!",
                p.author_id AS "author_id!",
                u.username AS "author_username!",
                p.group_id AS "group_id?",
                g.slug AS "group_slug?",
                g.title AS "group_title?"
            FROM inserted p
            JOIN users u ON u.id = p.author_id
            LEFT JOIN blog_groups g ON g.id = p.group_id
            "#,
            input.text,
            input.author_id,
            input.group_id,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        map_row_to_post(row)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let row = sqlx::query_as!(
            PostRow,
            r#"
            SELECT
                p.id AS "id!",
                p.text AS "text!",
                p.pub_date AS "pub_date!",
                p.author_id AS "author_id!",
                u.username AS "author_username!",
                p.group_id AS "group_id?",
                g.slug AS "group_slug?",
                g.title AS "group_title?"
            FROM posts p
            JOIN users u ON u.id = p.author_id
            LEFT JOIN blog_groups g ON g.id = p.group_id
            WHERE p.id = $1
            "#,
            id,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        // pub_date не трогаем: дата публикации неизменна
        let row = sqlx::query_as!(
            PostRow,
            r#"
            WITH updated AS (
                UPDATE posts
                SET text = $3,
                    group_id = $4
                WHERE id = $1 AND author_id = $2
                RETURNING id, text, pub_date, author_id, group_id
            )
            SELECT
                p.id AS "id!",
                p.text AS "text!",
                p.pub_date AS "pub_date!",
                p.author_id AS "author_id!",
                u.username AS "author_username!",
                p.group_id AS "group_id?",
                g.slug AS "group_slug?",
                g.title AS "group_title?"
            FROM updated p
            JOIN users u ON u.id = p.author_id
            LEFT JOIN blog_groups g ON g.id = p.group_id
            "#,
            post_id,
            owner_id,
            patch.text,
            patch.group_id,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        window: PageWindow,
    ) -> Result<Vec<Post>, DomainError> {
        let (group_id, author_id) = filter_binds(filter);

        let rows = sqlx::query_as!(
            PostRow,
            r#"
            SELECT
                p.id AS "id!",
                p.text AS "text!",
                p.pub_date AS "pub_date!",
                p.author_id AS "author_id!",
                u.username AS "author_username!",
                p.group_id AS "group_id?",
                g.slug AS "group_slug?",
                g.title AS "group_title?"
            FROM posts p
            JOIN users u ON u.id = p.author_id
            LEFT JOIN blog_groups g ON g.id = p.group_id
            WHERE ($1::BIGINT IS NULL OR p.group_id = $1)
              AND ($2::BIGINT IS NULL OR p.author_id = $2)
            ORDER BY p.pub_date DESC, p.id DESC
            LIMIT $3
            OFFSET $4
            "#,
            group_id,
            author_id,
            window.limit,
            window.offset,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        rows.into_iter().map(map_row_to_post).collect()
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<i64, DomainError> {
        let (group_id, author_id) = filter_binds(filter);

        let row = sqlx::query!(
            r#"
            SELECT COUNT(*) AS "count!"
            FROM posts p
            WHERE ($1::BIGINT IS NULL OR p.group_id = $1)
              AND ($2::BIGINT IS NULL OR p.author_id = $2)
            "#,
            group_id,
            author_id,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(row.count)
    }
}

fn filter_binds(filter: PostFilter) -> (Option<i64>, Option<i64>) {
    match filter {
        PostFilter::All => (None, None),
        PostFilter::Group(group_id) => (Some(group_id), None),
        PostFilter::Author(author_id) => (None, Some(author_id)),
    }
}

fn map_row_to_post(row: PostRow) -> Result<Post, DomainError> {
    let group = match (row.group_id, row.group_slug, row.group_title) {
        (Some(id), Some(slug), Some(title)) => Some(GroupRef { id, slug, title }),
        _ => None,
    };
    let author = Author {
        id: row.author_id,
        username: row.author_username,
    };

    Post::new(row.id, row.text, row.pub_date, author, group)
        .map_err(|err| DomainError::Unexpected(err.to_string()))
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        let resource = match db_err.constraint() {
            Some("posts_group_id_fkey") => "group",
            _ => "author",
        };
        return DomainError::NotFound(resource.to_string());
    }
    DomainError::Unexpected(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(group_id: Option<i64>, group_slug: Option<&str>) -> PostRow {
        PostRow {
            id: 7,
            text: "Текст".to_string(),
            pub_date: Utc::now(),
            author_id: 3,
            author_username: "leo".to_string(),
            group_id,
            group_slug: group_slug.map(str::to_string),
            group_title: group_slug.map(|slug| format!("Группа {slug}")),
        }
    }

    #[test]
    fn left_joined_group_columns_map_to_group_ref() {
        let post = map_row_to_post(row(Some(2), Some("cats"))).expect("valid row");

        assert_eq!(post.author.username, "leo");
        assert_eq!(
            post.group,
            Some(GroupRef {
                id: 2,
                slug: "cats".to_string(),
                title: "Группа cats".to_string(),
            })
        );
    }

    #[test]
    fn null_group_columns_leave_post_without_group() {
        let post = map_row_to_post(row(None, None)).expect("valid row");
        assert_eq!(post.group, None);
        assert_eq!(post.group_id(), None);
    }

    #[test]
    fn filter_binds_one_nullable_parameter_per_scope() {
        assert_eq!(filter_binds(PostFilter::All), (None, None));
        assert_eq!(filter_binds(PostFilter::Group(4)), (Some(4), None));
        assert_eq!(filter_binds(PostFilter::Author(9)), (None, Some(9)));
    }

    #[test]
    fn non_database_errors_map_to_unexpected() {
        let err = map_post_db_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, DomainError::Unexpected(_)));
    }
}
