use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::db::{PageRequest, PageSlice, contains_pattern, now_timestamp};
use crate::domain::Role;
use crate::entities::{prelude::*, users};

/// Fields for a new account.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub confirmation_code: Option<String>,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    /// `Some(None)` clears the field.
    pub first_name: Option<Option<String>>,
    pub last_name: Option<Option<String>>,
    pub bio: Option<Option<String>>,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<users::Model>> {
        Users::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<users::Model>> {
        Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")
    }

    /// Any user holding `username` or `email`.
    pub async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Vec<users::Model>> {
        Users::find()
            .filter(
                Condition::any()
                    .add(users::Column::Username.eq(username))
                    .add(users::Column::Email.eq(email)),
            )
            .all(&self.conn)
            .await
            .context("Failed to query users by username or email")
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<PageSlice<users::Model>> {
        let mut query = Users::find().order_by_asc(users::Column::Username);

        if let Some(term) = search {
            query = query.filter(users::Column::Username.like(contains_pattern(term)));
        }

        let paginator = query.paginate(&self.conn, page.page_size);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.index()).await?;

        Ok(PageSlice { items, total })
    }

    pub async fn create(&self, user: NewUser) -> Result<users::Model> {
        let now = now_timestamp();

        let active = users::ActiveModel {
            username: Set(user.username),
            email: Set(user.email),
            role: Set(user.role),
            first_name: Set(user.first_name),
            last_name: Set(user.last_name),
            bio: Set(user.bio),
            confirmation_code: Set(user.confirmation_code),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        active
            .insert(&self.conn)
            .await
            .context("Failed to insert user")
    }

    pub async fn update(&self, user: users::Model, changes: UserChanges) -> Result<users::Model> {
        let mut active: users::ActiveModel = user.into();

        if let Some(username) = changes.username {
            active.username = Set(username);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(role) = changes.role {
            active.role = Set(role);
        }
        if let Some(first_name) = changes.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = changes.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(bio) = changes.bio {
            active.bio = Set(bio);
        }
        active.updated_at = Set(now_timestamp());

        active
            .update(&self.conn)
            .await
            .context("Failed to update user")
    }

    /// Stores a freshly issued confirmation code, replacing any previous one.
    pub async fn set_confirmation_code(&self, user: users::Model, code: &str) -> Result<()> {
        let mut active: users::ActiveModel = user.into();
        active.confirmation_code = Set(Some(code.to_string()));
        active.updated_at = Set(now_timestamp());
        active
            .update(&self.conn)
            .await
            .context("Failed to store confirmation code")?;
        Ok(())
    }

    /// Deletes the account; reviews and comments go with it.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Users::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete user")?;
        Ok(result.rows_affected > 0)
    }
}
