//! `SeaORM` implementation of the `UserService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::api::types::{CreateUserRequest, UpdateUserRequest, UserDto};
use crate::db::{NewUser, PageRequest, PageSlice, Store, UserChanges};
use crate::domain::{Principal, validate};
use crate::entities::users;
use crate::services::user_service::{UserError, UserService};

pub struct SeaOrmUserService {
    store: Store,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    async fn find(&self, username: &str) -> Result<users::Model, UserError> {
        self.store
            .users()
            .get_by_username(username)
            .await?
            .ok_or_else(|| UserError::NotFound(username.to_string()))
    }

    async fn apply(
        &self,
        user: users::Model,
        request: UpdateUserRequest,
    ) -> Result<UserDto, UserError> {
        validate_update(&request)?;

        let updated = self
            .store
            .users()
            .update(
                user,
                UserChanges {
                    username: request.username,
                    email: request.email,
                    role: request.role,
                    first_name: request.first_name,
                    last_name: request.last_name,
                    bio: request.bio,
                },
            )
            .await?;

        Ok(to_dto(updated))
    }
}

fn to_dto(user: users::Model) -> UserDto {
    UserDto {
        username: user.username,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        bio: user.bio,
        role: user.role,
    }
}

fn validate_update(request: &UpdateUserRequest) -> Result<(), UserError> {
    if let Some(username) = &request.username {
        validate::validate_username(username)?;
    }
    if let Some(email) = &request.email {
        validate::validate_email(email)?;
    }
    if let Some(Some(first_name)) = &request.first_name {
        validate::validate_person_name("first_name", first_name)?;
    }
    if let Some(Some(last_name)) = &request.last_name {
        validate::validate_person_name("last_name", last_name)?;
    }
    Ok(())
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<PageSlice<UserDto>, UserError> {
        let slice = self.store.users().list(search, page).await?;
        Ok(slice.map(to_dto))
    }

    async fn create(&self, request: CreateUserRequest) -> Result<UserDto, UserError> {
        validate::validate_username(&request.username)?;
        validate::validate_email(&request.email)?;
        if let Some(first_name) = &request.first_name {
            validate::validate_person_name("first_name", first_name)?;
        }
        if let Some(last_name) = &request.last_name {
            validate::validate_person_name("last_name", last_name)?;
        }

        let user = self
            .store
            .users()
            .create(NewUser {
                username: request.username,
                email: request.email,
                role: request.role.unwrap_or_default(),
                first_name: request.first_name,
                last_name: request.last_name,
                bio: request.bio,
                confirmation_code: None,
            })
            .await?;

        info!(username = %user.username, role = %user.role, "User created");
        Ok(to_dto(user))
    }

    async fn get(&self, username: &str) -> Result<UserDto, UserError> {
        self.find(username).await.map(to_dto)
    }

    async fn update(
        &self,
        username: &str,
        request: UpdateUserRequest,
    ) -> Result<UserDto, UserError> {
        let user = self.find(username).await?;
        self.apply(user, request).await
    }

    async fn delete(&self, username: &str) -> Result<(), UserError> {
        let user = self.find(username).await?;
        self.store.users().delete(user.id).await?;
        info!(username = %username, "User deleted");
        Ok(())
    }

    async fn get_me(&self, caller: &Principal) -> Result<UserDto, UserError> {
        self.store
            .users()
            .get_by_id(caller.id)
            .await?
            .map(to_dto)
            .ok_or_else(|| UserError::NotFound(caller.username.clone()))
    }

    async fn update_me(
        &self,
        caller: &Principal,
        mut request: UpdateUserRequest,
    ) -> Result<UserDto, UserError> {
        let user = self
            .store
            .users()
            .get_by_id(caller.id)
            .await?
            .ok_or_else(|| UserError::NotFound(caller.username.clone()))?;

        request.role = Some(user.role);
        self.apply(user, request).await
    }
}
