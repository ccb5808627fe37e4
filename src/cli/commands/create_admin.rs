//! Create admin command handler

use anyhow::bail;
use uuid::Uuid;

use crate::config::Config;
use crate::db::{NewUser, Store, UserChanges};
use crate::domain::{Role, validate};

/// Creates `username` as an admin, or promotes the existing account with the
/// same username and email. Prints a fresh confirmation code either way.
pub async fn cmd_create_admin(config: &Config, username: &str, email: &str) -> anyhow::Result<()> {
    config.validate()?;
    validate::validate_username(username)?;
    validate::validate_email(email)?;

    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;
    let users = store.users();
    let code = Uuid::new_v4().to_string();

    match users.get_by_username(username).await? {
        Some(user) if user.email != email => {
            bail!("User '{username}' exists with a different email address");
        }
        Some(user) => {
            let user = users
                .update(
                    user,
                    UserChanges {
                        role: Some(Role::Admin),
                        ..UserChanges::default()
                    },
                )
                .await?;
            users.set_confirmation_code(user, &code).await?;
            println!("✓ Promoted '{username}' to admin");
        }
        None => {
            users
                .create(NewUser {
                    username: username.to_string(),
                    email: email.to_string(),
                    role: Role::Admin,
                    confirmation_code: Some(code.clone()),
                    ..NewUser::default()
                })
                .await?;
            println!("✓ Created admin '{username}'");
        }
    }

    println!("Confirmation code: {code}");
    println!("Exchange it for a token with POST /api/v1/auth/token");
    Ok(())
}
