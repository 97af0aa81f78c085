//! Customer account commands.

use clap::Subcommand;
use sqlx::PgPool;
use vitrine_core::{auth::validate_registration, Argon2Hasher, CredentialHasher};

/// Sub-commands available under `users`.
#[derive(Debug, Subcommand)]
pub enum UsersCommands {
    /// Create an active customer account
    Create {
        #[arg(long)]
        email: String,
        /// Read from `VITRINE_USER_PASSWORD` when not given
        #[arg(long, env = "VITRINE_USER_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, default_value = "")]
        username: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
    },
}

pub(crate) async fn run(pool: &PgPool, command: UsersCommands) -> anyhow::Result<()> {
    match command {
        UsersCommands::Create {
            email,
            password,
            username,
            first_name,
            last_name,
        } => {
            let email = validate_registration(&email, &password)?;
            let password_hash =
                tokio::task::spawn_blocking(move || Argon2Hasher.hash(&password)).await??;

            let user = vitrine_db::create_user(
                pool,
                &vitrine_db::NewUser {
                    email,
                    username: username.trim().to_owned(),
                    password_hash,
                    first_name: first_name.trim().to_owned(),
                    last_name: last_name.trim().to_owned(),
                },
            )
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    anyhow::anyhow!("an account with that email already exists")
                } else {
                    anyhow::Error::from(e)
                }
            })?;

            tracing::info!(user_id = user.id, "account created");
            println!("created user {} <{}>", user.id, user.email);
        }
    }
    Ok(())
}
