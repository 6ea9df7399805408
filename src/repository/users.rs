//! Users repository for database operations

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::User,
};

const USER_SELECT: &str =
    "SELECT id, username, email, password, avatar, bio, role, enabled, created_at FROM users";

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let query = format!("{} WHERE username = $1", USER_SELECT);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<User> {
        let query = format!("{} WHERE id = $1", USER_SELECT);
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    pub async fn username_exists(&self, username: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    pub async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Insert a new account inside the registration transaction
    pub async fn create_tx(
        &self,
        conn: &mut PgConnection,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password, avatar, bio, role, enabled, created_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&mut *conn)
        .await?;

        Ok(user)
    }

    /// Update the editable profile fields. Avatar is only touched when a
    /// new file was uploaded.
    pub async fn update_profile(
        &self,
        id: i64,
        bio: Option<&str>,
        avatar: Option<&str>,
    ) -> AppResult<User> {
        let user = if let Some(avatar) = avatar {
            sqlx::query_as::<_, User>(
                r#"
                UPDATE users SET bio = $1, avatar = $2 WHERE id = $3
                RETURNING id, username, email, password, avatar, bio, role, enabled, created_at
                "#,
            )
            .bind(bio)
            .bind(avatar)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, User>(
                r#"
                UPDATE users SET bio = $1 WHERE id = $2
                RETURNING id, username, email, password, avatar, bio, role, enabled, created_at
                "#,
            )
            .bind(bio)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        };

        user.ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Flip the enabled flag, returning the new value
    pub async fn toggle_enabled(&self, id: i64) -> AppResult<bool> {
        sqlx::query_scalar("UPDATE users SET enabled = NOT enabled WHERE id = $1 RETURNING enabled")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    pub async fn delete_tx(&self, conn: &mut PgConnection, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }
        Ok(())
    }

    pub async fn list_all(&self) -> AppResult<Vec<User>> {
        let query = format!("{} ORDER BY id", USER_SELECT);
        let users = sqlx::query_as::<_, User>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }
}
