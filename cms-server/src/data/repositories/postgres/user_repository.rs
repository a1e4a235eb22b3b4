use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::data::user_repository::{
    AccountPatch, NewUser, UserAccount, UserCredentials, UserRepository,
};
use crate::domain::error::DomainError;
use crate::domain::profile::{Profile, RequestTransition};
use crate::domain::user::User;

#[derive(Debug, Clone)]
pub(crate) struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const ACCOUNT_COLUMNS: &str = r#"
    u.id,
    u.username,
    u.email,
    u.is_staff,
    u.first_name,
    u.last_name,
    u.created_at,
    p.role,
    p.author_request_pending,
    p.bio,
    p.website,
    p.created_at AS profile_created_at,
    p.updated_at AS profile_updated_at
"#;

#[derive(FromRow)]
struct AccountRow {
    id: i64,
    username: String,
    email: String,
    is_staff: bool,
    first_name: String,
    last_name: String,
    created_at: DateTime<Utc>,
    role: String,
    author_request_pending: bool,
    bio: String,
    website: String,
    profile_created_at: DateTime<Utc>,
    profile_updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct UserCredentialsRow {
    id: i64,
    username: String,
    email: String,
    is_staff: bool,
    first_name: String,
    last_name: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct ProfileRow {
    user_id: i64,
    role: String,
    author_request_pending: bool,
    bio: String,
    website: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create_user(&self, input: NewUser) -> Result<UserAccount, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_user_db_error)?;

        let user_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (username, email, password_hash, is_staff, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&input.username)
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(input.is_staff)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_user_db_error)?;

        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, role)
            VALUES ($1, $2)
            "#,
        )
        .bind(user_id)
        .bind(input.role.as_str())
        .execute(&mut *tx)
        .await
        .map_err(map_user_db_error)?;

        tx.commit().await.map_err(map_user_db_error)?;

        self.find_account(user_id)
            .await?
            .ok_or_else(|| DomainError::Unexpected(format!("user {user_id} vanished after insert")))
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, DomainError> {
        let row = sqlx::query_as::<_, UserCredentialsRow>(
            r#"
            SELECT
            id,
            username,
            email,
            is_staff,
            first_name,
            last_name,
            password_hash,
            created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        row.map(map_row_to_credentials).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, DomainError> {
        let row = sqlx::query_as::<_, UserCredentialsRow>(
            r#"
            SELECT
            id,
            username,
            email,
            is_staff,
            first_name,
            last_name,
            password_hash,
            created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        row.map(map_row_to_credentials).transpose()
    }

    async fn find_account(&self, user_id: i64) -> Result<Option<UserAccount>, DomainError> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM users u JOIN profiles p ON p.user_id = u.id WHERE u.id = $1"
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_user_db_error)?;

        row.map(map_row_to_account).transpose()
    }

    async fn update_account(
        &self,
        user_id: i64,
        patch: AccountPatch,
    ) -> Result<Option<UserAccount>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_user_db_error)?;

        let updated = sqlx::query(
            r#"
            UPDATE users
            SET email = $2,
                first_name = $3,
                last_name = $4
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(&patch.email)
        .bind(&patch.first_name)
        .bind(&patch.last_name)
        .execute(&mut *tx)
        .await
        .map_err(map_user_db_error)?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        sqlx::query(
            r#"
            UPDATE profiles
            SET bio = $2,
                website = $3,
                updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(&patch.bio)
        .bind(&patch.website)
        .execute(&mut *tx)
        .await
        .map_err(map_user_db_error)?;

        tx.commit().await.map_err(map_user_db_error)?;
        self.find_account(user_id).await
    }

    async fn transition_author_request(
        &self,
        user_id: i64,
        transition: RequestTransition,
    ) -> Result<bool, DomainError> {
        // Guards mirror the `Profile` transition rules.
        let sql = match transition {
            RequestTransition::Request => {
                r#"
                UPDATE profiles
                SET author_request_pending = TRUE,
                    updated_at = NOW()
                WHERE user_id = $1
                  AND role = 'reader'
                  AND NOT author_request_pending
                "#
            }
            RequestTransition::Approve => {
                r#"
                UPDATE profiles
                SET role = 'author',
                    author_request_pending = FALSE,
                    updated_at = NOW()
                WHERE user_id = $1
                  AND role = 'reader'
                  AND author_request_pending
                "#
            }
            RequestTransition::Reject => {
                r#"
                UPDATE profiles
                SET author_request_pending = FALSE,
                    updated_at = NOW()
                WHERE user_id = $1
                  AND author_request_pending
                "#
            }
        };

        let result = sqlx::query(sql)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(map_user_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_profiles(&self, user_ids: &[i64]) -> Result<Vec<Profile>, DomainError> {
        let rows = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT
                user_id,
                role,
                author_request_pending,
                bio,
                website,
                created_at,
                updated_at
            FROM profiles
            WHERE user_id = ANY($1)
            ORDER BY user_id
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        rows.into_iter().map(map_row_to_profile).collect()
    }

    async fn list_pending_requests(&self) -> Result<Vec<UserAccount>, DomainError> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM users u JOIN profiles p ON p.user_id = u.id \
             WHERE p.author_request_pending ORDER BY p.updated_at, u.id"
        );
        let rows = sqlx::query_as::<_, AccountRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_user_db_error)?;

        rows.into_iter().map(map_row_to_account).collect()
    }
}

fn map_row_to_credentials(row: UserCredentialsRow) -> Result<UserCredentials, DomainError> {
    let user = User::new(row.id, row.username, row.email, row.is_staff, row.created_at)
        .map_err(|err| DomainError::Unexpected(err.to_string()))?
        .with_names(row.first_name, row.last_name);
    Ok(UserCredentials {
        user,
        password_hash: row.password_hash,
    })
}

fn map_row_to_account(row: AccountRow) -> Result<UserAccount, DomainError> {
    let user = User::new(row.id, row.username, row.email, row.is_staff, row.created_at)
        .map_err(|err| DomainError::Unexpected(err.to_string()))?
        .with_names(row.first_name, row.last_name);
    let profile = map_row_to_profile(ProfileRow {
        user_id: row.id,
        role: row.role,
        author_request_pending: row.author_request_pending,
        bio: row.bio,
        website: row.website,
        created_at: row.profile_created_at,
        updated_at: row.profile_updated_at,
    })?;
    Ok(UserAccount { user, profile })
}

fn map_row_to_profile(row: ProfileRow) -> Result<Profile, DomainError> {
    Ok(Profile {
        user_id: row.user_id,
        role: row.role.parse()?,
        author_request_pending: row.author_request_pending,
        bio: row.bio,
        website: row.website,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn map_user_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23505")
    {
        return match db_err.constraint() {
            Some("users_email_key") => DomainError::Validation {
                field: "email",
                message: "is already registered",
            },
            Some("users_username_key") => DomainError::AlreadyExists("username".to_string()),
            _ => DomainError::AlreadyExists("user".to_string()),
        };
    }
    DomainError::Unexpected(err.to_string())
}
