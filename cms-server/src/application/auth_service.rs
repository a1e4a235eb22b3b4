use std::sync::Arc;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};
use tracing::info;

use crate::data::activity_repository::ActivityRepository;
use crate::data::user_repository::{NewUser, UserAccount, UserCredentials, UserRepository};
use crate::domain::activity::{ActivityKind, ClientInfo, NewActivity};
use crate::domain::authz::Actor;
use crate::domain::error::DomainError;
use crate::domain::profile::Role;
use crate::domain::user::{LoginRequest, RegisterRequest, normalize_email};
use crate::infrastructure::jwt::JwtService;

#[derive(Debug, Clone)]
pub(crate) struct AuthResult {
    pub(crate) account: UserAccount,
    pub(crate) access_token: String,
}

pub(crate) struct AuthService<U: UserRepository, A: ActivityRepository> {
    users: U,
    activity: A,
    jwt: Arc<JwtService>,
    staff_usernames: Vec<String>,
}

impl<U: UserRepository, A: ActivityRepository> AuthService<U, A> {
    const DUMMY_PASSWORD_HASH: &'static str = "$argon2id$v=19$m=19456,t=2,p=1$MDEyMzQ1Njc4OWFiY2RlZg$gwN6hT1sNdk9kI95f7n2Gl3fL0qRmBf2Ffkj2r90/0M";

    pub(crate) fn new(
        users: U,
        activity: A,
        jwt: Arc<JwtService>,
        staff_usernames: Vec<String>,
    ) -> Self {
        Self {
            users,
            activity,
            jwt,
            staff_usernames,
        }
    }

    /// Creates the user together with a reader profile. Usernames listed as
    /// staff are bootstrapped as admins.
    pub(crate) async fn register(&self, req: RegisterRequest) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;

        let password_hash = self.hash_password(&req.password)?;
        let is_staff = self.staff_usernames.iter().any(|name| *name == req.username);

        let new_user = Self::into_new_user(req, password_hash, is_staff);
        let account = self.users.create_user(new_user).await?;
        if is_staff {
            info!(user_id = account.user.id, "registered staff account");
        }

        let access_token = self.issue_token(&account)?;
        Ok(AuthResult {
            account,
            access_token,
        })
    }

    /// Accepts either a username or an e-mail address as the login.
    pub(crate) async fn login(
        &self,
        req: LoginRequest,
        client: &ClientInfo,
    ) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;

        let Some(user_creds) = self.find_credentials(&req).await? else {
            // keep the timing close to the known-user path
            match self.verify_password(&req.password, Self::DUMMY_PASSWORD_HASH) {
                Ok(()) | Err(DomainError::InvalidCredentials) => {}
                Err(err) => return Err(err),
            }
            return Err(DomainError::InvalidCredentials);
        };

        self.verify_password(&req.password, &user_creds.password_hash)?;

        let account = self
            .users
            .find_account(user_creds.user.id)
            .await?
            .ok_or(DomainError::InvalidCredentials)?;

        self.activity
            .record(NewActivity::new(account.user.id, ActivityKind::Login, client))
            .await?;

        let access_token = self.issue_token(&account)?;
        Ok(AuthResult {
            account,
            access_token,
        })
    }

    /// Tokens are stateless, so logging out only leaves a trace in the log.
    pub(crate) async fn logout(&self, user_id: i64, client: &ClientInfo) -> Result<(), DomainError> {
        self.activity
            .record(NewActivity::new(user_id, ActivityKind::Logout, client))
            .await?;
        Ok(())
    }

    /// Loads the current role state of an authenticated user.
    pub(crate) async fn resolve_actor(&self, user_id: i64) -> Result<Actor, DomainError> {
        let account = self
            .users
            .find_account(user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {user_id}")))?;
        Ok(Actor::new(&account.user, &account.profile))
    }

    pub(crate) fn hash_password(&self, raw_password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Self::argon2()?
            .hash_password(raw_password.as_bytes(), &salt)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(password_hash.to_string())
    }

    pub(crate) fn verify_password(
        &self,
        raw_password: &str,
        password_hash: &str,
    ) -> Result<(), DomainError> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Self::argon2()?
            .verify_password(raw_password.as_bytes(), &parsed_hash)
            .map_err(|err| match err {
                PasswordHashError::Password => DomainError::InvalidCredentials,
                _ => DomainError::Unexpected(err.to_string()),
            })?;

        Ok(())
    }

    async fn find_credentials(
        &self,
        req: &LoginRequest,
    ) -> Result<Option<UserCredentials>, DomainError> {
        if let Some(creds) = self.users.find_by_username(&req.login).await? {
            return Ok(Some(creds));
        }
        if !req.looks_like_email() {
            return Ok(None);
        }
        match normalize_email(&req.login) {
            Ok(email) => self.users.find_by_email(&email).await,
            Err(_) => Ok(None),
        }
    }

    fn issue_token(&self, account: &UserAccount) -> Result<String, DomainError> {
        self.jwt
            .generate_token(account.user.id, &account.user.username)
            .map_err(|err| DomainError::Unexpected(err.to_string()))
    }

    fn into_new_user(req: RegisterRequest, password_hash: String, is_staff: bool) -> NewUser {
        NewUser {
            username: req.username,
            email: req.email,
            password_hash,
            is_staff,
            first_name: req.first_name,
            last_name: req.last_name,
            role: if is_staff { Role::Admin } else { Role::Reader },
        }
    }

    fn argon2() -> Result<Argon2<'static>, DomainError> {
        let params = Params::new(19 * 1024, 2, 1, None)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}
