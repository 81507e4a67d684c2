//! Staff accounts: registration, approval, and credential checks.

use std::sync::Arc;

use isenior_core::model::{user_status, NewUser, User, UserUpdate, UserView};
use isenior_core::store::UserStore;
use isenior_core::{Error, Result, Store};
use isenior_security::{hash_password, verify_password, PasswordError};
use serde::Deserialize;
use tracing::{info, warn};

use crate::validate;

/// Self-service sign-up. Accounts start `pending` until an administrator approves them.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub role: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

pub struct UserService {
    store: Arc<dyn Store>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn register(&self, registration: Registration) -> Result<UserView> {
        self.insert(registration, user_status::PENDING, false).await
    }

    /// Create an account that can log in immediately (administrative path).
    pub async fn create_approved(&self, registration: Registration) -> Result<UserView> {
        self.insert(registration, user_status::APPROVED, true).await
    }

    /// Check credentials. Unknown users and wrong passwords get the same answer.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        let invalid = || Error::Unauthorized("invalid credentials".into());

        let Some(user) = self.store.find_user_by_username(username).await? else {
            warn!(username, "Login failed: unknown user");
            return Err(invalid());
        };
        if !verify_password(password, &user.password_hash).map_err(password_error)? {
            warn!(username, "Login failed: wrong password");
            return Err(invalid());
        }
        if user.status != user_status::APPROVED {
            warn!(username, status = %user.status, "Login refused: account not approved");
            return Err(Error::Unauthorized(format!(
                "account is {}, not approved",
                user.status
            )));
        }
        info!(username, "Login succeeded");
        Ok(user)
    }

    pub async fn list(&self) -> Result<Vec<UserView>> {
        let users = self.store.list_users().await?;
        Ok(users.into_iter().map(UserView::from).collect())
    }

    pub async fn get(&self, id: i64) -> Result<UserView> {
        self.store
            .get_user(id)
            .await?
            .map(UserView::from)
            .ok_or_else(|| Error::not_found("User", id))
    }

    pub async fn find_by_username(&self, username: &str) -> Result<UserView> {
        self.store
            .find_user_by_username(username)
            .await?
            .map(UserView::from)
            .ok_or_else(|| Error::not_found("User", username))
    }

    pub async fn update(&self, id: i64, update: UserUpdate) -> Result<UserView> {
        validate::non_empty("username", &update.username)?;
        validate::non_empty("role", &update.role)?;
        validate::non_empty("status", &update.status)?;
        check_email(&update.email)?;

        let user = self
            .store
            .update_user(id, &update)
            .await?
            .ok_or_else(|| Error::not_found("User", id))?;
        info!(user = id, status = %user.status, "User updated");
        Ok(user.into())
    }

    pub async fn delete(&self, id: i64) -> Result<UserView> {
        let user = self
            .store
            .get_user(id)
            .await?
            .ok_or_else(|| Error::not_found("User", id))?;
        if !self.store.delete_user(id).await? {
            return Err(Error::not_found("User", id));
        }
        info!(user = id, "User deleted");
        Ok(user.into())
    }

    async fn insert(
        &self,
        registration: Registration,
        status: &str,
        email_verified: bool,
    ) -> Result<UserView> {
        validate::non_empty("username", &registration.username)?;
        validate::non_empty("role", &registration.role)?;
        check_email(&registration.email)?;

        let password_hash = hash_password(&registration.password).map_err(password_error)?;
        let user = self
            .store
            .insert_user(&NewUser {
                username: registration.username.trim().to_string(),
                password_hash,
                role: registration.role,
                status: status.to_string(),
                email: registration.email.trim().to_string(),
                phone: registration.phone,
                email_verified,
            })
            .await?;
        info!(user = user.id, username = %user.username, status, "Account created");
        Ok(user.into())
    }
}

/// Sample staff accounts for demo databases: (username, role, email, phone).
pub const DEMO_STAFF: &[(&str, &str, &str, &str)] = &[
    ("dupont_jean", "Directeur", "jean.dupont@example.com", "0123456789"),
    ("bintein_nicolas", "Infirmière", "nicolas.bintein@example.com", "0987654321"),
];

/// Shared password of the demo accounts.
pub const DEMO_PASSWORD: &str = "password123!";

/// Create the [`DEMO_STAFF`] accounts as approved users, skipping any
/// username that already exists. Returns how many were created.
pub async fn seed_demo_staff(users: &UserService) -> Result<usize> {
    let mut created = 0;
    for &(username, role, email, phone) in DEMO_STAFF {
        let registration = Registration {
            username: username.into(),
            password: DEMO_PASSWORD.into(),
            role: role.into(),
            email: email.into(),
            phone: Some(phone.into()),
        };
        match users.create_approved(registration).await {
            Ok(_) => created += 1,
            Err(Error::Conflict(_)) => info!(username, "Demo account already exists"),
            Err(e) => return Err(e),
        }
    }
    Ok(created)
}

fn check_email(email: &str) -> Result<()> {
    let trimmed = email.trim();
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(Error::validation(format!("'{trimmed}' is not an email address"))),
    }
}

fn password_error(err: PasswordError) -> Error {
    match err {
        PasswordError::Empty => Error::validation(err.to_string()),
        PasswordError::Malformed(_) => Error::Service(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn registration(username: &str, email: &str) -> Registration {
        Registration {
            username: username.into(),
            password: "password123!".into(),
            role: "Infirmière".into(),
            email: email.into(),
            phone: None,
        }
    }

    #[tokio::test]
    async fn registered_accounts_start_pending_and_cannot_log_in() {
        let service = UserService::new(testing::store().await);
        let view = service
            .register(registration("bintein_nicolas", "nicolas@example.com"))
            .await
            .unwrap();
        assert_eq!(view.status, "pending");
        assert!(!view.email_verified);

        let err = service
            .authenticate("bintein_nicolas", "password123!")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unauthorized(_)));
    }

    #[tokio::test]
    async fn approved_account_authenticates() {
        let service = UserService::new(testing::store().await);
        service
            .create_approved(registration("dupont_jean", "jean@example.com"))
            .await
            .unwrap();

        let user = service
            .authenticate("dupont_jean", "password123!")
            .await
            .unwrap();
        assert_eq!(user.role, "Infirmière");
        assert_ne!(user.password_hash, "password123!");

        assert!(matches!(
            service.authenticate("dupont_jean", "nope").await.unwrap_err(),
            Error::Unauthorized(_)
        ));
        assert!(matches!(
            service.authenticate("ghost", "password123!").await.unwrap_err(),
            Error::Unauthorized(_)
        ));
    }

    #[tokio::test]
    async fn duplicate_username_or_email_is_conflict() {
        let service = UserService::new(testing::store().await);
        service
            .register(registration("dupont_jean", "jean@example.com"))
            .await
            .unwrap();

        assert!(matches!(
            service
                .register(registration("dupont_jean", "other@example.com"))
                .await
                .unwrap_err(),
            Error::Conflict(_)
        ));
        assert!(matches!(
            service
                .register(registration("someone_else", "jean@example.com"))
                .await
                .unwrap_err(),
            Error::Conflict(_)
        ));
    }

    #[tokio::test]
    async fn approval_via_update_enables_login() {
        let service = UserService::new(testing::store().await);
        let view = service
            .register(registration("bintein_nicolas", "nicolas@example.com"))
            .await
            .unwrap();

        service
            .update(
                view.id,
                UserUpdate {
                    username: view.username.clone(),
                    role: view.role.clone(),
                    status: "approved".into(),
                    email: view.email.clone(),
                    phone: Some("0987654321".into()),
                },
            )
            .await
            .unwrap();

        assert!(service
            .authenticate("bintein_nicolas", "password123!")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn invalid_input_rejected() {
        let service = UserService::new(testing::store().await);
        assert!(matches!(
            service
                .register(registration("x", "not-an-email"))
                .await
                .unwrap_err(),
            Error::Validation(_)
        ));

        let mut empty_password = registration("x", "x@example.com");
        empty_password.password.clear();
        assert!(matches!(
            service.register(empty_password).await.unwrap_err(),
            Error::Validation(_)
        ));
    }

    #[tokio::test]
    async fn delete_and_get() {
        let service = UserService::new(testing::store().await);
        let view = service
            .register(registration("dupont_jean", "jean@example.com"))
            .await
            .unwrap();
        assert_eq!(service.find_by_username("dupont_jean").await.unwrap(), view);

        let removed = service.delete(view.id).await.unwrap();
        assert_eq!(removed.username, "dupont_jean");
        assert!(matches!(
            service.get(view.id).await.unwrap_err(),
            Error::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn demo_staff_seeding_is_idempotent() {
        let service = UserService::new(testing::store().await);
        assert_eq!(seed_demo_staff(&service).await.unwrap(), 2);
        assert_eq!(seed_demo_staff(&service).await.unwrap(), 0);

        let director = service
            .authenticate("dupont_jean", DEMO_PASSWORD)
            .await
            .unwrap();
        assert_eq!(director.role, "Directeur");
        assert!(director.email_verified);
    }
}
