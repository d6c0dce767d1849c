//! # Auth Hook
//!
//! Holds the signed-in session. Every screen except login and register
//! calls [`AuthHook::check`] first; `AuthRequired` means "go to login".

use std::sync::Arc;

use simply_core::validation::validate_email;
use simply_core::{CoreError, Role, Session, User};
use simply_db::AuthProvider;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::hooks::report_error;
use crate::notify::{Notification, Notifier};

const MIN_PASSWORD_LEN: usize = 6;

pub struct AuthHook {
    provider: Arc<dyn AuthProvider>,
    notifier: Arc<dyn Notifier>,
    session: Option<Session>,
    loading: bool,
}

impl AuthHook {
    pub fn new(provider: Arc<dyn AuthProvider>, notifier: Arc<dyn Notifier>) -> Self {
        AuthHook {
            provider,
            notifier,
            session: None,
            loading: true,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Resolves a stored session token.
    pub async fn check(&mut self, token: Option<&str>) -> Result<&User, ApiError> {
        self.loading = true;
        let result = match token {
            Some(token) => self.provider.current_session(token).await,
            None => Ok(None),
        };
        self.loading = false;

        match result {
            Ok(Some(session)) => Ok(&self.session.insert(session).user),
            Ok(None) => {
                self.session = None;
                Err(ApiError::auth_required())
            }
            Err(e) => {
                warn!(error = %e, "Session check failed");
                self.session = None;
                self.notifier.notify(Notification::error(
                    "Erro de autenticação",
                    "Não foi possível verificar o usuário.",
                ));
                Err(ApiError::auth_required())
            }
        }
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<&Session, ApiError> {
        let session = self
            .provider
            .sign_in(email, password)
            .await
            .map_err(|e| report_error(self.notifier.as_ref(), "Erro no login", e))?;

        info!(user_id = %session.user.id, "Logged in");
        Ok(self.session.insert(session))
    }

    /// Ends the session. The local session is dropped only when the
    /// provider accepted the sign-out.
    pub async fn logout(&mut self) -> Result<(), ApiError> {
        let Some(session) = &self.session else {
            return Ok(());
        };

        self.provider
            .sign_out(&session.token)
            .await
            .map_err(|e| report_error(self.notifier.as_ref(), "Erro no logout", e))?;

        self.session = None;
        Ok(())
    }

    /// Creates a seller account. The new user still has to log in.
    pub async fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<User, ApiError> {
        const FAILED: &str = "Erro no cadastro";

        validate_email(email.trim())
            .map_err(|e| report_error(self.notifier.as_ref(), FAILED, CoreError::from(e)))?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(report_error(
                self.notifier.as_ref(),
                FAILED,
                ApiError::validation(format!(
                    "password must have at least {} characters",
                    MIN_PASSWORD_LEN
                )),
            ));
        }

        let full_name = full_name.map(str::trim).filter(|n| !n.is_empty());
        let user = self
            .provider
            .sign_up(email, password, full_name, Role::Vendedor)
            .await
            .map_err(|e| report_error(self.notifier.as_ref(), FAILED, e))?;

        self.notifier.notify(Notification::success(
            "Cadastro realizado com sucesso!",
            "Agora você pode acessar o sistema.",
        ));
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::hooks::test_support::FailingStore;
    use crate::notify::NotificationLog;
    use crate::state::test_support::test_context;

    #[tokio::test]
    async fn test_sign_up_login_check_logout() {
        let (ctx, log) = test_context().await;
        let mut hook = ctx.auth_hook();

        let user = hook
            .sign_up("lia@simply.com", "segredo123", Some(" Lia Castro "))
            .await
            .unwrap();
        assert_eq!(user.role, Role::Vendedor);
        assert_eq!(user.full_name.as_deref(), Some("Lia Castro"));
        assert_eq!(log.last().unwrap().title, "Cadastro realizado com sucesso!");
        assert!(hook.user().is_none());

        let token = hook
            .login("lia@simply.com", "segredo123")
            .await
            .unwrap()
            .token
            .clone();

        let mut other_screen = ctx.auth_hook();
        assert_eq!(other_screen.check(Some(&token)).await.unwrap().id, user.id);
        assert!(!other_screen.is_loading());

        hook.logout().await.unwrap();
        assert!(hook.user().is_none());
        let err = other_screen.check(Some(&token)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthRequired);
    }

    #[tokio::test]
    async fn test_check_without_token() {
        let (ctx, log) = test_context().await;
        let mut hook = ctx.auth_hook();

        let err = hook.check(None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthRequired);
        // Redirect only, no notification
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let (ctx, log) = test_context().await;
        let mut hook = ctx.auth_hook();
        hook.sign_up("rui@simply.com", "segredo123", None).await.unwrap();

        let err = hook.login("rui@simply.com", "errada").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCredentials);
        let n = log.last().unwrap();
        assert_eq!(n.title, "Erro no login");
        assert_eq!(n.description.as_deref(), Some("Invalid login credentials"));
    }

    #[tokio::test]
    async fn test_sign_up_validation() {
        let (ctx, log) = test_context().await;
        let mut hook = ctx.auth_hook();

        let err = hook.sign_up("rui@simply.com", "123", None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(log.last().unwrap().title, "Erro no cadastro");

        let err = hook.sign_up("rui", "segredo123", None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        hook.sign_up("rui@simply.com", "segredo123", None).await.unwrap();
        let err = hook.sign_up("rui@simply.com", "segredo123", None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(log.last().unwrap().title, "Erro no cadastro");
    }

    #[tokio::test]
    async fn test_provider_down() {
        let log = Arc::new(NotificationLog::new());
        let mut hook = AuthHook::new(Arc::new(FailingStore), log.clone());

        let err = hook.check(Some("token")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthRequired);
        let n = log.last().unwrap();
        assert_eq!(n.title, "Erro de autenticação");
        assert_eq!(n.description.as_deref(), Some("Não foi possível verificar o usuário."));

        // Nothing to sign out of
        hook.logout().await.unwrap();
    }
}
