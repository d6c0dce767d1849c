//! # Customers Hook

use std::sync::Arc;

use simply_core::validation::{validate_customer, validate_new_customer};
use simply_core::{CoreError, Customer, CustomerPatch, NewCustomer, User};
use simply_db::CustomerStore;
use tracing::warn;

use crate::error::ApiError;
use crate::hooks::report_error;
use crate::notify::{Notification, Notifier};

pub struct CustomersHook {
    store: Arc<dyn CustomerStore>,
    notifier: Arc<dyn Notifier>,
    customers: Vec<Customer>,
    loading: bool,
}

impl CustomersHook {
    pub fn new(store: Arc<dyn CustomerStore>, notifier: Arc<dyn Notifier>) -> Self {
        CustomersHook {
            store,
            notifier,
            customers: Vec::new(),
            loading: true,
        }
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub async fn load(&mut self) -> Result<&[Customer], ApiError> {
        self.loading = true;
        let result = self.store.list().await;
        self.loading = false;

        match result {
            Ok(customers) => {
                self.customers = customers;
                Ok(&self.customers)
            }
            Err(e) => Err(report_error(
                self.notifier.as_ref(),
                "Erro ao carregar clientes",
                e,
            )),
        }
    }

    /// Registers a customer on behalf of the signed-in `user`.
    pub async fn create(
        &mut self,
        customer: NewCustomer,
        user: Option<&User>,
    ) -> Result<Customer, ApiError> {
        const FAILED: &str = "Erro ao criar cliente";

        let Some(user) = user else {
            warn!("Customer creation without a signed-in user");
            return Err(report_error(
                self.notifier.as_ref(),
                FAILED,
                ApiError::auth_required(),
            ));
        };

        validate_new_customer(&customer)
            .map_err(|e| report_error(self.notifier.as_ref(), FAILED, CoreError::from(e)))?;

        let created = self
            .store
            .create(&customer, &user.id)
            .await
            .map_err(|e| report_error(self.notifier.as_ref(), FAILED, e))?;

        self.upsert(created.clone());
        self.notifier.notify(Notification::success(
            "Cliente criado!",
            "O cliente foi adicionado com sucesso.",
        ));
        Ok(created)
    }

    pub async fn update(&mut self, id: &str, patch: CustomerPatch) -> Result<Customer, ApiError> {
        const FAILED: &str = "Erro ao atualizar cliente";

        let mut preview = self.current(id, FAILED).await?;
        patch.apply(&mut preview);
        validate_customer(&preview)
            .map_err(|e| report_error(self.notifier.as_ref(), FAILED, CoreError::from(e)))?;

        let updated = self
            .store
            .update(id, &patch)
            .await
            .map_err(|e| report_error(self.notifier.as_ref(), FAILED, e))?;

        self.upsert(updated.clone());
        self.notifier.notify(Notification::success(
            "Cliente atualizado!",
            "As alterações foram salvas.",
        ));
        Ok(updated)
    }

    async fn current(&self, id: &str, failed: &str) -> Result<Customer, ApiError> {
        if let Some(cached) = self.customers.iter().find(|c| c.id == id) {
            return Ok(cached.clone());
        }
        match self.store.get_by_id(id).await {
            Ok(Some(customer)) => Ok(customer),
            Ok(None) => Err(report_error(
                self.notifier.as_ref(),
                failed,
                ApiError::not_found("Customer", id),
            )),
            Err(e) => Err(report_error(self.notifier.as_ref(), failed, e)),
        }
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), ApiError> {
        self.store
            .delete(id)
            .await
            .map_err(|e| report_error(self.notifier.as_ref(), "Erro ao remover cliente", e))?;

        self.customers.retain(|c| c.id != id);
        self.notifier.notify(Notification::success(
            "Cliente removido!",
            "O cliente foi excluído com sucesso.",
        ));
        Ok(())
    }

    fn upsert(&mut self, customer: Customer) {
        self.customers.retain(|c| c.id != customer.id);
        let at = self
            .customers
            .partition_point(|c| c.name.as_str() <= customer.name.as_str());
        self.customers.insert(at, customer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::hooks::test_support::FailingStore;
    use crate::notify::NotificationLog;
    use crate::state::test_support::{seed_user, test_context};

    fn customer(name: &str) -> NewCustomer {
        NewCustomer {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_requires_user() {
        let (ctx, log) = test_context().await;
        let mut hook = ctx.customers_hook();

        let err = hook.create(customer("Maria Souza"), None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthRequired);
        assert_eq!(log.last().unwrap().title, "Erro ao criar cliente");
        assert!(ctx.customers.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_records_user() {
        let (ctx, log) = test_context().await;
        let user = seed_user(&ctx).await;
        let mut hook = ctx.customers_hook();
        hook.load().await.unwrap();

        let created = hook.create(customer("Maria Souza"), Some(&user)).await.unwrap();
        assert_eq!(created.created_by.as_deref(), Some(user.id.as_str()));
        assert_eq!(hook.customers().len(), 1);
        assert_eq!(log.last().unwrap().title, "Cliente criado!");
    }

    #[tokio::test]
    async fn test_create_validates_email() {
        let (ctx, log) = test_context().await;
        let user = seed_user(&ctx).await;
        let mut hook = ctx.customers_hook();

        let err = hook
            .create(
                NewCustomer {
                    name: "Ana Lima".into(),
                    email: Some("ana-at-example".into()),
                    ..Default::default()
                },
                Some(&user),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(log.last().unwrap().is_error());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (ctx, log) = test_context().await;
        let user = seed_user(&ctx).await;
        let mut hook = ctx.customers_hook();

        let bia = hook.create(customer("Bia Rocha"), Some(&user)).await.unwrap();
        hook.create(customer("Carla Dias"), Some(&user)).await.unwrap();

        let updated = hook
            .update(
                &bia.id,
                CustomerPatch {
                    name: Some("Dora Rocha".into()),
                    phone: Some(Some("(11) 98888-7777".into())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.phone.as_deref(), Some("(11) 98888-7777"));
        let names: Vec<&str> = hook.customers().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Carla Dias", "Dora Rocha"]);
        assert_eq!(log.last().unwrap().title, "Cliente atualizado!");

        hook.delete(&bia.id).await.unwrap();
        assert_eq!(hook.customers().len(), 1);
        assert_eq!(log.last().unwrap().title, "Cliente removido!");

        let err = hook.delete(&bia.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(log.last().unwrap().title, "Erro ao remover cliente");
    }

    #[tokio::test]
    async fn test_update_validates_without_loaded_list() {
        let (ctx, log) = test_context().await;
        let user = seed_user(&ctx).await;
        let eva = ctx
            .customers
            .create(&customer("Eva Martins"), &user.id)
            .await
            .unwrap();
        let mut hook = ctx.customers_hook();

        let err = hook
            .update(
                &eva.id,
                CustomerPatch {
                    name: Some("".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(log.last().unwrap().title, "Erro ao atualizar cliente");
        assert_eq!(ctx.customers.get_by_id(&eva.id).await.unwrap().unwrap().name, "Eva Martins");

        let err = hook
            .update(
                &eva.id,
                CustomerPatch {
                    email: Some(Some("eva-sem-arroba".into())),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let renamed = hook
            .update(
                &eva.id,
                CustomerPatch {
                    name: Some("Eva Martins Rocha".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "Eva Martins Rocha");
        assert_eq!(hook.customers().len(), 1);
    }

    #[tokio::test]
    async fn test_load_failure() {
        let log = Arc::new(NotificationLog::new());
        let mut hook = CustomersHook::new(Arc::new(FailingStore), log.clone());

        assert!(hook.load().await.is_err());
        assert_eq!(log.last().unwrap().title, "Erro ao carregar clientes");
        assert!(hook.customers().is_empty());
        assert!(!hook.is_loading());
    }
}
