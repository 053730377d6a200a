use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use tokio::sync::{Mutex, MutexGuard};

use crate::api::RailwayApi;
use crate::config::{Config, RefreshInterval};
use crate::error::{ApiResult, AppError, AppResult};
use crate::models::{Deployment, Project, ServiceScope, ServiceSource, Variables};
use crate::refresh::AutoRefresh;

/// Point-in-time copy of what the UI shows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    pub projects: Vec<Project>,
    pub is_loading: bool,
    pub error_message: Option<String>,
}

/// Application state shared across all UI components
///
/// The only component that talks to the Railway API. Cloning is cheap and
/// every clone observes the same store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    api: Arc<dyn RailwayApi>,
    config: RwLock<Config>,
    store: RwLock<StoreSnapshot>,
    /// Serialises operations that replace or change the project list
    list_lock: Mutex<()>,
    refresh: Mutex<Option<AutoRefresh>>,
}

/// Non-owning handle for background tasks
///
/// Holding one does not keep the state alive.
#[derive(Clone)]
pub(crate) struct WeakAppState {
    inner: Weak<AppStateInner>,
}

impl WeakAppState {
    pub(crate) fn upgrade(&self) -> Option<AppState> {
        self.inner.upgrade().map(|inner| AppState { inner })
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Held for the duration of a list-affecting operation
///
/// Lowers the busy flag on drop, so a cancelled operation cannot leave it set.
struct ListOperation<'a> {
    store: &'a RwLock<StoreSnapshot>,
    _exclusive: MutexGuard<'a, ()>,
}

impl Drop for ListOperation<'_> {
    fn drop(&mut self) {
        write(self.store).is_loading = false;
    }
}

impl AppState {
    pub fn new(config: Config, api: Arc<dyn RailwayApi>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                api,
                config: RwLock::new(config),
                store: RwLock::new(StoreSnapshot::default()),
                list_lock: Mutex::new(()),
                refresh: Mutex::new(None),
            }),
        }
    }

    pub(crate) fn downgrade(&self) -> WeakAppState {
        WeakAppState {
            inner: Arc::downgrade(&self.inner),
        }
    }

    // ============ Reads ============

    pub fn config(&self) -> Config {
        read(&self.inner.config).clone()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        read(&self.inner.store).clone()
    }

    pub fn projects(&self) -> Vec<Project> {
        read(&self.inner.store).projects.clone()
    }

    pub fn project(&self, project_id: &str) -> Option<Project> {
        read(&self.inner.store)
            .projects
            .iter()
            .find(|p| p.id == project_id)
            .cloned()
    }

    pub fn is_loading(&self) -> bool {
        read(&self.inner.store).is_loading
    }

    pub fn error_message(&self) -> Option<String> {
        read(&self.inner.store).error_message.clone()
    }

    // ============ Setters ============

    /// Successful operations never clear the error; callers do it here
    pub fn clear_error(&self) {
        write(&self.inner.store).error_message = None;
    }

    pub async fn set_api_token(&self, token: impl Into<String>) {
        write(&self.inner.config).api_token = token.into();
        self.sync_auto_refresh().await;
    }

    pub async fn set_workspace_id(&self, workspace_id: impl Into<String>) {
        write(&self.inner.config).workspace_id = workspace_id.into();
        self.sync_auto_refresh().await;
    }

    pub async fn set_auto_refresh_enabled(&self, enabled: bool) {
        write(&self.inner.config).auto_refresh_enabled = enabled;
        self.sync_auto_refresh().await;
    }

    pub async fn set_refresh_interval(&self, interval: RefreshInterval) {
        write(&self.inner.config).refresh_interval = interval;
        self.sync_auto_refresh().await;
    }

    /// Replace the whole configuration, e.g. after the settings form is saved
    pub async fn update_config(&self, config: Config) {
        *write(&self.inner.config) = config;
        self.sync_auto_refresh().await;
    }

    // ============ Bookkeeping ============

    /// Current config if it permits remote calls, else record the error
    fn require_config(&self, operation: &'static str) -> AppResult<Config> {
        let config = self.config();
        if config.is_complete() {
            Ok(config)
        } else {
            Err(self.record_error(operation, AppError::ConfigurationIncomplete))
        }
    }

    fn record_error(&self, operation: &'static str, error: AppError) -> AppError {
        tracing::warn!(operation, error = %error, "Operation failed");
        write(&self.inner.store).error_message = Some(error.to_string());
        error
    }

    fn finish<T>(&self, operation: &'static str, result: ApiResult<T>) -> AppResult<T> {
        result.map_err(|e| self.record_error(operation, e.into()))
    }

    /// Take the list lock and raise the busy flag
    ///
    /// The config is checked before waiting and read again once the lock is
    /// held; the operation runs with that second copy.
    async fn begin_list_operation(
        &self,
        operation: &'static str,
    ) -> AppResult<(ListOperation<'_>, Config)> {
        self.require_config(operation)?;
        let exclusive = self.inner.list_lock.lock().await;
        let config = self.require_config(operation)?;

        write(&self.inner.store).is_loading = true;
        let op = ListOperation {
            store: &self.inner.store,
            _exclusive: exclusive,
        };
        Ok((op, config))
    }

    /// Replace the project list with the server's; caller holds the list lock
    async fn reload_projects(&self, config: &Config) -> AppResult<()> {
        let result = self
            .inner
            .api
            .fetch_projects(&config.api_token, &config.workspace_id)
            .await;
        let projects = self.finish("fetch_projects", result)?;

        tracing::info!(count = projects.len(), "Project list refreshed");
        write(&self.inner.store).projects = projects;
        Ok(())
    }

    /// Re-fetch after a mutation; a failure here is recorded but does not
    /// turn the mutation's own success into an error
    async fn reload_after_mutation(&self, config: &Config) {
        if self.reload_projects(config).await.is_err() {
            tracing::warn!("Project list may be stale after a successful mutation");
        }
    }

    // ============ List-affecting operations ============

    pub async fn fetch_projects(&self) -> AppResult<()> {
        let (_op, config) = self.begin_list_operation("fetch_projects").await?;
        self.reload_projects(&config).await
    }

    /// Create a service and return its id once the list has been re-fetched
    pub async fn create_service(
        &self,
        project_id: &str,
        source: &ServiceSource,
    ) -> AppResult<String> {
        let (_op, config) = self.begin_list_operation("create_service").await?;

        let result = self
            .inner
            .api
            .create_service(&config.api_token, project_id, source)
            .await;
        let service_id = self.finish("create_service", result)?;

        tracing::info!(project_id, service_id = %service_id, "Service created");
        self.reload_after_mutation(&config).await;
        Ok(service_id)
    }

    pub async fn delete_project(&self, project_id: &str) -> AppResult<bool> {
        let (_op, config) = self.begin_list_operation("delete_project").await?;

        let result = self
            .inner
            .api
            .delete_project(&config.api_token, project_id)
            .await;
        let deleted = self.finish("delete_project", result)?;

        if deleted {
            tracing::info!(project_id, "Project deleted");
            self.reload_after_mutation(&config).await;
        }
        Ok(deleted)
    }

    pub async fn delete_service(&self, service_id: &str) -> AppResult<bool> {
        let (_op, config) = self.begin_list_operation("delete_service").await?;

        let result = self
            .inner
            .api
            .delete_service(&config.api_token, service_id)
            .await;
        let deleted = self.finish("delete_service", result)?;

        if deleted {
            tracing::info!(service_id, "Service deleted");
            self.reload_after_mutation(&config).await;
        }
        Ok(deleted)
    }

    // ============ Variable and deployment panels ============
    // These neither raise the busy flag nor wait for the list lock.

    pub async fn fetch_variables(&self, scope: &ServiceScope) -> AppResult<Variables> {
        let config = self.require_config("fetch_variables")?;
        let result = self
            .inner
            .api
            .fetch_variables(&config.api_token, scope)
            .await;
        self.finish("fetch_variables", result)
    }

    pub async fn upsert_variable(
        &self,
        scope: &ServiceScope,
        name: &str,
        value: &str,
    ) -> AppResult<bool> {
        let config = self.require_config("upsert_variable")?;
        let result = self
            .inner
            .api
            .upsert_variable(&config.api_token, scope, name, value)
            .await;
        self.finish("upsert_variable", result)
    }

    pub async fn delete_variable(&self, scope: &ServiceScope, name: &str) -> AppResult<bool> {
        let config = self.require_config("delete_variable")?;
        let result = self
            .inner
            .api
            .delete_variable(&config.api_token, scope, name)
            .await;
        self.finish("delete_variable", result)
    }

    pub async fn fetch_deployments(&self, scope: &ServiceScope) -> AppResult<Vec<Deployment>> {
        let config = self.require_config("fetch_deployments")?;
        let result = self
            .inner
            .api
            .fetch_deployments(&config.api_token, scope)
            .await;
        self.finish("fetch_deployments", result)
    }

    pub async fn restart_deployment(&self, deployment_id: &str) -> AppResult<bool> {
        let config = self.require_config("restart_deployment")?;
        let result = self
            .inner
            .api
            .restart_deployment(&config.api_token, deployment_id)
            .await;
        self.finish("restart_deployment", result)
    }

    pub async fn redeploy_service(&self, environment_id: &str, service_id: &str) -> AppResult<bool> {
        let config = self.require_config("redeploy_service")?;
        let result = self
            .inner
            .api
            .redeploy_service(&config.api_token, environment_id, service_id)
            .await;
        self.finish("redeploy_service", result)
    }

    // ============ Auto-refresh ============

    /// Stop any running refresh loop, then start one if enabled and configured
    ///
    /// Runs under a mutex, so at most one loop is ever alive.
    pub async fn sync_auto_refresh(&self) {
        let mut slot = self.inner.refresh.lock().await;
        if let Some(running) = slot.take() {
            running.stop().await;
        }

        let config = self.config();
        if config.auto_refresh_enabled && config.is_complete() {
            *slot = Some(AutoRefresh::spawn(self, config.refresh_interval));
        }
    }

    pub async fn stop_auto_refresh(&self) {
        if let Some(running) = self.inner.refresh.lock().await.take() {
            running.stop().await;
        }
    }

    pub async fn is_auto_refreshing(&self) -> bool {
        self.inner.refresh.lock().await.is_some()
    }

    /// Interval of the running refresh loop, if any
    pub async fn auto_refresh_interval(&self) -> Option<RefreshInterval> {
        self.inner
            .refresh
            .lock()
            .await
            .as_ref()
            .map(|running| running.interval())
    }
}
