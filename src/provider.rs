//! The Datadog provider.
//!
//! [`DatadogProvider`] implements [`ProviderService`]: it resolves the
//! provider configuration into a [`DatadogClient`] and dispatches resource
//! operations by type. `datadog_dashboard` is the only resource type.

use crate::client::DatadogClient;
use crate::config::{ProviderConfig, RetryPolicy};
use crate::dashboard::DASHBOARD_RESOURCE;
use crate::error::ProviderError;
use crate::resource::DashboardResource;
use crate::schema::{Diagnostic, ProviderSchema};
use crate::service::ProviderService;
use crate::types::{ImportedResource, PlanResult};
use crate::validation;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

/// Provider for Datadog dashboards.
#[derive(Debug, Default)]
pub struct DatadogProvider {
    dashboards: RwLock<Option<DashboardResource>>,
    retry: Option<RetryPolicy>,
}

impl DatadogProvider {
    /// Create an unconfigured provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the wait policy used after creating a dashboard.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Whether `configure` has succeeded and `stop` has not been called since.
    pub async fn is_configured(&self) -> bool {
        self.dashboards.read().await.is_some()
    }

    async fn dashboards(&self, resource_type: &str) -> Result<DashboardResource, ProviderError> {
        check_resource_type(resource_type)?;
        self.dashboards.read().await.clone().ok_or_else(|| {
            ProviderError::Configuration(
                "provider is not configured: call configure before managing resources"
                    .to_string(),
            )
        })
    }
}

fn check_resource_type(resource_type: &str) -> Result<(), ProviderError> {
    if resource_type == DASHBOARD_RESOURCE {
        Ok(())
    } else {
        Err(ProviderError::UnknownResource(resource_type.to_string()))
    }
}

#[async_trait::async_trait]
impl ProviderService for DatadogProvider {
    fn schema(&self) -> ProviderSchema {
        ProviderSchema::new()
            .with_provider_config(ProviderConfig::schema())
            .with_resource(DASHBOARD_RESOURCE, DashboardResource::schema())
    }

    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(validation::validate(&ProviderConfig::schema(), &config))
    }

    #[instrument(skip_all)]
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let mut diagnostics = validation::validate(&ProviderConfig::schema(), &config);
        if diagnostics.iter().any(Diagnostic::is_error) {
            return Ok(diagnostics);
        }

        let mut resolved = match ProviderConfig::resolve(&config) {
            Ok(resolved) => resolved,
            Err(errors) => {
                diagnostics.extend(errors);
                return Ok(diagnostics);
            }
        };
        if let Some(retry) = self.retry {
            resolved = resolved.with_retry(retry);
        }

        let client = DatadogClient::new(&resolved)?;
        if resolved.validate {
            if let Err(err) = client.validate().await {
                warn!(error = %err, "credential validation failed");
                diagnostics.push(
                    Diagnostic::error("Invalid Datadog credentials")
                        .with_detail(err.to_string()),
                );
                return Ok(diagnostics);
            }
        }

        info!(api_url = %client.base_url(), "configured Datadog provider");
        *self.dashboards.write().await =
            Some(DashboardResource::new(Arc::new(client), resolved.retry));
        Ok(diagnostics)
    }

    async fn stop(&self) -> Result<(), ProviderError> {
        self.dashboards.write().await.take();
        info!("Datadog provider stopped");
        Ok(())
    }

    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        check_resource_type(resource_type)?;
        Ok(DashboardResource::validate(&config))
    }

    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        _config: Value,
    ) -> Result<PlanResult, ProviderError> {
        check_resource_type(resource_type)?;
        DashboardResource::plan(prior_state.as_ref(), &proposed_state)
    }

    #[instrument(skip(self, planned_state))]
    async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError> {
        self.dashboards(resource_type)
            .await?
            .create(&planned_state)
            .await
    }

    #[instrument(skip(self, current_state))]
    async fn read(&self, resource_type: &str, current_state: Value) -> Result<Value, ProviderError> {
        self.dashboards(resource_type)
            .await?
            .read(&current_state)
            .await
    }

    #[instrument(skip(self, prior_state, planned_state))]
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.dashboards(resource_type)
            .await?
            .update(&prior_state, &planned_state)
            .await
    }

    #[instrument(skip(self, current_state))]
    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        self.dashboards(resource_type)
            .await?
            .delete(&current_state)
            .await
    }

    #[instrument(skip(self))]
    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        self.dashboards(resource_type).await?.import(id).await
    }
}
