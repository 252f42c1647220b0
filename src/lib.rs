//! Hemmer Provider for Datadog dashboards
//!
//! This crate implements the `datadog_dashboard` resource: it turns
//! declarative dashboard configuration into Datadog API requests and turns
//! API responses back into provider state.
//!
//! # Overview
//!
//! - **ProviderService trait**: the in-process interface a provider host drives
//! - **DatadogProvider**: configuration with environment fallback, dispatch by resource type
//! - **Dashboard model**: typed API structures for dashboards and about 25 widget types,
//!   each with its own mapping to and from state
//! - **Schema types**: the attribute and block schema used for validation
//! - **Client**: the dashboard and dashboard list endpoints over `reqwest`
//! - **Logging**: integration with `tracing` for structured logging
//!
//! # Quick Start
//!
//! ```ignore
//! use hemmer_provider_datadog::{DatadogProvider, ProviderService};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     hemmer_provider_datadog::init_logging();
//!     let provider = DatadogProvider::new();
//!
//!     // Keys fall back to DD_API_KEY and DD_APP_KEY.
//!     provider.configure(json!({})).await?;
//!
//!     let config = json!({
//!         "title": "Ops",
//!         "layout_type": "ordered",
//!         "widget": [{"note_definition": [{"content": "hello"}]}]
//!     });
//!     let plan = provider
//!         .plan("datadog_dashboard", None, config.clone(), config)
//!         .await?;
//!     let state = provider.create("datadog_dashboard", plan.planned_state).await?;
//!     println!("created dashboard {}", state["id"]);
//!     Ok(())
//! }
//! ```
//!
//! # State shape
//!
//! Blocks are arrays of objects, and a block that allows a single item is a
//! one-element array. Map attributes (`time`, `layout`, ...) are objects of
//! strings. `null`, a missing key and `""` all mean unset.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod provider;
pub mod resource;
pub mod schema;
pub mod service;
pub mod state;
pub mod testing;
pub mod types;
pub mod validation;

// Re-export main types at crate root
pub use client::DatadogClient;
pub use config::{ProviderConfig, RetryPolicy};
pub use dashboard::{Dashboard, LayoutType, Widget, WidgetDefinition, DASHBOARD_RESOURCE};
pub use error::ProviderError;
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::DatadogProvider;
pub use resource::DashboardResource;
pub use schema::ProviderSchema;
pub use service::ProviderService;
pub use types::{AttributeChange, ImportedResource, PlanResult, ProviderMetadata};
pub use validation::{is_valid, validate, validate_result};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
