//! The `datadog_dashboard` resource.
//!
//! Planning works on state alone. Apply operations build the API body from
//! planned state, call the client, and load the dashboard the API returns
//! back into state. Dashboard list membership is kept in state only: the
//! API does not report which lists contain a dashboard.

use crate::client::{DashboardListItems, DatadogClient};
use crate::config::RetryPolicy;
use crate::dashboard::schema::dashboard_schema;
use crate::dashboard::{rules, Dashboard, LayoutType, DASHBOARD_RESOURCE};
use crate::error::ProviderError;
use crate::schema::{AttributeType, Block, BlockNestingMode, Diagnostic, NestedBlock, Schema};
use crate::state::{StateMapping, StateReader};
use crate::types::{AttributeChange, ImportedResource, PlanResult};
use crate::validation;
use serde_json::{Map, Number, Value};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info};

const DASHBOARD_LISTS: &str = "dashboard_lists";
const DASHBOARD_LISTS_REMOVED: &str = "dashboard_lists_removed";

/// Attributes kept from the previous state because the API never returns them.
const STATE_ONLY_ATTRIBUTES: &[&str] = &[DASHBOARD_LISTS, DASHBOARD_LISTS_REMOVED];

/// Apply operations of the dashboard resource.
#[derive(Debug, Clone)]
pub struct DashboardResource {
    client: Arc<DatadogClient>,
    retry: RetryPolicy,
}

impl DashboardResource {
    /// Create the resource over a configured client.
    pub fn new(client: Arc<DatadogClient>, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Schema of the resource.
    pub fn schema() -> Schema {
        dashboard_schema()
    }

    /// Validate a configuration against the schema and the widget rules.
    pub fn validate(config: &Value) -> Vec<Diagnostic> {
        let mut diagnostics = validation::validate(&dashboard_schema(), config);
        diagnostics.extend(rules::validate_dashboard(config));
        diagnostics
    }

    /// Compute the planned state and the attribute changes.
    ///
    /// Schema defaults are filled in at every block level. Changes are
    /// compared after normalising both sides, and a change to a `force_new`
    /// attribute requires replacement. A `null` proposed state plans a
    /// destroy.
    pub fn plan(prior: Option<&Value>, proposed: &Value) -> Result<PlanResult, ProviderError> {
        let schema = dashboard_schema();
        let prior = prior.filter(|p| !p.is_null());

        if proposed.is_null() {
            let changes = match prior {
                Some(prior) => object_entries(&normalize(&schema.block, prior))
                    .into_iter()
                    .map(|(key, value)| AttributeChange::removed(key, value))
                    .collect(),
                None => Vec::new(),
            };
            return Ok(PlanResult::with_changes(Value::Null, changes, false));
        }

        let mut planned = match proposed {
            Value::Object(map) => map.clone(),
            _ => {
                return Err(ProviderError::InvalidRequest(
                    "proposed state must be an object".to_string(),
                ))
            }
        };

        apply_defaults(&schema.block, &mut planned);

        let removed = match prior {
            Some(prior) => {
                for key in ["id", "url"] {
                    if !is_set(planned.get(key)) {
                        if let Some(value) = prior.get(key).filter(|v| is_set(Some(*v))) {
                            planned.insert(key.to_string(), value.clone());
                        }
                    }
                }
                removed_lists(prior, proposed)
            }
            None => Vec::new(),
        };
        planned.insert(
            DASHBOARD_LISTS_REMOVED.to_string(),
            Value::Array(removed.into_iter().map(Value::from).collect()),
        );

        let planned = Value::Object(planned);
        // Prior state only carries what the API returned, so defaults are
        // filled in before comparing.
        let before = match prior {
            Some(Value::Object(prior)) => {
                let mut prior = prior.clone();
                apply_defaults(&schema.block, &mut prior);
                normalize(&schema.block, &Value::Object(prior))
            }
            _ => Value::Null,
        };
        let after = normalize(&schema.block, &planned);
        let changes = diff(&before, &after);

        let requires_replace = prior.is_some()
            && changes.iter().any(|change| {
                schema
                    .block
                    .attributes
                    .get(&change.path)
                    .is_some_and(|attr| attr.force_new)
            });

        if changes.is_empty() && !requires_replace {
            return Ok(PlanResult::no_change(planned));
        }
        Ok(PlanResult::with_changes(planned, changes, requires_replace))
    }

    /// Create the dashboard and wait until it can be read back.
    pub async fn create(&self, planned: &Value) -> Result<Value, ProviderError> {
        let dashboard = build(planned)?;
        let created = self
            .client
            .create_dashboard(&dashboard)
            .await
            .map_err(|err| err.context("error creating dashboard"))?;
        let id = created.id.ok_or_else(|| {
            ProviderError::Sdk("error creating dashboard: response carries no id".to_string())
        })?;
        info!(dashboard_id = %id, "created dashboard");

        let fetched = self.wait_for_dashboard(&id).await?;
        self.sync_dashboard_lists(&id, dashboard.layout_type, planned)
            .await;
        load_state(&fetched, &id, planned)
    }

    /// Refresh state from the API.
    ///
    /// Returns `Value::Null` when the dashboard no longer exists.
    pub async fn read(&self, current: &Value) -> Result<Value, ProviderError> {
        let id = StateReader::new(current).required_string("id")?;
        match self.client.get_dashboard(&id).await {
            Ok(dashboard) => load_state(&dashboard, &id, current),
            Err(err) if err.is_not_found() => {
                info!(dashboard_id = %id, "dashboard no longer exists");
                Ok(Value::Null)
            }
            Err(err) => Err(err.context("error getting dashboard")),
        }
    }

    /// Replace the dashboard with the planned state.
    pub async fn update(&self, prior: &Value, planned: &Value) -> Result<Value, ProviderError> {
        let id = match StateReader::new(prior).string("id") {
            Some(id) => id,
            None => StateReader::new(planned).required_string("id")?,
        };
        let dashboard = build(planned)?;
        self.client
            .update_dashboard(&id, &dashboard)
            .await
            .map_err(|err| err.context("error updating dashboard"))?;
        info!(dashboard_id = %id, "updated dashboard");

        self.sync_dashboard_lists(&id, dashboard.layout_type, planned)
            .await;

        let fetched = self
            .client
            .get_dashboard(&id)
            .await
            .map_err(|err| err.context("error getting dashboard"))?;
        load_state(&fetched, &id, planned)
    }

    /// Delete the dashboard.
    pub async fn delete(&self, current: &Value) -> Result<(), ProviderError> {
        let id = StateReader::new(current).required_string("id")?;
        self.client
            .delete_dashboard(&id)
            .await
            .map_err(|err| err.context("error deleting dashboard"))?;
        info!(dashboard_id = %id, "deleted dashboard");
        Ok(())
    }

    /// Import an existing dashboard by id.
    pub async fn import(&self, id: &str) -> Result<Vec<ImportedResource>, ProviderError> {
        let dashboard = self
            .client
            .get_dashboard(id)
            .await
            .map_err(|err| err.context("error getting dashboard"))?;
        info!(dashboard_id = %id, "imported dashboard");
        let state = load_state(&dashboard, id, &Value::Null)?;
        Ok(vec![ImportedResource::new(DASHBOARD_RESOURCE, state)])
    }

    /// Poll a newly created dashboard until reads stop returning 404.
    async fn wait_for_dashboard(&self, id: &str) -> Result<Dashboard, ProviderError> {
        let deadline = Instant::now() + self.retry.timeout;
        let mut backoff = self.retry.initial_backoff;
        let mut attempt: u32 = 1;

        loop {
            match self.client.get_dashboard(id).await {
                Ok(dashboard) => return Ok(dashboard),
                Err(err) if err.is_not_found() => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(ProviderError::DeadlineExceeded(format!(
                            "dashboard {} was not readable after {:?}: {}",
                            id,
                            self.retry.timeout,
                            err.message()
                        )));
                    }
                    debug!(dashboard_id = %id, attempt, ?backoff, "dashboard not readable yet, retrying");
                    tokio::time::sleep(backoff.min(deadline - now)).await;
                    backoff = self.retry.next_backoff(backoff);
                    attempt += 1;
                }
                Err(err) => return Err(err.context("error getting dashboard")),
            }
        }
    }

    /// Add the dashboard to `dashboard_lists` and remove it from
    /// `dashboard_lists_removed`. Failures are logged and otherwise ignored.
    async fn sync_dashboard_lists(&self, id: &str, layout_type: LayoutType, planned: &Value) {
        let reader = StateReader::new(planned);
        let items = DashboardListItems::single(id, layout_type);

        for list_id in reader.ints(DASHBOARD_LISTS) {
            match self.client.add_dashboard_list_items(list_id, &items).await {
                Ok(()) => debug!(dashboard_id = %id, list_id, "added dashboard to list"),
                Err(err) => {
                    debug!(dashboard_id = %id, list_id, error = %err, "failed to add dashboard to list")
                }
            }
        }
        for list_id in reader.ints(DASHBOARD_LISTS_REMOVED) {
            match self.client.delete_dashboard_list_items(list_id, &items).await {
                Ok(()) => debug!(dashboard_id = %id, list_id, "removed dashboard from list"),
                Err(err) => {
                    debug!(dashboard_id = %id, list_id, error = %err, "failed to remove dashboard from list")
                }
            }
        }
    }
}

/// Build the API body from planned state.
fn build(planned: &Value) -> Result<Dashboard, ProviderError> {
    let mut dashboard = Dashboard::from_state(&StateReader::new(planned)).map_err(|err| {
        ProviderError::Validation(format!(
            "failed to parse resource configuration: {}",
            err.message()
        ))
    })?;
    // The id travels in the path.
    dashboard.id = None;
    Ok(dashboard)
}

/// Flatten a dashboard into state, keeping the state-only attributes of
/// `previous`.
fn load_state(dashboard: &Dashboard, id: &str, previous: &Value) -> Result<Value, ProviderError> {
    let mut state = match dashboard.to_state()? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    state.insert("id".to_string(), Value::String(id.to_string()));
    for key in STATE_ONLY_ATTRIBUTES {
        if let Some(value) = previous.get(*key).filter(|v| !v.is_null()) {
            state.insert(key.to_string(), value.clone());
        }
    }
    Ok(Value::Object(state))
}

/// Lists dropped from `dashboard_lists` since the prior state.
fn removed_lists(prior: &Value, proposed: &Value) -> Vec<i64> {
    let old: BTreeSet<i64> = StateReader::new(prior).ints(DASHBOARD_LISTS).into_iter().collect();
    let new: BTreeSet<i64> = StateReader::new(proposed)
        .ints(DASHBOARD_LISTS)
        .into_iter()
        .collect();
    if old == new {
        return Vec::new();
    }
    old.difference(&new).copied().collect()
}

fn is_set(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
        Some(_) => true,
    }
}

/// Fill unset attributes that declare a default, descending into every
/// nested block present in `state`.
fn apply_defaults(block: &Block, state: &mut Map<String, Value>) {
    for (name, attr) in &block.attributes {
        if let Some(default) = &attr.default {
            if !is_set(state.get(name)) {
                state.insert(name.clone(), default.clone());
            }
        }
    }
    for (name, nested) in &block.blocks {
        match state.get_mut(name) {
            Some(Value::Array(items)) => {
                for item in items {
                    if let Value::Object(item) = item {
                        apply_defaults(&nested.block, item);
                    }
                }
            }
            Some(Value::Object(item)) => apply_defaults(&nested.block, item),
            _ => {}
        }
    }
}

/// Canonical form of a state object for comparison.
///
/// Unset values (`null`, `""`, `[]`, `{}`) are dropped, whole-number floats
/// become integers, and set attributes and set blocks are sorted.
fn normalize(block: &Block, value: &Value) -> Value {
    let Value::Object(map) = value else {
        return normalize_value(value);
    };
    Value::Object(
        map.iter()
            .map(|(key, v)| {
                let v = match (block.attributes.get(key), block.blocks.get(key)) {
                    (Some(attr), _) if matches!(attr.attr_type, AttributeType::Set(_)) => {
                        sorted(normalize_value(v))
                    }
                    (_, Some(nested)) => normalize_nested(nested, v),
                    _ => normalize_value(v),
                };
                (key.clone(), v)
            })
            .filter(|(_, v)| is_set(Some(v)))
            .collect(),
    )
}

fn normalize_nested(nested: &NestedBlock, value: &Value) -> Value {
    let normalized = match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| normalize(&nested.block, item))
                .collect(),
        ),
        other => normalize(&nested.block, other),
    };
    if nested.nesting_mode == BlockNestingMode::Set {
        sorted(normalized)
    } else {
        normalized
    }
}

fn normalize_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), normalize_value(v)))
                .filter(|(_, v)| is_set(Some(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(normalize_value).collect()),
        Value::Number(n) => canonical_number(n),
        other => other.clone(),
    }
}

/// The API returns thresholds as floats, so `10` and `10.0` must compare equal.
fn canonical_number(n: &Number) -> Value {
    const EXACT: f64 = 9_007_199_254_740_992.0; // 2^53
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < EXACT => Value::from(f as i64),
        _ => Value::Number(n.clone()),
    }
}

fn sorted(value: Value) -> Value {
    match value {
        Value::Array(mut items) => {
            items.sort_by_key(|item| item.to_string());
            Value::Array(items)
        }
        other => other,
    }
}

fn object_entries(value: &Value) -> Vec<(String, Value)> {
    match value {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        _ => Vec::new(),
    }
}

/// Top-level attribute changes between two normalized states.
fn diff(before: &Value, after: &Value) -> Vec<AttributeChange> {
    let empty = Map::new();
    let before = before.as_object().unwrap_or(&empty);
    let after = after.as_object().unwrap_or(&empty);
    let keys: BTreeSet<&String> = before.keys().chain(after.keys()).collect();

    keys.into_iter()
        .filter_map(|key| match (before.get(key), after.get(key)) {
            (None, Some(new)) => Some(AttributeChange::added(key.as_str(), new.clone())),
            (Some(old), None) => Some(AttributeChange::removed(key.as_str(), old.clone())),
            (Some(old), Some(new)) if old != new => Some(AttributeChange::modified(
                key.as_str(),
                old.clone(),
                new.clone(),
            )),
            _ => None,
        })
        .collect()
}
