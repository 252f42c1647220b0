//! Queries carried by widget requests.
//!
//! A request sets at most one query. In the API the query sits directly in
//! the request object under its own key (`q`, `log_query`, ...), which is
//! why [`RequestQuery`] is an externally tagged enum flattened into each
//! request type.

use crate::error::ProviderError;
use crate::state::{StateMapping, StateReader, StateWriter};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The kinds of query a request can carry, in build precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Metric query string (`q`).
    Metric,
    /// APM events query.
    Apm,
    /// Log events query.
    Log,
    /// Network events query.
    Network,
    /// Live process query.
    Process,
    /// RUM events query.
    Rum,
    /// Security signals query.
    Security,
    /// APM resource statistics query.
    ApmStats,
}

impl QueryKind {
    /// Queries offered by most request types.
    pub const STANDARD: &'static [QueryKind] = &[
        QueryKind::Metric,
        QueryKind::Apm,
        QueryKind::Log,
        QueryKind::Process,
        QueryKind::Rum,
        QueryKind::Security,
    ];

    /// Queries offered by timeseries requests.
    pub const TIMESERIES: &'static [QueryKind] = &[
        QueryKind::Metric,
        QueryKind::Apm,
        QueryKind::Log,
        QueryKind::Network,
        QueryKind::Process,
        QueryKind::Rum,
        QueryKind::Security,
    ];

    /// Queries offered by query table requests.
    pub const TABLE: &'static [QueryKind] = &[
        QueryKind::Metric,
        QueryKind::Apm,
        QueryKind::Log,
        QueryKind::Process,
        QueryKind::Rum,
        QueryKind::Security,
        QueryKind::ApmStats,
    ];

    /// Attribute name in both state and the API.
    pub fn key(self) -> &'static str {
        match self {
            QueryKind::Metric => "q",
            QueryKind::Apm => "apm_query",
            QueryKind::Log => "log_query",
            QueryKind::Network => "network_query",
            QueryKind::Process => "process_query",
            QueryKind::Rum => "rum_query",
            QueryKind::Security => "security_query",
            QueryKind::ApmStats => "apm_stats_query",
        }
    }
}

/// The query of one widget request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RequestQuery {
    /// Metric query string.
    #[serde(rename = "q")]
    Metric(String),
    /// APM events query.
    #[serde(rename = "apm_query")]
    Apm(LogQuery),
    /// Log events query.
    #[serde(rename = "log_query")]
    Log(LogQuery),
    /// Network events query.
    #[serde(rename = "network_query")]
    Network(LogQuery),
    /// Live process query.
    #[serde(rename = "process_query")]
    Process(ProcessQuery),
    /// RUM events query.
    #[serde(rename = "rum_query")]
    Rum(LogQuery),
    /// Security signals query.
    #[serde(rename = "security_query")]
    Security(LogQuery),
    /// APM resource statistics query.
    #[serde(rename = "apm_stats_query")]
    ApmStats(ApmStatsQuery),
}

impl RequestQuery {
    /// The kind of this query.
    pub fn kind(&self) -> QueryKind {
        match self {
            RequestQuery::Metric(_) => QueryKind::Metric,
            RequestQuery::Apm(_) => QueryKind::Apm,
            RequestQuery::Log(_) => QueryKind::Log,
            RequestQuery::Network(_) => QueryKind::Network,
            RequestQuery::Process(_) => QueryKind::Process,
            RequestQuery::Rum(_) => QueryKind::Rum,
            RequestQuery::Security(_) => QueryKind::Security,
            RequestQuery::ApmStats(_) => QueryKind::ApmStats,
        }
    }

    /// Read the first query set on a request, following `kinds` order.
    pub fn read(
        reader: &StateReader<'_>,
        kinds: &[QueryKind],
    ) -> Result<Option<Self>, ProviderError> {
        for kind in kinds {
            let key = kind.key();
            let query = match kind {
                QueryKind::Metric => reader.string(key).map(RequestQuery::Metric),
                QueryKind::Apm => reader.parse_block(key)?.map(RequestQuery::Apm),
                QueryKind::Log => reader.parse_block(key)?.map(RequestQuery::Log),
                QueryKind::Network => reader.parse_block(key)?.map(RequestQuery::Network),
                QueryKind::Process => reader.parse_block(key)?.map(RequestQuery::Process),
                QueryKind::Rum => reader.parse_block(key)?.map(RequestQuery::Rum),
                QueryKind::Security => reader.parse_block(key)?.map(RequestQuery::Security),
                QueryKind::ApmStats => reader.parse_block(key)?.map(RequestQuery::ApmStats),
            };
            if query.is_some() {
                return Ok(query);
            }
        }
        Ok(None)
    }

    /// Write an optional query into a request block.
    pub fn write(query: &Option<Self>, writer: StateWriter) -> Result<StateWriter, ProviderError> {
        let Some(query) = query else {
            return Ok(writer);
        };
        let key = query.kind().key();
        match query {
            RequestQuery::Metric(q) => Ok(writer.set_string(key, q)),
            RequestQuery::Apm(q)
            | RequestQuery::Log(q)
            | RequestQuery::Network(q)
            | RequestQuery::Rum(q)
            | RequestQuery::Security(q) => writer.block(key, &Some(q.clone())),
            RequestQuery::Process(q) => writer.block(key, &Some(q.clone())),
            RequestQuery::ApmStats(q) => writer.block(key, &Some(q.clone())),
        }
    }
}

/// Names of the queries set on a request block, among `kinds`.
pub fn queries_set(reader: &StateReader<'_>, kinds: &[QueryKind]) -> Vec<&'static str> {
    kinds
        .iter()
        .map(|k| k.key())
        .filter(|key| reader.is_set(key))
        .collect()
}

/// Events query over APM, logs, network, RUM or security data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogQuery {
    /// Index to query.
    pub index: String,
    /// Single aggregation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compute: Option<LogsCompute>,
    /// Several aggregations.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub multi_compute: Vec<LogsCompute>,
    /// Search filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<LogQuerySearch>,
    /// Grouping facets.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub group_by: Vec<LogQueryGroupBy>,
}

impl StateMapping for LogQuery {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        let compute = reader
            .map("compute")
            .and_then(|m| LogsCompute::from_map(&m));
        let search = reader.map("search").map(|m| LogQuerySearch {
            query: m.string("query").unwrap_or_default(),
        });

        Ok(Self {
            index: reader.required_string("index")?,
            compute,
            multi_compute: reader.parse_blocks("multi_compute")?,
            search,
            group_by: reader.parse_blocks("group_by")?,
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        let mut writer = StateWriter::new().set_string("index", &self.index);
        if let Some(compute) = &self.compute {
            writer = writer.value("compute", compute.to_map());
        }
        writer = writer.blocks("multi_compute", &self.multi_compute)?;
        if let Some(search) = &self.search {
            writer = writer.value(
                "search",
                StateWriter::new().set_string("query", &search.query).build(),
            );
        }
        Ok(writer.blocks("group_by", &self.group_by)?.build())
    }
}

/// One aggregation of an events query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogsCompute {
    /// Aggregation method, e.g. `count`.
    pub aggregation: String,
    /// Facet to aggregate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facet: Option<String>,
    /// Rollup interval in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<i64>,
}

impl LogsCompute {
    /// Read the map form used by `compute`, where every value is a string.
    ///
    /// Returns `None` when no aggregation is set.
    fn from_map(reader: &StateReader<'_>) -> Option<Self> {
        let aggregation = reader.string("aggregation")?;
        Some(Self {
            aggregation,
            facet: reader.string("facet"),
            interval: reader.int("interval"),
        })
    }

    fn to_map(&self) -> Value {
        StateWriter::new()
            .set_string("aggregation", &self.aggregation)
            .string("facet", &self.facet)
            .int_string("interval", self.interval)
            .build()
    }
}

impl StateMapping for LogsCompute {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            aggregation: reader.string("aggregation").unwrap_or_default(),
            facet: reader.string("facet"),
            interval: reader.nonzero_int("interval"),
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(StateWriter::new()
            .set_string("aggregation", &self.aggregation)
            .string("facet", &self.facet)
            .int("interval", self.interval)
            .build())
    }
}

/// Search filter of an events query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogQuerySearch {
    /// Search query.
    pub query: String,
}

/// Grouping of an events query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogQueryGroupBy {
    /// Facet name.
    pub facet: String,
    /// Maximum number of groups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    /// Group ordering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<LogQuerySort>,
}

impl StateMapping for LogQueryGroupBy {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        let sort = reader.map("sort").map(|m| LogQuerySort {
            aggregation: m.string("aggregation").unwrap_or_default(),
            order: m.string("order").unwrap_or_default(),
            facet: m.string("facet"),
        });
        Ok(Self {
            facet: reader.string("facet").unwrap_or_default(),
            limit: reader.nonzero_int("limit"),
            sort,
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        let mut writer = StateWriter::new()
            .set_string("facet", &self.facet)
            .int("limit", self.limit);
        if let Some(sort) = &self.sort {
            writer = writer.value(
                "sort",
                StateWriter::new()
                    .set_string("aggregation", &sort.aggregation)
                    .set_string("order", &sort.order)
                    .string("facet", &sort.facet)
                    .build(),
            );
        }
        Ok(writer.build())
    }
}

/// Ordering of grouped events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogQuerySort {
    /// Aggregation to sort by.
    pub aggregation: String,
    /// `asc` or `desc`.
    pub order: String,
    /// Facet to sort by.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facet: Option<String>,
}

/// Live process query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessQuery {
    /// Process metric.
    pub metric: String,
    /// Search term.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_by: Option<String>,
    /// Process filters.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filter_by: Vec<String>,
    /// Maximum number of processes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

impl StateMapping for ProcessQuery {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            metric: reader.required_string("metric")?,
            search_by: reader.string("search_by"),
            filter_by: reader.strings("filter_by"),
            limit: reader.nonzero_int("limit"),
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(StateWriter::new()
            .set_string("metric", &self.metric)
            .string("search_by", &self.search_by)
            .strings("filter_by", &self.filter_by)
            .int("limit", self.limit)
            .build())
    }
}

/// APM resource statistics query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApmStatsQuery {
    /// Service name.
    pub service: String,
    /// Operation name.
    pub name: String,
    /// Environment.
    pub env: String,
    /// Primary tag, e.g. `datacenter:us1`.
    pub primary_tag: String,
    /// One of `service`, `resource`, `span`.
    pub row_type: String,
    /// Resource name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    /// Column display settings.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<ApmStatsColumn>,
}

impl StateMapping for ApmStatsQuery {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            service: reader.required_string("service")?,
            name: reader.required_string("name")?,
            env: reader.required_string("env")?,
            primary_tag: reader.required_string("primary_tag")?,
            row_type: reader.required_string("row_type")?,
            resource: reader.string("resource"),
            columns: reader.parse_blocks("columns")?,
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(StateWriter::new()
            .set_string("service", &self.service)
            .set_string("name", &self.name)
            .set_string("env", &self.env)
            .set_string("primary_tag", &self.primary_tag)
            .set_string("row_type", &self.row_type)
            .string("resource", &self.resource)
            .blocks("columns", &self.columns)?
            .build())
    }
}

/// Display settings of one APM statistics column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApmStatsColumn {
    /// Column name.
    pub name: String,
    /// Display alias.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// `asc` or `desc`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    /// `number` or `bar`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cell_display_mode: Option<String>,
}

impl StateMapping for ApmStatsColumn {
    fn from_state(reader: &StateReader<'_>) -> Result<Self, ProviderError> {
        Ok(Self {
            name: reader.required_string("name")?,
            alias: reader.string("alias"),
            order: reader.string("order"),
            cell_display_mode: reader.string("cell_display_mode"),
        })
    }

    fn to_state(&self) -> Result<Value, ProviderError> {
        Ok(StateWriter::new()
            .set_string("name", &self.name)
            .string("alias", &self.alias)
            .string("order", &self.order)
            .string("cell_display_mode", &self.cell_display_mode)
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_follows_precedence() {
        let state = json!({
            "q": "",
            "log_query": [{"index": "main"}],
            "rum_query": [{"index": "rum"}]
        });
        let query = RequestQuery::read(&StateReader::new(&state), QueryKind::STANDARD)
            .unwrap()
            .unwrap();
        assert_eq!(query.kind(), QueryKind::Log);
    }

    #[test]
    fn test_read_ignores_kinds_not_offered() {
        let state = json!({"network_query": [{"index": "netflow"}]});
        let reader = StateReader::new(&state);

        assert!(RequestQuery::read(&reader, QueryKind::STANDARD)
            .unwrap()
            .is_none());
        let query = RequestQuery::read(&reader, QueryKind::TIMESERIES)
            .unwrap()
            .unwrap();
        assert_eq!(query.kind(), QueryKind::Network);
    }

    #[test]
    fn test_log_query_compute_interval_is_a_string_in_state() {
        let state = json!({
            "index": "main",
            "compute": {"aggregation": "count", "interval": "300"},
            "multi_compute": [{"aggregation": "avg", "facet": "@duration", "interval": 60}],
            "search": {"query": "status:error"},
            "group_by": [{"facet": "host", "limit": 10, "sort": {"aggregation": "count", "order": "desc"}}]
        });
        let query = LogQuery::from_state(&StateReader::new(&state)).unwrap();

        let api = serde_json::to_value(RequestQuery::Log(query.clone())).unwrap();
        assert_eq!(api["log_query"]["compute"]["interval"], json!(300));
        assert_eq!(api["log_query"]["multi_compute"][0]["interval"], json!(60));
        assert_eq!(api["log_query"]["group_by"][0]["sort"]["order"], json!("desc"));

        let flattened = query.to_state().unwrap();
        assert_eq!(flattened["compute"]["interval"], json!("300"));
        assert_eq!(flattened, state);
    }

    #[test]
    fn test_compute_without_aggregation_is_dropped() {
        let state = json!({"index": "main", "compute": {"facet": "host"}});
        let query = LogQuery::from_state(&StateReader::new(&state)).unwrap();
        assert!(query.compute.is_none());
    }

    #[test]
    fn test_apm_stats_query_requires_row_type() {
        let state = json!({
            "service": "web",
            "name": "rack.request",
            "env": "prod",
            "primary_tag": "datacenter:us1"
        });
        let err = ApmStatsQuery::from_state(&StateReader::new(&state)).unwrap_err();
        assert!(err.message().contains("row_type"));
    }

    #[test]
    fn test_queries_set_lists_every_configured_query() {
        let state = json!({"q": "avg:cpu{*}", "process_query": [{"metric": "cpu"}], "log_query": []});
        let set = queries_set(&StateReader::new(&state), QueryKind::STANDARD);
        assert_eq!(set, vec!["q", "process_query"]);
    }
}
