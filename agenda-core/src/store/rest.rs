//! REST datastore client (PostgREST dialect).

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use super::{EventStore, FeedMode};
use crate::error::{AgendaError, AgendaResult};
use crate::event::EventRow;
use crate::registration::{Registration, RegistrationFilter};

const REGISTRATION_COLUMNS: &str = "event_id,name,email,phone,status,created_at,events(title)";

/// Error body returned by the REST endpoint.
#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct RestStore {
    client: reqwest::Client,
    rest_url: Url,
    api_key: String,
}

impl RestStore {
    /// `datastore_url` is the project root; tables are served under `/rest/v1/`.
    pub fn new(datastore_url: &str, api_key: impl Into<String>) -> AgendaResult<Self> {
        let root = format!("{}/", datastore_url.trim_end_matches('/'));
        let rest_url = Url::parse(&root)
            .and_then(|url| url.join("rest/v1/"))
            .map_err(|e| AgendaError::Config(format!("Invalid datastore URL '{datastore_url}': {e}")))?;

        Ok(RestStore {
            client: reqwest::Client::new(),
            rest_url,
            api_key: api_key.into(),
        })
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> AgendaResult<Vec<T>> {
        let url = self
            .rest_url
            .join(table)
            .map_err(|e| AgendaError::Config(format!("Invalid table name '{table}': {e}")))?;

        debug!(table, ?query, "Querying datastore");

        let response = self
            .client
            .get(url)
            .query(query)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            warn!(table, %status, %message, "Datastore request failed");
            return Err(AgendaError::Store(message));
        }

        Ok(response.json::<Vec<T>>().await?)
    }

    async fn find_by(&self, column: &str, key: &str) -> AgendaResult<Option<EventRow>> {
        let rows: Vec<EventRow> = self
            .select(
                "events",
                &[
                    ("select", EventRow::COLUMNS.to_string()),
                    (column, format!("eq.{key}")),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }
}

/// Quote a value for use inside an `or=(...)` filter.
fn quote_filter_value(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

#[async_trait]
impl EventStore for RestStore {
    async fn find_event(&self, key: &str) -> AgendaResult<Option<EventRow>> {
        if let Some(row) = self.find_by("slug", key).await? {
            return Ok(Some(row));
        }

        // A slug-shaped key against a typed id column is rejected by the
        // datastore; that only means there is no such id.
        match self.find_by("id", key).await {
            Ok(row) => Ok(row),
            Err(AgendaError::Store(message)) => {
                debug!(key, %message, "Lookup by id failed, treating as not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn list_events(&self, mode: FeedMode, limit: usize) -> AgendaResult<Vec<EventRow>> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let direction = if mode.ascending() { "asc" } else { "desc" };

        let mut query = vec![("select", EventRow::COLUMNS.to_string())];
        match mode {
            FeedMode::Upcoming => query.push(("starts_at", format!("gte.{now}"))),
            FeedMode::Past => query.push(("starts_at", format!("lt.{now}"))),
            FeedMode::All => {}
        }
        query.push(("order", format!("starts_at.{direction}")));
        query.push(("limit", limit.to_string()));

        self.select("events", &query).await
    }

    async fn list_registrations(
        &self,
        filter: &RegistrationFilter,
    ) -> AgendaResult<Vec<Registration>> {
        let mut query = vec![("select", REGISTRATION_COLUMNS.to_string())];
        if let Some(event_id) = filter.event_id() {
            query.push(("event_id", format!("eq.{event_id}")));
        }
        if let Some(status) = filter.status {
            query.push(("status", format!("eq.{status}")));
        }
        if let Some(q) = filter.query() {
            let pattern = quote_filter_value(&format!("*{q}*"));
            query.push((
                "or",
                format!("(name.ilike.{pattern},email.ilike.{pattern},phone.ilike.{pattern})"),
            ));
        }
        query.push(("order", "created_at.desc".to_string()));

        self.select("registrations", &query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventId;
    use crate::registration::RegistrationStatus;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn event_json(id: i64, slug: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "slug": slug,
            "title": "Gamelan Night",
            "starts_at": "2025-03-01T10:00:00+00:00",
            "ends_at": null,
            "location": null,
            "location_name": "Town Square",
            "address": null,
            "description": null
        })
    }

    #[tokio::test]
    async fn test_find_event_by_slug_sends_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/events"))
            .and(query_param("slug", "eq.gamelan-night"))
            .and(header("apikey", "anon-key"))
            .and(header("authorization", "Bearer anon-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([event_json(42, "gamelan-night")])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = RestStore::new(&server.uri(), "anon-key").unwrap();
        let row = store.find_event("gamelan-night").await.unwrap().unwrap();

        assert_eq!(row.id, Some(EventId::from(42)));
        assert_eq!(row.resolved_location(), Some("Town Square"));
    }

    #[tokio::test]
    async fn test_find_event_falls_back_to_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/events"))
            .and(query_param("slug", "eq.42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/events"))
            .and(query_param("id", "eq.42"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([event_json(42, "gamelan-night")])),
            )
            .mount(&server)
            .await;

        let store = RestStore::new(&server.uri(), "anon-key").unwrap();
        let row = store.find_event("42").await.unwrap().unwrap();
        assert_eq!(row.slug.as_deref(), Some("gamelan-night"));
    }

    #[tokio::test]
    async fn test_find_event_id_type_error_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/events"))
            .and(query_param("slug", "eq.nope"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/events"))
            .and(query_param("id", "eq.nope"))
            .respond_with(ResponseTemplate::new(400).set_body_json(
                serde_json::json!({"message": "invalid input syntax for type bigint: \"nope\""}),
            ))
            .mount(&server)
            .await;

        let store = RestStore::new(&server.uri(), "anon-key").unwrap();
        assert!(store.find_event("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_upcoming_orders_ascending() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/events"))
            .and(query_param("order", "starts_at.asc"))
            .and(query_param("limit", "500"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                event_json(1, "a"),
                event_json(2, "b")
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let store = RestStore::new(&server.uri(), "anon-key").unwrap();
        let rows = store.list_events(FeedMode::Upcoming, 500).await.unwrap();
        assert_eq!(rows.len(), 2);

        let requests = server.received_requests().await.unwrap();
        let starts_filter = requests[0]
            .url
            .query_pairs()
            .find(|(k, _)| k == "starts_at")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert!(starts_filter.starts_with("gte."), "Got {starts_filter}");
    }

    #[tokio::test]
    async fn test_list_all_has_no_time_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/events"))
            .and(query_param("order", "starts_at.desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let store = RestStore::new(&format!("{}/", server.uri()), "anon-key").unwrap();
        store.list_events(FeedMode::All, 500).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert!(!requests[0].url.query_pairs().any(|(k, _)| k == "starts_at"));
    }

    #[tokio::test]
    async fn test_server_error_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(serde_json::json!({"message": "relation does not exist"})),
            )
            .mount(&server)
            .await;

        let store = RestStore::new(&server.uri(), "anon-key").unwrap();
        match store.list_events(FeedMode::Past, 500).await {
            Err(AgendaError::Store(message)) => assert_eq!(message, "relation does not exist"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_registrations_builds_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/registrations"))
            .and(query_param("event_id", "eq.7"))
            .and(query_param("status", "eq.checked_in"))
            .and(query_param(
                "or",
                "(name.ilike.\"*sari*\",email.ilike.\"*sari*\",phone.ilike.\"*sari*\")",
            ))
            .and(query_param("order", "created_at.desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
                "event_id": 7,
                "name": "Sari",
                "email": "sari@example.org",
                "phone": null,
                "status": "checked_in",
                "created_at": "2025-02-01T09:00:00+00:00",
                "events": {"title": "Gamelan Night"}
            }])))
            .expect(1)
            .mount(&server)
            .await;

        let store = RestStore::new(&server.uri(), "anon-key").unwrap();
        let filter = RegistrationFilter {
            event_id: Some("7".to_string()),
            status: Some(RegistrationStatus::CheckedIn),
            query: Some(" sari ".to_string()),
        };
        let rows = store.list_registrations(&filter).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].event_title(), "Gamelan Night");
    }

    #[test]
    fn test_quote_filter_value() {
        assert_eq!(quote_filter_value("*a,b*"), "\"*a,b*\"");
        assert_eq!(quote_filter_value("say \"hi\""), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn test_invalid_datastore_url() {
        assert!(matches!(
            RestStore::new("not a url", "key"),
            Err(AgendaError::Config(_))
        ));
    }
}
