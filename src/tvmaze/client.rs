/// TVMaze API client implementation.
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use super::transport::{HttpTransport, ReqwestTransport};
use super::types::{
    Embed, Episode, Network, Season, Show, ShowUpdates, UpdatePeriod, Webchannel,
};
use super::TvMazeError;
use crate::config::ClientConfig;

/// Path of the show update feed
const UPDATES_PATH: &str = "/updates/shows";

/// Number of body characters kept in decode errors
const SNIPPET_LEN: usize = 200;

/// Blocking client for the TVMaze REST API.
///
/// Each operation issues exactly one GET request and returns the decoded JSON
/// body. A 404 from the API is reported as `None` for single lookups and as an
/// empty collection for lists, so callers can page or probe IDs until nothing
/// comes back. There is no retry and no rate limiting.
///
/// # Examples
///
/// ```no_run
/// use tvmaze_client::TvMazeClient;
///
/// let client = TvMazeClient::new()?;
/// if let Some(show) = client.show(1)? {
///     println!("{}", show["name"]);
/// }
/// # Ok::<(), tvmaze_client::TvMazeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct TvMazeClient<T = ReqwestTransport> {
    transport: T,
    base_url: String,
}

impl TvMazeClient<ReqwestTransport> {
    /// Creates a client for the public TVMaze API with default settings.
    pub fn new() -> Result<Self, TvMazeError> {
        Self::with_config(&ClientConfig::default())
    }

    /// Creates a client configured from `TVMAZE_API_*` environment variables.
    pub fn from_env() -> Result<Self, TvMazeError> {
        Self::with_config(&ClientConfig::from_env()?)
    }

    /// Creates a client using reqwest with the given configuration.
    pub fn with_config(config: &ClientConfig) -> Result<Self, TvMazeError> {
        let transport = ReqwestTransport::new(config)?;
        Self::with_transport(config, transport)
    }
}

impl<T: HttpTransport> TvMazeClient<T> {
    /// Creates a client sending its requests through `transport`.
    ///
    /// Only the base URL of `config` is used here; timeout and user agent are
    /// the transport's business.
    pub fn with_transport(config: &ClientConfig, transport: T) -> Result<Self, TvMazeError> {
        let base_url = config.normalized_base_url()?;
        info!("TVMaze client initialized: base_url={}", base_url);

        Ok(Self {
            transport,
            base_url,
        })
    }

    /// The base URL endpoint paths are appended to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches one page of the show index.
    ///
    /// Pages are zero-based. A page past the end of the index yields an empty
    /// vector.
    pub fn shows_page(&self, page: u32) -> Result<Vec<Show>, TvMazeError> {
        info!("Fetching shows page {}", page);
        let page = page.to_string();
        let shows: Option<Vec<Show>> = self.fetch("/shows", &[("page", page.as_str())])?;
        Ok(shows.unwrap_or_default())
    }

    /// Fetches a show by ID, or `None` if it does not exist.
    pub fn show(&self, show_id: u32) -> Result<Option<Show>, TvMazeError> {
        self.show_with_embeds(show_id, &[])
    }

    /// Fetches a show by ID with related resources embedded under `_embedded`.
    pub fn show_with_embeds(
        &self,
        show_id: u32,
        embeds: &[Embed],
    ) -> Result<Option<Show>, TvMazeError> {
        require_positive_id("show", show_id)?;
        info!(
            "Fetching details for show ID {} with embeds: {:?}",
            show_id, embeds
        );

        let query: Vec<(&str, &str)> = embeds.iter().map(|e| ("embed[]", e.as_str())).collect();
        self.fetch(&format!("/shows/{}", show_id), &query)
    }

    /// Fetches all seasons of a show, in season order.
    pub fn seasons(&self, show_id: u32) -> Result<Vec<Season>, TvMazeError> {
        require_positive_id("show", show_id)?;
        info!("Fetching seasons for show ID {}", show_id);
        let seasons: Option<Vec<Season>> = self.fetch(&format!("/shows/{}/seasons", show_id), &[])?;
        Ok(seasons.unwrap_or_default())
    }

    /// Fetches all episodes of a show, in airing order.
    pub fn episodes(&self, show_id: u32) -> Result<Vec<Episode>, TvMazeError> {
        require_positive_id("show", show_id)?;
        info!("Fetching episodes for show ID {}", show_id);
        let episodes: Option<Vec<Episode>> = self.fetch(&format!("/shows/{}/episodes", show_id), &[])?;
        Ok(episodes.unwrap_or_default())
    }

    /// Fetches a network by ID, or `None` if it does not exist.
    pub fn network(&self, network_id: u32) -> Result<Option<Network>, TvMazeError> {
        require_positive_id("network", network_id)?;
        info!("Fetching network details for ID {}", network_id);
        self.fetch(&format!("/networks/{}", network_id), &[])
    }

    /// Fetches a webchannel by ID, or `None` if it does not exist.
    pub fn webchannel(&self, webchannel_id: u32) -> Result<Option<Webchannel>, TvMazeError> {
        require_positive_id("webchannel", webchannel_id)?;
        info!("Fetching webchannel details for ID {}", webchannel_id);
        self.fetch(&format!("/webchannels/{}", webchannel_id), &[])
    }

    /// Fetches the IDs of shows updated within `period`, mapped to their
    /// last-updated Unix timestamp.
    ///
    /// Entries whose timestamp is not an integer are skipped.
    pub fn show_updates(&self, period: UpdatePeriod) -> Result<ShowUpdates, TvMazeError> {
        info!("Fetching show updates since last {}", period);

        let updates: Option<Map<String, Value>> =
            self.fetch(UPDATES_PATH, &[("since", period.as_str())])?;
        let Some(updates) = updates else {
            return Ok(ShowUpdates::new());
        };

        let total = updates.len();
        let valid: ShowUpdates = updates
            .into_iter()
            .filter_map(|(show_id, timestamp)| timestamp.as_i64().map(|ts| (show_id, ts)))
            .collect();

        if valid.len() != total {
            warn!(
                "Ignored {} show update(s) with non-integer timestamps since last {}",
                total - valid.len(),
                period
            );
        }
        info!("Obtained {} show updates since last {}", valid.len(), period);

        Ok(valid)
    }

    /// Same as [`show_updates`](Self::show_updates), taking the period as its
    /// wire token (`day`, `week` or `month`).
    ///
    /// An unknown token fails with `TvMazeError::InvalidArgument` before any
    /// request is made.
    pub fn show_updates_since(&self, period: &str) -> Result<ShowUpdates, TvMazeError> {
        let period = period.parse::<UpdatePeriod>().inspect_err(|e| error!("{}", e))?;
        self.show_updates(period)
    }

    /// Issues a GET for `path` and decodes the body.
    ///
    /// Returns `Ok(None)` on 404.
    fn fetch<D>(&self, path: &str, query: &[(&str, &str)]) -> Result<Option<D>, TvMazeError>
    where
        D: DeserializeOwned,
    {
        let url = self.endpoint_url(path, query)?;
        debug!("Making API request: GET {}", url);

        let response = self
            .transport
            .get(&url)
            .map_err(|source| {
                error!("API request failed for {}: {}", url, source);
                TvMazeError::Transport {
                    url: url.clone(),
                    source,
                }
            })?;

        if response.status == 404 {
            if path == UPDATES_PATH {
                info!(
                    "API returned 404 Not Found for {}. This might indicate no updates for the requested period.",
                    url
                );
            } else {
                info!("API returned 404 Not Found for {}", url);
            }
            return Ok(None);
        }

        if !(200..300).contains(&response.status) {
            error!("API request failed for {}: HTTP {}", url, response.status);
            return Err(TvMazeError::Request {
                url,
                status: response.status,
                body: String::from_utf8_lossy(&response.body).into_owned(),
            });
        }

        serde_json::from_slice(&response.body)
            .map(Some)
            .map_err(|source| {
                let snippet: String = String::from_utf8_lossy(&response.body)
                    .chars()
                    .take(SNIPPET_LEN)
                    .collect();
                error!(
                    "Failed to decode JSON from {}: {}. Response text: {}",
                    url, source, snippet
                );
                TvMazeError::Decode {
                    url,
                    snippet,
                    source,
                }
            })
    }

    /// Joins the base URL, `path` and the url-encoded `query`.
    fn endpoint_url(&self, path: &str, query: &[(&str, &str)]) -> Result<String, TvMazeError> {
        let mut url = reqwest::Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| TvMazeError::InvalidConfig(format!("invalid endpoint URL: {}", e)))?;

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        Ok(url.into())
    }
}

/// Rejects ID 0, which the API never assigns.
fn require_positive_id(kind: &str, id: u32) -> Result<(), TvMazeError> {
    if id == 0 {
        return Err(TvMazeError::InvalidArgument(format!(
            "{} id must be a positive integer",
            kind
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tvmaze::{HttpResponse, TransportError};
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::HashMap;

    const BASE: &str = "https://mockapi.test";
    const NOT_FOUND_BODY: &str = r#"{"name":"Not Found","message":"","code":0,"status":404}"#;

    /// Answers from a URL -> response table and records every URL requested.
    #[derive(Default)]
    struct MockTransport {
        routes: HashMap<String, HttpResponse>,
        fallback: Option<HttpResponse>,
        failure: Option<String>,
        requests: RefCell<Vec<String>>,
    }

    impl MockTransport {
        fn new() -> Self {
            Self::default()
        }

        fn route(mut self, path_and_query: &str, status: u16, body: &str) -> Self {
            self.routes.insert(
                format!("{}{}", BASE, path_and_query),
                HttpResponse::new(status, body),
            );
            self
        }

        fn always(status: u16, body: &str) -> Self {
            Self {
                fallback: Some(HttpResponse::new(status, body)),
                ..Self::default()
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                failure: Some(message.to_string()),
                ..Self::default()
            }
        }

        fn requests(&self) -> Vec<String> {
            self.requests.borrow().clone()
        }
    }

    impl HttpTransport for MockTransport {
        fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
            self.requests.borrow_mut().push(url.to_string());

            if let Some(message) = &self.failure {
                return Err(TransportError::Other(message.clone()));
            }

            Ok(self
                .routes
                .get(url)
                .or(self.fallback.as_ref())
                .cloned()
                .unwrap_or_else(|| HttpResponse::new(404, NOT_FOUND_BODY)))
        }
    }

    fn client(transport: &MockTransport) -> TvMazeClient<&MockTransport> {
        let config = ClientConfig::default().with_base_url(BASE);
        TvMazeClient::with_transport(&config, transport).unwrap()
    }

    #[test]
    fn test_show_found() {
        let transport = MockTransport::new().route(
            "/shows/1",
            200,
            r#"{"id":1,"name":"Under the Dome"}"#,
        );

        let show = client(&transport).show(1).unwrap().unwrap();

        assert_eq!(show["id"], json!(1));
        assert_eq!(show["name"], json!("Under the Dome"));
        assert_eq!(transport.requests(), vec!["https://mockapi.test/shows/1"]);
    }

    #[test]
    fn test_show_id_matches_request() {
        let mut transport = MockTransport::new();
        for id in [1, 2, 82, 169] {
            transport = transport.route(
                &format!("/shows/{}", id),
                200,
                &format!(r#"{{"id":{},"name":"Show {}"}}"#, id, id),
            );
        }
        let client = client(&transport);

        for id in [1u32, 2, 82, 169] {
            let show = client.show(id).unwrap().unwrap();
            assert_eq!(show["id"], json!(id));
        }
    }

    #[test]
    fn test_show_not_found_is_none() {
        let transport = MockTransport::new().route(
            "/shows/1",
            200,
            r#"{"id":1,"name":"Under the Dome"}"#,
        );

        assert!(client(&transport).show(999999).unwrap().is_none());
    }

    #[test]
    fn test_show_with_embeds_encodes_query() {
        let transport = MockTransport::always(
            200,
            r#"{"id":101,"_embedded":{"seasons":[],"episodes":[]}}"#,
        );

        let show = client(&transport)
            .show_with_embeds(101, &[Embed::Seasons, Embed::Episodes])
            .unwrap()
            .unwrap();

        assert_eq!(show["_embedded"]["seasons"], json!([]));
        assert_eq!(
            transport.requests(),
            vec!["https://mockapi.test/shows/101?embed%5B%5D=seasons&embed%5B%5D=episodes"]
        );
    }

    #[test]
    fn test_zero_ids_rejected_without_request() {
        let transport = MockTransport::always(200, "{}");
        let client = client(&transport);

        assert!(matches!(client.show(0), Err(TvMazeError::InvalidArgument(_))));
        assert!(matches!(client.seasons(0), Err(TvMazeError::InvalidArgument(_))));
        assert!(matches!(client.episodes(0), Err(TvMazeError::InvalidArgument(_))));
        assert!(matches!(client.network(0), Err(TvMazeError::InvalidArgument(_))));
        assert!(matches!(client.webchannel(0), Err(TvMazeError::InvalidArgument(_))));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_shows_page() {
        let transport = MockTransport::new().route(
            "/shows?page=0",
            200,
            r#"[{"id":1,"name":"Under the Dome"},{"id":2,"name":"Person of Interest"}]"#,
        );

        let shows = client(&transport).shows_page(0).unwrap();

        assert_eq!(shows.len(), 2);
        assert_eq!(shows[0]["id"], json!(1));
        assert_eq!(shows[1]["name"], json!("Person of Interest"));
    }

    #[test]
    fn test_shows_page_past_end_is_empty() {
        let transport = MockTransport::new().route("/shows?page=0", 200, r#"[{"id":1}]"#);

        let shows = client(&transport).shows_page(400).unwrap();

        assert!(shows.is_empty());
        assert_eq!(transport.requests(), vec!["https://mockapi.test/shows?page=400"]);
    }

    #[test]
    fn test_seasons_and_episodes() {
        let transport = MockTransport::new()
            .route("/shows/1/seasons", 200, r#"[{"id":1,"number":1},{"id":2,"number":2}]"#)
            .route("/shows/1/episodes", 200, r#"[{"id":10,"season":1,"number":1}]"#);
        let client = client(&transport);

        let seasons = client.seasons(1).unwrap();
        assert_eq!(seasons.len(), 2);
        assert_eq!(seasons[1]["number"], json!(2));

        let episodes = client.episodes(1).unwrap();
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0]["id"], json!(10));
    }

    #[test]
    fn test_seasons_and_episodes_empty_when_missing() {
        let transport = MockTransport::new().route("/shows/5/seasons", 200, "[]");
        let client = client(&transport);

        assert!(client.seasons(5).unwrap().is_empty());
        assert!(client.episodes(5).unwrap().is_empty());
    }

    #[test]
    fn test_network_and_webchannel() {
        let transport = MockTransport::new()
            .route("/networks/2", 200, r#"{"id":2,"name":"CBS"}"#)
            .route("/webchannels/1", 200, r#"{"id":1,"name":"Netflix"}"#);
        let client = client(&transport);

        assert_eq!(client.network(2).unwrap().unwrap()["name"], json!("CBS"));
        assert_eq!(
            client.webchannel(1).unwrap().unwrap()["name"],
            json!("Netflix")
        );
        assert!(client.network(3).unwrap().is_none());
        assert!(client.webchannel(3).unwrap().is_none());
    }

    #[test]
    fn test_show_updates_day() {
        let transport =
            MockTransport::new().route("/updates/shows?since=day", 200, r#"{"1": 1700000000}"#);

        let updates = client(&transport).show_updates(UpdatePeriod::Day).unwrap();

        assert_eq!(updates.len(), 1);
        assert_eq!(updates.get("1"), Some(&1700000000));
    }

    #[test]
    fn test_show_updates_since_token() {
        let transport = MockTransport::new().route(
            "/updates/shows?since=week",
            200,
            r#"{"1": 1700000000, "7": 1700000500}"#,
        );

        let updates = client(&transport).show_updates_since("week").unwrap();

        assert_eq!(updates.get("7"), Some(&1700000500));
    }

    #[test]
    fn test_show_updates_rejects_unknown_period_without_request() {
        let transport = MockTransport::always(200, "{}");

        let result = client(&transport).show_updates_since("century");

        assert!(matches!(result, Err(TvMazeError::InvalidArgument(_))));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_show_updates_skips_non_integer_timestamps() {
        let transport = MockTransport::new().route(
            "/updates/shows?since=month",
            200,
            r#"{"1": 1700000000, "2": "soon", "3": null, "4": 1.5}"#,
        );

        let updates = client(&transport).show_updates(UpdatePeriod::Month).unwrap();

        assert_eq!(updates.len(), 1);
        assert_eq!(updates.get("1"), Some(&1700000000));
    }

    #[test]
    fn test_show_updates_not_found_is_empty() {
        let transport = MockTransport::new();

        assert!(client(&transport)
            .show_updates(UpdatePeriod::Day)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_server_error_fails_every_lookup() {
        let transport = MockTransport::always(500, "Internal Server Error");
        let client = client(&transport);

        let results = [
            client.shows_page(0).map(|_| ()),
            client.show(1).map(|_| ()),
            client.seasons(1).map(|_| ()),
            client.episodes(1).map(|_| ()),
            client.network(1).map(|_| ()),
            client.webchannel(1).map(|_| ()),
            client.show_updates(UpdatePeriod::Day).map(|_| ()),
        ];

        for result in results {
            match result {
                Err(TvMazeError::Request { status, body, .. }) => {
                    assert_eq!(status, 500);
                    assert_eq!(body, "Internal Server Error");
                }
                other => panic!("expected a request error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_rate_limited_is_request_error() {
        let transport = MockTransport::always(429, "Too Many Requests");

        let error = client(&transport).show(1).unwrap_err();

        assert_eq!(error.status(), Some(429));
        assert!(error.is_rate_limited());
    }

    #[test]
    fn test_malformed_json_is_decode_error() {
        let transport = MockTransport::always(200, "invalid json");

        match client(&transport).show(1) {
            Err(TvMazeError::Decode { url, snippet, .. }) => {
                assert_eq!(url, "https://mockapi.test/shows/1");
                assert_eq!(snippet, "invalid json");
            }
            other => panic!("expected a decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_error_snippet_is_truncated() {
        let body = "x".repeat(1000);
        let transport = MockTransport::always(200, &body);

        match client(&transport).shows_page(0) {
            Err(TvMazeError::Decode { snippet, .. }) => assert_eq!(snippet.len(), 200),
            other => panic!("expected a decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_unexpected_shape_is_decode_error() {
        let transport = MockTransport::new()
            .route("/shows?page=3", 200, r#"{"unexpected":"dict"}"#)
            .route("/shows/103", 200, r#"["list"]"#)
            .route("/updates/shows?since=day", 200, "[1, 2]");
        let client = client(&transport);

        assert!(matches!(client.shows_page(3), Err(TvMazeError::Decode { .. })));
        assert!(matches!(client.show(103), Err(TvMazeError::Decode { .. })));
        assert!(matches!(
            client.show_updates(UpdatePeriod::Day),
            Err(TvMazeError::Decode { .. })
        ));
    }

    #[test]
    fn test_transport_failure_is_transport_error() {
        let transport = MockTransport::failing("connection refused");

        match client(&transport).network(1) {
            Err(TvMazeError::Transport { url, source }) => {
                assert_eq!(url, "https://mockapi.test/networks/1");
                assert_eq!(source.to_string(), "connection refused");
            }
            other => panic!("expected a transport error, got {:?}", other),
        }
    }

    #[test]
    fn test_base_url_with_path_prefix() {
        let transport = MockTransport::always(200, r#"{"id":1}"#);
        let config = ClientConfig::default().with_base_url("http://127.0.0.1:9000/tvmaze/");
        let client = TvMazeClient::with_transport(&config, &transport).unwrap();

        client.show(1).unwrap();

        assert_eq!(client.base_url(), "http://127.0.0.1:9000/tvmaze");
        assert_eq!(
            transport.requests(),
            vec!["http://127.0.0.1:9000/tvmaze/shows/1"]
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let transport = MockTransport::new();
        let config = ClientConfig::default().with_base_url("not a url");

        assert!(matches!(
            TvMazeClient::with_transport(&config, &transport),
            Err(TvMazeError::InvalidConfig(_))
        ));
    }
}
