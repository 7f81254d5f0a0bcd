//! tvmaze_client - a small blocking client for the TVMaze REST API
//!
//! This library fetches shows, seasons, episodes, networks, webchannels and
//! the show update feed from <https://api.tvmaze.com> and hands back the JSON
//! it receives. Missing resources (HTTP 404) come back as `None` or as an
//! empty collection; everything else that goes wrong is a [`TvMazeError`].
//!
//! There is no caching, retrying or rate limiting. Callers that need those
//! build them around the client.
//!
//! # Examples
//!
//! ```no_run
//! use tvmaze_client::{TvMazeClient, UpdatePeriod};
//!
//! let client = TvMazeClient::from_env()?;
//!
//! // Walk the show index until a page comes back empty
//! let mut page = 0;
//! loop {
//!     let shows = client.shows_page(page)?;
//!     if shows.is_empty() {
//!         break;
//!     }
//!     println!("page {}: {} shows", page, shows.len());
//!     page += 1;
//! }
//!
//! let updates = client.show_updates(UpdatePeriod::Day)?;
//! println!("{} shows changed today", updates.len());
//! # Ok::<(), tvmaze_client::TvMazeError>(())
//! ```

mod config;
mod tvmaze;

pub use config::{BASE_URL_ENV, ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, TIMEOUT_ENV};
pub use tvmaze::{
    Embed, Episode, HttpResponse, HttpTransport, Network, ReqwestTransport, Season, Show,
    ShowUpdates, TransportError, TvMazeClient, TvMazeError, UpdatePeriod, Webchannel,
};
