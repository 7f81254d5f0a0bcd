/// TVMaze resource types.
///
/// Catalog entities are passed through exactly as the API returns them, so
/// they are plain JSON objects rather than typed structs.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::TvMazeError;

/// A show as returned by `/shows/{id}` or an entry of `/shows?page=N`
pub type Show = Map<String, Value>;

/// A season as returned by `/shows/{id}/seasons`
pub type Season = Map<String, Value>;

/// An episode as returned by `/shows/{id}/episodes`
pub type Episode = Map<String, Value>;

/// A network as returned by `/networks/{id}`
pub type Network = Map<String, Value>;

/// A webchannel as returned by `/webchannels/{id}`
pub type Webchannel = Map<String, Value>;

/// Show ID (as the decimal string key the API uses) to last-updated Unix timestamp
pub type ShowUpdates = HashMap<String, i64>;

/// Time window of the show update feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdatePeriod {
    /// Shows updated in the last 24 hours
    Day,
    /// Shows updated in the last week
    Week,
    /// Shows updated in the last month
    Month,
}

impl UpdatePeriod {
    /// All supported periods
    pub const ALL: [UpdatePeriod; 3] = [UpdatePeriod::Day, UpdatePeriod::Week, UpdatePeriod::Month];

    /// The value sent as the `since` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdatePeriod::Day => "day",
            UpdatePeriod::Week => "week",
            UpdatePeriod::Month => "month",
        }
    }
}

impl fmt::Display for UpdatePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpdatePeriod {
    type Err = TvMazeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UpdatePeriod::ALL
            .into_iter()
            .find(|period| period.as_str() == s)
            .ok_or_else(|| {
                TvMazeError::InvalidArgument(format!(
                    "unsupported update period '{}', expected one of: day, week, month",
                    s
                ))
            })
    }
}

/// Related resources that can be embedded in a show lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Embed {
    Seasons,
    Episodes,
    Cast,
    Crew,
    NextEpisode,
    PreviousEpisode,
    Images,
    Akas,
}

impl Embed {
    /// The value sent as an `embed[]` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Embed::Seasons => "seasons",
            Embed::Episodes => "episodes",
            Embed::Cast => "cast",
            Embed::Crew => "crew",
            Embed::NextEpisode => "nextepisode",
            Embed::PreviousEpisode => "previousepisode",
            Embed::Images => "images",
            Embed::Akas => "akas",
        }
    }
}

impl fmt::Display for Embed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
