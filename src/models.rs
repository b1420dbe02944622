use serde::{Deserialize, Deserializer};

// A single search hit from the Algolia Hacker News API. Some record kinds
// come back with null url/title, so those fields fall back to defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Story {
    #[serde(rename = "objectID")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_default")]
    pub author: String,
    #[serde(default, deserialize_with = "null_default")]
    pub num_comments: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub points: i64,
}

// One page of search results as returned by GET /search
#[derive(Debug, Clone, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub hits: Vec<Story>,
    #[serde(default)]
    pub page: u32,
}

fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
