pub const API_BASE: &str = "https://hn.algolia.com/api/v1";

const PARAM_SEARCH: &str = "query=";

// How many recent-search buttons to offer at most
const LAST_SEARCHES_CAP: usize = 5;

pub fn build_search_url(term: &str, page: u32) -> String {
    format!(
        "{API_BASE}/search?{PARAM_SEARCH}{}&page={page}",
        urlencoding::encode(term)
    )
}

// Recovers the decoded search term from a request URL. Inverse of
// `build_search_url` for the query parameter.
pub fn extract_search_term(url: &str) -> String {
    let Some(start) = url.find(PARAM_SEARCH) else {
        return String::new();
    };
    let rest = &url[start + PARAM_SEARCH.len()..];
    let raw = rest.split('&').next().unwrap_or(rest);
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}

// Derives the recent-searches strip from the ordered URL history:
// adjacent repeats collapse, then the newest entry is dropped because it
// is the search currently on screen.
pub fn last_searches(urls: &[String]) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for url in urls {
        let term = extract_search_term(url);
        if terms.last() != Some(&term) {
            terms.push(term);
        }
    }

    let start = terms.len().saturating_sub(LAST_SEARCHES_CAP + 1);
    let mut recent = terms.split_off(start);
    recent.pop();
    recent
}
