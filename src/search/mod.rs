use regex::Regex;

use crate::models::JobListing;

/// Accepted shape for a human relative-date phrase: "1 day ago",
/// "2 weeks ago", "2 hours" and so on.
const DATE_PHRASE_PATTERN: &str = r"(?i)^(\d+)\s+(minute|hour|day|week|month)s?(\s+ago)?$";

/// One of the five search modes over a loaded collection.
#[derive(Debug, Clone)]
pub enum SearchQuery {
    /// Case-insensitive substring match against the title
    Title(String),
    /// Case-insensitive substring match against the location
    Location(String),
    /// Case-insensitive substring match against the posting company
    Poster(String),
    /// Exact match against the stored compact date token (`2h`, `1d`, `3mo`);
    /// holds an already-normalized token, see [`normalize_date_phrase`]
    DatePosted(String),
    /// "I feel lucky": all four criteria at once
    Lucky {
        title: String,
        location: String,
        poster: String,
        date_token: String,
    },
}

/// Filter a collection, preserving its order.
pub fn search<'a>(jobs: &'a [JobListing], query: &SearchQuery) -> Vec<&'a JobListing> {
    jobs.iter().filter(|job| matches(job, query)).collect()
}

fn matches(job: &JobListing, query: &SearchQuery) -> bool {
    match query {
        SearchQuery::Title(title) => contains_ci(&job.title, title),
        SearchQuery::Location(location) => contains_ci(&job.location, location),
        SearchQuery::Poster(poster) => contains_ci(&job.poster, poster),
        SearchQuery::DatePosted(token) => date_matches(&job.date_posted, token),
        SearchQuery::Lucky {
            title,
            location,
            poster,
            date_token,
        } => {
            contains_ci(&job.title, title)
                && contains_ci(&job.location, location)
                && contains_ci(&job.poster, poster)
                && date_matches(&job.date_posted, date_token)
        }
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn date_matches(stored: &str, token: &str) -> bool {
    stored.to_lowercase() == token.to_lowercase()
}

/// Turn a human phrase into the compact token the scrape stores.
///
/// "2 weeks ago" -> "2w", "1 hour" -> "1h", "3 months ago" -> "3mo".
/// Every unit maps to its first letter except month, which keeps two
/// letters so it stays distinct from minute. Returns `None` for anything
/// outside the accepted shape; callers must reject that input instead of
/// searching.
pub fn normalize_date_phrase(phrase: &str) -> Option<String> {
    let re = Regex::new(DATE_PHRASE_PATTERN).unwrap();
    let caps = re.captures(phrase.trim())?;
    let count = &caps[1];
    let unit = caps[2].to_lowercase();
    let code = if unit == "month" { "mo" } else { &unit[..1] };
    Some(format!("{count}{code}"))
}

/// Expand a stored compact token for display: "2h" -> "2 hour(s) ago".
/// Anything that isn't a token (the date sentinel included) passes through
/// unchanged.
pub fn expand_date_token(token: &str) -> String {
    let re = Regex::new(r"^(\d+)\s*([a-z]+)$").unwrap();
    let lowered = token.trim().to_lowercase();
    let Some(caps) = re.captures(&lowered) else {
        return token.to_string();
    };
    let count = caps[1].to_string();
    let unit = match &caps[2] {
        "m" => "minute(s)",
        "h" => "hour(s)",
        "d" => "day(s)",
        "w" => "week(s)",
        "mo" => "month(s)",
        _ => return token.to_string(),
    };
    format!("{count} {unit} ago")
}
