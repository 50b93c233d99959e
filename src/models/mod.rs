use serde::{Deserialize, Serialize};

/// Sentinel values used when a listing card is missing the matching element.
/// Consumers of the saved JSON rely on these exact strings.
pub const NO_TITLE: &str = "No title provided";
pub const NO_LINK: &str = "No link available";
pub const NO_LOCATION: &str = "No location provided";
pub const NO_SALARY: &str = "Confidential / Not provided";
pub const NO_TYPE: &str = "No type provided";
pub const NO_POSTER: &str = "Job poster not provided";
pub const NO_CATEGORY: &str = "Category not provided";
pub const NO_DATE: &str = "Date posted not provided";
pub const NO_SUMMARY: &str = "No summary available";
pub const NO_DESCRIPTION: &str = "No description available";

/// One scraped job listing.
///
/// Field order here is the key order in the saved JSON files, so reordering
/// fields changes the on-disk format. Every field is always populated, with
/// a sentinel standing in for anything the card didn't carry. Files written
/// before summaries were scraped lack `ID`/`Summary`/`Description`; those
/// deserialize with defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Link")]
    pub link: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Salary")]
    pub salary: String,
    #[serde(rename = "Type")]
    pub job_type: String,
    #[serde(rename = "Poster")]
    pub poster: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Date_Posted")]
    pub date_posted: String,
    #[serde(rename = "Summary", default = "default_summary")]
    pub summary: String,
    #[serde(rename = "Description", default = "default_description")]
    pub description: String,
}

fn default_summary() -> String {
    NO_SUMMARY.to_string()
}

fn default_description() -> String {
    NO_DESCRIPTION.to_string()
}

impl Default for JobListing {
    /// The all-sentinel record the extractor starts from.
    fn default() -> Self {
        Self {
            id: String::new(),
            title: NO_TITLE.to_string(),
            link: NO_LINK.to_string(),
            location: NO_LOCATION.to_string(),
            salary: NO_SALARY.to_string(),
            job_type: NO_TYPE.to_string(),
            poster: NO_POSTER.to_string(),
            category: NO_CATEGORY.to_string(),
            date_posted: NO_DATE.to_string(),
            summary: default_summary(),
            description: default_description(),
        }
    }
}
