//! Authored publications and their citation diet, read from a reference-manager library.

use std::{collections::HashMap, path::PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    diet::DietCounts,
    output,
    venue::Normalizer,
};

pub mod zotero;

use zotero::ZoteroLibrary;

pub type CollectionId = i64;
pub type ItemId = i64;

/// Year used when an item has no usable date.
pub const UNKNOWN_YEAR: &str = "0000";
/// Raw venue for authored items with neither a journal nor a proceedings title.
pub const DEFAULT_VENUE: &str = "Preprint/Manuscript";

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("database not found at {}", .0.display())]
    NotFound(PathBuf),
    #[error("root collection '{0}' not found")]
    MissingCollection(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Author {
    pub first: String,
    pub last: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Publication {
    pub id: ItemId,
    pub title: String,
    pub year: String,
    pub venue: String,
    pub url: String,
    pub doi: String,
    pub authors: Vec<Author>,
}

/// Read-only view of the reference-manager library.
///
/// Collections nest as root → one collection per authored publication → citations.
pub trait Library {
    /// Look a collection up by exact name, optionally restricted to the children of `parent`.
    fn find_collection(
        &self,
        name: &str,
        parent: Option<CollectionId>,
    ) -> Result<Option<CollectionId>, LibraryError>;

    fn child_collections(&self, parent: CollectionId) -> Result<Vec<Collection>, LibraryError>;

    /// The first item in `collection` credited to the named creator.
    fn find_authored_item(
        &self,
        collection: CollectionId,
        first_name: &str,
        last_name: &str,
    ) -> Result<Option<ItemId>, LibraryError>;

    /// Field name → value for one item.
    fn item_fields(&self, item: ItemId) -> Result<HashMap<String, String>, LibraryError>;

    /// Creators of one item, in credited order.
    fn item_creators(&self, item: ItemId) -> Result<Vec<Author>, LibraryError>;

    /// Raw venue of each item in `collection` that has one.
    fn collection_venues(&self, collection: CollectionId) -> Result<Vec<String>, LibraryError>;
}

/// Which collections to walk and whose publications to pick out of them.
pub struct HarvestSettings<'a> {
    pub root_collection: &'a str,
    pub citations_collection: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

impl<'a> HarvestSettings<'a> {
    pub fn from_config(config: &'a Config) -> Self {
        Self {
            root_collection: &config.zotero.root_collection,
            citations_collection: &config.zotero.citations_collection,
            first_name: &config.author.first_name,
            last_name: &config.author.last_name,
        }
    }
}

#[derive(Debug, Default)]
pub struct Harvest {
    /// Sorted by year, newest first.
    pub publications: Vec<Publication>,
    pub diet: DietCounts,
    /// Publication collections without an item by the author.
    pub skipped: Vec<String>,
}

/// Walk every publication collection under the root collection.
pub fn harvest(
    library: &impl Library,
    settings: &HarvestSettings<'_>,
    normalizer: &Normalizer,
) -> Result<Harvest, LibraryError> {
    let root = library
        .find_collection(settings.root_collection, None)?
        .ok_or_else(|| LibraryError::MissingCollection(settings.root_collection.to_string()))?;
    let containers = library.child_collections(root)?;
    info!(count = containers.len(), "found paper collections");

    let author = format!("{} {}", settings.first_name, settings.last_name);
    let mut harvest = Harvest::default();
    for container in containers {
        let Some(item) =
            library.find_authored_item(container.id, settings.first_name, settings.last_name)?
        else {
            warn!(
                collection = %container.name,
                author = %author,
                "no paper by the author, skipping"
            );
            harvest.skipped.push(container.name);
            continue;
        };

        let publication = read_publication(library, item, normalizer)?;
        debug!(id = item, title = %publication.title, venue = %publication.venue, "read publication");
        harvest.publications.push(publication);

        if let Some(citations) =
            library.find_collection(settings.citations_collection, Some(container.id))?
        {
            for raw in library.collection_venues(citations)? {
                harvest.diet.record(normalizer.normalize(&raw));
            }
        }
    }

    // Stable, so equal years keep the order they were found in.
    harvest.publications.sort_by(|a, b| b.year.cmp(&a.year));
    Ok(harvest)
}

fn read_publication(
    library: &impl Library,
    item: ItemId,
    normalizer: &Normalizer,
) -> Result<Publication, LibraryError> {
    let mut fields = library.item_fields(item)?;
    let authors = library.item_creators(item)?;

    let raw_venue = ["publicationTitle", "proceedingsTitle"]
        .iter()
        .filter_map(|f| fields.get(*f))
        .find(|v| !v.is_empty())
        .map(String::as_str)
        .unwrap_or(DEFAULT_VENUE);
    let venue = normalizer.normalize(raw_venue);

    Ok(Publication {
        id: item,
        year: parse_year(fields.get("date").map(String::as_str)),
        venue,
        title: fields
            .remove("title")
            .unwrap_or_else(|| "Untitled".to_string()),
        url: fields.remove("url").unwrap_or_default(),
        doi: fields.remove("DOI").unwrap_or_default(),
        authors,
    })
}

/// The first four-digit token of a date field, or [`UNKNOWN_YEAR`].
pub fn parse_year(date: Option<&str>) -> String {
    static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{4})\b").unwrap());

    date.and_then(|d| YEAR_RE.captures(d))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_YEAR.to_string())
}

pub struct PubsSummary {
    pub publications: usize,
    pub skipped: usize,
    pub citations: u32,
    pub venues: usize,
}

/// Read the configured library and write the publication list and diet hierarchy.
///
/// With `dry_run` nothing is written; a sample of each artifact is printed instead.
pub fn run(config: &Config, normalizer: &Normalizer, dry_run: bool) -> anyhow::Result<PubsSummary> {
    let db_path = config.db_path();
    info!(path = %db_path.display(), "connecting to library");
    let library = ZoteroLibrary::open(&db_path)?;
    let harvested = harvest(&library, &HarvestSettings::from_config(config), normalizer)?;
    drop(library);

    let hierarchy = harvested.diet.hierarchy();
    info!(publications = harvested.publications.len(), "processed publications");
    info!(
        citations = harvested.diet.total(),
        venues = harvested.diet.len(),
        "processed citations"
    );

    if dry_run {
        println!("Dry run complete.");
        println!(
            "Sample publication: {}",
            match harvested.publications.first() {
                Some(p) => serde_json::to_string_pretty(p)?,
                None => "None".to_string(),
            }
        );
        println!(
            "Sample diet bucket: {}",
            match hierarchy.children.first() {
                Some(b) => serde_json::to_string_pretty(b)?,
                None => "None".to_string(),
            }
        );
    } else {
        let pubs_path = config.resolve(&config.paths.output_pubs);
        let diet_path = config.resolve(&config.paths.output_diet);
        output::write_json(&pubs_path, &harvested.publications)?;
        output::write_json(&diet_path, &hierarchy)?;
        info!(
            publications = %pubs_path.display(),
            diet = %diet_path.display(),
            "written"
        );
    }

    Ok(PubsSummary {
        publications: harvested.publications.len(),
        skipped: harvested.skipped.len(),
        citations: harvested.diet.total(),
        venues: harvested.diet.len(),
    })
}
