//! Citation impact graph: venues the author published in, linked to the venues citing them.

use std::{collections::HashMap, thread, time::Duration};

use indicatif::ProgressBar;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::{
    config::Config,
    output,
    venue::{Normalizer, kind::NodeKind},
};

pub mod source;

use source::{Paper, PaperSource, SemanticScholar};

/// Papers requested per page.
pub const BATCH_SIZE: usize = 100;

/// Raw venue for authored papers the API has no venue for.
pub const DEFAULT_VENUE: &str = "Preprint/Other";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    /// A venue the author published in.
    Source,
    /// A venue citing the author.
    Target,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub group: Group,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub value: u32,
    pub papers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    pub paper: Option<String>,
    pub value: u32,
}

/// Node/link document consumed by the force-directed visualisation.
#[derive(Debug, Default, Serialize)]
pub struct ImpactGraph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl ImpactGraph {
    /// Register one occurrence of the venue `name`.
    ///
    /// The first occurrence fixes the node's group and type; later ones bump its count and add
    /// `paper` to its titles unless already listed.
    pub fn add_node(&mut self, name: &str, group: Group, paper: Option<&str>) {
        let idx = *self.index.entry(name.to_string()).or_insert_with(|| {
            self.nodes.push(GraphNode {
                id: name.to_string(),
                group,
                kind: NodeKind::classify(name),
                value: 0,
                papers: Vec::new(),
            });
            self.nodes.len() - 1
        });

        let node = &mut self.nodes[idx];
        node.value += 1;
        if let Some(title) = paper
            && !node.papers.iter().any(|p| p == title)
        {
            node.papers.push(title.to_string());
        }
    }

    /// Append a link. Parallel links between the same venues are kept.
    pub fn add_link(&mut self, source: &str, target: &str, paper: Option<&str>) {
        self.links.push(GraphLink {
            source: source.to_string(),
            target: target.to_string(),
            paper: paper.map(str::to_string),
            value: 1,
        });
    }

    /// Fold an authored paper and its citations into the graph.
    pub fn add_paper(&mut self, paper: &Paper, normalizer: &Normalizer) {
        let raw = paper
            .venue
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_VENUE);
        let venue = normalizer.normalize(raw);
        let title = paper.title.as_deref();

        debug!(
            venue = %venue,
            year = ?paper.year,
            citations = ?paper.citation_count,
            "adding paper"
        );
        self.add_node(&venue, Group::Source, title);

        for citation in paper.citations() {
            // Citations without a venue cannot be placed in the graph.
            let Some(raw) = citation.venue.as_deref().filter(|v| !v.is_empty()) else {
                continue;
            };
            let citing = normalizer.normalize(raw);
            // Citing venues are not attributed to a paper in node state; the link carries it.
            self.add_node(&citing, Group::Target, None);
            self.add_link(&venue, &citing, title);
        }
    }

    #[cfg(test)]
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index.get(id).map(|&idx| &self.nodes[idx])
    }
}

/// Page through `author_id`'s papers and build the graph.
///
/// Pagination stops at the first short or empty page, or at the first error; whatever was
/// gathered up to that point is returned. `on_page` is called with the offset of each request.
pub fn build_graph(
    source: &impl PaperSource,
    author_id: &str,
    normalizer: &Normalizer,
    page_delay: Duration,
    mut on_page: impl FnMut(usize),
) -> ImpactGraph {
    let mut graph = ImpactGraph::default();
    let mut offset = 0;

    loop {
        on_page(offset);
        info!(offset, "fetching page");
        let papers = match source.fetch_page(author_id, offset, BATCH_SIZE) {
            Ok(papers) => papers,
            Err(e) => {
                error!(offset, error = %e, "stopping pagination");
                break;
            }
        };
        if papers.is_empty() {
            break;
        }

        for paper in &papers {
            graph.add_paper(paper, normalizer);
        }

        if papers.len() < BATCH_SIZE {
            break;
        }
        offset += BATCH_SIZE;
        thread::sleep(page_delay);
    }

    graph
}

pub struct GraphSummary {
    pub venues: usize,
    pub links: usize,
}

/// Fetch the configured author's graph and write it out.
pub fn run(config: &Config, normalizer: &Normalizer) -> anyhow::Result<GraphSummary> {
    let author_id = &config.author.id;
    info!(author = %author_id, "building impact graph");

    let source = SemanticScholar::new(config.api_base());
    let spinner = ProgressBar::new_spinner();
    spinner.enable_steady_tick(Duration::from_millis(120));
    let graph = build_graph(
        &source,
        author_id,
        normalizer,
        config.page_delay(),
        |offset| spinner.set_message(format!("fetching offset {offset}")),
    );
    spinner.finish_and_clear();

    let path = config.resolve(&config.paths.output_impact_graph);
    output::write_json(&path, &graph)?;
    info!(
        path = %path.display(),
        venues = graph.nodes.len(),
        links = graph.links.len(),
        "graph generated"
    );

    Ok(GraphSummary {
        venues: graph.nodes.len(),
        links: graph.links.len(),
    })
}
