use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use super::model::{RawEdge, RawGraph, RawNode};

/// Where the raw node/edge list comes from.
#[derive(Clone, Debug)]
pub enum GraphSource {
    /// Static JSON payload on disk.
    File(PathBuf),
    /// Node/edge set handed over directly by the caller.
    Literal(RawGraph),
}

impl GraphSource {
    pub fn load(&self) -> Result<RawGraph> {
        match self {
            Self::File(path) => load_payload(path),
            Self::Literal(graph) => Ok(graph.clone()),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Literal(graph) => format!("in-memory graph ({} nodes)", graph.nodes.len()),
        }
    }
}

pub fn load_payload(path: &Path) -> Result<RawGraph> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read graph payload {}", path.display()))?;
    let graph = parse_payload(&raw)
        .with_context(|| format!("failed to parse graph payload {}", path.display()))?;
    info!(
        path = %path.display(),
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "loaded graph payload"
    );
    Ok(graph)
}

pub fn parse_payload(raw: &str) -> Result<RawGraph> {
    serde_json::from_str(raw).context("invalid graph JSON")
}

/// Small themed node/edge set used when no payload is given.
pub fn themed_sample() -> RawGraph {
    let billet = |slug: &str, label: &str| {
        let mut node = RawNode::new(format!("billet:{slug}"), label);
        node.kind = Some("BILLET".to_owned());
        node
    };
    let link = |source: &str, target: &str| {
        let mut edge = RawEdge::new(format!("billet:{source}"), format!("billet:{target}"));
        edge.kind = Some("BACKLINK".to_owned());
        edge
    };

    RawGraph {
        nodes: vec![
            billet("nigredo", "Nigredo : la dissolution"),
            billet("albedo", "Albedo : le blanchiment"),
            billet("citrinitas", "Citrinitas"),
            billet("rubedo", "Rubedo : l'oeuvre au rouge"),
            billet("mercure", "Le mercure des sages"),
            billet("soufre", "Soufre et sel"),
            billet("alambic", "Notes sur l'alambic"),
            billet("feu-humain", "Feu humain"),
            billet("solarpunk", "Solarpunk et communs"),
            billet("jardins", "Jardins partagés"),
            billet("lettre", "Lettre à un jeune chercheur"),
            billet("silence", "Éloge du silence"),
        ],
        edges: vec![
            link("nigredo", "albedo"),
            link("albedo", "citrinitas"),
            link("citrinitas", "rubedo"),
            link("rubedo", "nigredo"),
            link("mercure", "soufre"),
            link("soufre", "alambic"),
            link("solarpunk", "jardins"),
        ],
    }
}
