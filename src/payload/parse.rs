use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::graph::{GraphPayload, InvestmentDocument};

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("invalid graph data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid graph data: expected an object with `nodes` or `companies`")]
    UnknownShape,
    #[error("invalid graph data: node #{index} has an empty id")]
    EmptyId { index: usize },
    #[error("invalid graph data: duplicate node id `{0}`")]
    DuplicateId(String),
    #[error("invalid graph data: node `{id}` has magnitude {value}, expected a non-negative number")]
    InvalidMagnitude { id: String, value: f64 },
    #[error("invalid graph data: link #{index} has weight {value}, expected a non-negative number")]
    InvalidWeight { index: usize, value: f64 },
}

pub fn parse_payload(raw: &str) -> Result<GraphPayload, PayloadError> {
    let parsed: Value = serde_json::from_str(raw)?;
    let object = parsed.as_object().ok_or(PayloadError::UnknownShape)?;

    let payload = if object.contains_key("nodes") {
        GraphPayload::deserialize(&parsed)?
    } else if object.contains_key("companies") {
        GraphPayload::from(InvestmentDocument::deserialize(&parsed)?)
    } else {
        return Err(PayloadError::UnknownShape);
    };

    validate(&payload)?;
    Ok(payload)
}

fn validate(payload: &GraphPayload) -> Result<(), PayloadError> {
    let mut seen = HashSet::with_capacity(payload.nodes.len());
    for (index, node) in payload.nodes.iter().enumerate() {
        if node.id.is_empty() {
            return Err(PayloadError::EmptyId { index });
        }
        if !seen.insert(node.id.as_str()) {
            return Err(PayloadError::DuplicateId(node.id.clone()));
        }
        if !node.magnitude.is_finite() || node.magnitude < 0.0 {
            return Err(PayloadError::InvalidMagnitude {
                id: node.id.clone(),
                value: node.magnitude,
            });
        }
    }

    for (index, link) in payload.links.iter().enumerate() {
        if !link.weight.is_finite() || link.weight < 0.0 {
            return Err(PayloadError::InvalidWeight {
                index,
                value: link.weight,
            });
        }
    }

    Ok(())
}

pub fn load_payload(path: &Path) -> Result<GraphPayload> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read graph data from {}", path.display()))?;
    let payload =
        parse_payload(&raw).with_context(|| format!("failed to load {}", path.display()))?;

    tracing::info!(
        nodes = payload.node_count(),
        links = payload.link_count(),
        "loaded graph data from {}",
        path.display()
    );
    Ok(payload)
}
