//! Evaluation constraints and the temporal levels they induce.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::SceneError;
use crate::log::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawConstraint {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    TerminalSatisfaction { proposition_indices: Vec<usize> },
    Temporal { dag_edges: Vec<(usize, usize)> },
}

#[derive(Deserialize)]
struct TerminalArgs {
    #[serde(default)]
    proposition_indices: Vec<usize>,
}

#[derive(Deserialize)]
struct TemporalArgs {
    #[serde(default)]
    dag_edges: Vec<(usize, usize)>,
}

impl Constraint {
    /// Decode a raw constraint. Unsupported kinds yield `Ok(None)`.
    pub fn decode(raw: &RawConstraint) -> Result<Option<Self>, SceneError> {
        let args = Value::Object(raw.args.clone());
        let malformed = |err: serde_json::Error| SceneError::MalformedConstraint {
            kind: raw.kind.clone(),
            message: err.to_string(),
        };
        match raw.kind.as_str() {
            "TerminalSatisfactionConstraint" => {
                let a: TerminalArgs = serde_json::from_value(args).map_err(malformed)?;
                Ok(Some(Constraint::TerminalSatisfaction {
                    proposition_indices: a.proposition_indices,
                }))
            }
            "TemporalConstraint" => {
                let a: TemporalArgs = serde_json::from_value(args).map_err(malformed)?;
                Ok(Some(Constraint::Temporal { dag_edges: a.dag_edges }))
            }
            other => {
                warn!(kind = %other, "constraint type not handled, dropping it");
                Ok(None)
            }
        }
    }
}

/// Check the constraint set against `proposition_count` and return the
/// temporal levels to render, if any.
///
/// A terminal-satisfaction constraint is mandatory and must cover every
/// proposition exactly once (duplicates collapse). When several temporal
/// constraints are present the last one wins; an empty DAG means a single
/// flat diagram.
pub fn plan_levels(raw: &[RawConstraint], proposition_count: usize) -> Result<Option<Vec<Vec<usize>>>, SceneError> {
    let mut saw_terminal = false;
    let mut edges: Option<Vec<(usize, usize)>> = None;

    for constraint in raw {
        match Constraint::decode(constraint)? {
            Some(Constraint::TerminalSatisfaction { proposition_indices }) => {
                let unique: BTreeSet<usize> = proposition_indices.into_iter().collect();
                if unique.len() != proposition_count {
                    return Err(SceneError::TerminalCountMismatch {
                        propositions: proposition_count,
                        terminal: unique.len(),
                    });
                }
                saw_terminal = true;
            }
            Some(Constraint::Temporal { dag_edges }) => edges = Some(dag_edges),
            None => {}
        }
    }

    if !saw_terminal {
        return Err(SceneError::MissingTerminalConstraint);
    }

    let Some(edges) = edges else { return Ok(None) };
    for &(a, b) in &edges {
        for index in [a, b] {
            if index >= proposition_count {
                return Err(SceneError::PropositionIndexOutOfRange {
                    index,
                    count: proposition_count,
                });
            }
        }
    }

    let levels = topological_generations(&edges)?;
    debug!(levels = levels.len(), "temporal levels planned");
    Ok((!levels.is_empty()).then_some(levels))
}

/// Kahn's algorithm, one generation at a time. Only nodes that appear in
/// an edge take part; each generation is sorted ascending.
pub fn topological_generations(edges: &[(usize, usize)]) -> Result<Vec<Vec<usize>>, SceneError> {
    let mut indegree: BTreeMap<usize, usize> = BTreeMap::new();
    let mut successors: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    let mut seen_edges = BTreeSet::new();

    for &(a, b) in edges {
        indegree.entry(a).or_insert(0);
        indegree.entry(b).or_insert(0);
        // parallel edges count once
        if seen_edges.insert((a, b)) {
            *indegree.entry(b).or_insert(0) += 1;
            successors.entry(a).or_default().push(b);
        }
    }

    let mut generations = Vec::new();
    let mut current: Vec<usize> = indegree
        .iter()
        .filter(|&(_, &d)| d == 0)
        .map(|(&n, _)| n)
        .collect();
    let mut emitted = 0;

    while !current.is_empty() {
        emitted += current.len();
        let mut next = Vec::new();
        for node in &current {
            for succ in successors.get(node).map(Vec::as_slice).unwrap_or(&[]) {
                if let Some(d) = indegree.get_mut(succ) {
                    *d -= 1;
                    if *d == 0 {
                        next.push(*succ);
                    }
                }
            }
        }
        next.sort_unstable();
        generations.push(std::mem::take(&mut current));
        current = next;
    }

    if emitted != indegree.len() {
        return Err(SceneError::CyclicTemporalConstraint);
    }
    Ok(generations)
}
