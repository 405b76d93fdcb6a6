use crate::error::Error;
use crate::model::OperationKind;
use crate::plan::Plan;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use tracing::error;

/// Several folders that would end up at the same path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictGroup {
    pub target_path: PathBuf,
    pub sources: Vec<PathBuf>,
}

impl ConflictGroup {
    pub fn target_name(&self) -> String {
        self.target_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// A plan that passed the conflict check. Only this type can be executed.
#[derive(Debug, Clone)]
pub struct AcceptedPlan(Plan);

impl Deref for AcceptedPlan {
    type Target = Plan;

    fn deref(&self) -> &Plan {
        &self.0
    }
}

/// Group rename targets and report every target claimed by more than one
/// folder. A folder that stays where it is claims its own path, so renaming
/// onto it is a conflict as well. So is renaming onto a folder that only moves
/// away later in scan order, since that path is still taken when the rename
/// runs.
pub fn find_conflicts(plan: &Plan) -> Vec<ConflictGroup> {
    let mut claims: BTreeMap<&Path, Vec<&Path>> = BTreeMap::new();

    let renames: Vec<_> = plan.of_kind(OperationKind::Rename).collect();
    let vacated: HashMap<&Path, usize> = renames
        .iter()
        .enumerate()
        .map(|(position, op)| (op.source.path.as_path(), position))
        .collect();

    for (position, op) in renames.iter().enumerate() {
        let sources = claims.entry(op.target_path.as_path()).or_default();
        sources.push(op.source.path.as_path());
        if let Some(&later) = vacated.get(op.target_path.as_path()) {
            if later > position {
                sources.push(renames[later].source.path.as_path());
            }
        }
    }

    let stationary = plan
        .operations
        .iter()
        .filter(|op| op.kind != OperationKind::Rename)
        .map(|op| op.source.path.as_path())
        .chain(plan.unmatched.iter().map(|entry| entry.path.as_path()));
    for path in stationary {
        if let Some(sources) = claims.get_mut(path) {
            sources.push(path);
        }
    }

    claims
        .into_iter()
        .filter_map(|(target, mut sources)| {
            sources.sort();
            sources.dedup();
            (sources.len() > 1).then(|| ConflictGroup {
                target_path: target.to_path_buf(),
                sources: sources.into_iter().map(Path::to_path_buf).collect(),
            })
        })
        .collect()
}

/// Gate between planning and execution. Rejects the whole plan when any
/// conflict exists.
pub fn check_plan(plan: Plan) -> Result<AcceptedPlan, Error> {
    let conflicts = find_conflicts(&plan);
    if conflicts.is_empty() {
        return Ok(AcceptedPlan(plan));
    }

    error!("Duplicate target names detected:");
    for group in &conflicts {
        error!("  {}:", group.target_name());
        for source in &group.sources {
            error!("    - {}", source.display());
        }
    }
    Err(Error::Conflicts(conflicts))
}
