//! Online topology patch.
//!
//! Between elections, nodes go offline and come back. These operations fill
//! vacated master/backup slots from cached queues — a greedy, priority-
//! ordered cascade, not a global reoptimization. A zero-address
//! [`Alternative`] deletes a slot that nothing could fill.

use std::collections::HashMap;

use strata_messages::{Alternative, ElectedNode, ElectedQueues, TopologyGraph, TopologyNode};
use strata_types::{ElectRole, NodeAddress, Position};

/// The cached per-role queues maintained as nodes come back online.
#[derive(Clone, Debug, Default)]
pub struct RoleQueues {
    pub master: Vec<TopologyNode>,
    pub backup: Vec<TopologyNode>,
    pub candidate: Vec<TopologyNode>,
}

/// Which queue an online event belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueueKind {
    Master,
    Backup,
    Candidate,
}

/// How strongly a replacement candidate is preferred: elected masters rank
/// above backups, backups above reserve candidates, everything else last.
fn grade_of(account: &NodeAddress, queues: &ElectedQueues) -> i32 {
    if queues.master.iter().any(|n| &n.account == account) {
        return 3;
    }
    if queues.backup.iter().any(|n| &n.account == account) {
        return 2;
    }
    if queues.candidate.iter().any(|n| &n.account == account) {
        return 1;
    }
    0
}

/// Take the next replacement from the reserve buffers, master queue first,
/// then backup, then candidate. Returns the zero address when every buffer
/// is empty.
fn pop_from_buffers(queues: &mut ElectedQueues) -> NodeAddress {
    if !queues.master_queue.is_empty() {
        return queues.master_queue.remove(0);
    }
    if !queues.backup_queue.is_empty() {
        return queues.backup_queue.remove(0);
    }
    if !queues.candidate_queue.is_empty() {
        return queues.candidate_queue.remove(0);
    }
    NodeAddress::ZERO
}

/// Among the still-occupied backup slots, the one whose occupant grades
/// highest as a master replacement.
fn best_backup_position(
    topology: &TopologyGraph,
    backup_map: &HashMap<Position, NodeAddress>,
    queues: &ElectedQueues,
) -> Option<Position> {
    let mut best_grade = -1;
    let mut best_position = None;
    for node in &topology.nodes {
        if !backup_map.contains_key(&node.position) {
            continue;
        }
        if node.position.role().ok() != Some(ElectRole::BackupValidator) {
            continue;
        }
        let grade = grade_of(&node.account, queues);
        if grade > best_grade {
            best_grade = grade;
            best_position = Some(node.position);
        }
    }
    best_position
}

fn position_in_topology(position: Position, topology: &TopologyGraph) -> bool {
    topology.nodes.iter().any(|n| n.position == position)
}

/// Patch the live topology: fill vacant master slots from the best-graded
/// backups, then both master and backup vacancies from the reserve
/// buffers, and finally delete slots that remained vacant.
pub fn topology_update(mut queues: ElectedQueues, topology: &TopologyGraph) -> Vec<Alternative> {
    let validator_num = queues.config.validator_num;
    let back_validator_num = queues.config.back_validator_num;

    let mut master_map: HashMap<Position, NodeAddress> = HashMap::new();
    let mut backup_map: HashMap<Position, NodeAddress> = HashMap::new();
    for node in &topology.nodes {
        match node.position.role() {
            Ok(ElectRole::Validator) => {
                master_map.insert(node.position, node.account);
            }
            Ok(ElectRole::BackupValidator) => {
                backup_map.insert(node.position, node.account);
            }
            _ => {}
        }
    }

    let mut alternatives = Vec::new();

    // Vacant master slots: promote the best-graded live backup.
    for index in 0..validator_num {
        let position = Position::at(ElectRole::Validator, index);
        if master_map.contains_key(&position) {
            continue;
        }
        let Some(from) = best_backup_position(topology, &backup_map, &queues) else {
            continue;
        };
        let Some(&account) = backup_map.get(&from) else {
            continue;
        };
        alternatives.push(Alternative { address: account, position });
        master_map.insert(position, account);
        backup_map.remove(&from);
    }

    // Still-vacant master slots: pull from the reserve buffers.
    for index in 0..validator_num {
        let position = Position::at(ElectRole::Validator, index);
        if master_map.contains_key(&position) {
            continue;
        }
        let account = pop_from_buffers(&mut queues);
        if account.is_zero() {
            continue;
        }
        alternatives.push(Alternative { address: account, position });
        master_map.insert(position, account);
    }

    // Vacant backup slots: buffers only.
    for index in 0..back_validator_num {
        let position = Position::at(ElectRole::BackupValidator, index);
        if backup_map.contains_key(&position) {
            continue;
        }
        let account = pop_from_buffers(&mut queues);
        if account.is_zero() {
            continue;
        }
        alternatives.push(Alternative { address: account, position });
        backup_map.insert(position, account);
    }

    // Slots present in the live topology but still unfilled get deleted.
    for index in 0..validator_num {
        let position = Position::at(ElectRole::Validator, index);
        if !position_in_topology(position, topology) {
            tracing::trace!(%position, "master slot absent from topology, left alone");
            continue;
        }
        if !master_map.contains_key(&position) {
            alternatives.push(Alternative { address: NodeAddress::ZERO, position });
        }
    }
    for index in 0..back_validator_num {
        let position = Position::at(ElectRole::BackupValidator, index);
        if !position_in_topology(position, topology) {
            tracing::trace!(%position, "backup slot absent from topology, left alone");
            continue;
        }
        if !backup_map.contains_key(&position) {
            alternatives.push(Alternative { address: NodeAddress::ZERO, position });
        }
    }

    alternatives
}

/// The simple offline substitution: pair each offline address's slot with
/// the next cached node (master cache first, then backup, then candidate)
/// that is not already in the live topology.
pub fn offline_substitute(
    master_cache: &[ElectedNode],
    backup_cache: &[ElectedNode],
    candidate_cache: &[ElectedNode],
    topology: &TopologyGraph,
    offline: &[NodeAddress],
) -> Vec<Alternative> {
    let positions: HashMap<NodeAddress, Position> = topology
        .nodes
        .iter()
        .map(|n| (n.account, n.position))
        .collect();

    let in_topology = |account: &NodeAddress| positions.contains_key(account);

    let substitutes: Vec<NodeAddress> = master_cache
        .iter()
        .chain(backup_cache)
        .chain(candidate_cache)
        .map(|n| n.account)
        .filter(|a| !in_topology(a))
        .collect();

    let mut alternatives = Vec::new();
    for (i, gone) in offline.iter().enumerate() {
        let Some(substitute) = substitutes.get(i) else {
            break;
        };
        let Some(&position) = positions.get(gone) else {
            tracing::warn!(address = %gone, "offline address not in topology, skipped");
            continue;
        };
        alternatives.push(Alternative { address: *substitute, position });
    }
    alternatives
}

/// Queue maintenance when a node comes back online: re-online masters go
/// to the front of the master queue; backups and candidates append to
/// their queues.
pub fn primary_list_update(
    mut queues: RoleQueues,
    online: TopologyNode,
    queue: QueueKind,
) -> RoleQueues {
    tracing::debug!(account = %online.account, ?queue, "primary list update");
    match queue {
        QueueKind::Master => queues.master.insert(0, online),
        QueueKind::Backup => queues.backup.push(online),
        QueueKind::Candidate => queues.candidate.push(online),
    }
    queues
}
