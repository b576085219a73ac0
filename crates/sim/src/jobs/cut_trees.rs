use homestead_core::{EntityId, ItemKind};
use homestead_world::{EntityType, InvariantViolation, WorldResult};
use std::collections::VecDeque;
use tracing::debug;

use super::{JobStatus, StepContext};
use crate::movement::move_towards;

/// Walk to the head tree, fell it, and collect one wood.
pub(super) fn step(
    trees: &mut VecDeque<EntityId>,
    ctx: &mut StepContext<'_>,
) -> WorldResult<JobStatus> {
    let Some(&head) = trees.front() else {
        return Ok(JobStatus::Finished);
    };
    let tree = ctx.index.require_entity(head)?;
    if tree.entity_type() != EntityType::Tree {
        return Err(InvariantViolation::WrongEntityKind {
            id: head,
            expected: EntityType::Tree,
            found: tree.entity_type(),
        });
    }
    let target = tree.position;
    if !move_towards(ctx.agent, target, ctx.updates) {
        return Ok(JobStatus::InProgress);
    }

    let removed = ctx.index.remove_entity(head)?;
    ctx.updates.removed_entity(&removed);
    trees.pop_front();
    let agent_id = ctx.agent.id;
    ctx.agent
        .inventory
        .add(ItemKind::Wood, 1)
        .map_err(|e| InvariantViolation::inventory(agent_id, e))?;
    ctx.updates.agent(agent_id);
    ctx.updates.job(ctx.job);
    debug!(agent = %agent_id, tree = %head, remaining = trees.len(), "Felled tree");

    Ok(if trees.is_empty() {
        JobStatus::Finished
    } else {
        JobStatus::InProgress
    })
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::super::JobStatus;
    use crate::job::JobKind;
    use homestead_core::{ItemKind, Vec2};
    use homestead_world::{EntityType, InvariantViolation};

    #[test]
    fn drains_queue_in_order() {
        let mut index = flat_index();
        let trees: Vec<_> = [(3, 0), (3, 4), (-2, 4)]
            .into_iter()
            .map(|(x, y)| place_tree(&mut index, x, y))
            .collect();
        let mut harness = Harness::new(index, Vec2::ZERO);
        let mut kind = JobKind::CutTrees {
            trees: trees.iter().copied().collect(),
        };

        let mut felled = Vec::new();
        for _ in 0..200 {
            let status = harness.step(&mut kind).unwrap();
            for id in &trees {
                if harness.index.entity(*id).is_none() && !felled.contains(id) {
                    felled.push(*id);
                }
            }
            if status == JobStatus::Finished {
                break;
            }
        }

        assert_eq!(felled, trees);
        assert_eq!(harness.agent.inventory.count(ItemKind::Wood), 3);
        for id in trees {
            assert!(harness.updates.entities.contains(&id));
        }
        assert!(harness.index.chunks().all(|c| c.cells().iter().all(|cell| !cell.is_occupied())));
    }

    #[test]
    fn felling_marks_chunk() {
        let mut index = flat_index();
        let tree = place_tree(&mut index, -1, -1);
        let mut harness = Harness::new(index, Vec2::new(-1.0, -1.0));
        let mut kind = JobKind::CutTrees {
            trees: [tree].into_iter().collect(),
        };
        assert_eq!(harness.step(&mut kind).unwrap(), JobStatus::Finished);
        assert!(harness
            .updates
            .chunks
            .contains(&homestead_world::ChunkId::new(-1, -1)));
    }

    #[test]
    fn vanished_tree_is_a_violation() {
        let mut index = flat_index();
        let tree = place_tree(&mut index, 2, 2);
        index.remove_entity(tree).unwrap();
        let mut harness = Harness::new(index, Vec2::ZERO);
        let mut kind = JobKind::CutTrees {
            trees: [tree].into_iter().collect(),
        };
        assert_eq!(
            harness.step(&mut kind).unwrap_err(),
            InvariantViolation::MissingEntity(tree)
        );
    }

    #[test]
    fn non_tree_target_is_a_violation() {
        let mut index = flat_index();
        let well = place(&mut index, EntityType::Well, 2, 2, 1, 1);
        let mut harness = Harness::new(index, Vec2::ZERO);
        let mut kind = JobKind::CutTrees {
            trees: [well].into_iter().collect(),
        };
        assert!(matches!(
            harness.step(&mut kind),
            Err(InvariantViolation::WrongEntityKind { .. })
        ));
    }
}
