//! Energy accumulator scheduling for enemies.
//! Each turn an enemy gains its effective speed as energy and acts once per `ACTION_COST`.

use super::*;

pub const ACTION_COST: u32 = 100;
/// Upper bound on actions one enemy may take in a single player turn.
pub(super) const MAX_ACTIONS_PER_TURN: u32 = 3;

pub(super) fn accrue(energy: &mut u32, gain: u32) {
    *energy = energy.saturating_add(gain).min(ACTION_COST * MAX_ACTIONS_PER_TURN);
}

pub(super) fn try_spend(energy: &mut u32) -> bool {
    if *energy < ACTION_COST {
        return false;
    }
    *energy -= ACTION_COST;
    true
}

/// Lower sorts first: strategists claim path budget before everyone else.
fn kind_priority(kind: EnemyKind) -> u8 {
    match kind {
        EnemyKind::Strategist => 0,
        EnemyKind::Ambusher => 1,
        EnemyKind::Sprinter => 2,
        EnemyKind::Patroller => 3,
        EnemyKind::Wanderer => 4,
    }
}

pub(super) fn action_order(enemies: &SlotMap<EntityId, Enemy>) -> Vec<EntityId> {
    let mut order: Vec<(u8, u32, EntityId)> = enemies
        .iter()
        .map(|(id, enemy)| (kind_priority(enemy.kind), enemy.spawn_order, id))
        .collect();
    order.sort_unstable_by_key(|(priority, spawn_order, _)| (*priority, *spawn_order));
    order.into_iter().map(|(_, _, id)| id).collect()
}
