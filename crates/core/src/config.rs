//! Tunable parameters for generation, spawning, and simulation.
//! Built once per run and passed by reference; there is no global configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutKind {
    Rooms,
    Maze,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeRange {
    pub min: usize,
    pub max: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub layout: LayoutKind,
    pub room_count: SizeRange,
    pub room_size: SizeRange,
    pub room_attempts: usize,
    pub extra_corridors: usize,
    pub maze_rooms: usize,
    pub braid_min: f64,
    pub braid_max: f64,
    pub braid_tunnel_depth: usize,
    pub min_junction_ratio: f64,
    pub widen_threshold: usize,
    pub widen_chance: f64,
    pub alternative_max_tries: usize,
    pub decoration_chance: f64,
    pub max_restarts: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            layout: LayoutKind::Rooms,
            room_count: SizeRange { min: 3, max: 6 },
            room_size: SizeRange { min: 3, max: 5 },
            room_attempts: 200,
            extra_corridors: 2,
            maze_rooms: 2,
            braid_min: 0.25,
            braid_max: 0.45,
            braid_tunnel_depth: 6,
            min_junction_ratio: 0.12,
            widen_threshold: 10,
            widen_chance: 0.4,
            alternative_max_tries: 40,
            decoration_chance: 0.06,
            max_restarts: 300,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub base_width: usize,
    pub base_height: usize,
    pub size_step: usize,
    pub max_width: usize,
    pub max_height: usize,
    pub base_enemies: usize,
    pub max_enemies: usize,
    pub base_traps: usize,
    pub base_items: usize,
    pub item_drop_decay: f64,
    pub enemy_spawn_clearance: u32,
    pub faction_min_depth: u32,
    pub faction_chance: f64,
    pub max_depth: u32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            base_width: 15,
            base_height: 15,
            size_step: 2,
            max_width: 51,
            max_height: 41,
            base_enemies: 2,
            max_enemies: 12,
            base_traps: 3,
            base_items: 2,
            item_drop_decay: 0.9,
            enemy_spawn_clearance: 6,
            faction_min_depth: 3,
            faction_chance: 0.4,
            max_depth: 10,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    pub max_paths_per_turn: u8,
    pub chase_grace_turns: u32,
    pub grace_radius: u32,
    pub disengage_turns: u32,
    pub repath_min_turns: u32,
    pub repath_max_turns: u32,
    pub leash_distance: usize,
    pub close_distance: u32,
    pub close_speed_factor: f64,
    pub base_speed: u32,
    pub speed_step: u32,
    pub density_zone: i32,
    pub density_limit: usize,
    pub density_cooldown_turns: u32,
    pub strategist_lead: i32,
    pub ambusher_lead: i32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            max_paths_per_turn: 3,
            chase_grace_turns: 2,
            grace_radius: 1,
            disengage_turns: 6,
            repath_min_turns: 1,
            repath_max_turns: 3,
            leash_distance: 80,
            close_distance: 2,
            close_speed_factor: 0.8,
            base_speed: 100,
            speed_step: 4,
            density_zone: 6,
            density_limit: 2,
            density_cooldown_turns: 3,
            strategist_lead: 2,
            ambusher_lead: 4,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub max_hunger: u32,
    pub starvation_interval: u32,
    pub view_radius: u32,
    pub inventory_capacity: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_hp: 20,
            attack: 4,
            defense: 1,
            max_hunger: 400,
            starvation_interval: 5,
            view_radius: 7,
            inventory_capacity: 6,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrapConfig {
    pub slow_turns: u32,
    pub snare_turns: u32,
    pub reverse_turns: u32,
    pub fog_turns: u32,
    pub fog_radius_base: u32,
    pub fog_radius_depth_step: f64,
    pub noise_turns: u32,
    pub noise_radius: u32,
    pub noise_pull_strength: f64,
}

impl Default for TrapConfig {
    fn default() -> Self {
        Self {
            slow_turns: 8,
            snare_turns: 2,
            reverse_turns: 10,
            fog_turns: 15,
            fog_radius_base: 5,
            fog_radius_depth_step: 0.5,
            noise_turns: 10,
            noise_radius: 12,
            noise_pull_strength: 0.65,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemConfig {
    pub power_turns: u32,
    pub invincible_turns: u32,
    pub smoke_turns: u32,
    pub smoke_chance: f64,
    pub potion_heal: i32,
    pub ration_food: u32,
    pub blade_bonus: i32,
    pub buckler_bonus: i32,
}

impl Default for ItemConfig {
    fn default() -> Self {
        Self {
            power_turns: 15,
            invincible_turns: 12,
            smoke_turns: 6,
            smoke_chance: 0.2,
            potion_heal: 8,
            ration_food: 200,
            blade_bonus: 2,
            buckler_bonus: 1,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub generator: GeneratorConfig,
    pub level: LevelConfig,
    pub behavior: BehaviorConfig,
    pub player: PlayerConfig,
    pub traps: TrapConfig,
    pub items: ItemConfig,
}

impl GameConfig {
    /// Rejects inverted min/max pairs and chances outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let generator = &self.generator;
        let behavior = &self.behavior;
        let ranges = [
            ("generator.room_count", generator.room_count.min <= generator.room_count.max),
            ("generator.room_size", generator.room_size.min <= generator.room_size.max),
            ("generator.braid_min/braid_max", generator.braid_min <= generator.braid_max),
            (
                "behavior.repath_min_turns/repath_max_turns",
                behavior.repath_min_turns <= behavior.repath_max_turns,
            ),
        ];
        if let Some((field, _)) = ranges.into_iter().find(|(_, ordered)| !ordered) {
            return Err(ConfigError::InvertedRange { field });
        }

        let probabilities = [
            ("generator.braid_min", generator.braid_min),
            ("generator.braid_max", generator.braid_max),
            ("generator.widen_chance", generator.widen_chance),
            ("generator.decoration_chance", generator.decoration_chance),
            ("level.faction_chance", self.level.faction_chance),
            ("items.smoke_chance", self.items.smoke_chance),
        ];
        match probabilities.into_iter().find(|(_, value)| !(0.0..=1.0).contains(value)) {
            Some((field, _)) => Err(ConfigError::NotAProbability { field }),
            None => Ok(()),
        }
    }
}

impl LevelConfig {
    /// Requested grid size for a depth; the generator still forces both sides odd.
    pub fn grid_size(&self, depth: u32) -> (usize, usize) {
        let growth = self.size_step * depth.saturating_sub(1) as usize;
        (
            (self.base_width + growth).min(self.max_width.max(self.base_width)),
            (self.base_height + growth).min(self.max_height.max(self.base_height)),
        )
    }

    pub fn enemy_count(&self, depth: u32) -> usize {
        (self.base_enemies + depth as usize).min(self.max_enemies)
    }

    pub fn trap_count(&self, depth: u32) -> usize {
        self.base_traps + depth as usize
    }

    pub fn item_count(&self, depth: u32) -> usize {
        let minimum = ((depth / 2) as usize).max(1);
        let decayed = self.base_items as f64
            * self.item_drop_decay.powi(depth.saturating_sub(1) as i32);
        minimum.max(decayed.floor() as usize)
    }

    /// Multiplier applied to trap durations as floors get deeper.
    pub fn trap_intensity(&self, depth: u32) -> f64 {
        1.0 + (f64::from(depth.saturating_sub(1)) * 0.05).min(0.5)
    }
}

impl TrapConfig {
    pub fn fog_radius(&self, depth: u32) -> u32 {
        let shrink = f64::from(depth.saturating_sub(1)) * self.fog_radius_depth_step;
        ((f64::from(self.fog_radius_base) - shrink).floor() as u32).max(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_size_grows_by_step_and_caps() {
        let level = LevelConfig::default();
        assert_eq!(level.grid_size(1), (15, 15));
        assert_eq!(level.grid_size(3), (19, 19));
        assert_eq!(level.grid_size(100), (51, 41));
    }

    #[test]
    fn per_depth_counts_follow_scaling_rules() {
        let level = LevelConfig::default();
        assert_eq!(level.enemy_count(1), 3);
        assert_eq!(level.enemy_count(40), 12);
        assert_eq!(level.trap_count(2), 5);
        assert_eq!(level.item_count(1), 2);
        assert_eq!(level.item_count(8), 4);
        assert!((level.trap_intensity(1) - 1.0).abs() < f64::EPSILON);
        assert!((level.trap_intensity(30) - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn fog_radius_never_drops_below_three() {
        let traps = TrapConfig::default();
        assert_eq!(traps.fog_radius(1), 5);
        assert_eq!(traps.fog_radius(50), 3);
    }

    #[test]
    fn validation_catches_inverted_ranges_and_bad_chances() {
        assert_eq!(GameConfig::default().validate(), Ok(()));

        let mut config = GameConfig::default();
        config.behavior.repath_min_turns = 5;
        config.behavior.repath_max_turns = 2;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvertedRange { field: "behavior.repath_min_turns/repath_max_turns" })
        );

        let mut config = GameConfig::default();
        config.generator.room_size = SizeRange { min: 6, max: 4 };
        assert_eq!(config.validate(), Err(ConfigError::InvertedRange { field: "generator.room_size" }));

        let mut config = GameConfig::default();
        config.generator.widen_chance = 1.5;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NotAProbability { field: "generator.widen_chance" })
        );
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{"generator":{"widen_chance":1.0}}"#).expect("parse");
        assert!((config.generator.widen_chance - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.generator.room_size, GeneratorConfig::default().room_size);
        assert_eq!(config.level, LevelConfig::default());
    }
}
