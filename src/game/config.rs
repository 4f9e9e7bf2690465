use bevy::prelude::*;
use bevy_common_assets::ron::RonAssetPlugin;
use serde::{Deserialize, Serialize};
use crate::game::navigation::{HeuristicMode, NavSettings};

const INITIAL_CONFIG_PATH: &str = "assets/initial_config.ron";

/// Static configuration loaded once at startup. Navigation parameters live here
/// because a scene's navigation context is built from them on load and must not
/// shift under an actor mid-walk.
#[derive(Resource, Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct InitialConfig {
    // Scene area
    pub game_width: u32,
    pub game_area_height: u32,

    // Pathfinding
    pub grid_size: u32,
    pub heuristic: HeuristicMode,
    pub max_iterations: usize,
    pub goal_repair_radius: f32,
    pub fallback_radius: f32,

    // Obstacle clearance (total width/height change)
    pub hotspot_inflation: (f32, f32),
    pub ambient_inflation: (f32, f32),

    // Actors
    pub player_speed: f32,
}

impl InitialConfig {
    /// Replace values that would make the navigation core misbehave.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if self.grid_size == 0 {
            error!("grid_size must be greater than zero, using {}", defaults.grid_size);
            self.grid_size = defaults.grid_size;
        }
        if self.max_iterations == 0 {
            error!("max_iterations must be greater than zero, using {}", defaults.max_iterations);
            self.max_iterations = defaults.max_iterations;
        }
        if !(self.player_speed > 0.0) {
            error!("player_speed must be positive, using {}", defaults.player_speed);
            self.player_speed = defaults.player_speed;
        }
        self
    }

    pub fn nav_settings(&self) -> NavSettings {
        NavSettings {
            grid_size: self.grid_size,
            heuristic: self.heuristic,
            max_iterations: self.max_iterations,
            goal_repair_radius: self.goal_repair_radius,
            fallback_radius: self.fallback_radius,
            hotspot_inflation: Vec2::new(self.hotspot_inflation.0, self.hotspot_inflation.1),
            ambient_inflation: Vec2::new(self.ambient_inflation.0, self.ambient_inflation.1),
        }
    }
}

/// Runtime configuration that can be hot-reloaded during play.
/// Nothing here affects where actors are able to walk.
#[derive(Deserialize, Serialize, Asset, TypePath, Clone, Debug)]
pub struct GameConfig {
    pub key_toggle_navigation_debug: KeyCode,
    pub show_navigation_debug: bool,
}

#[derive(Resource)]
pub struct GameConfigHandle(pub Handle<GameConfig>);

pub struct GameConfigPlugin;

impl Plugin for GameConfigPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(RonAssetPlugin::<GameConfig>::new(&["game_config.ron"]))
           .add_systems(Startup, (load_initial_config, setup_runtime_config).chain());
    }
}

/// Parse the initial config, falling back to defaults on any error.
pub fn parse_initial_config(contents: &str) -> InitialConfig {
    match ron::from_str::<InitialConfig>(contents) {
        Ok(config) => config.validated(),
        Err(e) => {
            error!("Failed to parse initial config: {}", e);
            error!("Using default InitialConfig");
            InitialConfig::default()
        }
    }
}

/// Load static initial configuration synchronously at startup.
/// Scene setup depends on it, so it must run first.
pub fn load_initial_config(mut commands: Commands) {
    match std::fs::read_to_string(INITIAL_CONFIG_PATH) {
        Ok(contents) => {
            let config = parse_initial_config(&contents);
            info!("Loaded initial config from {}", INITIAL_CONFIG_PATH);
            commands.insert_resource(config);
        }
        Err(e) => {
            error!("Failed to read {}: {}", INITIAL_CONFIG_PATH, e);
            error!("Using default InitialConfig");
            commands.insert_resource(InitialConfig::default());
        }
    }
}

/// Load runtime configuration asynchronously (can be hot-reloaded).
fn setup_runtime_config(mut commands: Commands, asset_server: Res<AssetServer>) {
    let handle = asset_server.load("game_config.ron");
    commands.insert_resource(GameConfigHandle(handle));
}

impl Default for InitialConfig {
    fn default() -> Self {
        Self {
            game_width: 800,
            game_area_height: 450,
            grid_size: 10,
            heuristic: HeuristicMode::Euclidean,
            max_iterations: 10_000,
            goal_repair_radius: 200.0,
            fallback_radius: 120.0,
            hotspot_inflation: (10.0, 10.0),
            ambient_inflation: (0.0, -4.0),
            player_speed: 210.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipped_initial_config_parses() {
        let config: InitialConfig = ron::from_str(include_str!("../../assets/initial_config.ron"))
            .expect("assets/initial_config.ron should parse");
        assert!(config.grid_size > 0);
        assert_eq!(config.max_iterations, 10_000);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config = parse_initial_config("(grid_size: 5, heuristic: Manhattan)");
        assert_eq!(config.grid_size, 5);
        assert_eq!(config.heuristic, HeuristicMode::Manhattan);
        assert_eq!(config.player_speed, 210.0);
    }

    #[test]
    fn test_zero_grid_size_is_replaced() {
        let config = parse_initial_config("(grid_size: 0)");
        assert_eq!(config.grid_size, 10);
    }

    #[test]
    fn test_malformed_config_falls_back() {
        let config = parse_initial_config("(grid_size: \"ten\")");
        assert_eq!(config.grid_size, InitialConfig::default().grid_size);
    }

    #[test]
    fn test_nav_settings_carry_inflation() {
        let settings = InitialConfig::default().nav_settings();
        assert_eq!(settings.hotspot_inflation, Vec2::new(10.0, 10.0));
        assert_eq!(settings.ambient_inflation, Vec2::new(0.0, -4.0));
        assert_eq!(settings.fallback_radius, 120.0);
    }
}
