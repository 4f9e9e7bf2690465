use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use crate::game::navigation::{SolidObject, WalkFailed, WalkRequest};
use crate::game::scene::SceneArea;
use crate::game::Player;

pub struct ControlPlugin;

impl Plugin for ControlPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (handle_input, report_unreachable));
    }
}

/// Left click walks the player to the cursor. Right click on a solid object
/// picks it up, which clears the way once the player stands still.
fn handle_input(
    mut commands: Commands,
    mouse_button: Res<ButtonInput<MouseButton>>,
    q_window: Query<&Window, With<PrimaryWindow>>,
    q_camera: Query<(&Camera, &GlobalTransform)>,
    q_player: Query<Entity, With<Player>>,
    q_solids: Query<(Entity, &SolidObject)>,
    area: Option<Res<SceneArea>>,
    mut walk_requests: MessageWriter<WalkRequest>,
) {
    let Some(area) = area else { return };
    let Ok(window) = q_window.single() else { return };
    let Some(cursor_position) = window.cursor_position() else { return };
    let Some((camera, camera_transform)) = q_camera.iter().next() else { return };
    let Ok(world) = camera.viewport_to_world_2d(camera_transform, cursor_position) else { return };
    let target = area.to_scene(world);

    if mouse_button.just_pressed(MouseButton::Left) {
        let Ok(player) = q_player.single() else { return };
        walk_requests.write(WalkRequest { entity: player, target });
    } else if mouse_button.just_pressed(MouseButton::Right) {
        if let Some((entity, _)) = q_solids.iter().find(|(_, solid)| solid.bounds.contains(target)) {
            info!("Picked up object at {}", target);
            commands.entity(entity).despawn();
        }
    }
}

fn report_unreachable(mut failures: MessageReader<WalkFailed>) {
    for failure in failures.read() {
        info!("I can't reach that spot ({})", failure.target);
    }
}
