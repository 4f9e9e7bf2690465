use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;
use saunter::game::config::InitialConfig;
use saunter::game::navigation::{
    FootPosition, NavRect, NavSettings, NavigationContext, NavigationPlugin, NavigationSystems,
    ObstacleSet, PathFollower, SolidObject, WalkFailed, WalkFinished, WalkRequest, WalkabilityField,
};
use saunter::game::scene::{SceneArea, ScenePlugin};

const PLAYER_SPEED: f32 = 210.0;
const MAX_FRAMES: usize = 2_000;

#[derive(Resource, Default)]
struct Outcomes {
    finished: Vec<Entity>,
    failed: Vec<(Entity, Vec2)>,
}

fn collect_outcomes(
    mut finished: MessageReader<WalkFinished>,
    mut failed: MessageReader<WalkFailed>,
    mut outcomes: ResMut<Outcomes>,
) {
    outcomes.finished.extend(finished.read().map(|m| m.entity));
    outcomes.failed.extend(failed.read().map(|m| (m.entity, m.target)));
}

fn build_app(ctx: Option<NavigationContext>) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(16)));
    if let Some(ctx) = ctx {
        app.insert_resource(ctx);
    }
    app.add_plugins(NavigationPlugin);
    app.init_resource::<Outcomes>();
    app.add_systems(Update, collect_outcomes.after(NavigationSystems));
    app.update();
    app
}

/// 400x300 room with a wall hanging from the ceiling down to y=200.
fn walled_room() -> NavigationContext {
    NavigationContext::new(WalkabilityField::open(400, 300), NavSettings::default())
        .with_obstacles(ObstacleSet::new([NavRect::new(180.0, 0.0, 40.0, 200.0)]))
}

fn spawn_walker(app: &mut App, at: Vec2) -> Entity {
    app.world_mut().spawn((FootPosition(at), PathFollower::new(PLAYER_SPEED))).id()
}

fn walk(app: &mut App, entity: Entity, target: Vec2) {
    app.world_mut().write_message(WalkRequest { entity, target });
}

/// Step until the predicate holds, returning how many frames that took.
fn run_until(app: &mut App, mut done: impl FnMut(&App) -> bool) -> Option<usize> {
    for frame in 0..MAX_FRAMES {
        app.update();
        if done(&*app) {
            return Some(frame);
        }
    }
    None
}

fn foot(app: &App, entity: Entity) -> Vec2 {
    app.world().get::<FootPosition>(entity).unwrap().0
}

fn is_following(app: &App, entity: Entity) -> bool {
    app.world().get::<PathFollower>(entity).unwrap().is_following()
}

#[test]
fn test_walk_around_wall_finishes_exactly_once() {
    let mut app = build_app(Some(walled_room()));
    let actor = spawn_walker(&mut app, Vec2::new(40.0, 80.0));
    let target = Vec2::new(350.0, 80.0);

    walk(&mut app, actor, target);
    let frames = run_until(&mut app, |app| !app.world().resource::<Outcomes>().finished.is_empty());
    assert!(frames.is_some(), "walker never arrived, stuck at {}", foot(&app, actor));

    for _ in 0..10 {
        app.update();
    }

    let outcomes = app.world().resource::<Outcomes>();
    assert_eq!(outcomes.finished, vec![actor]);
    assert!(outcomes.failed.is_empty());
    assert_eq!(foot(&app, actor), target);
    assert!(!is_following(&app, actor));
}

#[test]
fn test_walking_follows_the_corridor() {
    let mut app = build_app(Some(walled_room()));
    let actor = spawn_walker(&mut app, Vec2::new(40.0, 80.0));
    walk(&mut app, actor, Vec2::new(350.0, 80.0));

    let mut deepest = 0.0f32;
    run_until(&mut app, |app| {
        deepest = deepest.max(foot(app, actor).y);
        !app.world().resource::<Outcomes>().finished.is_empty()
    })
    .expect("walker should arrive");

    assert!(deepest >= 200.0, "walker never went under the wall (max y {deepest})");
}

#[test]
fn test_unreachable_target_reports_failure() {
    let pocket = NavRect::new(290.0, 40.0, 20.0, 20.0);
    let ring = [
        NavRect::new(270.0, 20.0, 60.0, 20.0),
        NavRect::new(270.0, 60.0, 60.0, 20.0),
        NavRect::new(270.0, 40.0, 20.0, 20.0),
        NavRect::new(310.0, 40.0, 20.0, 20.0),
    ];
    let ctx = NavigationContext::new(WalkabilityField::open(400, 300), NavSettings::default())
        .with_obstacles(ObstacleSet::new(ring));
    let mut app = build_app(Some(ctx));
    let actor = spawn_walker(&mut app, Vec2::new(40.0, 250.0));
    let target = pocket.center();

    walk(&mut app, actor, target);
    app.update();

    let outcomes = app.world().resource::<Outcomes>();
    assert_eq!(outcomes.failed, vec![(actor, target)]);
    assert!(outcomes.finished.is_empty());
    assert!(!is_following(&app, actor));
    assert_eq!(foot(&app, actor), Vec2::new(40.0, 250.0));
}

#[test]
fn test_click_on_obstacle_walks_beside_it() {
    let table = NavRect::new(150.0, 100.0, 80.0, 40.0);
    let ctx = NavigationContext::new(WalkabilityField::open(400, 300), NavSettings::default())
        .with_obstacles(ObstacleSet::new([table]));
    let mut app = build_app(Some(ctx));
    let actor = spawn_walker(&mut app, Vec2::new(20.0, 250.0));

    walk(&mut app, actor, table.center());
    run_until(&mut app, |app| !app.world().resource::<Outcomes>().finished.is_empty())
        .expect("walker should reach the table");

    let end = foot(&app, actor);
    assert!(!table.contains(end));
    assert!(end.distance(table.center()) <= NavSettings::default().goal_repair_radius);
}

#[test]
fn test_new_request_replaces_walk_in_progress() {
    let mut app = build_app(Some(walled_room()));
    let actor = spawn_walker(&mut app, Vec2::new(40.0, 250.0));

    walk(&mut app, actor, Vec2::new(350.0, 250.0));
    for _ in 0..10 {
        app.update();
    }
    assert!(is_following(&app, actor));

    let second = Vec2::new(40.0, 280.0);
    walk(&mut app, actor, second);
    run_until(&mut app, |app| !app.world().resource::<Outcomes>().finished.is_empty())
        .expect("second walk should finish");
    for _ in 0..200 {
        app.update();
    }

    assert_eq!(app.world().resource::<Outcomes>().finished, vec![actor]);
    assert_eq!(foot(&app, actor), second);
}

#[test]
fn test_obstacle_rebuild_waits_for_walk_to_end() {
    let ctx = NavigationContext::new(WalkabilityField::open(400, 300), NavSettings::default());
    let mut app = build_app(Some(ctx));
    let actor = spawn_walker(&mut app, Vec2::new(20.0, 20.0));

    walk(&mut app, actor, Vec2::new(380.0, 20.0));
    app.update();
    assert!(is_following(&app, actor));

    let chest = app
        .world_mut()
        .spawn(SolidObject::hotspot(NavRect::new(100.0, 200.0, 30.0, 30.0)))
        .id();
    app.update();
    assert!(
        app.world().resource::<NavigationContext>().obstacles.is_empty(),
        "obstacles must not change under a walking actor"
    );

    run_until(&mut app, |app| !app.world().resource::<Outcomes>().finished.is_empty())
        .expect("walker should arrive");
    app.update();
    {
        let ctx = app.world().resource::<NavigationContext>();
        assert_eq!(ctx.obstacles.len(), 1);
        assert!(ctx.obstacles.blocks(97.0, 197.0), "hotspots get extra clearance");
    }

    // Picking the object up clears the way again
    app.world_mut().despawn(chest);
    app.update();
    assert!(app.world().resource::<NavigationContext>().obstacles.is_empty());
}

#[test]
fn test_walk_request_before_scene_load_is_ignored() {
    let mut app = build_app(None);
    let actor = spawn_walker(&mut app, Vec2::new(20.0, 20.0));

    walk(&mut app, actor, Vec2::new(100.0, 20.0));
    app.update();

    assert!(!is_following(&app, actor));
    let outcomes = app.world().resource::<Outcomes>();
    assert!(outcomes.failed.is_empty());
    assert!(outcomes.finished.is_empty());
}

#[test]
fn test_scene_load_builds_context_from_solids() {
    let mut app = build_app(None);
    app.insert_resource(InitialConfig::default());
    app.add_plugins(ScenePlugin);

    app.world_mut().spawn(SolidObject::hotspot(NavRect::new(100.0, 100.0, 40.0, 40.0)));
    app.world_mut().spawn(SolidObject::ambient(NavRect::new(300.0, 200.0, 40.0, 40.0)));
    let actor = app
        .world_mut()
        .spawn((FootPosition(Vec2::new(10.0, 10.0)), PathFollower::new(PLAYER_SPEED), Transform::default()))
        .id();
    app.insert_resource(SceneArea::new(800, 450));
    app.update();

    let ctx = app.world().resource::<NavigationContext>();
    assert!(ctx.is_loaded());
    assert!(!ctx.field.has_mask());
    assert_eq!(ctx.field.width(), 800);
    assert_eq!(ctx.bounds, NavRect::new(0.0, 0.0, 800.0, 450.0));
    assert_eq!(ctx.obstacles.len(), 2);
    assert!(ctx.obstacles.blocks(96.0, 96.0));
    assert!(!ctx.obstacles.blocks(310.0, 201.0));

    let translation = app.world().get::<Transform>(actor).unwrap().translation;
    assert_eq!(translation, Vec3::new(-390.0, 215.0, 0.0));
}
