//! Integration tests for block-physics
//! These tests drive whole scenes through `PhysicsWorld::step`

use block_physics::{Collider, PhysicsError, PhysicsWorld, RigidBody, WorldConfig};
use nalgebra::{UnitQuaternion, Vector3};

const DT: f32 = 1.0 / 60.0;

fn approx_eq(a: f32, b: f32, tol: f32) -> bool {
    (a - b).abs() < tol
}

fn floor(half_extents: Vector3<f32>) -> RigidBody {
    RigidBody::new_static(Collider::cuboid(half_extents))
}

fn run<const N: usize>(world: &mut PhysicsWorld<N>, steps: usize) {
    for _ in 0..steps {
        world.step(DT);
    }
}

#[test]
fn test_sphere_settles_on_static_box() {
    let mut world = PhysicsWorld::<4>::new();
    // Top surface at y = 10
    world.add_body(floor(Vector3::new(20.0, 10.0, 20.0))).unwrap();
    let ball = world
        .add_body(RigidBody::new(Collider::sphere(5.0), 1.0).with_position(Vector3::new(0.0, 100.0, 0.0)))
        .unwrap();

    run(&mut world, 300);

    let body = world.body(ball).unwrap();
    assert!(approx_eq(body.position().y, 15.0, 1e-2), "rest height {}", body.position().y);
    assert_eq!(body.velocity().y, 0.0);
    assert!(body.is_on_ground());
    assert!(approx_eq(body.position().x, 0.0, 1e-4));
    assert!(approx_eq(body.position().z, 0.0, 1e-4));
}

#[test]
fn test_sphere_added_before_floor_is_never_grounded() {
    let mut world = PhysicsWorld::<4>::new();
    let ball = world
        .add_body(RigidBody::new(Collider::sphere(5.0), 1.0).with_position(Vector3::new(0.0, 100.0, 0.0)))
        .unwrap();
    world.add_body(floor(Vector3::new(20.0, 10.0, 20.0))).unwrap();

    let mut touched_floor = false;
    for _ in 0..600 {
        world.step(DT);
        let body = world.body(ball).unwrap();
        assert!(!body.is_on_ground());
        touched_floor |= body.position().y < 15.0;
    }

    // Downward contact normals never ground it, so it ends up under the floor
    let body = world.body(ball).unwrap();
    assert!(touched_floor);
    assert!(body.position().y < -10.0, "ball at {}", body.position().y);
    assert!(body.velocity().y < 0.0);
}

#[test]
fn test_box_block_settles_on_floor() {
    let mut world = PhysicsWorld::<4>::new();
    world.add_body(floor(Vector3::new(5.0, 1.0, 5.0))).unwrap();
    let block = world
        .add_body(
            RigidBody::new(Collider::cuboid(Vector3::new(1.0, 1.0, 1.0)), 1.0)
                .with_position(Vector3::new(0.0, 4.0, 0.0)),
        )
        .unwrap();

    run(&mut world, 120);

    let body = world.body(block).unwrap();
    assert!(approx_eq(body.position().y, 2.0, 1e-2));
    assert!(body.is_on_ground());
    assert_eq!(body.orientation(), UnitQuaternion::identity());
}

#[test]
fn test_cylinder_settles_on_floor() {
    let mut world = PhysicsWorld::<4>::new();
    world.add_body(floor(Vector3::new(5.0, 1.0, 5.0))).unwrap();
    let cyl = world
        .add_body(RigidBody::new(Collider::cylinder(1.0, 2.0), 1.0).with_position(Vector3::new(0.0, 4.0, 0.0)))
        .unwrap();

    run(&mut world, 120);

    let body = world.body(cyl).unwrap();
    assert!(approx_eq(body.position().y, 2.0, 1e-2));
    assert!(body.is_on_ground());
}

#[test]
fn test_capsule_player_stands_upright() {
    let mut world = PhysicsWorld::<4>::new();
    world.add_body(floor(Vector3::new(5.0, 1.0, 5.0))).unwrap();
    let player = world
        .add_body(
            RigidBody::new(Collider::capsule(0.5, 2.0), 1.0)
                .with_position(Vector3::new(0.0, 3.0, 0.0))
                .with_friction(1.5)
                .with_angular_factor(Vector3::zeros()),
        )
        .unwrap();

    run(&mut world, 120);

    let body = world.body(player).unwrap();
    // Segment bottom at 1.5, radius 0.5 above the floor top at 1
    assert!(approx_eq(body.position().y, 2.5, 1e-2));
    assert!(body.is_on_ground());
    assert_eq!(body.angular_velocity(), Vector3::zeros());
    assert_eq!(body.orientation(), UnitQuaternion::identity());
}

#[test]
fn test_dynamic_collision_conserves_momentum() {
    let config = WorldConfig::default().with_gravity(Vector3::zeros());
    let mut world = PhysicsWorld::<4>::with_config(config);
    let a = world
        .add_body(
            RigidBody::new(Collider::sphere(1.0), 1.0)
                .with_position(Vector3::new(-1.0, 0.0, 0.0))
                .with_velocity(Vector3::new(3.0, 0.0, 0.0))
                .with_friction(0.0),
        )
        .unwrap();
    let b = world
        .add_body(
            RigidBody::new(Collider::sphere(1.0), 2.0)
                .with_position(Vector3::new(1.0, 0.0, 0.0))
                .with_velocity(Vector3::new(-3.0, 0.0, 0.0))
                .with_friction(0.0),
        )
        .unwrap();

    world.step(DT);

    let body_a = world.body(a).unwrap();
    let body_b = world.body(b).unwrap();
    let momentum = body_a.velocity() * body_a.mass() + body_b.velocity() * body_b.mass();
    assert!(approx_eq(momentum.x, -3.0, 1e-3));
    assert!(approx_eq(momentum.y, 0.0, 1e-4));
    let gap = (body_b.position() - body_a.position()).norm();
    assert!(gap > 2.0 - 1e-3, "spheres still overlap: {}", gap);
}

#[test]
fn test_moving_platform_carries_resting_ball() {
    let mut world = PhysicsWorld::<4>::new();
    let platform = world.add_body(floor(Vector3::new(5.0, 1.0, 5.0))).unwrap();
    let ball = world
        .add_body(RigidBody::new(Collider::sphere(1.0), 1.0).with_position(Vector3::new(0.0, 2.5, 0.0)))
        .unwrap();
    run(&mut world, 60);
    assert!(approx_eq(world.body(ball).unwrap().position().y, 2.0, 1e-2));

    for i in 1..=10 {
        world
            .set_body_transform(
                platform,
                Vector3::new(0.0, 0.1 * i as f32, 0.0),
                UnitQuaternion::identity(),
                Vector3::new(1.0, 1.0, 1.0),
            )
            .unwrap();
        world.step(DT);
    }

    let body = world.body(ball).unwrap();
    assert!(approx_eq(body.position().y, 3.0, 1e-2));
    assert!(body.is_on_ground());
}

#[test]
fn test_removed_body_no_longer_collides() {
    let mut world = PhysicsWorld::<4>::new();
    let ground = world.add_body(floor(Vector3::new(5.0, 1.0, 5.0))).unwrap();
    let ball = world
        .add_body(RigidBody::new(Collider::sphere(1.0), 1.0).with_position(Vector3::new(0.0, 2.0, 0.0)))
        .unwrap();
    run(&mut world, 10);

    assert!(world.remove_body(ground).is_some());
    assert!(world.remove_body(ground).is_none());
    run(&mut world, 10);

    let body = world.body(ball).unwrap();
    assert!(body.position().y < 2.0);
    assert!(!body.is_on_ground());
}

#[test]
fn test_world_full_reports_capacity() {
    let mut world = PhysicsWorld::<1>::new();
    world.add_body(floor(Vector3::new(1.0, 1.0, 1.0))).unwrap();
    let err = world.add_body(floor(Vector3::new(1.0, 1.0, 1.0))).unwrap_err();
    assert_eq!(err, PhysicsError::WorldFull { capacity: 1 });
    assert_eq!(err.to_string(), "physics world is full (capacity 1)");
}

#[test]
fn test_raycast_picks_rotated_block() {
    let mut world = PhysicsWorld::<4>::new();
    let rot = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), std::f32::consts::FRAC_PI_4);
    let block = world
        .add_body(floor(Vector3::new(1.0, 1.0, 1.0)).with_transform(
            Vector3::new(0.0, 0.0, 0.0),
            rot,
            Vector3::new(1.0, 1.0, 1.0),
        ))
        .unwrap();

    // Straight down onto the top face
    let hit = world
        .raycast(Vector3::new(0.5, 10.0, 0.0), Vector3::new(0.0, -1.0, 0.0))
        .unwrap();
    assert_eq!(hit.body, block);
    assert!(approx_eq(hit.distance, 9.0, 1e-4));

    // Past the rotated corner
    assert!(world
        .raycast(Vector3::new(1.2, 10.0, 1.2), Vector3::new(0.0, -1.0, 0.0))
        .is_none());
}
