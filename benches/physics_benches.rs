//! Benchmarks for the all-pairs step and the narrow phase.

use block_physics::narrowphase::check_collision;
use block_physics::{Collider, PhysicsWorld, RigidBody};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nalgebra::{UnitQuaternion, Vector3};

fn grid_world<const N: usize>(count: usize) -> PhysicsWorld<N> {
    let mut world = PhysicsWorld::<N>::new();
    world
        .add_body(RigidBody::new_static(Collider::cuboid(Vector3::new(100.0, 1.0, 100.0))))
        .unwrap();
    for i in 0..count {
        let pos = Vector3::new((i % 8) as f32 * 2.5, (i / 8) as f32 * 2.5 + 3.0, 0.0);
        let collider = match i % 4 {
            0 => Collider::sphere(1.0),
            1 => Collider::cuboid(Vector3::new(1.0, 1.0, 1.0)),
            2 => Collider::capsule(0.5, 1.0),
            _ => Collider::cylinder(1.0, 2.0),
        };
        world
            .add_body(RigidBody::new(collider, 1.0).with_position(pos))
            .unwrap();
    }
    world
}

fn bench_world_step(c: &mut Criterion) {
    c.bench_function("world_step_32_bodies", |b| {
        let mut world = grid_world::<33>(32);
        b.iter(|| {
            world.step(black_box(1.0 / 60.0));
        })
    });

    c.bench_function("world_step_128_bodies", |b| {
        let mut world = grid_world::<129>(128);
        b.iter(|| {
            world.step(black_box(1.0 / 60.0));
        })
    });
}

fn bench_narrowphase(c: &mut Criterion) {
    let rot = UnitQuaternion::from_euler_angles(0.3, 0.7, 0.1);
    let mut a = Collider::cuboid(Vector3::new(1.0, 1.0, 1.0));
    a.update_transform(Vector3::zeros(), rot, Vector3::new(1.0, 1.0, 1.0));
    let mut b = Collider::cuboid(Vector3::new(1.0, 1.0, 1.0));
    b.update_transform(Vector3::new(1.5, 0.4, 0.2), UnitQuaternion::identity(), Vector3::new(1.0, 1.0, 1.0));

    c.bench_function("box_box_sat", |bench| {
        bench.iter(|| black_box(check_collision(black_box(&a), black_box(&b))))
    });

    let mut cap = Collider::capsule(0.5, 2.0);
    cap.update_transform(Vector3::new(0.8, 0.0, 0.0), UnitQuaternion::identity(), Vector3::new(1.0, 1.0, 1.0));
    c.bench_function("capsule_box", |bench| {
        bench.iter(|| black_box(check_collision(black_box(&cap), black_box(&a))))
    });
}

criterion_group!(benches, bench_world_step, bench_narrowphase);
criterion_main!(benches);
