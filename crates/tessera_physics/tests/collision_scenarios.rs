//! # Collision Scenarios
//!
//! End-to-end checks through a scene:
//!
//! 1. **Symmetry**: a pair is reported on both objects with mirrored manifolds
//! 2. **Filtering**: masks that do not name each other never collide
//! 3. **Manifolds**: box contacts carry several penetrating points
//! 4. **Overflow**: buffers cap at their limit and count the rest
//! 5. **Placement**: offsets and compounds are honoured

use glam::{Quat, Vec3};
use tessera_core::{EntityId, Scene, Transform};
use tessera_physics::{
    CollisionSystem, PhysicsObject, PhysicsShape, MAX_COLLISIONS, MAX_MANIFOLD_POINTS,
};

fn scene(capacity: usize) -> Scene {
    let mut scene = Scene::with_capacity(capacity);
    scene.add_system(CollisionSystem::default());
    scene
}

fn spawn(
    scene: &mut Scene,
    position: Vec3,
    groups: u32,
    flags: u32,
    shapes: Vec<PhysicsShape>,
) -> EntityId {
    let mut body = PhysicsObject::new(1.0, 1.0);
    for shape in shapes {
        body.add_shape(shape).unwrap();
    }
    body.set_collision_groups(groups);
    body.set_collision_flags(flags);

    let world = scene.world_mut();
    let entity = world.create();
    world.add_component(entity, Transform::from_position(position));
    world.add_component(entity, body);
    entity
}

// ============================================================================
// SYMMETRY
// ============================================================================

#[test]
fn overlapping_pair_is_reported_on_both_sides() {
    let mut scene = scene(8);
    let a = spawn(&mut scene, Vec3::ZERO, 1, 2, vec![PhysicsShape::sphere(1.0)]);
    let b = spawn(
        &mut scene,
        Vec3::new(1.5, 0.0, 0.0),
        2,
        1,
        vec![PhysicsShape::sphere(1.0)],
    );

    scene.simulate(0.016);

    let world = scene.world();
    let body_a = world.component::<PhysicsObject>(a);
    let body_b = world.component::<PhysicsObject>(b);

    assert_eq!(body_a.collision_ids(), &[b]);
    assert_eq!(body_b.collision_ids(), &[a]);

    let (ma, mb) = (body_a.manifolds()[0], body_b.manifolds()[0]);
    assert_eq!(ma.point_count(), mb.point_count());
    assert_eq!(ma.normal, -mb.normal);
    assert!(ma.normal.dot(Vec3::X) > 0.99);

    let point = ma.points()[0];
    assert!((point.distance + 0.5).abs() < 1e-5);
    assert_eq!(point.world_point_a, mb.points()[0].world_point_b);
}

#[test]
fn separated_objects_record_nothing() {
    let mut scene = scene(8);
    let a = spawn(&mut scene, Vec3::ZERO, 1, 1, vec![PhysicsShape::sphere(1.0)]);
    let b = spawn(
        &mut scene,
        Vec3::new(2.5, 0.0, 0.0),
        1,
        1,
        vec![PhysicsShape::cuboid(Vec3::ONE)],
    );

    scene.simulate(0.016);

    let world = scene.world();
    assert_eq!(world.component::<PhysicsObject>(a).collision_count(), 0);
    assert_eq!(world.component::<PhysicsObject>(b).collision_count(), 0);
}

// ============================================================================
// FILTERING
// ============================================================================

#[test]
fn disjoint_masks_never_collide() {
    let mut scene = scene(8);
    let a = spawn(&mut scene, Vec3::ZERO, 1, 1, vec![PhysicsShape::sphere(1.0)]);
    let b = spawn(&mut scene, Vec3::ZERO, 2, 2, vec![PhysicsShape::sphere(1.0)]);
    // C listens for A, but A does not listen for C
    let c = spawn(&mut scene, Vec3::ZERO, 2, 1, vec![PhysicsShape::sphere(1.0)]);

    scene.simulate(0.016);

    let world = scene.world();
    assert!(!world.component::<PhysicsObject>(a).is_colliding_with(b));
    assert!(!world.component::<PhysicsObject>(a).is_colliding_with(c));
    assert!(!world.component::<PhysicsObject>(c).is_colliding_with(a));
    // B and C share group 2 only through B's flags; C's flags only name group 1
    assert_eq!(world.component::<PhysicsObject>(b).collision_count(), 0);

    let stats = scene.system::<CollisionSystem>().unwrap().stats();
    assert_eq!(stats.pairs_tested, 3);
    assert_eq!(stats.pairs_filtered, 3);
}

// ============================================================================
// MANIFOLDS
// ============================================================================

#[test]
fn resting_boxes_produce_a_multi_point_manifold() {
    let mut scene = scene(8);
    let floor = spawn(
        &mut scene,
        Vec3::ZERO,
        1,
        1,
        vec![PhysicsShape::cuboid(Vec3::new(4.0, 0.5, 4.0))],
    );
    let crate_box = spawn(
        &mut scene,
        Vec3::new(0.3, 0.9, -0.2),
        1,
        1,
        vec![PhysicsShape::cuboid(Vec3::splat(0.5))],
    );

    scene.simulate(0.016);

    let world = scene.world();
    let body = world.component::<PhysicsObject>(floor);
    assert_eq!(body.collision_ids(), &[crate_box]);

    let manifold = body.manifolds()[0];
    assert!(manifold.point_count() > 1);
    assert!(manifold.point_count() <= MAX_MANIFOLD_POINTS);
    assert!(manifold.normal.dot(Vec3::Y) > 0.99);
    assert!(manifold.points().iter().all(|p| p.distance < 0.0));

    let depths: Vec<f32> = manifold.points().iter().map(|p| p.distance).collect();
    assert!(depths.windows(2).all(|w| w[0] <= w[1]));
}

// ============================================================================
// OVERFLOW
// ============================================================================

#[test]
fn collision_buffers_cap_and_count_overflow() {
    let others = MAX_COLLISIONS + 2;
    let mut scene = scene(others + 1);
    let hub = spawn(&mut scene, Vec3::ZERO, 1, 2, vec![PhysicsShape::sphere(1.0)]);
    // The satellites only collide with the hub
    for i in 0..others {
        let offset = Vec3::new(0.0, 0.0, i as f32 * 0.001);
        spawn(&mut scene, offset, 2, 1, vec![PhysicsShape::sphere(0.5)]);
    }

    scene.simulate(0.016);

    let body = scene.world().component::<PhysicsObject>(hub);
    assert_eq!(body.collision_count(), MAX_COLLISIONS);
    drop(body);

    let stats = scene.system::<CollisionSystem>().unwrap().stats();
    assert_eq!(stats.pairs_overlapping, others as u64);
    assert_eq!(stats.dropped, 2);
}

// ============================================================================
// PLACEMENT
// ============================================================================

#[test]
fn single_shape_offset_is_ignored() {
    let mut scene = scene(4);
    let a = spawn(
        &mut scene,
        Vec3::ZERO,
        1,
        1,
        vec![PhysicsShape::sphere(0.5).with_offset(Vec3::new(5.0, 0.0, 0.0))],
    );
    let near_origin = spawn(
        &mut scene,
        Vec3::new(0.8, 0.0, 0.0),
        1,
        1,
        vec![PhysicsShape::sphere(0.5)],
    );

    scene.simulate(0.016);

    assert!(scene
        .world()
        .component::<PhysicsObject>(a)
        .is_colliding_with(near_origin));
}

#[test]
fn multiple_shapes_use_their_offsets() {
    let mut scene = scene(4);
    let dumbbell = spawn(
        &mut scene,
        Vec3::ZERO,
        1,
        1,
        vec![
            PhysicsShape::sphere(0.5).with_offset(Vec3::new(-3.0, 0.0, 0.0)),
            PhysicsShape::sphere(0.5).with_offset(Vec3::new(3.0, 0.0, 0.0)),
        ],
    );
    let middle = spawn(&mut scene, Vec3::ZERO, 1, 1, vec![PhysicsShape::sphere(0.5)]);
    let end = spawn(
        &mut scene,
        Vec3::new(3.6, 0.0, 0.0),
        1,
        1,
        vec![PhysicsShape::sphere(0.5)],
    );

    scene.simulate(0.016);

    let world = scene.world();
    let body = world.component::<PhysicsObject>(dumbbell);
    assert!(!body.is_colliding_with(middle));
    assert!(body.is_colliding_with(end));
}

#[test]
fn compound_children_follow_entity_rotation() {
    let mut scene = scene(4);
    let arm = PhysicsShape::compound(vec![
        PhysicsShape::cuboid(Vec3::splat(0.25)),
        PhysicsShape::sphere(0.5).with_offset(Vec3::new(2.0, 0.0, 0.0)),
    ]);
    let spinner = spawn(&mut scene, Vec3::ZERO, 1, 1, vec![arm]);
    let above = spawn(
        &mut scene,
        Vec3::new(0.0, 2.0, 0.0),
        1,
        1,
        vec![PhysicsShape::sphere(0.25)],
    );

    scene.simulate(0.016);
    assert_eq!(
        scene.world().component::<PhysicsObject>(spinner).collision_count(),
        0
    );

    scene.world().component_mut::<Transform>(spinner).rotation =
        Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
    scene.simulate(0.016);
    assert!(scene
        .world()
        .component::<PhysicsObject>(spinner)
        .is_colliding_with(above));
}
