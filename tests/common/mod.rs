#![allow(dead_code)]
use kinema::{
    collision::PolyhedronDefinition,
    core::{Transform, Twist},
    glam::{vec3, Vec3},
    physics::{BodyIndex, Material, World, WorldConfig},
};
use tracing_subscriber::{layer::SubscriberExt, registry, util::SubscriberInitExt, EnvFilter};

pub fn init_logging() {
    let _ = registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

/// Adds a body with a single sphere of radius `radius` centered on its origin
pub fn add_ball(
    world: &mut World,
    position: Vec3,
    velocity: Vec3,
    radius: f32,
    density: f32,
    material: Material,
) -> anyhow::Result<BodyIndex> {
    let body = world.add_body(Transform::from_position(position), Twist::linear(velocity));
    world.add_sphere_shape(body, material, density, Vec3::ZERO, radius)?;
    Ok(body)
}

pub fn add_box(
    world: &mut World,
    position: Vec3,
    half_extents: Vec3,
    density: f32,
    material: Material,
) -> anyhow::Result<BodyIndex> {
    let body = world.add_body(Transform::from_position(position), Twist::ZERO);
    world.add_polyhedron_shape(
        body,
        material,
        density,
        &PolyhedronDefinition::cuboid(half_extents),
    )?;
    Ok(body)
}

/// Static floor with its top face at `y = 0`, and a row of balls dropped onto it
pub fn ball_drop(config: WorldConfig, count: usize) -> anyhow::Result<World> {
    let mut world = World::new(config);
    let ground = Material::new(0.0, 0.5, 0.4);
    add_box(
        &mut world,
        vec3(0.0, -0.5, 0.0),
        vec3(20.0, 0.5, 20.0),
        0.0,
        ground,
    )?;

    for i in 0..count {
        let x = -15.0 + i as f32 * 3.0;
        add_ball(
            &mut world,
            vec3(x, 1.5 + i as f32 * 0.25, 0.0),
            Vec3::ZERO,
            1.0,
            1.0,
            Material::new(0.2, 0.5, 0.4),
        )?;
    }

    Ok(world)
}
