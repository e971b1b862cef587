use kinema::{
    core::{DeviceConfig, DeviceContext, Executor, ParallelExecutor, SequentialExecutor},
    physics::{DeviceWorld, World, WorldConfig},
};

mod common;
use common::*;

fn simulate(executor: &impl Executor, config: WorldConfig, steps: usize) -> anyhow::Result<World> {
    let mut world = ball_drop(config, 10)?;
    for _ in 0..steps {
        world.step(executor);
    }

    Ok(world)
}

fn assert_same_state(a: &World, b: &World) {
    assert_eq!(a.bodies().len(), b.bodies().len());
    assert_eq!(a.contact_count(), b.contact_count());

    for (a, b) in a.bodies().iter().zip(b.bodies()) {
        let (a, b) = (a.transform.position, b.transform.position);
        assert!(a.abs_diff_eq(b, 1e-4), "{a} != {b}");
    }
}

#[test]
fn executors_agree() -> anyhow::Result<()> {
    init_logging();

    let context = DeviceContext::new(DeviceConfig {
        lanes: 4,
        workers: 3,
    })?;

    for warm_starting in [false, true] {
        let config = WorldConfig::default().with_warm_starting(warm_starting);

        let sequential = simulate(&SequentialExecutor, config, 90)?;
        let parallel = simulate(&ParallelExecutor::with_threads(4)?, config, 90)?;
        let device = simulate(&context.executor(), config, 90)?;

        assert_same_state(&sequential, &parallel);
        assert_same_state(&sequential, &device);
    }

    Ok(())
}

#[test]
fn device_world_round_trip() -> anyhow::Result<()> {
    init_logging();

    let context = DeviceContext::new(DeviceConfig::default())?;
    let config = WorldConfig::default().with_warm_starting(true);

    let mut host = ball_drop(config, 6)?;
    let mut reference = host.clone();

    let mut device = DeviceWorld::upload(&context, &host);
    for _ in 0..60 {
        device.step();
        reference.step(&SequentialExecutor);
    }

    // Nothing is transferred back until requested
    assert_eq!(host.contact_count(), 0);
    assert_eq!(device.contact_count(), reference.contact_count());

    device.download(&mut host);
    assert_same_state(&host, &reference);

    for contact in reference.contacts() {
        let key = contact.key();
        assert_eq!(
            host.cached_contact(key.a, key.b).is_some(),
            reference.cached_contact(key.a, key.b).is_some()
        );
    }

    // A partial transfer only brings the bodies up to date
    device.config_mut().iteration_count = 4;
    device.step();
    device.download_bodies(&mut host)?;
    assert_eq!(host.bodies(), device.bodies());

    Ok(())
}
