use kinema_core::DeviceContext;

use crate::{Body, Error, Result, StepTimes, World, WorldConfig};

/// Copy of a [`World`] resident on a device.
///
/// The host world is left untouched while the device copy is stepped, until the state is
/// transferred back with [`DeviceWorld::download`].
#[derive(Debug)]
pub struct DeviceWorld<'a> {
    context: &'a DeviceContext,
    world: World,
}

impl<'a> DeviceWorld<'a> {
    /// Transfers every body, shape, contact and the contact cache of `world` to the device
    pub fn upload(context: &'a DeviceContext, world: &World) -> Self {
        tracing::debug!(
            bodies = world.bodies().len(),
            shapes = world.shapes().len(),
            capacity = world.contact_capacity(),
            "uploading world"
        );

        Self {
            context,
            world: world.clone(),
        }
    }

    /// Transfers the complete device state back into `world`
    pub fn download(&self, world: &mut World) {
        tracing::debug!(
            bodies = self.world.bodies().len(),
            contacts = self.world.contact_count(),
            "downloading world"
        );

        world.clone_from(&self.world);
    }

    /// Transfers only the body state back into `world`.
    ///
    /// Fails if the number of bodies has changed since the upload.
    pub fn download_bodies(&self, world: &mut World) -> Result<()> {
        let (host, device) = (world.bodies().len(), self.world.bodies().len());
        if host != device {
            return Err(Error::BodyCountMismatch { host, device });
        }

        tracing::debug!(bodies = device, "downloading bodies");
        world.bodies_mut().copy_from_slice(self.world.bodies());
        Ok(())
    }

    pub fn step(&mut self) -> StepTimes {
        self.world.step(&self.context.executor())
    }

    pub fn context(&self) -> &'a DeviceContext {
        self.context
    }

    /// Number of contacts found in the last device step, read without transferring the world
    pub fn contact_count(&self) -> usize {
        self.world.contact_count()
    }

    pub fn dropped_contact_count(&self) -> usize {
        self.world.dropped_contact_count()
    }

    pub fn bodies(&self) -> &[Body] {
        self.world.bodies()
    }

    pub fn config_mut(&mut self) -> &mut WorldConfig {
        self.world.config_mut()
    }
}
