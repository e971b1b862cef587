use glam::Vec3;
use kinema_collision::{collide, DynamicGrid, Polyhedron, PolyhedronDefinition, Sphere};
use kinema_core::{Executor, Stopwatch, Transform, Twist};

use crate::{
    body::BodyStorage,
    contact::ContactStorage,
    solver, Body, BodyIndex, Contact, ContactCache, ContactKey, Error, Material, Result, Shape,
    ShapeIndex, StepTimes, WorldConfig, CONTACTS_PER_SHAPE,
};

/// Bodies, shapes and contacts of a simulation.
///
/// Bodies and shapes are only ever appended, so their indices stay valid for the lifetime of
/// the world. Contacts are rebuilt every step and remain readable until the next one.
#[derive(Debug, Clone)]
pub struct World {
    config: WorldConfig,
    bodies: BodyStorage,
    shapes: Vec<Shape>,
    grid: DynamicGrid,
    contacts: ContactStorage,
}

impl World {
    pub fn new(config: WorldConfig) -> Self {
        Self {
            config,
            bodies: BodyStorage::default(),
            shapes: Vec::new(),
            grid: DynamicGrid::new(),
            contacts: ContactStorage::new(),
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut WorldConfig {
        &mut self.config
    }

    /// Adds a body without mass. Mass is accumulated as shapes are attached.
    pub fn add_body(&mut self, transform: Transform, velocity: Twist) -> BodyIndex {
        self.bodies.push(Body::new(transform, velocity))
    }

    pub fn add_sphere_shape(
        &mut self,
        body: BodyIndex,
        material: Material,
        density: f32,
        center: Vec3,
        radius: f32,
    ) -> Result<ShapeIndex> {
        self.add_shape(Shape {
            body,
            material,
            density,
            geometry: Sphere::new(center, radius).into(),
        })
    }

    /// Attaches a convex polyhedron to a body.
    ///
    /// Fails if the definition references points or faces which do not exist. Geometric
    /// validity is not checked, see [`PolyhedronDefinition::validate`].
    pub fn add_polyhedron_shape(
        &mut self,
        body: BodyIndex,
        material: Material,
        density: f32,
        definition: &PolyhedronDefinition,
    ) -> Result<ShapeIndex> {
        self.add_shape(Shape {
            body,
            material,
            density,
            geometry: Polyhedron::new(definition)?.into(),
        })
    }

    fn add_shape(&mut self, shape: Shape) -> Result<ShapeIndex> {
        if shape.body.index() >= self.bodies.len() {
            return Err(Error::BodyNotFound(shape.body));
        }

        // Nothing is modified unless the contact buffer can be grown
        let index = ShapeIndex(self.shapes.len() as u32);
        self.reserve_contacts((self.shapes.len() + 1) * CONTACTS_PER_SHAPE)?;

        if shape.density != 0.0 {
            let body = &mut self.bodies.bodies[shape.body.index()];
            body.mass = body.mass.combine(&shape.mass_properties());
        }

        self.shapes.push(shape);
        self.grid.resize(self.shapes.len());

        Ok(index)
    }

    /// Ensures room for at least `capacity` contacts per step.
    ///
    /// Contacts found beyond the capacity are dropped.
    pub fn reserve_contacts(&mut self, capacity: usize) -> Result<()> {
        self.contacts.reserve(capacity)?;
        Ok(())
    }

    pub fn contact_capacity(&self) -> usize {
        self.contacts.capacity()
    }

    pub fn body(&self, index: BodyIndex) -> Option<&Body> {
        self.bodies.get(index)
    }

    pub fn body_mut(&mut self, index: BodyIndex) -> Option<&mut Body> {
        self.bodies.bodies.get_mut(index.index())
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies.bodies
    }

    pub fn bodies_mut(&mut self) -> &mut [Body] {
        &mut self.bodies.bodies
    }

    pub fn shape(&self, index: ShapeIndex) -> Option<&Shape> {
        self.shapes.get(index.index())
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Number of contacts found in the last step
    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    /// Number of contacts dropped in the last step because the capacity was exceeded
    pub fn dropped_contact_count(&self) -> usize {
        self.contacts.dropped()
    }

    /// Number of contacts which touched `body` in the last step
    pub fn body_contact_count(&self, body: BodyIndex) -> Option<u32> {
        (body.index() < self.bodies.len()).then(|| self.bodies.contact_count(body.index()))
    }

    pub fn contact(&self, index: usize) -> Option<Contact> {
        self.contacts.get(index)
    }

    pub fn contacts(&self) -> impl Iterator<Item = Contact> + '_ {
        self.contacts.iter()
    }

    /// Returns the impulses cached for warm starting the contact between two shapes
    pub fn cached_contact(&self, a: ShapeIndex, b: ShapeIndex) -> Option<ContactCache> {
        self.contacts.cache().get(&ContactKey::new(a, b))
    }

    /// Advances the world by one timestep.
    ///
    /// Every phase is dispatched through `executor` and runs to completion before the next.
    pub fn step<E: Executor>(&mut self, executor: &E) -> StepTimes {
        let _span = tracing::debug_span!(
            "step",
            bodies = self.bodies.len(),
            shapes = self.shapes.len()
        )
        .entered();

        let mut times = StepTimes::default();
        let mut stopwatch = Stopwatch::new();
        let mut lap = || stopwatch.lap().as_secs_f64();

        self.prepare(executor);
        times.preparation = lap();

        self.update_shapes(executor);
        times.shape_update = lap();

        self.update_bodies(executor);
        times.body_update = lap();

        self.detect_collisions(executor);
        times.collision_detection = lap();

        self.prepare_contacts(executor);
        times.contact_preparation = lap();

        self.apply_gravity(executor);
        times.gravity_application = lap();

        if self.config.warm_starting {
            self.load_contacts(executor);
            times.contact_cache_loading = lap();

            self.apply_split_impulses(executor);
            times.contact_warm_starting = lap();
        }

        {
            let _span = tracing::trace_span!("resolve_contacts").entered();
            for _ in 0..self.config.iteration_count {
                self.solve_contacts(executor);
                self.apply_split_impulses(executor);
            }
        }
        times.contact_resolution = lap();

        if self.config.warm_starting {
            self.save_contacts(executor);
            times.contact_cache_saving = lap();
        }

        self.finalize_bodies(executor);
        times.body_finalization = lap();

        let dropped = self.contacts.dropped();
        if dropped > 0 {
            tracing::warn!(
                capacity = self.contacts.capacity(),
                dropped,
                "contact capacity exceeded, contacts were dropped"
            );
        }

        tracing::debug!(contacts = self.contacts.len(), total = times.total(), "finished step");
        times
    }

    fn prepare(&mut self, executor: &impl Executor) {
        let _span = tracing::trace_span!("prepare").entered();
        self.bodies.reset_contacts(executor);
        self.contacts.reset();
        self.grid.clear(executor);
    }

    fn update_shapes(&mut self, executor: &impl Executor) {
        let _span = tracing::trace_span!("update_shapes").entered();
        let Self {
            bodies,
            shapes,
            grid,
            ..
        } = self;

        let bodies = &bodies.bodies;
        executor.execute_mut(shapes, |_, shape| {
            shape
                .geometry
                .update(&bodies[shape.body.index()].transform)
        });

        let shapes = &*shapes;
        grid.update(executor, |i| shapes[i].geometry.bound());
    }

    fn update_bodies(&mut self, executor: &impl Executor) {
        let _span = tracing::trace_span!("update_bodies").entered();
        executor.execute_mut(&mut self.bodies.bodies, |_, body| body.begin_step());
    }

    fn detect_collisions(&mut self, executor: &impl Executor) {
        let _span = tracing::trace_span!("detect_collisions").entered();
        let Self {
            bodies,
            shapes,
            grid,
            contacts,
            ..
        } = self;

        let (bodies, shapes, contacts) = (&*bodies, &*shapes, &*contacts);
        grid.detect(executor, |a, b| {
            if let Some(contact) = check_shapes(bodies, shapes, a, b) {
                contacts.push(contact, bodies);
            }
        });
    }

    fn prepare_contacts(&mut self, executor: &impl Executor) {
        let _span = tracing::trace_span!("prepare_contacts").entered();
        let Self {
            config,
            bodies,
            contacts,
            ..
        } = self;

        let (config, bodies) = (&*config, &*bodies);
        executor.execute_mut(contacts.slots_mut(), |_, slot| {
            solver::prepare_contact(&mut slot.get_mut().contact, bodies, config)
        });
    }

    fn apply_gravity(&mut self, executor: &impl Executor) {
        let _span = tracing::trace_span!("apply_gravity").entered();
        let (gravity, dt) = (self.config.gravity, self.config.dt);
        executor.execute_mut(&mut self.bodies.bodies, |_, body| {
            body.apply_gravity(gravity, dt)
        });
    }

    fn load_contacts(&mut self, executor: &impl Executor) {
        let _span = tracing::trace_span!("load_contacts").entered();
        let (slots, cache) = self.contacts.slots_with_cache();
        executor.execute_mut(slots, |_, slot| solver::load_contact(slot.get_mut(), cache));
    }

    fn solve_contacts(&mut self, executor: &impl Executor) {
        let bodies = &self.bodies.bodies;
        executor.execute_mut(self.contacts.slots_mut(), |_, slot| {
            solver::solve_contact(slot.get_mut(), bodies)
        });
    }

    fn apply_split_impulses(&mut self, executor: &impl Executor) {
        let BodyStorage {
            bodies,
            split_heads,
            ..
        } = &mut self.bodies;

        let (split_heads, contacts) = (&*split_heads, &self.contacts);
        executor.execute_mut(bodies, |i, body| {
            solver::apply_split_impulses(body, split_heads[i].get(), contacts)
        });
    }

    fn save_contacts(&mut self, executor: &impl Executor) {
        let _span = tracing::trace_span!("save_contacts").entered();
        let cache = self.contacts.cache();
        cache.clear(executor);

        let slots = self.contacts.slots();
        executor.execute(slots.len(), |i| {
            let contact = slots[i].borrow().contact;
            if let Err(err) = cache.insert(contact.key(), contact.cache()) {
                tracing::error!(contact = i, "failed to cache contact: {err}");
            }
        });
    }

    fn finalize_bodies(&mut self, executor: &impl Executor) {
        let _span = tracing::trace_span!("finalize_bodies").entered();
        let dt = self.config.dt;
        executor.execute_mut(&mut self.bodies.bodies, |_, body| body.end_step(dt));
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

/// Runs the narrow phase on a candidate pair of shapes.
///
/// Shapes of the same body never collide.
fn check_shapes(bodies: &BodyStorage, shapes: &[Shape], a: usize, b: usize) -> Option<Contact> {
    let (shape_a, shape_b) = (&shapes[a], &shapes[b]);
    if shape_a.body == shape_b.body {
        return None;
    }

    let collision = collide(&shape_a.geometry, &shape_b.geometry)?;
    let material = shape_a.material.combine(&shape_b.material);

    let body_a = &bodies.bodies[shape_a.body.index()];
    let body_b = &bodies.bodies[shape_b.body.index()];
    let levers = [
        collision.point - body_a.transform.position,
        collision.point - body_b.transform.position,
    ];

    Some(Contact::new(
        [ShapeIndex(a as u32), ShapeIndex(b as u32)],
        [shape_a.body, shape_b.body],
        &collision,
        material,
        levers,
    ))
}
