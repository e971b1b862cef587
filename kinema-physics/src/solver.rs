//! Per contact and per body operations of the sequential impulse solver.
//!
//! Contacts never write body velocities directly. Each solve records the impulse change of a
//! contact in its two split impulses, and a following per body pass sums the split impulses in
//! the body's list and applies them. This makes every pass free of write conflicts.
use glam::Vec3;
use kinema_core::{list, ConcurrentMap, Twist};

use crate::{
    body::BodyStorage,
    contact::{ContactSlot, ContactStorage},
    Body, Contact, ContactCache, ContactKey, WorldConfig,
};

/// Relative velocity of the second body with respect to the first at the contact point
fn relative_velocity(contact: &Contact, bodies: &[Body]) -> Vec3 {
    let [a, b] = contact.bodies.map(|v| &bodies[v.index()]);
    b.velocity.point_velocity(contact.levers[1]) - a.velocity.point_velocity(contact.levers[0])
}

/// Inverse mass of the contact along `direction`, scaled by the number of contacts of each body
fn weighted_inverse_mass(contact: &Contact, bodies: &BodyStorage, direction: Vec3) -> f32 {
    contact
        .bodies
        .iter()
        .zip(contact.levers)
        .map(|(body, lever)| {
            let inverse_mass = bodies.bodies[body.index()].inverse_mass;
            inverse_mass.effective(lever, direction) * bodies.contact_count(body.index()) as f32
        })
        .sum()
}

/// Computes the target separation velocity and the effective masses of a contact.
pub(crate) fn prepare_contact(contact: &mut Contact, bodies: &BodyStorage, config: &WorldConfig) {
    let relative = relative_velocity(contact, &bodies.bodies);
    let normal_velocity = contact.normal.dot(relative);

    contact.target_normal_velocity =
        -normal_velocity.min(0.0) * contact.material.restitution.sqrt();

    if config.correction_enabled() {
        let correction = (contact.depth / config.dt * config.correction_velocity_factor)
            .min(config.correction_velocity_limit);

        contact.target_normal_velocity = contact.target_normal_velocity.max(correction);
    }

    let normal_inverse_mass = weighted_inverse_mass(contact, bodies, contact.normal);
    if normal_inverse_mass != 0.0 {
        contact.normal_mass = 1.0 / normal_inverse_mass;
    }

    let tangent_velocity = relative - contact.normal * normal_velocity;
    let length = tangent_velocity.length();
    if length != 0.0 {
        contact.tangent = tangent_velocity / length;

        let tangent_inverse_mass = weighted_inverse_mass(contact, bodies, contact.tangent);
        if tangent_inverse_mass != 0.0 {
            contact.tangent_mass = 1.0 / tangent_inverse_mass;
        }
    }
}

/// Seeds a contact with the impulses it accumulated during the previous step.
///
/// Contacts without a cached entry start from zero.
pub(crate) fn load_contact(
    slot: &mut ContactSlot,
    cache: &ConcurrentMap<ContactKey, ContactCache>,
) {
    match cache.get(&slot.contact.key()) {
        Some(cached) => {
            slot.contact.persist(cached);
            let impulse = slot.contact.impulse();
            slot.set_impulse(impulse);
        }
        None => slot.set_impulse(Vec3::ZERO),
    }
}

/// Runs one solver iteration on a contact, recording the impulse change as split impulses.
pub(crate) fn solve_contact(slot: &mut ContactSlot, bodies: &[Body]) {
    let contact = &mut slot.contact;
    let relative = relative_velocity(contact, bodies);

    let normal_velocity = contact.normal.dot(relative);
    let normal_impulse = contact.add_normal_impulse(
        (contact.target_normal_velocity - normal_velocity) * contact.normal_mass,
    );

    let tangent_velocity = contact.tangent.dot(relative);
    let tangent_impulse = contact.add_tangent_impulse(-tangent_velocity * contact.tangent_mass);

    let impulse = contact.normal * normal_impulse + contact.tangent * tangent_impulse;
    slot.set_impulse(impulse);
}

/// Applies the split impulses of every contact touching a body
pub(crate) fn apply_split_impulses(body: &mut Body, head: Option<u32>, contacts: &ContactStorage) {
    let impulse = list::walk(head, |split| contacts.split(split).next)
        .fold(Twist::ZERO, |acc, split| acc + contacts.split(split).impulse);

    body.velocity += body.inverse_mass * impulse;
}
