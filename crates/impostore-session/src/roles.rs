//! Role assignment and first-player selection.
//!
//! Both are pure functions over an injected RNG, so a seeded `StdRng`
//! reproduces a round exactly.

use std::collections::BTreeMap;

use impostore_protocol::{ParticipantId, Role};
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use crate::SessionError;

/// Deals roles: `min(num_impostors, ids.len())` impostors chosen
/// uniformly at random, everyone else civilian.
///
/// The ids are sorted before shuffling, so the result depends only on the
/// set of ids and the RNG state, never on the caller's iteration order.
pub fn assign_roles<R: Rng + ?Sized>(
    ids: &[ParticipantId],
    num_impostors: u32,
    rng: &mut R,
) -> BTreeMap<ParticipantId, Role> {
    let mut order: Vec<&ParticipantId> = ids.iter().collect();
    order.sort();
    order.dedup();
    order.shuffle(rng);

    let impostors = (num_impostors as usize).min(order.len());
    order
        .into_iter()
        .enumerate()
        .map(|(i, id)| {
            let role = if i < impostors {
                Role::Impostor
            } else {
                Role::Civilian
            };
            (id.clone(), role)
        })
        .collect()
}

/// Picks who speaks first, uniformly among `ids`.
///
/// # Errors
/// [`SessionError::NoParticipants`] if `ids` is empty.
pub fn select_first_player<R: Rng + ?Sized>(
    ids: &[ParticipantId],
    rng: &mut R,
) -> Result<ParticipantId, SessionError> {
    let mut order: Vec<&ParticipantId> = ids.iter().collect();
    order.sort();
    order
        .choose(rng)
        .map(|id| (*id).clone())
        .ok_or(SessionError::NoParticipants)
}
