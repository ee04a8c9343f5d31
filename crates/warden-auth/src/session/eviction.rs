//! Device replacement and oldest-first eviction.

use warden_entity::session::Session;

/// Split an active set into sessions on `device_id` and all others,
/// preserving order.
pub fn partition_by_device(active: Vec<Session>, device_id: &str) -> (Vec<Session>, Vec<Session>) {
    active.into_iter().partition(|s| s.device_id == device_id)
}

/// The oldest sessions of `others` that must be revoked so that `others`
/// plus one more session stay within `max`.
///
/// `others` must be ordered by `created_at` ascending. Usually this is empty
/// or a single session; more are returned when the limit was lowered below
/// the number of sessions already held.
pub fn sessions_to_evict(others: &[Session], max: usize) -> &[Session] {
    let excess = (others.len() + 1).saturating_sub(max);
    &others[..excess.min(others.len())]
}
