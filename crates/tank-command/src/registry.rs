//! Registered tanks and primary selection.
//!
//! Spawn logic registers a tank's movement and shooting halves; despawn logic
//! unregisters them. The registry never owns a tank: entries are
//! back-references that a [`TankRegistry::sweep`] drops once the host reports
//! the tank dead. The primary movement and shooting entries are the live
//! entries with the lowest player index.

use crate::world::{Vehicle, VehicleId};

/// A tank reference plus the player number it was spawned for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TankHandle {
    pub id: VehicleId,
    pub player_index: u32,
}

impl TankHandle {
    pub fn new(id: VehicleId, player_index: u32) -> Self {
        Self { id, player_index }
    }
}

/// The driving half of a tank.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MovementHandle(pub TankHandle);

/// The firing half of a tank.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShootingHandle(pub TankHandle);

impl MovementHandle {
    pub fn new(id: VehicleId, player_index: u32) -> Self {
        Self(TankHandle::new(id, player_index))
    }

    pub fn id(self) -> VehicleId {
        self.0.id
    }

    pub fn player_index(self) -> u32 {
        self.0.player_index
    }
}

impl ShootingHandle {
    pub fn new(id: VehicleId, player_index: u32) -> Self {
        Self(TankHandle::new(id, player_index))
    }

    pub fn id(self) -> VehicleId {
        self.0.id
    }

    pub fn player_index(self) -> u32 {
        self.0.player_index
    }
}

/// Ordered entries of one kind, unique by id.
#[derive(Clone, Debug, Default)]
struct Roster {
    entries: Vec<TankHandle>,
    primary: Option<TankHandle>,
}

impl Roster {
    fn contains(&self, id: VehicleId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    fn insert(&mut self, handle: TankHandle) -> bool {
        if self.contains(handle.id) {
            return false;
        }
        self.entries.push(handle);
        true
    }

    fn remove(&mut self, id: VehicleId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        if self.primary.is_some_and(|primary| primary.id == id) {
            self.primary = None;
        }
        self.entries.len() != before
    }

    fn sweep(&mut self, is_alive: &impl Fn(VehicleId) -> bool) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| is_alive(entry.id));
        if self.primary.is_some_and(|primary| !is_alive(primary.id)) {
            self.primary = None;
        }
        self.entries.len() != before
    }

    /// Lowest player index wins; ties keep the current primary, else the
    /// earliest registered.
    fn select(&mut self) -> Option<TankHandle> {
        let current = self.primary.filter(|primary| self.contains(primary.id));
        let mut best: Option<TankHandle> = None;
        for &entry in &self.entries {
            best = match best {
                None => Some(entry),
                Some(b) if entry.player_index < b.player_index => Some(entry),
                Some(b)
                    if entry.player_index == b.player_index
                        && current.is_some_and(|c| c.id == entry.id) =>
                {
                    Some(entry)
                }
                keep => keep,
            };
        }
        self.primary = best;
        best
    }
}

/// Registered tanks of both kinds and the current primaries.
#[derive(Clone, Debug, Default)]
pub struct TankRegistry {
    movement: Roster,
    shooting: Roster,
    explicit_registrations: usize,
}

impl TankRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add either or both halves of a tank. Duplicates are ignored; the
    /// primaries are re-selected.
    pub fn register(&mut self, movement: Option<MovementHandle>, shooting: Option<ShootingHandle>) {
        if movement.is_none() && shooting.is_none() {
            return;
        }
        self.explicit_registrations += 1;
        self.insert(movement, shooting);
    }

    fn insert(&mut self, movement: Option<MovementHandle>, shooting: Option<ShootingHandle>) {
        if let Some(MovementHandle(handle)) = movement
            && self.movement.insert(handle)
        {
            tracing::debug!(id = %handle.id, player = handle.player_index, "registered movement");
        }
        if let Some(ShootingHandle(handle)) = shooting
            && self.shooting.insert(handle)
        {
            tracing::debug!(id = %handle.id, player = handle.player_index, "registered shooting");
        }
        self.select_primary();
    }

    /// Remove either or both halves. Unknown handles are ignored.
    pub fn unregister(
        &mut self,
        movement: Option<MovementHandle>,
        shooting: Option<ShootingHandle>,
    ) {
        if movement.is_none() && shooting.is_none() {
            return;
        }
        if let Some(handle) = movement
            && self.movement.remove(handle.id())
        {
            tracing::debug!(id = %handle.id(), "unregistered movement");
        }
        if let Some(handle) = shooting
            && self.shooting.remove(handle.id())
        {
            tracing::debug!(id = %handle.id(), "unregistered shooting");
        }
        self.select_primary();
    }

    /// Drop entries whose tanks are gone. Returns whether anything was removed;
    /// primaries are re-selected when it was.
    pub fn sweep(&mut self, is_alive: impl Fn(VehicleId) -> bool) -> bool {
        let removed_movement = self.movement.sweep(&is_alive);
        let removed_shooting = self.shooting.sweep(&is_alive);
        let removed = removed_movement || removed_shooting;
        if removed {
            tracing::debug!("swept destroyed tanks");
            self.select_primary();
        }
        removed
    }

    /// Recompute and return both primaries.
    pub fn select_primary(&mut self) -> (Option<MovementHandle>, Option<ShootingHandle>) {
        let previous = self.movement.primary.map(|primary| primary.id);
        let movement = self.movement.select().map(MovementHandle);
        let shooting = self.shooting.select().map(ShootingHandle);
        if movement.map(MovementHandle::id) != previous {
            tracing::info!(
                primary = ?movement.map(|handle| handle.id().to_string()),
                "primary tank changed"
            );
        }
        (movement, shooting)
    }

    /// Register every live, active candidate not already tracked.
    ///
    /// A fallback for hosts that never call [`Self::register`]; it does not
    /// count as an explicit registration. Returns how many tanks were added.
    pub fn auto_discover<I>(&mut self, candidates: I) -> usize
    where
        I: IntoIterator<Item = (VehicleId, Vehicle)>,
    {
        let mut added = 0;
        for (id, vehicle) in candidates {
            if !vehicle.active {
                continue;
            }
            let handle = TankHandle::new(id, vehicle.player_index);
            let new_movement = self.movement.insert(handle);
            let new_shooting = self.shooting.insert(handle);
            if new_movement || new_shooting {
                added += 1;
            }
        }
        if added > 0 {
            tracing::info!(added, "auto-discovered tanks");
            self.select_primary();
        }
        added
    }

    pub fn primary_movement(&self) -> Option<MovementHandle> {
        self.movement.primary.map(MovementHandle)
    }

    pub fn primary_shooting(&self) -> Option<ShootingHandle> {
        self.shooting.primary.map(ShootingHandle)
    }

    /// Whether [`Self::register`] has ever been called with a handle.
    pub fn has_explicit_registrations(&self) -> bool {
        self.explicit_registrations > 0
    }

    pub fn contains_movement(&self, id: VehicleId) -> bool {
        self.movement.contains(id)
    }

    pub fn contains_shooting(&self, id: VehicleId) -> bool {
        self.shooting.contains(id)
    }

    pub fn movement_handles(&self) -> impl Iterator<Item = MovementHandle> + '_ {
        self.movement.entries.iter().copied().map(MovementHandle)
    }

    pub fn shooting_handles(&self) -> impl Iterator<Item = ShootingHandle> + '_ {
        self.shooting.entries.iter().copied().map(ShootingHandle)
    }

    pub fn is_empty(&self) -> bool {
        self.movement.entries.is_empty() && self.shooting.entries.is_empty()
    }
}
