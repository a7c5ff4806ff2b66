//! Handles to externally owned tanks.
//!
//! Tanks live in the host's world and can be destroyed at any time. The core
//! refers to them only through generational [`VehicleId`]s and checks
//! liveness through [`VehicleLookup`] every tick.

use std::fmt;

use glam::Vec3;

/// Generational index of a tank in the host's world.
///
/// A stale id (the slot was reused) never resolves to the new occupant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VehicleId {
    index: u32,
    generation: u32,
}

impl VehicleId {
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub const fn index(self) -> u32 {
        self.index
    }

    pub const fn generation(self) -> u32 {
        self.generation
    }

    /// Pack into 64 bits (generation high, index low).
    pub const fn to_bits(self) -> u64 {
        ((self.generation as u64) << 32) | self.index as u64
    }

    /// Inverse of [`Self::to_bits`].
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// The tank attributes the core reads. Never written by the core.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vehicle {
    pub position: Vec3,
    /// Unit heading.
    pub forward: Vec3,
    /// Player number; lower numbers win primary selection.
    pub player_index: u32,
    /// Inactive tanks (disabled, respawning) are never targeted or discovered.
    pub active: bool,
}

impl Vehicle {
    pub fn new(position: Vec3, forward: Vec3, player_index: u32) -> Self {
        Self {
            position,
            forward,
            player_index,
            active: true,
        }
    }
}

/// Liveness and pose queries against the host's world.
pub trait VehicleLookup {
    /// The tank behind `id`, or `None` once it has been destroyed.
    fn vehicle(&self, id: VehicleId) -> Option<Vehicle>;

    /// Every live, active tank, in a stable order.
    fn active_vehicles(&self) -> Vec<VehicleId>;

    fn is_alive(&self, id: VehicleId) -> bool {
        self.vehicle(id).is_some()
    }
}

struct Slot {
    generation: u32,
    vehicle: Option<Vehicle>,
}

/// Generational arena of tanks.
///
/// A ready-made [`VehicleLookup`] for hosts without an entity system.
#[derive(Default)]
pub struct VehicleArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl VehicleArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tank, reusing a freed slot when one exists.
    pub fn spawn(&mut self, vehicle: Vehicle) -> VehicleId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.vehicle = Some(vehicle);
            return VehicleId::new(index, slot.generation);
        }
        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 0,
            vehicle: Some(vehicle),
        });
        VehicleId::new(index, 0)
    }

    /// Remove a tank. Returns it if `id` was live.
    pub fn despawn(&mut self, id: VehicleId) -> Option<Vehicle> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let vehicle = slot.vehicle.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(vehicle)
    }

    pub fn get(&self, id: VehicleId) -> Option<&Vehicle> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.vehicle.as_ref())
    }

    pub fn get_mut(&mut self, id: VehicleId) -> Option<&mut Vehicle> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.vehicle.as_mut())
    }

    /// Live tanks with their ids, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (VehicleId, &Vehicle)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let vehicle = slot.vehicle.as_ref()?;
            let index = u32::try_from(index).ok()?;
            Some((VehicleId::new(index, slot.generation), vehicle))
        })
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl VehicleLookup for VehicleArena {
    fn vehicle(&self, id: VehicleId) -> Option<Vehicle> {
        self.get(id).copied()
    }

    fn active_vehicles(&self) -> Vec<VehicleId> {
        self.iter()
            .filter(|(_, vehicle)| vehicle.active)
            .map(|(id, _)| id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tank(player_index: u32) -> Vehicle {
        Vehicle::new(Vec3::ZERO, Vec3::Z, player_index)
    }

    #[test]
    fn test_stale_id_does_not_resolve() {
        let mut arena = VehicleArena::new();
        let first = arena.spawn(tank(1));
        arena.despawn(first);
        let second = arena.spawn(tank(2));

        assert_eq!(first.index(), second.index());
        assert_eq!(arena.len(), 1);
        assert!(!arena.is_empty());
        assert!(arena.vehicle(first).is_none());
        assert_eq!(arena.vehicle(second).map(|v| v.player_index), Some(2));
        assert!(arena.despawn(first).is_none());
    }

    #[test]
    fn test_active_vehicles_skips_inactive() {
        let mut arena = VehicleArena::new();
        let a = arena.spawn(tank(1));
        let b = arena.spawn(tank(2));
        arena.get_mut(b).unwrap().active = false;
        assert_eq!(arena.active_vehicles(), vec![a]);
        assert!(arena.is_alive(b));
    }

    #[test]
    fn test_bits_roundtrip() {
        let id = VehicleId::new(42, 7);
        assert_eq!(VehicleId::from_bits(id.to_bits()), id);
    }
}
