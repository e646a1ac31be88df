use crate::models::slot::{LayerHandle, LayerSlot, SlotId};

/// Layer state for the three fixed slots.
///
/// The store only tracks state. Keeping the map in sync is the caller's job:
/// `assign` and `clear` hand back the handle whose rendered layer has to go.
#[derive(Debug, Clone)]
pub struct LayerSlotStore {
    slots: [LayerSlot; 3],
    next_seq: u64,
}

impl Default for LayerSlotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerSlotStore {
    pub fn new() -> Self {
        LayerSlotStore {
            slots: SlotId::ALL.map(LayerSlot::new),
            next_seq: 0,
        }
    }

    pub fn get(&self, slot: SlotId) -> &LayerSlot {
        &self.slots[slot.index()]
    }

    fn get_mut(&mut self, slot: SlotId) -> &mut LayerSlot {
        &mut self.slots[slot.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayerSlot> {
        self.slots.iter()
    }

    pub fn active_slots(&self) -> impl Iterator<Item = &LayerSlot> {
        self.slots.iter().filter(|s| s.active)
    }

    pub fn any_active(&self) -> bool {
        self.slots.iter().any(|s| s.active)
    }

    /// Point `slot` at `item_id` under a fresh handle. Returns the handle the
    /// slot held before, if it was active.
    pub fn assign(&mut self, slot: SlotId, item_id: impl Into<String>) -> Option<LayerHandle> {
        self.next_seq += 1;
        let handle = LayerHandle::new(slot, self.next_seq);
        let entry = self.get_mut(slot);
        let previous = entry.handle.replace(handle);
        entry.item_id = Some(item_id.into());
        entry.active = true;
        previous
    }

    /// Reset `slot` to inactive, keeping its visibility and opacity
    pub fn clear(&mut self, slot: SlotId) -> Option<LayerHandle> {
        let entry = self.get_mut(slot);
        entry.active = false;
        entry.item_id = None;
        entry.handle.take()
    }

    pub fn set_visible(&mut self, slot: SlotId, visible: bool) {
        self.get_mut(slot).visible = visible;
    }

    /// Store `opacity` clamped to [0, 1]. NaN and infinities are ignored.
    /// Returns the value now held.
    pub fn set_opacity(&mut self, slot: SlotId, opacity: f64) -> f64 {
        let entry = self.get_mut(slot);
        if opacity.is_finite() {
            entry.opacity = opacity.clamp(0.0, 1.0);
        }
        entry.opacity
    }

    /// Which item a comparison window currently shows
    pub fn item_for(&self, slot: SlotId) -> Option<&str> {
        self.get(slot).item_id.as_deref()
    }
}
