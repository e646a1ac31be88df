use serde::{Deserialize, Serialize};
use std::fmt;

/// The three fixed layer positions on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotId {
    #[serde(rename = "window-a")]
    WindowA,
    #[serde(rename = "window-b")]
    WindowB,
    #[serde(rename = "current")]
    Current,
}

impl SlotId {
    pub const ALL: [SlotId; 3] = [SlotId::WindowA, SlotId::WindowB, SlotId::Current];

    pub fn as_str(&self) -> &'static str {
        match self {
            SlotId::WindowA => "window-a",
            SlotId::WindowB => "window-b",
            SlotId::Current => "current",
        }
    }

    /// Label shown next to the slot's layer control
    pub fn label(&self) -> &'static str {
        match self {
            SlotId::WindowA => "Window A Layer",
            SlotId::WindowB => "Window B Layer",
            SlotId::Current => "Current Selection",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            SlotId::WindowA => 0,
            SlotId::WindowB => 1,
            SlotId::Current => 2,
        }
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the two comparison windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    A,
    B,
}

impl Window {
    pub fn slot(&self) -> SlotId {
        match self {
            Window::A => SlotId::WindowA,
            Window::B => SlotId::WindowB,
        }
    }
}

/// Map layer/source id owned by a slot while it is active
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerHandle(String);

impl LayerHandle {
    pub(crate) fn new(slot: SlotId, seq: u64) -> Self {
        LayerHandle(format!("stac-layer-{}-{}", slot, seq))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerSlot {
    pub slot: SlotId,
    pub handle: Option<LayerHandle>,
    pub item_id: Option<String>,
    pub visible: bool,
    pub opacity: f64,
    pub active: bool,
}

impl LayerSlot {
    /// Comparison windows start hidden; the current selection starts visible
    pub fn new(slot: SlotId) -> Self {
        LayerSlot {
            slot,
            handle: None,
            item_id: None,
            visible: slot == SlotId::Current,
            opacity: 1.0,
            active: false,
        }
    }

    pub fn visibility(&self) -> &'static str {
        if self.visible { "visible" } else { "none" }
    }
}
