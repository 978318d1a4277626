use bevy::prelude::*;

use super::state::ZoneId;

/// At most one zone is active at a time.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ZoneSelection {
    #[default]
    Idle,
    Active(ZoneId),
}

/// Zones whose highlight must change after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionChange {
    pub released: Option<ZoneId>,
    pub activated: Option<ZoneId>,
}

impl ZoneSelection {
    pub fn active(&self) -> Option<ZoneId> {
        match self {
            Self::Idle => None,
            Self::Active(id) => Some(*id),
        }
    }

    pub fn is_active(&self, id: ZoneId) -> bool {
        self.active() == Some(id)
    }

    /// Highlight button semantics: selecting the active zone releases it.
    pub fn toggle(&mut self, id: ZoneId) -> SelectionChange {
        let change = match *self {
            Self::Idle => SelectionChange {
                released: None,
                activated: Some(id),
            },
            Self::Active(current) if current == id => SelectionChange {
                released: Some(id),
                activated: None,
            },
            Self::Active(current) => SelectionChange {
                released: Some(current),
                activated: Some(id),
            },
        };
        *self = change.activated.map_or(Self::Idle, Self::Active);
        change
    }

    /// Make `id` active without toggling it off.
    pub fn activate(&mut self, id: ZoneId) -> SelectionChange {
        match *self {
            Self::Active(current) if current == id => SelectionChange::default(),
            _ => self.toggle(id),
        }
    }

    pub fn clear(&mut self) -> Option<ZoneId> {
        let released = self.active();
        *self = Self::Idle;
        released
    }

    /// Drop the selection if it points at a zone that no longer exists.
    pub fn forget(&mut self, id: ZoneId) -> bool {
        if self.is_active(id) {
            *self = Self::Idle;
            return true;
        }
        false
    }
}
