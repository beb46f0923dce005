//! Position report: the "submit" dump of every item's derived geometry.

#[cfg(test)]
#[path = "report_test.rs"]
mod report_test;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::doc::{Item, ItemId, ItemKind, Rotation, Size};
use crate::viewport::Percent;

/// Geometry of one item as reported to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub id: ItemId,
    pub kind: ItemKind,
    pub position: Percent,
    pub size: Size,
    pub rotation: Rotation,
}

impl From<&Item> for ReportEntry {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            kind: item.kind(),
            position: item.position,
            size: item.size,
            rotation: item.rotation,
        }
    }
}

impl fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Item ID: {}, Type: {}, Position: X: {}%, Y: {}%, Size: {}x{}, Rotation: {}deg",
            self.id,
            self.kind,
            self.position.x,
            self.position.y,
            self.size.width,
            self.size.height,
            self.rotation.degrees(),
        )
    }
}

/// One entry per item, in store order.
#[must_use]
pub fn report(items: &[Item]) -> Vec<ReportEntry> {
    items.iter().map(ReportEntry::from).collect()
}
