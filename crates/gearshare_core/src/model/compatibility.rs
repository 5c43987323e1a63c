//! Part-to-car compatibility link.
//!
//! A pure junction: identity is the `(part_id, car_id)` pair and the link
//! never outlives either side.

use crate::model::car::CarId;
use crate::model::part::PartId;
use serde::{Deserialize, Serialize};

/// Declares that one part fits one car variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartCompatibility {
    pub part_id: PartId,
    pub car_id: CarId,
}

impl PartCompatibility {
    pub fn new(part_id: PartId, car_id: CarId) -> Self {
        Self { part_id, car_id }
    }
}
