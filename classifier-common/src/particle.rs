use serde::{Serialize, Deserialize};

/// Ground-truth material class assigned at feed generation. Used only for
/// scoring the separation afterwards; the physics never reads it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Material {
    Fine,
    Coarse,
}

/// Lifecycle state of a particle. `Active` particles take part in the physics
/// update; collected states are terminal unless reinjection is enabled.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    Active,
    CollectedFine,
    CollectedCoarse,
}

impl Lifecycle {
    #[inline(always)]
    pub fn is_active(self) -> bool {
        self == Lifecycle::Active
    }
}
