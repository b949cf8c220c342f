use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    /// Medical staff; may author courses and simulations.
    Medic,
    /// Administrator; may edit anything regardless of authorship.
    Root,
}

impl Role {
    /// Roles allowed to author content.
    pub const AUTHORS: &'static [Self] = &[Self::Medic, Self::Root];
}
