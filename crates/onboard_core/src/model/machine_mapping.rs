//! Operator-to-workstation assignment model.

/// Composite identity of a `user_machine_mapping` row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MachineMappingId {
    pub user_id: String,
    pub center_id: String,
    pub machine_id: String,
}

/// Records that a user is authorized to operate a workstation of a center.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineMappingRow {
    pub id: MachineMappingId,
    pub language_code: String,
    pub is_active: bool,
    pub created_by: String,
    /// Epoch ms, UTC. Kept from the first save.
    pub created_at: i64,
    pub updated_by: Option<String>,
    /// Epoch ms, UTC. Moves forward on every save.
    pub updated_at: Option<i64>,
}
