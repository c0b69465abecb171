//! Data models for SiteSync

mod conflict;
mod conflict_log;
mod record;
mod strategy;

pub use conflict::{Conflict, ConflictKind};
pub use conflict_log::{ConflictLogEntry, LogEntryId};
pub(crate) use record::json_type_name;
pub use record::{Record, TIMESTAMP_FIELDS};
pub use strategy::{ResolutionStrategy, SuggestedStrategy};

/// Collection names used by the app's document database.
pub mod collections {
    pub const EMPLOYEES: &str = "employees";
    pub const CLIENTS: &str = "clients";
    pub const MATERIALS: &str = "materials";
    pub const VENDORS: &str = "vendors";
    pub const MATERIAL_ORDERS: &str = "materialOrders";
    pub const ATTENDANCE: &str = "attendance";

    /// Collections whose update conflicts default to a field merge
    pub const MERGE_BY_DEFAULT: [&str; 3] = [EMPLOYEES, CLIENTS, VENDORS];
}
