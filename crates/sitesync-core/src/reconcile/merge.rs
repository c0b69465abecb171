//! Per-collection field merges
//!
//! Named collections use a "truthy local overrides" policy: a listed field
//! takes the local value when it is truthy and the remote value otherwise.
//! Unknown collections fall back to [`merge_generic`], which lets every
//! non-null local field override. The two policies differ for falsy values
//! such as `0`, `false` and `""`; both are kept as-is.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde_json::Value;
use tracing::debug;

use crate::models::{collections, Record};
use crate::util::is_truthy;

/// Merge of two present records; the first argument is local, the second remote
pub type MergeFn = fn(&Record, &Record) -> Record;

const EMPLOYEE_FIELDS: [&str; 4] = ["name", "phone", "address", "salary"];
const CLIENT_FIELDS: [&str; 6] = [
    "name",
    "projectName",
    "location",
    "ownerPhone",
    "totalAmount",
    "status",
];
const MATERIAL_FIELDS: [&str; 3] = ["name", "unitPrice", "unit"];
const MATERIAL_ORDER_FIELDS: [&str; 8] = [
    "date",
    "clientId",
    "materialId",
    "supplierId",
    "quantity",
    "totalCost",
    "paymentStatus",
    "stock",
];
const VENDOR_SYSTEM_FIELDS: [&str; 3] = ["id", "createdAt", "materials"];

/// Registry from collection name to merge function
#[derive(Clone)]
pub struct MergeTable {
    entries: HashMap<String, MergeFn>,
    fallback: MergeFn,
}

impl MergeTable {
    /// Empty table that merges everything with [`merge_generic`]
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
            fallback: merge_generic,
        }
    }

    /// Register `merge` for `collection`, returning the function it replaced
    pub fn register(&mut self, collection: impl Into<String>, merge: MergeFn) -> Option<MergeFn> {
        self.entries.insert(collection.into(), merge)
    }

    /// Merge function for `collection`, or the generic merge when unregistered
    #[must_use]
    pub fn get(&self, collection: &str) -> MergeFn {
        self.entries.get(collection).copied().unwrap_or(self.fallback)
    }

    /// Whether `collection` has a dedicated merge function
    #[must_use]
    pub fn is_registered(&self, collection: &str) -> bool {
        self.entries.contains_key(collection)
    }

    /// Merge the two sides of a record.
    ///
    /// When one side is absent the other is returned unchanged.
    #[must_use]
    pub fn merge(
        &self,
        collection: &str,
        local: Option<&Record>,
        remote: Option<&Record>,
    ) -> Option<Record> {
        match (local, remote) {
            (Some(local), Some(remote)) => {
                debug!(
                    collection,
                    dedicated = self.is_registered(collection),
                    "merging record"
                );
                Some(self.get(collection)(local, remote))
            }
            (Some(only), None) | (None, Some(only)) => Some(only.clone()),
            (None, None) => None,
        }
    }
}

impl fmt::Debug for MergeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut collections: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        collections.sort_unstable();
        f.debug_struct("MergeTable")
            .field("collections", &collections)
            .finish_non_exhaustive()
    }
}

impl Default for MergeTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.register(collections::EMPLOYEES, merge_employee);
        table.register(collections::CLIENTS, merge_client);
        table.register(collections::MATERIALS, merge_material);
        table.register(collections::VENDORS, merge_vendor);
        table.register(collections::MATERIAL_ORDERS, merge_material_order);
        table.register(collections::ATTENDANCE, merge_attendance);
        table
    }
}

/// Employees keep remote `id` and biometric enrollment flags
pub fn merge_employee(local: &Record, remote: &Record) -> Record {
    prefer_truthy_local(local, remote, &EMPLOYEE_FIELDS)
}

pub fn merge_client(local: &Record, remote: &Record) -> Record {
    prefer_truthy_local(local, remote, &CLIENT_FIELDS)
}

pub fn merge_material(local: &Record, remote: &Record) -> Record {
    prefer_truthy_local(local, remote, &MATERIAL_FIELDS)
}

pub fn merge_material_order(local: &Record, remote: &Record) -> Record {
    prefer_truthy_local(local, remote, &MATERIAL_ORDER_FIELDS)
}

/// Vendors merge every field, plus their material price lists.
///
/// Material entries are keyed by `category_name`. Remote entries come first;
/// a local entry with the same key replaces the remote one in place, and
/// local-only entries are appended. The list is only rebuilt when one side
/// holds an array; otherwise `materials` follows the truthy-local rule.
/// `id` and `createdAt` stay remote.
pub fn merge_vendor(local: &Record, remote: &Record) -> Record {
    let fields: BTreeSet<&str> = local
        .fields()
        .chain(remote.fields())
        .map(|(field, _)| field.as_str())
        .filter(|field| !VENDOR_SYSTEM_FIELDS.contains(field))
        .collect();
    let fields: Vec<&str> = fields.into_iter().collect();
    let mut merged = prefer_truthy_local(local, remote, &fields);

    let local_materials = local.get("materials");
    let remote_materials = remote.get("materials");
    if local_materials.is_some_and(Value::is_array) || remote_materials.is_some_and(Value::is_array)
    {
        merged.insert(
            "materials",
            Value::Array(merge_vendor_materials(local_materials, remote_materials)),
        );
    } else {
        let value = local_materials.filter(|value| is_truthy(value)).or(remote_materials);
        merged.set_or_remove("materials", value.cloned());
    }

    merged
}

/// Attendance takes the newer record wholesale; ties go to remote
pub fn merge_attendance(local: &Record, remote: &Record) -> Record {
    if local.effective_timestamp() > remote.effective_timestamp() {
        local.clone()
    } else {
        remote.clone()
    }
}

/// Remote record overlaid with every non-null local field except `id`
pub fn merge_generic(local: &Record, remote: &Record) -> Record {
    let mut merged = remote.clone();
    for (field, value) in local.fields() {
        if field == "id" || value.is_null() {
            continue;
        }
        merged.insert(field.clone(), value.clone());
    }
    merged
}

fn prefer_truthy_local(local: &Record, remote: &Record, fields: &[&str]) -> Record {
    let mut merged = remote.clone();
    for field in fields {
        let value = match local.get(field) {
            Some(value) if is_truthy(value) => Some(value),
            _ => remote.get(field),
        };
        merged.set_or_remove(field, value.cloned());
    }
    merged
}

fn merge_vendor_materials(local: Option<&Value>, remote: Option<&Value>) -> Vec<Value> {
    let mut merged: Vec<Value> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for entry in material_entries(remote).chain(material_entries(local)) {
        let key = material_key(entry);
        if let Some(&position) = positions.get(&key) {
            merged[position] = entry.clone();
        } else {
            positions.insert(key, merged.len());
            merged.push(entry.clone());
        }
    }

    merged
}

// Keyed lists (`{"0": {...}}`) contribute their values in map order.
fn material_entries(list: Option<&Value>) -> Box<dyn Iterator<Item = &Value> + '_> {
    match list {
        Some(Value::Array(entries)) => Box::new(entries.iter()),
        Some(Value::Object(entries)) => Box::new(entries.values()),
        _ => Box::new(std::iter::empty()),
    }
}

fn material_key(entry: &Value) -> String {
    format!(
        "{}_{}",
        key_part(entry.get("category")),
        key_part(entry.get("name"))
    )
}

fn key_part(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> Record {
        Record::from_value(value).unwrap()
    }

    fn all_named() -> [(&'static str, MergeFn); 6] {
        [
            (collections::EMPLOYEES, merge_employee),
            (collections::CLIENTS, merge_client),
            (collections::MATERIALS, merge_material),
            (collections::VENDORS, merge_vendor),
            (collections::MATERIAL_ORDERS, merge_material_order),
            (collections::ATTENDANCE, merge_attendance),
        ]
    }

    #[test]
    fn employee_merge_prefers_truthy_local_fields() {
        let local = record(json!({"id": "e1", "name": "", "phone": "555", "updatedAt": 2_000}));
        let remote = record(json!({
            "id": "e1",
            "name": "Raj",
            "phone": "000",
            "faceEnrolled": true,
            "updatedAt": 3_000
        }));

        let merged = merge_employee(&local, &remote);
        assert_eq!(merged.get("id"), Some(&json!("e1")));
        assert_eq!(merged.get("name"), Some(&json!("Raj")));
        assert_eq!(merged.get("phone"), Some(&json!("555")));
        assert_eq!(merged.get("faceEnrolled"), Some(&json!(true)));
    }

    #[test]
    fn employee_merge_keeps_remote_enrollment_flags() {
        let local = record(json!({
            "id": "e1",
            "faceEnrolled": true,
            "fingerprintEnrolled": true,
            "salary": 30_000
        }));
        let remote = record(json!({
            "id": "e1",
            "faceEnrolled": false,
            "fingerprintEnrolled": false,
            "salary": 25_000
        }));

        let merged = merge_employee(&local, &remote);
        assert_eq!(merged.get("faceEnrolled"), Some(&json!(false)));
        assert_eq!(merged.get("fingerprintEnrolled"), Some(&json!(false)));
        assert_eq!(merged.get("salary"), Some(&json!(30_000)));
    }

    #[test]
    fn client_merge_treats_zero_amount_as_unset() {
        let local = record(json!({"id": "c1", "totalAmount": 0, "status": "active"}));
        let remote = record(json!({"id": "c1", "totalAmount": 150_000, "status": "pending"}));

        let merged = merge_client(&local, &remote);
        assert_eq!(merged.get("totalAmount"), Some(&json!(150_000)));
        assert_eq!(merged.get("status"), Some(&json!("active")));
    }

    #[test]
    fn named_merge_drops_unlisted_local_only_fields() {
        let local = record(json!({"id": "m1", "name": "Cement", "notes": "local only"}));
        let remote = record(json!({"id": "m1", "name": "OPC", "supplier": "s1"}));

        let merged = merge_material(&local, &remote);
        assert_eq!(
            merged,
            record(json!({"id": "m1", "name": "Cement", "supplier": "s1"}))
        );
    }

    #[test]
    fn falsy_local_and_missing_remote_leaves_field_out() {
        let local = record(json!({"id": "m1", "unit": ""}));
        let remote = record(json!({"id": "m1"}));
        assert_eq!(merge_material(&local, &remote).get("unit"), None);
    }

    #[test]
    fn material_order_merge_uses_listed_fields() {
        let local = record(json!({
            "id": "o1",
            "quantity": 40,
            "paymentStatus": "paid",
            "stock": 0
        }));
        let remote = record(json!({
            "id": "o1",
            "quantity": 35,
            "paymentStatus": "pending",
            "stock": 12,
            "totalCost": 9_000
        }));

        let merged = merge_material_order(&local, &remote);
        assert_eq!(merged.get("quantity"), Some(&json!(40)));
        assert_eq!(merged.get("paymentStatus"), Some(&json!("paid")));
        assert_eq!(merged.get("stock"), Some(&json!(12)));
        assert_eq!(merged.get("totalCost"), Some(&json!(9_000)));
    }

    #[test]
    fn vendor_materials_local_overrides_matching_key() {
        let local = record(json!({
            "id": "v1",
            "materials": [{"category": "steel", "name": "TMT", "unitPrice": 65}]
        }));
        let remote = record(json!({
            "id": "v1",
            "materials": [{"category": "steel", "name": "TMT", "unitPrice": 60}]
        }));

        let merged = merge_vendor(&local, &remote);
        assert_eq!(
            merged.get("materials"),
            Some(&json!([{"category": "steel", "name": "TMT", "unitPrice": 65}]))
        );
    }

    #[test]
    fn vendor_materials_keep_remote_only_categories_in_order() {
        let local = record(json!({
            "id": "v1",
            "materials": [
                {"category": "sand", "name": "River", "unitPrice": 40},
                {"category": "steel", "name": "TMT", "unitPrice": 65}
            ]
        }));
        let remote = record(json!({
            "id": "v1",
            "materials": [
                {"category": "steel", "name": "TMT", "unitPrice": 60},
                {"category": "cement", "name": "OPC", "unitPrice": 350}
            ]
        }));

        let merged = merge_vendor(&local, &remote);
        assert_eq!(
            merged.get("materials"),
            Some(&json!([
                {"category": "steel", "name": "TMT", "unitPrice": 65},
                {"category": "cement", "name": "OPC", "unitPrice": 350},
                {"category": "sand", "name": "River", "unitPrice": 40}
            ]))
        );
    }

    #[test]
    fn vendor_merge_keeps_remote_system_fields() {
        let local = record(json!({
            "id": "v1",
            "createdAt": 1,
            "name": "Sharma Traders",
            "phone": "",
            "gstNumber": "29ABCDE"
        }));
        let remote = record(json!({
            "id": "v1",
            "createdAt": 100,
            "name": "Sharma",
            "phone": "98450"
        }));

        let merged = merge_vendor(&local, &remote);
        assert_eq!(
            merged,
            record(json!({
                "id": "v1",
                "createdAt": 100,
                "name": "Sharma Traders",
                "phone": "98450",
                "gstNumber": "29ABCDE"
            }))
        );
    }

    #[test]
    fn attendance_newer_side_wins_wholesale() {
        let local = record(json!({"id": "a1", "status": "present", "updatedAt": 2_000}));
        let remote = record(json!({"id": "a1", "status": "absent", "updatedAt": 1_000}));
        assert_eq!(merge_attendance(&local, &remote), local);
        assert_eq!(merge_attendance(&remote, &local), local);
    }

    #[test]
    fn attendance_tie_goes_to_remote() {
        let local = record(json!({"id": "a1", "status": "present", "updatedAt": 1_000}));
        let remote = record(json!({"id": "a1", "status": "absent", "updatedAt": 1_000}));
        assert_eq!(merge_attendance(&local, &remote), remote);
    }

    #[test]
    fn generic_merge_lets_falsy_local_values_override() {
        let local = record(json!({
            "id": "p1",
            "amount": 0,
            "refunded": false,
            "note": "",
            "method": null
        }));
        let remote = record(json!({
            "id": "p1",
            "amount": 500,
            "refunded": true,
            "note": "advance",
            "method": "upi"
        }));

        let merged = merge_generic(&local, &remote);
        assert_eq!(
            merged,
            record(json!({
                "id": "p1",
                "amount": 0,
                "refunded": false,
                "note": "",
                "method": "upi"
            }))
        );
    }

    #[test]
    fn merges_are_idempotent() {
        let sample = record(json!({
            "id": "x1",
            "name": "",
            "phone": "555",
            "totalAmount": 0,
            "faceEnrolled": true,
            "createdAt": 5,
            "materials": [{"category": "steel", "name": "TMT", "unitPrice": 60}],
            "updatedAt": 2_000
        }));

        for (collection, merge) in all_named() {
            assert_eq!(merge(&sample, &sample), sample, "{collection}");
        }
        assert_eq!(merge_generic(&sample, &sample), sample);
    }

    #[test]
    fn vendor_merge_leaves_non_array_materials_intact() {
        let null_materials = record(json!({"id": "v1", "name": "S", "materials": null}));
        assert_eq!(merge_vendor(&null_materials, &null_materials), null_materials);

        let keyed = record(json!({
            "id": "v1",
            "materials": {"0": {"category": "steel", "name": "TMT", "unitPrice": 60}}
        }));
        assert_eq!(merge_vendor(&keyed, &keyed), keyed);

        let bare = record(json!({"id": "v1", "name": "S"}));
        assert_eq!(merge_vendor(&bare, &keyed).get("materials"), keyed.get("materials"));
        assert_eq!(
            merge_vendor(&null_materials, &keyed).get("materials"),
            keyed.get("materials")
        );
    }

    #[test]
    fn vendor_merge_reads_keyed_materials_against_an_array() {
        let local = record(json!({
            "id": "v1",
            "materials": [{"category": "steel", "name": "TMT", "unitPrice": 65}]
        }));
        let remote = record(json!({
            "id": "v1",
            "materials": {
                "0": {"category": "steel", "name": "TMT", "unitPrice": 60},
                "1": {"category": "cement", "name": "OPC", "unitPrice": 380}
            }
        }));

        let merged = merge_vendor(&local, &remote);
        assert_eq!(
            merged.get("materials"),
            Some(&json!([
                {"category": "steel", "name": "TMT", "unitPrice": 65},
                {"category": "cement", "name": "OPC", "unitPrice": 380}
            ]))
        );
    }

    #[test]
    fn table_merge_is_null_safe() {
        let table = MergeTable::default();
        let sample = record(json!({"id": "x1", "name": "Raj"}));

        for (collection, _) in all_named() {
            assert_eq!(table.merge(collection, None, Some(&sample)), Some(sample.clone()));
            assert_eq!(table.merge(collection, Some(&sample), None), Some(sample.clone()));
            assert_eq!(table.merge(collection, None, None), None);
        }
        assert_eq!(table.merge("payments", Some(&sample), None), Some(sample.clone()));
    }

    #[test]
    fn table_falls_back_to_generic_merge() {
        let table = MergeTable::default();
        assert!(table.is_registered("employees"));
        assert!(!table.is_registered("payments"));

        let local = record(json!({"id": "p1", "amount": 0}));
        let remote = record(json!({"id": "p1", "amount": 500}));
        let merged = table.merge("payments", Some(&local), Some(&remote)).unwrap();
        assert_eq!(merged.get("amount"), Some(&json!(0)));
    }

    #[test]
    fn registering_a_collection_replaces_dispatch() {
        let mut table = MergeTable::default();
        let previous = table.register("appointments", merge_attendance);
        assert!(previous.is_none());

        let local = record(json!({"id": "ap1", "slot": "10:00", "updatedAt": 5}));
        let remote = record(json!({"id": "ap1", "slot": "11:00", "updatedAt": 9}));
        let merged = table.merge("appointments", Some(&local), Some(&remote)).unwrap();
        assert_eq!(merged, remote);
    }
}
