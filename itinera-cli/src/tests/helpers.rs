//! Test helpers for composing CLI inputs on disk.

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::{Value, json};
use tempfile::TempDir;

/// Write `contents` to `path`, creating parent directories.
pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent directory");
    }
    std::fs::write(path, contents).expect("write test file");
}

/// A temporary directory and its UTF-8 path.
pub(super) fn workspace() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

/// A two-person day trip from Shanghai to `target`.
pub(super) fn query_json(target: &str) -> Value {
    json!({
        "uid": "q1",
        "start_city": "Shanghai",
        "target_city": target,
        "people_number": 2,
        "days": 1,
        "budget": 1200,
        "logical_constraints": ["total_cost <= 1200"],
    })
}

/// A natural-language request.
pub(super) fn request_json(uid: &str) -> Value {
    json!({
        "uid": uid,
        "text": "Two of us want a garden day in Suzhou from Shanghai.",
    })
}

/// A model answer translating [`request_json`].
pub(super) fn translated_answer() -> String {
    json!({
        "start_city": "Shanghai",
        "target_city": "Suzhou",
        "people_number": 2,
        "days": 1,
        "logical_constraints": ["'garden' in attraction_types"],
    })
    .to_string()
}

/// A small dataset with Shanghai and Suzhou and a train each way.
pub(super) fn dataset_json() -> Value {
    json!({
        "cities": [
            {
                "name": "Shanghai",
                "stations": [
                    {"name": "Shanghai Railway Station", "location": {"x": 121.455, "y": 31.249}}
                ]
            },
            {
                "name": "Suzhou",
                "stations": [
                    {"name": "Suzhou Railway Station", "location": {"x": 120.610, "y": 31.330}}
                ],
                "accommodations": [
                    {"name": "Garden Inn", "price": 300, "beds_per_room": 2,
                     "location": {"x": 120.620, "y": 31.320}}
                ],
                "attractions": [
                    {"name": "Humble Administrator's Garden", "spot_type": "garden",
                     "price": 70, "open": "07:30", "close": "17:30",
                     "recommended_visit_minutes": 120,
                     "location": {"x": 120.628, "y": 31.324}}
                ],
                "restaurants": [
                    {"name": "Songhelou", "cuisine": "Suzhou", "price": 80,
                     "open": "10:00", "close": "21:00",
                     "location": {"x": 120.622, "y": 31.311}}
                ]
            }
        ],
        "intercity": [
            {
                "from_city": "Shanghai",
                "to_city": "Suzhou",
                "services": [
                    {"id": "G7001", "mode": "train", "from": "Shanghai Railway Station",
                     "to": "Suzhou Railway Station", "depart": "08:00", "arrive": "08:30",
                     "cost": 40}
                ]
            },
            {
                "from_city": "Suzhou",
                "to_city": "Shanghai",
                "services": [
                    {"id": "G7010", "mode": "train", "from": "Suzhou Railway Station",
                     "to": "Shanghai Railway Station", "depart": "19:00", "arrive": "19:30",
                     "cost": 40}
                ]
            }
        ]
    })
}

/// Serialise `value` to `path`.
pub(super) fn write_json_file(path: &Utf8Path, value: &Value) {
    let payload = serde_json::to_string_pretty(value).expect("serialise fixture");
    write_utf8(path, payload.as_bytes());
}
