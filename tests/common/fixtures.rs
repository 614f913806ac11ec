use serde_json::{Value, json};

/// The gender logic field from the designer's reference example.
pub fn gender_logic_field() -> Value {
    json!({
        "kind": "logic",
        "key": "gender",
        "label": "Gender",
        "options": [
            {"key": "male", "label": "Male", "actions": [
                {"type": "checkmark", "position": {"x": 10, "y": 20, "page": 1}}
            ]},
            {"key": "female", "label": "Female", "actions": [
                {"type": "checkmark", "position": {"x": 10, "y": 40, "page": 1}}
            ]}
        ]
    })
}

/// A boolean field whose `true` branch was never placed.
pub fn unplaced_boolean_field() -> Value {
    json!({
        "kind": "boolean",
        "key": "newsletter",
        "trueActions": [],
        "falseActions": [
            {"type": "fillCustom", "position": {"x": 300, "y": 120, "page": 2}, "customText": "no"}
        ]
    })
}

/// A plain field whose sample value is an object.
pub fn object_field(key: &str) -> Value {
    json!({
        "kind": "field",
        "key": key,
        "type": "text",
        "page": 1,
        "position": {"x": 72, "y": 600},
        "sampleValue": {"first": "Ada", "last": "Lovelace"}
    })
}

/// A mixed descriptor list as an import producer would hand over.
pub fn mixed_descriptors() -> Value {
    json!([
        object_field("applicant"),
        gender_logic_field(),
        unplaced_boolean_field(),
        {"kind": "field", "key": "signature", "type": "signature", "page": 2,
         "position": {"x": 50, "y": 80}, "size": {"width": 200, "height": 40}},
        {"kind": "field", "key": "hobbies", "type": "text", "page": 1,
         "position": {"x": 72, "y": 500}, "sampleValue": ["chess"]}
    ])
}

/// Data matching `mixed_descriptors`.
pub fn sample_data() -> Value {
    json!({
        "applicant": {"first": "Ada", "last": "Lovelace"},
        "gender": "female",
        "newsletter": false,
        "signature": "signatures/ada.png",
        "hobbies": ["chess", "math"]
    })
}
