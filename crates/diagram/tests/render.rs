use invsync_core::CanonicalInventory;
use invsync_diagram::render_plantuml;
use serde_json::json;

#[test]
fn identifiers_are_sanitized_but_annotations_keep_raw_values() {
    let inventory = CanonicalInventory::from_value(json!({
        "web servers": {
            "hosts": ["host-1.example.com"],
            "vars": {"motd": "héllo world", "upstream": "host-1.example.com"}
        },
        "_meta": {"hostvars": {"host-1.example.com": {"ansible_host": "10.0.0.1"}}}
    }))
    .unwrap();

    let rendered = render_plantuml(&inventory).unwrap();
    let lines: Vec<&str> = rendered.lines().collect();

    assert_eq!(lines.first(), Some(&"@startuml"));
    assert_eq!(lines.last(), Some(&"@enduml"));
    assert!(lines.contains(&"object host_1.example.com {"));
    assert!(lines.contains(&"  \"ansible_host\": \"10.0.0.1\""));
    assert!(lines.contains(&"package web_servers {"));
    assert!(lines.contains(&"  web_servers_hosts - host_1.example.com"));
    assert!(lines.contains(&"  class web_servers_vars"));
    assert!(lines.contains(&"class web_servers_vars {"));
    assert!(lines.contains(&"  \"motd\": \"h\\u00e9llo world\""));
    assert!(lines.contains(&"  \"upstream\": \"host-1.example.com\""));
    assert!(!rendered.contains(','));
}

#[test]
fn children_reference_sanitized_group_identifiers() {
    let inventory = CanonicalInventory::from_value(json!({
        "all": {"children": ["ungrouped", "eu-west.1"]},
        "ungrouped": {},
        "eu-west.1": {"hosts": ["a"]},
        "_meta": {"hostvars": {"a": {}}}
    }))
    .unwrap();

    let rendered = render_plantuml(&inventory).unwrap();

    assert!(rendered.contains("package all {\n  all_children - ungrouped\n  all_children - eu_west_1\n}\n"));
    assert!(rendered.contains("package ungrouped {\n}\n"));
    assert!(rendered.contains("package eu_west_1 {\n  eu_west_1_hosts - a\n}\n"));
    assert!(rendered.contains("object a\n"));
}
