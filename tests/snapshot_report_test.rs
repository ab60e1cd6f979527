use archmap::commands::report::parse_snapshot;
use archmap::io::writers::{JsonWriter, MarkdownWriter};
use archmap::{Engine, OutputWriter};
use indoc::indoc;
use pretty_assertions::assert_eq;

const SNAPSHOT: &str = indoc! {r#"
    {
      "projectRoot": "/srv/catalog",
      "structure": { "directories": ["lib", "lib/search", "lib/store", "lib/settings"] },
      "language": { "primary": "javascript" },
      "files": [
        {
          "path": "lib/search/index.js",
          "imports": ["../store", "../settings/defaults.json"],
          "exports": ["search"],
          "functions": [{ "name": "search", "parameters": ["query"] }],
          "lineCount": 420
        },
        { "path": "lib/store/index.js", "exports": ["find"], "complexity": 4 },
        { "path": "lib/settings/defaults.json", "category": "config" },
        { "path": "lib/search/README.md" }
      ],
      "architecture": { "pattern": "modular", "notes": "Catalog service." }
    }
"#};

#[test]
fn snapshot_renders_contract_and_json() {
    let input = parse_snapshot(SNAPSHOT).unwrap();
    let result = Engine::default().analyze(&input).unwrap();

    let names: Vec<&str> = result.modules.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["search", "settings", "store"]);
    assert_eq!(result.modules[0].complexity, 9);
    assert!(result.modules[0].has_documentation);

    let mut markdown = Vec::new();
    MarkdownWriter::new(&mut markdown).write_results(&result).unwrap();
    let markdown = String::from_utf8(markdown).unwrap();
    assert_eq!(markdown, result.contract_document);
    assert!(markdown.contains("Catalog service."));
    assert!(markdown.contains("- **Architecture pattern:** modular"));

    let mut json = Vec::new();
    JsonWriter::new(&mut json).write_results(&result).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
    assert_eq!(value["modules"][0]["rootPath"], "lib/search");
    assert_eq!(value["modules"][0]["files"][0], "lib/search/index.js");
    assert_eq!(value["metrics"]["totalRelations"], 2);
}

#[test]
fn config_target_is_a_configuration_integration() {
    let input = parse_snapshot(SNAPSHOT).unwrap();
    let result = Engine::default().analyze(&input).unwrap();

    let kinds: Vec<(&str, String)> = result
        .integration_points
        .iter()
        .map(|p| (p.target_name.as_str(), p.kind.to_string()))
        .collect();
    assert!(kinds.contains(&("settings", "configuration".to_string())));
    assert!(kinds.contains(&("store", "data-access".to_string())));
}

#[test]
fn snapshot_without_structure_names_the_prerequisite() {
    let input = parse_snapshot(r#"{ "projectRoot": "/x", "files": [] }"#).unwrap();
    let err = Engine::default().analyze(&input).unwrap_err();
    assert_eq!(err.to_string(), "missing prerequisite: project structure");
}
