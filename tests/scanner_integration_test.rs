use std::fs;
use std::path::Path;

use archmap::core::{IntegrationKind, Language, ModuleType};
use archmap::{scan_project, ArchmapConfig, Engine, LanguageRegistry};
use indoc::indoc;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn python_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "app/controllers/orders.py",
        indoc! {r#"
            from app.services import billing
            from app.models.order import Order

            def create_order(request):
                return billing.charge(Order(request))
        "#},
    );
    write(
        dir.path(),
        "app/services/billing.py",
        indoc! {r#"
            from app.models.order import Order

            def charge(order):
                return order.total
        "#},
    );
    write(
        dir.path(),
        "app/models/order.py",
        indoc! {r#"
            class Order:
                def __init__(self, request):
                    self.total = 0
        "#},
    );
    write(dir.path(), "tests/test_orders.py", "def test_create():\n    pass\n");
    write(dir.path(), ".venv/lib/site.py", "import os\n");
    dir
}

#[test]
fn scanned_python_project_is_analyzed_end_to_end() {
    let dir = python_project();
    let registry = LanguageRegistry::with_defaults();
    let config = ArchmapConfig::default();
    let input = scan_project(dir.path(), &config, &registry, false).unwrap();

    assert_eq!(input.language.as_ref().unwrap().primary, Language::Python);
    let paths: Vec<&str> = input
        .files
        .as_ref()
        .unwrap()
        .iter()
        .map(|f| f.path.as_str())
        .collect();
    assert!(!paths.iter().any(|p| p.starts_with(".venv")));

    let result = Engine::new(config).analyze(&input).unwrap();
    let modules: Vec<(&str, ModuleType)> = result
        .modules
        .iter()
        .map(|m| (m.name.as_str(), m.module_type))
        .collect();
    assert_eq!(
        modules,
        vec![
            ("controllers", ModuleType::Controller),
            ("models", ModuleType::Model),
            ("services", ModuleType::Service),
            ("tests", ModuleType::Test),
        ]
    );

    let kinds: Vec<(&str, &str, IntegrationKind)> = result
        .integration_points
        .iter()
        .map(|p| (p.source_name.as_str(), p.target_name.as_str(), p.kind))
        .collect();
    assert!(kinds.contains(&("controllers", "services", IntegrationKind::RequestHandling)));
    assert!(kinds.contains(&("services", "models", IntegrationKind::DataAccess)));
}

#[test]
fn gitignored_files_are_not_scanned() {
    let dir = python_project();
    fs::create_dir_all(dir.path().join(".git")).unwrap();
    write(dir.path(), ".gitignore", "generated/\n");
    write(dir.path(), "generated/schema.py", "X = 1\n");

    let input = scan_project(
        dir.path(),
        &ArchmapConfig::default(),
        &LanguageRegistry::with_defaults(),
        false,
    )
    .unwrap();
    let files = input.files.unwrap();
    assert!(files.iter().all(|f| !f.path.starts_with("generated/")));
    assert!(files.iter().any(|f| f.path == ".gitignore"));
}
