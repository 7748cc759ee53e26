//! Project overview tree.
//!
//! Shapes the package metadata reported by the language server into the tree
//! an editor shows as a project explorer:
//!
//! ```text
//! shop                      ProjectRoot
//! ├── checkout              Function   (default module)
//! ├── api                   Service    (default module)
//! │   └── getItems          Resource
//! └── cart                  Module
//!     ├── addItem           Function
//!     └── events            Service
//! ```
//!
//! Every level is sorted by name. Source roots are directories holding a
//! `Ballerina.toml`.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_lsp::lsp_types::{Command, Url};
use tracing::debug;

pub const PROJECT_MANIFEST: &str = "Ballerina.toml";
pub const EXECUTE_TREE_ELEMENT_COMMAND: &str = "ballerina.executeTreeElement";

const OVERVIEW_ERROR: &str = "Couldn't create the project overview. Please make sure your code compiles successfully and refresh.";
const NO_PROJECT: &str = "Please open a ballerina project to see the ballerina project overview";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub modules: Vec<Module>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub functions: Vec<FunctionOrResource>,
    #[serde(default)]
    pub services: Vec<Service>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcePosition {
    pub start_line: u32,
    pub start_column: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionOrResource {
    pub name: String,
    pub file_path: String,
    pub position: SourcePosition,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub name: String,
    pub file_path: String,
    pub position: SourcePosition,
    #[serde(default)]
    pub resources: Vec<FunctionOrResource>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    ProjectRoot,
    Module,
    Function,
    Service,
    Resource,
    /// A message shown in place of a tree.
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTreeElement {
    pub name: String,
    pub kind: ElementKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_column: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ProjectTreeElement>,
}

impl ProjectTreeElement {
    fn new(name: impl Into<String>, kind: ElementKind) -> Self {
        ProjectTreeElement {
            name: name.into(),
            kind,
            path: None,
            source_root: None,
            module_name: None,
            service_name: None,
            file_path: None,
            start_line: None,
            start_column: None,
            children: Vec::new(),
        }
    }

    pub fn info(message: &str) -> Self {
        ProjectTreeElement::new(message, ElementKind::Info)
    }

    fn project_root(path: &Path) -> Self {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();

        ProjectTreeElement {
            path: Some(path.to_path_buf()),
            ..ProjectTreeElement::new(name, ElementKind::ProjectRoot)
        }
    }

    /// Rendered expanded with children.
    pub fn collapsible(&self) -> bool {
        matches!(
            self.kind,
            ElementKind::ProjectRoot | ElementKind::Module | ElementKind::Service
        )
    }

    pub fn tooltip(&self) -> Option<String> {
        match self.kind {
            ElementKind::ProjectRoot => self.path.as_ref().map(|path| path.display().to_string()),
            _ => None,
        }
    }

    /// Command run when the element is clicked, for elements that navigate somewhere.
    ///
    /// Arguments: source root URI, file path, module name, service name (resources
    /// only), element name, start line, start column.
    pub fn command(&self) -> Option<Command> {
        if !matches!(
            self.kind,
            ElementKind::ProjectRoot
                | ElementKind::Function
                | ElementKind::Service
                | ElementKind::Resource
        ) {
            return None;
        }

        let source_root = self
            .source_root
            .as_ref()
            .and_then(|root| Url::from_file_path(root).ok())
            .map(|url| url.to_string());

        let service_name = match self.kind {
            ElementKind::Resource => self.service_name.clone(),
            _ => None,
        };

        Some(Command {
            title: "Execute Tree Command".to_string(),
            command: EXECUTE_TREE_ELEMENT_COMMAND.to_string(),
            arguments: Some(vec![
                json!(source_root),
                json!(self.file_path),
                json!(self.module_name),
                json!(service_name),
                Value::String(self.name.clone()),
                json!(self.start_line),
                json!(self.start_column),
            ]),
        })
    }
}

/// Build the overview of the first package found under `source_root`.
pub fn build_project_tree(packages: &[Package], source_root: &Path) -> Vec<ProjectTreeElement> {
    let Some(package) = packages.first() else {
        return vec![ProjectTreeElement::info(OVERVIEW_ERROR)];
    };

    let (default_modules, modules): (Vec<&Module>, Vec<&Module>) =
        package.modules.iter().partition(|module| module.default);

    let mut elements = Vec::new();

    if let Some(default_module) = default_modules.last() {
        let file_root = source_root.to_path_buf();
        elements.extend(module_members(default_module, source_root, &file_root));
    }

    for module in modules
        .into_iter()
        .sorted_by(|a, b| compare_names(module_name(a), module_name(b)))
    {
        let name = module_name(module);
        let file_root = source_root.join("modules").join(name);

        elements.push(ProjectTreeElement {
            source_root: Some(source_root.to_path_buf()),
            children: module_members(module, source_root, &file_root),
            ..ProjectTreeElement::new(name, ElementKind::Module)
        });
    }

    debug!(
        source_root = %source_root.display(),
        count = elements.len(),
        "built project overview"
    );

    elements
}

/// Nearest directory at or above `path` holding a project manifest.
///
/// The home directory is never a source root.
pub fn find_source_root(path: &Path, home: Option<&Path>) -> Option<PathBuf> {
    path.ancestors()
        .filter(|ancestor| Some(*ancestor) != home)
        .find(|ancestor| ancestor.join(PROJECT_MANIFEST).is_file())
        .map(Path::to_path_buf)
}

/// Top level of the overview: one element per project.
///
/// Workspace folders count when they hold a manifest; the project of the
/// active document is added when it is not one of them.
pub fn project_roots(
    workspace_folders: &[PathBuf],
    active_document: Option<&Path>,
    home: Option<&Path>,
) -> Vec<ProjectTreeElement> {
    let mut roots: Vec<ProjectTreeElement> = workspace_folders
        .iter()
        .filter(|folder| folder.join(PROJECT_MANIFEST).is_file())
        .map(|folder| ProjectTreeElement::project_root(folder))
        .collect();

    if let Some(active_root) = active_document.and_then(|document| find_source_root(document, home)) {
        if !roots
            .iter()
            .any(|root| root.path.as_deref() == Some(active_root.as_path()))
        {
            roots.push(ProjectTreeElement::project_root(&active_root));
        }
    }

    if roots.is_empty() {
        roots.push(ProjectTreeElement::info(NO_PROJECT));
    }

    roots
}

fn module_members(module: &Module, source_root: &Path, file_root: &Path) -> Vec<ProjectTreeElement> {
    let module_name = module.name.clone();

    let functions = module
        .functions
        .iter()
        .sorted_by(|a, b| compare_names(&a.name, &b.name))
        .map(|function| ProjectTreeElement {
            source_root: Some(source_root.to_path_buf()),
            module_name: module_name.clone(),
            file_path: Some(file_root.join(&function.file_path)),
            start_line: Some(function.position.start_line),
            start_column: Some(function.position.start_column),
            ..ProjectTreeElement::new(&function.name, ElementKind::Function)
        });

    let services = module
        .services
        .iter()
        .sorted_by(|a, b| compare_names(&a.name, &b.name))
        .map(|service| {
            let file_path = file_root.join(&service.file_path);

            let resources = service
                .resources
                .iter()
                .sorted_by(|a, b| compare_names(&a.name, &b.name))
                .map(|resource| ProjectTreeElement {
                    source_root: Some(source_root.to_path_buf()),
                    module_name: module_name.clone(),
                    service_name: Some(service.name.clone()),
                    file_path: Some(file_path.clone()),
                    start_line: Some(resource.position.start_line),
                    start_column: Some(resource.position.start_column),
                    ..ProjectTreeElement::new(&resource.name, ElementKind::Resource)
                })
                .collect();

            ProjectTreeElement {
                source_root: Some(source_root.to_path_buf()),
                module_name: module_name.clone(),
                file_path: Some(file_path),
                start_line: Some(service.position.start_line),
                start_column: Some(service.position.start_column),
                children: resources,
                ..ProjectTreeElement::new(&service.name, ElementKind::Service)
            }
        });

    functions.chain(services).collect()
}

fn module_name(module: &Module) -> &str {
    module.name.as_deref().unwrap_or_default()
}

/// Case-insensitive, falling back to byte order for names that only differ in case.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::test_utils::create_test_project_dir;

    fn function(name: &str, file: &str, line: u32) -> FunctionOrResource {
        FunctionOrResource {
            name: name.to_string(),
            file_path: file.to_string(),
            position: SourcePosition {
                start_line: line,
                start_column: 0,
            },
        }
    }

    fn names(elements: &[ProjectTreeElement]) -> Vec<&str> {
        elements.iter().map(|element| element.name.as_str()).collect()
    }

    fn sample_package() -> Package {
        Package {
            name: "shop".to_string(),
            modules: vec![
                Module {
                    name: Some("payments".to_string()),
                    functions: vec![function("refund", "pay.bal", 3), function("charge", "pay.bal", 1)],
                    ..Module::default()
                },
                Module {
                    name: Some("shop".to_string()),
                    default: true,
                    functions: vec![function("main", "main.bal", 0), function("Setup", "main.bal", 9)],
                    services: vec![Service {
                        name: "api".to_string(),
                        file_path: "service.bal".to_string(),
                        position: SourcePosition {
                            start_line: 4,
                            start_column: 0,
                        },
                        resources: vec![function("put", "", 8), function("get", "", 5)],
                    }],
                },
                Module {
                    name: Some("cart".to_string()),
                    ..Module::default()
                },
            ],
        }
    }

    #[test]
    fn test_default_module_members_are_top_level() {
        let tree = build_project_tree(&[sample_package()], Path::new("/work/shop"));

        assert_eq!(names(&tree), vec!["main", "Setup", "api", "cart", "payments"]);

        let api = &tree[2];
        assert_eq!(api.kind, ElementKind::Service);
        assert_eq!(api.file_path, Some(PathBuf::from("/work/shop/service.bal")));
        assert_eq!(names(&api.children), vec!["get", "put"]);
        assert_eq!(api.children[0].service_name.as_deref(), Some("api"));
        assert_eq!(api.children[0].start_line, Some(5));
    }

    #[test]
    fn test_module_members_use_module_paths() {
        let tree = build_project_tree(&[sample_package()], Path::new("/work/shop"));

        let payments = tree.iter().find(|element| element.name == "payments").unwrap();
        assert_eq!(payments.kind, ElementKind::Module);
        assert_eq!(names(&payments.children), vec!["charge", "refund"]);
        assert_eq!(
            payments.children[0].file_path,
            Some(PathBuf::from("/work/shop/modules/payments/pay.bal"))
        );
        assert_eq!(payments.children[0].module_name.as_deref(), Some("payments"));
    }

    #[test]
    fn test_missing_packages() {
        let tree = build_project_tree(&[], Path::new("/work/shop"));

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].kind, ElementKind::Info);
    }

    #[test]
    fn test_element_commands() {
        let tree = build_project_tree(&[sample_package()], Path::new("/work/shop"));

        let resource_command = tree[2].children[0].command().unwrap();
        assert_eq!(resource_command.command, EXECUTE_TREE_ELEMENT_COMMAND);
        assert_eq!(
            resource_command.arguments.unwrap(),
            vec![
                json!("file:///work/shop"),
                json!("/work/shop/service.bal"),
                json!("shop"),
                json!("api"),
                json!("get"),
                json!(5),
                json!(0),
            ]
        );

        let service_arguments = tree[2].command().unwrap().arguments.unwrap();
        assert_eq!(service_arguments[3], Value::Null);

        let module = tree.iter().find(|element| element.kind == ElementKind::Module).unwrap();
        assert!(module.command().is_none());
        assert!(module.collapsible());
        assert!(!tree[0].collapsible());
    }

    #[test]
    fn test_find_source_root() {
        let (_temp_dir, project_dir) = create_test_project_dir();
        let nested = project_dir.join("modules").join("cart");
        fs::create_dir_all(&nested).unwrap();
        fs::write(project_dir.join(PROJECT_MANIFEST), "[package]\n").unwrap();

        assert_eq!(
            find_source_root(&nested.join("cart.bal"), None),
            Some(project_dir.clone())
        );
        assert_eq!(find_source_root(&nested, Some(project_dir.as_path())), None);
    }

    #[test]
    fn test_project_roots() {
        let (_temp_dir, project_dir) = create_test_project_dir();
        let shop = project_dir.join("shop");
        let notes = project_dir.join("notes");
        let library = project_dir.join("library");
        for dir in [&shop, &notes, &library] {
            fs::create_dir_all(dir).unwrap();
        }
        fs::write(shop.join(PROJECT_MANIFEST), "").unwrap();
        fs::write(library.join(PROJECT_MANIFEST), "").unwrap();

        let roots = project_roots(
            &[shop.clone(), notes.clone()],
            Some(library.join("main.bal").as_path()),
            None,
        );

        assert_eq!(names(&roots), vec!["shop", "library"]);
        assert!(roots.iter().all(|root| root.kind == ElementKind::ProjectRoot));
        assert_eq!(roots[1].tooltip(), Some(library.display().to_string()));

        let deduplicated = project_roots(&[shop.clone()], Some(shop.join("main.bal").as_path()), None);
        assert_eq!(names(&deduplicated), vec!["shop"]);
    }

    #[test]
    fn test_no_project_roots() {
        let (_temp_dir, project_dir) = create_test_project_dir();

        let roots = project_roots(&[project_dir], None, None);

        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].kind, ElementKind::Info);
    }

    #[test]
    fn test_overview_serializes_camel_case() {
        let tree = build_project_tree(&[sample_package()], Path::new("/work/shop"));

        let value = serde_json::to_value(&tree[0]).unwrap();
        assert_eq!(value["kind"], "Function");
        assert_eq!(value["moduleName"], "shop");
        assert_eq!(value["startLine"], 0);
        assert!(value.get("children").is_none());
    }
}
