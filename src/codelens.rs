//! "Preview Docs" CodeLens provider.
//!
//! Turns the [`DocumentableDeclaration`]s of a document into LSP
//! [`CodeLens`]es. Each lens spans its declaration and invokes the editor's
//! documentation preview command with a single argument:
//!
//! ```json
//! { "moduleName": "util", "nodeName": "parse", "nodeType": "functions" }
//! ```
//!
//! # Module names
//!
//! The module a document belongs to is derived from where it sits relative to
//! the parent of the workspace root:
//!
//! | Relative path | Module |
//! |---------------|--------|
//! | `project/main.bal` | `project` |
//! | `project/modules/util/util.bal` | `util` |
//! | anything else | none, no lenses |

use std::path::{Component, Path};

use serde_json::json;
use tower_lsp::lsp_types::{CodeLens, Command, Position, Range};
use tracing::{debug, warn};

use crate::config::Settings;
use crate::docgen::{documentable_declarations, DocPolicy, DocumentableDeclaration};
use crate::syntax::{NodePosition, SyntaxNode};

pub const PREVIEW_DOCS_TITLE: &str = "Preview Docs";

/// Lenses for every declaration with a complete position.
pub fn code_lenses(declarations: &[DocumentableDeclaration], settings: &Settings) -> Vec<CodeLens> {
    declarations
        .iter()
        .filter_map(|declaration| {
            let Some(range) = to_range(&declaration.position) else {
                warn!(
                    name = %declaration.display_name,
                    position = ?declaration.position,
                    "declaration has an incomplete position, no lens"
                );
                return None;
            };

            Some(CodeLens {
                range,
                command: Some(show_docs_command(declaration, settings)),
                data: None,
            })
        })
        .collect()
}

/// Lenses for a document, given its (optional) syntax tree.
///
/// Returns nothing when lenses are disabled, when the document has no tree,
/// or when no module name can be derived for `file`.
pub fn document_code_lenses(
    root: Option<&SyntaxNode>,
    workspace_root: &Path,
    file: &Path,
    settings: &Settings,
) -> Vec<CodeLens> {
    if !settings.enable_code_lens {
        return Vec::new();
    }

    let Some(root) = root else {
        return Vec::new();
    };

    let Some(module_name) = module_name_for(workspace_root, file) else {
        debug!(file = %file.display(), "no module name for document");
        return Vec::new();
    };

    let declarations = documentable_declarations(root, &module_name, DocPolicy::from(settings));
    code_lenses(&declarations, settings)
}

pub fn show_docs_command(declaration: &DocumentableDeclaration, settings: &Settings) -> Command {
    Command {
        title: PREVIEW_DOCS_TITLE.to_string(),
        command: settings.show_docs_command.clone(),
        arguments: Some(vec![json!({
            "moduleName": declaration.module_name,
            "nodeName": declaration.display_name,
            "nodeType": declaration.category.directory(),
        })]),
    }
}

/// Module a document belongs to; see the module docs for the layout rules.
pub fn module_name_for(workspace_root: &Path, file: &Path) -> Option<String> {
    let workspace_parent = workspace_root.parent()?;
    let relative = file.strip_prefix(workspace_parent).ok()?;

    let components: Vec<&str> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect();

    match components.as_slice() {
        [project, _file] => Some(project.to_string()),
        [_project, _modules, module, _file] => Some(module.to_string()),
        _ => None,
    }
}

fn to_range(position: &NodePosition) -> Option<Range> {
    Some(Range {
        start: Position {
            line: position.start_line?,
            character: position.start_column?,
        },
        end: Position {
            line: position.end_line?,
            character: position.end_column?,
        },
    })
}
