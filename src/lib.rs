//! doclens: documentation CodeLens and project overview for a compiler's language service
//!
//! The compiler's language server hands out syntax trees and package metadata;
//! this crate turns them into the affordances an editor shows on top:
//!
//! - **CodeLens**: a "Preview Docs" action above every public, documented
//!   declaration, and above records, objects and classes that have
//!   documented public members
//! - **Project overview**: the project/module/function/service tree of a
//!   source root
//!
//! # Architecture
//!
//! - [`syntax`]: typed syntax tree built from the language server's JSON, plus
//!   the depth-first [`syntax::walk`] and its [`syntax::Visitor`] hooks
//! - [`docgen`]: the visitor deciding which declarations are documentable
//! - [`codelens`]: declarations to LSP `CodeLens`es, module name resolution
//! - [`overview`]: package metadata to the project tree
//! - [`server`]: tower-lsp backend serving all of the above
//! - [`config`]: settings
//!
//! # Usage
//!
//! ```ignore
//! use doclens::docgen::{documentable_declarations, DocPolicy};
//! use doclens::syntax::SyntaxNode;
//!
//! let root: SyntaxNode = tree_json.parse()?;
//! for declaration in documentable_declarations(&root, "shop", DocPolicy::default()) {
//!     println!("{} ({})", declaration.display_name, declaration.category.directory());
//! }
//! ```

pub mod syntax;

pub mod codelens;
pub mod docgen;
pub mod overview;
pub mod server;

pub mod config;
pub mod error;

#[macro_use]
mod macros;

// Test utilities (only available in test builds)
#[cfg(test)]
pub mod test_utils;
