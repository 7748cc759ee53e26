//! Language server exposing the documentation lenses and the project overview.
//!
//! The server does not parse source files itself. The editor extension already
//! talks to the compiler's language server and forwards every syntax tree it
//! receives through the `doclens/syntaxTree` notification; lenses are computed
//! from the most recent tree of each document.
//!
//! | Method | Kind | Purpose |
//! |--------|------|---------|
//! | `textDocument/codeLens` | request | "Preview Docs" lenses |
//! | `codeLens/resolve` | request | returns the lens unchanged |
//! | `doclens/syntaxTree` | notification | cache a document's syntax tree |
//! | `doclens/projectOverview` | request | [`build_project_tree`] |
//! | `doclens/projectRoots` | request | [`project_roots`] |

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    CodeLens, CodeLensOptions, CodeLensParams, DidChangeConfigurationParams,
    DidCloseTextDocumentParams, InitializeParams, InitializeResult, InitializedParams,
    MessageType, ServerCapabilities, ServerInfo, TextDocumentSyncCapability,
    TextDocumentSyncKind, TextDocumentSyncOptions, Url,
};
use tower_lsp::{Client, ClientSocket, LanguageServer, LspService, Server};
use tracing::{debug, info, warn};

use crate::codelens::document_code_lenses;
use crate::config::Settings;
use crate::overview::{build_project_tree, project_roots, Package, ProjectTreeElement};
use crate::params_path;
use crate::syntax::{SyntaxNode, SyntaxTreeResponse};

pub const SYNTAX_TREE_NOTIFICATION: &str = "doclens/syntaxTree";
pub const PROJECT_OVERVIEW_REQUEST: &str = "doclens/projectOverview";
pub const PROJECT_ROOTS_REQUEST: &str = "doclens/projectRoots";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntaxTreeParams {
    pub uri: Url,
    #[serde(flatten)]
    pub response: SyntaxTreeResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectOverviewParams {
    pub source_root: PathBuf,
    #[serde(default)]
    pub packages: Vec<Package>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRootsParams {
    #[serde(default)]
    pub workspace_folders: Vec<PathBuf>,
    #[serde(default)]
    pub active_document: Option<PathBuf>,
    #[serde(default)]
    pub home: Option<PathBuf>,
}

#[derive(Debug)]
pub struct Backend {
    client: Client,
    settings: RwLock<Settings>,
    workspace_root: RwLock<Option<PathBuf>>,
    trees: RwLock<HashMap<Url, SyntaxNode>>,
}

impl Backend {
    pub fn new(client: Client) -> Self {
        Backend {
            client,
            settings: RwLock::new(Settings::default()),
            workspace_root: RwLock::new(None),
            trees: RwLock::new(HashMap::new()),
        }
    }

    async fn reload_settings(&self) {
        let Some(root) = self.workspace_root.read().await.clone() else {
            return;
        };

        match Settings::new(&root) {
            Ok(settings) => *self.settings.write().await = settings,
            Err(err) => {
                warn!(error = %err, "failed to load settings, keeping the previous ones");
                self.client
                    .log_message(MessageType::WARNING, format!("doclens settings: {err}"))
                    .await;
            }
        }
    }

    async fn refresh_code_lenses(&self) {
        if let Err(err) = self.client.code_lens_refresh().await {
            debug!(error = %err, "client did not accept a code lens refresh");
        }
    }

    /// Cache (or drop) the syntax tree of a document.
    pub async fn syntax_tree(&self, params: SyntaxTreeParams) {
        let SyntaxTreeParams { uri, response } = params;

        match response.root() {
            Ok(Some(root)) => {
                debug!(%uri, "cached syntax tree");
                self.trees.write().await.insert(uri, root);
            }
            Ok(None) => {
                debug!(%uri, "no syntax tree for document");
                self.trees.write().await.remove(&uri);
            }
            Err(err) => {
                warn!(%uri, error = %err, "discarding malformed syntax tree");
                self.client
                    .log_message(MessageType::ERROR, format!("{uri}: {err}"))
                    .await;
                self.trees.write().await.remove(&uri);
            }
        }

        self.refresh_code_lenses().await;
    }

    pub async fn project_overview(
        &self,
        params: ProjectOverviewParams,
    ) -> Result<Vec<ProjectTreeElement>> {
        Ok(build_project_tree(&params.packages, &params.source_root))
    }

    pub async fn project_roots(&self, params: ProjectRootsParams) -> Result<Vec<ProjectTreeElement>> {
        Ok(project_roots(
            &params.workspace_folders,
            params.active_document.as_deref(),
            params.home.as_deref(),
        ))
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    #[allow(deprecated)] // root_uri is still what most clients send
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let root = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .map(|folder| folder.uri.clone())
            .or(params.root_uri)
            .and_then(|uri| uri.to_file_path().ok());

        info!(root = ?root, "initializing");
        *self.workspace_root.write().await = root;
        self.reload_settings().await;

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(
                    TextDocumentSyncOptions {
                        open_close: Some(true),
                        change: Some(TextDocumentSyncKind::NONE),
                        ..Default::default()
                    },
                )),
                code_lens_provider: Some(CodeLensOptions {
                    resolve_provider: Some(true),
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "doclens".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "doclens initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.trees.write().await.remove(&params.text_document.uri);
    }

    async fn did_change_configuration(&self, _: DidChangeConfigurationParams) {
        self.reload_settings().await;
        self.refresh_code_lenses().await;
    }

    async fn code_lens(&self, params: CodeLensParams) -> Result<Option<Vec<CodeLens>>> {
        let Some(path) = params_path!(params) else {
            return Ok(None);
        };
        let Some(root) = self.workspace_root.read().await.clone() else {
            return Ok(None);
        };

        let settings = self.settings.read().await;
        let trees = self.trees.read().await;

        let lenses = document_code_lenses(
            trees.get(&params.text_document.uri),
            &root,
            &path,
            &settings,
        );

        Ok(Some(lenses))
    }

    async fn code_lens_resolve(&self, lens: CodeLens) -> Result<CodeLens> {
        if self.settings.read().await.enable_code_lens {
            Ok(lens)
        } else {
            Ok(CodeLens {
                command: None,
                ..lens
            })
        }
    }
}

/// The backend wired up with the custom doclens methods.
pub fn service() -> (LspService<Backend>, ClientSocket) {
    LspService::build(Backend::new)
        .custom_method(SYNTAX_TREE_NOTIFICATION, Backend::syntax_tree)
        .custom_method(PROJECT_OVERVIEW_REQUEST, Backend::project_overview)
        .custom_method(PROJECT_ROOTS_REQUEST, Backend::project_roots)
        .finish()
}

pub async fn serve_stdio() {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = service();
    Server::new(stdin, stdout, socket).serve(service).await;
}
