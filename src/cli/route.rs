//! CLI route: single route table and run context. Dispatches to tree
//! operations, the snapshot store, and presentation.

use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_heads, format_info, format_listing, format_matches, format_node,
};
use crate::config::{ConfigLoader, SnaptreeConfig};
use crate::error::ApiError;
use crate::store::{self, SledTreeStore, TreeStore};
use crate::tree::{HashTree, OpenTree};
use crate::types::BlockRef;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Runtime context for CLI execution: workspace and loaded configuration.
/// The snapshot store is opened only by the commands that need it.
pub struct RunContext {
    workspace_root: PathBuf,
    config: SnaptreeConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        Ok(Self::with_config(workspace_root, config))
    }

    pub fn with_config(workspace_root: PathBuf, config: SnaptreeConfig) -> Self {
        Self {
            workspace_root,
            config,
        }
    }

    pub fn config(&self) -> &SnaptreeConfig {
        &self.config
    }

    fn open_store(&self) -> Result<SledTreeStore, ApiError> {
        let store_path = self.config.storage.resolve(&self.workspace_root);
        std::fs::create_dir_all(&store_path).map_err(|e| ApiError::Io {
            path: store_path.clone(),
            source: e,
        })?;
        debug!(store = %store_path.display(), "Opening snapshot store");
        Ok(SledTreeStore::new(&store_path)?)
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Init { file, force } => {
                if file.exists() && !*force {
                    return Err(ApiError::InvalidArgument(format!(
                        "{} already exists (use --force to overwrite)",
                        file.display()
                    )));
                }
                let tree = HashTree::empty();
                write_tree(file, &tree)?;
                Ok(format!(
                    "Initialized {} (root {})",
                    file.display(),
                    hex::encode(tree.root_hash())
                ))
            }
            Commands::PutFile { file, path, refs } => {
                let block_refs = refs
                    .iter()
                    .map(|r| r.parse::<BlockRef>())
                    .collect::<Result<Vec<_>, _>>()?;
                self.update(file, |open| open.put_file(path, &block_refs))
            }
            Commands::PutDir { file, path } => self.update(file, |open| open.put_dir(path)),
            Commands::Rm { file, path } => self.update(file, |open| open.delete_file(path)),
            Commands::Get { file, path, format } => {
                let tree = read_tree(file)?;
                let node = tree.get(path)?;
                format_node(&crate::tree::path::clean(path), node, format)
            }
            Commands::Ls { file, path, format } => {
                let tree = read_tree(file)?;
                let children = tree.list(path)?;
                format_listing(&crate::tree::path::clean(path), &children, format)
            }
            Commands::Glob {
                file,
                pattern,
                format,
            } => {
                let tree = read_tree(file)?;
                let matches = tree.glob(pattern)?;
                format_matches(&matches, format)
            }
            Commands::Info { file, format } => format_info(&read_tree(file)?, format),
            Commands::Merge { output, inputs } => {
                let sources = inputs
                    .iter()
                    .map(|input| read_tree(input).map(|tree| tree.open()))
                    .collect::<Result<Vec<OpenTree>, _>>()?;
                let source_refs: Vec<&OpenTree> = sources.iter().collect();

                let mut merged = OpenTree::new();
                merged.merge(&source_refs)?;
                let tree = merged.finish()?;
                write_tree(output, &tree)?;
                info!(inputs = inputs.len(), output = %output.display(), "Merged snapshots");
                Ok(format!(
                    "Merged {} snapshots into {} (root {})",
                    inputs.len(),
                    output.display(),
                    hex::encode(tree.root_hash())
                ))
            }
            Commands::Commit { file, name } => {
                let tree = read_tree(file)?;
                let store = self.open_store()?;
                let hash = store::commit(&store, name, &tree)?;
                store.flush()?;
                Ok(format!("{} -> {}", name, hex::encode(hash)))
            }
            Commands::Checkout { name, file } => {
                let store = self.open_store()?;
                let tree = store::checkout(&store, name)?
                    .ok_or_else(|| ApiError::HeadNotFound(name.clone()))?;
                write_tree(file, &tree)?;
                Ok(format!(
                    "Checked out {} ({}) to {}",
                    name,
                    hex::encode(tree.root_hash()),
                    file.display()
                ))
            }
            Commands::Config => toml::to_string_pretty(&self.config)
                .map_err(|e| ApiError::ConfigError(format!("Failed to render config: {}", e))),
            Commands::Heads { format } => {
                let store = self.open_store()?;
                format_heads(&store.heads()?, format)
            }
        }
    }

    /// Open the snapshot in `file`, apply `mutate`, finish, and write it back.
    fn update<F>(&self, file: &Path, mutate: F) -> Result<String, ApiError>
    where
        F: FnOnce(&mut OpenTree) -> Result<(), crate::error::TreeError>,
    {
        let mut open = read_tree(file)?.open();
        mutate(&mut open)?;
        let tree = open.finish()?;
        write_tree(file, &tree)?;
        Ok(format!(
            "Updated {} (root {})",
            file.display(),
            hex::encode(tree.root_hash())
        ))
    }
}

/// Read and decode a snapshot file
pub fn read_tree(file: &Path) -> Result<HashTree, ApiError> {
    let bytes = std::fs::read(file).map_err(|e| ApiError::Io {
        path: file.to_path_buf(),
        source: e,
    })?;
    Ok(HashTree::unmarshal(&bytes)?)
}

/// Encode a snapshot and replace `file` with it atomically
pub fn write_tree(file: &Path, tree: &HashTree) -> Result<(), ApiError> {
    let file_name = file.file_name().ok_or_else(|| {
        ApiError::InvalidArgument(format!("{} is not a file path", file.display()))
    })?;
    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(".tmp");
    let tmp_path = file.with_file_name(tmp_name);

    let bytes = tree.marshal()?;
    std::fs::write(&tmp_path, &bytes).map_err(|e| ApiError::Io {
        path: tmp_path.clone(),
        source: e,
    })?;
    std::fs::rename(&tmp_path, file).map_err(|e| ApiError::Io {
        path: file.to_path_buf(),
        source: e,
    })?;
    debug!(file = %file.display(), bytes = bytes.len(), "Wrote snapshot");
    Ok(())
}
