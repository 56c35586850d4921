use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{info, warn};
use sluice_core::error_code::{install_catalog, MessageCatalog};
use sluice_core::storage::{InMemoryBlobStore, LocalBlobStore, LocalStorageProvider};
use sluice_core::{BlobStore, Error, HostConfig, HostContext, InterceptorRegistry, Record, Result, StorageProvider};

/// Print `name version - description` for every registered interceptor
pub fn list(registry: &InterceptorRegistry) {
    if registry.is_empty() {
        println!("No interceptors registered.");
        return;
    }
    for descriptor in registry.descriptors() {
        println!("{} {} - {}", descriptor.name(), descriptor.version(), descriptor.description());
    }
}

/// Load the host configuration, initialize its chain and push one batch through it
pub fn run(registry: &InterceptorRegistry, config_path: &Path, input: Option<&Path>) -> Result<()> {
    // Relative paths in the host file are resolved against its directory
    let base = config_path.parent().map(Path::to_path_buf).unwrap_or_default();
    let file_name = config_path
        .file_name()
        .map(PathBuf::from)
        .ok_or_else(|| Error::Other(format!("Not a configuration file: {}", config_path.display())))?;
    let provider: Arc<dyn StorageProvider> = Arc::new(LocalStorageProvider::new(base));

    let host = Arc::new(HostConfig::load(provider.as_ref(), &file_name)?);
    install_messages(provider.as_ref(), &host)?;
    let blob_store = open_blob_store(&provider, &host);

    let mut chain = registry.build_chain(&host.interceptor_definitions()?)?;
    let context = HostContext::new("host", Arc::clone(&host), blob_store);
    let issues = chain.init(&context)?;
    if !issues.is_empty() {
        for issue in &issues {
            eprintln!("{}: {}", issue.source(), issue.localized_message());
        }
        chain.destroy();
        return Err(Error::Other(format!(
            "Interceptor initialization reported {} issue(s)",
            issues.len()
        )));
    }

    let records = match read_records(input) {
        Ok(records) => records,
        Err(e) => {
            chain.destroy();
            return Err(e);
        }
    };
    info!("Processing {} record(s) through {} interceptor(s)", records.len(), chain.len());

    let result = chain.intercept(records);
    chain.destroy();
    let output = result?;

    let rendered = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::Other(format!("Cannot render records: {}", e)))?;
    println!("{}", rendered);
    Ok(())
}

fn install_messages(provider: &dyn StorageProvider, host: &HostConfig) -> Result<()> {
    let Some((dir, locale)) = host.message_catalog() else {
        return Ok(());
    };
    let catalog = MessageCatalog::load(provider, &dir, &locale)?;
    if install_catalog(catalog).is_err() {
        warn!("A message catalog is already installed; keeping it");
    }
    Ok(())
}

fn open_blob_store(provider: &Arc<dyn StorageProvider>, host: &HostConfig) -> Arc<dyn BlobStore> {
    match host.blob_store_dir() {
        Some(dir) => {
            info!("Using local blob store at {:?}", dir);
            Arc::new(LocalBlobStore::new(Arc::clone(provider), dir))
        }
        None => InMemoryBlobStore::shared(),
    }
}

fn read_records(input: Option<&Path>) -> Result<Vec<Record>> {
    let text = match input {
        Some(path) => std::fs::read_to_string(path).map_err(|e| Error::io(e, "read_input", path.to_path_buf()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| Error::io(e, "read_stdin", PathBuf::from("-")))?;
            buffer
        }
    };
    serde_json::from_str(&text).map_err(|e| Error::Other(format!("Invalid record batch: {}", e)))
}
