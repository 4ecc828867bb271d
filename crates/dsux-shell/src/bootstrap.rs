//! Picks and opens the store a session runs against.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use dsux_core::config::registry::LOCAL_KIND;
use dsux_core::{Config, LocalStore, MemoryStore, Registry, RegistryEntry, Store};

use crate::cli::Cli;

/// Name given to the DSU created for an empty registry.
const DEFAULT_DSU_NAME: &str = "default";

/// Where the store comes from, in order of precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSource {
    Ephemeral,
    Directory(PathBuf),
    Registry { path: PathBuf, data_dir: PathBuf },
}

impl StoreSource {
    pub fn from_args(cli: &Cli, config: &Config) -> Self {
        if cli.ephemeral {
            Self::Ephemeral
        } else if let Some(dir) = &cli.store {
            Self::Directory(dir.clone())
        } else {
            Self::Registry {
                path: cli
                    .registry
                    .clone()
                    .unwrap_or_else(|| config.store.registry_path()),
                data_dir: config.store.data_dir(),
            }
        }
    }
}

/// An opened store plus anything the user should be told about it.
pub struct Opened {
    pub store: Arc<dyn Store>,
    pub notice: Option<String>,
}

pub async fn open(source: &StoreSource) -> anyhow::Result<Opened> {
    match source {
        StoreSource::Ephemeral => Ok(Opened {
            store: Arc::new(MemoryStore::new()),
            notice: None,
        }),
        StoreSource::Directory(dir) => {
            let store = LocalStore::open_or_create(dir)
                .await
                .with_context(|| format!("failed to open store at {}", dir.display()))?;
            Ok(Opened {
                store: Arc::new(store),
                notice: None,
            })
        }
        StoreSource::Registry { path, data_dir } => open_from_registry(path, data_dir).await,
    }
}

/// Opens the first registered DSU, or creates and registers a default one.
async fn open_from_registry(registry_path: &Path, data_dir: &Path) -> anyhow::Result<Opened> {
    let registry = Registry::load(registry_path)
        .with_context(|| format!("failed to load registry {}", registry_path.display()))?;

    if let Some(entry) = registry.first() {
        if entry.kind != LOCAL_KIND {
            bail!("DSU {} has unsupported type {:?}", entry.key, entry.kind);
        }
        let Some(location) = &entry.location else {
            bail!("DSU {} has no location", entry.key);
        };
        tracing::info!("opening DSU {} ({})", entry.name, entry.key);
        let store = LocalStore::open(location)
            .await
            .with_context(|| format!("failed to open DSU {} at {}", entry.key, location.display()))?;
        return Ok(Opened {
            store: Arc::new(store),
            notice: None,
        });
    }

    let entry = RegistryEntry::new_local(DEFAULT_DSU_NAME, data_dir);
    let location = data_dir.join(DEFAULT_DSU_NAME);
    let store = LocalStore::open_or_create(&location)
        .await
        .with_context(|| format!("failed to create DSU at {}", location.display()))?;
    registry
        .with_entry(entry.clone())
        .save(registry_path)
        .with_context(|| format!("failed to save registry {}", registry_path.display()))?;
    tracing::info!("registered new DSU {}", entry.key);

    Ok(Opened {
        store: Arc::new(store),
        notice: Some(format!("Created DSU with key: {}", entry.key)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use dsux_core::DsuPath;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("dsux").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn ephemeral_takes_precedence() {
        let source = StoreSource::from_args(&cli(&["--ephemeral", "--store", "/s"]), &Config::default());
        assert_eq!(source, StoreSource::Ephemeral);
    }

    #[test]
    fn store_dir_beats_registry() {
        let source = StoreSource::from_args(
            &cli(&["--store", "/s", "--registry", "/r.json"]),
            &Config::default(),
        );
        assert_eq!(source, StoreSource::Directory(PathBuf::from("/s")));
    }

    #[test]
    fn registry_path_from_flag_or_config() {
        let mut config = Config::default();
        config.store.registry_path = Some(PathBuf::from("/cfg/r.json"));
        config.store.data_dir = Some(PathBuf::from("/cfg/data"));

        assert_eq!(
            StoreSource::from_args(&cli(&[]), &config),
            StoreSource::Registry {
                path: PathBuf::from("/cfg/r.json"),
                data_dir: PathBuf::from("/cfg/data"),
            }
        );
        assert_eq!(
            StoreSource::from_args(&cli(&["--registry", "/flag.json"]), &config),
            StoreSource::Registry {
                path: PathBuf::from("/flag.json"),
                data_dir: PathBuf::from("/cfg/data"),
            }
        );
    }

    #[tokio::test]
    async fn empty_registry_creates_and_records_default_dsu() {
        let tmp = TempDir::new().unwrap();
        let registry_path = tmp.path().join("dsu_s.json");
        let source = StoreSource::Registry {
            path: registry_path.clone(),
            data_dir: tmp.path().join("data"),
        };

        let opened = open(&source).await.unwrap();

        let registry = Registry::load(&registry_path).unwrap();
        let entry = registry.first().unwrap();
        assert_eq!(
            opened.notice.as_deref(),
            Some(format!("Created DSU with key: {}", entry.key).as_str())
        );
        assert_eq!(entry.location, Some(tmp.path().join("data").join("default")));
        assert!(tmp.path().join("data/default/manifest.json").exists());
    }

    #[tokio::test]
    async fn existing_registry_entry_is_reopened() {
        let tmp = TempDir::new().unwrap();
        let source = StoreSource::Registry {
            path: tmp.path().join("dsu_s.json"),
            data_dir: tmp.path().join("data"),
        };
        let first = open(&source).await.unwrap();
        first
            .store
            .write_file(&DsuPath::new("/kept").unwrap(), b"data")
            .await
            .unwrap();

        let second = open(&source).await.unwrap();

        assert!(second.notice.is_none());
        let content = second
            .store
            .read_file(&DsuPath::new("/kept").unwrap())
            .await
            .unwrap();
        assert_eq!(content, b"data");
        assert_eq!(Registry::load(&tmp.path().join("dsu_s.json")).unwrap().dsus.len(), 1);
    }

    #[tokio::test]
    async fn unsupported_registry_type_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("dsu_s.json");
        std::fs::write(
            &path,
            r#"{"dsus":[{"key":"k","name":"n","type":"remote","location":"/x"}]}"#,
        )
        .unwrap();
        let source = StoreSource::Registry {
            path,
            data_dir: tmp.path().to_path_buf(),
        };

        let err = open(&source).await.err().unwrap();

        assert!(err.to_string().contains("unsupported type"));
    }

    #[tokio::test]
    async fn store_directory_is_created() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("store");

        let opened = open(&StoreSource::Directory(dir.clone())).await.unwrap();

        assert!(opened.notice.is_none());
        assert!(dir.join("manifest.json").exists());
    }

    #[tokio::test]
    async fn ephemeral_store_is_memory() {
        let opened = open(&StoreSource::Ephemeral).await.unwrap();
        assert_eq!(opened.store.label(), "memory (ephemeral)");
    }
}
