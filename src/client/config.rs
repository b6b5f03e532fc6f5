use anyhow::{Context, Result, ensure};
use std::path::{Path, PathBuf};

/// Environment variable overriding the config location.
pub const CONFIG_ENV: &str = "CHUNKSTORE_CONF";

/// Config filename looked up under `$HOME` when the override is unset.
pub const CONFIG_FILENAME: &str = "chunkstore.conf";

/// Ordered storage-node membership. The position of an entry is its ring
/// position: reordering the file changes where existing data is found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterConfig {
    pub nodes: Vec<String>,
}

impl ClusterConfig {
    pub fn from_nodes(nodes: Vec<String>) -> Self {
        Self { nodes }
    }

    /// Number of storage nodes, which is also the chunk count per file.
    pub fn cluster_size(&self) -> usize {
        self.nodes.len()
    }

    /// `$CHUNKSTORE_CONF`, else `$HOME/chunkstore.conf`.
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        let home = std::env::var("HOME").context("HOME is not set and CHUNKSTORE_CONF is unset")?;
        Ok(Path::new(&home).join(CONFIG_FILENAME))
    }

    /// Parses the config file: one node per line. Lines may carry leading
    /// label tokens (`server dfs1 host:port`); only the trailing address is
    /// used. Blank lines and `#` comments are skipped.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read cluster config {}", path.display()))?;

        let mut nodes = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(address) = line.split_whitespace().next_back() {
                nodes.push(address.to_string());
            }
        }
        ensure!(
            !nodes.is_empty(),
            "cluster config {} lists no nodes",
            path.display()
        );
        Ok(Self { nodes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_historical_and_bare_formats() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# cluster layout").unwrap();
        writeln!(file, "server dfs1 127.0.0.1:10001").unwrap();
        writeln!(file, "server dfs2 127.0.0.1:10002").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "127.0.0.1:10003").unwrap();
        writeln!(file, "  server dfs4 127.0.0.1:10004  ").unwrap();

        let config = ClusterConfig::load(file.path()).unwrap();
        assert_eq!(
            config.nodes,
            vec![
                "127.0.0.1:10001",
                "127.0.0.1:10002",
                "127.0.0.1:10003",
                "127.0.0.1:10004",
            ]
        );
        assert_eq!(config.cluster_size(), 4);
    }

    #[test]
    fn test_load_rejects_empty_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# nothing but comments").unwrap();
        assert!(ClusterConfig::load(file.path()).is_err());
    }
}
