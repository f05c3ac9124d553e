//! Ledger persistence layer
//!
//! Provides save/load functionality for a deployed ledger and its
//! custody book.

use crate::ledger::{LedgerError, MultisigLedger};
use std::fs;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Corrupt ledger: {0}")]
    Corrupt(#[from] LedgerError),
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub ledger_file: String,
    pub backup_enabled: bool,
    pub max_backups: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".multisig_data"),
            ledger_file: "ledger.json".to_string(),
            backup_enabled: true,
            max_backups: 5,
        }
    }
}

/// Ledger storage manager
#[derive(Debug)]
pub struct Storage {
    config: StorageConfig,
}

impl Storage {
    /// Create a new storage manager
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self { config })
    }

    /// Create with default configuration
    pub fn with_defaults() -> Result<Self, StorageError> {
        Self::new(StorageConfig::default())
    }

    fn ledger_path(&self) -> PathBuf {
        self.config.data_dir.join(&self.config.ledger_file)
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        self.config
            .data_dir
            .join(format!("{}.backup.{}", self.config.ledger_file, index))
    }

    /// Save the ledger to disk
    pub fn save(&self, ledger: &MultisigLedger) -> Result<(), StorageError> {
        let path = self.ledger_path();

        if self.config.backup_enabled && self.config.max_backups > 0 && path.exists() {
            self.rotate_backups()?;
            fs::copy(&path, self.backup_path(0))?;
        }

        // Write to temporary file first
        let temp_path = self.config.data_dir.join("ledger.tmp");
        let file = fs::File::create(&temp_path)?;
        let writer = BufWriter::new(file);

        serde_json::to_writer_pretty(writer, ledger)?;

        // Atomic rename
        fs::rename(&temp_path, &path)?;

        log::debug!("Ledger saved to {:?}", path);
        Ok(())
    }

    /// Load the ledger from disk
    pub fn load(&self) -> Result<MultisigLedger, StorageError> {
        let path = self.ledger_path();

        if !path.exists() {
            return Err(StorageError::InvalidData(
                "Ledger file not found".to_string(),
            ));
        }

        load_from_file(&path)
    }

    /// Check if a saved ledger exists
    pub fn exists(&self) -> bool {
        self.ledger_path().exists()
    }

    /// Delete the saved ledger
    pub fn delete(&self) -> Result<(), StorageError> {
        let path = self.ledger_path();
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Rotate backup files
    fn rotate_backups(&self) -> Result<(), StorageError> {
        // Delete oldest backup
        let oldest = self.backup_path(self.config.max_backups - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        // Shift existing backups
        for i in (0..self.config.max_backups - 1).rev() {
            let current = self.backup_path(i);
            if current.exists() {
                fs::rename(&current, self.backup_path(i + 1))?;
            }
        }

        Ok(())
    }

    /// Restore from a backup
    pub fn restore_backup(&self, backup_index: usize) -> Result<MultisigLedger, StorageError> {
        let backup_path = self.backup_path(backup_index);

        if !backup_path.exists() {
            return Err(StorageError::InvalidData(format!(
                "Backup {} not found",
                backup_index
            )));
        }

        load_from_file(&backup_path)
    }

    /// List available backups
    pub fn list_backups(&self) -> Vec<usize> {
        (0..self.config.max_backups)
            .filter(|&i| self.backup_path(i).exists())
            .collect()
    }

    /// Get storage statistics
    pub fn stats(&self) -> Result<StorageStats, StorageError> {
        let path = self.ledger_path();

        let file_size = if path.exists() {
            fs::metadata(&path)?.len()
        } else {
            0
        };

        Ok(StorageStats {
            file_size,
            backup_count: self.list_backups().len(),
            data_dir: self.config.data_dir.clone(),
        })
    }
}

/// Storage statistics
#[derive(Debug)]
pub struct StorageStats {
    pub file_size: u64,
    pub backup_count: usize,
    pub data_dir: PathBuf,
}

/// Save a ledger to a specific file path
pub fn save_to_file(ledger: &MultisigLedger, path: &Path) -> Result<(), StorageError> {
    let file = fs::File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, ledger)?;
    Ok(())
}

/// Load a ledger from a specific file path, checking its invariants
pub fn load_from_file(path: &Path) -> Result<MultisigLedger, StorageError> {
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);
    let ledger: MultisigLedger = serde_json::from_reader(reader)?;
    ledger.verify_integrity()?;
    Ok(ledger)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::custody::Bank;
    use crate::ledger::LedgerConfig;

    fn sample_ledger() -> MultisigLedger {
        let config = LedgerConfig::new(
            vec!["owner1".to_string(), "owner2".to_string(), "owner3".to_string()],
            2,
            Some("Treasury".to_string()),
        )
        .unwrap();
        MultisigLedger::new(config, Bank::new()).unwrap()
    }

    fn temp_storage(temp_dir: &tempfile::TempDir, max_backups: usize) -> Storage {
        Storage::new(StorageConfig {
            data_dir: temp_dir.path().to_path_buf(),
            max_backups,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_save_load_ledger() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = temp_storage(&temp_dir, 5);

        let mut ledger = sample_ledger();
        ledger.deposit("owner1", 1_000).unwrap();
        ledger.propose("owner1", "receiver", 250, vec![0xab]).unwrap();
        ledger.confirm("owner2", 0).unwrap();

        assert!(!storage.exists());
        storage.save(&ledger).unwrap();
        assert!(storage.exists());

        let loaded = storage.load().unwrap();
        assert_eq!(loaded.address(), ledger.address());
        assert_eq!(loaded.threshold(), 2);
        assert_eq!(loaded.balance(), 1_000);
        assert_eq!(loaded.transaction_count(), 1);
        assert_eq!(loaded.transaction_info(0).unwrap().data, vec![0xab]);
        assert!(loaded.is_confirmed(0, "owner2").unwrap());
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = temp_storage(&temp_dir, 5);

        assert!(matches!(storage.load(), Err(StorageError::InvalidData(_))));
    }

    #[test]
    fn test_load_rejects_corrupt_ledger() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = temp_storage(&temp_dir, 5);
        storage.save(&sample_ledger()).unwrap();

        let path = temp_dir.path().join("ledger.json");
        let tampered = fs::read_to_string(&path)
            .unwrap()
            .replace("\"threshold\": 2", "\"threshold\": 7");
        fs::write(&path, tampered).unwrap();

        assert!(matches!(storage.load(), Err(StorageError::Corrupt(_))));
    }

    #[test]
    fn test_backup_rotation() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = temp_storage(&temp_dir, 3);
        let mut ledger = sample_ledger();

        for _ in 0..5 {
            storage.save(&ledger).unwrap();
            ledger.propose("owner1", "receiver", 1, vec![]).unwrap();
        }

        assert_eq!(storage.list_backups(), vec![0, 1, 2]);
        assert_eq!(storage.stats().unwrap().backup_count, 3);

        // Most recent backup holds the state before the last save
        let restored = storage.restore_backup(0).unwrap();
        assert_eq!(restored.transaction_count(), 3);
        assert!(storage.restore_backup(7).is_err());
    }

    #[test]
    fn test_delete() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = temp_storage(&temp_dir, 5);
        storage.save(&sample_ledger()).unwrap();

        storage.delete().unwrap();
        assert!(!storage.exists());
        assert_eq!(storage.stats().unwrap().file_size, 0);
    }

    #[test]
    fn test_file_helpers() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("export.json");
        let ledger = sample_ledger();

        save_to_file(&ledger, &path).unwrap();
        let loaded = load_from_file(&path).unwrap();
        assert_eq!(loaded.label(), Some("Treasury"));
    }
}
