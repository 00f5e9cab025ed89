use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::InputError;

use super::target::{ParsedTargets, Target, parse_target_lines};

const TARGET_FILE_EXTENSION: &str = ".txt";

/// Line-oriented `<url> <count>` files kept in one directory.
#[derive(Debug, Clone)]
pub struct TargetStore {
    dir: PathBuf,
}

impl TargetStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Resolves a file name inside the store, appending `.txt` when missing.
    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        if name.ends_with(TARGET_FILE_EXTENSION) {
            self.dir.join(name)
        } else {
            self.dir.join(format!("{}{}", name, TARGET_FILE_EXTENSION))
        }
    }

    /// Creates an empty target file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file already exists or cannot be created.
    pub fn create(&self, name: &str) -> Result<PathBuf, InputError> {
        let path = self.path_for(name);
        self.ensure_dir(&path)?;
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => Ok(path),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                Err(InputError::TargetFileExists { path })
            }
            Err(err) => Err(InputError::TargetFileIo { path, source: err }),
        }
    }

    /// Appends a target line, creating the file when needed.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or written.
    pub fn add(&self, name: &str, target: &Target) -> Result<PathBuf, InputError> {
        let path = self.path_for(name);
        self.ensure_dir(&path)?;
        let needs_newline = match fs::read(&path) {
            Ok(existing) => existing.last().is_some_and(|byte| *byte != b'\n'),
            Err(err) if err.kind() == ErrorKind::NotFound => false,
            Err(err) => return Err(InputError::TargetFileIo { path, source: err }),
        };

        let mut line = String::new();
        if needs_newline {
            line.push('\n');
        }
        line.push_str(target.url());
        line.push(' ');
        line.push_str(&target.repeat_count().to_string());
        line.push('\n');

        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .and_then(|mut file| file.write_all(line.as_bytes()));
        match result {
            Ok(()) => Ok(path),
            Err(err) => Err(InputError::TargetFileIo { path, source: err }),
        }
    }

    /// Deletes a target file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file does not exist or cannot be removed.
    pub fn remove(&self, name: &str) -> Result<PathBuf, InputError> {
        let path = self.path_for(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(path),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(InputError::TargetFileMissing { path })
            }
            Err(err) => Err(InputError::TargetFileIo { path, source: err }),
        }
    }

    /// Reads and parses a target file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file does not exist or cannot be read.
    /// Malformed lines are not errors here; they are returned in
    /// [`ParsedTargets::errors`].
    pub fn load(&self, name: &str) -> Result<(PathBuf, ParsedTargets), InputError> {
        let path = self.path_for(name);
        match fs::read_to_string(&path) {
            Ok(content) => {
                let parsed = parse_target_lines(&content);
                Ok((path, parsed))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(InputError::TargetFileMissing { path })
            }
            Err(err) => Err(InputError::TargetFileIo { path, source: err }),
        }
    }

    fn ensure_dir(&self, path: &Path) -> Result<(), InputError> {
        fs::create_dir_all(&self.dir).map_err(|err| InputError::TargetFileIo {
            path: path.to_path_buf(),
            source: err,
        })
    }
}
