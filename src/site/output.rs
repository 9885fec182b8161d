// src/site/output.rs
// =============================================================================
// Writes generated files into the destination directory, and optionally
// mirrors each one into a zip archive as well.
//
// Files are addressed by (directory, name) relative to the destination, e.g.
// ("src/fmt", "print.go.html"). Each package owns its own directory, so
// writes never collide.
//
// The archive lives inside the destination, and its entries use the same
// relative paths as the files on disk. Unzipping it reproduces the site.
// =============================================================================

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Result, SiteError};

// The zip writer is blocking, but entries are small and written one at a
// time, so it runs inline on the runtime thread
struct Archive {
    path: PathBuf,
    writer: ZipWriter<File>,
}

pub struct OutputSink {
    root: PathBuf,
    archive: Option<Archive>,
    written: usize,
}

impl OutputSink {
    /// Creates the destination directory and, when `zip_name` is given,
    /// the archive file inside it.
    pub fn create(root: &Path, zip_name: Option<&str>) -> Result<Self> {
        std::fs::create_dir_all(root).map_err(|source| SiteError::Write {
            path: root.to_path_buf(),
            source,
        })?;

        let archive = match zip_name {
            Some(name) => {
                let path = root.join(name);
                let file = File::create(&path).map_err(|source| SiteError::Write {
                    path: path.clone(),
                    source,
                })?;
                Some(Archive {
                    path,
                    writer: ZipWriter::new(file),
                })
            }
            None => None,
        };

        Ok(Self {
            root: root.to_path_buf(),
            archive,
            written: 0,
        })
    }

    /// Number of files written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub async fn write(&mut self, dir: &str, name: &str, contents: &[u8]) -> Result<PathBuf> {
        let dir = dir.trim_matches('/');
        let target_dir = if dir.is_empty() {
            self.root.clone()
        } else {
            self.root.join(dir)
        };
        let target = target_dir.join(name);

        tokio::fs::create_dir_all(&target_dir)
            .await
            .map_err(|source| SiteError::Write {
                path: target_dir.clone(),
                source,
            })?;
        tokio::fs::write(&target, contents)
            .await
            .map_err(|source| SiteError::Write {
                path: target.clone(),
                source,
            })?;

        // Zip entry names always use forward slashes
        if let Some(archive) = &mut self.archive {
            let entry = if dir.is_empty() {
                name.to_string()
            } else {
                format!("{}/{}", dir, name)
            };
            let options =
                SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
            archive
                .writer
                .start_file(entry.as_str(), options)
                .map_err(|source| SiteError::Archive {
                    name: entry.clone(),
                    source,
                })?;
            archive
                .writer
                .write_all(contents)
                .map_err(|source| SiteError::Write {
                    path: archive.path.clone(),
                    source,
                })?;
        }

        debug!(path = %target.display(), bytes = contents.len(), "wrote file");
        self.written += 1;
        Ok(target)
    }

    /// Flushes the archive's central directory. Returns the archive path.
    pub fn finish(self) -> Result<Option<PathBuf>> {
        match self.archive {
            // finish() consumes the writer and writes the central directory
            Some(archive) => {
                archive.writer.finish().map_err(|source| SiteError::Archive {
                    name: archive.path.display().to_string(),
                    source,
                })?;
                Ok(Some(archive.path))
            }
            None => Ok(None),
        }
    }
}
