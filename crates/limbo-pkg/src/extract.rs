//! Package extraction.
//!
//! For each entry: resolve the name, detect `.d` containers, check the
//! destination, read the payload window, inflate if needed and write.
//! Decompression failures fall back to the raw payload under the
//! original name; only index and output I/O errors abort a run.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::decompress;
use crate::entry::Entry;
use crate::package::PackageFile;
use crate::resolve::{self, ProjectContext};
use crate::source::ByteSource;
use crate::{Error, Result};

/// Extraction settings.
#[derive(Clone)]
pub struct ExtractOptions {
    /// Replace files that already exist.
    pub overwrite_existing: bool,
    /// Write entries without a known name under `__UNKNOWN`.
    pub extract_unknowns: bool,
    /// Log an `[index/total] name` line per written entry.
    pub verbose: bool,
    pub on_progress: Option<Arc<dyn Fn(&Progress<'_>) + Send + Sync>>,
    /// Checked between entries; set it to stop the run.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl std::fmt::Debug for ExtractOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractOptions")
            .field("overwrite_existing", &self.overwrite_existing)
            .field("extract_unknowns", &self.extract_unknowns)
            .field("verbose", &self.verbose)
            .field("on_progress", &self.on_progress.is_some())
            .field("cancel", &self.cancel)
            .finish()
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            overwrite_existing: false,
            extract_unknowns: true,
            verbose: false,
            on_progress: None,
            cancel: None,
        }
    }
}

impl ExtractOptions {
    pub fn overwrite_existing(mut self, overwrite: bool) -> Self {
        self.overwrite_existing = overwrite;
        self
    }

    pub fn extract_unknowns(mut self, extract: bool) -> Self {
        self.extract_unknowns = extract;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn on_progress(mut self, callback: Arc<dyn Fn(&Progress<'_>) + Send + Sync>) -> Self {
        self.on_progress = Some(callback);
        self
    }

    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// How a written entry's payload was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Stored bytes written as-is.
    Raw,
    /// Container inflated, suffix stripped.
    Decompressed,
    /// Container failed to inflate; raw bytes kept under the suffixed name.
    FallbackRaw,
}

/// Result of processing one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// No known name and unknowns are disabled.
    SkippedUnknown,
    /// Destination exists and overwriting is disabled.
    SkippedExists(PathBuf),
    /// Payload window lies outside the package.
    Unreadable,
    /// Name would resolve outside the output root.
    Rejected,
    Written { path: PathBuf, mode: WriteMode },
}

/// Progress notification, sent after every entry.
#[derive(Debug)]
pub struct Progress<'a> {
    /// 1-based position in the index.
    pub index: usize,
    pub total: usize,
    pub entry: &'a Entry,
    /// Output name relative to the root, if one was assigned.
    pub name: Option<&'a str>,
    pub outcome: &'a EntryOutcome,
}

/// Counters for a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractReport {
    pub written: usize,
    pub decompressed: usize,
    pub fallbacks: usize,
    pub skipped_unknown: usize,
    pub skipped_existing: usize,
    pub unreadable: usize,
    pub rejected: usize,
    pub cancelled: bool,
}

impl ExtractReport {
    fn record(&mut self, outcome: &EntryOutcome) {
        match outcome {
            EntryOutcome::SkippedUnknown => self.skipped_unknown += 1,
            EntryOutcome::SkippedExists(_) => self.skipped_existing += 1,
            EntryOutcome::Unreadable => self.unreadable += 1,
            EntryOutcome::Rejected => self.rejected += 1,
            EntryOutcome::Written { mode, .. } => {
                self.written += 1;
                match mode {
                    WriteMode::Raw => {}
                    WriteMode::Decompressed => self.decompressed += 1,
                    WriteMode::FallbackRaw => self.fallbacks += 1,
                }
            }
        }
    }
}

/// Extracts the entries of one package.
pub struct Extractor<'a, S: ByteSource + ?Sized> {
    source: &'a S,
    package: PackageFile,
    context: &'a ProjectContext,
}

impl<'a, S: ByteSource + ?Sized> Extractor<'a, S> {
    /// Parse the package index from `source`.
    ///
    /// Fails with [`Error::Format`] if the index does not fit.
    pub fn new(source: &'a S, context: &'a ProjectContext) -> Result<Self> {
        let package = PackageFile::parse_source(source)?;
        Ok(Self::with_package(source, package, context))
    }

    /// Use an already parsed index.
    pub fn with_package(source: &'a S, package: PackageFile, context: &'a ProjectContext) -> Self {
        Self {
            source,
            package,
            context,
        }
    }

    #[inline]
    pub fn package(&self) -> &PackageFile {
        &self.package
    }

    /// Start of the payload region.
    #[inline]
    pub fn base_offset(&self) -> u64 {
        self.package.base_offset()
    }

    /// Read an entry's stored payload.
    pub fn read_payload(&self, entry: &Entry) -> Result<Cow<'a, [u8]>> {
        self.source
            .read_at(self.base_offset() + entry.offset as u64, entry.size as u64)
    }

    /// Extract every entry into `output_root`.
    pub fn extract(&self, output_root: &Path, options: &ExtractOptions) -> Result<ExtractReport> {
        let total = self.package.len();
        let mut report = ExtractReport::default();

        for (i, entry) in self.package.iter().enumerate() {
            if options.is_cancelled() {
                log::info!("extraction cancelled after {} of {} entries", i, total);
                report.cancelled = true;
                break;
            }

            let index = i + 1;
            let (name, outcome) = self.extract_entry(entry, output_root, options)?;

            if options.verbose {
                if let (Some(name), EntryOutcome::Written { .. }) = (&name, &outcome) {
                    log::info!("{}", progress_line(index, total, name));
                }
            }

            if let Some(callback) = &options.on_progress {
                callback(&Progress {
                    index,
                    total,
                    entry,
                    name: name.as_deref(),
                    outcome: &outcome,
                });
            }

            report.record(&outcome);
        }

        Ok(report)
    }

    /// Process a single entry.
    ///
    /// Returns the output name used (if any) and what happened.
    pub fn extract_entry(
        &self,
        entry: &Entry,
        output_root: &Path,
        options: &ExtractOptions,
    ) -> Result<(Option<String>, EntryOutcome)> {
        let name = match self.context.resolve(entry.name_hash) {
            Some(name) => name,
            None if !options.extract_unknowns => {
                log::debug!("skipping unknown entry {:08X}", entry.name_hash);
                return Ok((None, EntryOutcome::SkippedUnknown));
            }
            None => resolve::unknown_name(entry.name_hash),
        };

        if !resolve::is_contained(&name) {
            log::warn!("refusing to extract '{}' outside the output directory", name);
            return Ok((Some(name), EntryOutcome::Rejected));
        }

        let stem = resolve::container_stem(&name);

        // Check before reading so existing files cost no decompression.
        let path = output_root.join(stem.unwrap_or(&name));
        if !options.overwrite_existing && path.exists() {
            log::debug!("skipping existing {}", path.display());
            let name = stem.unwrap_or(&name).to_string();
            return Ok((Some(name), EntryOutcome::SkippedExists(path)));
        }

        let raw = match self.read_payload(entry) {
            Ok(raw) => raw,
            Err(e @ Error::EntryOutOfBounds { .. }) => {
                log::warn!("cannot read '{}': {}", name, e);
                return Ok((Some(name), EntryOutcome::Unreadable));
            }
            Err(e) => return Err(e),
        };

        let Some(stem) = stem else {
            write_file(&path, &raw)?;
            return Ok((
                Some(name),
                EntryOutcome::Written {
                    path,
                    mode: WriteMode::Raw,
                },
            ));
        };

        match decompress::inflate_zlib(&raw) {
            Ok(data) => {
                write_file(&path, &data)?;
                Ok((
                    Some(stem.to_string()),
                    EntryOutcome::Written {
                        path,
                        mode: WriteMode::Decompressed,
                    },
                ))
            }
            Err(e) => {
                log::warn!("failed to decompress '{}' so it'll be left alone: {}", name, e);

                let path = output_root.join(&name);
                if !options.overwrite_existing && path.exists() {
                    return Ok((Some(name), EntryOutcome::SkippedExists(path)));
                }

                write_file(&path, &raw)?;
                Ok((
                    Some(name),
                    EntryOutcome::Written {
                        path,
                        mode: WriteMode::FallbackRaw,
                    },
                ))
            }
        }
    }
}

/// Verbose progress line for a written entry.
fn progress_line(index: usize, total: usize, name: &str) -> String {
    format!("[{}/{}] {}", index, total, name)
}

/// Write a file, creating missing parent directories.
fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, data)
    };

    write().map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}
