//! Module archiving: a directory tree streamed into a `.tar.gz`.
//!
//! Only regular files are stored, named relative to the module root.
//! Directories, symlinks and special files are skipped. Files are opened
//! one at a time and copied straight into the tar writer, which feeds the
//! gzip encoder.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use bytes::Bytes;
use flate2::write::GzEncoder;
use flate2::Compression;
use walkdir::WalkDir;

use crate::error::{RegistryError, Result};

/// Archive `root` into an in-memory `.tar.gz` buffer.
pub fn archive_module(root: &Path) -> Result<Bytes> {
    write_archive(root, Vec::new()).map(Bytes::from)
}

/// Stream the regular files under `root` into `writer` as a gzip'd tarball.
///
/// Returns the writer once the tar trailer and gzip footer are written.
/// An empty tree still yields a valid, empty archive. Any I/O error aborts
/// the whole archive; the partially written output must be discarded.
pub fn write_archive<W: Write>(root: &Path, writer: W) -> Result<W> {
    let meta = std::fs::metadata(root).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => RegistryError::ArchiveSourceNotFound {
            path: root.to_path_buf(),
        },
        _ => archive_err(root, e),
    })?;
    if !meta.is_dir() {
        return Err(archive_err(
            root,
            io::Error::new(io::ErrorKind::InvalidInput, "not a directory"),
        ));
    }

    let encoder = GzEncoder::new(writer, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    append_tree(&mut builder, root).map_err(|e| archive_err(root, e))?;

    let encoder = builder.into_inner().map_err(|e| archive_err(root, e))?;
    encoder.finish().map_err(|e| archive_err(root, e))
}

fn append_tree<W: Write>(builder: &mut tar::Builder<W>, root: &Path) -> io::Result<()> {
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

        let mut file = File::open(entry.path())?;
        builder.append_file(relative, &mut file)?;
    }
    Ok(())
}

fn archive_err(root: &Path, source: io::Error) -> RegistryError {
    RegistryError::Archive {
        path: root.to_path_buf(),
        source,
    }
}
