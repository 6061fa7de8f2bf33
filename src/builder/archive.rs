//! Zip packing of staged downloads

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::BuildError;

/// Pack the staged files into a zip archive at `zip_path`, in entry
/// order. Returns the number of entries actually added.
///
/// A staged file that cannot be opened or copied is skipped, not
/// fatal — unlike the download stage, partial loss at this point is
/// tolerated. The caller decides what an empty archive means.
pub fn pack_zip(zip_path: &Path, entries: &[(String, PathBuf)]) -> Result<usize, BuildError> {
    let file = File::create(zip_path)?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut added = 0;
    for (name, path) in entries {
        let mut input = match File::open(path) {
            Ok(input) => input,
            Err(error) => {
                warn!(name = %name, path = %path.display(), %error, "Skipping staged file: open failed");
                continue;
            }
        };

        if let Err(error) = writer.start_file(name.as_str(), options) {
            warn!(name = %name, %error, "Skipping staged file: zip entry failed");
            continue;
        }

        if let Err(error) = io::copy(&mut input, &mut writer) {
            warn!(name = %name, %error, "Skipping staged file: copy failed");
            continue;
        }

        added += 1;
    }

    writer.finish()?;
    Ok(added)
}
