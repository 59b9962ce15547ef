use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::{IoContext, StoreError};

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes through a sibling `.tmp` file and renames it into place, so a
/// reader never observes a partially written file.
pub(crate) fn write_atomic(
    path: &Path,
    fill: impl FnOnce(&mut BufWriter<File>) -> Result<(), StoreError>,
) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).at(parent)?;
    }
    let tmp = tmp_path(path);
    {
        let file = File::create(&tmp).at(&tmp)?;
        let mut writer = BufWriter::new(file);
        fill(&mut writer)?;
        writer.flush().at(&tmp)?;
        let file = writer
            .into_inner()
            .map_err(|e| e.into_error())
            .at(&tmp)?;
        file.sync_all().at(&tmp)?;
    }
    fs::rename(&tmp, path).at(path)?;
    Ok(())
}

/// Writes directly to `path`.
pub(crate) fn write_direct(
    path: &Path,
    fill: impl FnOnce(&mut BufWriter<File>) -> Result<(), StoreError>,
) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).at(parent)?;
    }
    let file = File::create(path).at(path)?;
    let mut writer = BufWriter::new(file);
    fill(&mut writer)?;
    writer.flush().at(path)?;
    Ok(())
}

pub(crate) fn write_bincode<T: serde::Serialize>(
    w: &mut BufWriter<File>,
    path: &Path,
    value: &T,
) -> Result<(), StoreError> {
    bincode::serialize_into(w, value).map_err(|source| StoreError::Bincode {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn read_bincode<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let file = File::open(path).at(path)?;
    bincode::deserialize_from(std::io::BufReader::new(file)).map_err(|source| StoreError::Bincode {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn write_toml<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let text = toml::to_string(value)?;
    write_atomic(path, |w| w.write_all(text.as_bytes()).at(path))
}

pub(crate) fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let text = fs::read_to_string(path).at(path)?;
    toml::from_str(&text).map_err(|source| StoreError::TomlDe {
        path: path.to_path_buf(),
        source,
    })
}
