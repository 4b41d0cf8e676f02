//! Writes a `Container` to disk
//!
//! With the `hdf5` feature the tree is written as an HDF5 file which the engine reads directly.
//! Without it the tree is encoded with `bincode` and can be read back with `Container::read`.

use super::Container;
#[cfg(feature = "hdf5")]
use super::{Data, Group, Node};
use crate::error::ContainerError;
use std::path::Path;

/// Extension of the files written by `Container::write`
#[cfg(feature = "hdf5")]
pub const FILE_EXTENSION: &str = "h5";
#[cfg(not(feature = "hdf5"))]
pub const FILE_EXTENSION: &str = "bin";

/// True if the path names an HDF5 file
#[cfg(not(feature = "hdf5"))]
fn is_hdf5_path(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .map_or(false, |extension| {
            matches!(extension.to_ascii_lowercase().as_str(), "h5" | "hdf5")
        })
}

impl Container {
    /// Persist the container at `path`, replacing any existing file
    #[tracing::instrument(name = "Container writer", level = "info", skip(self, path))]
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), ContainerError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        write_tree(self, path)?;
        tracing::info!("Exported the configuration to {}", path.display());
        Ok(())
    }

    /// Read back a container written without the `hdf5` feature
    #[cfg(not(feature = "hdf5"))]
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ContainerError> {
        let reader = std::io::BufReader::new(std::fs::File::open(path)?);
        Ok(bincode::deserialize_from(reader)?)
    }
}

#[cfg(not(feature = "hdf5"))]
fn write_tree(container: &Container, path: &Path) -> Result<(), ContainerError> {
    if is_hdf5_path(path) {
        tracing::warn!(
            "{} is written as a bincode image, rebuild with the `hdf5` feature to produce a file the engine can read",
            path.display()
        );
    }
    let writer = std::io::BufWriter::new(std::fs::File::create(path)?);
    bincode::serialize_into(writer, container)?;
    Ok(())
}

#[cfg(feature = "hdf5")]
fn write_tree(container: &Container, path: &Path) -> Result<(), ContainerError> {
    let file = hdf5::File::create(path)?;
    write_group(&file, container)?;
    file.close()?;
    Ok(())
}

#[cfg(feature = "hdf5")]
fn write_group(target: &hdf5::Group, group: &Group) -> Result<(), ContainerError> {
    for member in group.members() {
        match member {
            Node::Group(child) => {
                let handle = target.create_group(child.name())?;
                write_group(&handle, child)?;
            }
            Node::Dataset(dataset) => {
                let builder = target.new_dataset_builder();
                let name = dataset.name();
                match dataset.data() {
                    Data::U32(x) => builder.with_data(x).create(name)?,
                    Data::I32(x) => builder.with_data(x).create(name)?,
                    Data::I64(x) => builder.with_data(x).create(name)?,
                    Data::F32(x) => builder.with_data(x).create(name)?,
                    Data::F64(x) => builder.with_data(x).create(name)?,
                    Data::C32(x) => builder.with_data(x).create(name)?,
                    Data::C64(x) => builder.with_data(x).create(name)?,
                };
            }
        }
    }
    Ok(())
}
