//! Device name/index resolution.

use std::borrow::Cow;

use super::attrs::AttributeSet;
use super::{DevlinkAttr, DevlinkCmd};
use crate::netlink::error::{Error, Result};
use crate::netlink::genl::GenlConnection;
use crate::netlink::transport::Transport;

/// One device known at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub index: u32,
    pub name: String,
}

/// Device names and indexes, captured once per session.
///
/// Entries keep the order the kernel reported them in. The map is never
/// refreshed: devices added later resolve to `"<index N>"`.
#[derive(Debug, Clone, Default)]
pub struct IndexMap {
    entries: Vec<IndexEntry>,
}

impl IndexMap {
    /// Dump every device and record its index and name.
    ///
    /// Any reply that lacks either attribute, or fails validation, fails
    /// the whole build with [`Error::CacheBuild`].
    pub async fn build<T: Transport>(conn: &GenlConnection<T>) -> Result<Self> {
        let entries = conn
            .dump(
                DevlinkCmd::Get as u8,
                |_| {},
                |_hdr, data| {
                    let attrs = AttributeSet::parse(data)
                        .map_err(|e| Error::CacheBuild(e.to_string()))?;
                    let index = attrs.u32(DevlinkAttr::Index).ok_or_else(|| {
                        Error::CacheBuild("device reply without index".into())
                    })?;
                    let name = attrs.str(DevlinkAttr::Name).ok_or_else(|| {
                        Error::CacheBuild(format!("device {} reply without name", index))
                    })?;
                    Ok(IndexEntry {
                        index,
                        name: name.into_owned(),
                    })
                },
            )
            .await?;

        tracing::debug!(devices = entries.len(), "built index map");
        Ok(Self { entries })
    }

    /// Build a map from known entries.
    pub fn from_entries(entries: Vec<IndexEntry>) -> Self {
        Self { entries }
    }

    /// Index of the first device called `name`.
    pub fn index_by_name(&self, name: &str) -> Result<u32> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.index)
            .ok_or_else(|| Error::DeviceNotFound {
                name: name.to_string(),
            })
    }

    /// Name of the device with `index`, or `"<index N>"`.
    pub fn name_by_index(&self, index: u32) -> Cow<'_, str> {
        match self.entries.iter().find(|e| e.index == index) {
            Some(entry) => Cow::Borrowed(&entry.name),
            None => Cow::Owned(format!("<index {}>", index)),
        }
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
