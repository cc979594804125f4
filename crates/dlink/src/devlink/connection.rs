//! Devlink client: device, port and monitor operations.

use super::attrs::AttributeSet;
use super::index::IndexMap;
use super::monitor::{MonitorEvent, decode_event};
use super::types::{Device, Port, PortId};
use super::{
    DEVLINK_GENL_NAME, DEVLINK_GENL_VERSION, DEVLINK_MCGRP_CONFIG, DEVLINK_MCGRP_HWMSG,
    DevlinkAttr, DevlinkCmd, PortType,
};
use crate::netlink::builder::MessageBuilder;
use crate::netlink::error::Result;
use crate::netlink::genl::{GenlConnection, GenlMsgHdr};
use crate::netlink::socket::NetlinkSocket;
use crate::netlink::transport::Transport;

/// A devlink session.
///
/// Opening a session resolves the family and snapshots every device's name
/// and index into an [`IndexMap`]; names given to the methods below are
/// resolved through that snapshot.
///
/// # Example
///
/// ```rust,no_run
/// use dlink::Devlink;
///
/// # async fn example() -> dlink::Result<()> {
/// let dl = Devlink::open().await?;
///
/// let index = dl.resolve_device("swA")?;
/// if let Some(dev) = dl.device(index).await? {
///     println!("{}: bus {:?}", dev.name, dev.bus_name);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Devlink<T: Transport = NetlinkSocket> {
    conn: GenlConnection<T>,
    index: IndexMap,
}

impl Devlink<NetlinkSocket> {
    /// Connect to the kernel's devlink family and build the index map.
    pub async fn open() -> Result<Self> {
        let conn = GenlConnection::open(DEVLINK_GENL_NAME, DEVLINK_GENL_VERSION).await?;
        Self::from_connection(conn).await
    }
}

impl<T: Transport> Devlink<T> {
    /// Build a session over an existing connection.
    pub async fn from_connection(conn: GenlConnection<T>) -> Result<Self> {
        let index = IndexMap::build(&conn).await?;
        Ok(Self { conn, index })
    }

    /// The underlying generic netlink connection.
    pub fn connection(&self) -> &GenlConnection<T> {
        &self.conn
    }

    /// The name/index snapshot taken when the session was opened.
    pub fn index_map(&self) -> &IndexMap {
        &self.index
    }

    /// Resolve a device name to its index.
    pub fn resolve_device(&self, name: &str) -> Result<u32> {
        self.index.index_by_name(name)
    }

    /// Resolve a device name and port index.
    pub fn resolve_port(&self, dev: &str, port_index: u32) -> Result<PortId> {
        Ok(PortId::new(self.index.index_by_name(dev)?, port_index))
    }

    // =========================================================================
    // Devices
    // =========================================================================

    /// Dump every device.
    pub async fn devices(&self) -> Result<Vec<Device>> {
        self.conn
            .dump(DevlinkCmd::Get as u8, |_| {}, decode_device)
            .await
            .map_err(|e| e.with_context("dumping devices"))
    }

    /// Query a single device.
    pub async fn device(&self, index: u32) -> Result<Option<Device>> {
        self.conn
            .request(
                DevlinkCmd::Get as u8,
                |b| b.append_attr_u32(DevlinkAttr::Index as u16, index),
                decode_device,
            )
            .await
            .map_err(|e| e.with_context(format!("getting device {}", index)))
    }

    /// Change device settings; returns the device if the kernel echoes it.
    pub async fn set_device(&self, index: u32, name: Option<&str>) -> Result<Option<Device>> {
        self.conn
            .request(
                DevlinkCmd::Set as u8,
                |b| {
                    b.append_attr_u32(DevlinkAttr::Index as u16, index);
                    if let Some(name) = name {
                        b.append_attr_str(DevlinkAttr::Name as u16, name);
                    }
                },
                decode_device,
            )
            .await
            .map_err(|e| e.with_context(format!("setting device {}", index)))
    }

    // =========================================================================
    // Ports
    // =========================================================================

    /// Dump every port of every device.
    pub async fn ports(&self) -> Result<Vec<Port>> {
        self.conn
            .dump(DevlinkCmd::PortGet as u8, |_| {}, decode_port)
            .await
            .map_err(|e| e.with_context("dumping ports"))
    }

    /// Query a single port.
    pub async fn port(&self, id: PortId) -> Result<Option<Port>> {
        self.conn
            .request(
                DevlinkCmd::PortGet as u8,
                |b| put_port_id(b, id),
                decode_port,
            )
            .await
            .map_err(|e| e.with_context(format!("getting port {}", display_id(id))))
    }

    /// Change port settings. With `None` the request carries only the port id.
    pub async fn set_port(&self, id: PortId, port_type: Option<PortType>) -> Result<Option<Port>> {
        self.conn
            .request(
                DevlinkCmd::PortSet as u8,
                |b| {
                    put_port_id(b, id);
                    if let Some(port_type) = port_type {
                        b.append_attr_u16(DevlinkAttr::PortType as u16, port_type.as_raw());
                    }
                },
                decode_port,
            )
            .await
            .map_err(|e| e.with_context(format!("setting port {}", display_id(id))))
    }

    /// Set the port type.
    pub async fn set_port_type(&self, id: PortId, port_type: PortType) -> Result<Option<Port>> {
        self.set_port(id, Some(port_type)).await
    }

    /// Split a port into `count` ports.
    pub async fn split_port(&self, id: PortId, count: u32) -> Result<Option<Port>> {
        self.conn
            .request(
                DevlinkCmd::PortSplit as u8,
                |b| {
                    put_port_id(b, id);
                    b.append_attr_u32(DevlinkAttr::PortSplitCount as u16, count);
                },
                decode_port,
            )
            .await
            .map_err(|e| e.with_context(format!("splitting port {}", display_id(id))))
    }

    /// Undo a split.
    pub async fn unsplit_port(&self, id: PortId) -> Result<Option<Port>> {
        self.conn
            .request(
                DevlinkCmd::PortUnsplit as u8,
                |b| put_port_id(b, id),
                decode_port,
            )
            .await
            .map_err(|e| e.with_context(format!("unsplitting port {}", display_id(id))))
    }

    // =========================================================================
    // Monitor
    // =========================================================================

    /// Join the `config` and `hwmsg` groups and hand every event to `handler`.
    ///
    /// Runs until the transport fails, an event fails to decode, or
    /// `handler` returns an error. Commands without a monitored record are
    /// skipped.
    pub async fn monitor<F>(&mut self, mut handler: F) -> Result<()>
    where
        F: FnMut(MonitorEvent) -> Result<()>,
    {
        self.conn.join_group(DEVLINK_MCGRP_CONFIG)?;
        self.conn.join_group(DEVLINK_MCGRP_HWMSG)?;

        self.conn
            .run(|hdr, data| match decode_event(hdr.cmd, data)? {
                Some(event) => handler(event),
                None => Ok(()),
            })
            .await
    }
}

fn decode_device(_hdr: &GenlMsgHdr, data: &[u8]) -> Result<Device> {
    Device::from_attrs(&AttributeSet::parse(data)?)
}

fn decode_port(_hdr: &GenlMsgHdr, data: &[u8]) -> Result<Port> {
    Port::from_attrs(&AttributeSet::parse(data)?)
}

fn put_port_id(builder: &mut MessageBuilder, id: PortId) {
    builder.append_attr_u32(DevlinkAttr::Index as u16, id.dev_index);
    builder.append_attr_u32(DevlinkAttr::PortIndex as u16, id.port_index);
}

fn display_id(id: PortId) -> String {
    format!("{}/{}", id.dev_index, id.port_index)
}
