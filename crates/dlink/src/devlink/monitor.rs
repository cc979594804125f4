//! Decoding of unsolicited devlink notifications.

use serde::Serialize;

use super::DevlinkCmd;
use super::attrs::AttributeSet;
use super::types::{Device, HwMsg, Port};
use crate::netlink::error::Result;

/// Record carried by a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorRecord {
    Device(Device),
    Port(Port),
    HwMsg(HwMsg),
}

/// A decoded notification, tagged with the command that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonitorEvent {
    #[serde(rename = "command")]
    pub cmd: DevlinkCmd,
    #[serde(flatten)]
    pub record: MonitorRecord,
}

/// Decode one notification.
///
/// Returns `Ok(None)` for commands that carry no monitored record. A
/// message that fails validation, lacks a required attribute or carries an
/// unsupported hardware message is a decode error.
pub fn decode_event(cmd: u8, data: &[u8]) -> Result<Option<MonitorEvent>> {
    let Some(cmd) = DevlinkCmd::from_u8(cmd) else {
        tracing::trace!(cmd, "skipping unknown devlink command");
        return Ok(None);
    };

    let record = match cmd {
        DevlinkCmd::Get | DevlinkCmd::Set | DevlinkCmd::New | DevlinkCmd::Del => {
            MonitorRecord::Device(Device::from_attrs(&AttributeSet::parse(data)?)?)
        }
        DevlinkCmd::HwMsgNew => {
            MonitorRecord::HwMsg(HwMsg::from_attrs(&AttributeSet::parse(data)?)?)
        }
        DevlinkCmd::PortGet | DevlinkCmd::PortSet | DevlinkCmd::PortNew | DevlinkCmd::PortDel => {
            MonitorRecord::Port(Port::from_attrs(&AttributeSet::parse(data)?)?)
        }
        DevlinkCmd::Unspec | DevlinkCmd::PortSplit | DevlinkCmd::PortUnsplit => {
            tracing::trace!(cmd = cmd.name(), "skipping devlink command");
            return Ok(None);
        }
    };

    Ok(Some(MonitorEvent { cmd, record }))
}
