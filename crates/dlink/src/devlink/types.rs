//! Typed devlink records decoded from attribute tables.

use std::borrow::Cow;

use serde::Serialize;

use super::attrs::AttributeSet;
use super::{DevlinkAttr, HwMsgDir, HwMsgType, PortType};
use crate::netlink::error::{Error, Result};

/// A devlink device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    pub index: u32,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bus_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_name: Option<String>,
}

impl Device {
    /// Decode a device record; index and name are required.
    pub fn from_attrs(attrs: &AttributeSet<'_>) -> Result<Self> {
        Ok(Self {
            index: attrs.require_u32(DevlinkAttr::Index)?,
            name: attrs.require_str(DevlinkAttr::Name)?.into_owned(),
            bus_name: attrs.str(DevlinkAttr::BusName).map(Cow::into_owned),
            dev_name: attrs.str(DevlinkAttr::DevName).map(Cow::into_owned),
        })
    }
}

/// A port on a devlink device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Port {
    /// Owning device index.
    pub index: u32,
    pub port_index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_type: Option<PortType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_type: Option<PortType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub netdev_ifindex: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub netdev_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ibdev_name: Option<String>,
}

impl Port {
    /// Decode a port record; device index and port index are required.
    pub fn from_attrs(attrs: &AttributeSet<'_>) -> Result<Self> {
        Ok(Self {
            index: attrs.require_u32(DevlinkAttr::Index)?,
            port_index: attrs.require_u32(DevlinkAttr::PortIndex)?,
            port_type: attrs.u16(DevlinkAttr::PortType).map(PortType::from_raw),
            desired_type: attrs
                .u16(DevlinkAttr::PortDesiredType)
                .map(PortType::from_raw),
            netdev_ifindex: attrs.u32(DevlinkAttr::PortNetdevIfindex),
            netdev_name: attrs.str(DevlinkAttr::PortNetdevName).map(Cow::into_owned),
            ibdev_name: attrs.str(DevlinkAttr::PortIbdevName).map(Cow::into_owned),
        })
    }

    /// Desired type, only when it differs from the current type.
    pub fn pending_type(&self) -> Option<PortType> {
        match (self.port_type, self.desired_type) {
            (Some(current), Some(desired)) if current != desired => Some(desired),
            _ => None,
        }
    }
}

/// A traced message between the driver and the hardware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HwMsg {
    pub index: u32,
    #[serde(rename = "type")]
    pub kind: HwMsgType,
    pub dir: HwMsgDir,
    pub payload: Vec<u8>,
}

impl HwMsg {
    /// Decode a hardware message.
    ///
    /// Only `mlx_emad` messages are accepted, and the direction must be
    /// one of `to_hw` and `from_hw`.
    pub fn from_attrs(attrs: &AttributeSet<'_>) -> Result<Self> {
        let index = attrs.require_u32(DevlinkAttr::Index)?;
        let payload = attrs
            .bytes(DevlinkAttr::HwMsgPayload)
            .ok_or_else(|| Error::Decode("missing HwMsgPayload attribute".into()))?;

        let raw_type = attrs.require_u32(DevlinkAttr::HwMsgType)?;
        let kind = match HwMsgType::from_u32(raw_type) {
            Some(HwMsgType::MlxEmad) => HwMsgType::MlxEmad,
            _ => {
                return Err(Error::Decode(format!(
                    "unsupported hardware message type {}",
                    raw_type
                )));
            }
        };

        let raw_dir = attrs
            .u8(DevlinkAttr::HwMsgDir)
            .ok_or_else(|| Error::Decode("missing HwMsgDir attribute".into()))?;
        let dir = HwMsgDir::from_u8(raw_dir).ok_or_else(|| {
            Error::Decode(format!("invalid hardware message direction {}", raw_dir))
        })?;

        Ok(Self {
            index,
            kind,
            dir,
            payload: payload.to_vec(),
        })
    }
}

/// A port addressed by device index and port index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PortId {
    pub dev_index: u32,
    pub port_index: u32,
}

impl PortId {
    pub fn new(dev_index: u32, port_index: u32) -> Self {
        Self {
            dev_index,
            port_index,
        }
    }
}
