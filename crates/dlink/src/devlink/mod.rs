//! Devlink generic netlink family.
//!
//! Devlink exposes hardware devices that are not tied to a single network
//! interface (switch ASICs, multi-port NICs) together with their ports. The
//! family is resolved by name at startup; command and attribute ids are a
//! frozen, append-only ABI.
//!
//! # Example
//!
//! ```rust,no_run
//! use dlink::devlink::{Devlink, PortType};
//!
//! # async fn example() -> dlink::Result<()> {
//! let dl = Devlink::open().await?;
//!
//! for port in dl.ports().await? {
//!     println!("{}/{}", dl.index_map().name_by_index(port.index), port.port_index);
//! }
//!
//! let id = dl.resolve_port("swA", 3)?;
//! dl.set_port_type(id, PortType::Ib).await?;
//! # Ok(())
//! # }
//! ```

mod attrs;
mod connection;
mod index;
mod monitor;
mod types;

pub use attrs::{AttrPolicy, AttributeSet};
pub use connection::Devlink;
pub use index::{IndexEntry, IndexMap};
pub use monitor::{MonitorEvent, MonitorRecord, decode_event};
pub use types::{Device, HwMsg, Port, PortId};

use serde::{Serialize, Serializer};

/// Generic netlink family name.
pub const DEVLINK_GENL_NAME: &str = "devlink";
/// Family version stamped into requests.
pub const DEVLINK_GENL_VERSION: u8 = 1;
/// Multicast group for device and port changes.
pub const DEVLINK_MCGRP_CONFIG: &str = "config";
/// Multicast group for hardware message traces.
pub const DEVLINK_MCGRP_HWMSG: &str = "hwmsg";

/// Devlink commands.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevlinkCmd {
    Unspec = 0,
    Get = 1,
    Set = 2,
    New = 3,
    Del = 4,
    HwMsgNew = 5,
    PortGet = 6,
    PortSet = 7,
    PortNew = 8,
    PortDel = 9,
    PortSplit = 10,
    PortUnsplit = 11,
}

impl DevlinkCmd {
    /// Map a wire command id back to the enum.
    pub fn from_u8(cmd: u8) -> Option<Self> {
        Some(match cmd {
            0 => Self::Unspec,
            1 => Self::Get,
            2 => Self::Set,
            3 => Self::New,
            4 => Self::Del,
            5 => Self::HwMsgNew,
            6 => Self::PortGet,
            7 => Self::PortSet,
            8 => Self::PortNew,
            9 => Self::PortDel,
            10 => Self::PortSplit,
            11 => Self::PortUnsplit,
            _ => return None,
        })
    }

    /// Label used in monitor output.
    pub fn name(self) -> &'static str {
        match self {
            Self::Unspec => "unspec",
            Self::Get => "dev get",
            Self::Set => "dev set",
            Self::New => "dev new",
            Self::Del => "dev del",
            Self::HwMsgNew => "hwmsg",
            Self::PortGet => "port get",
            Self::PortSet => "port set",
            Self::PortNew => "port new",
            Self::PortDel => "port del",
            Self::PortSplit => "port split",
            Self::PortUnsplit => "port unsplit",
        }
    }
}

impl Serialize for DevlinkCmd {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Devlink attributes.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevlinkAttr {
    Unspec = 0,
    Index = 1,
    Name = 2,
    BusName = 3,
    DevName = 4,
    HwMsgPayload = 5,
    HwMsgType = 6,
    HwMsgDir = 7,
    PortIndex = 8,
    PortType = 9,
    PortDesiredType = 10,
    PortNetdevIfindex = 11,
    PortNetdevName = 12,
    PortIbdevName = 13,
    PortSplitCount = 14,
}

impl DevlinkAttr {
    /// Highest attribute id this client understands.
    pub const MAX: u16 = Self::PortSplitCount as u16;
}

/// Port type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortType {
    NotSet,
    Auto,
    Eth,
    Ib,
    /// A value this client has no name for.
    Unknown(u16),
}

impl PortType {
    pub fn from_raw(value: u16) -> Self {
        match value {
            0 => Self::NotSet,
            1 => Self::Auto,
            2 => Self::Eth,
            3 => Self::Ib,
            other => Self::Unknown(other),
        }
    }

    pub fn as_raw(self) -> u16 {
        match self {
            Self::NotSet => 0,
            Self::Auto => 1,
            Self::Eth => 2,
            Self::Ib => 3,
            Self::Unknown(other) => other,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::NotSet => "notset",
            Self::Auto => "auto",
            Self::Eth => "eth",
            Self::Ib => "ib",
            Self::Unknown(_) => "<unknown type>",
        }
    }
}

impl Serialize for PortType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl std::str::FromStr for PortType {
    type Err = crate::Error;

    /// Parse a settable port type. Matching is exact.
    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "auto" => Ok(Self::Auto),
            "eth" => Ok(Self::Eth),
            "ib" => Ok(Self::Ib),
            _ => Err(crate::Error::InvalidPortType(s.to_string())),
        }
    }
}

/// Hardware message type.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HwMsgType {
    MlxEmad = 0,
    MlxCmdReg = 1,
}

impl HwMsgType {
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::MlxEmad),
            1 => Some(Self::MlxCmdReg),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::MlxEmad => "mlx_emad",
            Self::MlxCmdReg => "mlx_cmd_reg",
        }
    }
}

/// Direction of a traced hardware message.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HwMsgDir {
    ToHw = 0,
    FromHw = 1,
}

impl HwMsgDir {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::ToHw),
            1 => Some(Self::FromHw),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ToHw => "to_hw",
            Self::FromHw => "from_hw",
        }
    }
}
