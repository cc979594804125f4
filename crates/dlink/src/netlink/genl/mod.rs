//! Generic Netlink (GENL) support.
//!
//! Generic Netlink multiplexes many kernel families over one netlink
//! protocol. Each family gets a dynamic id (resolved through the control
//! family), its own command and attribute numbering, and named multicast
//! groups.
//!
//! # Example
//!
//! ```rust,no_run
//! use dlink::netlink::genl::GenlConnection;
//!
//! # async fn example() -> dlink::Result<()> {
//! let conn = GenlConnection::open("devlink", 1).await?;
//! println!("devlink family ID: {}", conn.family().id);
//! # Ok(())
//! # }
//! ```

mod connection;
mod family;
mod header;

pub use connection::GenlConnection;
pub use family::{FamilyInfo, resolve_family};
pub use header::{GENL_HDRLEN, GenlMsgHdr};

// Control family constants (fixed, not dynamically assigned)
pub const GENL_ID_CTRL: u16 = 0x10;

/// Control family commands
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrlCmd {
    Unspec = 0,
    NewFamily = 1,
    DelFamily = 2,
    GetFamily = 3,
}

/// Control family attributes
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrlAttr {
    Unspec = 0,
    FamilyId = 1,
    FamilyName = 2,
    Version = 3,
    HdrSize = 4,
    MaxAttr = 5,
    Ops = 6,
    McastGroups = 7,
}

/// Control family multicast group attributes
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrlAttrMcastGrp {
    Unspec = 0,
    Name = 1,
    Id = 2,
}
