//! Netlink protocol plumbing.
//!
//! Everything below the devlink family lives here: the socket, message
//! and attribute framing, the request builder, and the Generic Netlink
//! layer that resolves family ids and drives request/response exchanges.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Devlink (devlink family operations)     │
//! └────────────────┬────────────────────────┘
//!                  │
//! ┌────────────────▼────────────────────────┐
//! │ GenlConnection (exchange engine)        │
//! └────────────────┬────────────────────────┘
//!                  │
//! ┌────────────────▼────────────────────────┐
//! │ Transport (NetlinkSocket in production) │
//! └─────────────────────────────────────────┘
//! ```

pub mod attr;
pub(crate) mod builder;
pub(crate) mod error;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod genl;
pub mod message;
pub(crate) mod socket;
pub mod transport;

pub use attr::{AttrIter, NlAttr};
pub use builder::MessageBuilder;
pub use error::{Error, Result};
pub use message::{MessageIter, NLMSG_HDRLEN, NlMsgHdr, NlMsgType};
pub use socket::NetlinkSocket;
pub use transport::Transport;
