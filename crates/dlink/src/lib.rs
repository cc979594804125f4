//! Async devlink client for Linux device management.
//!
//! This crate talks to the kernel's `devlink` Generic Netlink family. It
//! discovers registered devices, queries and renames them, manages their
//! ports (type changes, split, unsplit) and decodes the multicast event
//! stream the kernel emits when any of that changes.
//!
//! # Layers
//!
//! - [`netlink`] - socket, message framing, attribute encoding, Generic
//!   Netlink family resolution and the request/response exchange engine.
//! - [`devlink`] - devlink ABI constants, validated attribute sets, typed
//!   records, the device index cache and the monitor decoder.
//! - [`command`] - the `dl` command router (`dev`, `port`, `monitor`).
//! - [`output`] - text/JSON rendering of devlink records.
//!
//! # Example
//!
//! ```ignore
//! use dlink::devlink::Devlink;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> dlink::Result<()> {
//!     let dl = Devlink::open().await?;
//!
//!     for dev in dl.devices().await? {
//!         println!("{}: {}", dev.index, dev.name);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod devlink;
pub mod netlink;
pub mod output;

// Re-export common types at crate root for convenience
pub use devlink::Devlink;
pub use netlink::{Error, Result};
