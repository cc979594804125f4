//! Transport seam between the exchange engine and the socket.
//!
//! [`GenlConnection`](super::genl::GenlConnection) only needs to send a
//! finished message, receive raw batches, number its requests and join
//! multicast groups. Keeping that behind a trait lets the engine, the
//! device cache and the monitor run against scripted replies in tests.
//! Closing is `Drop`.

use super::error::Result;

/// Minimal netlink transport contract.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Allocate the sequence number for the next request.
    fn next_seq(&self) -> u32;

    /// Local port id, stamped into outgoing requests.
    fn pid(&self) -> u32;

    /// Subscribe to a multicast group by numeric id.
    fn add_membership(&mut self, group: u32) -> Result<()>;

    /// Send one finished message.
    async fn send(&self, msg: &[u8]) -> Result<()>;

    /// Block until the next batch of messages arrives.
    async fn recv_msg(&self) -> Result<Vec<u8>>;
}
