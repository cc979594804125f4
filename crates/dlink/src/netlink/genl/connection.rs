//! Request/response exchanges against one Generic Netlink family.

use super::family::{FamilyInfo, resolve_family};
use super::header::{GENL_HDRLEN, GenlMsgHdr};
use crate::netlink::builder::MessageBuilder;
use crate::netlink::error::{Error, Result};
use crate::netlink::message::{
    MessageIter, NLM_F_ACK, NLM_F_DUMP, NLM_F_REQUEST, NlMsgError, NlMsgType,
};
use crate::netlink::socket::NetlinkSocket;
use crate::netlink::transport::Transport;

/// Generic Netlink connection bound to a single resolved family.
///
/// Every request gets a fresh sequence number; replies carrying another
/// sequence number are dropped. A request built with
/// [`request`](Self::request) ends at the kernel's ACK, a
/// [`dump`](Self::dump) ends at `NLMSG_DONE`. Either way the decode
/// callback runs once per application message, and the first error it
/// returns aborts the exchange and discards everything decoded so far.
///
/// # Example
///
/// ```rust,no_run
/// use dlink::netlink::genl::GenlConnection;
/// use dlink::netlink::attr::AttrIter;
///
/// # async fn example() -> dlink::Result<()> {
/// let conn = GenlConnection::open("devlink", 1).await?;
/// let counts = conn
///     .dump(1, |_| {}, |_hdr, attrs| Ok(AttrIter::new(attrs).count()))
///     .await?;
/// println!("{} devices", counts.len());
/// # Ok(())
/// # }
/// ```
pub struct GenlConnection<T: Transport = NetlinkSocket> {
    transport: T,
    family: FamilyInfo,
    version: u8,
}

impl GenlConnection<NetlinkSocket> {
    /// Open a socket and resolve `name`.
    ///
    /// `version` is stamped into every request's GENL header.
    pub async fn open(name: &str, version: u8) -> Result<Self> {
        let socket = NetlinkSocket::new()?;
        let family = resolve_family(&socket, name).await?;
        Ok(Self::from_parts(socket, family, version))
    }
}

impl<T: Transport> GenlConnection<T> {
    /// Build a connection from a transport and an already resolved family.
    pub fn from_parts(transport: T, family: FamilyInfo, version: u8) -> Self {
        Self {
            transport,
            family,
            version,
        }
    }

    /// The resolved family.
    pub fn family(&self) -> &FamilyInfo {
        &self.family
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Subscribe to one of the family's multicast groups by name.
    pub fn join_group(&mut self, name: &str) -> Result<()> {
        let id = self.family.group(name).ok_or_else(|| Error::GroupNotFound {
            family: self.family.name.clone(),
            group: name.to_string(),
        })?;
        self.transport.add_membership(id)?;
        tracing::debug!(group = name, id, "joined multicast group");
        Ok(())
    }

    /// Start a request envelope for `cmd`.
    ///
    /// `NLM_F_REQUEST` is always set; `flags` adds to it.
    pub fn message(&self, cmd: u8, flags: u16) -> MessageBuilder {
        let mut builder = MessageBuilder::new(self.family.id, NLM_F_REQUEST | flags);
        builder.append(&GenlMsgHdr::new(cmd, self.version));
        builder
    }

    /// Send a single request and decode its reply, if the kernel sends one.
    ///
    /// Requests that only change state usually end with a bare ACK, in
    /// which case `Ok(None)` is returned.
    pub async fn request<R, B, D>(&self, cmd: u8, build: B, decode: D) -> Result<Option<R>>
    where
        B: FnOnce(&mut MessageBuilder),
        D: FnMut(&GenlMsgHdr, &[u8]) -> Result<R>,
    {
        let mut builder = self.message(cmd, NLM_F_ACK);
        build(&mut builder);
        Ok(self.exchange(builder, decode).await?.into_iter().next())
    }

    /// Send a dump request and decode every reply until end-of-dump.
    pub async fn dump<R, B, D>(&self, cmd: u8, build: B, decode: D) -> Result<Vec<R>>
    where
        B: FnOnce(&mut MessageBuilder),
        D: FnMut(&GenlMsgHdr, &[u8]) -> Result<R>,
    {
        let mut builder = self.message(cmd, NLM_F_ACK | NLM_F_DUMP);
        build(&mut builder);
        self.exchange(builder, decode).await
    }

    /// Send a prepared envelope and collect the decoded replies.
    pub async fn exchange<R, D>(&self, mut builder: MessageBuilder, mut decode: D) -> Result<Vec<R>>
    where
        D: FnMut(&GenlMsgHdr, &[u8]) -> Result<R>,
    {
        let seq = self.transport.next_seq();
        builder.set_seq(seq);
        builder.set_pid(self.transport.pid());
        let dump = builder.flags() & NLM_F_DUMP == NLM_F_DUMP;

        let msg = builder.finish()?;
        tracing::debug!(seq, dump, len = msg.len(), "sending request");
        self.transport.send(&msg).await?;

        let mut replies = Vec::new();
        self.receive(Some(seq), |hdr, attrs| {
            replies.push(decode(hdr, attrs)?);
            Ok(())
        })
        .await?;
        tracing::debug!(seq, replies = replies.len(), "exchange complete");

        Ok(replies)
    }

    /// Receive unsolicited messages forever.
    ///
    /// Only returns when the transport fails or `on_message` returns an
    /// error.
    pub async fn run<F>(&self, on_message: F) -> Result<()>
    where
        F: FnMut(&GenlMsgHdr, &[u8]) -> Result<()>,
    {
        self.receive(None, on_message).await
    }

    /// Receive loop shared by exchanges and multicast listening.
    ///
    /// With `Some(seq)` the loop ends at the matching ACK or `NLMSG_DONE`.
    /// With `None` control messages are skipped and the loop never ends on
    /// its own.
    async fn receive<F>(&self, seq: Option<u32>, mut on_message: F) -> Result<()>
    where
        F: FnMut(&GenlMsgHdr, &[u8]) -> Result<()>,
    {
        loop {
            let data = self.transport.recv_msg().await?;

            for result in MessageIter::new(&data) {
                let (header, payload) = result?;

                if let Some(seq) = seq {
                    if header.nlmsg_seq != seq {
                        tracing::trace!(
                            expected = seq,
                            got = header.nlmsg_seq,
                            "dropping stale message"
                        );
                        continue;
                    }
                }

                if header.is_error() {
                    let err = NlMsgError::from_bytes(payload)?;
                    if !err.is_ack() {
                        return Err(Error::from_errno(err.error));
                    }
                    if seq.is_some() {
                        return Ok(());
                    }
                    continue;
                }

                if header.is_done() {
                    // A failed dump reports its errno in the DONE payload
                    if let Some(bytes) = payload.get(..4) {
                        let code = i32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                        if code < 0 {
                            return Err(Error::from_errno(code));
                        }
                    }
                    if seq.is_some() {
                        return Ok(());
                    }
                    continue;
                }

                if header.nlmsg_type < NlMsgType::MIN_TYPE {
                    continue;
                }

                if header.nlmsg_type != self.family.id {
                    tracing::trace!(msg_type = header.nlmsg_type, "ignoring foreign message");
                    continue;
                }

                let genl = GenlMsgHdr::from_bytes(payload)
                    .ok_or_else(|| Error::InvalidMessage("GENL header too short".into()))?;
                let attrs = payload.get(GENL_HDRLEN..).unwrap_or_default();
                on_message(&genl, attrs)?;
            }
        }
    }
}
