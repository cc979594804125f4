//! Scripted transport and reply builders for tests.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use super::attr::{NLA_F_NESTED, NlAttr, nla_align};
use super::builder::MessageBuilder;
use super::error::Result;
use super::genl::{CtrlAttr, CtrlAttrMcastGrp, CtrlCmd, FamilyInfo, GENL_ID_CTRL, GenlMsgHdr};
use super::message::{NLM_F_MULTI, NLM_F_REQUEST, NlMsgHdr, NlMsgType};
use super::transport::Transport;
use crate::devlink::{DevlinkAttr, PortType};

/// Family id the fixtures pretend the kernel assigned to devlink.
pub(crate) const FAMILY_ID: u16 = 0x1a;

/// Sequence number the mock never hands out.
const STALE_SEQ: u32 = 0xffff_fff0;

/// In-memory [`Transport`].
///
/// Each [`expect`](Self::expect) call scripts the replies to one request.
/// On `send` the next script is stamped with the request's sequence number
/// and queued as one receive batch. Once no replies are pending, queued
/// [`event`](Self::event)s are delivered one batch each, and after that
/// `recv_msg` fails with `UnexpectedEof`.
#[derive(Default)]
pub(crate) struct MockTransport {
    script: Mutex<VecDeque<Vec<Vec<u8>>>>,
    pending: Mutex<VecDeque<Vec<u8>>>,
    events: Mutex<VecDeque<Vec<u8>>>,
    sent: Mutex<Vec<Vec<u8>>>,
    groups: Vec<u32>,
    seq: AtomicU32,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self {
            seq: AtomicU32::new(1),
            ..Default::default()
        }
    }

    /// Script the replies to the next request.
    pub(crate) fn expect(&self, replies: Vec<Vec<u8>>) {
        self.script.lock().unwrap().push_back(replies);
    }

    /// Queue one unsolicited message.
    pub(crate) fn event(&self, msg: Vec<u8>) {
        self.events.lock().unwrap().push_back(msg);
    }

    /// Every request sent so far.
    pub(crate) fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().unwrap().clone()
    }

    /// Multicast groups joined so far.
    pub(crate) fn groups(&self) -> Vec<u32> {
        self.groups.clone()
    }
}

impl Transport for MockTransport {
    fn next_seq(&self) -> u32 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    fn pid(&self) -> u32 {
        4242
    }

    fn add_membership(&mut self, group: u32) -> Result<()> {
        self.groups.push(group);
        Ok(())
    }

    async fn send(&self, msg: &[u8]) -> Result<()> {
        let replies = self.script.lock().unwrap().pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::BrokenPipe, "no reply scripted for request")
        })?;
        self.sent.lock().unwrap().push(msg.to_vec());

        let seq = NlMsgHdr::from_bytes(msg)?.nlmsg_seq;
        let mut batch = Vec::new();
        for mut reply in replies {
            if reply[8..12] != STALE_SEQ.to_ne_bytes() {
                reply[8..12].copy_from_slice(&seq.to_ne_bytes());
            }
            batch.extend(reply);
        }
        self.pending.lock().unwrap().push_back(batch);
        Ok(())
    }

    async fn recv_msg(&self) -> Result<Vec<u8>> {
        if let Some(batch) = self.pending.lock().unwrap().pop_front() {
            return Ok(batch);
        }
        if let Some(event) = self.events.lock().unwrap().pop_front() {
            return Ok(event);
        }
        Err(io::Error::new(io::ErrorKind::UnexpectedEof, "no more scripted messages").into())
    }
}

/// Raw attribute bytes, padded.
pub(crate) fn attr_bytes(kind: u16, payload: &[u8]) -> Vec<u8> {
    let mut buf = NlAttr::new(kind, payload.len()).as_bytes().to_vec();
    buf.extend_from_slice(payload);
    buf.resize(nla_align(buf.len()), 0);
    buf
}

/// A devlink message with command `cmd`.
pub(crate) fn genl_message(cmd: u8, build: impl FnOnce(&mut MessageBuilder)) -> Vec<u8> {
    let mut builder = MessageBuilder::new(FAMILY_ID, NLM_F_MULTI);
    builder.append(&GenlMsgHdr::new(cmd, 1));
    build(&mut builder);
    builder.finish().unwrap()
}

/// `NLMSG_ERROR` carrying `errno` (0 for an ACK).
pub(crate) fn error_message(errno: i32) -> Vec<u8> {
    let mut builder = MessageBuilder::new(NlMsgType::ERROR, 0);
    builder.append_bytes(&errno.to_ne_bytes());
    builder.append(&NlMsgHdr::new(FAMILY_ID, NLM_F_REQUEST));
    builder.finish().unwrap()
}

pub(crate) fn ack_message() -> Vec<u8> {
    error_message(0)
}

pub(crate) fn done_message() -> Vec<u8> {
    let mut builder = MessageBuilder::new(NlMsgType::DONE, NLM_F_MULTI);
    builder.append_bytes(&0i32.to_ne_bytes());
    builder.finish().unwrap()
}

/// Mark a reply so the mock leaves its sequence number alone.
pub(crate) fn stale(mut msg: Vec<u8>) -> Vec<u8> {
    msg[8..12].copy_from_slice(&STALE_SEQ.to_ne_bytes());
    msg
}

/// `CTRL_CMD_NEWFAMILY` reply as sent for a GETFAMILY request.
pub(crate) fn ctrl_family_reply(name: &str, id: u16, groups: &[(&str, u32)]) -> Vec<u8> {
    let mut builder = MessageBuilder::new(GENL_ID_CTRL, 0);
    builder.append(&GenlMsgHdr::new(CtrlCmd::NewFamily as u8, 2));
    builder.append_attr_u16(CtrlAttr::FamilyId as u16, id);
    builder.append_attr_str(CtrlAttr::FamilyName as u16, name);
    builder.append_attr_u32(CtrlAttr::Version as u16, 1);
    builder.append_attr_u32(CtrlAttr::MaxAttr as u16, DevlinkAttr::MAX as u32);

    let mut nest = Vec::new();
    for (i, (group, group_id)) in groups.iter().enumerate() {
        let mut inner = Vec::new();
        let mut group_name = group.as_bytes().to_vec();
        group_name.push(0);
        inner.extend(attr_bytes(CtrlAttrMcastGrp::Name as u16, &group_name));
        inner.extend(attr_bytes(CtrlAttrMcastGrp::Id as u16, &group_id.to_ne_bytes()));
        nest.extend(attr_bytes((i + 1) as u16 | NLA_F_NESTED, &inner));
    }
    builder.append_attr(CtrlAttr::McastGroups as u16 | NLA_F_NESTED, &nest);
    builder.finish().unwrap()
}

/// The devlink family as [`ctrl_family_reply`] would describe it.
pub(crate) fn devlink_family() -> FamilyInfo {
    FamilyInfo {
        name: "devlink".to_string(),
        id: FAMILY_ID,
        version: 1,
        mcast_groups: HashMap::from([("config".to_string(), 5), ("hwmsg".to_string(), 6)]),
    }
}

/// Device record with index and name only.
pub(crate) fn device_message(cmd: u8, index: u32, name: &str) -> Vec<u8> {
    genl_message(cmd, |b| {
        b.append_attr_u32(DevlinkAttr::Index as u16, index);
        b.append_attr_str(DevlinkAttr::Name as u16, name);
    })
}

/// Port record attached to device `index`.
pub(crate) fn port_message(cmd: u8, index: u32, port_index: u32, port_type: PortType) -> Vec<u8> {
    genl_message(cmd, |b| {
        b.append_attr_u32(DevlinkAttr::Index as u16, index);
        b.append_attr_u32(DevlinkAttr::PortIndex as u16, port_index);
        b.append_attr_u16(DevlinkAttr::PortType as u16, port_type.as_raw());
    })
}
