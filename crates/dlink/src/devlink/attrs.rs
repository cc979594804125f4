//! Validated devlink attribute tables.

use std::borrow::Cow;

use super::DevlinkAttr;
use crate::netlink::attr::{AttrIter, get};
use crate::netlink::error::{Error, Result};

const SLOTS: usize = DevlinkAttr::MAX as usize + 1;

/// Expected wire kind of an attribute payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrPolicy {
    U8,
    U16,
    U32,
    /// Non-empty, NUL terminated. The bytes before the NUL are not checked.
    NulString,
    /// Anything goes.
    Binary,
}

impl AttrPolicy {
    /// Policy for a devlink attribute id.
    pub fn for_attr(kind: u16) -> Self {
        use DevlinkAttr as A;

        match kind {
            k if k == A::Index as u16
                || k == A::PortIndex as u16
                || k == A::PortNetdevIfindex as u16
                || k == A::HwMsgType as u16
                || k == A::PortSplitCount as u16 =>
            {
                Self::U32
            }
            k if k == A::PortType as u16 || k == A::PortDesiredType as u16 => Self::U16,
            k if k == A::HwMsgDir as u16 => Self::U8,
            k if k == A::Name as u16
                || k == A::BusName as u16
                || k == A::DevName as u16
                || k == A::PortNetdevName as u16
                || k == A::PortIbdevName as u16 =>
            {
                Self::NulString
            }
            _ => Self::Binary,
        }
    }

    /// Check a payload against this policy.
    pub fn accepts(self, payload: &[u8]) -> bool {
        match self {
            Self::U8 => payload.len() == 1,
            Self::U16 => payload.len() == 2,
            Self::U32 => payload.len() == 4,
            Self::NulString => payload.last() == Some(&0),
            Self::Binary => true,
        }
    }
}

/// Attributes of one received message, indexed by type.
///
/// Built with [`parse`](Self::parse), which rejects the whole message if
/// any attribute id is beyond [`DevlinkAttr::MAX`] or any attribute fails
/// its [`AttrPolicy`]. When an id repeats, the last occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct AttributeSet<'a> {
    slots: [Option<&'a [u8]>; SLOTS],
}

impl<'a> AttributeSet<'a> {
    /// Validate and index the attributes following the GENL header.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let mut slots = [None; SLOTS];

        for (kind, payload) in AttrIter::new(data) {
            if kind > DevlinkAttr::MAX {
                return Err(Error::Decode(format!(
                    "attribute type {} exceeds maximum {}",
                    kind,
                    DevlinkAttr::MAX
                )));
            }

            let policy = AttrPolicy::for_attr(kind);
            if !policy.accepts(payload) {
                return Err(Error::Decode(format!(
                    "attribute type {} is not a valid {:?} ({} bytes)",
                    kind,
                    policy,
                    payload.len()
                )));
            }

            slots[kind as usize] = Some(payload);
        }

        Ok(Self { slots })
    }

    /// Raw payload, including a string's NUL terminator.
    pub fn bytes(&self, attr: DevlinkAttr) -> Option<&'a [u8]> {
        self.slots[attr as usize]
    }

    /// Whether the attribute was present.
    pub fn contains(&self, attr: DevlinkAttr) -> bool {
        self.bytes(attr).is_some()
    }

    pub fn u8(&self, attr: DevlinkAttr) -> Option<u8> {
        self.bytes(attr).and_then(|p| get::u8(p).ok())
    }

    pub fn u16(&self, attr: DevlinkAttr) -> Option<u16> {
        self.bytes(attr).and_then(|p| get::u16_ne(p).ok())
    }

    pub fn u32(&self, attr: DevlinkAttr) -> Option<u32> {
        self.bytes(attr).and_then(|p| get::u32_ne(p).ok())
    }

    /// String payload without its terminator. Invalid UTF-8 is replaced,
    /// since interface names are arbitrary bytes to the kernel.
    pub fn str(&self, attr: DevlinkAttr) -> Option<Cow<'a, str>> {
        self.bytes(attr).map(|p| {
            let text = p.split_last().map_or(p, |(_, text)| text);
            String::from_utf8_lossy(text)
        })
    }

    /// A u32 the record cannot do without.
    pub fn require_u32(&self, attr: DevlinkAttr) -> Result<u32> {
        self.u32(attr).ok_or_else(|| missing(attr))
    }

    /// A string the record cannot do without.
    pub fn require_str(&self, attr: DevlinkAttr) -> Result<Cow<'a, str>> {
        self.str(attr).ok_or_else(|| missing(attr))
    }
}

fn missing(attr: DevlinkAttr) -> Error {
    Error::Decode(format!("missing {:?} attribute", attr))
}
