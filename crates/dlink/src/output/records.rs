//! Printable implementations for devlink records.

use std::io::Write;

use serde_json::Value;

use super::{OutputOptions, Printable};
use crate::devlink::{Device, HwMsg, IndexMap, MonitorEvent, MonitorRecord, Port};

/// Bytes per hex dump line.
const HEX_DUMP_WIDTH: usize = 8;

/// Write `data` as offset-prefixed hex, eight bytes per line.
pub fn write_hex_dump<W: Write>(w: &mut W, data: &[u8]) -> std::io::Result<()> {
    for (line, chunk) in data.chunks(HEX_DUMP_WIDTH).enumerate() {
        write!(w, "  0x{:04x}: ", line * HEX_DUMP_WIDTH)?;
        for byte in chunk {
            write!(w, " {:02x}", byte)?;
        }
        writeln!(w)?;
    }
    Ok(())
}

impl Printable for Device {
    fn print_text<W: Write>(
        &self,
        w: &mut W,
        _opts: &OutputOptions,
        _names: &IndexMap,
    ) -> std::io::Result<()> {
        write!(w, "{}: {}:", self.index, self.name)?;
        if let Some(ref bus) = self.bus_name {
            write!(w, " bus {}", bus)?;
        }
        if let Some(ref dev) = self.dev_name {
            write!(w, " dev {}", dev)?;
        }
        writeln!(w)
    }

    fn to_json(&self, _names: &IndexMap) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl Printable for Port {
    fn print_text<W: Write>(
        &self,
        w: &mut W,
        _opts: &OutputOptions,
        names: &IndexMap,
    ) -> std::io::Result<()> {
        write!(w, "{}/{}:", names.name_by_index(self.index), self.port_index)?;
        if let Some(port_type) = self.port_type {
            write!(w, " type {}", port_type.name())?;
            if let Some(desired) = self.pending_type() {
                write!(w, "({})", desired.name())?;
            }
        }
        if let Some(ref netdev) = self.netdev_name {
            write!(w, " netdev {}", netdev)?;
        }
        if let Some(ref ibdev) = self.ibdev_name {
            write!(w, " ibdev {}", ibdev)?;
        }
        writeln!(w)
    }

    fn to_json(&self, names: &IndexMap) -> serde_json::Result<Value> {
        let mut json = serde_json::to_value(self)?;
        if let Value::Object(ref mut map) = json {
            map.insert(
                "dev".to_string(),
                Value::String(names.name_by_index(self.index).into_owned()),
            );
        }
        Ok(json)
    }
}

impl Printable for HwMsg {
    fn print_text<W: Write>(
        &self,
        w: &mut W,
        opts: &OutputOptions,
        _names: &IndexMap,
    ) -> std::io::Result<()> {
        writeln!(
            w,
            "{}: {} {} {} bytes",
            self.index,
            self.kind.name(),
            self.dir.name(),
            self.payload.len()
        )?;
        if opts.verbosity.shows(2) {
            write_hex_dump(w, &self.payload)?;
        }
        Ok(())
    }

    fn to_json(&self, _names: &IndexMap) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl Printable for MonitorEvent {
    fn print_text<W: Write>(
        &self,
        w: &mut W,
        opts: &OutputOptions,
        names: &IndexMap,
    ) -> std::io::Result<()> {
        write!(w, "[{}] ", self.cmd.name())?;
        match self.record {
            MonitorRecord::Device(ref dev) => dev.print_text(w, opts, names),
            MonitorRecord::Port(ref port) => port.print_text(w, opts, names),
            MonitorRecord::HwMsg(ref msg) => msg.print_text(w, opts, names),
        }
    }

    fn to_json(&self, names: &IndexMap) -> serde_json::Result<Value> {
        let (key, record) = match self.record {
            MonitorRecord::Device(ref dev) => ("device", dev.to_json(names)?),
            MonitorRecord::Port(ref port) => ("port", port.to_json(names)?),
            MonitorRecord::HwMsg(ref msg) => ("hwmsg", msg.to_json(names)?),
        };
        let mut map = serde_json::Map::new();
        map.insert("command".to_string(), Value::from(self.cmd.name()));
        map.insert(key.to_string(), record);
        Ok(Value::Object(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devlink::{DevlinkCmd, HwMsgDir, HwMsgType, IndexEntry, PortType};
    use crate::output::{OutputFormat, Verbosity};

    fn names() -> IndexMap {
        IndexMap::from_entries(vec![IndexEntry {
            index: 0,
            name: "swA".into(),
        }])
    }

    fn text<P: Printable>(item: &P, verbosity: Verbosity) -> String {
        let opts = OutputOptions {
            verbosity,
            pretty: false,
        };
        let mut out = Vec::new();
        item.print(&mut out, OutputFormat::Text, &opts, &names())
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    fn port(index: u32) -> Port {
        Port {
            index,
            port_index: 3,
            port_type: Some(PortType::Eth),
            desired_type: Some(PortType::Ib),
            netdev_ifindex: Some(12),
            netdev_name: Some("sw1p3".into()),
            ibdev_name: None,
        }
    }

    fn hwmsg(len: usize) -> HwMsg {
        HwMsg {
            index: 0,
            kind: HwMsgType::MlxEmad,
            dir: HwMsgDir::ToHw,
            payload: (0..len as u8).collect(),
        }
    }

    #[test]
    fn test_device_text() {
        let dev = Device {
            index: 0,
            name: "swA".into(),
            bus_name: Some("pci".into()),
            dev_name: Some("0000:03:00.0".into()),
        };
        assert_eq!(
            text(&dev, Verbosity::DEFAULT),
            "0: swA: bus pci dev 0000:03:00.0\n"
        );
    }

    #[test]
    fn test_port_text() {
        assert_eq!(
            text(&port(0), Verbosity::DEFAULT),
            "swA/3: type eth(ib) netdev sw1p3\n"
        );
        assert_eq!(
            text(&port(5), Verbosity::DEFAULT),
            "<index 5>/3: type eth(ib) netdev sw1p3\n"
        );
    }

    #[test]
    fn test_hwmsg_hex_dump_needs_verbosity() {
        assert_eq!(
            text(&hwmsg(3), Verbosity::DEFAULT),
            "0: mlx_emad to_hw 3 bytes\n"
        );
        assert_eq!(
            text(&hwmsg(10), Verbosity::from_flag_count(1)),
            "0: mlx_emad to_hw 10 bytes\n\
             \x20 0x0000:  00 01 02 03 04 05 06 07\n\
             \x20 0x0008:  08 09\n"
        );
    }

    #[test]
    fn test_hex_dump_empty() {
        let mut out = Vec::new();
        write_hex_dump(&mut out, &[]).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_monitor_header() {
        let event = MonitorEvent {
            cmd: DevlinkCmd::PortDel,
            record: MonitorRecord::Port(port(0)),
        };
        assert_eq!(
            text(&event, Verbosity::DEFAULT),
            "[port del] swA/3: type eth(ib) netdev sw1p3\n"
        );
    }

    #[test]
    fn test_port_json_has_device_name() {
        let json = port(0).to_json(&names()).unwrap();
        assert_eq!(json["dev"], "swA");
        assert_eq!(json["port_index"], 3);
        assert_eq!(json["desired_type"], "ib");
    }

    #[test]
    fn test_monitor_json() {
        let event = MonitorEvent {
            cmd: DevlinkCmd::HwMsgNew,
            record: MonitorRecord::HwMsg(hwmsg(2)),
        };
        let json = event.to_json(&names()).unwrap();
        assert_eq!(json["command"], "hwmsg");
        assert_eq!(json["hwmsg"]["dir"], "to_hw");
        assert_eq!(json["hwmsg"]["type"], "mlx_emad");
    }

    #[test]
    fn test_json_one_line_per_record() {
        let dev = Device {
            index: 1,
            name: "swB".into(),
            bus_name: None,
            dev_name: None,
        };
        let mut out = Vec::new();
        dev.print(
            &mut out,
            OutputFormat::Json,
            &OutputOptions::default(),
            &names(),
        )
        .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "{\"index\":1,\"name\":\"swB\"}\n");
    }
}
