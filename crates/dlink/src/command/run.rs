//! Command execution against a devlink session.

use std::io::Write;

use super::{Command, HelpTopic, PortArg};
use crate::devlink::{Devlink, PortId};
use crate::netlink::error::Result;
use crate::netlink::transport::Transport;
use crate::output::{Printable, Printer};

const MAIN_USAGE: &str = "\
Usage: dl [ OPTIONS ] OBJECT { COMMAND | help }
where  OBJECT := { dev | port | monitor }
       OPTIONS := { -v/--verbose | -j/--json | -p/--pretty }
";

const DEV_USAGE: &str = "\
Usage: dl dev show [DEV]
Usage: dl dev set DEV [ name NEWNAME ]
";

const PORT_USAGE: &str = "\
Usage: dl port show [DEV/PORT_INDEX]
Usage: dl port set DEV/PORT_INDEX [ type { eth | ib | auto} ]
Usage: dl port split DEV/PORT_INDEX count
Usage: dl port unsplit DEV/PORT_INDEX
";

/// Usage text for a help topic.
pub fn usage(topic: HelpTopic) -> &'static str {
    match topic {
        HelpTopic::Main => MAIN_USAGE,
        HelpTopic::Dev => DEV_USAGE,
        HelpTopic::Port => PORT_USAGE,
    }
}

/// Execute a parsed command and print its results.
///
/// Device names are resolved through the session's index map before any
/// request is sent.
pub async fn run<T, W>(cmd: &Command, dl: &mut Devlink<T>, printer: &mut Printer<W>) -> Result<()>
where
    T: Transport,
    W: Write,
{
    tracing::debug!(?cmd, "running command");

    match cmd {
        Command::Help(topic) => printer.write_text(usage(*topic)),

        Command::DevShow { dev: None } => {
            let devices = dl.devices().await?;
            printer.print_all(&devices, dl.index_map())
        }
        Command::DevShow { dev: Some(name) } => {
            let index = dl.resolve_device(name)?;
            let device = dl.device(index).await?;
            print_echo(printer, device.as_ref(), dl)
        }
        Command::DevSet { dev, name } => {
            let index = dl.resolve_device(dev)?;
            let device = dl.set_device(index, name.as_deref()).await?;
            print_echo(printer, device.as_ref(), dl)
        }

        Command::PortShow { port: None } => {
            let ports = dl.ports().await?;
            printer.print_all(&ports, dl.index_map())
        }
        Command::PortShow { port: Some(arg) } => {
            let id = resolve(dl, arg)?;
            let port = dl.port(id).await?;
            print_echo(printer, port.as_ref(), dl)
        }
        Command::PortSet { port, port_type } => {
            let id = resolve(dl, port)?;
            let port = dl.set_port(id, *port_type).await?;
            print_echo(printer, port.as_ref(), dl)
        }
        Command::PortSplit { port, count } => {
            let id = resolve(dl, port)?;
            let port = dl.split_port(id, *count).await?;
            print_echo(printer, port.as_ref(), dl)
        }
        Command::PortUnsplit { port } => {
            let id = resolve(dl, port)?;
            let port = dl.unsplit_port(id).await?;
            print_echo(printer, port.as_ref(), dl)
        }

        Command::Monitor => {
            let names = dl.index_map().clone();
            dl.monitor(|event| printer.print(&event, &names)).await
        }
    }
}

fn resolve<T: Transport>(dl: &Devlink<T>, arg: &PortArg) -> Result<PortId> {
    dl.resolve_port(&arg.dev, arg.port_index)
}

fn print_echo<P, T, W>(printer: &mut Printer<W>, item: Option<&P>, dl: &Devlink<T>) -> Result<()>
where
    P: Printable,
    T: Transport,
    W: Write,
{
    match item {
        Some(item) => printer.print(item, dl.index_map()),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::parse;
    use crate::devlink::{DevlinkAttr, DevlinkCmd, PortType};
    use crate::netlink::Error;
    use crate::netlink::attr::{AttrIter, get};
    use crate::netlink::fixtures::{
        MockTransport, ack_message, device_message, devlink_family, done_message, genl_message,
        port_message,
    };
    use crate::netlink::genl::{GENL_HDRLEN, GenlConnection};
    use crate::netlink::message::NLMSG_HDRLEN;
    use crate::output::{OutputFormat, OutputOptions, Verbosity};

    fn startup_mock() -> MockTransport {
        let mock = MockTransport::new();
        mock.expect(vec![
            device_message(DevlinkCmd::New as u8, 0, "swA"),
            device_message(DevlinkCmd::New as u8, 1, "swB"),
            done_message(),
        ]);
        mock
    }

    async fn session(mock: MockTransport) -> Devlink<MockTransport> {
        let conn = GenlConnection::from_parts(mock, devlink_family(), 1);
        Devlink::from_connection(conn).await.unwrap()
    }

    fn printer(verbosity: Verbosity) -> Printer<Vec<u8>> {
        Printer::new(
            Vec::new(),
            OutputFormat::Text,
            OutputOptions {
                verbosity,
                pretty: false,
            },
        )
    }

    async fn run_line(line: &str, dl: &mut Devlink<MockTransport>) -> (Result<()>, String) {
        let args: Vec<&str> = line.split_whitespace().collect();
        let mut out = printer(Verbosity::DEFAULT);
        let result = match parse(&args) {
            Ok(cmd) => run(&cmd, dl, &mut out).await,
            Err(e) => Err(e),
        };
        (result, String::from_utf8(out.into_inner()).unwrap())
    }

    #[tokio::test]
    async fn test_dev_show_dump() {
        let mock = startup_mock();
        mock.expect(vec![
            device_message(DevlinkCmd::New as u8, 0, "swA"),
            device_message(DevlinkCmd::New as u8, 1, "swB"),
            done_message(),
        ]);
        let mut dl = session(mock).await;

        let (result, out) = run_line("dev show", &mut dl).await;
        result.unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("0: swA:"));
        assert!(lines[1].starts_with("1: swB:"));
    }

    #[tokio::test]
    async fn test_dev_show_single() {
        let mock = startup_mock();
        mock.expect(vec![
            genl_message(DevlinkCmd::New as u8, |b| {
                b.append_attr_u32(DevlinkAttr::Index as u16, 1);
                b.append_attr_str(DevlinkAttr::Name as u16, "swB");
                b.append_attr_str(DevlinkAttr::BusName as u16, "pci");
                b.append_attr_str(DevlinkAttr::DevName as u16, "0000:03:00.0");
            }),
            ack_message(),
        ]);
        let mut dl = session(mock).await;

        let (result, out) = run_line("dev sh swB", &mut dl).await;
        result.unwrap();
        assert_eq!(out, "1: swB: bus pci dev 0000:03:00.0\n");
    }

    #[tokio::test]
    async fn test_port_show_resolves_and_rejects_incomplete_reply() {
        let mock = startup_mock();
        mock.expect(vec![
            genl_message(DevlinkCmd::PortNew as u8, |b| {
                b.append_attr_u32(DevlinkAttr::Index as u16, 0);
            }),
            ack_message(),
        ]);
        let mut dl = session(mock).await;

        let (result, out) = run_line("port show swA/3", &mut dl).await;
        assert!(result.unwrap_err().is_decode());
        assert!(out.is_empty());

        let sent = dl.connection().transport().sent();
        assert_eq!(sent.len(), 2);
        let attrs: Vec<_> = AttrIter::new(&sent[1][NLMSG_HDRLEN + GENL_HDRLEN..]).collect();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].0, DevlinkAttr::Index as u16);
        assert_eq!(get::u32_ne(attrs[0].1).unwrap(), 0);
        assert_eq!(attrs[1].0, DevlinkAttr::PortIndex as u16);
        assert_eq!(get::u32_ne(attrs[1].1).unwrap(), 3);
    }

    #[tokio::test]
    async fn test_port_show_dump_uses_names() {
        let mock = startup_mock();
        mock.expect(vec![
            port_message(DevlinkCmd::PortNew as u8, 0, 1, PortType::Eth),
            port_message(DevlinkCmd::PortNew as u8, 7, 2, PortType::Ib),
            done_message(),
        ]);
        let mut dl = session(mock).await;

        let (result, out) = run_line("port", &mut dl).await;
        result.unwrap();
        assert_eq!(out, "swA/1: type eth\n<index 7>/2: type ib\n");
    }

    #[tokio::test]
    async fn test_port_set_unknown_device_sends_nothing() {
        let mock = MockTransport::new();
        mock.expect(vec![
            device_message(DevlinkCmd::New as u8, 1, "swB"),
            done_message(),
        ]);
        let mut dl = session(mock).await;

        let (result, out) = run_line("port set swA/3 type ib", &mut dl).await;
        let err = result.unwrap_err();
        assert!(err.is_not_found());
        assert!(matches!(err, Error::DeviceNotFound { ref name } if name == "swA"));
        assert!(out.is_empty());

        // only the startup dump went out
        assert_eq!(dl.connection().transport().sent().len(), 1);
    }

    #[tokio::test]
    async fn test_port_set_acked_prints_nothing() {
        let mock = startup_mock();
        mock.expect(vec![ack_message()]);
        let mut dl = session(mock).await;

        let (result, out) = run_line("port set swB/2 type eth", &mut dl).await;
        result.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_port_split_echo_printed() {
        let mock = startup_mock();
        mock.expect(vec![
            port_message(DevlinkCmd::PortNew as u8, 0, 1, PortType::NotSet),
            ack_message(),
        ]);
        let mut dl = session(mock).await;

        let (result, out) = run_line("port split swA/1 2", &mut dl).await;
        result.unwrap();
        assert_eq!(out, "swA/1: type notset\n");
    }

    #[tokio::test]
    async fn test_monitor_decode_error_is_fatal() {
        let mut dl = session(startup_mock()).await;
        let transport = dl.connection().transport();
        transport.event(port_message(DevlinkCmd::PortNew as u8, 1, 4, PortType::Eth));
        transport.event(genl_message(DevlinkCmd::HwMsgNew as u8, |b| {
            b.append_attr_u32(DevlinkAttr::Index as u16, 1);
            b.append_attr(DevlinkAttr::HwMsgPayload as u16, &[0xaa]);
            b.append_attr_u32(DevlinkAttr::HwMsgType as u16, 0);
            b.append_attr_u8(DevlinkAttr::HwMsgDir as u16, 2);
        }));

        let (result, out) = run_line("monitor", &mut dl).await;
        assert!(result.unwrap_err().is_decode());
        assert_eq!(out, "[port new] swB/4: type eth\n");
    }

    #[tokio::test]
    async fn test_monitor_hwmsg_dump() {
        let mut dl = session(startup_mock()).await;
        dl.connection()
            .transport()
            .event(genl_message(DevlinkCmd::HwMsgNew as u8, |b| {
                b.append_attr_u32(DevlinkAttr::Index as u16, 0);
                b.append_attr(DevlinkAttr::HwMsgPayload as u16, &[0xde, 0xad, 0xbe, 0xef]);
                b.append_attr_u32(DevlinkAttr::HwMsgType as u16, 0);
                b.append_attr_u8(DevlinkAttr::HwMsgDir as u16, 1);
            }));

        let cmd = parse(&["monitor"]).unwrap();
        let mut out = printer(Verbosity::from_flag_count(1));
        // the mock runs dry after the event
        let err = run(&cmd, &mut dl, &mut out).await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));

        let text = String::from_utf8(out.into_inner()).unwrap();
        assert_eq!(
            text,
            "[hwmsg] 0: mlx_emad from_hw 4 bytes\n  0x0000:  de ad be ef\n"
        );
    }

    #[tokio::test]
    async fn test_help_needs_no_traffic() {
        let mut dl = session(startup_mock()).await;

        let (result, out) = run_line("port help", &mut dl).await;
        result.unwrap();
        assert!(out.starts_with("Usage: dl port show [DEV/PORT_INDEX]\n"));
        assert_eq!(dl.connection().transport().sent().len(), 1);
    }

    #[test]
    fn test_usage_text() {
        assert!(usage(HelpTopic::Main).contains("OBJECT := { dev | port | monitor }"));
        assert_eq!(usage(HelpTopic::Dev).lines().count(), 2);
        assert_eq!(usage(HelpTopic::Port).lines().count(), 4);
    }
}
