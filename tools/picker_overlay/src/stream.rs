use std::io::{self, BufReader, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use anyhow::{Context, Result};
use picker_core::{HostBridge, PickerConfig, PickerController, PickerError};
use picker_protocol::{
    decode_payload, encode_message, read_message, Hello, HostCommand, InboundMessage, MessageKind,
    ProtocolError,
};
use serde_json::Value;

use crate::surface::TextSurface;

enum Outgoing {
    Send(Vec<u8>),
    Shutdown,
}

/// Queues framed commands for a writer thread so the controller never blocks
/// on the host socket.
pub struct StreamBridge {
    sender: Sender<Outgoing>,
}

impl StreamBridge {
    pub fn spawn(stream: TcpStream) -> Result<Self> {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("picker_stream_writer".to_string())
            .spawn(move || writer_loop(stream, rx))
            .context("spawning picker writer thread")?;
        let bridge = Self { sender: tx };
        let hello = Hello::new("picker_overlay", Some(env!("CARGO_PKG_VERSION").to_string()));
        bridge.enqueue(encode_message(MessageKind::Hello, &hello)?)?;
        Ok(bridge)
    }

    fn enqueue(&self, bytes: Vec<u8>) -> Result<(), PickerError> {
        self.sender
            .send(Outgoing::Send(bytes))
            .map_err(|_| PickerError::TransportFailure("writer thread stopped".to_string()))
    }
}

impl HostBridge for StreamBridge {
    fn dispatch(&self, command: &HostCommand) -> Result<(), PickerError> {
        let bytes = encode_message(MessageKind::Command, command)
            .map_err(|err| PickerError::TransportFailure(err.to_string()))?;
        self.enqueue(bytes)
    }
}

impl Drop for StreamBridge {
    fn drop(&mut self) {
        let _ = self.sender.send(Outgoing::Shutdown);
    }
}

fn writer_loop(mut stream: TcpStream, rx: Receiver<Outgoing>) {
    while let Ok(Outgoing::Send(buffer)) = rx.recv() {
        if let Err(err) = stream.write_all(&buffer).and_then(|_| stream.flush()) {
            log::warn!("host write failed: {err}; closing connection");
            if let Err(err) = stream.shutdown(Shutdown::Both) {
                log::debug!("host socket shutdown failed: {err}");
            }
            break;
        }
    }
}

/// Accepts host connections one at a time and drives a fresh picker for each.
pub fn serve(addr: &str, config: PickerConfig) -> Result<()> {
    let listener = TcpListener::bind(addr).with_context(|| format!("binding {addr}"))?;
    log::info!("waiting for host at {addr}");
    accept_hosts(listener, config);
    Ok(())
}

fn accept_hosts(listener: TcpListener, config: PickerConfig) {
    for connection in listener.incoming() {
        match connection {
            Ok(stream) => {
                if let Err(err) = run_session(stream, config) {
                    log::warn!("host session ended: {err:#}");
                }
            }
            Err(err) => log::warn!("accept error: {err}"),
        }
    }
}

fn run_session(stream: TcpStream, config: PickerConfig) -> Result<()> {
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    stream
        .set_nodelay(true)
        .with_context(|| format!("configuring connection from {peer}"))?;
    log::info!("host connected from {peer}");

    let writer = stream.try_clone().context("cloning host socket")?;
    let bridge = StreamBridge::spawn(writer)?;
    let mut controller = PickerController::new(config, bridge, TextSurface::new(io::stdout()))?;
    let mut reader = BufReader::new(stream);

    let outcome = loop {
        let (header, payload) = match read_message(&mut reader) {
            Ok(message) => message,
            Err(ProtocolError::Io(err)) if err.kind() == io::ErrorKind::UnexpectedEof => {
                log::info!("host {peer} disconnected");
                break Ok(());
            }
            Err(err) => break Err(err).context("reading host frame"),
        };
        match header.kind {
            MessageKind::Control => match decode_payload::<Value>(&payload) {
                Ok(message) => {
                    let transition = controller.handle_value(&message);
                    log::debug!("{peer}: {transition:?}");
                }
                Err(err) => log::warn!("skipping undecodable control payload: {err}"),
            },
            other => log::debug!("ignoring {other:?} frame from host"),
        }
    };

    if controller.is_visible() {
        controller.handle(InboundMessage::HidePicker);
    }
    outcome
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    fn connected_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let client = TcpStream::connect(addr).expect("connect");
        let (server, _) = listener.accept().expect("accept");
        (client, server)
    }

    #[test]
    fn failed_write_closes_the_host_socket() {
        let (_client, server) = connected_pair();
        let reader = server.try_clone().expect("clone");
        reader
            .set_read_timeout(Some(Duration::from_secs(5)))
            .expect("read timeout");
        server.shutdown(Shutdown::Write).expect("shutdown write");

        let _bridge = StreamBridge::spawn(server).expect("spawn bridge");

        let mut reader = BufReader::new(reader);
        match read_message(&mut reader) {
            Err(ProtocolError::Io(err)) => assert_eq!(
                err.kind(),
                io::ErrorKind::UnexpectedEof,
                "session reader should see the socket closed"
            ),
            other => panic!("expected end of stream, got {other:?}"),
        }
    }

    #[test]
    fn serve_moves_on_after_host_disconnects() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr");
        thread::spawn(move || accept_hosts(listener, PickerConfig::default()));

        for _ in 0..2 {
            let host = TcpStream::connect(addr).expect("connect");
            host.set_read_timeout(Some(Duration::from_secs(5)))
                .expect("read timeout");
            let mut reader = BufReader::new(host);
            let (hello, _) = read_message(&mut reader).expect("hello frame");
            assert_eq!(hello.kind, MessageKind::Hello);
            drop(reader);
        }
    }

    #[test]
    fn bridge_sends_hello_then_framed_commands() {
        let (client, server) = connected_pair();

        let bridge = StreamBridge::spawn(server).expect("spawn bridge");
        bridge.send(HostCommand::marker(Some(31)));
        bridge.send_stop();
        drop(bridge);

        let mut reader = BufReader::new(client);
        let (hello, _) = read_message(&mut reader).expect("hello frame");
        assert_eq!(hello.kind, MessageKind::Hello);

        let (marker, payload) = read_message(&mut reader).expect("marker frame");
        assert_eq!(marker.kind, MessageKind::Command);
        let value: Value = decode_payload(&payload).expect("marker payload");
        assert_eq!(
            value,
            json!({ "endpoint": "setInteractionMarker", "body": { "entity": 31 } })
        );

        let (_, payload) = read_message(&mut reader).expect("stop frame");
        let value: Value = decode_payload(&payload).expect("stop payload");
        assert_eq!(value, json!({ "endpoint": "stopInteraction", "body": {} }));
    }
}
