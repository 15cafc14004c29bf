//! End-to-end tests for the RADIUS engine.
//!
//! Each test binds a server to an OS-assigned port, speaks to it over a real
//! UDP socket, and inspects the decoded-packet stream.

use radius_codec::{auth, Avp, Code, Codec, RadiusPacket, Value};
use radius_engine::{RadiusServer, StaticSecret, DEFAULT_CHANNEL_CAPACITY};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::timeout;

const SECRET: &str = "testing123";

async fn start_server() -> (RadiusServer, mpsc::Receiver<RadiusPacket>) {
    let codec = Arc::new(Codec::with_defaults());
    let secrets = Arc::new(StaticSecret(SECRET.to_string()));
    RadiusServer::start(
        "127.0.0.1:0".parse().unwrap(),
        codec,
        secrets,
        DEFAULT_CHANNEL_CAPACITY,
    )
    .await
    .expect("Failed to start server")
}

#[tokio::test]
async fn test_access_request_round_trip() {
    let (server, mut packets) = start_server().await;
    let server_addr = server.local_addr().expect("Failed to get server address");

    // Build the request with a client-side codec.
    let codec = Codec::with_defaults();
    let mut request = RadiusPacket::new(Code::AccessRequest, 77, SECRET);
    request.add_avp(Avp::text("User-Name", "alice"));
    request.add_avp(Avp::password("open sesame"));
    let wire = codec.encode(&request).expect("Failed to encode request");

    let mut request_authenticator = [0u8; 16];
    request_authenticator.copy_from_slice(&wire[4..20]);

    let client = UdpSocket::bind("127.0.0.1:0").await.expect("Failed to bind client");
    let client_addr = client.local_addr().expect("Failed to get client address");
    client.send_to(&wire, server_addr).await.expect("Failed to send");

    // The decoded packet appears on the stream.
    let packet = timeout(Duration::from_secs(5), packets.recv())
        .await
        .expect("Timed out waiting for packet")
        .expect("Packet stream closed");

    assert_eq!(packet.packet_type(), "Access-Request");
    assert_eq!(packet.identifier, 77);
    assert_eq!(packet.origin, Some(client_addr));
    assert_eq!(
        packet.find_avp("User-Name").and_then(|avp| avp.value.clone()),
        Some(Value::Text("alice".to_string()))
    );
    assert_eq!(
        packet.find_avp("User-Password").and_then(|avp| avp.value.clone()),
        Some(Value::Password("open sesame".to_string()))
    );

    // Reply, and check the Response Authenticator on the client side.
    let reply = packet.reply(Code::AccessAccept);
    server.send(&reply).await.expect("Failed to send reply");

    let mut buf = [0u8; 1500];
    let (len, _) = timeout(Duration::from_secs(5), client.recv_from(&mut buf))
        .await
        .expect("Timed out waiting for reply")
        .expect("Failed to receive reply");
    let response = &buf[..len];

    assert_eq!(response[0], 2);
    assert_eq!(response[1], 77);
    let expected = auth::response_authenticator(
        2,
        77,
        len as u16,
        &request_authenticator,
        &response[20..],
        SECRET.as_bytes(),
    );
    assert_eq!(&response[4..20], &expected);
}

#[tokio::test]
async fn test_accounting_request_verifies_over_the_wire() {
    let (server, mut packets) = start_server().await;
    let server_addr = server.local_addr().expect("Failed to get server address");

    // Acct-Status-Type = Start(1)
    let avps = [40u8, 6, 0, 0, 0, 1];
    let length = (20 + avps.len()) as u16;
    let authenticator =
        auth::accounting_request_authenticator(4, 9, length, &avps, SECRET.as_bytes());

    let mut wire = vec![4u8, 9];
    wire.extend_from_slice(&length.to_be_bytes());
    wire.extend_from_slice(&authenticator);
    wire.extend_from_slice(&avps);

    let client = UdpSocket::bind("127.0.0.1:0").await.expect("Failed to bind client");
    client.send_to(&wire, server_addr).await.expect("Failed to send");

    let packet = timeout(Duration::from_secs(5), packets.recv())
        .await
        .expect("Timed out waiting for packet")
        .expect("Packet stream closed");

    assert_eq!(packet.packet_type(), "Accounting-Request");
    assert!(packet.verify_authenticator());
    assert_eq!(
        packet
            .find_avp("Acct-Status-Type")
            .and_then(|avp| avp.value.as_ref())
            .map(|value| value.to_string()),
        Some("Start(1)".to_string())
    );
}

#[tokio::test]
async fn test_malformed_datagrams_are_dropped() {
    let (server, mut packets) = start_server().await;
    let server_addr = server.local_addr().expect("Failed to get server address");

    let client = UdpSocket::bind("127.0.0.1:0").await.expect("Failed to bind client");

    // Header claims 50 bytes, datagram has 40: dropped without closing the
    // stream.
    let mut malformed = vec![0u8; 40];
    malformed[0] = 1;
    malformed[3] = 50;
    client.send_to(&malformed, server_addr).await.expect("Failed to send");

    // A valid packet sent afterwards still comes through.
    let codec = Codec::with_defaults();
    let mut request = RadiusPacket::new(Code::AccessRequest, 3, SECRET);
    request.add_avp(Avp::text("User-Name", "bob"));
    let wire = codec.encode(&request).expect("Failed to encode request");
    client.send_to(&wire, server_addr).await.expect("Failed to send");

    let packet = timeout(Duration::from_secs(5), packets.recv())
        .await
        .expect("Timed out waiting for packet")
        .expect("Packet stream closed");
    assert_eq!(packet.identifier, 3);
}

#[tokio::test]
async fn test_shutdown_closes_packet_stream() {
    let (server, mut packets) = start_server().await;

    server.shutdown();

    let closed = timeout(Duration::from_secs(5), packets.recv())
        .await
        .expect("Timed out waiting for stream to close");
    assert!(closed.is_none());
}
