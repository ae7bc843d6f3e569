//! Integration tests for the socket lifecycle over real loopback sockets.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread;
use std::time::Duration;

use tcp_greeter::config::AddrPolicy;
use tcp_greeter::net::{Listener, ListenerState, SocketError};

fn listening(backlog: u32) -> (Listener, SocketAddr) {
    let mut listener = Listener::create("127.0.0.1", 0, backlog, AddrPolicy::Reject).unwrap();
    listener.bind().unwrap();
    listener.listen().unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

#[test]
fn second_bind_to_same_address_fails() {
    let (listener, addr) = listening(5);
    assert_eq!(listener.state(), ListenerState::Listening);

    let mut second =
        Listener::create("127.0.0.1", addr.port(), 5, AddrPolicy::Reject).unwrap();
    match second.bind() {
        Err(SocketError::Bind(e)) => {
            assert_eq!(e.kind(), std::io::ErrorKind::AddrInUse);
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert_eq!(second.state(), ListenerState::Created);
}

#[test]
fn accept_reports_the_actual_peer() {
    let (listener, addr) = listening(5);

    // Connecting completes before any accept because of the backlog queue.
    let client = TcpStream::connect(addr).unwrap();

    let conn = listener.accept().unwrap();
    assert_eq!(conn.peer_addr(), client.local_addr().unwrap());
}

#[test]
fn connections_queue_until_accepted() {
    let (listener, addr) = listening(5);

    // Three clients connect before the server accepts anything.
    let mut clients = Vec::new();
    for _ in 0..3 {
        clients.push(TcpStream::connect(addr).unwrap());
    }

    // Each queued connection is still live once accepted.
    for client in &mut clients {
        let mut conn = listener.accept().unwrap();
        conn.send_all(b"hi").unwrap();
        conn.close();

        let mut buf = [0u8; 2];
        client.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"hi");
    }
}

#[test]
fn receive_returns_at_most_max_bytes_and_keeps_the_rest() {
    let (listener, addr) = listening(5);

    let mut client = TcpStream::connect(addr).unwrap();
    client.write_all(b"hello world").unwrap();

    let mut conn = listener.accept().unwrap();

    // Let the full write land in the socket buffer first.
    thread::sleep(Duration::from_millis(100));

    let first = conn.receive(5).unwrap();
    assert_eq!(&first[..], b"hello");

    let rest = conn.receive(1024).unwrap();
    assert_eq!(&rest[..], b" world");
}

#[test]
fn receive_after_peer_close_is_empty_not_an_error() {
    let (listener, addr) = listening(5);

    let client = TcpStream::connect(addr).unwrap();
    let mut conn = listener.accept().unwrap();
    drop(client);

    let data = conn.receive(1024).unwrap();
    assert!(data.is_empty());
}

#[test]
fn send_all_delivers_exact_bytes_in_order() {
    let (listener, addr) = listening(5);

    let payload: Vec<u8> = (0..256 * 1024).map(|i| (i % 251) as u8).collect();
    let expected = payload.clone();

    // Reader runs concurrently so send_all can make progress past the
    // socket buffers.
    let reader = thread::spawn(move || {
        let mut client = TcpStream::connect(addr).unwrap();
        let mut received = Vec::new();
        client.read_to_end(&mut received).unwrap();
        received
    });

    let mut conn = listener.accept().unwrap();
    conn.send_all(&payload).unwrap();
    conn.close();

    let received = reader.join().unwrap();
    assert_eq!(received, expected);
}

#[test]
fn closing_a_connection_twice_is_a_no_op() {
    let (listener, addr) = listening(5);

    let _client = TcpStream::connect(addr).unwrap();
    let mut conn = listener.accept().unwrap();

    conn.close();
    assert!(conn.is_closed());
    conn.close();
    assert!(conn.is_closed());

    assert!(matches!(conn.send(b"x"), Err(SocketError::Send(_))));
    assert!(matches!(conn.receive(16), Err(SocketError::Receive(_))));
}

#[test]
fn listener_stays_usable_across_connections() {
    let (listener, addr) = listening(5);

    for round in 0..3u8 {
        let mut client = TcpStream::connect(addr).unwrap();
        let mut conn = listener.accept().unwrap();

        client.write_all(&[round]).unwrap();
        let data = conn.receive(16).unwrap();
        assert_eq!(&data[..], &[round]);

        conn.close();
    }
    assert_eq!(listener.state(), ListenerState::Listening);
}
