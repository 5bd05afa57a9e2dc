use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::process::Command;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use venuelink::wire::{
    decode_message, encode_message, LoginResponse, Message, OrderState, OrderStatus,
};

fn listeners() -> (TcpListener, TcpListener) {
    (
        TcpListener::bind("127.0.0.1:0").unwrap(),
        TcpListener::bind("127.0.0.1:0").unwrap(),
    )
}

fn read_payload(sock: &mut TcpStream) -> Vec<u8> {
    let mut header = [0u8; 2];
    sock.read_exact(&mut header).unwrap();
    let len = u16::from_le_bytes(header) as usize;
    let mut payload = vec![0u8; len];
    sock.read_exact(&mut payload).unwrap();
    payload
}

fn write_message(sock: &mut TcpStream, msg: &Message) {
    sock.write_all(&encode_message(msg).unwrap()).unwrap();
}

fn login_response(ok: bool, token: u64, error: &str) -> Message {
    Message::LoginResponse(LoginResponse {
        token,
        ok,
        error: error.to_string(),
    })
}

/// Accept both channels and answer the handshake. Returns the connected
/// sockets for further scripting.
fn serve_handshake(
    upstream: &TcpListener,
    downstream: &TcpListener,
    token: u64,
) -> (TcpStream, TcpStream) {
    let (mut up, _) = upstream.accept().unwrap();
    up.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    let request = decode_message(&read_payload(&mut up)).unwrap();
    assert!(matches!(request, Message::LoginRequest(_)));
    write_message(&mut up, &login_response(true, token, ""));

    let (mut down, _) = downstream.accept().unwrap();
    down.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    let bind = decode_message(&read_payload(&mut down)).unwrap();
    assert!(matches!(bind, Message::TokenBindRequest(_)));
    write_message(&mut down, &login_response(true, 0, ""));

    (up, down)
}

fn venuelink_command(up_port: u16, down_port: u16, args: &[&str]) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_venuelink"));
    command
        .arg("--log-level")
        .arg("error")
        .arg("--format")
        .arg("json")
        .args(args)
        .arg("--name")
        .arg("trader1")
        .arg("--password")
        .arg("pw")
        .arg("--up-port")
        .arg(up_port.to_string())
        .arg("--down-port")
        .arg(down_port.to_string());
    command
}

#[test]
fn login_command_reports_ready_session() {
    let (up_listener, down_listener) = listeners();
    let up_port = up_listener.local_addr().unwrap().port();
    let down_port = down_listener.local_addr().unwrap().port();

    let venue: JoinHandle<()> = thread::spawn(move || {
        let (_up, _down) = serve_handshake(&up_listener, &down_listener, 77);
    });

    let output = venuelink_command(up_port, down_port, &["login"])
        .output()
        .expect("login command should run");

    venue.join().unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let summary: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(summary["token_issued"], serde_json::Value::Bool(true));
    assert_eq!(summary["name"], "trader1");
    assert!(summary.get("token").is_none(), "token value must not be printed");
}

#[test]
fn rejected_login_exits_with_auth_code() {
    let (up_listener, down_listener) = listeners();
    let up_port = up_listener.local_addr().unwrap().port();
    let down_port = down_listener.local_addr().unwrap().port();

    let venue = thread::spawn(move || {
        let (mut up, _) = up_listener.accept().unwrap();
        up.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
        let _request = read_payload(&mut up);
        write_message(&mut up, &login_response(false, 0, "bad creds"));
        let (_down, _) = down_listener.accept().unwrap();
    });

    let output = venuelink_command(up_port, down_port, &["login"])
        .output()
        .expect("login command should run");

    venue.join().unwrap();

    assert_eq!(output.status.code(), Some(75));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("bad creds"), "stderr: {stderr}");
}

#[test]
fn order_command_prints_status_reports() {
    let (up_listener, down_listener) = listeners();
    let up_port = up_listener.local_addr().unwrap().port();
    let down_port = down_listener.local_addr().unwrap().port();

    let venue = thread::spawn(move || {
        let (mut up, mut down) = serve_handshake(&up_listener, &down_listener, 5);

        let order = match decode_message(&read_payload(&mut up)).unwrap() {
            Message::Order(order) => order,
            other => panic!("expected Order, got {other:?}"),
        };
        assert_eq!(order.ticker, "ABCD");

        write_message(
            &mut down,
            &Message::OrderStatus(OrderStatus {
                order_id: order.id,
                timestamp: 0,
                quantity: order.quantity,
                fill_price: 0,
                state: OrderState::Accepted,
            }),
        );
        write_message(
            &mut down,
            &Message::OrderStatus(OrderStatus {
                order_id: order.id,
                timestamp: 0,
                quantity: order.quantity,
                fill_price: order.price,
                state: OrderState::Filled,
            }),
        );
    });

    let output = venuelink_command(
        up_port,
        down_port,
        &[
            "order",
            "--id",
            "1",
            "--ticker",
            "ABCD",
            "--quantity",
            "1",
            "--price",
            "1",
            "--action",
            "buy",
            "--await-statuses",
            "2",
        ],
    )
    .output()
    .expect("order command should run");

    venue.join().unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let statuses: Vec<&str> = stdout.lines().collect();
    assert_eq!(statuses.len(), 2, "stdout: {stdout}");
    assert!(statuses[0].contains("\"Accepted\""), "stdout: {stdout}");
    assert!(statuses[1].contains("\"Filled\""), "stdout: {stdout}");
}
