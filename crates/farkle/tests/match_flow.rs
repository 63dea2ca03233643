//! End-to-end tests: a host and a peer (or a hand-driven socket standing
//! in for one) play over loopback TCP with scripted dice and choices.

use std::collections::VecDeque;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use farkle::prelude::*;
use farkle::Transcript;
use farkle_match::ScriptedDice;
use farkle_protocol::{Codec, JsonCodec};
use farkle_transport::{Connection, TcpConnection, TcpTransport, Transport, TransportError};

// =========================================================================
// Helpers
// =========================================================================

const FARKLE: [u8; 6] = [2, 3, 4, 6, 2, 3];

/// Plays back a fixed list of choices, then quits.
struct Script(VecDeque<Choice>);

impl Script {
    fn new(choices: impl IntoIterator<Item = Choice>) -> Self {
        Self(choices.into_iter().collect())
    }

    fn empty() -> Self {
        Self(VecDeque::new())
    }
}

impl DecisionSource for Script {
    async fn decide(&mut self, _prompt: &DecisionPrompt<'_>) -> Choice {
        self.0.pop_front().unwrap_or(Choice::Quit)
    }
}

fn loopback_config() -> SessionConfig {
    SessionConfig {
        bind_addr: "127.0.0.1:0".into(),
        handshake_timeout: Duration::from_secs(2),
        ..SessionConfig::default()
    }
}

async fn bind_host() -> (HostSession, SocketAddr) {
    let host = HostSession::bind(loopback_config(), MatchConfig::default())
        .await
        .expect("host should bind");
    let addr = host.local_addr();
    (host, addr)
}

/// Fails the test instead of hanging if a session stalls.
async fn within<F: Future>(fut: F) -> F::Output {
    tokio::time::timeout(Duration::from_secs(10), fut)
        .await
        .expect("session should finish")
}

async fn send_msg(conn: &TcpConnection, msg: &Message) {
    let bytes = JsonCodec.encode(msg).expect("encode");
    conn.send(&bytes).await.expect("send");
}

async fn recv_msg(conn: &TcpConnection) -> Option<Message> {
    let bytes = conn.recv().await.expect("recv")?;
    Some(JsonCodec.decode(&bytes).expect("decode"))
}

/// Reads messages until `your_turn`, returning everything before it.
async fn recv_until_your_turn(conn: &TcpConnection) -> Vec<Message> {
    let mut seen = Vec::new();
    loop {
        match recv_msg(conn).await.expect("host should still be connected") {
            Message::YourTurn => return seen,
            msg => seen.push(msg),
        }
    }
}

// =========================================================================
// Host + peer
// =========================================================================

#[tokio::test]
async fn test_host_wins_on_opening_roll() {
    let (host, addr) = bind_host().await;

    let host_side = async {
        let mut choices = Script::new([Choice::bank(vec![1, 1, 1])]);
        let mut screen = Transcript::new();
        let dice = ScriptedDice::new([vec![1, 1, 1, 2, 3, 4]]);
        let outcome = host.run(dice, &mut choices, &mut screen).await;
        (outcome, screen)
    };
    let peer_side = async {
        let mut choices = Script::empty();
        let mut screen = Transcript::new();
        let outcome = join(addr, &loopback_config(), &mut choices, &mut screen).await;
        (outcome, screen)
    };

    let ((host_outcome, host_screen), (peer_outcome, peer_screen)) =
        within(async { tokio::join!(host_side, peer_side) }).await;

    assert_eq!(host_outcome.unwrap(), MatchOutcome::Won);
    assert_eq!(peer_outcome.unwrap(), MatchOutcome::Lost);

    assert!(host_screen.contains("You rolled: [1] [1] [1] [2] [3] [4]"));
    assert!(host_screen.contains("You scored 1000 (total 1000)"));
    assert!(host_screen.contains("You win!"));

    assert!(peer_screen.contains("Connected! Target score: 1000"));
    assert!(peer_screen.contains("ROUND 1 - First to 1000"));
    assert!(peer_screen.contains("Host scored 1000 (total 1000)"));
    assert_eq!(peer_screen.lines().last().map(String::as_str), Some("Host wins."));
}

#[tokio::test]
async fn test_peer_keeps_four_twos_and_rolls_two_dice() {
    let (host, addr) = bind_host().await;

    let host_side = async {
        // Host farkles, peer plays a full turn, host wins the second round.
        let dice = ScriptedDice::new([
            FARKLE.to_vec(),
            vec![2, 2, 2, 2, 5, 6],
            vec![5, 5],
            vec![1, 1, 1, 1, 2, 3],
        ]);
        let mut choices = Script::new([Choice::bank(vec![1, 1, 1, 1])]);
        let mut screen = Transcript::new();
        let outcome = host.run(dice, &mut choices, &mut screen).await;
        (outcome, screen)
    };
    let peer_side = async {
        let mut choices = Script::new([
            Choice::keep(vec![3]),
            Choice::keep(vec![2, 2, 2, 2]),
            Choice::bank(vec![5, 5]),
        ]);
        let mut screen = Transcript::new();
        let outcome = join(addr, &loopback_config(), &mut choices, &mut screen).await;
        (outcome, screen)
    };

    let ((host_outcome, host_screen), (peer_outcome, peer_screen)) =
        within(async { tokio::join!(host_side, peer_side) }).await;

    assert_eq!(host_outcome.unwrap(), MatchOutcome::Won);
    assert_eq!(peer_outcome.unwrap(), MatchOutcome::Lost);

    assert!(host_screen.contains("Farkle! You scored 0 this turn."));
    assert!(host_screen.contains("Peer scored 400 (total 400)"));
    assert!(host_screen.contains("ROUND 2 - First to 1000"));

    assert!(peer_screen.contains("Host Farkled."));
    assert!(peer_screen.contains("Invalid selection"));
    assert!(peer_screen.contains("You scored 400 (total 400)"));
    assert!(peer_screen.contains("You rolled: [5] [5]"));
    assert!(peer_screen.lines().iter().any(|line| line == "Hot dice!"));
    assert!(peer_screen.contains("You scored 100 (total 500)"));
    assert!(peer_screen.contains("Scoreboard: Host: 0 | You: 500"));
    assert!(peer_screen.contains("Host wins."));
}

#[tokio::test]
async fn test_host_quit_ends_without_game_over() {
    let (host, addr) = bind_host().await;

    let host_side = async {
        let dice = ScriptedDice::new([vec![1, 2, 3, 4, 6, 6]]);
        let mut screen = Transcript::new();
        host.run(dice, &mut Script::empty(), &mut screen).await
    };
    let peer_side = async {
        let mut screen = Transcript::new();
        let outcome = join(addr, &loopback_config(), &mut Script::empty(), &mut screen).await;
        (outcome, screen)
    };

    let (host_outcome, (peer_outcome, peer_screen)) =
        within(async { tokio::join!(host_side, peer_side) }).await;

    assert_eq!(host_outcome.unwrap(), MatchOutcome::Quit);
    assert_eq!(peer_outcome.unwrap(), MatchOutcome::Disconnected);
    assert!(peer_screen.contains("Connection lost."));
    assert!(!peer_screen.contains("wins"));
}

// =========================================================================
// Host against a hand-driven peer
// =========================================================================

#[tokio::test]
async fn test_host_rejects_non_hello_opening() {
    let (host, addr) = bind_host().await;

    let host_side = async {
        let dice = ScriptedDice::new([FARKLE.to_vec()]);
        host.run(dice, &mut Script::empty(), &mut Transcript::new()).await
    };
    let client_side = async {
        let conn = TcpConnection::connect(addr, Duration::from_secs(2)).await.unwrap();
        send_msg(&conn, &Message::Action { keep: vec![1], bank: true }).await;
        recv_msg(&conn).await
    };

    let (host_result, reply) = within(async { tokio::join!(host_side, client_side) }).await;

    let err = host_result.unwrap_err();
    assert!(matches!(err, FarkleError::HandshakeFailed(_)), "got {err}");
    assert!(err.to_string().contains("expected hello, got action"));
    assert!(reply.is_none(), "host should close without replying");
}

#[tokio::test]
async fn test_host_disconnects_on_invalid_peer_action() {
    let (host, addr) = bind_host().await;

    let host_side = async {
        let dice = ScriptedDice::new([FARKLE.to_vec(), vec![2, 2, 2, 2, 5, 6]]);
        let mut screen = Transcript::new();
        let outcome = host.run(dice, &mut Script::empty(), &mut screen).await;
        (outcome, screen)
    };
    let client_side = async {
        let conn = TcpConnection::connect(addr, Duration::from_secs(2)).await.unwrap();
        send_msg(&conn, &Message::Hello { name: "mallory".into() }).await;
        let welcome = recv_msg(&conn).await;

        let before_turn = recv_until_your_turn(&conn).await;
        send_msg(&conn, &Message::Action { keep: vec![3], bank: true }).await;
        let after = recv_msg(&conn).await;
        (welcome, before_turn, after)
    };

    let ((host_outcome, host_screen), (welcome, before_turn, after)) =
        within(async { tokio::join!(host_side, client_side) }).await;

    assert_eq!(host_outcome.unwrap(), MatchOutcome::Disconnected);
    assert!(host_screen.contains("Peer disconnected."));

    assert_eq!(
        welcome,
        Some(Message::Welcome {
            target: 1000,
            seat: Side::Peer
        })
    );
    // The peer always sees its roll before it is asked to decide.
    assert_eq!(
        before_turn.last(),
        Some(&Message::Roll {
            dice: vec![2, 2, 2, 2, 5, 6],
            side: Side::Peer
        })
    );
    assert!(after.is_none());
}

#[tokio::test]
async fn test_host_refuses_second_peer_once_matched() {
    let (host, addr) = bind_host().await;

    let host_side = async {
        let dice = ScriptedDice::new([vec![1, 2, 3, 4, 6, 6]]);
        host.run(dice, &mut Script::empty(), &mut Transcript::new()).await
    };
    let client_side = async {
        let conn = TcpConnection::connect(addr, Duration::from_secs(2)).await.unwrap();
        send_msg(&conn, &Message::Hello { name: "first".into() }).await;
        let welcome = recv_msg(&conn).await;

        let second = TcpConnection::connect(addr, Duration::from_secs(2)).await;
        while recv_msg(&conn).await.is_some() {}
        (welcome, second.err())
    };

    let (host_outcome, (welcome, second)) =
        within(async { tokio::join!(host_side, client_side) }).await;
    assert_eq!(host_outcome.unwrap(), MatchOutcome::Quit);
    assert!(matches!(welcome, Some(Message::Welcome { .. })));
    assert!(
        matches!(second, Some(TransportError::ConnectFailed { .. })),
        "second dial should be refused, got {second:?}"
    );
}

#[tokio::test]
async fn test_host_messages_arrive_in_generation_order() {
    let host = HostSession::bind(loopback_config(), MatchConfig::new(3000))
        .await
        .expect("host should bind");
    let addr = host.local_addr();

    let host_side = async {
        // Hot dice on the first roll, then a six-of-a-kind that wins.
        let dice = ScriptedDice::new([vec![1, 1, 1, 5, 5, 5], vec![1, 1, 1, 1, 1, 1]]);
        let mut choices = Script::new([
            Choice::keep(vec![1, 1, 1, 5, 5, 5]),
            Choice::bank(vec![1, 1, 1, 1, 1, 1]),
        ]);
        host.run(dice, &mut choices, &mut Transcript::new()).await
    };
    let client_side = async {
        let conn = TcpConnection::connect(addr, Duration::from_secs(2)).await.unwrap();
        send_msg(&conn, &Message::Hello { name: "watcher".into() }).await;
        let mut seen = Vec::new();
        while let Some(msg) = recv_msg(&conn).await {
            seen.push(msg);
        }
        seen
    };

    let (host_outcome, seen) = within(async { tokio::join!(host_side, client_side) }).await;
    assert_eq!(host_outcome.unwrap(), MatchOutcome::Won);

    let kinds: Vec<&str> = seen.iter().map(Message::kind).collect();
    assert_eq!(
        kinds,
        ["welcome", "banner", "roll", "score", "hot", "roll", "score", "game_over"]
    );
    assert_eq!(
        seen[3],
        Message::Score {
            side: Side::Host,
            delta: 1500,
            total: 1500
        }
    );
}

// =========================================================================
// Peer against a hand-driven host
// =========================================================================

/// Accepts one peer, checks its `hello` and answers with `welcome`.
async fn accept_peer(transport: &mut TcpTransport) -> TcpConnection {
    let conn = transport.accept().await.expect("accept");
    let hello = recv_msg(&conn).await;
    assert_eq!(hello, Some(Message::Hello { name: "peer".into() }));
    send_msg(
        &conn,
        &Message::Welcome {
            target: 3000,
            seat: Side::Peer,
        },
    )
    .await;
    conn
}

#[tokio::test]
async fn test_peer_ignores_unknown_kinds() {
    let mut transport = TcpTransport::bind("127.0.0.1:0").await.unwrap();
    let addr = transport.local_addr().unwrap();

    let host_side = async {
        let conn = accept_peer(&mut transport).await;
        conn.send(br#"{"t":"emote","text":"gl hf"}"#).await.unwrap();
        send_msg(&conn, &Message::GameOver { winner: Side::Peer }).await;
        conn
    };
    let peer_side = async {
        let mut screen = Transcript::new();
        let outcome = join(addr, &loopback_config(), &mut Script::empty(), &mut screen).await;
        (outcome, screen)
    };

    let (_conn, (outcome, screen)) = within(async { tokio::join!(host_side, peer_side) }).await;
    assert_eq!(outcome.unwrap(), MatchOutcome::Won);
    assert!(screen.contains("Connected! Target score: 3000"));
    assert!(screen.contains("You win!"));
}

#[tokio::test]
async fn test_peer_sends_action_for_its_roll() {
    let mut transport = TcpTransport::bind("127.0.0.1:0").await.unwrap();
    let addr = transport.local_addr().unwrap();

    let host_side = async {
        let conn = accept_peer(&mut transport).await;
        send_msg(&conn, &Message::Roll { dice: vec![1, 5, 3, 3, 4, 6], side: Side::Peer }).await;
        send_msg(&conn, &Message::YourTurn).await;
        let raw = conn.recv().await.unwrap().unwrap();
        send_msg(&conn, &Message::GameOver { winner: Side::Host }).await;
        raw
    };
    let peer_side = async {
        let mut choices = Script::new([Choice::bank(vec![1, 5])]);
        join(addr, &loopback_config(), &mut choices, &mut Transcript::new()).await
    };

    let (raw, outcome) = within(async { tokio::join!(host_side, peer_side) }).await;
    assert_eq!(raw, br#"{"t":"action","keep":[1,5],"bank":true}"#);
    assert_eq!(outcome.unwrap(), MatchOutcome::Lost);
}

#[tokio::test]
async fn test_peer_quit_sends_nothing() {
    let mut transport = TcpTransport::bind("127.0.0.1:0").await.unwrap();
    let addr = transport.local_addr().unwrap();

    let host_side = async {
        let conn = accept_peer(&mut transport).await;
        send_msg(&conn, &Message::Roll { dice: vec![1, 2, 3, 4, 6, 6], side: Side::Peer }).await;
        send_msg(&conn, &Message::YourTurn).await;
        conn
    };
    let peer_side = async {
        join(addr, &loopback_config(), &mut Script::empty(), &mut Transcript::new()).await
    };

    let (conn, outcome) = within(async { tokio::join!(host_side, peer_side) }).await;
    assert_eq!(outcome.unwrap(), MatchOutcome::Quit);

    let next = tokio::time::timeout(Duration::from_millis(100), conn.recv()).await;
    assert!(next.is_err() || matches!(next, Ok(Ok(None))), "peer should send no action");
}

#[tokio::test]
async fn test_peer_rejects_non_welcome_reply() {
    let mut transport = TcpTransport::bind("127.0.0.1:0").await.unwrap();
    let addr = transport.local_addr().unwrap();

    let host_side = async {
        let conn = transport.accept().await.unwrap();
        recv_msg(&conn).await;
        send_msg(&conn, &Message::YourTurn).await;
        conn
    };
    let peer_side = async {
        join(addr, &loopback_config(), &mut Script::empty(), &mut Transcript::new()).await
    };

    let (_conn, result) = within(async { tokio::join!(host_side, peer_side) }).await;
    let err = result.unwrap_err();
    assert!(matches!(err, FarkleError::HandshakeFailed(_)), "got {err}");
}

#[tokio::test]
async fn test_peer_reports_lost_host() {
    let mut transport = TcpTransport::bind("127.0.0.1:0").await.unwrap();
    let addr = transport.local_addr().unwrap();

    let host_side = async {
        let conn = accept_peer(&mut transport).await;
        conn.close().await.unwrap();
        conn
    };
    let peer_side = async {
        let mut screen = Transcript::new();
        let outcome = join(addr, &loopback_config(), &mut Script::empty(), &mut screen).await;
        (outcome, screen)
    };

    let (_conn, (outcome, screen)) = within(async { tokio::join!(host_side, peer_side) }).await;
    assert_eq!(outcome.unwrap(), MatchOutcome::Disconnected);
    assert!(screen.contains("Connection lost."));
}

#[tokio::test]
async fn test_join_closed_port_fails() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = join(addr, &loopback_config(), &mut Script::empty(), &mut Transcript::new()).await;
    assert!(matches!(result, Err(FarkleError::Transport(_))));
}
