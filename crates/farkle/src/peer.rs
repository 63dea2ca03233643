//! The peer side of a session: dial, handshake, then react.
//!
//! The peer never rolls or scores on its own. It renders what the host
//! sends and answers `your_turn` with a single `action`.

use std::net::{IpAddr, SocketAddr};

use farkle_match::{Decision, MatchError, score, validate_selection};
use farkle_protocol::{Dice, JsonCodec, Message, Side, lobby};
use farkle_transport::TcpConnection;

use crate::io::{Choice, DecisionPrompt, DecisionSource, OutputSink};
use crate::link::Link;
use crate::{DEFAULT_PORT, FarkleError, MatchOutcome, SessionConfig, narrate};

/// The peer's view of the score, rebuilt from what the host announces.
///
/// Only used to fill in prompts. The host's totals always win.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreMirror {
    /// Last announced host total.
    pub host_total: u32,
    /// Last announced peer total.
    pub peer_total: u32,
    /// Winning score from `welcome` or the latest `banner`.
    pub target: u32,
    /// Points the peer has kept in its current turn.
    pub turn_score: u32,
}

impl ScoreMirror {
    /// Creates a mirror for a match played to `target`.
    pub fn new(target: u32) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    /// Updates the mirror from one inbound message.
    pub fn observe(&mut self, msg: &Message) {
        match msg {
            Message::Welcome { target, .. } => self.target = *target,
            Message::Banner {
                host_total,
                peer_total,
                target,
                ..
            } => {
                self.host_total = *host_total;
                self.peer_total = *peer_total;
                self.target = *target;
            }
            Message::Score { side, delta, total } => match side {
                Side::Host => self.host_total = *total,
                Side::Peer => {
                    self.peer_total = *total;
                    self.turn_score += delta;
                }
            },
            Message::Farkle { side: Side::Peer } | Message::Roll { side: Side::Host, .. } => {
                self.turn_score = 0;
            }
            _ => {}
        }
    }
}

/// Works out where to dial.
///
/// An explicit host address wins. Its port comes from the lobby id when
/// that decodes, else [`DEFAULT_PORT`]. Without an explicit host the
/// lobby id must decode.
///
/// # Errors
/// [`ProtocolError::InvalidLobbyId`](farkle_protocol::ProtocolError::InvalidLobbyId)
/// when the address has to come from an undecodable id.
pub fn resolve_join_addr(
    lobby_id: &str,
    explicit_host: Option<IpAddr>,
) -> Result<SocketAddr, FarkleError> {
    let decoded = lobby::decode(lobby_id);
    match explicit_host {
        Some(ip) => {
            let port = decoded.map(|addr| addr.port()).unwrap_or(DEFAULT_PORT);
            Ok(SocketAddr::new(ip, port))
        }
        None => Ok(SocketAddr::V4(decoded?)),
    }
}

/// Joins the host at `addr` and plays until the match ends.
///
/// # Errors
/// Dial and handshake failures are returned as errors. After `welcome`,
/// a lost connection or an unreadable message ends the match with
/// [`MatchOutcome::Disconnected`].
pub async fn join<D, S>(
    addr: SocketAddr,
    config: &SessionConfig,
    decisions: &mut D,
    out: &mut S,
) -> Result<MatchOutcome, FarkleError>
where
    D: DecisionSource,
    S: OutputSink,
{
    let conn = TcpConnection::connect(addr, config.dial_timeout).await?;
    let link = Link::new(conn, JsonCodec);
    link.send(&Message::Hello {
        name: config.player_name.clone(),
    })
    .await?;

    let welcome = match link.recv_opening(config.handshake_timeout).await {
        Ok(msg @ Message::Welcome { .. }) => msg,
        Ok(other) => {
            link.close().await;
            return Err(FarkleError::HandshakeFailed(format!(
                "expected welcome, got {}",
                other.kind()
            )));
        }
        Err(e) => {
            link.close().await;
            return Err(e);
        }
    };
    tracing::info!(%addr, "joined host");

    let mut mirror = ScoreMirror::default();
    mirror.observe(&welcome);
    if let Some(line) = narrate(Side::Peer, &welcome) {
        out.line(&line);
    }

    let outcome = match react(&link, &mut mirror, decisions, out).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(%addr, error = %e, "lost the host");
            out.line("Connection lost.");
            MatchOutcome::Disconnected
        }
    };
    if outcome != MatchOutcome::Quit {
        link.close().await;
    }
    tracing::info!(%outcome, "match over");
    Ok(outcome)
}

async fn react<D, S>(
    link: &Link<JsonCodec>,
    mirror: &mut ScoreMirror,
    decisions: &mut D,
    out: &mut S,
) -> Result<MatchOutcome, FarkleError>
where
    D: DecisionSource,
    S: OutputSink,
{
    let mut last_roll = Dice::new();
    loop {
        let Some(msg) = link.recv().await? else {
            return Err(FarkleError::ConnectionLost("host closed the connection".into()));
        };
        mirror.observe(&msg);
        if let Some(line) = narrate(Side::Peer, &msg) {
            out.line(&line);
        }

        match msg {
            Message::Roll {
                dice,
                side: Side::Peer,
            } => last_roll = dice,
            Message::YourTurn => match local_decision(&last_roll, mirror, decisions, out).await {
                Some((keep, decision)) => {
                    link.send(&Message::Action {
                        keep,
                        bank: decision.is_bank(),
                    })
                    .await?;
                }
                None => return Ok(MatchOutcome::Quit),
            },
            Message::GameOver { winner } => return Ok(MatchOutcome::for_winner(Side::Peer, winner)),
            _ => {}
        }
    }
}

/// Asks until the selection is valid for `roll`. `None` means quit.
async fn local_decision<D, S>(
    roll: &[u8],
    mirror: &ScoreMirror,
    decisions: &mut D,
    out: &mut S,
) -> Option<(Dice, Decision)>
where
    D: DecisionSource,
    S: OutputSink,
{
    loop {
        let prompt = DecisionPrompt {
            roll,
            turn_score: mirror.turn_score,
            own_total: mirror.peer_total,
            opponent_total: mirror.host_total,
            target: mirror.target,
        };
        let (dice, decision) = match decisions.decide(&prompt).await {
            Choice::Keep { dice, decision } => (dice, decision),
            Choice::Quit => return None,
        };
        match validate_selection(roll, &dice, score) {
            Ok(_) => return Some((dice, decision)),
            Err(MatchError::InvalidSelection(reason)) => {
                out.line(&format!("Invalid selection: {reason}"));
            }
            Err(e) => out.line(&e.to_string()),
        }
    }
}
