//! The host side of a session.
//!
//! The host accepts one peer, runs the handshake and then drives the
//! [`TurnMachine`]. Messages for the peer go through an [`Outbox`] so the
//! authoritative loop can keep asking the local player for decisions
//! while earlier notifications are still being written.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::sync::Arc;

use farkle_match::{Decision, MatchConfig, MatchError, Phase, ScoringOracle, TurnMachine};
use farkle_protocol::{JsonCodec, Message, Side, lobby};
use farkle_transport::{TcpTransport, Transport, TransportError};

use crate::io::{Choice, DecisionPrompt, DecisionSource, OutputSink};
use crate::link::Link;
use crate::outbox::Outbox;
use crate::{FarkleError, MatchOutcome, SessionConfig, narrate};

/// A bound host waiting for its peer.
pub struct HostSession {
    transport: TcpTransport,
    local_addr: SocketAddr,
    config: SessionConfig,
    match_config: MatchConfig,
}

impl HostSession {
    /// Binds the listener on `config.bind_addr`.
    pub async fn bind(
        config: SessionConfig,
        match_config: MatchConfig,
    ) -> Result<Self, FarkleError> {
        let transport = TcpTransport::bind(&config.bind_addr).await?;
        let local_addr = transport.local_addr().map_err(TransportError::AcceptFailed)?;
        Ok(Self {
            transport,
            local_addr,
            config,
            match_config,
        })
    }

    /// Returns the address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The winning score this host plays to.
    pub fn match_config(&self) -> &MatchConfig {
        &self.match_config
    }

    /// Builds the lobby id to share with the peer.
    ///
    /// `advertised` is an externally reachable address, such as one
    /// handed out by a port-mapping service. Without it the id carries
    /// this machine's outbound IPv4 and the bound port.
    pub fn lobby_id(&self, advertised: Option<SocketAddr>) -> String {
        match advertised {
            Some(addr) => lobby::encode(&addr.ip().to_string(), addr.port()),
            None => {
                let port = self.local_addr.port();
                lobby::encode_addr(SocketAddrV4::new(outbound_ipv4(), port))
            }
        }
    }

    /// Accepts one peer and plays the match to the end.
    ///
    /// The listener closes as soon as the peer is accepted, so later
    /// dials are refused.
    ///
    /// # Errors
    /// Accept and handshake failures are returned as errors. Once the
    /// match has started, a failure ends it with
    /// [`MatchOutcome::Disconnected`] instead.
    pub async fn run<O, D, S>(
        self,
        oracle: O,
        decisions: &mut D,
        out: &mut S,
    ) -> Result<MatchOutcome, FarkleError>
    where
        O: ScoringOracle,
        D: DecisionSource,
        S: OutputSink,
    {
        let Self {
            mut transport,
            config,
            match_config,
            ..
        } = self;
        let conn = transport.accept().await?;
        drop(transport);
        let link = Link::new(conn, JsonCodec);
        let peer_addr = link.connection().peer_addr();

        let name = match link.recv_opening(config.handshake_timeout).await {
            Ok(Message::Hello { name }) => name,
            Ok(other) => {
                link.close().await;
                return Err(FarkleError::HandshakeFailed(format!(
                    "expected hello, got {}",
                    other.kind()
                )));
            }
            Err(e) => {
                link.close().await;
                return Err(e);
            }
        };
        tracing::info!(%peer_addr, %name, "peer joined");

        let target = match_config.target();
        link.send(&Message::Welcome {
            target,
            seat: Side::Peer,
        })
        .await?;
        out.line("Opponent connected!");

        let link = Arc::new(link);
        let outbox = Outbox::spawn(Arc::clone(&link), config.outbound_capacity);
        let mut machine = TurnMachine::new(match_config, oracle);

        let result = drive(&mut machine, &link, &outbox, decisions, out).await;
        if let Ok(MatchOutcome::Quit) = result {
            tracing::info!("host quit");
            return Ok(MatchOutcome::Quit);
        }

        let drained = outbox.finish().await;
        link.close().await;

        let outcome = match result {
            Ok(outcome) => {
                if let Err(e) = drained {
                    tracing::warn!(%peer_addr, error = %e, "final messages not delivered");
                }
                outcome
            }
            Err(e) => {
                tracing::warn!(%peer_addr, error = %e, "match ended abnormally");
                out.line("Peer disconnected.");
                MatchOutcome::Disconnected
            }
        };
        tracing::info!(%outcome, "match over");
        Ok(outcome)
    }
}

/// Steps the machine until the match is over or the host quits.
async fn drive<O, D, S>(
    machine: &mut TurnMachine<O>,
    link: &Link<JsonCodec>,
    outbox: &Outbox,
    decisions: &mut D,
    out: &mut S,
) -> Result<MatchOutcome, FarkleError>
where
    O: ScoringOracle,
    D: DecisionSource,
    S: OutputSink,
{
    loop {
        let events = match machine.phase() {
            Phase::RoundStart | Phase::RollPending(_) => machine.roll()?,
            Phase::AwaitingDecision(Side::Host) => {
                match host_decision(machine, decisions, out).await? {
                    Some(events) => events,
                    None => return Ok(MatchOutcome::Quit),
                }
            }
            Phase::AwaitingDecision(Side::Peer) => peer_decision(machine, link, outbox).await?,
            Phase::MatchOver(winner) => return Ok(MatchOutcome::for_winner(Side::Host, winner)),
        };
        publish(events, outbox, out).await?;
    }
}

/// Asks the local player until they give a valid selection. `None` means quit.
async fn host_decision<O, D, S>(
    machine: &mut TurnMachine<O>,
    decisions: &mut D,
    out: &mut S,
) -> Result<Option<Vec<Message>>, FarkleError>
where
    O: ScoringOracle,
    D: DecisionSource,
    S: OutputSink,
{
    loop {
        let state = machine.state();
        let prompt = DecisionPrompt {
            roll: machine.last_roll(),
            turn_score: state.turn.turn_score,
            own_total: state.host_total,
            opponent_total: state.peer_total,
            target: machine.config().target(),
        };
        let (dice, decision) = match decisions.decide(&prompt).await {
            Choice::Keep { dice, decision } => (dice, decision),
            Choice::Quit => return Ok(None),
        };

        match machine.apply(Side::Host, &dice, decision) {
            Ok(events) => return Ok(Some(events)),
            Err(MatchError::InvalidSelection(reason)) => {
                out.line(&format!("Invalid selection: {reason}"));
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Hands the decision to the peer and applies its `action`.
async fn peer_decision<O: ScoringOracle>(
    machine: &mut TurnMachine<O>,
    link: &Link<JsonCodec>,
    outbox: &Outbox,
) -> Result<Vec<Message>, FarkleError> {
    outbox.push(Message::YourTurn).await?;

    match link.recv().await? {
        Some(Message::Action { keep, bank }) => machine
            .apply(Side::Peer, &keep, Decision::from_bank(bank))
            .map_err(|e| {
                tracing::warn!(?keep, error = %e, "rejected peer action");
                FarkleError::ProtocolViolation(e.to_string())
            }),
        Some(other) => Err(FarkleError::ProtocolViolation(format!(
            "expected action, got {}",
            other.kind()
        ))),
        None => Err(FarkleError::ConnectionLost("peer closed the connection".into())),
    }
}

/// Shows each event locally and queues it for the peer, in order.
async fn publish<S: OutputSink>(
    events: Vec<Message>,
    outbox: &Outbox,
    out: &mut S,
) -> Result<(), FarkleError> {
    for msg in events {
        if let Some(line) = narrate(Side::Host, &msg) {
            out.line(&line);
        }
        outbox.push(msg).await?;
    }
    Ok(())
}

/// Returns the IPv4 address this machine would use to reach the internet.
///
/// Connecting a UDP socket only picks a route; no packet is sent. Falls
/// back to `127.0.0.1` when there is no route.
pub fn outbound_ipv4() -> Ipv4Addr {
    let probe = || -> std::io::Result<SocketAddr> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        socket.connect((Ipv4Addr::new(192, 0, 2, 1), 9))?;
        socket.local_addr()
    };
    match probe() {
        Ok(SocketAddr::V4(addr)) if !addr.ip().is_unspecified() => *addr.ip(),
        _ => Ipv4Addr::LOCALHOST,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outbound_ipv4_is_usable() {
        assert!(!outbound_ipv4().is_unspecified());
    }

    #[tokio::test]
    async fn test_lobby_id_uses_advertised_address() {
        let config = SessionConfig {
            bind_addr: "127.0.0.1:0".into(),
            ..SessionConfig::default()
        };
        let host = HostSession::bind(config, MatchConfig::default()).await.unwrap();

        let advertised: SocketAddr = "203.0.113.7:40000".parse().unwrap();
        let id = host.lobby_id(Some(advertised));
        assert_eq!(lobby::decode(&id).unwrap().to_string(), "203.0.113.7:40000");

        let local = lobby::decode(&host.lobby_id(None)).unwrap();
        assert_eq!(local.port(), host.local_addr().port());
    }
}
