//! Human-readable lines for protocol events.

use farkle_protocol::{Message, Side};

/// Describes `msg` as seen from `perspective`.
///
/// Returns `None` for messages that have nothing to show, such as the
/// handshake's `hello` or a bare `your_turn`.
///
/// ```rust
/// use farkle::narrate;
/// use farkle_protocol::{Message, Side};
///
/// let msg = Message::Score { side: Side::Peer, delta: 400, total: 400 };
/// assert_eq!(narrate(Side::Peer, &msg).as_deref(), Some("You scored 400 (total 400)"));
/// assert_eq!(narrate(Side::Host, &msg).as_deref(), Some("Peer scored 400 (total 400)"));
/// ```
pub fn narrate(perspective: Side, msg: &Message) -> Option<String> {
    let who = |side: Side| {
        if side == perspective {
            "You".to_string()
        } else {
            side.to_string()
        }
    };

    let line = match msg {
        Message::Welcome { target, .. } => format!("Connected! Target score: {target}"),
        Message::Banner {
            round,
            host_total,
            peer_total,
            target,
        } => {
            let rule = "=".repeat(24);
            format!(
                "\n{rule}\n ROUND {round} - First to {target}\n{rule}\nScoreboard: {}: {host_total} | {}: {peer_total}",
                who(Side::Host),
                who(Side::Peer),
            )
        }
        Message::Roll { dice, side } => {
            let faces: Vec<String> = dice.iter().map(|d| format!("[{d}]")).collect();
            format!("{} rolled: {}", who(*side), faces.join(" "))
        }
        Message::Farkle { side } if *side == perspective => {
            "Farkle! You scored 0 this turn.".to_string()
        }
        Message::Farkle { side } => format!("{side} Farkled."),
        Message::Score { side, delta, total } => {
            format!("{} scored {delta} (total {total})", who(*side))
        }
        Message::Hot { side } if *side == perspective => "Hot dice!".to_string(),
        Message::Hot { side } => format!("{side} got hot dice!"),
        Message::GameOver { winner } if *winner == perspective => "You win!".to_string(),
        Message::GameOver { winner } => format!("{winner} wins."),
        Message::Hello { .. } | Message::YourTurn | Message::Action { .. } | Message::Unknown => {
            return None;
        }
    };
    Some(line)
}
