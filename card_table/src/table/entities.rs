//! Table, seat and hand records.
//!
//! These types are the authoritative in-memory state of a table. Everything
//! here is owned by exactly one [`TableActor`](super::TableActor); the public
//! view handed to subscribers is the flat [`TableSnapshot`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::config::{MAX_STARTING_STACK, TableConfig};

pub type TableId = String;
pub type UserId = String;
pub type SeatIndex = usize;
pub type Chips = u64;

/// Authenticated user as resolved by the session layer.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: UserId,
    pub display_name: String,
}

impl Identity {
    pub fn new(user_id: impl Into<UserId>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Outer lifecycle of a table.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableStatus {
    Lobby,
    InHand,
}

/// Betting phase. Only `Preflop` is ever reached; the later streets exist
/// in the vocabulary for clients.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Street {
    #[default]
    None,
    Preflop,
    Flop,
    Turn,
    River,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub seat_index: SeatIndex,
    pub user_id: Option<UserId>,
    pub display_name: Option<String>,
    pub chips: Chips,
    pub is_connected: bool,
    pub is_sitting_out: bool,
}

impl Seat {
    pub fn empty(seat_index: SeatIndex) -> Self {
        Self {
            seat_index,
            user_id: None,
            display_name: None,
            chips: 0,
            is_connected: false,
            is_sitting_out: false,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn is_held_by(&self, user_id: &str) -> bool {
        self.user_id.as_deref() == Some(user_id)
    }

    pub(super) fn clear(&mut self) {
        *self = Self::empty(self.seat_index);
    }
}

/// Per-participant betting state for the current hand.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub seat_index: SeatIndex,
    /// Occupant of the seat when the hand started. Settlement only credits
    /// the seat if the same user still holds it.
    pub user_id: UserId,
    pub in_hand: bool,
    pub has_folded: bool,
    pub is_all_in: bool,
    pub stack: Chips,
    pub bet_this_street: Chips,
    pub bet_this_hand: Chips,
}

impl PlayerState {
    pub fn new(seat_index: SeatIndex, user_id: UserId, stack: Chips) -> Self {
        Self {
            seat_index,
            user_id,
            in_hand: true,
            has_folded: false,
            is_all_in: false,
            stack,
            bet_this_street: 0,
            bet_this_hand: 0,
        }
    }

    /// Still contesting the pot.
    pub fn is_active(&self) -> bool {
        self.in_hand && !self.has_folded
    }

    /// Eligible to be given the turn.
    pub fn can_act(&self) -> bool {
        self.is_active() && !self.is_all_in
    }

    /// Moves up to `amount` chips from the stack into this street's bet and
    /// returns how many actually moved.
    pub(super) fn commit(&mut self, amount: Chips) -> Chips {
        let moved = amount.min(self.stack);
        self.stack -= moved;
        self.bet_this_street += moved;
        self.bet_this_hand += moved;
        if self.stack == 0 {
            self.is_all_in = true;
        }
        moved
    }
}

/// State of the hand in progress. Exists only while the table is
/// [`TableStatus::InHand`].
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hand {
    pub street: Street,
    pub community_cards: Vec<String>,
    pub pot: Chips,
    pub current_bet: Chips,
    pub min_raise_to: Chips,
    pub acting_seat_index: Option<SeatIndex>,
    /// Sorted seat indices of the participants, fixed for the whole hand.
    pub players_in_hand: Vec<SeatIndex>,
    pub player_state: Vec<PlayerState>,
}

impl Hand {
    pub fn player(&self, seat_index: SeatIndex) -> Option<&PlayerState> {
        self.player_state.iter().find(|p| p.seat_index == seat_index)
    }

    pub(super) fn player_mut(&mut self, seat_index: SeatIndex) -> Option<&mut PlayerState> {
        self.player_state
            .iter_mut()
            .find(|p| p.seat_index == seat_index)
    }

    pub fn active_players(&self) -> impl Iterator<Item = &PlayerState> {
        self.player_state.iter().filter(|p| p.is_active())
    }
}

/// Kind of the last externally visible mutation.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    PlayerJoinedTable,
    PlayerLeftTable,
    PlayerTookSeat,
    PlayerLeftSeat,
    PlayerDisconnected,
    HandStarted,
    PlayerActed,
    HandEnded,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::PlayerJoinedTable => "PLAYER_JOINED_TABLE",
            Self::PlayerLeftTable => "PLAYER_LEFT_TABLE",
            Self::PlayerTookSeat => "PLAYER_TOOK_SEAT",
            Self::PlayerLeftSeat => "PLAYER_LEFT_SEAT",
            Self::PlayerDisconnected => "PLAYER_DISCONNECTED",
            Self::HandStarted => "HAND_STARTED",
            Self::PlayerActed => "PLAYER_ACTED",
            Self::HandEnded => "HAND_ENDED",
        };
        write!(f, "{repr}")
    }
}

/// Audit record attached to every mutation.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableEvent {
    pub event_id: String,
    pub at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub summary: String,
}

/// A betting action as submitted by a player.
///
/// `Bet`/`Raise` carry the number of chips to add with this action, not a
/// raise-to target. `None` means the request had no usable positive amount.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PlayerAction {
    Fold,
    Check,
    Call,
    Bet(Option<Chips>),
    Raise(Option<Chips>),
    Unknown(String),
}

impl PlayerAction {
    /// Builds an action from its wire name (case-insensitive) and an
    /// optional raw amount.
    pub fn parse(name: &str, amount: Option<&serde_json::Value>) -> Self {
        let amount = amount.and_then(|v| v.as_u64()).filter(|a| *a > 0);
        match name.to_ascii_uppercase().as_str() {
            "FOLD" => Self::Fold,
            "CHECK" => Self::Check,
            "CALL" => Self::Call,
            "BET" => Self::Bet(amount),
            "RAISE" => Self::Raise(amount),
            _ => Self::Unknown(name.to_string()),
        }
    }
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fold => write!(f, "folds"),
            Self::Check => write!(f, "checks"),
            Self::Call => write!(f, "calls"),
            Self::Bet(Some(amount)) => write!(f, "bets {amount}"),
            Self::Bet(None) => write!(f, "bets"),
            Self::Raise(Some(amount)) => write!(f, "raises {amount}"),
            Self::Raise(None) => write!(f, "raises"),
            Self::Unknown(name) => write!(f, "tries {name}"),
        }
    }
}

/// The authoritative state of one table.
#[derive(Clone, Debug)]
pub struct Table {
    pub id: TableId,
    pub name: String,
    pub max_seats: usize,
    pub starting_stack: Chips,
    pub created_at: DateTime<Utc>,
    pub status: TableStatus,
    /// First user ever seated. Never reassigned.
    pub dealer_user_id: Option<UserId>,
    pub hand_number: u64,
    pub seats: Vec<Seat>,
    pub hand: Option<Hand>,
    pub last_event: Option<TableEvent>,
    pub version: u64,
}

impl Table {
    pub fn new(id: impl Into<TableId>, config: &TableConfig) -> Self {
        Self {
            id: id.into(),
            name: config.name.clone(),
            max_seats: config.max_seats,
            starting_stack: config.starting_stack.min(MAX_STARTING_STACK),
            created_at: Utc::now(),
            status: TableStatus::Lobby,
            dealer_user_id: None,
            hand_number: 0,
            seats: (0..config.max_seats).map(Seat::empty).collect(),
            hand: None,
            last_event: None,
            version: 1,
        }
    }

    pub fn seat_of(&self, user_id: &str) -> Option<SeatIndex> {
        self.seats.iter().position(|s| s.is_held_by(user_id))
    }

    pub fn occupied_seat_count(&self) -> usize {
        self.seats.iter().filter(|s| s.is_occupied()).count()
    }

    /// Public view of the table, safe to send to every subscriber.
    pub fn snapshot(&self) -> TableSnapshot {
        let hand = self.hand.as_ref();
        TableSnapshot {
            table_id: self.id.clone(),
            name: self.name.clone(),
            status: self.status,
            max_seats: self.max_seats,
            created_at: self.created_at,
            dealer_user_id: self.dealer_user_id.clone(),
            hand_number: self.hand_number,
            seats: self.seats.clone(),
            street: hand.map_or(Street::None, |h| h.street),
            community_cards: hand.map(|h| h.community_cards.clone()).unwrap_or_default(),
            pot: hand.map_or(0, |h| h.pot),
            current_bet: hand.map_or(0, |h| h.current_bet),
            min_raise_to: hand.map_or(0, |h| h.min_raise_to),
            acting_seat_index: hand.and_then(|h| h.acting_seat_index),
            players_in_hand: hand.map(|h| h.players_in_hand.clone()).unwrap_or_default(),
            player_state: hand.map(|h| h.player_state.clone()).unwrap_or_default(),
            last_event: self.last_event.clone(),
            version: self.version,
        }
    }
}

/// Flat public state broadcast in `STATE` messages.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSnapshot {
    pub table_id: TableId,
    pub name: String,
    pub status: TableStatus,
    pub max_seats: usize,
    pub created_at: DateTime<Utc>,
    pub dealer_user_id: Option<UserId>,
    pub hand_number: u64,
    pub seats: Vec<Seat>,
    pub street: Street,
    pub community_cards: Vec<String>,
    pub pot: Chips,
    pub current_bet: Chips,
    pub min_raise_to: Chips,
    pub acting_seat_index: Option<SeatIndex>,
    pub players_in_hand: Vec<SeatIndex>,
    pub player_state: Vec<PlayerState>,
    pub last_event: Option<TableEvent>,
    pub version: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_table_has_empty_seats() {
        let table = Table::new("t1", &TableConfig::default());
        assert_eq!(table.seats.len(), 6);
        assert!(table.seats.iter().all(|s| !s.is_occupied()));
        assert_eq!(table.status, TableStatus::Lobby);
        assert_eq!(table.version, 1);
        assert!(table.hand.is_none());
    }

    #[test]
    fn test_snapshot_uses_client_field_names() {
        let table = Table::new("t1", &TableConfig::default());
        let value = serde_json::to_value(table.snapshot()).unwrap();

        assert_eq!(value["tableId"], "t1");
        assert_eq!(value["status"], "LOBBY");
        assert_eq!(value["street"], "NONE");
        assert_eq!(value["maxSeats"], 6);
        assert_eq!(value["actingSeatIndex"], serde_json::Value::Null);
        assert_eq!(value["seats"][0]["seatIndex"], 0);
        assert_eq!(value["seats"][0]["isConnected"], false);
        assert_eq!(value["playerState"], json!([]));
    }

    #[test]
    fn test_event_kind_serializes_as_type() {
        let event = TableEvent {
            event_id: "evt_00000000".to_string(),
            at: Utc::now(),
            kind: EventKind::PlayerTookSeat,
            summary: "alice took seat 0".to_string(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "PLAYER_TOOK_SEAT");
        assert_eq!(value["eventId"], "evt_00000000");
        assert_eq!(EventKind::PlayerTookSeat.to_string(), "PLAYER_TOOK_SEAT");
    }

    #[test]
    fn test_player_action_parse() {
        assert_eq!(PlayerAction::parse("fold", None), PlayerAction::Fold);
        assert_eq!(PlayerAction::parse("CHECK", None), PlayerAction::Check);
        assert_eq!(
            PlayerAction::parse("BET", Some(&json!(100))),
            PlayerAction::Bet(Some(100))
        );
        assert_eq!(
            PlayerAction::parse("RAISE", Some(&json!(0))),
            PlayerAction::Raise(None)
        );
        assert_eq!(
            PlayerAction::parse("BET", Some(&json!(12.5))),
            PlayerAction::Bet(None)
        );
        assert_eq!(
            PlayerAction::parse("BET", Some(&json!("100"))),
            PlayerAction::Bet(None)
        );
        assert_eq!(
            PlayerAction::parse("ALL_IN", None),
            PlayerAction::Unknown("ALL_IN".to_string())
        );
    }

    #[test]
    fn test_commit_caps_at_stack() {
        let mut player = PlayerState::new(0, "u".to_string(), 50);
        assert_eq!(player.commit(80), 50);
        assert_eq!(player.stack, 0);
        assert!(player.is_all_in);
        assert!(player.is_active());
        assert!(!player.can_act());
        assert_eq!(player.bet_this_street, 50);
        assert_eq!(player.bet_this_hand, 50);
    }
}
