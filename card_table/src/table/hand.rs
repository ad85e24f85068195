//! Hand engine: starting a hand, applying actions, turn rotation and
//! settlement.
//!
//! Only a single betting street is modeled. There are no blinds, no
//! showdown and no side pots; a hand ends when every participant but one
//! has folded.

use log::{info, warn};

use super::{
    entities::{
        Chips, EventKind, Hand, Identity, PlayerAction, PlayerState, SeatIndex, Street, Table,
        TableStatus,
    },
    errors::{TableError, TableResult},
};

/// What a successful action did to the hand.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ActionOutcome {
    /// The hand goes on; `acting_seat_index` is `None` when nobody is left
    /// who can act.
    Continued { acting_seat_index: Option<SeatIndex> },
    /// Everyone else folded and the pot went to `winner_seat`.
    HandEnded { winner_seat: SeatIndex, pot: Chips },
}

impl Hand {
    /// Next seat to act after `current`, in ascending seat order, wrapping
    /// around. Folded and all-in participants are skipped, never removed.
    pub fn next_seat_in_hand(&self, current: SeatIndex) -> Option<SeatIndex> {
        let eligible = |seat: &SeatIndex| self.player(*seat).is_some_and(PlayerState::can_act);
        let seats = &self.players_in_hand;

        match seats.iter().position(|s| *s == current) {
            Some(pos) => (1..=seats.len())
                .map(|offset| seats[(pos + offset) % seats.len()])
                .find(eligible),
            None => seats.iter().copied().find(eligible),
        }
    }
}

impl Table {
    /// Deals every occupied seat into a new hand. Only the dealer may start
    /// one, and only from the lobby with at least two seated players.
    pub fn start_hand(&mut self, requester: &Identity) -> TableResult<()> {
        if self.dealer_user_id.as_deref() != Some(requester.user_id.as_str()) {
            return Err(TableError::NotAuthorized);
        }

        if self.status != TableStatus::Lobby {
            return Err(TableError::InvalidState(
                "A hand is already in progress.".to_string(),
            ));
        }

        let player_state: Vec<PlayerState> = self
            .seats
            .iter()
            .filter_map(|seat| {
                seat.user_id
                    .as_ref()
                    .map(|user_id| PlayerState::new(seat.seat_index, user_id.clone(), seat.chips))
            })
            .collect();

        if player_state.len() < 2 {
            return Err(TableError::InvalidState(
                "Need at least 2 seated players to start a hand.".to_string(),
            ));
        }

        let players_in_hand: Vec<SeatIndex> = player_state.iter().map(|p| p.seat_index).collect();

        self.hand_number += 1;
        self.status = TableStatus::InHand;
        self.hand = Some(Hand {
            street: Street::Preflop,
            community_cards: Vec::new(),
            pot: 0,
            current_bet: 0,
            min_raise_to: 0,
            acting_seat_index: players_in_hand.first().copied(),
            players_in_hand,
            player_state,
        });

        info!(
            "Table {}: hand #{} started by {}",
            self.id, self.hand_number, requester.user_id
        );
        self.bump(
            EventKind::HandStarted,
            format!(
                "Hand #{} started by {}",
                self.hand_number, requester.display_name
            ),
        );
        Ok(())
    }

    /// Validates and applies one betting action from `requester`.
    ///
    /// On error nothing is changed, including the version.
    pub fn apply_action(
        &mut self,
        requester: &Identity,
        action: &PlayerAction,
    ) -> TableResult<ActionOutcome> {
        if self.status != TableStatus::InHand {
            return Err(TableError::HandNotActive);
        }

        let seat_index = self
            .seat_of(&requester.user_id)
            .ok_or(TableError::NotSeated)?;
        let hand = self.hand.as_mut().ok_or(TableError::HandNotActive)?;

        if hand.acting_seat_index != Some(seat_index) {
            return Err(TableError::NotYourTurn);
        }

        let current_bet = hand.current_bet;
        // The seat may have changed hands since the deal.
        let player = match hand.player_mut(seat_index) {
            Some(p) if p.in_hand && p.user_id == requester.user_id => p,
            _ => {
                return Err(TableError::InvalidAction(
                    "You are not in this hand.".to_string(),
                ));
            }
        };
        if player.has_folded {
            return Err(TableError::InvalidAction(
                "You have already folded.".to_string(),
            ));
        }

        let to_call = current_bet.saturating_sub(player.bet_this_street);

        let (moved, street_bet) = match action {
            PlayerAction::Fold => {
                player.has_folded = true;
                (0, None)
            }
            PlayerAction::Check => {
                if to_call > 0 {
                    return Err(TableError::InvalidAction(
                        "cannot check facing a bet".to_string(),
                    ));
                }
                (0, None)
            }
            PlayerAction::Call => (player.commit(to_call), None),
            PlayerAction::Bet(amount) | PlayerAction::Raise(amount) => {
                let amount = amount.ok_or(TableError::InvalidAmount)?;
                let moved = player.commit(amount);
                (moved, Some(player.bet_this_street))
            }
            PlayerAction::Unknown(_) => {
                return Err(TableError::InvalidAction("unknown action".to_string()));
            }
        };

        hand.pot += moved;
        if let Some(street_bet) = street_bet
            && street_bet > hand.current_bet
        {
            hand.min_raise_to = street_bet.saturating_add(street_bet - hand.current_bet);
            hand.current_bet = street_bet;
        }

        let active: Vec<SeatIndex> = hand.active_players().map(|p| p.seat_index).collect();
        if let [winner_seat] = active[..] {
            let seat = &self.seats[winner_seat];
            let winner_name = hand
                .player(winner_seat)
                .filter(|p| seat.is_held_by(&p.user_id))
                .and_then(|_| seat.display_name.clone())
                .unwrap_or_else(|| format!("Seat {winner_seat}"));

            let pot = self.settle(winner_seat);
            info!(
                "Table {}: hand #{} won by seat {} ({} chips)",
                self.id, self.hand_number, winner_seat, pot
            );
            self.bump(
                EventKind::HandEnded,
                format!("{} {}; {} wins {}", requester.display_name, action, winner_name, pot),
            );
            return Ok(ActionOutcome::HandEnded { winner_seat, pot });
        }

        let acting_seat_index = hand.next_seat_in_hand(seat_index);
        hand.acting_seat_index = acting_seat_index;

        self.bump(
            EventKind::PlayerActed,
            format!("{} {}", requester.display_name, action),
        );
        Ok(ActionOutcome::Continued { acting_seat_index })
    }

    /// Closes the hand: writes every participant's remaining stack back to
    /// their seat, gives the winner the pot and returns the table to the
    /// lobby. Returns the pot awarded.
    fn settle(&mut self, winner_seat: SeatIndex) -> Chips {
        let Some(hand) = self.hand.take() else {
            return 0;
        };

        for player in &hand.player_state {
            let credit = if player.seat_index == winner_seat {
                player.stack + hand.pot
            } else {
                player.stack
            };

            let seat = &mut self.seats[player.seat_index];
            if seat.is_held_by(&player.user_id) {
                seat.chips = credit;
            } else {
                warn!(
                    "Table {}: seat {} changed hands mid-hand, {} chips not credited",
                    self.id, player.seat_index, credit
                );
            }
        }

        self.status = TableStatus::Lobby;
        hand.pot
    }
}
