//! Seat lifecycle: taking and leaving seats, connection status.

use super::{
    entities::{EventKind, Identity, Table},
    errors::{TableError, TableResult},
};

impl Table {
    /// Seats `user` at `seat_index` with the table's starting stack.
    ///
    /// The first user ever seated becomes the dealer for the lifetime of the
    /// table.
    pub fn take_seat(&mut self, user: &Identity, seat_index: i64) -> TableResult<()> {
        let index = usize::try_from(seat_index)
            .ok()
            .filter(|i| *i < self.max_seats)
            .ok_or(TableError::SeatOutOfRange(seat_index))?;

        if self.seat_of(&user.user_id).is_some() {
            return Err(TableError::AlreadySeated);
        }

        let starting_stack = self.starting_stack;
        let seat = &mut self.seats[index];
        if seat.is_occupied() {
            return Err(TableError::SeatTaken);
        }

        seat.user_id = Some(user.user_id.clone());
        seat.display_name = Some(user.display_name.clone());
        seat.chips = starting_stack;
        seat.is_connected = true;
        seat.is_sitting_out = false;

        if self.dealer_user_id.is_none() {
            self.dealer_user_id = Some(user.user_id.clone());
        }

        self.bump(
            EventKind::PlayerTookSeat,
            format!("{} took seat {}", user.display_name, index),
        );
        Ok(())
    }

    /// Clears the user's seat. A hand in progress keeps the seat in its
    /// participant list.
    pub fn leave_seat(&mut self, user: &Identity) -> TableResult<()> {
        let index = self.seat_of(&user.user_id).ok_or(TableError::NotSeated)?;
        self.seats[index].clear();
        self.bump(
            EventKind::PlayerLeftSeat,
            format!("{} left their seat", user.display_name),
        );
        Ok(())
    }

    /// Flips the connected flag on the user's seat, if any. Only the
    /// disconnect direction is an event. Returns whether the user is seated.
    pub fn mark_connected(&mut self, user: &Identity, connected: bool) -> bool {
        let Some(index) = self.seat_of(&user.user_id) else {
            return false;
        };

        let seat = &mut self.seats[index];
        seat.is_connected = connected;
        if !connected {
            let name = seat.display_name.clone().unwrap_or_else(|| user.display_name.clone());
            self.bump(
                EventKind::PlayerDisconnected,
                format!("{name} disconnected"),
            );
        }
        true
    }

    /// A connection started watching the table.
    pub fn join(&mut self, user: &Identity) {
        self.mark_connected(user, true);
        self.bump(
            EventKind::PlayerJoinedTable,
            format!("{} joined table", user.display_name),
        );
    }

    /// A connection stopped watching the table. Seats are untouched.
    pub fn leave(&mut self, user: &Identity) {
        self.bump(
            EventKind::PlayerLeftTable,
            format!("{} left table", user.display_name),
        );
    }
}
