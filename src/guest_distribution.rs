// Guest/room distribution
// Splits a party across rooms for the hotel-search API's `guests` parameter

use std::fmt;
use thiserror::Error;
use tracing::trace;

// Wire delimiter between per-room guest counts
pub const OCCUPANCY_DELIMITER: char = '|';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DistributionError {
    #[error("Invalid quantity: guests ({guests}) and rooms ({rooms}) must both be positive")]
    InvalidQuantity { guests: u32, rooms: u32 },

    #[error("Insufficient guests: {guests} guests cannot fill {rooms} rooms")]
    InsufficientGuests { guests: u32, rooms: u32 },
}

// Per-room occupancy, in room order.
// Every room holds `guests / rooms` or `guests / rooms + 1` guests, and the
// rooms holding the extra guest are exactly the first `guests % rooms`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestRoomAllocation {
    rooms: Vec<u32>,
}

impl GuestRoomAllocation {
    pub fn rooms(&self) -> &[u32] {
        &self.rooms
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn total_guests(&self) -> u32 {
        self.rooms.iter().sum()
    }
}

impl fmt::Display for GuestRoomAllocation {
    // A single room renders as the bare number
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, count) in self.rooms.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", OCCUPANCY_DELIMITER)?;
            }
            write!(f, "{}", count)?;
        }
        Ok(())
    }
}

// Same result as handing guest i to room i % rooms, without walking every guest
pub fn allocate(guests: u32, rooms: u32) -> Result<GuestRoomAllocation, DistributionError> {
    if guests == 0 || rooms == 0 {
        return Err(DistributionError::InvalidQuantity { guests, rooms });
    }
    if guests < rooms {
        return Err(DistributionError::InsufficientGuests { guests, rooms });
    }

    let base = guests / rooms;
    let extra = (guests % rooms) as usize;
    let mut counts = vec![base; rooms as usize];
    for count in counts.iter_mut().take(extra) {
        *count += 1;
    }

    trace!(guests, rooms, ?counts, "allocated guests to rooms");
    Ok(GuestRoomAllocation { rooms: counts })
}

// Occupancy string for the API, e.g. "3|2|2"
pub fn distribute(guests: u32, rooms: u32) -> Result<String, DistributionError> {
    allocate(guests, rooms).map(|allocation| allocation.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{thread_rng, Rng};
    use std::time::{Duration, Instant};
    use test_case::test_case;

    #[test_case(4, 2, "2|2"; "#1 even split")]
    #[test_case(5, 2, "3|2"; "#2 remainder goes to first room")]
    #[test_case(7, 3, "3|2|2"; "#3 three rooms")]
    #[test_case(6, 1, "6"; "#4 single room is a bare number")]
    #[test_case(1, 1, "1"; "#5 one guest one room")]
    #[test_case(3, 3, "1|1|1"; "#6 one guest per room")]
    #[test_case(11, 4, "3|3|3|2"; "#7 several remainder rooms")]
    fn test_distribute(guests: u32, rooms: u32, expected: &str) {
        assert_eq!(distribute(guests, rooms).unwrap(), expected);
    }

    #[test_case(0, 2; "#1 no guests")]
    #[test_case(2, 0; "#2 no rooms")]
    #[test_case(0, 0; "#3 nothing at all")]
    fn test_invalid_quantity(guests: u32, rooms: u32) {
        assert_eq!(
            distribute(guests, rooms),
            Err(DistributionError::InvalidQuantity { guests, rooms })
        );
    }

    #[test]
    fn test_insufficient_guests() {
        let err = distribute(2, 3).unwrap_err();
        assert_eq!(
            err,
            DistributionError::InsufficientGuests {
                guests: 2,
                rooms: 3
            }
        );
        assert_eq!(
            err.to_string(),
            "Insufficient guests: 2 guests cannot fill 3 rooms"
        );
    }

    #[test]
    fn test_allocation_is_balanced_for_random_inputs() {
        let mut rng = thread_rng();

        for _ in 0..500 {
            let rooms = rng.gen_range(1..=20u32);
            let guests = rng.gen_range(rooms..=200u32);

            let allocation = allocate(guests, rooms).unwrap();
            assert_eq!(allocation.room_count(), rooms as usize);
            assert_eq!(allocation.total_guests(), guests);

            let base = guests / rooms;
            let extra = (guests % rooms) as usize;
            for (i, count) in allocation.rooms().iter().enumerate() {
                let expected = if i < extra { base + 1 } else { base };
                assert_eq!(*count, expected, "room {} of {}/{}", i, guests, rooms);
            }
        }
    }

    #[test]
    fn test_matches_round_robin_assignment() {
        for rooms in 1..=12u32 {
            for guests in rooms..=60u32 {
                let mut round_robin = vec![0u32; rooms as usize];
                for guest in 0..guests {
                    round_robin[(guest % rooms) as usize] += 1;
                }
                assert_eq!(allocate(guests, rooms).unwrap().rooms(), &round_robin[..]);
            }
        }
    }

    #[test]
    fn test_huge_party_is_not_walked_guest_by_guest() {
        let started = Instant::now();

        assert_eq!(distribute(u32::MAX, 1).unwrap(), u32::MAX.to_string());
        assert_eq!(
            distribute(u32::MAX, 2).unwrap(),
            format!("{}|{}", u32::MAX / 2 + 1, u32::MAX / 2)
        );

        assert!(
            started.elapsed() < Duration::from_secs(1),
            "distribution took {:?}",
            started.elapsed()
        );
    }

    #[test]
    fn test_occupancy_string_has_no_stray_delimiters() {
        for rooms in 1..=8u32 {
            let occupancy = distribute(rooms * 2 + 1, rooms).unwrap();
            assert!(!occupancy.starts_with(OCCUPANCY_DELIMITER));
            assert!(!occupancy.ends_with(OCCUPANCY_DELIMITER));
            assert_eq!(
                occupancy.split(OCCUPANCY_DELIMITER).count(),
                rooms as usize
            );
            assert!(occupancy
                .split(OCCUPANCY_DELIMITER)
                .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())));
        }
    }
}
