//! Loco state and the throttle roster
//!
//! The domain state this throttle manipulates: per-loco speed, direction,
//! and latching function bits, plus the fixed roster slab that maps DCC
//! addresses to state slots. Rendering and roster persistence live with
//! the excluded UI layer.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Roster capacity, same as the station's loco limit
pub const MAX_LOCOS: usize = 50;

/// Decoder functions F0-F28
pub const FUNCTION_COUNT: u8 = 29;

/// Top of the 128-step speed range
pub const MAX_SPEED: u8 = 127;

/// Direction of travel, encoded on the wire as 0/1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    Reverse,
    #[default]
    Forward,
}

impl Direction {
    /// Wire encoding: 0 = reverse, 1 = forward
    pub fn wire(self) -> u8 {
        match self {
            Direction::Reverse => 0,
            Direction::Forward => 1,
        }
    }

    /// The other direction
    pub fn opposite(self) -> Self {
        match self {
            Direction::Reverse => Direction::Forward,
            Direction::Forward => Direction::Reverse,
        }
    }
}

/// State of one loco held by this throttle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LocoState {
    /// DCC address; 0 marks a free roster slot
    pub address: u16,
    /// Latching function states, one bit per function
    pub functions: u32,
    /// Current speed, 0..=MAX_SPEED
    pub speed: u8,
    /// Current direction
    pub direction: Direction,
}

impl LocoState {
    /// A free slot
    pub const EMPTY: Self = Self {
        address: 0,
        functions: 0,
        speed: 0,
        direction: Direction::Forward,
    };

    /// Whether this slot is unoccupied
    pub fn is_free(&self) -> bool {
        self.address == 0
    }

    /// Increase speed one step, clamped at [`MAX_SPEED`]
    pub fn faster(&mut self) -> u8 {
        if self.speed < MAX_SPEED {
            self.speed += 1;
        }
        self.speed
    }

    /// Decrease speed one step, clamped at zero
    pub fn slower(&mut self) -> u8 {
        if self.speed > 0 {
            self.speed -= 1;
        }
        self.speed
    }

    /// Reverse the direction of travel
    pub fn toggle_direction(&mut self) -> Direction {
        self.direction = self.direction.opposite();
        self.direction
    }

    /// Drop the speed to zero (emergency stop path)
    pub fn stop(&mut self) {
        self.speed = 0;
    }

    /// Set or clear one latching function bit
    pub fn set_function(&mut self, function: u8, on: bool) {
        if function >= FUNCTION_COUNT {
            return;
        }
        let mask = 1u32 << function;
        if on {
            self.functions |= mask;
        } else {
            self.functions &= !mask;
        }
    }

    /// Current state of one function bit
    pub fn function(&self, function: u8) -> bool {
        function < FUNCTION_COUNT && self.functions & (1u32 << function) != 0
    }
}

impl Default for LocoState {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Fixed slab of loco slots keyed by DCC address
#[derive(Debug, Clone)]
pub struct Roster {
    slots: [LocoState; MAX_LOCOS],
}

impl Roster {
    /// An empty roster
    pub const fn new() -> Self {
        Self {
            slots: [LocoState::EMPTY; MAX_LOCOS],
        }
    }

    /// Slot index for `address`, claiming the first free slot if the
    /// address is not yet in the roster
    ///
    /// Returns `None` when the roster is full and the address unknown.
    pub fn acquire(&mut self, address: u16) -> Option<usize> {
        let mut first_free = None;
        for (i, slot) in self.slots.iter().enumerate() {
            if first_free.is_none() && slot.is_free() {
                first_free = Some(i);
            } else if slot.address == address {
                return Some(i);
            }
        }

        if let Some(i) = first_free {
            self.slots[i].address = address;
        }
        first_free
    }

    /// Free the slot holding `address`, if any
    pub fn release(&mut self, address: u16) {
        for slot in &mut self.slots {
            if slot.address == address {
                *slot = LocoState::EMPTY;
                return;
            }
        }
    }

    /// Slot by index
    pub fn get(&self, index: usize) -> Option<&LocoState> {
        self.slots.get(index)
    }

    /// Mutable slot by index
    pub fn get_mut(&mut self, index: usize) -> Option<&mut LocoState> {
        self.slots.get_mut(index)
    }

    /// Zero every speed; paired with the station-wide emergency stop
    pub fn stop_all(&mut self) {
        for slot in &mut self.slots {
            slot.stop();
        }
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self::new()
    }
}
