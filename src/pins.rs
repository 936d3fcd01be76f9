//! GPIO pin assignments for the dock station controller board.
//!
//! Single source of truth — the binary builds its pin drivers from these
//! numbers, and nothing in the domain core refers to raw GPIOs.
//!
//! Electrical conventions (motor drivers and sensors as wired):
//!
//! | Line              | Low                    | High                  |
//! |-------------------|------------------------|-----------------------|
//! | `*_DIRECTION`     | forward (open/extend)  | reverse (close/retract)|
//! | `*_ENABLE`        | motor running          | motor stopped         |
//! | `*_SENSOR`        | closed / retracted     | not at endpoint       |
//! | `POWER_RELAY`     | de-energised           | energised             |

// ---------------------------------------------------------------------------
// Door motor (H-bridge, direction + active-low enable)
// ---------------------------------------------------------------------------

/// Digital output: door motor direction.
pub const DOOR_DIRECTION_GPIO: i32 = 4;
/// Digital output: door motor enable (active LOW).
pub const DOOR_ENABLE_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// Landing plate motor (H-bridge, direction + active-low enable)
// ---------------------------------------------------------------------------

/// Digital output: plate motor direction.
pub const PLATE_DIRECTION_GPIO: i32 = 6;
/// Digital output: plate motor enable (active LOW).
pub const PLATE_ENABLE_GPIO: i32 = 7;

// ---------------------------------------------------------------------------
// Position sensors (photo interrupters, active-low)
// ---------------------------------------------------------------------------

/// Digital input: LOW when the door is fully closed.
pub const DOOR_SENSOR_GPIO: i32 = 8;
/// Digital input: LOW when the landing plate is fully retracted.
pub const PLATE_SENSOR_GPIO: i32 = 9;

// ---------------------------------------------------------------------------
// Wireless power transfer
// ---------------------------------------------------------------------------

/// Digital output: wireless-power relay coil (active HIGH).
pub const POWER_RELAY_GPIO: i32 = 10;
