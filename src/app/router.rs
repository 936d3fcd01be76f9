//! Command router — one table keyed by (vocabulary, byte).
//!
//! ```text
//! ┌───────────────┬──────┬────────────────────┬─────┬────────────────┐
//! │ Vocabulary    │ Byte │ Command            │ Ack │ Gate           │
//! ├───────────────┼──────┼────────────────────┼─────┼────────────────┤
//! │ GatedHuman    │ A    │ ExtendPlate        │  —  │ DoorClosed     │
//! │               │ E    │ CloseDoor          │  —  │ PlateRetracted │
//! │               │ G    │ QuickTakeOff       │  —  │ PlateRetracted │
//! │               │ ...  │                    │     │                │
//! │ Machine       │ a    │ ExtendPlate        │  A  │  —             │
//! │               │ ...  │                    │     │                │
//! │ Human         │ A    │ ExtendPlate        │  —  │  —             │
//! │               │ ...  │                    │     │                │
//! └───────────────┴──────┴────────────────────┴─────┴────────────────┘
//! ```
//!
//! The vocabulary a channel speaks depends on the router variant: the
//! single-channel design serves only the human channel with gated
//! commands; the dual-channel design serves both, ungated.

use crate::config::RouterVariant;
use crate::fsm::Procedure;

use super::commands::{ChannelId, Gate, StationCommand};

/// Command vocabulary spoken on one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vocabulary {
    /// Single-channel browser vocabulary with sensor preconditions.
    GatedHuman,
    /// Dual-channel machine vocabulary, every command acknowledged.
    Machine,
    /// Dual-channel browser vocabulary, silent.
    Human,
}

impl Vocabulary {
    /// Vocabulary served on `channel` under `variant`, if any.
    pub fn for_channel(variant: RouterVariant, channel: ChannelId) -> Option<Self> {
        match (variant, channel) {
            (RouterVariant::SingleChannel, ChannelId::Human) => Some(Self::GatedHuman),
            (RouterVariant::SingleChannel, ChannelId::Machine) => None,
            (RouterVariant::DualChannel, ChannelId::Machine) => Some(Self::Machine),
            (RouterVariant::DualChannel, ChannelId::Human) => Some(Self::Human),
        }
    }
}

/// Channels served by a variant, in polling order.
pub fn served_channels(variant: RouterVariant) -> &'static [ChannelId] {
    match variant {
        RouterVariant::SingleChannel => &[ChannelId::Human],
        RouterVariant::DualChannel => &[ChannelId::Machine, ChannelId::Human],
    }
}

/// One row of the routing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub vocabulary: Vocabulary,
    pub byte: u8,
    pub command: StationCommand,
    /// Reply byte sent after the command executes.
    pub ack: Option<u8>,
    /// Sensor precondition; the command is dropped when it fails.
    pub gate: Option<Gate>,
}

const fn route(
    vocabulary: Vocabulary,
    byte: u8,
    command: StationCommand,
    ack: Option<u8>,
    gate: Option<Gate>,
) -> Route {
    Route { vocabulary, byte, command, ack, gate }
}

use StationCommand as C;
use Vocabulary as V;

const TAKE_OFF: StationCommand = C::Sequence(Procedure::TakeOff);
const LANDING: StationCommand = C::Sequence(Procedure::Landing);

static ROUTES: [Route; 25] = [
    // ── Single-channel browser (gated) ─────────────────────────
    route(V::GatedHuman, b'A', C::ExtendPlate, None, Some(Gate::DoorClosed)),
    route(V::GatedHuman, b'D', C::RetractPlate, None, None),
    route(V::GatedHuman, b'B', C::OpenDoor, None, None),
    route(V::GatedHuman, b'E', C::CloseDoor, None, Some(Gate::PlateRetracted)),
    route(V::GatedHuman, b'G', C::QuickTakeOff, None, Some(Gate::PlateRetracted)),
    route(V::GatedHuman, b'H', C::QuickLanding, None, None),
    route(V::GatedHuman, b'I', C::StopAll, None, None),
    // ── Dual-channel machine (acked) ───────────────────────────
    route(V::Machine, b'a', C::ExtendPlate, Some(b'A'), None),
    route(V::Machine, b'b', C::RetractPlate, Some(b'B'), None),
    route(V::Machine, b'c', C::OpenDoor, Some(b'C'), None),
    route(V::Machine, b'd', C::CloseDoor, Some(b'D'), None),
    route(V::Machine, b'e', C::RelayOn, Some(b'E'), None),
    route(V::Machine, b'f', C::RelayOff, Some(b'F'), None),
    route(V::Machine, b'z', TAKE_OFF, Some(b'Z'), None),
    route(V::Machine, b'x', LANDING, Some(b'X'), None),
    route(V::Machine, b'g', C::StopAll, Some(b'G'), None),
    // ── Dual-channel browser ───────────────────────────────────
    route(V::Human, b'A', C::ExtendPlate, None, None),
    route(V::Human, b'D', C::RetractPlate, None, None),
    route(V::Human, b'B', C::OpenDoor, None, None),
    route(V::Human, b'E', C::CloseDoor, None, None),
    route(V::Human, b'C', C::RelayOn, None, None),
    route(V::Human, b'F', C::RelayOff, None, None),
    route(V::Human, b'G', TAKE_OFF, None, None),
    route(V::Human, b'H', LANDING, None, None),
    route(V::Human, b'I', C::StopAll, None, None),
];

/// Look up the route for `byte` in `vocabulary`.
pub fn resolve(vocabulary: Vocabulary, byte: u8) -> Option<&'static Route> {
    ROUTES
        .iter()
        .find(|r| r.vocabulary == vocabulary && r.byte == byte)
}

/// Every route of one vocabulary, in table order.
pub fn routes(vocabulary: Vocabulary) -> impl Iterator<Item = &'static Route> {
    ROUTES.iter().filter(move |r| r.vocabulary == vocabulary)
}
