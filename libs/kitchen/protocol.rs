//! Kitchen wire protocol
//!
//! Inbound envelopes are routed by their `type` discriminator; outbound
//! envelopes are the three requests the kitchen display can make.

use realtime::EnvelopeRouter;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Inbound envelope kinds with a dedicated event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KitchenKind {
    NewOrder,
    OrderUpdate,
    StationUpdate,
    StaffUpdate,
}

impl KitchenKind {
    pub const ALL: [KitchenKind; 4] = [
        KitchenKind::NewOrder,
        KitchenKind::OrderUpdate,
        KitchenKind::StationUpdate,
        KitchenKind::StaffUpdate,
    ];

    /// Discriminator value on the wire
    pub fn wire_type(self) -> &'static str {
        match self {
            KitchenKind::NewOrder => "new_order",
            KitchenKind::OrderUpdate => "order_update",
            KitchenKind::StationUpdate => "station_update",
            KitchenKind::StaffUpdate => "staff_update",
        }
    }

    /// Name of the emitted event
    pub fn event_name(self) -> &'static str {
        match self {
            KitchenKind::NewOrder => "newOrder",
            KitchenKind::OrderUpdate => "orderUpdate",
            KitchenKind::StationUpdate => "stationUpdate",
            KitchenKind::StaffUpdate => "staffUpdate",
        }
    }

    pub fn from_wire_type(wire_type: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.wire_type() == wire_type)
    }
}

impl fmt::Display for KitchenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

#[derive(Debug, Error)]
#[error("unknown kitchen event '{0}'")]
pub struct UnknownKind(pub String);

impl FromStr for KitchenKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.event_name() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// Routes the four kitchen discriminators; everything else is `message` only
#[derive(Debug, Clone, Copy, Default)]
pub struct KitchenRouter;

impl EnvelopeRouter for KitchenRouter {
    type Kind = KitchenKind;

    fn route_key(&self, envelope_type: &str) -> Option<KitchenKind> {
        KitchenKind::from_wire_type(envelope_type)
    }
}

/// Requests sent by the kitchen display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundEnvelope {
    RequestOrderUpdate {
        #[serde(rename = "orderId")]
        order_id: String,
    },
    UpdateOrderStatus {
        #[serde(rename = "orderId")]
        order_id: String,
        status: String,
    },
    RequestStationStatus,
}
