//! In-memory view of the kitchen fed by inbound envelopes

use crate::protocol::KitchenKind;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Latest known state of one order
#[derive(Debug, Clone, PartialEq)]
pub struct OrderEntry {
    pub status: Option<String>,
    pub station: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Orders keyed by `orderId`, plus the last station and staff snapshots
#[derive(Debug, Default)]
pub struct OrderBoard {
    orders: HashMap<String, OrderEntry>,
    stations: Option<Value>,
    staff: Option<Value>,
}

impl OrderBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one envelope into the board; returns whether anything changed
    pub fn apply(&mut self, kind: KitchenKind, envelope: &Value) -> bool {
        match kind {
            KitchenKind::NewOrder | KitchenKind::OrderUpdate => self.apply_order(kind, envelope),
            KitchenKind::StationUpdate => {
                self.stations = Some(envelope.clone());
                true
            }
            KitchenKind::StaffUpdate => {
                self.staff = Some(envelope.clone());
                true
            }
        }
    }

    fn apply_order(&mut self, kind: KitchenKind, envelope: &Value) -> bool {
        let Some(order_id) = order_id(envelope) else {
            debug!(%kind, "Ignoring envelope without orderId");
            return false;
        };

        let status = string_field(envelope, "status");
        let station = string_field(envelope, "station");
        let now = Utc::now();

        match self.orders.get_mut(&order_id) {
            Some(entry) => {
                // Partial updates keep what they do not mention
                if status.is_some() {
                    entry.status = status;
                }
                if station.is_some() {
                    entry.station = station;
                }
                entry.updated_at = now;
            }
            None => {
                self.orders.insert(
                    order_id,
                    OrderEntry {
                        status,
                        station,
                        updated_at: now,
                    },
                );
            }
        }
        true
    }

    pub fn order(&self, order_id: &str) -> Option<&OrderEntry> {
        self.orders.get(order_id)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Orders whose current status equals `status`, sorted by id
    pub fn orders_with_status(&self, status: &str) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .orders
            .iter()
            .filter(|(_, entry)| entry.status.as_deref() == Some(status))
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn stations(&self) -> Option<&Value> {
        self.stations.as_ref()
    }

    pub fn staff(&self) -> Option<&Value> {
        self.staff.as_ref()
    }
}

/// `orderId` as a string; numeric ids are accepted too
fn order_id(envelope: &Value) -> Option<String> {
    match envelope.get("orderId")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn string_field(envelope: &Value, field: &str) -> Option<String> {
    envelope.get(field).and_then(Value::as_str).map(str::to_string)
}
