//! In-memory listing store for engine tests.
//!
//! Holds lot and approval-request records as JSON, applies successful
//! actions the way the backend does (approved requests and rejected or
//! deleted lots disappear from later fetches), can be told to fail any
//! operation, and records every call in order.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use serde_json::{json, Value};

use parkctl_core::record::{ApprovalRequestRecord, ListingRecord};
use parkctl_core::types::DbId;
use parkctl_store::{FieldPatch, ListingStore, StoreError};

#[derive(Default)]
struct State {
    lots: Vec<Value>,
    requests: Vec<Value>,
    failing: HashSet<&'static str>,
    calls: Vec<String>,
    mutations: usize,
}

#[derive(Default)]
pub struct ScriptedStore {
    state: Mutex<State>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lots(self, lots: Value) -> Self {
        self.state.lock().unwrap().lots = as_vec(lots);
        self
    }

    pub fn with_requests(self, requests: Value) -> Self {
        self.state.lock().unwrap().requests = as_vec(requests);
        self
    }

    /// Make every call to `operation` (trait method name) fail with 500.
    pub fn failing(self, operation: &'static str) -> Self {
        self.state.lock().unwrap().failing.insert(operation);
        self
    }

    pub fn recover(&self, operation: &'static str) {
        self.state.lock().unwrap().failing.remove(operation);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls other than list fetches.
    pub fn action_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.starts_with("list_"))
            .collect()
    }

    pub fn mutations(&self) -> usize {
        self.state.lock().unwrap().mutations
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    fn enter(&self, operation: &'static str, call: String) -> Result<std::sync::MutexGuard<'_, State>, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.failing.contains(operation) {
            return Err(StoreError::api(500, format!("{operation} unavailable")));
        }
        Ok(state)
    }

    fn list<T: serde::de::DeserializeOwned>(
        &self,
        operation: &'static str,
        pick: impl Fn(&State) -> Vec<Value>,
    ) -> Result<Vec<T>, StoreError> {
        let state = self.enter(operation, operation.to_string())?;
        pick(&state)
            .into_iter()
            .map(|v| serde_json::from_value(v).map_err(|e| StoreError::Decode(e.to_string())))
            .collect()
    }

    fn mutate_lot(
        &self,
        operation: &'static str,
        id: DbId,
        apply: impl FnOnce(&mut Vec<Value>, usize),
    ) -> Result<(), StoreError> {
        let mut state = self.enter(operation, format!("{operation}({id})"))?;
        let index = state
            .lots
            .iter()
            .position(|l| l["id"] == json!(id))
            .ok_or_else(|| StoreError::api(404, "Not found."))?;
        apply(&mut state.lots, index);
        state.mutations += 1;
        Ok(())
    }
}

fn as_vec(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => panic!("expected a JSON array, got {other}"),
    }
}

fn flag(lot: &Value, key: &str) -> bool {
    lot.get(key).and_then(Value::as_bool).unwrap_or(false)
}

impl ListingStore for ScriptedStore {
    async fn list_direct_listings(&self) -> Result<Vec<ListingRecord>, StoreError> {
        self.list("list_direct_listings", |s| s.lots.clone())
    }

    async fn list_pending_listings(&self) -> Result<Vec<ListingRecord>, StoreError> {
        self.list("list_pending_listings", |s| {
            s.lots.iter().filter(|l| !flag(l, "aprobado")).cloned().collect()
        })
    }

    async fn list_approved_listings(&self) -> Result<Vec<ListingRecord>, StoreError> {
        self.list("list_approved_listings", |s| {
            s.lots.iter().filter(|l| flag(l, "aprobado")).cloned().collect()
        })
    }

    async fn list_pending_approval_requests(&self) -> Result<Vec<ApprovalRequestRecord>, StoreError> {
        self.list("list_pending_approval_requests", |s| s.requests.clone())
    }

    async fn approve_listing(&self, id: DbId) -> Result<(), StoreError> {
        // Suspend once so concurrent callers interleave.
        tokio::task::yield_now().await;
        self.mutate_lot("approve_listing", id, |lots, i| {
            lots[i]["aprobado"] = json!(true);
            lots[i]["activo"] = json!(true);
            lots[i]["status"] = Value::Null;
        })
    }

    async fn reject_listing(&self, id: DbId) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        self.mutate_lot("reject_listing", id, |lots, i| {
            lots.remove(i);
        })
    }

    async fn delete_listing(&self, id: DbId) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        self.mutate_lot("delete_listing", id, |lots, i| {
            lots.remove(i);
        })
    }

    async fn toggle_activation(&self, id: DbId) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        self.mutate_lot("toggle_activation", id, |lots, i| {
            let active = flag(&lots[i], "activo");
            lots[i]["activo"] = json!(!active);
            lots[i]["status"] = Value::Null;
        })
    }

    async fn patch_listing_fields(&self, id: DbId, fields: &FieldPatch) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        let fields = fields.clone();
        self.mutate_lot("patch_listing_fields", id, move |lots, i| {
            if let Some(approved) = fields.approved {
                lots[i]["aprobado"] = json!(approved);
            }
            if let Some(active) = fields.active {
                lots[i]["activo"] = json!(active);
            }
            lots[i]["status"] = Value::Null;
        })
    }

    async fn approve_request(&self, request_id: DbId) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        let mut state = self.enter("approve_request", format!("approve_request({request_id})"))?;
        let index = state
            .requests
            .iter()
            .position(|r| r["id"] == json!(request_id))
            .ok_or_else(|| StoreError::api(404, "Not found."))?;
        let request = state.requests.remove(index);
        let lot_id = 1000 + request_id;
        state.lots.push(json!({
            "id": lot_id,
            "nombre": request["nombre"],
            "aprobado": true,
            "activo": true,
        }));
        state.mutations += 1;
        Ok(())
    }

    async fn reject_request(&self, request_id: DbId, reason: &str) -> Result<(), StoreError> {
        tokio::task::yield_now().await;
        let mut state = self.enter(
            "reject_request",
            format!("reject_request({request_id}, {reason})"),
        )?;
        let index = state
            .requests
            .iter()
            .position(|r| r["id"] == json!(request_id))
            .ok_or_else(|| StoreError::api(404, "Not found."))?;
        state.requests.remove(index);
        state.mutations += 1;
        Ok(())
    }
}
