//! Deterministic in-process [`EndpointClient`] for tests.
//!
//! Each capability is scripted with a handler closure; unscripted
//! capabilities fail with a network error. Every invocation is recorded so
//! tests can assert which capabilities were contacted and with what body.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::capability::Capability;
use crate::client::EndpointClient;
use crate::error::{EndpointError, Result};

type Handler = Arc<dyn Fn(&Value) -> Result<Value> + Send + Sync>;

/// A scripted endpoint client.
#[derive(Default)]
pub struct ScriptedEndpointClient {
    handlers: HashMap<Capability, Handler>,
    delays: HashMap<Capability, Duration>,
    calls: Mutex<Vec<(Capability, Value)>>,
}

impl ScriptedEndpointClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `capability` with `handler`.
    pub fn on<F>(mut self, capability: Capability, handler: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.handlers.insert(capability, Arc::new(handler));
        self
    }

    /// Always answer `capability` with `value`.
    pub fn reply(self, capability: Capability, value: Value) -> Self {
        self.on(capability, move |_| Ok(value.clone()))
    }

    /// Always fail `capability` with `error`.
    pub fn fail(self, capability: Capability, error: EndpointError) -> Self {
        self.on(capability, move |_| Err(error.clone()))
    }

    /// Sleep for `delay` before answering `capability`.
    pub fn delay(mut self, capability: Capability, delay: Duration) -> Self {
        self.delays.insert(capability, delay);
        self
    }

    /// All recorded invocations, in order.
    pub fn calls(&self) -> Vec<(Capability, Value)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Capabilities contacted, in order.
    pub fn capabilities_called(&self) -> Vec<Capability> {
        self.calls().into_iter().map(|(c, _)| c).collect()
    }

    /// Body of the last call to `capability`, if any.
    pub fn last_body(&self, capability: Capability) -> Option<Value> {
        self.calls()
            .into_iter()
            .rev()
            .find(|(c, _)| *c == capability)
            .map(|(_, body)| body)
    }
}

#[async_trait]
impl EndpointClient for ScriptedEndpointClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn invoke(&self, capability: Capability, body: &Value) -> Result<Value> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((capability, body.clone()));
        }
        if let Some(delay) = self.delays.get(&capability) {
            tokio::time::sleep(*delay).await;
        }
        match self.handlers.get(&capability) {
            Some(handler) => handler(body),
            None => Err(EndpointError::Network {
                capability,
                message: "no script for capability".into(),
            }),
        }
    }
}
