use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use futures::channel::oneshot;
use ubiquity_storage::{Dispatcher, Immediate};

use crate::codec::decode_call;
use crate::{ChannelConfig, ChannelError, MethodCall, MethodResponse, codes};

/// Handles calls for one method name.
pub trait MethodHandler: Send + Sync {
    /// Answer `call` through `reply`.
    ///
    /// Implementations must not block; move slow work to a worker and send the
    /// reply from there.
    fn handle(&self, call: MethodCall, reply: Reply);
}

impl<F> MethodHandler for F
where
    F: Fn(MethodCall, Reply) + Send + Sync,
{
    fn handle(&self, call: MethodCall, reply: Reply) {
        self(call, reply);
    }
}

type Callback = Box<dyn FnOnce(MethodResponse) + Send + 'static>;

/// One-shot completion for a call.
///
/// Sending consumes the reply, so every call is answered at most once. The
/// response is delivered through the channel's dispatcher.
pub struct Reply {
    method: String,
    dispatcher: Arc<dyn Dispatcher>,
    callback: Option<Callback>,
}

impl Reply {
    fn new(method: String, dispatcher: Arc<dyn Dispatcher>, callback: Callback) -> Self {
        Self {
            method,
            dispatcher,
            callback: Some(callback),
        }
    }

    /// Name of the method being answered.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Send `response` to the caller.
    pub fn send(mut self, response: MethodResponse) {
        if let Some(callback) = self.callback.take() {
            self.dispatcher.dispatch(Box::new(move || callback(response)));
        }
    }

    /// Answer with a successful value.
    pub fn success(self, value: impl Into<serde_json::Value>) {
        self.send(MethodResponse::Success(value.into()));
    }

    /// Answer with an error.
    pub fn error(self, error: impl Into<ChannelError>) {
        self.send(MethodResponse::Error(error.into()));
    }

    /// Answer that the method is not implemented.
    pub fn not_implemented(self) {
        self.send(MethodResponse::NotImplemented);
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reply")
            .field("method", &self.method)
            .field("answered", &self.callback.is_none())
            .finish_non_exhaustive()
    }
}

impl Drop for Reply {
    fn drop(&mut self) {
        // A handler that forgets to answer would leave the shell waiting forever.
        if let Some(callback) = self.callback.take() {
            log::error!("handler for {} dropped its reply without answering", self.method);
            let response = MethodResponse::Error(ChannelError::new(
                codes::HANDLER_DROPPED,
                format!("{} finished without a reply", self.method),
            ));
            self.dispatcher.dispatch(Box::new(move || callback(response)));
        }
    }
}

/// A named bridge that routes calls to registered handlers.
///
/// ```
/// use ubiquity_channel::{MethodCall, MethodChannel, MethodResponse, Reply};
///
/// let mut channel = MethodChannel::new("demo");
/// channel.register("ping", |_call: MethodCall, reply: Reply| reply.success("pong"));
///
/// let response = futures::executor::block_on(channel.call(MethodCall::new("ping")));
/// assert_eq!(response, MethodResponse::Success("pong".into()));
///
/// let response = futures::executor::block_on(channel.call(MethodCall::new("missing")));
/// assert_eq!(response, MethodResponse::NotImplemented);
/// ```
pub struct MethodChannel {
    name: String,
    handlers: HashMap<String, Arc<dyn MethodHandler>>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl MethodChannel {
    /// A channel whose replies run on the thread that produced them.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_dispatcher(name, Immediate)
    }

    /// A channel configured from `config`.
    #[must_use]
    pub fn from_config(config: &ChannelConfig) -> Self {
        Self::new(config.name.clone())
    }

    /// A channel whose replies are delivered through `dispatcher`, e.g. a
    /// [`MainQueueHandle`](ubiquity_storage::MainQueueHandle) drained by the UI thread.
    pub fn with_dispatcher(name: impl Into<String>, dispatcher: impl Dispatcher + 'static) -> Self {
        Self {
            name: name.into(),
            handlers: HashMap::new(),
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Name of the channel.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register `handler` for `method`, replacing any earlier handler.
    pub fn register(&mut self, method: impl Into<String>, handler: impl MethodHandler + 'static) {
        let method = method.into();
        log::debug!("{}: registered {method}", self.name);
        self.handlers.insert(method, Arc::new(handler));
    }

    /// Whether a handler is registered for `method`.
    #[must_use]
    pub fn handles(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// Invoke `call` and deliver the response to `callback` through the dispatcher.
    ///
    /// Unknown methods are answered with [`MethodResponse::NotImplemented`].
    pub fn invoke<F>(&self, call: MethodCall, callback: F)
    where
        F: FnOnce(MethodResponse) + Send + 'static,
    {
        let reply = Reply::new(call.method.clone(), self.dispatcher.clone(), Box::new(callback));

        match self.handlers.get(&call.method) {
            Some(handler) => {
                log::debug!("{}: invoking {}", self.name, call.method);
                handler.handle(call, reply);
            }
            None => {
                log::debug!("{}: {} is not implemented", self.name, call.method);
                reply.not_implemented();
            }
        }
    }

    /// Decode a JSON-encoded call and invoke it.
    ///
    /// Undecodable messages are answered with a [`codes::MALFORMED_CALL`] error.
    pub fn invoke_json<F>(&self, message: &[u8], callback: F)
    where
        F: FnOnce(MethodResponse) + Send + 'static,
    {
        match decode_call(message) {
            Ok(call) => self.invoke(call, callback),
            Err(e) => {
                log::warn!("{}: dropping malformed call: {e}", self.name);
                let error = ChannelError::new(codes::MALFORMED_CALL, "Could not decode method call")
                    .with_details(e.to_string());
                Reply::new(String::new(), self.dispatcher.clone(), Box::new(callback)).error(error);
            }
        }
    }

    /// Invoke `call` and await its response.
    pub async fn call(&self, call: MethodCall) -> MethodResponse {
        let method = call.method.clone();
        let (tx, rx) = oneshot::channel();
        self.invoke(call, move |response| {
            let _ = tx.send(response);
        });
        rx.await.unwrap_or_else(|_| {
            MethodResponse::Error(ChannelError::new(
                codes::HANDLER_DROPPED,
                format!("{method} finished without a reply"),
            ))
        })
    }
}

impl fmt::Debug for MethodChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<_> = self.handlers.keys().collect();
        methods.sort();
        f.debug_struct("MethodChannel")
            .field("name", &self.name)
            .field("methods", &methods)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;
    use std::thread;
    use ubiquity_storage::MainQueue;

    fn block_on<T>(future: impl std::future::Future<Output = T>) -> T {
        futures::executor::block_on(future)
    }

    #[test]
    fn unknown_method_is_not_implemented() {
        let channel = MethodChannel::new("test");
        let response = block_on(channel.call(MethodCall::new("frobnicate")));
        assert_eq!(response, MethodResponse::NotImplemented);
    }

    #[test]
    fn registered_handler_receives_arguments() {
        let mut channel = MethodChannel::new("test");
        channel.register("echo", |call: MethodCall, reply: Reply| {
            reply.success(call.arguments);
        });
        assert!(channel.handles("echo"));

        let call = MethodCall::new("echo").with_arguments(json!({ "x": 1 }));
        let response = block_on(channel.call(call));
        assert_eq!(response, MethodResponse::Success(json!({ "x": 1 })));
    }

    #[test]
    fn later_registration_replaces_earlier() {
        let mut channel = MethodChannel::new("test");
        channel.register("v", |_: MethodCall, reply: Reply| reply.success(1));
        channel.register("v", |_: MethodCall, reply: Reply| reply.success(2));
        assert_eq!(
            block_on(channel.call(MethodCall::new("v"))),
            MethodResponse::Success(json!(2))
        );
    }

    #[test]
    fn dropped_reply_still_answers() {
        let mut channel = MethodChannel::new("test");
        channel.register("forgetful", |_: MethodCall, reply: Reply| drop(reply));

        let response = block_on(channel.call(MethodCall::new("forgetful")));
        assert_eq!(response.error_code(), Some(codes::HANDLER_DROPPED));
    }

    #[test]
    fn malformed_json_is_answered() {
        let channel = MethodChannel::new("test");
        let seen = Arc::new(Mutex::new(None));
        let slot = seen.clone();

        channel.invoke_json(b"{ not json", move |response| {
            *slot.lock().unwrap() = Some(response);
        });

        let response = seen.lock().unwrap().take().unwrap();
        assert_eq!(response.error_code(), Some(codes::MALFORMED_CALL));
    }

    #[test]
    fn json_call_reaches_handler() {
        let mut channel = MethodChannel::new("test");
        channel.register("ping", |_: MethodCall, reply: Reply| reply.success("pong"));
        let seen = Arc::new(Mutex::new(None));
        let slot = seen.clone();

        channel.invoke_json(br#"{ "method": "ping" }"#, move |response| {
            *slot.lock().unwrap() = Some(response);
        });

        assert_eq!(
            seen.lock().unwrap().take(),
            Some(MethodResponse::Success(json!("pong")))
        );
    }

    #[test]
    fn replies_from_workers_land_on_main_queue() {
        let queue = MainQueue::new();
        let mut channel = MethodChannel::with_dispatcher("test", queue.handle());
        channel.register("slow", |_: MethodCall, reply: Reply| {
            thread::spawn(move || reply.success("done"));
        });

        let owner = thread::current().id();
        let seen = Arc::new(Mutex::new(None));
        let slot = seen.clone();
        channel.invoke(MethodCall::new("slow"), move |response| {
            *slot.lock().unwrap() = Some((thread::current().id(), response));
        });

        while queue.run_pending() == 0 {
            thread::yield_now();
        }

        let (thread_id, response) = seen.lock().unwrap().take().unwrap();
        assert_eq!(thread_id, owner);
        assert_eq!(response, MethodResponse::Success(json!("done")));
    }
}
