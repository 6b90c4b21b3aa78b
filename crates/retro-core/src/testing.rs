//! In-crate test doubles.

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::transport::{Transport, TransportError};

#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Status(u16),
    Delayed(Duration, Box<Reply>),
}

type Handler = Box<dyn Fn(&Url) -> Reply + Send + Sync>;

/// Transport answering from a closure and recording every requested URL.
pub struct MockTransport {
    handler: Handler,
    requests: Mutex<Vec<Url>>,
}

impl MockTransport {
    pub fn new(handler: impl Fn(&Url) -> Reply + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<Url> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Requests whose path starts with `prefix`.
    pub fn requests_to(&self, prefix: &str) -> Vec<Url> {
        self.requests()
            .into_iter()
            .filter(|u| u.path().starts_with(prefix))
            .collect()
    }
}

impl Transport for MockTransport {
    fn get_json<T>(&self, url: Url) -> impl Future<Output = Result<T, TransportError>> + Send
    where
        T: DeserializeOwned + Send,
    {
        self.requests.lock().unwrap().push(url.clone());
        let reply = (self.handler)(&url);
        async move {
            let mut reply = reply;
            while let Reply::Delayed(delay, inner) = reply {
                tokio::time::sleep(delay).await;
                reply = *inner;
            }
            match reply {
                Reply::Json(value) => Ok(serde_json::from_value(value)?),
                Reply::Status(status) => Err(TransportError::Status {
                    url: url.to_string(),
                    status,
                }),
                Reply::Delayed(..) => unreachable!(),
            }
        }
    }
}

pub fn station_json(uuid: &str, name: &str) -> Value {
    json!({
        "stationuuid": uuid,
        "name": name,
        "tags": "test,radio",
        "url_resolved": format!("http://stream.example/{}", uuid),
        "countrycode": "US",
        "votes": 1
    })
}

pub fn mirrors_json(names: &[&str]) -> Value {
    Value::Array(names.iter().map(|n| json!({ "name": n, "ip": "0.0.0.0" })).collect())
}
