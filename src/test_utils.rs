#[cfg(test)]
pub mod test_helpers {
    use crate::error::{OdooError, Result};
    use crate::rpc::Transport;
    use crate::session::ConnectionContext;
    use serde_json::Value;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// A call observed by [`ScriptedTransport`]
    #[derive(Debug, Clone)]
    pub struct RecordedCall {
        pub service: String,
        pub method: String,
        pub args: Value,
    }

    impl RecordedCall {
        /// Field list of an `execute_kw` `search_read` call
        pub fn requested_fields(&self) -> Vec<String> {
            self.args[5][1]
                .as_array()
                .map(|fields| {
                    fields
                        .iter()
                        .filter_map(|f| f.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default()
        }
    }

    /// In-memory transport replaying canned responses in order.
    ///
    /// `None` entries simulate a network failure for that call.
    pub struct ScriptedTransport {
        responses: Mutex<VecDeque<Option<Value>>>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl ScriptedTransport {
        pub fn new(responses: Vec<Value>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().map(Some).collect()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn with_failures(responses: Vec<Option<Value>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Transport for ScriptedTransport {
        async fn call(&self, service: &str, method: &str, args: Value) -> Result<Value> {
            self.calls.lock().unwrap().push(RecordedCall {
                service: service.to_string(),
                method: method.to_string(),
                args,
            });

            let next = self.responses.lock().unwrap().pop_front();
            match next {
                Some(Some(response)) => Ok(response),
                Some(None) => Err(OdooError::IoError(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "connection refused",
                ))),
                None => panic!("ScriptedTransport ran out of responses"),
            }
        }
    }

    pub fn test_context() -> ConnectionContext {
        ConnectionContext::new("https://erp.example.com", "testdb", 2, "secret")
    }

    /// Server error payload for an unknown field, shaped like Odoo's
    pub fn invalid_field_error(model: &str, field: &str) -> Value {
        serde_json::json!({
            "jsonrpc": "2.0",
            "id": 3,
            "error": {
                "code": 200,
                "message": "Odoo Server Error",
                "data": {
                    "name": "builtins.ValueError",
                    "message": format!("Invalid field '{}' on model '{}'", field, model),
                }
            }
        })
    }
}
