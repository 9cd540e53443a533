use serde_json::Value;
use waymark::{handler, Flow, Handler, HandlerResponse};

/// Handler that answers 200 with a fixed JSON body and ends the chain.
pub fn json_ok(body: Value) -> Handler {
    handler(move |_req, res| {
        *res = HandlerResponse::json(200, body.clone());
        Flow::Halt
    })
}

/// Handler that answers 200 with an empty JSON object.
pub fn empty_ok() -> Handler {
    handler(|_req, res| {
        *res = HandlerResponse::json(200, Value::Object(serde_json::Map::new()));
        Flow::Halt
    })
}
