pub mod sink;

pub use sink::{SinkResponse, SinkService, STATUS_TEXT, sink_routes};
