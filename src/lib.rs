pub mod config;
pub mod events;
pub mod handler;
pub mod http;
pub mod intercept;
pub mod protocol;
pub mod server;
pub mod session;
pub mod transport;

pub use config::Config;
pub use events::{
    AudioChunkEvent, AudioPlayResponseEvent, BatteryEvent, EventDispatcher, SessionEvent,
    TranscriptionEvent,
};
pub use handler::{EchoHandler, SessionHandler};
pub use http::{create_router, AppState};
pub use intercept::{InterceptorStack, LoggingInterceptor, TrafficInterceptor};
pub use protocol::{Subscription, ViewType};
pub use server::AppServer;
pub use session::AppSession;
pub use transport::{MessageSink, TransportEvent};
