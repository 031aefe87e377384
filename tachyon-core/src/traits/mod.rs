//! External-interface traits
//!
//! These traits define the seams between the dashboard core and its
//! collaborators: the serial link, the wall clock, persisted settings,
//! the log sink and the rendering layer. The firmware supplies the
//! implementations; the core never touches hardware directly.

pub mod clock;
pub mod sink;
pub mod source;
pub mod store;
pub mod surface;

pub use clock::Clock;
pub use sink::{LogSink, SinkError};
pub use source::ByteSource;
pub use store::{ConfigError, ConfigStore};
pub use surface::PresentationSurface;
