//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements         | Connects to                  |
//! |-------------|--------------------|------------------------------|
//! | `hardware`  | DigitalIo, Clock   | embedded-hal pins + delay    |
//! | `log_sink`  | EventSink          | Serial log output            |
//! | `tcp_link`  | CommandLink        | Non-blocking TCP listener    |
//! | `time`      | —                  | Monotonic system timer       |

pub mod hardware;
pub mod log_sink;
pub mod tcp_link;
pub mod time;
