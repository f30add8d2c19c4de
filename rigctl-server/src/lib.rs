//! # rigctl-server
//!
//! TCP-сервер удалённого управления приёмником: белый список адресов,
//! одна активная сессия, построчный протокол из `rigctl-core` и очередь
//! уведомлений для хоста.
//!
//! ```no_run
//! use rigctl_server::{RemoteControl, ServerConfig};
//!
//! let (mut rc, events) = RemoteControl::new(ServerConfig::default());
//! rc.start()?;
//! rc.set_new_frequency(145_800_000);
//!
//! for event in events.iter() {
//!     println!("{event:?}");
//! }
//! # Ok::<(), rigctl_server::ServerError>(())
//! ```

pub mod access;
pub mod config;
pub mod error;
pub mod hub;
pub mod remote;
pub mod settings;

mod session;
mod tcp;

pub use access::AccessControl;
pub use config::{DEFAULT_HOST, DEFAULT_PORT, EVENT_QUEUE_CAPACITY, ServerConfig};
pub use error::{ServerError, SettingsError};
pub use hub::{DeliveryStats, EventHub};
pub use remote::RemoteControl;
pub use settings::{ReceiverSeed, Settings};
