//! The Task Engine: the `Result`/`State` value type, its composition
//! builder, the `Password` secret wrapper, and the host-restriction guard
//! shared by every plumbing and task-layer call.

mod host;
mod password;
mod result;
mod state;

pub use host::{current_hostname, hosts, require_host, HostGuardError};
pub use password::Password;
pub use result::{Node, ResultBuilder, TaskResult};
pub use state::State;
