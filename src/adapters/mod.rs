//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter         | Implements   | Connects to                     |
//! |-----------------|--------------|---------------------------------|
//! | `sqlite`        | ConfigStore  | SQLite file shared with the dashboard |
//! | `memory`        | ConfigStore  | In-process maps (dry run, tests) |
//! | `http_actuator` | Actuator     | Motor controller `POST /feed`   |
//! | `time`          | Clock        | Local system clock              |
//! | `log_sink`      | EventSink    | `log` facade                    |
//! | `detector`      | —            | Vision child process stdout     |

pub mod detector;
pub mod http_actuator;
pub mod log_sink;
pub mod memory;
pub mod sqlite;
pub mod time;
