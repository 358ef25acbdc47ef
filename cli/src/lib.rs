//! Client library behind the `se` command line tool.
//!
//! [`api::DeviceAPI`] talks to a Sensor Edge gateway's `/api/devices`
//! resource; [`config`] resolves which gateway to talk to.

pub mod api;
pub mod config;
pub mod device_file;
