//! BMC test harness: Redfish API correctness, load, and Web UI
//! campaigns against an OpenBMC-class management controller.
//!
//! The three campaigns are independent and runnable standalone through
//! the `bmc-harness` CLI; the load campaign additionally ships its own
//! worker binary driven as a subprocess.

pub mod campaign;
pub mod config;
pub mod load;
pub mod redfish;
pub mod telemetry;
pub mod ui;
