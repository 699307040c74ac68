pub mod checks;
pub mod driver;
pub mod login;
pub mod panels;
pub mod probes;

pub use checks::*;
pub use driver::*;
pub use login::*;
pub use panels::*;
pub use probes::*;
