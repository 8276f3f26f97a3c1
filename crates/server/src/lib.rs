pub mod routes;
pub mod startup;
pub mod errors;
pub mod shutdown;

pub use shutdown::ShutdownHandle;
pub use startup::run;
