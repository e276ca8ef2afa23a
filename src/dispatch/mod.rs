// Event routing and the single-threaded session loop

mod router;
mod session;

pub use router::Dispatcher;
pub use session::Session;
