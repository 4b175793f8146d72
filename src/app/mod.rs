// Application layer: wires the core services together for the CLI.

pub mod quote_app;
pub mod session;
