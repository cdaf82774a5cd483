/// Record decoding command.
pub mod decode;
/// Schema inspection command.
pub mod describe;
/// Record encoding command.
pub mod encode;
/// Shared argument parsing and output helpers.
pub(crate) mod util;
