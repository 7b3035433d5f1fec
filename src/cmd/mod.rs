/// Leaf retrieval and conversion command.
pub mod get;
/// Store-at-path command.
pub mod set;
/// Path parsing command.
pub mod steps;
/// Shared document and output helpers.
pub(crate) mod util;
