/// Buffer decode command.
pub mod decode;
/// Schema listing command.
pub mod schema;

pub(crate) mod input;
pub(crate) mod util;

#[cfg(test)]
pub(crate) mod test_support;
