#[cfg(feature = "in_memory")]
mod in_memory;
#[cfg(feature = "sqs_integration")]
mod sqs;
