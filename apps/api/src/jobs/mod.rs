// Job listing analysis: the pipeline over the scoring core and its HTTP handlers.

pub mod handlers;
pub mod pipeline;
