// Cover-letter generation: topic weighting, prompt, and the model call.
// All model calls go through llm_client via the TextGenerator trait.

pub mod generator;
pub mod handlers;
pub mod payload;
pub mod prompts;
