// Documentation generation: prompt building, the per-section orchestrator,
// and the feedback reviser. All LLM calls go through llm_client.

pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod reviser;
