pub mod models;
pub mod probability;
pub mod prompt;
pub mod provider;
pub mod traits;

// Re-export public APIs
pub use models::{ChatCompletion, ChatCompletionRequest, ProviderConfig, TokenLogprobs};
pub use probability::{extract_probabilities, ProbabilityError, YesNoProbabilities};
pub use prompt::build_prompt;
pub use provider::OpenAIProvider;
pub use traits::{ChatMessage, CompletionApi};
