//! Instant answers: the answerer framework, the catalog, the backends the
//! catalog draws on, and the dispatcher that picks one answer per query.

pub mod answer;
pub mod answerer;
pub mod answerers;
pub mod backends;
pub mod countries;
pub mod dispatcher;
pub mod providers;

pub use answer::{decode_solution, Answer, AnswerKind, CachePolicy, Solution};
pub use answerer::{Answerer, MatchResult, SelfTest};
pub use backends::Backends;
pub use dispatcher::Dispatcher;
