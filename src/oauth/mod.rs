//! OAuth 2.0 authorization-code flow with PKCE (RFC 7636).

pub mod agent;
pub mod callback;
pub mod flow;
pub mod pkce;
pub mod redirect;
pub mod request;
pub mod token;

pub use agent::{AuthorizationAgent, LoopbackAgent};
pub use callback::listen_for_redirect;
pub use flow::{AuthorizationFlow, FlowFailure, FlowState};
pub use pkce::{compute_challenge, generate_pkce, generate_state, PkceMaterial};
pub use redirect::{classify_redirect, AuthorizationResult};
pub use request::AuthorizationRequest;
pub use token::exchange_code;
