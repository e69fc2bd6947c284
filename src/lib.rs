//! Spotify Web API client core: PKCE authorization, an in-memory credential
//! store, an authenticated request primitive with typed endpoint wrappers,
//! and an observable [`Session`] tying them together.
//!
//! ```no_run
//! use spotlink::{AuthConfig, LoopbackAgent, Session, TimeRange};
//!
//! # async fn demo() -> Result<(), spotlink::SpotlinkError> {
//! let session = Session::new(AuthConfig::new("my-client-id"))?;
//! let user = session.login(&LoopbackAgent::new()).await?;
//! println!("hello {}", user.name());
//!
//! let top = session.client().top_tracks(5, 0, TimeRange::ShortTerm).await?;
//! for track in top {
//!     println!("{} - {}", track.name, track.artist_names());
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod oauth;
pub mod session;
pub mod types;

pub use client::ApiClient;
pub use config::{load_config, AuthConfig};
pub use credentials::{Credential, CredentialStore};
pub use error::{ApiError, SpotlinkError};
pub use oauth::{AuthorizationAgent, AuthorizationFlow, FlowState, LoopbackAgent};
pub use session::{Session, SessionError, SessionSnapshot};
pub use types::{
    Artist, FollowType, Paging, SavedTrack, SearchResult, SearchType, TimeRange, Track, User,
};
