pub mod claims;
pub mod clock;
pub mod codec;
pub mod errors;
pub mod handler;

pub use claims::Claims;
pub use claims::TokenClass;
pub use clock::Clock;
pub use clock::ManualClock;
pub use clock::SystemClock;
pub use codec::TokenCodec;
pub use codec::TokenSettings;
pub use errors::JwtError;
pub use handler::JwtHandler;
